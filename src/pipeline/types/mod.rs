pub mod descriptor;
pub mod gallery_entry;
pub mod region;
pub mod report;

pub use descriptor::{
    ImageDescriptor, COLOR_BINS_PER_CHANNEL, COLOR_CHANNELS, COLOR_HISTOGRAM_LEN, DESCRIPTOR_LEN,
    EDGE_HISTOGRAM_BINS, TEXTURE_FEATURES_LEN,
};
pub use gallery_entry::GalleryEntry;
pub use region::{Region, Severity};
pub use report::{AnomalyReport, AnomalyStatus, SimilarityRecord};
