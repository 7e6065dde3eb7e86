pub mod gallery_builder;
pub mod gallery_store;

pub use gallery_builder::{GalleryBuilder, IngestReport, IngestSource, SourceContent};
pub use gallery_store::{GallerySnapshot, GalleryStore, JsonFileGalleryStore, SNAPSHOT_VERSION};
