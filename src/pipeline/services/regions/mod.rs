pub mod random_source;
pub mod region_synthesizer;

pub use random_source::{RandomSource, RngSource, SequenceSource};
pub use region_synthesizer::RegionSynthesizer;
