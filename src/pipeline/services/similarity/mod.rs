pub mod similarity_engine;

pub use similarity_engine::{
    cosine_similarity, histogram_intersection, texture_similarity, SimilarityBreakdown,
    SimilarityEngine,
};
