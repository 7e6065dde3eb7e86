use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ImageDescriptor;

/// A reference ("normal") sample in the gallery.
///
/// `descriptor` is `None` when the reference image could not be turned into
/// a descriptor at ingestion time; such entries never take part in scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    pub id: Uuid,
    pub descriptor: Option<ImageDescriptor>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl GalleryEntry {
    pub fn new(descriptor: ImageDescriptor, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            descriptor: Some(descriptor),
            category: category.into(),
            created_at: Utc::now(),
        }
    }

    pub fn without_descriptor(category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            descriptor: None,
            category: category.into(),
            created_at: Utc::now(),
        }
    }

    pub fn has_descriptor(&self) -> bool {
        self.descriptor.is_some()
    }
}
