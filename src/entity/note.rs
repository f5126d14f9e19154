// src/entity/note.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;

/// The persisted note record. Tags are referenced by id rather than
/// embedded, so label data is never duplicated across notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNote {
    pub id: Uuid,
    pub title: String,
    pub markdown: String,
    #[serde(rename = "tagIds")]
    pub tag_ids: Vec<Uuid>,
}

/// The payload accepted from editing surfaces. Callers work with full
/// `Tag` objects; the store collapses them to ids on write.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}
