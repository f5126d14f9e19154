// src/entity/tag.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tag that notes can reference by id. Identity is `id`; `label` is
/// mutable display text, so renames propagate without rewriting notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub label: String,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
        }
    }
}
