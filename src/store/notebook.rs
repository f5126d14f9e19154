use std::sync::Arc;

use uuid::Uuid;

use crate::entity::{NoteDraft, StoredNote, Tag};
use crate::storage::{KvStore, Persistence};
use crate::store::NoteStore;
use crate::view::{ViewBuilder, ViewNote};

/// The surface handed to presentation collaborators: the domain store's
/// mutators plus the derived projection, with the join recomputed only
/// when a mutation actually replaced one of the collections.
pub struct Notebook<S: KvStore> {
    store: NoteStore<S>,
    views: ViewBuilder,
}

impl<S: KvStore> Notebook<S> {
    pub fn open(kv: S) -> Self {
        Self {
            store: NoteStore::open(kv),
            views: ViewBuilder::new(),
        }
    }

    /// Every note joined with its full tag objects
    pub fn notes_with_tags(&mut self) -> Arc<Vec<ViewNote>> {
        self.views.views(self.store.notes(), self.store.tags())
    }

    /// All tags, for pickers and tag management
    pub fn available_tags(&self) -> &Arc<Vec<Tag>> {
        self.store.tags()
    }

    /// The persisted note records
    pub fn notes(&self) -> &Arc<Vec<StoredNote>> {
        self.store.notes()
    }

    pub fn create_note(&mut self, draft: NoteDraft) -> (Uuid, Persistence) {
        self.store.create_note(draft)
    }

    pub fn update_note(&mut self, id: Uuid, draft: NoteDraft) -> Persistence {
        self.store.update_note(id, draft)
    }

    pub fn delete_note(&mut self, id: Uuid) -> Persistence {
        self.store.delete_note(id)
    }

    pub fn add_tag(&mut self, tag: Tag) -> Persistence {
        self.store.add_tag(tag)
    }

    pub fn update_tag(&mut self, id: Uuid, label: &str) -> Persistence {
        self.store.update_tag(id, label)
    }

    pub fn delete_tag(&mut self, id: Uuid) -> Persistence {
        self.store.delete_tag(id)
    }

    pub fn find_or_create_tag(&mut self, label: &str) -> (Tag, Persistence) {
        self.store.find_or_create_tag(label)
    }
}
