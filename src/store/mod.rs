mod notebook;

pub use notebook::Notebook;

use std::sync::Arc;

use uuid::Uuid;

use crate::entity::{NoteDraft, StoredNote, Tag};
use crate::storage::{Binding, KvStore, Persistence, Seed};

pub const NOTES_KEY: &str = "NOTES";
pub const TAGS_KEY: &str = "TAGS";

/// Owns the note and tag collections and is the only sanctioned way to
/// mutate them. Each collection is backed by its own persisted binding;
/// every mutation replaces the whole collection value (replace-on-write),
/// so readers can use `Arc` identity to detect change.
///
/// Single writer by construction: all mutators take `&mut self`.
pub struct NoteStore<S: KvStore> {
    kv: S,
    notes: Binding<Vec<StoredNote>>,
    tags: Binding<Vec<Tag>>,
}

impl<S: KvStore> NoteStore<S> {
    /// Load both collections from the store, starting empty when a slot
    /// is absent or unreadable.
    pub fn open(kv: S) -> Self {
        let notes = Binding::load(&kv, NOTES_KEY, Seed::factory(Vec::new));
        let tags = Binding::load(&kv, TAGS_KEY, Seed::factory(Vec::new));
        Self { kv, notes, tags }
    }

    /// The current note collection snapshot
    pub fn notes(&self) -> &Arc<Vec<StoredNote>> {
        self.notes.get()
    }

    /// The current tag collection snapshot
    pub fn tags(&self) -> &Arc<Vec<Tag>> {
        self.tags.get()
    }

    /// Append a new note with a fresh id, collapsing the draft's tags to
    /// ids. Returns the new id and the worst persistence outcome of the
    /// writes performed.
    pub fn create_note(&mut self, draft: NoteDraft) -> (Uuid, Persistence) {
        let tags_outcome = self.register_tags(&draft.tags);
        let id = Uuid::new_v4();
        let tag_ids = collapse_tag_ids(&draft.tags);

        let note = StoredNote {
            id,
            title: draft.title,
            markdown: draft.markdown,
            tag_ids,
        };

        let notes_outcome = self.notes.set(&self.kv, |prev| {
            let mut next = prev.clone();
            next.push(note.clone());
            next
        });

        (id, tags_outcome.and(notes_outcome))
    }

    /// Replace the title, markdown, and tag set of the note with `id`.
    /// Silent no-op if no such note exists; all other notes are unchanged.
    pub fn update_note(&mut self, id: Uuid, draft: NoteDraft) -> Persistence {
        if !self.notes.get().iter().any(|n| n.id == id) {
            return Persistence::Durable;
        }

        let tags_outcome = self.register_tags(&draft.tags);
        let tag_ids = collapse_tag_ids(&draft.tags);

        let notes_outcome = self.notes.set(&self.kv, |prev| {
            prev.iter()
                .map(|note| {
                    if note.id == id {
                        StoredNote {
                            id,
                            title: draft.title.clone(),
                            markdown: draft.markdown.clone(),
                            tag_ids: tag_ids.clone(),
                        }
                    } else {
                        note.clone()
                    }
                })
                .collect()
        });

        tags_outcome.and(notes_outcome)
    }

    /// Remove the note with `id`; silent no-op if absent
    pub fn delete_note(&mut self, id: Uuid) -> Persistence {
        if !self.notes.get().iter().any(|n| n.id == id) {
            return Persistence::Durable;
        }

        self.notes.set(&self.kv, |prev| {
            prev.iter().filter(|n| n.id != id).cloned().collect()
        })
    }

    /// Append a tag. The caller supplies the id (collision-resistant
    /// random, see `Tag::new`); ids already present are left untouched.
    pub fn add_tag(&mut self, tag: Tag) -> Persistence {
        if self.tags.get().iter().any(|t| t.id == tag.id) {
            return Persistence::Durable;
        }

        self.tags.set(&self.kv, |prev| {
            let mut next = prev.clone();
            next.push(tag.clone());
            next
        })
    }

    /// Replace the label of the tag with `id`; silent no-op if absent.
    /// Notes referencing the tag pick up the new label through the view
    /// join without being rewritten.
    pub fn update_tag(&mut self, id: Uuid, label: &str) -> Persistence {
        if !self.tags.get().iter().any(|t| t.id == id) {
            return Persistence::Durable;
        }

        self.tags.set(&self.kv, |prev| {
            prev.iter()
                .map(|tag| {
                    if tag.id == id {
                        Tag {
                            id,
                            label: label.to_string(),
                        }
                    } else {
                        tag.clone()
                    }
                })
                .collect()
        })
    }

    /// Remove the tag with `id` and prune its id from every note that
    /// references it. Both collections reflect the change before this
    /// returns; no dangling reference is ever observable.
    pub fn delete_tag(&mut self, id: Uuid) -> Persistence {
        if !self.tags.get().iter().any(|t| t.id == id) {
            return Persistence::Durable;
        }

        let tags_outcome = self.tags.set(&self.kv, |prev| {
            prev.iter().filter(|t| t.id != id).cloned().collect()
        });

        // Only touch the note collection if something actually references
        // the tag, so view memoization keyed on identity stays cheap.
        let referenced = self.notes.get().iter().any(|n| n.tag_ids.contains(&id));
        if !referenced {
            return tags_outcome;
        }

        let notes_outcome = self.notes.set(&self.kv, |prev| {
            prev.iter()
                .map(|note| {
                    if note.tag_ids.contains(&id) {
                        let mut pruned = note.clone();
                        pruned.tag_ids.retain(|tag_id| *tag_id != id);
                        pruned
                    } else {
                        note.clone()
                    }
                })
                .collect()
        });

        tags_outcome.and(notes_outcome)
    }

    /// Look up a tag by exact label, creating it if absent. This is how
    /// editing surfaces turn typed tag names into tags.
    pub fn find_or_create_tag(&mut self, label: &str) -> (Tag, Persistence) {
        if let Some(tag) = self.tags.get().iter().find(|t| t.label == label) {
            return (tag.clone(), Persistence::Durable);
        }

        let tag = Tag::new(label);
        let outcome = self.add_tag(tag.clone());
        (tag, outcome)
    }

    /// Tags the draft references that are not yet in the collection get
    /// appended, keeping the write-time invariant that a note's tag ids
    /// always resolve.
    fn register_tags(&mut self, tags: &[Tag]) -> Persistence {
        let missing: Vec<Tag> = tags
            .iter()
            .filter(|tag| !self.tags.get().iter().any(|t| t.id == tag.id))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Persistence::Durable;
        }

        self.tags.set(&self.kv, |prev| {
            let mut next = prev.clone();
            for tag in &missing {
                if !next.iter().any(|t| t.id == tag.id) {
                    next.push(tag.clone());
                }
            }
            next
        })
    }
}

/// Collapse full tag objects to their ids, dropping duplicates while
/// keeping first-occurrence order.
fn collapse_tag_ids(tags: &[Tag]) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(tags.len());
    for tag in tags {
        if !ids.contains(&tag.id) {
            ids.push(tag.id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;
    use tempfile::TempDir;

    fn draft(title: &str, markdown: &str, tags: Vec<Tag>) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            markdown: markdown.to_string(),
            tags,
        }
    }

    fn store() -> NoteStore<MemoryKv> {
        NoteStore::open(MemoryKv::new())
    }

    #[test]
    fn test_create_twice_yields_distinct_ids() {
        let mut store = store();

        let (a, p1) = store.create_note(draft("A", "b", vec![]));
        let (b, p2) = store.create_note(draft("A", "b", vec![]));
        assert!(p1.is_durable() && p2.is_durable());

        assert_ne!(a, b);
        let ids: Vec<Uuid> = store.notes().iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));
    }

    #[test]
    fn test_create_collapses_tags_to_ids() {
        let mut store = store();
        let work = Tag::new("work");

        let (id, _) = store.create_note(draft("Plan", "...", vec![work.clone(), work.clone()]));

        let note = store.notes().iter().find(|n| n.id == id).unwrap().clone();
        assert_eq!(note.tag_ids, vec![work.id]);
        // The draft's tag was registered in the tag collection
        assert_eq!(**store.tags(), vec![work]);
    }

    #[test]
    fn test_update_note_replaces_fields_and_leaves_others() {
        let mut store = store();
        let (a, _) = store.create_note(draft("First", "1", vec![]));
        let (b, _) = store.create_note(draft("Second", "2", vec![]));

        let tag = Tag::new("urgent");
        let outcome = store.update_note(b, draft("Second!", "2b", vec![tag.clone()]));
        assert!(outcome.is_durable());

        let first = store.notes().iter().find(|n| n.id == a).unwrap().clone();
        assert_eq!(first.title, "First");
        assert_eq!(first.markdown, "1");

        let second = store.notes().iter().find(|n| n.id == b).unwrap().clone();
        assert_eq!(second.title, "Second!");
        assert_eq!(second.markdown, "2b");
        assert_eq!(second.tag_ids, vec![tag.id]);
    }

    #[test]
    fn test_update_missing_note_is_silent_noop() {
        let mut store = store();
        let _ = store.create_note(draft("Keep", "k", vec![]));

        let before = store.notes().clone();
        let outcome = store.update_note(Uuid::new_v4(), draft("X", "x", vec![]));
        assert!(outcome.is_durable());

        // No-op does not even replace the collection value
        assert!(Arc::ptr_eq(&before, store.notes()));
    }

    #[test]
    fn test_delete_missing_note_is_silent_noop() {
        let mut store = store();
        let before = store.notes().clone();
        let outcome = store.delete_note(Uuid::new_v4());
        assert!(outcome.is_durable());
        assert!(Arc::ptr_eq(&before, store.notes()));
    }

    #[test]
    fn test_delete_note_removes_only_target() {
        let mut store = store();
        let (a, _) = store.create_note(draft("A", "", vec![]));
        let (b, _) = store.create_note(draft("B", "", vec![]));

        let outcome = store.delete_note(a);
        assert!(outcome.is_durable());

        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].id, b);
    }

    #[test]
    fn test_update_tag_changes_label_only() {
        let mut store = store();
        let tag = Tag::new("wrok");
        let _ = store.add_tag(tag.clone());

        let outcome = store.update_tag(tag.id, "work");
        assert!(outcome.is_durable());

        assert_eq!(store.tags()[0].id, tag.id);
        assert_eq!(store.tags()[0].label, "work");
    }

    #[test]
    fn test_update_missing_tag_is_silent_noop() {
        let mut store = store();
        let before = store.tags().clone();
        let outcome = store.update_tag(Uuid::new_v4(), "ghost");
        assert!(outcome.is_durable());
        assert!(Arc::ptr_eq(&before, store.tags()));
    }

    #[test]
    fn test_delete_tag_cascades_into_notes() {
        let mut store = store();
        let work = Tag::new("work");
        let home = Tag::new("home");
        let (id, _) = store.create_note(draft("Plan", "...", vec![work.clone(), home.clone()]));

        let outcome = store.delete_tag(work.id);
        assert!(outcome.is_durable());

        // Tag gone from the collection and from the note, in one step
        assert_eq!(**store.tags(), vec![home.clone()]);
        let note = store.notes().iter().find(|n| n.id == id).unwrap().clone();
        assert_eq!(note.tag_ids, vec![home.id]);
    }

    #[test]
    fn test_delete_unreferenced_tag_leaves_notes_untouched() {
        let mut store = store();
        let tag = Tag::new("unused");
        let _ = store.add_tag(tag.clone());
        let _ = store.create_note(draft("Plain", "", vec![]));

        let notes_before = store.notes().clone();
        let outcome = store.delete_tag(tag.id);
        assert!(outcome.is_durable());

        assert!(store.tags().is_empty());
        assert!(Arc::ptr_eq(&notes_before, store.notes()));
    }

    #[test]
    fn test_find_or_create_reuses_existing_label() {
        let mut store = store();
        let (first, _) = store.find_or_create_tag("work");
        let (second, _) = store.find_or_create_tag("work");
        let (other, _) = store.find_or_create_tag("Work");

        assert_eq!(first, second);
        assert_ne!(first.id, other.id);
        assert_eq!(store.tags().len(), 2);
    }

    #[test]
    fn test_collections_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let work = Tag::new("work");
        let id;
        {
            let kv = crate::storage::SqliteKv::init(tmp.path()).unwrap();
            let mut store = NoteStore::open(kv);
            let (note_id, outcome) = store.create_note(draft("Plan", "body", vec![work.clone()]));
            assert!(outcome.is_durable());
            id = note_id;
        }

        let kv = crate::storage::SqliteKv::open(tmp.path()).unwrap();
        let store = NoteStore::open(kv);
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].id, id);
        assert_eq!(store.notes()[0].tag_ids, vec![work.id]);
        assert_eq!(**store.tags(), vec![work]);
    }

    #[test]
    fn test_persisted_format_uses_wire_field_names() {
        let tmp = TempDir::new().unwrap();
        let kv = crate::storage::SqliteKv::init(tmp.path()).unwrap();
        let mut store = NoteStore::open(kv);

        let tag = Tag::new("work");
        let _ = store.create_note(draft("Plan", "body", vec![tag]));

        let raw = store.kv.get(NOTES_KEY).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let note = &parsed.as_array().unwrap()[0];
        assert!(note.get("tagIds").is_some());
        assert!(note.get("markdown").is_some());
        assert!(note.get("tag_ids").is_none());
    }
}
