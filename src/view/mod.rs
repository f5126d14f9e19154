use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::entity::{StoredNote, Tag};

/// A note projected for display: tag ids resolved to full tag objects.
/// Derived only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNote {
    pub id: Uuid,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

/// Join every note against the tag collection. Tags come out in the order
/// the note stored their ids; ids with no matching tag are dropped (covers
/// the window before cascade pruning lands, and any stale stored data),
/// and duplicates are skipped.
pub fn build_views(notes: &[StoredNote], tags: &[Tag]) -> Vec<ViewNote> {
    let by_id: HashMap<Uuid, &Tag> = tags.iter().map(|t| (t.id, t)).collect();

    notes
        .iter()
        .map(|note| {
            let mut resolved: Vec<Tag> = Vec::with_capacity(note.tag_ids.len());
            for tag_id in &note.tag_ids {
                if let Some(tag) = by_id.get(tag_id) {
                    if !resolved.iter().any(|t| t.id == *tag_id) {
                        resolved.push((*tag).clone());
                    }
                }
            }

            ViewNote {
                id: note.id,
                title: note.title.clone(),
                markdown: note.markdown.clone(),
                tags: resolved,
            }
        })
        .collect()
}

/// Memoizes `build_views` against the identity of its two inputs. The
/// store replaces collection values wholesale on every mutation, so
/// pointer equality is an exact change signal.
#[derive(Default)]
pub struct ViewBuilder {
    cache: Option<ViewCache>,
}

struct ViewCache {
    notes: Arc<Vec<StoredNote>>,
    tags: Arc<Vec<Tag>>,
    views: Arc<Vec<ViewNote>>,
}

impl ViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The joined projection for the given snapshots, recomputed only
    /// when either collection actually changed.
    pub fn views(
        &mut self,
        notes: &Arc<Vec<StoredNote>>,
        tags: &Arc<Vec<Tag>>,
    ) -> Arc<Vec<ViewNote>> {
        if let Some(cache) = &self.cache {
            if Arc::ptr_eq(&cache.notes, notes) && Arc::ptr_eq(&cache.tags, tags) {
                return Arc::clone(&cache.views);
            }
        }

        let views = Arc::new(build_views(notes, tags));
        self.cache = Some(ViewCache {
            notes: Arc::clone(notes),
            tags: Arc::clone(tags),
            views: Arc::clone(&views),
        });
        views
    }
}

/// Filter views by title substring (case-insensitive) and by tag set
/// (every filter tag must appear on the note). Both predicates are
/// conjunctive; an empty query or empty tag set passes everything.
pub fn filter_views(views: &[ViewNote], title_query: &str, tag_filter: &[Uuid]) -> Vec<ViewNote> {
    let query = title_query.to_lowercase();

    views
        .iter()
        .filter(|view| {
            (query.is_empty() || view.title.to_lowercase().contains(&query))
                && (tag_filter.is_empty()
                    || tag_filter
                        .iter()
                        .all(|id| view.tags.iter().any(|tag| tag.id == *id)))
        })
        .cloned()
        .collect()
}
