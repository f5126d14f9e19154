mod note;
mod tag;

pub use note::{NoteDraft, StoredNote};
pub use tag::Tag;
