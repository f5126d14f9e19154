use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use uuid::Uuid;

use crate::entity::{NoteDraft, Tag};
use crate::error::{JotterError, Result};
use crate::storage::{Persistence, SqliteKv};
use crate::store::Notebook;
use crate::view::{filter_views, ViewNote};

/// Find the notebook root by looking for .jotter/ or .git/
fn find_notebook_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(".jotter").exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_notebook() -> Result<Notebook<SqliteKv>> {
    let root = find_notebook_root();
    let kv = SqliteKv::open(&root)?;
    Ok(Notebook::open(kv))
}

/// Changes that only landed in memory deserve a heads-up, not a failure.
fn warn_if_memory_only(outcome: Persistence) {
    if !outcome.is_durable() {
        eprintln!(
            "Warning: could not write to the notebook; this change may not survive a restart"
        );
    }
}

fn short(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn resolve_note_id(notebook: &Notebook<SqliteKv>, id: &str) -> Result<Uuid> {
    notebook
        .notes()
        .iter()
        .find(|n| n.id.to_string().starts_with(id))
        .map(|n| n.id)
        .ok_or_else(|| JotterError::NoteNotFound(id.to_string()))
}

fn resolve_tag_id(notebook: &Notebook<SqliteKv>, id: &str) -> Result<Uuid> {
    notebook
        .available_tags()
        .iter()
        .find(|t| t.id.to_string().starts_with(id))
        .map(|t| t.id)
        .ok_or_else(|| JotterError::TagNotFound(id.to_string()))
}

fn read_stdin() -> Result<String> {
    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;
    Ok(body)
}

/// Turn `--tag` labels into full tags, creating unknown ones on the fly
/// (what a note editor does when the user types a new tag name).
fn tags_from_labels(
    notebook: &mut Notebook<SqliteKv>,
    labels: &[String],
) -> (Vec<Tag>, Persistence) {
    let mut tags = Vec::with_capacity(labels.len());
    let mut outcome = Persistence::Durable;
    for label in labels {
        let (tag, tag_outcome) = notebook.find_or_create_tag(label);
        outcome = outcome.and(tag_outcome);
        tags.push(tag);
    }
    (tags, outcome)
}

fn print_view(view: &ViewNote, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("Note ({})", view.id);
        println!("Title: {}", view.title);
        if !view.tags.is_empty() {
            let labels: Vec<&str> = view.tags.iter().map(|t| t.label.as_str()).collect();
            println!("Tags: {}", labels.join(", "));
        }
        if !view.markdown.is_empty() {
            println!("\n{}", view.markdown);
        }
    }
    Ok(())
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let _kv = SqliteKv::init(&root)?;

    println!("Initialized jotter notebook in {}", root.display());
    Ok(())
}

pub fn handle_add(
    title: String,
    markdown: Option<String>,
    stdin: bool,
    tag_labels: Vec<String>,
    json: bool,
) -> Result<()> {
    let mut notebook = open_notebook()?;

    let markdown = match markdown {
        Some(body) => body,
        None if stdin => read_stdin()?,
        None => String::new(),
    };

    let (tags, tags_outcome) = tags_from_labels(&mut notebook, &tag_labels);
    let (id, outcome) = notebook.create_note(NoteDraft {
        title,
        markdown,
        tags,
    });
    warn_if_memory_only(tags_outcome.and(outcome));

    let views = notebook.notes_with_tags();
    let view = views
        .iter()
        .find(|v| v.id == id)
        .expect("created note is in the collection");

    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("Created note ({}) {}", short(&id), view.title);
    }

    Ok(())
}

pub fn handle_list(title: Option<String>, tag_labels: Vec<String>, json: bool) -> Result<()> {
    let mut notebook = open_notebook()?;

    // Filtering by a label nobody has can only come from a typo
    let mut tag_filter = Vec::with_capacity(tag_labels.len());
    for label in &tag_labels {
        let tag = notebook
            .available_tags()
            .iter()
            .find(|t| t.label == *label)
            .ok_or_else(|| JotterError::TagNotFound(label.clone()))?;
        tag_filter.push(tag.id);
    }

    let views = notebook.notes_with_tags();
    let views = filter_views(&views, title.as_deref().unwrap_or(""), &tag_filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else if views.is_empty() {
        println!("No notes found.");
    } else {
        println!("Notes:\n");
        for view in &views {
            if view.tags.is_empty() {
                println!("  ({}) {}", short(&view.id), view.title);
            } else {
                let labels: Vec<&str> = view.tags.iter().map(|t| t.label.as_str()).collect();
                println!(
                    "  ({}) {} [{}]",
                    short(&view.id),
                    view.title,
                    labels.join(", ")
                );
            }
        }
    }

    Ok(())
}

pub fn handle_get(id: String, json: bool) -> Result<()> {
    let mut notebook = open_notebook()?;
    let id = resolve_note_id(&notebook, &id)?;

    let views = notebook.notes_with_tags();
    let view = views
        .iter()
        .find(|v| v.id == id)
        .expect("resolved id is in the collection");

    print_view(view, json)
}

pub fn handle_edit(
    id: String,
    title: Option<String>,
    markdown: Option<String>,
    stdin: bool,
    tag_labels: Vec<String>,
    json: bool,
) -> Result<()> {
    let mut notebook = open_notebook()?;
    let id = resolve_note_id(&notebook, &id)?;

    // The store replaces the whole note, so fill in whatever the user
    // did not override from the current record.
    let current = notebook
        .notes()
        .iter()
        .find(|n| n.id == id)
        .expect("resolved id is in the collection")
        .clone();

    let title = title.unwrap_or_else(|| current.title.clone());
    let markdown = match markdown {
        Some(body) => body,
        None if stdin => read_stdin()?,
        None => current.markdown.clone(),
    };

    let (tags, tags_outcome) = if tag_labels.is_empty() {
        let kept = notebook
            .available_tags()
            .iter()
            .filter(|t| current.tag_ids.contains(&t.id))
            .cloned()
            .collect();
        (kept, Persistence::Durable)
    } else {
        tags_from_labels(&mut notebook, &tag_labels)
    };

    let outcome = notebook.update_note(
        id,
        NoteDraft {
            title,
            markdown,
            tags,
        },
    );
    warn_if_memory_only(tags_outcome.and(outcome));

    let views = notebook.notes_with_tags();
    let view = views
        .iter()
        .find(|v| v.id == id)
        .expect("updated note is in the collection");

    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("Updated note ({}) {}", short(&id), view.title);
    }

    Ok(())
}

pub fn handle_delete(id: String) -> Result<()> {
    let mut notebook = open_notebook()?;
    let id = resolve_note_id(&notebook, &id)?;

    let outcome = notebook.delete_note(id);
    warn_if_memory_only(outcome);

    println!("Deleted note ({})", short(&id));
    Ok(())
}

pub fn handle_tag_list(json: bool) -> Result<()> {
    let notebook = open_notebook()?;
    let tags = notebook.available_tags();

    if json {
        println!("{}", serde_json::to_string_pretty(&**tags)?);
    } else if tags.is_empty() {
        println!("No tags found.");
    } else {
        println!("Tags:\n");
        for tag in tags.iter() {
            println!("  ({}) {}", short(&tag.id), tag.label);
        }
    }

    Ok(())
}

pub fn handle_tag_rename(id: String, label: String) -> Result<()> {
    let mut notebook = open_notebook()?;
    let id = resolve_tag_id(&notebook, &id)?;

    let outcome = notebook.update_tag(id, &label);
    warn_if_memory_only(outcome);

    println!("Renamed tag ({}) to {}", short(&id), label);
    Ok(())
}

pub fn handle_tag_delete(id: String) -> Result<()> {
    let mut notebook = open_notebook()?;
    let id = resolve_tag_id(&notebook, &id)?;

    let outcome = notebook.delete_tag(id);
    warn_if_memory_only(outcome);

    println!("Deleted tag ({})", short(&id));
    Ok(())
}
