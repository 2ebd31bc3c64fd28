//! JSON persistence for [`AppDocument`].
//!
//! The whole document is rewritten on every save. Reading never fails
//! outward: anything unexpected in the file degrades to empty lists, field by
//! field, and writing failures are logged and swallowed.

use crate::document::AppDocument;
use crate::error::{DaybookError, Result};
use crate::note::{NoteItem, NoteList, DEFAULT_NOTE_TITLE};
use crate::todo::{TodoItem, TodoList};
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const DEFAULT_DATA_FILE: &str = "app_data.json";

#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_FILE)
    }
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the backing file, falling back to an empty document on any
    /// failure.
    pub fn load(&self) -> AppDocument {
        match self.read_document() {
            Ok(Some(doc)) => {
                debug!(
                    "event=load status=ok path={} todos={} notes={}",
                    self.path.display(),
                    doc.todos.len(),
                    doc.notes.len()
                );
                doc
            }
            Ok(None) => {
                debug!(
                    "event=load status=missing path={}",
                    self.path.display()
                );
                AppDocument::default()
            }
            Err(err) => {
                warn!(
                    "event=load status=defaulted path={} error={}",
                    self.path.display(),
                    err
                );
                AppDocument::default()
            }
        }
    }

    /// Overwrites the backing file with the full document. Errors are logged,
    /// never returned.
    pub fn save(&self, doc: &AppDocument) {
        if let Err(err) = self.write_document(doc) {
            error!(
                "event=save status=error path={} error={}",
                self.path.display(),
                err
            );
        }
    }

    /// `Ok(None)` means the file does not exist.
    pub fn read_document(&self) -> Result<Option<AppDocument>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value: Value = serde_json::from_str(&data)?;
        Ok(Some(decode_document(&value)))
    }

    pub fn write_document(&self, doc: &AppDocument) -> Result<()> {
        let text = serde_json::to_string_pretty(&encode_document(doc))?;
        fs::write(&self.path, text).map_err(DaybookError::from)
    }
}

/// Builds a document from arbitrary JSON. `todos` and `notes` are defaulted
/// independently of each other.
pub fn decode_document(value: &Value) -> AppDocument {
    let Some(root) = value.as_object() else {
        warn!("event=decode status=defaulted reason=top_level_not_object");
        return AppDocument::default();
    };

    let todos = match entries(root, "todos") {
        Some(list) => list.iter().filter_map(decode_todo).collect::<Vec<_>>(),
        None => Vec::new(),
    };
    let notes = match entries(root, "notes") {
        Some(list) => list.iter().filter_map(decode_note).collect::<Vec<_>>(),
        None => Vec::new(),
    };

    AppDocument::new(TodoList::from_items(todos), NoteList::from_items(notes))
}

fn entries<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    match root.get(key) {
        None => None,
        Some(Value::Array(list)) => Some(list),
        Some(_) => {
            warn!("event=decode status=defaulted field={key} reason=not_a_list");
            None
        }
    }
}

fn decode_todo(entry: &Value) -> Option<TodoItem> {
    let decoded = entry.as_object().and_then(|obj| {
        let text = obj.get("task").map_or(Some(""), Value::as_str)?;
        let completed = obj.get("completed").map_or(Some(false), Value::as_bool)?;
        Some(TodoItem {
            text: text.to_string(),
            completed,
        })
    });
    if decoded.is_none() {
        warn!("event=decode status=skipped field=todos entry={entry}");
    }
    decoded
}

fn decode_note(entry: &Value) -> Option<NoteItem> {
    // Older files stored bare values in `notes`; each one stands for an empty note.
    let Some(obj) = entry.as_object() else {
        return Some(NoteItem::default());
    };
    let title = obj.get("title").map_or(Some(DEFAULT_NOTE_TITLE), Value::as_str);
    let content = obj.get("content").map_or(Some(""), Value::as_str);
    match (title, content) {
        (Some(title), Some(content)) => Some(NoteItem::new(title, content)),
        _ => {
            warn!("event=decode status=skipped field=notes entry={entry}");
            None
        }
    }
}

/// On-disk shape, `todos` first.
#[derive(Debug, Serialize)]
pub struct EncodedDocument {
    pub todos: Vec<Value>,
    pub notes: Vec<Value>,
}

/// Encodes every item separately so one bad entry only drops itself.
pub fn encode_document(doc: &AppDocument) -> EncodedDocument {
    EncodedDocument {
        todos: encode_items("todos", doc.todos.items()),
        notes: encode_items("notes", doc.notes.items()),
    }
}

fn encode_items<T: Serialize>(field: &str, items: &[T]) -> Vec<Value> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::to_value(item) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("event=encode status=skipped field={field} index={index} error={err}");
                None
            }
        })
        .collect()
}
