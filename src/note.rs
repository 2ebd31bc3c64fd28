use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTE_TITLE: &str = "New Note";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub title: String,
    pub content: String,
}

impl Default for NoteItem {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
        }
    }
}

impl NoteItem {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct NoteList {
    items: Vec<NoteItem>,
}

impl NoteList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_items(items: Vec<NoteItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[NoteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NoteItem> {
        self.items.get(index)
    }

    /// Appends a `"New Note"` with empty content and returns its index.
    pub fn add(&mut self) -> usize {
        self.items.push(NoteItem::default());
        self.items.len() - 1
    }

    pub fn edit_title(&mut self, index: usize, title: &str) -> bool {
        match self.items.get_mut(index) {
            Some(note) => {
                note.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn edit_content(&mut self, index: usize, content: &str) -> bool {
        match self.items.get_mut(index) {
            Some(note) => {
                note.content = content.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, index: usize) -> Option<NoteItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }
}
