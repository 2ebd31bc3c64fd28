use crate::note::NoteList;
use crate::todo::TodoList;
use serde::{Deserialize, Serialize};

/// Everything that is persisted. Timer state is deliberately absent.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppDocument {
    pub todos: TodoList,
    pub notes: NoteList,
}

impl AppDocument {
    pub fn new(todos: TodoList, notes: NoteList) -> Self {
        Self { todos, notes }
    }
}
