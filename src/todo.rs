use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoItem {
    #[serde(rename = "task")]
    pub text: String,
    pub completed: bool,
}

impl TodoItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Ordered todo list. Items are addressed by position; order is what gets
/// persisted.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_items(items: Vec<TodoItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TodoItem> {
        self.items.get(index)
    }

    /// Appends a new incomplete item. Blank text is ignored and `false` is
    /// returned.
    pub fn add(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.items.push(TodoItem::new(text));
        true
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.completed = !item.completed;
                true
            }
            None => false,
        }
    }

    pub fn edit(&mut self, index: usize, new_text: &str) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.text = new_text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, index: usize) -> Option<TodoItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &TodoList) -> Vec<&str> {
        list.items().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn add_appends_incomplete_item() {
        let mut list = TodoList::new();
        assert!(list.add("buy milk"));
        assert!(list.add("call mom"));

        assert_eq!(texts(&list), vec!["buy milk", "call mom"]);
        assert!(!list.items()[1].completed);
    }

    #[test]
    fn add_ignores_blank_text() {
        let mut list = TodoList::new();
        assert!(!list.add(""));
        assert!(!list.add("   "));
        assert!(list.is_empty());
    }

    #[test]
    fn toggle_flips_completion() {
        let mut list = TodoList::from_items(vec![TodoItem::new("a")]);
        assert!(list.toggle(0));
        assert!(list.items()[0].completed);
        assert!(list.toggle(0));
        assert!(!list.items()[0].completed);
        assert!(!list.toggle(5));
    }

    #[test]
    fn edit_keeps_position_of_all_items() {
        let mut list = TodoList::from_items(vec![
            TodoItem::new("A"),
            TodoItem::new("B"),
            TodoItem::new("C"),
        ]);
        assert!(list.edit(1, "B2"));
        assert_eq!(texts(&list), vec!["A", "B2", "C"]);
    }

    #[test]
    fn delete_shifts_following_items() {
        let mut list = TodoList::from_items(vec![
            TodoItem::new("A"),
            TodoItem::new("B"),
            TodoItem::new("C"),
        ]);
        let removed = list.delete(0);
        assert_eq!(removed.map(|t| t.text), Some("A".to_string()));
        assert_eq!(texts(&list), vec!["B", "C"]);
        assert!(list.delete(2).is_none());
    }

    #[test]
    fn serializes_text_as_task_field() {
        let item = TodoItem {
            text: "x".to_string(),
            completed: true,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, serde_json::json!({"task": "x", "completed": true}));
    }
}
