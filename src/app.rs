//! Application state owned by the UI shell.
//!
//! Every mutating operation on todos or notes saves the whole document before
//! returning. The stopwatch is shared with its refresh thread through a single
//! mutex; display strings come back over a channel and are applied here only.

use crate::document::AppDocument;
use crate::note::NoteList;
use crate::storage::Storage;
use crate::timer::{format_hms, lock_timer, Clock, SharedTimer, Ticker, Timer, TimerPhase};
use crate::todo::TodoList;
use log::debug;
use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex,
    },
    time::Duration,
};

pub struct App {
    document: AppDocument,
    storage: Storage,
    timer: SharedTimer,
    clock: Arc<dyn Clock>,
    tick_period: Duration,
    updates_tx: Sender<String>,
    updates_rx: Receiver<String>,
    time_display: String,
}

impl App {
    /// Loads the persisted document once and builds the state around it.
    pub fn new(storage: Storage, clock: Arc<dyn Clock>, tick_period: Duration) -> Self {
        let document = storage.load();
        let (updates_tx, updates_rx) = mpsc::channel();
        Self {
            document,
            storage,
            timer: Arc::new(Mutex::new(Timer::new())),
            clock,
            tick_period,
            updates_tx,
            updates_rx,
            time_display: format_hms(0),
        }
    }

    pub fn document(&self) -> &AppDocument {
        &self.document
    }

    pub fn todos(&self) -> &TodoList {
        &self.document.todos
    }

    pub fn notes(&self) -> &NoteList {
        &self.document.notes
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn persist(&self) {
        self.storage.save(&self.document);
    }

    fn persist_if(&self, changed: bool) -> bool {
        if changed {
            self.persist();
        }
        changed
    }

    pub fn add_todo(&mut self, text: &str) -> bool {
        let added = self.document.todos.add(text);
        if !added {
            debug!("event=todo_add status=ignored reason=blank");
        }
        self.persist_if(added)
    }

    pub fn toggle_todo(&mut self, index: usize) -> bool {
        let changed = self.document.todos.toggle(index);
        self.persist_if(changed)
    }

    pub fn edit_todo(&mut self, index: usize, new_text: &str) -> bool {
        let changed = self.document.todos.edit(index, new_text);
        self.persist_if(changed)
    }

    pub fn delete_todo(&mut self, index: usize) -> bool {
        let changed = self.document.todos.delete(index).is_some();
        self.persist_if(changed)
    }

    pub fn add_note(&mut self) -> usize {
        let index = self.document.notes.add();
        self.persist();
        index
    }

    pub fn edit_note_title(&mut self, index: usize, title: &str) -> bool {
        let changed = self.document.notes.edit_title(index, title);
        self.persist_if(changed)
    }

    pub fn edit_note_content(&mut self, index: usize, content: &str) -> bool {
        let changed = self.document.notes.edit_content(index, content);
        self.persist_if(changed)
    }

    pub fn delete_note(&mut self, index: usize) -> bool {
        let changed = self.document.notes.delete(index).is_some();
        self.persist_if(changed)
    }

    pub fn timer_phase(&self) -> TimerPhase {
        lock_timer(&self.timer).phase()
    }

    pub fn accumulated_seconds(&self) -> u64 {
        lock_timer(&self.timer).accumulated_seconds()
    }

    pub fn time_display(&self) -> &str {
        &self.time_display
    }

    /// Starts the stopwatch and a fresh refresh loop for this run.
    pub fn start_timer(&mut self) -> bool {
        let generation = {
            let mut timer = lock_timer(&self.timer);
            if !timer.start(self.clock.now()) {
                return false;
            }
            timer.generation()
        };
        Ticker::new(
            Arc::clone(&self.timer),
            Arc::clone(&self.clock),
            self.tick_period,
            self.updates_tx.clone(),
        )
        .spawn(generation);
        true
    }

    pub fn stop_timer(&mut self) -> bool {
        let mut timer = lock_timer(&self.timer);
        if !timer.stop(self.clock.now()) {
            return false;
        }
        while self.updates_rx.try_recv().is_ok() {}
        self.time_display = format_hms(timer.accumulated_seconds());
        true
    }

    pub fn reset_timer(&mut self) {
        let mut timer = lock_timer(&self.timer);
        timer.reset();
        while self.updates_rx.try_recv().is_ok() {}
        self.time_display = format_hms(0);
    }

    /// Applies pending refresh-loop updates; returns whether the display
    /// changed.
    pub fn pump_timer_updates(&mut self) -> bool {
        let mut changed = false;
        while let Ok(display) = self.updates_rx.try_recv() {
            changed |= display != self.time_display;
            self.time_display = display;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> (App, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let storage = Storage::new(dir.path().join("app_data.json"));
        let app = App::new(storage, clock.clone(), Duration::from_millis(5));
        (app, clock)
    }

    #[test]
    fn every_todo_mutation_is_saved() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_in(&dir);

        assert!(app.add_todo("write report"));
        assert_eq!(app.storage().load().todos.len(), 1);

        assert!(app.toggle_todo(0));
        assert!(app.storage().load().todos.items()[0].completed);

        assert!(app.edit_todo(0, "write final report"));
        assert_eq!(
            app.storage().load().todos.items()[0].text,
            "write final report"
        );

        assert!(app.delete_todo(0));
        assert!(app.storage().load().todos.is_empty());
    }

    #[test]
    fn blank_todo_does_not_touch_the_file() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_in(&dir);

        assert!(!app.add_todo("   "));
        assert!(!app.storage().path().exists());
    }

    #[test]
    fn note_edits_save_whole_document() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_in(&dir);
        app.add_todo("keep me");

        let index = app.add_note();
        app.edit_note_title(index, "ideas");
        app.edit_note_content(index, "line one\nline two");

        let saved = app.storage().load();
        assert_eq!(saved.todos.len(), 1);
        assert_eq!(saved.notes.items()[0].title, "ideas");
        assert_eq!(saved.notes.items()[0].content, "line one\nline two");

        assert!(app.delete_note(index));
        assert!(app.storage().load().notes.is_empty());
        assert!(!app.delete_note(index));
    }

    #[test]
    fn stop_shows_accumulated_time() {
        let dir = TempDir::new().unwrap();
        let (mut app, clock) = app_in(&dir);

        assert!(app.start_timer());
        assert!(!app.start_timer());
        clock.advance_secs(3);
        assert!(app.stop_timer());

        assert_eq!(app.accumulated_seconds(), 3);
        assert_eq!(app.time_display(), "00:00:03");
        assert_eq!(app.timer_phase(), TimerPhase::Stopped);
        assert!(!app.pump_timer_updates());
    }

    #[test]
    fn refresh_loop_updates_display_while_running() {
        let dir = TempDir::new().unwrap();
        let (mut app, clock) = app_in(&dir);

        app.start_timer();
        clock.advance_secs(61);
        let mut display = String::new();
        for _ in 0..400 {
            app.pump_timer_updates();
            display = app.time_display().to_string();
            if display == "00:01:01" {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(display, "00:01:01");
        assert_eq!(app.accumulated_seconds(), 0);

        app.reset_timer();
        assert_eq!(app.time_display(), "00:00:00");
        assert_eq!(app.accumulated_seconds(), 0);
        assert_eq!(app.timer_phase(), TimerPhase::Idle);
    }

    #[test]
    fn timer_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let (mut app, clock) = app_in(&dir);
        app.start_timer();
        clock.advance_secs(10);
        app.stop_timer();
        app.add_todo("x");

        let raw = std::fs::read_to_string(app.storage().path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"todos".to_string()));
        assert!(keys.contains(&"notes".to_string()));
    }
}
