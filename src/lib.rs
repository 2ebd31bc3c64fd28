pub mod app;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod note;
pub mod storage;
pub mod timer;
pub mod todo;
pub mod ui;

pub use app::App;
pub use document::AppDocument;
pub use error::DaybookError;
pub use note::{NoteItem, NoteList};
pub use storage::Storage;
pub use timer::{format_hms, Clock, SystemClock, Ticker, Timer, TimerPhase};
pub use todo::{TodoItem, TodoList};
