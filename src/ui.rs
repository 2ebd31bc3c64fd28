use crate::app::App;
use crate::timer::TimerPhase;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::{io, time::Duration};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TAB_TITLES: [&str; 3] = ["Todo", "Time", "Notes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Todo,
    Time,
    Notes,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Tab::Todo => 0,
            Tab::Time => 1,
            Tab::Notes => 2,
        }
    }

    fn from_index(index: usize) -> Self {
        match index % TAB_TITLES.len() {
            0 => Tab::Todo,
            1 => Tab::Time,
            _ => Tab::Notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    AddTodo,
    EditTodo(usize),
    EditNoteTitle(usize),
    EditNoteContent(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Presentation-only state: which tab, which row, and the text being typed.
#[derive(Debug)]
pub struct UiState {
    pub tab: Tab,
    pub mode: Mode,
    pub input: String,
    pub selected_todo: usize,
    pub selected_note: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: Tab::Todo,
            mode: Mode::Normal,
            input: String::new(),
            selected_todo: 0,
            selected_note: 0,
        }
    }
}

impl UiState {
    fn clamp_selection(&mut self, app: &App) {
        self.selected_todo = self.selected_todo.min(app.todos().len().saturating_sub(1));
        self.selected_note = self.selected_note.min(app.notes().len().saturating_sub(1));
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let mut state = UiState::default();
    loop {
        app.pump_timer_updates();
        terminal.draw(|f| draw(f, app, &state))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, &mut state, key) == Flow::Quit {
                return Ok(());
            }
        }
    }
}

pub fn handle_key(app: &mut App, state: &mut UiState, key: KeyEvent) -> Flow {
    let flow = match state.mode {
        Mode::Normal => handle_normal_key(app, state, key),
        _ => {
            handle_input_key(app, state, key);
            Flow::Continue
        }
    };
    state.clamp_selection(app);
    flow
}

fn handle_normal_key(app: &mut App, state: &mut UiState, key: KeyEvent) -> Flow {
    match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Tab => state.tab = Tab::from_index(state.tab.index() + 1),
        KeyCode::BackTab => state.tab = Tab::from_index(state.tab.index() + TAB_TITLES.len() - 1),
        KeyCode::Char('1') => state.tab = Tab::Todo,
        KeyCode::Char('2') => state.tab = Tab::Time,
        KeyCode::Char('3') => state.tab = Tab::Notes,
        _ => match state.tab {
            Tab::Todo => handle_todo_key(app, state, key.code),
            Tab::Time => handle_time_key(app, key.code),
            Tab::Notes => handle_notes_key(app, state, key.code),
        },
    }
    Flow::Continue
}

fn handle_todo_key(app: &mut App, state: &mut UiState, code: KeyCode) {
    let selected = state.selected_todo;
    match code {
        KeyCode::Char('a') => begin_input(state, Mode::AddTodo, String::new()),
        KeyCode::Char('e') => {
            if let Some(item) = app.todos().get(selected) {
                let text = item.text.clone();
                begin_input(state, Mode::EditTodo(selected), text);
            }
        }
        KeyCode::Char(' ') => {
            app.toggle_todo(selected);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.delete_todo(selected);
        }
        KeyCode::Up => state.selected_todo = selected.saturating_sub(1),
        KeyCode::Down => state.selected_todo = selected + 1,
        _ => {}
    }
}

fn handle_time_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('s') => {
            app.start_timer();
        }
        KeyCode::Char('x') => {
            app.stop_timer();
        }
        KeyCode::Char('r') => app.reset_timer(),
        _ => {}
    }
}

fn handle_notes_key(app: &mut App, state: &mut UiState, code: KeyCode) {
    let selected = state.selected_note;
    match code {
        KeyCode::Char('a') => state.selected_note = app.add_note(),
        KeyCode::Char('t') => {
            if let Some(note) = app.notes().get(selected) {
                let title = note.title.clone();
                begin_input(state, Mode::EditNoteTitle(selected), title);
            }
        }
        KeyCode::Char('c') | KeyCode::Enter => {
            if let Some(note) = app.notes().get(selected) {
                let content = note.content.clone();
                begin_input(state, Mode::EditNoteContent(selected), content);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.delete_note(selected);
        }
        KeyCode::Up => state.selected_note = selected.saturating_sub(1),
        KeyCode::Down => state.selected_note = selected + 1,
        _ => {}
    }
}

fn begin_input(state: &mut UiState, mode: Mode, initial: String) {
    state.mode = mode;
    state.input = initial;
}

fn handle_input_key(app: &mut App, state: &mut UiState, key: KeyEvent) {
    let multiline = matches!(state.mode, Mode::EditNoteContent(_));
    let commit_content = multiline
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == KeyCode::Char('s');
    match key.code {
        _ if commit_content => commit_input(app, state),
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            state.input.clear();
        }
        KeyCode::Enter if multiline => state.input.push('\n'),
        KeyCode::Enter => commit_input(app, state),
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char(c) => state.input.push(c),
        _ => {}
    }
}

fn commit_input(app: &mut App, state: &mut UiState) {
    let text = std::mem::take(&mut state.input);
    match state.mode {
        Mode::AddTodo => {
            if app.add_todo(&text) {
                state.selected_todo = app.todos().len() - 1;
            }
        }
        Mode::EditTodo(index) => {
            app.edit_todo(index, &text);
        }
        Mode::EditNoteTitle(index) => {
            app.edit_note_title(index, &text);
        }
        Mode::EditNoteContent(index) => {
            app.edit_note_content(index, &text);
        }
        Mode::Normal => {}
    }
    state.mode = Mode::Normal;
}

pub fn draw(f: &mut Frame, app: &App, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let tabs = Tabs::new(TAB_TITLES.to_vec())
        .block(Block::default().title("Daybook").borders(Borders::ALL))
        .select(state.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        Tab::Todo => draw_todos(f, app, state, chunks[1]),
        Tab::Time => draw_timer(f, app, chunks[1]),
        Tab::Notes => draw_notes(f, app, state, chunks[1]),
    }

    draw_footer(f, app, state, chunks[2]);
}

fn draw_todos(f: &mut Frame, app: &App, state: &UiState, area: Rect) {
    let items: Vec<ListItem> = app
        .todos()
        .items()
        .iter()
        .map(|t| {
            let (mark, style) = if t.completed {
                (
                    "[x] ",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ] ", Style::default().fg(Color::White))
            };
            ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::styled(t.text.as_str(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Todo").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !app.todos().is_empty() {
        list_state.select(Some(state.selected_todo));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_timer(f: &mut Frame, app: &App, area: Rect) {
    let status = match app.timer_phase() {
        TimerPhase::Idle => "idle",
        TimerPhase::Running => "running",
        TimerPhase::Stopped => "stopped",
    };
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            app.time_display(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(status),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().title("Time Tracker").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_notes(f: &mut Frame, app: &App, state: &UiState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let titles: Vec<ListItem> = app
        .notes()
        .items()
        .iter()
        .map(|n| ListItem::new(n.title.as_str()))
        .collect();
    let list = List::new(titles)
        .block(Block::default().title("Notes").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if !app.notes().is_empty() {
        list_state.select(Some(state.selected_note));
    }
    f.render_stateful_widget(list, columns[0], &mut list_state);

    let (title, body) = match (state.mode, app.notes().get(state.selected_note)) {
        (Mode::EditNoteContent(_), Some(note)) => (note.title.as_str(), state.input.as_str()),
        (_, Some(note)) => (note.title.as_str(), note.content.as_str()),
        (_, None) => ("", ""),
    };
    let content = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(content, columns[1]);
}

fn draw_footer(f: &mut Frame, app: &App, state: &UiState, area: Rect) {
    let (title, text) = match state.mode {
        Mode::AddTodo => ("New task (Enter to add, Esc to cancel)", state.input.clone()),
        Mode::EditTodo(_) => ("Edit task (Enter to save, Esc to cancel)", state.input.clone()),
        Mode::EditNoteTitle(_) => ("Note title (Enter to save, Esc to cancel)", state.input.clone()),
        Mode::EditNoteContent(_) => (
            "Note content (Ctrl+S to save, Esc to cancel)",
            state.input.lines().last().unwrap_or_default().to_string(),
        ),
        Mode::Normal => ("Keys", help_line(app, state.tab)),
    };
    let footer = Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn help_line(app: &App, tab: Tab) -> String {
    let tab_help = match tab {
        Tab::Todo => "a add  e edit  space toggle  d delete".to_string(),
        Tab::Time => {
            if app.timer_phase() == TimerPhase::Running {
                "x stop  r reset".to_string()
            } else {
                "s start  r reset".to_string()
            }
        }
        Tab::Notes => "a add  t title  c content  d delete".to_string(),
    };
    format!("{tab_help}  |  tab switch  q quit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::timer::SystemClock;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> App {
        App::new(
            Storage::new(dir.path().join("app_data.json")),
            Arc::new(SystemClock),
            Duration::from_secs(1),
        )
    }

    fn press(app: &mut App, state: &mut UiState, code: KeyCode) -> Flow {
        handle_key(app, state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, state: &mut UiState, text: &str) {
        for c in text.chars() {
            press(app, state, KeyCode::Char(c));
        }
    }

    fn screen(app: &App, state: &UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, app, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn typing_a_task_adds_it() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let mut state = UiState::default();

        press(&mut app, &mut state, KeyCode::Char('a'));
        assert_eq!(state.mode, Mode::AddTodo);
        type_text(&mut app, &mut state, "buy milk");
        press(&mut app, &mut state, KeyCode::Enter);

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(app.todos().items()[0].text, "buy milk");
        assert!(screen(&app, &state).contains("[ ] buy milk"));
    }

    #[test]
    fn escape_cancels_without_saving() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let mut state = UiState::default();

        press(&mut app, &mut state, KeyCode::Char('a'));
        type_text(&mut app, &mut state, "nope");
        press(&mut app, &mut state, KeyCode::Esc);

        assert!(app.todos().is_empty());
        assert!(!app.storage().path().exists());
    }

    #[test]
    fn note_content_takes_newlines_until_ctrl_s() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let mut state = UiState::default();

        press(&mut app, &mut state, KeyCode::Char('3'));
        press(&mut app, &mut state, KeyCode::Char('a'));
        press(&mut app, &mut state, KeyCode::Char('c'));
        type_text(&mut app, &mut state, "one");
        press(&mut app, &mut state, KeyCode::Enter);
        type_text(&mut app, &mut state, "two");
        handle_key(
            &mut app,
            &mut state,
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
        );

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(app.notes().items()[0].content, "one\ntwo");
        assert_eq!(app.storage().load().notes.items()[0].content, "one\ntwo");
    }

    #[test]
    fn selection_follows_deletes() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let mut state = UiState::default();
        app.add_todo("a");
        app.add_todo("b");

        press(&mut app, &mut state, KeyCode::Down);
        assert_eq!(state.selected_todo, 1);
        press(&mut app, &mut state, KeyCode::Down);
        assert_eq!(state.selected_todo, 1);
        press(&mut app, &mut state, KeyCode::Char('d'));
        assert_eq!(state.selected_todo, 0);
        assert_eq!(app.todos().items()[0].text, "a");
    }

    #[test]
    fn time_tab_shows_display_and_quit_ends_loop() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let mut state = UiState::default();

        press(&mut app, &mut state, KeyCode::Tab);
        assert_eq!(state.tab, Tab::Time);
        assert!(screen(&app, &state).contains("00:00:00"));
        assert_eq!(press(&mut app, &mut state, KeyCode::Char('q')), Flow::Quit);
    }
}
