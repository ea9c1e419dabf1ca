//! Terminal user interface for Gono.
//!
//! [`App`] holds the session plus widget state (list selection, prompt input,
//! editor buffer) and turns key presses into session intents. [`TuiApp`]
//! owns the terminal and draws the session's [`View`] every frame.

use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tui_textarea::TextArea;
use vault_core::{
    DeleteTarget, FileRow, Flow, Intent, Session, StateKind, Status, StatusKind, VaultListRow,
    View, ViewBody, ViewState,
};

/// Terminals narrower than this get the compact key hints.
const COMPACT_WIDTH: u16 = 72;

/// What a key press means on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    MoveUp,
    MoveDown,
    Select,
    Delete,
    CreateVault,
    OpenByPath,
    OpenViaPicker,
    CreateFile,
    CreateDirectory,
    Parent,
    Submit,
    Save,
    Confirm,
    Decline,
    Cancel,
    /// Forward the key to the focused text widget.
    Edit(KeyEvent),
    Ignore,
}

/// Map a key press to an action for a screen of kind `kind`.
pub fn map_key(kind: StateKind, key: KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match kind {
        StateKind::VaultSelect | StateKind::FileList => map_list_key(kind, key.code, ctrl),
        StateKind::Editor => match key.code {
            KeyCode::Char('s') if ctrl => KeyAction::Save,
            KeyCode::Esc => KeyAction::Cancel,
            _ => KeyAction::Edit(key),
        },
        StateKind::ConfirmDelete => match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Char('n' | 'N') | KeyCode::Esc => KeyAction::Decline,
            _ => KeyAction::Ignore,
        },
        StateKind::VaultCreate
        | StateKind::VaultOpenByPath
        | StateKind::FileCreate
        | StateKind::DirectoryCreate => match key.code {
            KeyCode::Enter => KeyAction::Submit,
            KeyCode::Esc => KeyAction::Cancel,
            _ => KeyAction::Edit(key),
        },
    }
}

fn map_list_key(kind: StateKind, code: KeyCode, ctrl: bool) -> KeyAction {
    let in_vaults = kind == StateKind::VaultSelect;
    match code {
        KeyCode::Up => KeyAction::MoveUp,
        KeyCode::Down => KeyAction::MoveDown,
        KeyCode::Enter => KeyAction::Select,
        KeyCode::Char('x') if ctrl => KeyAction::Delete,
        KeyCode::Char('n') if ctrl && in_vaults => KeyAction::CreateVault,
        KeyCode::Char('n') if ctrl => KeyAction::CreateFile,
        KeyCode::Char('o') if ctrl && in_vaults => KeyAction::OpenByPath,
        KeyCode::Char('p') if ctrl && in_vaults => KeyAction::OpenViaPicker,
        KeyCode::Char('d') if ctrl && !in_vaults => KeyAction::CreateDirectory,
        KeyCode::Backspace if !in_vaults => KeyAction::Parent,
        KeyCode::Esc if !in_vaults => KeyAction::Cancel,
        _ => KeyAction::Ignore,
    }
}

/// Session plus the widget state the terminal needs between frames.
pub struct App {
    session: Session,
    /// Selected row of the vault or file list.
    list_state: ListState,
    /// Single-line prompt input.
    input: TextArea<'static>,
    /// Note being edited.
    editor: TextArea<'static>,
    /// Screen the text widgets were last prepared for.
    shown: Option<StateKind>,
    /// List (and directory) the selection belongs to.
    list_key: Option<(StateKind, Option<PathBuf>)>,
    should_quit: bool,
}

impl App {
    /// Wrap a session.
    pub fn new(session: Session) -> Self {
        let mut app = Self {
            session,
            list_state: ListState::default(),
            input: TextArea::default(),
            editor: TextArea::default(),
            shown: None,
            list_key: None,
            should_quit: false,
        };
        app.sync();
        app
    }

    /// Returns the wrapped session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the selected list row.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Returns the prompt input text.
    pub fn input_text(&self) -> String {
        self.input.lines().join("")
    }

    /// Returns the editor text.
    pub fn editor_text(&self) -> String {
        self.editor.lines().join("\n")
    }

    /// Returns whether the app should exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Handles a keyboard event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let intent = match map_key(self.session.state().kind(), key) {
            KeyAction::Quit => Some(Intent::Quit),
            KeyAction::MoveUp => {
                self.select_prev();
                None
            }
            KeyAction::MoveDown => {
                self.select_next();
                None
            }
            KeyAction::Select => self.list_state.selected().map(Intent::Select),
            KeyAction::Delete => self.list_state.selected().map(Intent::Delete),
            KeyAction::CreateVault => Some(Intent::CreateVault),
            KeyAction::OpenByPath => Some(Intent::OpenByPath),
            KeyAction::OpenViaPicker => Some(Intent::OpenViaPicker),
            KeyAction::CreateFile => Some(Intent::CreateFile),
            KeyAction::CreateDirectory => Some(Intent::CreateDirectory),
            KeyAction::Parent => Some(Intent::Parent),
            KeyAction::Submit => Some(Intent::Submit(self.input_text())),
            KeyAction::Save => Some(Intent::Save(self.editor_text())),
            KeyAction::Confirm => Some(Intent::Confirm),
            KeyAction::Decline => Some(Intent::Decline),
            KeyAction::Cancel => Some(Intent::Cancel),
            KeyAction::Edit(key) => {
                if self.session.state().kind() == StateKind::Editor {
                    self.editor.input(key);
                } else {
                    self.input.input(key);
                }
                None
            }
            KeyAction::Ignore => None,
        };

        if let Some(intent) = intent {
            self.dispatch(intent);
        }
    }

    /// Send an intent to the session and refresh widget state.
    pub fn dispatch(&mut self, intent: Intent) {
        if self.session.dispatch(intent) == Flow::Quit {
            self.should_quit = true;
        }
        self.sync();
    }

    /// Moves selection down in the current list.
    pub fn select_next(&mut self) {
        let len = list_len(self.session.state());
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Moves selection up in the current list.
    pub fn select_prev(&mut self) {
        let len = list_len(self.session.state());
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Bring widgets in line with the session state after an intent.
    fn sync(&mut self) {
        let kind = self.session.state().kind();

        if kind.is_list() {
            let key = (
                kind,
                self.session.current_directory().map(Path::to_path_buf),
            );
            let reset = self.list_key.as_ref() != Some(&key);
            clamp_selection(
                &mut self.list_state,
                list_len(self.session.state()),
                reset,
            );
            self.list_key = Some(key);
        } else if self.shown != Some(kind) {
            match self.session.view().body {
                ViewBody::Prompt { placeholder } => self.input = prompt_area(placeholder),
                ViewBody::Editor { buffer } => self.editor = editor_area(buffer),
                _ => {}
            }
        }

        self.shown = Some(kind);
    }
}

fn list_len(state: &ViewState) -> usize {
    match state {
        ViewState::VaultSelect { rows } => rows.len(),
        ViewState::FileList { rows } => rows.len(),
        _ => 0,
    }
}

fn clamp_selection(state: &mut ListState, len: usize, reset: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let index = if reset {
        0
    } else {
        state.selected().unwrap_or(0).min(len - 1)
    };
    state.select(Some(index));
}

fn prompt_area(placeholder: &str) -> TextArea<'static> {
    let mut area = TextArea::default();
    area.set_placeholder_text(placeholder);
    area.set_cursor_line_style(Style::default());
    area.set_block(Block::default().borders(Borders::ALL));
    area
}

fn editor_area(buffer: &str) -> TextArea<'static> {
    // Split on '\n' so a trailing newline survives the round trip.
    let mut area = TextArea::new(buffer.split('\n').map(String::from).collect());
    area.set_cursor_line_style(Style::default());
    area.set_line_number_style(Style::default().fg(Color::DarkGray));
    area.set_block(Block::default().borders(Borders::ALL));
    area
}

/// Format a file's modification time for the file list.
pub fn format_modified(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    format!("Modified: {}", local.format("%d %b %H:%M"))
}

fn file_row_description(row: &FileRow) -> String {
    match row {
        FileRow::Parent(_) => "Parent directory".to_string(),
        FileRow::Entry(entry) if entry.is_directory => "Directory".to_string(),
        FileRow::Entry(entry) => entry.modified.map(format_modified).unwrap_or_default(),
    }
}

fn status_style(kind: StatusKind) -> Style {
    match kind {
        StatusKind::Info => Style::default().fg(Color::Gray),
        StatusKind::Success => Style::default().fg(Color::Green),
        StatusKind::Warning => Style::default().fg(Color::Yellow),
        StatusKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// The terminal front end.
pub struct TuiApp {
    /// The terminal backend.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    app: App,
}

impl TuiApp {
    /// Take over the terminal for `session`.
    pub fn new(session: Session) -> io::Result<Self> {
        enable_raw_mode()?;
        // Drop never runs if construction fails, so undo raw mode here.
        let terminal = undo_on_error(
            || {
                let mut stdout = io::stdout();
                execute!(stdout, EnterAlternateScreen)?;
                Terminal::new(CrosstermBackend::new(stdout))
            },
            || {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
            },
        )?;

        Ok(Self {
            terminal,
            app: App::new(session),
        })
    }

    /// Draws the TUI.
    pub fn draw(&mut self) -> io::Result<()> {
        let app = &mut self.app;
        self.terminal.draw(|frame| render_frame(frame, app))?;
        Ok(())
    }

    /// Runs the event loop until the user quits.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.draw()?;

            if let Event::Key(key) = event::read()? {
                self.app.handle_key(key);
            }

            if self.app.should_quit() {
                break;
            }
        }

        tracing::info!("Leaving the TUI");
        Ok(())
    }

    /// Restores the terminal to its original state.
    pub fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Run `setup`, calling `undo` if it fails.
fn undo_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce(),
) -> io::Result<T> {
    setup().inspect_err(|_| undo())
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Renders the entire frame.
fn render_frame(frame: &mut Frame, app: &mut App) {
    let App {
        session,
        list_state,
        input,
        editor,
        ..
    } = app;
    let view = session.view();
    let size = frame.area();

    let hints = if size.width < COMPACT_WIDTH {
        view.compact_hints
    } else {
        view.hints
    };
    let hint_height = hints.lines().count().max(1) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // Title and subtitle
            Constraint::Min(0),              // Body
            Constraint::Length(1),           // Status
            Constraint::Length(hint_height), // Key hints
        ])
        .split(size);

    render_header(frame, chunks[0], &view);

    match view.body {
        ViewBody::Vaults(rows) => render_vaults(frame, chunks[1], rows, list_state),
        ViewBody::Files(rows) => render_files(frame, chunks[1], rows, list_state),
        ViewBody::Prompt { .. } => {
            let area = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(chunks[1])[0];
            frame.render_widget(&*input, area);
        }
        ViewBody::Editor { .. } => frame.render_widget(&*editor, chunks[1]),
        ViewBody::Confirm { target } => render_confirm(frame, chunks[1], target),
    }

    render_status(frame, chunks[2], view.status);

    let hints = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let header = Paragraph::new(Line::from(Span::styled(
        view.subtitle.as_str(),
        Style::default().fg(Color::Gray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.title))
            .title_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
    );
    frame.render_widget(header, area);
}

fn render_vaults(frame: &mut Frame, area: Rect, rows: &[VaultListRow], list_state: &mut ListState) {
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let title_style = match row {
                VaultListRow::ExistingVault(_) => Style::default().fg(Color::Cyan),
                _ => Style::default().fg(Color::Green),
            };
            ListItem::new(vec![
                Line::from(Span::styled(row.title(), title_style)),
                Line::from(Span::styled(
                    row.description(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let vault_count = rows.iter().filter(|r| r.vault_path().is_some()).count();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Vaults ({}) ", vault_count)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn render_files(frame: &mut Frame, area: Rect, rows: &[FileRow], list_state: &mut ListState) {
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let title_style = match row {
                FileRow::Entry(entry) if !entry.is_directory => Style::default().fg(Color::White),
                _ => Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            };
            ListItem::new(vec![
                Line::from(Span::styled(row.title(), title_style)),
                Line::from(Span::styled(
                    file_row_description(row),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let title = if rows.is_empty() {
        " Empty directory ".to_string()
    } else {
        format!(" Entries ({}) ", rows.iter().filter(|r| r.entry().is_some()).count())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn render_confirm(frame: &mut Frame, area: Rect, target: &DeleteTarget) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            target.label.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("This {} will be deleted permanently.", target.noun()),
            Style::default().fg(Color::Red),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, status: Option<&Status>) {
    let line = match status {
        Some(status) => Line::from(Span::styled(
            format!(" {}", status.text),
            status_style(status.kind),
        )),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}
