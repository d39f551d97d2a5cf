// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Hosts a [`GraphView`] in a ratatui + crossterm shell. The graph is painted into a
//! [`CellCanvas`] sized to the graph pane, one cell per character.

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{debug, warn};

use crate::geometry::Point;
use crate::nav::NavOutcome;
use crate::query;
use crate::render::CellCanvas;
use crate::view::GraphView;
use crate::viewport::{Modifiers, PointerButton};

const FOCUS_COLOR: Color = Color::LightGreen;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_BRAND_COLOR: Color = Color::White;
const FOOTER_BRAND: &str = "cfgview";
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const IDLE_POLL: Duration = Duration::from_millis(250);
const ANIMATION_POLL: Duration = Duration::from_millis(16);

/// Runs the interactive terminal UI until the user quits.
pub fn run(view: GraphView) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(view);

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        let timeout = if app.view.viewport().is_animating() {
            ANIMATION_POLL
        } else {
            IDLE_POLL
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        app.view.tick();
    }

    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    let (title_area, graph_area, footer_area) = (rows[0], rows[1], rows[2]);

    frame.render_widget(Paragraph::new(title_line(app)), title_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(FOCUS_COLOR))
        .title(view_title(&app.view));
    let inner = block.inner(graph_area);
    frame.render_widget(block, graph_area);
    app.graph_area = inner;
    frame.render_widget(Paragraph::new(app.graph_text(inner)), inner);

    frame.render_widget(Paragraph::new(footer_line(app)), footer_area);

    if app.show_help {
        render_help(frame, area);
    }
}

struct App {
    view: GraphView,
    should_quit: bool,
    show_help: bool,
    toast: Option<String>,
    hover: Option<String>,
    graph_area: Rect,
    last_click: Option<(Instant, u16, u16)>,
}

impl App {
    fn new(view: GraphView) -> Self {
        Self {
            view,
            should_quit: false,
            show_help: false,
            toast: None,
            hover: None,
            graph_area: Rect::default(),
            last_click: None,
        }
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(message.into());
    }

    /// Resizes the view to the pane and paints it.
    fn graph_text(&mut self, area: Rect) -> Text<'static> {
        self.view
            .resize(f64::from(area.width), f64::from(area.height));
        let metrics = self.view.theme().metrics();
        match CellCanvas::new(usize::from(area.width), usize::from(area.height), metrics) {
            Ok(mut canvas) => {
                canvas.clear(Some(self.view.theme().palette().background));
                self.view.render(&mut canvas);
                canvas.to_text()
            }
            Err(err) => Text::raw(err.to_string()),
        }
    }

    /// Terminal cell to view point; `None` outside the graph pane.
    fn view_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.graph_area;
        if column < area.x
            || row < area.y
            || column >= area.x.saturating_add(area.width)
            || row >= area.y.saturating_add(area.height)
        {
            return None;
        }
        let metrics = self.view.theme().metrics();
        Some(Point::new(
            f64::from(column - area.x) * metrics.char_width + metrics.char_width / 2.0,
            f64::from(row - area.y) * metrics.char_height + metrics.char_height / 2.0,
        ))
    }

    fn view_center(&self) -> Point {
        let (width, height) = self.view.viewport().view_size();
        Point::new(width / 2.0, height / 2.0)
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.toast = None;
        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }
        self.handle_key_code(key.code, key.modifiers);
    }

    fn handle_key_code(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let center = self.view_center();
        let outcome = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => Some(self.view.next_instruction()),
            KeyCode::Char('k') | KeyCode::Up => Some(self.view.prev_instruction()),
            KeyCode::Char('t') => Some(self.view.follow_true_edge()),
            KeyCode::Char('f') => Some(self.view.follow_false_edge()),
            KeyCode::Char('s') => {
                let enabled = self.view.toggle_sync();
                self.set_toast(if enabled { "sync on" } else { "sync off" });
                None
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.view.zoom(center, 1.0);
                None
            }
            KeyCode::Char('-') => {
                self.view.zoom(center, -1.0);
                None
            }
            KeyCode::Char('0') => {
                self.view.zoom_reset();
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.view.wheel(1.0, Modifiers::SHIFT, center);
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.view.wheel(-1.0, Modifiers::SHIFT, center);
                None
            }
            KeyCode::PageUp => {
                self.view.wheel(1.0, Modifiers::NONE, center);
                None
            }
            KeyCode::PageDown => {
                self.view.wheel(-1.0, Modifiers::NONE, center);
                None
            }
            KeyCode::Tab => {
                self.focus_next_block(!modifiers.contains(KeyModifiers::SHIFT));
                None
            }
            KeyCode::BackTab => {
                self.focus_next_block(false);
                None
            }
            KeyCode::Char('y') => {
                self.yank_selection();
                None
            }
            KeyCode::Char('c') => {
                self.view.clear_selection();
                None
            }
            KeyCode::Char('r') => {
                match self.view.refresh() {
                    Ok(()) => self.set_toast("refreshed"),
                    Err(err) => self.set_toast(err.to_string()),
                }
                None
            }
            KeyCode::Char('e') => {
                self.export_to_toast();
                None
            }
            _ => None,
        };

        if let Some(outcome) = outcome {
            debug!(?outcome, "key navigation");
            if outcome == NavOutcome::NotFound {
                self.set_toast("not found");
            }
        }
    }

    /// Moves focus to the next (or previous) block by entry address.
    fn focus_next_block(&mut self, forward: bool) {
        let entries: Vec<_> = self.view.layout().blocks().map(|block| block.entry).collect();
        if entries.is_empty() || self.view.model().is_empty() {
            return;
        }
        let current = self.view.cursor().and_then(|cursor| {
            self.view
                .model()
                .blocks()
                .and_then(|blocks| query::block_for_address(blocks, cursor))
                .and_then(|block| entries.iter().position(|&entry| entry == block.entry()))
        });
        let next = match (current, forward) {
            (Some(index), true) => (index + 1) % entries.len(),
            (Some(index), false) => (index + entries.len() - 1) % entries.len(),
            (None, _) => 0,
        };
        self.view.focus_block(entries[next]);
    }

    fn yank_selection(&mut self) {
        let Some(text) = self.view.copy_selection() else {
            self.set_toast("nothing selected");
            return;
        };
        match copy_to_clipboard(&text) {
            Ok(backend) => self.set_toast(format!("Yanked {} chars ({backend})", text.chars().count())),
            Err(err) => {
                warn!(%err, "clipboard copy failed");
                self.set_toast(format!("Clipboard error: {err}"));
            }
        }
    }

    fn export_to_toast(&mut self) {
        let request = self.view.export_request();
        match request.to_json_pretty() {
            Ok(json) => self.set_toast(format!(
                "export: {} blocks, {} edges, {} bytes",
                request.blocks.len(),
                request.edges.len(),
                json.len()
            )),
            Err(err) => self.set_toast(format!("export failed: {err}")),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(point) = self.view_point(mouse.column, mouse.row) else {
            if matches!(mouse.kind, MouseEventKind::Up(_)) {
                self.view.pointer_release();
            }
            self.hover = None;
            return;
        };
        let modifiers = Modifiers {
            shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
            ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
        };

        match mouse.kind {
            MouseEventKind::Down(button) => {
                let button = match button {
                    MouseButton::Left => PointerButton::Left,
                    MouseButton::Middle => PointerButton::Middle,
                    MouseButton::Right => PointerButton::Right,
                };
                let now = Instant::now();
                let repeated = button == PointerButton::Left
                    && self.last_click.is_some_and(|(at, column, row)| {
                        column == mouse.column
                            && row == mouse.row
                            && now.duration_since(at) <= DOUBLE_CLICK_WINDOW
                    });
                if repeated {
                    self.last_click = None;
                    self.view.double_click(point);
                } else {
                    if button == PointerButton::Left {
                        self.last_click = Some((now, mouse.column, mouse.row));
                    }
                    self.view.pointer_press(point, button, modifiers);
                }
            }
            MouseEventKind::Drag(_) => {
                self.view.pointer_move(point);
            }
            MouseEventKind::Up(_) => {
                self.view.pointer_release();
            }
            MouseEventKind::Moved => {
                self.hover = self
                    .view
                    .tooltip(point)
                    .map(|help| help.replace('\n', "  "));
            }
            MouseEventKind::ScrollUp => {
                self.view.wheel(1.0, modifiers, point);
            }
            MouseEventKind::ScrollDown => {
                self.view.wheel(-1.0, modifiers, point);
            }
            MouseEventKind::ScrollLeft => {
                self.view.wheel(1.0, Modifiers::SHIFT, point);
            }
            MouseEventKind::ScrollRight => {
                self.view.wheel(-1.0, Modifiers::SHIFT, point);
            }
        }
    }
}

include!("chrome.rs");

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> Result<&'static str, String> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
    Ok("osc52")
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}
