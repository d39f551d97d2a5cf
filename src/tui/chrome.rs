// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Title, footer, help, and style helpers used by TUI rendering.
fn view_title(view: &GraphView) -> String {
    let mut title = format!("─ {} ", view.title());
    if !view.sync_enabled() {
        title.push_str("[unsynced] ");
    }
    title
}

fn title_line(app: &App) -> Line<'static> {
    let view = &app.view;
    let mut status = StatusLine::new(" | ");
    let cursor = view
        .cursor()
        .map_or_else(|| "-".to_owned(), |addr| addr.to_string());
    status.entry("cursor", &cursor);
    if let Some(pc) = view.program_counter() {
        status.entry("pc", &pc.to_string());
    }
    let synced = view.sync_enabled();
    status
        .push("sync", if synced { "on" } else { "off" }, !synced)
        .entry("zoom", &format!("{:.0}%", view.viewport().scale() * 100.0));
    if let Some(token) = view.highlighted_token() {
        status.entry("highlight", token.content.as_str());
    }
    Line::from(status.into_spans())
}

fn footer_line(app: &App) -> Line<'static> {
    let mut spans = footer_brand_line().spans;
    let message = app.toast.as_deref().or(app.hover.as_deref());
    match message {
        Some(message) => {
            spans.push(Span::styled(
                " | ".to_owned(),
                Style::default().fg(FOOTER_LABEL_COLOR),
            ));
            spans.push(Span::raw(message.to_owned()));
        }
        None => {
            let mut hints = StatusLine::new("  ");
            for (key, label) in [
                ("j/k", "step"),
                ("t/f", "branch"),
                ("s", "sync"),
                ("+/-/0", "zoom"),
                ("y", "yank"),
                ("?", "help"),
                ("q", "quit"),
            ] {
                hints.entry(label, key);
            }
            spans.push(Span::raw(" "));
            spans.extend(hints.into_spans());
        }
    }
    Line::from(spans)
}

fn footer_brand_line() -> Line<'static> {
    Line::from(vec![Span::styled(
        FOOTER_BRAND.to_owned(),
        Style::default().fg(FOOTER_BRAND_COLOR),
    )])
}

fn help_key_style() -> Style {
    Style::default()
        .fg(FOOTER_KEY_COLOR)
        .add_modifier(Modifier::BOLD)
}

fn help_header_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let vertical_margin = (100u16.saturating_sub(height_percent)) / 2;
    let horizontal_margin = (100u16.saturating_sub(width_percent)) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(vertical_margin),
            Constraint::Percentage(height_percent),
            Constraint::Percentage(vertical_margin),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(horizontal_margin),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(horizontal_margin),
        ])
        .split(vertical[1])[1]
}

fn help_kv(key: &str, desc: &str, key_width: usize, key_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:>width$}", width = key_width), key_style),
        Span::raw("  "),
        Span::raw(desc.to_owned()),
    ])
}

const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j / Down", "next instruction"),
            ("k / Up", "previous instruction"),
            ("t", "follow true edge"),
            ("f", "follow false edge"),
            ("Tab / S-Tab", "focus next / previous block"),
            ("s", "toggle sync with the seek source"),
            ("r", "rebuild the current function"),
        ],
    ),
    (
        "View",
        &[
            ("+ / -", "zoom in / out"),
            ("0", "reset zoom on the cursor block"),
            ("h / l", "scroll left / right"),
            ("PgUp / PgDn", "scroll up / down"),
            ("drag", "pan (middle button or empty space)"),
            ("C-wheel", "zoom about the pointer"),
        ],
    ),
    (
        "Selection",
        &[
            ("click", "move cursor, highlight token"),
            ("S-click", "extend selection"),
            ("double click", "follow address or branch"),
            ("y", "yank selection (OSC 52)"),
            ("c", "clear selection"),
            ("e", "build export request"),
        ],
    ),
];

fn render_help(frame: &mut Frame<'_>, main_area: Rect) {
    let area = centered_rect(70, 80, main_area);
    let key_width = HELP_SECTIONS
        .iter()
        .flat_map(|(_, entries)| entries.iter())
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (index, (header, entries)) in HELP_SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled((*header).to_owned(), help_header_style())));
        for (key, desc) in entries.iter() {
            lines.push(help_kv(key, desc, key_width, help_key_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(FOCUS_COLOR))
        .title(" Help (? to close) ");
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// `Label:value` entries for the title and footer bars, joined by a fixed separator.
struct StatusLine {
    spans: Vec<Span<'static>>,
    separator: &'static str,
}

impl StatusLine {
    fn new(separator: &'static str) -> Self {
        Self {
            spans: Vec::new(),
            separator,
        }
    }

    fn entry(&mut self, label: &str, value: &str) -> &mut Self {
        self.push(label, value, false)
    }

    /// Muted values render dim, for settings that are switched off.
    fn push(&mut self, label: &str, value: &str, muted: bool) -> &mut Self {
        let label_style = Style::default().fg(FOOTER_LABEL_COLOR);
        if !self.spans.is_empty() {
            self.spans.push(Span::styled(self.separator, label_style));
        }
        self.spans
            .push(Span::styled(format!("{}:", capitalized(label)), label_style));
        let value_color = if muted { Color::DarkGray } else { FOOTER_KEY_COLOR };
        self.spans.push(Span::styled(
            value.to_owned(),
            Style::default().fg(value_color).add_modifier(Modifier::BOLD),
        ));
        self
    }

    fn into_spans(self) -> Vec<Span<'static>> {
        self.spans
    }
}

/// First letter upper case, the rest lower case.
fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
