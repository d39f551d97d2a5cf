// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Multi-run colored text.
//!
//! Every visual line is an ordered list of runs; each run carries its own foreground and optional
//! background color. This is plain data: measuring and painting live elsewhere.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichSpan {
    text: String,
    fg: Color,
    bg: Option<Color>,
    highlight: bool,
}

impl RichSpan {
    pub fn new(text: impl Into<String>, fg: Color) -> Self {
        Self {
            text: text.into(),
            fg,
            bg: None,
            highlight: false,
        }
    }

    pub fn with_bg(mut self, bg: Option<Color>) -> Self {
        self.bg = bg;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fg(&self) -> Color {
        self.fg
    }

    pub fn bg(&self) -> Option<Color> {
        self.bg
    }

    pub fn highlight(&self) -> bool {
        self.highlight
    }

    /// Width in fixed-width columns.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    pub fn style(&self) -> Style {
        let mut style = Style::default().fg(self.fg);
        if let Some(bg) = self.bg {
            style = style.bg(bg);
        }
        if self.highlight {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichLine {
    spans: SmallVec<[RichSpan; 6]>,
}

impl RichLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, span: RichSpan) {
        if span.text.is_empty() {
            return;
        }
        self.spans.push(span);
    }

    pub fn spans(&self) -> &[RichSpan] {
        &self.spans
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(RichSpan::width).sum()
    }

    pub fn plain(&self) -> String {
        self.spans.iter().map(RichSpan::text).collect()
    }

    pub fn to_line(&self) -> Line<'static> {
        Line::from(
            self.spans
                .iter()
                .map(|span| Span::styled(span.text.clone(), span.style()))
                .collect::<Vec<_>>(),
        )
    }
}

impl FromIterator<RichSpan> for RichLine {
    fn from_iter<I: IntoIterator<Item = RichSpan>>(iter: I) -> Self {
        let mut line = Self::new();
        for span in iter {
            line.push(span);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    lines: Vec<RichLine>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single line holding one run.
    pub fn single(text: impl Into<String>, fg: Color, bg: Option<Color>) -> Self {
        let mut line = RichLine::new();
        line.push(RichSpan::new(text, fg).with_bg(bg));
        Self::from_line(line)
    }

    pub fn from_line(line: RichLine) -> Self {
        Self { lines: vec![line] }
    }

    pub fn push_line(&mut self, line: RichLine) {
        self.lines.push(line);
    }

    pub fn extend(&mut self, other: RichText) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[RichLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Widest line in columns.
    pub fn width(&self) -> usize {
        self.lines.iter().map(RichLine::width).max().unwrap_or(0)
    }

    /// Concatenation of every run on every line, without separators.
    pub fn plain(&self) -> String {
        self.lines.iter().map(RichLine::plain).collect()
    }

    pub fn to_text(&self) -> Text<'static> {
        Text::from(self.lines.iter().map(RichLine::to_line).collect::<Vec<_>>())
    }
}
