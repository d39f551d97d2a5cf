// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use super::Painter;
use crate::geometry::{Point, Rect};
use crate::model::RichSpan;
use crate::theme::FontMetrics;

pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';
pub const BOX_TOP_LEFT: char = '┌';
pub const BOX_TOP_RIGHT: char = '┐';
pub const BOX_BOTTOM_LEFT: char = '└';
pub const BOX_BOTTOM_RIGHT: char = '┘';
pub const BOX_TEE_RIGHT: char = '├';
pub const BOX_TEE_LEFT: char = '┤';
pub const BOX_TEE_DOWN: char = '┬';
pub const BOX_TEE_UP: char = '┴';
pub const BOX_CROSS: char = '┼';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxEdges(u8);

impl BoxEdges {
    const NONE: Self = Self(0);
    const LEFT: Self = Self(1 << 0);
    const RIGHT: Self = Self(1 << 1);
    const UP: Self = Self(1 << 2);
    const DOWN: Self = Self(1 << 3);

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

fn box_edges_from_char(ch: char) -> Option<BoxEdges> {
    let edges = match ch {
        BOX_HORIZONTAL => BoxEdges::LEFT.union(BoxEdges::RIGHT),
        BOX_VERTICAL => BoxEdges::UP.union(BoxEdges::DOWN),
        BOX_TOP_LEFT => BoxEdges::RIGHT.union(BoxEdges::DOWN),
        BOX_TOP_RIGHT => BoxEdges::LEFT.union(BoxEdges::DOWN),
        BOX_BOTTOM_LEFT => BoxEdges::RIGHT.union(BoxEdges::UP),
        BOX_BOTTOM_RIGHT => BoxEdges::LEFT.union(BoxEdges::UP),
        BOX_TEE_RIGHT => BoxEdges::UP.union(BoxEdges::DOWN).union(BoxEdges::RIGHT),
        BOX_TEE_LEFT => BoxEdges::UP.union(BoxEdges::DOWN).union(BoxEdges::LEFT),
        BOX_TEE_DOWN => BoxEdges::LEFT.union(BoxEdges::RIGHT).union(BoxEdges::DOWN),
        BOX_TEE_UP => BoxEdges::LEFT.union(BoxEdges::RIGHT).union(BoxEdges::UP),
        BOX_CROSS => BoxEdges(0b1111),
        _ => return None,
    };
    Some(edges)
}

fn box_char_from_edges(edges: BoxEdges) -> char {
    match edges.0 {
        0 => ' ',
        1..=3 => BOX_HORIZONTAL,
        4 | 8 | 12 => BOX_VERTICAL,
        10 => BOX_TOP_LEFT,
        9 => BOX_TOP_RIGHT,
        6 => BOX_BOTTOM_LEFT,
        5 => BOX_BOTTOM_RIGHT,
        14 => BOX_TEE_RIGHT,
        13 => BOX_TEE_LEFT,
        11 => BOX_TEE_DOWN,
        7 => BOX_TEE_UP,
        _ => BOX_CROSS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Option<Color>,
    bold: bool,
    edges: BoxEdges,
}

impl Cell {
    const BLANK: Self = Self {
        ch: ' ',
        fg: Color::Reset,
        bg: None,
        bold: false,
        edges: BoxEdges::NONE,
    };

    fn style(&self) -> Style {
        let mut style = Style::default().fg(self.fg);
        if let Some(bg) = self.bg {
            style = style.bg(bg);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }
}

/// A fixed-size styled character grid that implements [`Painter`].
///
/// Pixel coordinates map to cells through the font metrics (`col = floor(x / char_width)`).
/// Painting clips at the grid border. Collision behavior is deterministic:
/// - non-box characters overwrite (last writer wins)
/// - box-drawing characters merge into junctions (`┼`, `├`, `┤`, `┬`, `┴`)
#[derive(Debug, Clone, PartialEq)]
pub struct CellCanvas {
    width: usize,
    height: usize,
    metrics: FontMetrics,
    cells: Vec<Cell>,
}

impl CellCanvas {
    pub fn new(width: usize, height: usize, metrics: FontMetrics) -> Result<Self, CanvasError> {
        let len = width
            .checked_mul(height)
            .ok_or(CanvasError::AreaOverflow { width, height })?;
        Ok(Self {
            width,
            height,
            metrics,
            cells: vec![Cell::BLANK; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.render_at(x, y, idx))
    }

    pub fn background_at(&self, x: usize, y: usize) -> Result<Option<Color>, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.cells[idx].bg)
    }

    pub fn foreground_at(&self, x: usize, y: usize) -> Result<Color, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.cells[idx].fg)
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char, fg: Color) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        let cell = &mut self.cells[idx];
        cell.fg = fg;
        cell.bold = false;
        match box_edges_from_char(ch) {
            Some(edges) => cell.edges = cell.edges.union(edges),
            None => {
                cell.ch = ch;
                cell.edges = BoxEdges::NONE;
            }
        }
        Ok(())
    }

    /// Resets the whole grid to blanks on `bg`.
    pub fn clear(&mut self, bg: Option<Color>) {
        self.cells.fill(Cell { bg, ..Cell::BLANK });
    }

    /// Writes `text` left-to-right starting at `(x, y)`, clipping at the right edge.
    pub fn write_str(
        &mut self,
        x: usize,
        y: usize,
        text: &str,
        style: Style,
    ) -> Result<(), CanvasError> {
        if y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        for (x, ch) in (x..self.width).zip(text.chars()) {
            let idx = y * self.width + x;
            let cell = &mut self.cells[idx];
            cell.ch = ch;
            cell.edges = BoxEdges::NONE;
            cell.fg = style.fg.unwrap_or(cell.fg);
            if style.bg.is_some() {
                cell.bg = style.bg;
            }
            cell.bold = style.add_modifier.contains(Modifier::BOLD);
        }
        Ok(())
    }

    fn cell_x(&self, px: f64) -> i64 {
        (px / self.metrics.char_width).floor() as i64
    }

    fn cell_y(&self, py: f64) -> i64 {
        (py / self.metrics.char_height).floor() as i64
    }

    fn clip_x(&self, x: i64) -> Option<usize> {
        usize::try_from(x).ok().filter(|&x| x < self.width)
    }

    fn clip_y(&self, y: i64) -> Option<usize> {
        usize::try_from(y).ok().filter(|&y| y < self.height)
    }

    /// Cell span `[x0, x1)` × `[y0, y1)` covered by a pixel rectangle, clipped to the grid.
    fn cell_span(&self, rect: Rect) -> Option<(usize, usize, usize, usize)> {
        if !rect.origin().is_finite() || !rect.width.is_finite() || !rect.height.is_finite() {
            return None;
        }
        let x0 = self.cell_x(rect.x).max(0);
        let y0 = self.cell_y(rect.y).max(0);
        let x1 = self.cell_x(rect.right()).min(self.width as i64);
        let y1 = self.cell_y(rect.bottom()).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    fn put_box(&mut self, x: i64, y: i64, ch: char, color: Color) {
        if let (Some(x), Some(y)) = (self.clip_x(x), self.clip_y(y)) {
            let _ = self.set(x, y, ch, color);
        }
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if !self.in_bounds(x, y) {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    fn render_at(&self, x: usize, y: usize, idx: usize) -> char {
        let edges = self.cells[idx].edges;
        if edges.is_empty() {
            return self.cells[idx].ch;
        }
        let connected = self.connected_box_edges(x, y, edges);
        box_char_from_edges(if connected.is_empty() {
            edges
        } else {
            connected
        })
    }

    fn connected_box_edges(&self, x: usize, y: usize, edges: BoxEdges) -> BoxEdges {
        let mut connected = BoxEdges::NONE;
        let at = |x: usize, y: usize| self.cells[y * self.width + x].edges;

        if edges.contains(BoxEdges::LEFT) && x > 0 && at(x - 1, y).contains(BoxEdges::RIGHT) {
            connected = connected.union(BoxEdges::LEFT);
        }
        if edges.contains(BoxEdges::RIGHT)
            && x + 1 < self.width
            && at(x + 1, y).contains(BoxEdges::LEFT)
        {
            connected = connected.union(BoxEdges::RIGHT);
        }
        if edges.contains(BoxEdges::UP) && y > 0 && at(x, y - 1).contains(BoxEdges::DOWN) {
            connected = connected.union(BoxEdges::UP);
        }
        if edges.contains(BoxEdges::DOWN)
            && y + 1 < self.height
            && at(x, y + 1).contains(BoxEdges::UP)
        {
            connected = connected.union(BoxEdges::DOWN);
        }
        connected
    }

    /// Styled lines for a ratatui widget; adjacent cells with equal style share one span.
    pub fn to_text(&self) -> Text<'static> {
        let mut lines = Vec::with_capacity(self.height);
        for y in 0..self.height {
            let mut spans: Vec<Span<'static>> = Vec::new();
            let mut run = String::new();
            let mut run_style: Option<Style> = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let style = self.cells[idx].style();
                if run_style.is_some_and(|current| current != style) {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
                }
                run_style = Some(style);
                run.push(self.render_at(x, y, idx));
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style.unwrap_or_default()));
            }
            lines.push(Line::from(spans));
        }
        Text::from(lines)
    }

    /// Plain text with trailing blanks and empty trailing lines removed.
    pub fn to_string_trimmed(&self) -> String {
        let rendered = self.to_string();
        let mut lines: Vec<&str> = rendered.lines().map(|line| line.trim_end()).collect();
        while matches!(lines.last(), Some(line) if line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }
}

impl Painter for CellCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.cell_span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let cell = &mut self.cells[y * self.width + x];
                *cell = Cell {
                    bg: Some(color),
                    ..Cell::BLANK
                };
            }
        }
    }

    fn draw_text(&mut self, origin: Point, span: &RichSpan) {
        if !origin.is_finite() {
            return;
        }
        let x = self.cell_x(origin.x);
        let Some(y) = self.clip_y(self.cell_y(origin.y)) else {
            return;
        };
        for (offset, ch) in span.text().chars().enumerate() {
            let Some(x) = self.clip_x(x + offset as i64) else {
                continue;
            };
            let cell = &mut self.cells[y * self.width + x];
            cell.ch = ch;
            cell.edges = BoxEdges::NONE;
            cell.fg = span.fg();
            if span.bg().is_some() {
                cell.bg = span.bg();
            }
            cell.bold = span.highlight();
        }
    }

    fn draw_border(&mut self, rect: Rect, color: Color) {
        if !rect.origin().is_finite() || !rect.width.is_finite() || !rect.height.is_finite() {
            return;
        }
        let x0 = self.cell_x(rect.x);
        let y0 = self.cell_y(rect.y);
        let x1 = self.cell_x(rect.right()) - 1;
        let y1 = self.cell_y(rect.bottom()) - 1;
        if x1 < x0 || y1 < y0 {
            return;
        }
        if x0 == x1 || y0 == y1 {
            self.draw_line(rect.origin(), Point::new(rect.right() - 1.0, rect.bottom() - 1.0), color);
            return;
        }
        for x in (x0 + 1)..x1 {
            self.put_box(x, y0, BOX_HORIZONTAL, color);
            self.put_box(x, y1, BOX_HORIZONTAL, color);
        }
        for y in (y0 + 1)..y1 {
            self.put_box(x0, y, BOX_VERTICAL, color);
            self.put_box(x1, y, BOX_VERTICAL, color);
        }
        self.put_box(x0, y0, BOX_TOP_LEFT, color);
        self.put_box(x1, y0, BOX_TOP_RIGHT, color);
        self.put_box(x0, y1, BOX_BOTTOM_LEFT, color);
        self.put_box(x1, y1, BOX_BOTTOM_RIGHT, color);
    }

    fn draw_glyph(&mut self, at: Point, glyph: char, color: Color) {
        if !at.is_finite() {
            return;
        }
        if let (Some(x), Some(y)) = (
            self.clip_x(self.cell_x(at.x)),
            self.clip_y(self.cell_y(at.y)),
        ) {
            let cell = &mut self.cells[y * self.width + x];
            cell.ch = glyph;
            cell.edges = BoxEdges::NONE;
            cell.fg = color;
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        if !from.is_finite() || !to.is_finite() {
            return;
        }
        let (fx, fy) = (self.cell_x(from.x), self.cell_y(from.y));
        let (tx, ty) = (self.cell_x(to.x), self.cell_y(to.y));
        if fy == ty {
            for x in fx.min(tx)..=fx.max(tx) {
                self.put_box(x, fy, BOX_HORIZONTAL, color);
            }
        } else if fx == tx {
            for y in fy.min(ty)..=fy.max(ty) {
                self.put_box(fx, y, BOX_VERTICAL, color);
            }
        } else {
            // Diagonals are drawn as an L: horizontal first, then vertical.
            self.draw_line(from, Point::new(to.x, from.y), color);
            self.draw_line(Point::new(to.x, from.y), to, color);
        }
    }
}

impl fmt::Display for CellCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for y in 0..self.height {
            for x in 0..self.width {
                f.write_char(self.render_at(x, y, y * self.width + x))?;
            }
            if y + 1 < self.height {
                f.write_char('\n')?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    AreaOverflow {
        width: usize,
        height: usize,
    },
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AreaOverflow { width, height } => {
                write!(f, "canvas area overflow: {width}*{height}")
            }
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "out of bounds: ({x},{y}) for {width}x{height} canvas"),
        }
    }
}

impl std::error::Error for CanvasError {}

#[cfg(test)]
mod tests {
    use ratatui::style::{Color, Style};

    use super::{CanvasError, CellCanvas};
    use crate::geometry::{Point, Rect};
    use crate::model::RichSpan;
    use crate::render::Painter;
    use crate::theme::FontMetrics;

    fn canvas(width: usize, height: usize) -> CellCanvas {
        CellCanvas::new(width, height, FontMetrics::TERMINAL_CELL).expect("canvas")
    }

    #[test]
    fn out_of_bounds_access_errors() {
        let mut c = canvas(2, 2);
        assert_eq!(
            c.set(2, 0, 'X', Color::Reset).unwrap_err(),
            CanvasError::OutOfBounds {
                x: 2,
                y: 0,
                width: 2,
                height: 2
            }
        );
        assert!(c.get(0, 2).is_err());
    }

    #[test]
    fn rejects_area_overflow() {
        let err = CellCanvas::new(usize::MAX, 2, FontMetrics::TERMINAL_CELL).unwrap_err();
        assert_eq!(
            err,
            CanvasError::AreaOverflow {
                width: usize::MAX,
                height: 2
            }
        );
    }

    #[test]
    fn write_str_clips_at_right_edge() {
        let mut c = canvas(4, 1);
        c.write_str(2, 0, "abcdef", Style::default()).expect("write");
        assert_eq!(c.to_string(), "  ab");
    }

    #[test]
    fn border_draws_box_corners() {
        let mut c = canvas(6, 4);
        c.draw_border(Rect::new(1.0, 0.0, 4.0, 3.0), Color::White);
        assert_eq!(c.to_string(), " ┌──┐ \n │  │ \n └──┘ \n      ");
    }

    #[test]
    fn crossing_lines_merge_into_junctions() {
        let mut c = canvas(5, 5);
        c.draw_line(Point::new(0.0, 2.0), Point::new(4.0, 2.0), Color::White);
        c.draw_line(Point::new(2.0, 0.0), Point::new(2.0, 4.0), Color::White);
        assert_eq!(c.to_string(), "  │  \n  │  \n──┼──\n  │  \n  │  ");

        let mut c = canvas(5, 3);
        c.draw_line(Point::new(0.0, 1.0), Point::new(4.0, 1.0), Color::White);
        c.draw_line(Point::new(2.0, 1.0), Point::new(2.0, 2.0), Color::White);
        assert_eq!(c.to_string(), "     \n──┬──\n  │  ");
    }

    #[test]
    fn painting_clips_instead_of_failing() {
        let mut c = canvas(3, 2);
        c.fill_rect(Rect::new(-5.0, -5.0, 100.0, 100.0), Color::Blue);
        c.draw_text(Point::new(-1.0, 1.0), &RichSpan::new("abcd", Color::Red));
        c.draw_glyph(Point::new(9.0, 9.0), '*', Color::Red);
        c.draw_text(Point::new(f64::NAN, 0.0), &RichSpan::new("x", Color::Red));
        assert_eq!(c.to_string(), "   \nbcd");
        assert_eq!(c.background_at(0, 0).expect("cell"), Some(Color::Blue));
    }

    #[test]
    fn text_keeps_band_background_unless_span_has_one() {
        let mut c = canvas(4, 1);
        c.fill_rect(Rect::new(0.0, 0.0, 4.0, 1.0), Color::Blue);
        c.draw_text(Point::ORIGIN, &RichSpan::new("ab", Color::Red));
        c.draw_text(Point::new(2.0, 0.0), &RichSpan::new("c", Color::Red).with_bg(Some(Color::Green)));
        assert_eq!(c.background_at(0, 0).expect("cell"), Some(Color::Blue));
        assert_eq!(c.background_at(2, 0).expect("cell"), Some(Color::Green));
        assert_eq!(c.foreground_at(1, 0).expect("cell"), Color::Red);
    }

    #[test]
    fn pixel_coordinates_scale_through_metrics() {
        let metrics = FontMetrics::new(8.0, 16.0, 12.0).expect("metrics");
        let mut c = CellCanvas::new(4, 2, metrics).expect("canvas");
        c.draw_text(Point::new(16.0, 16.0), &RichSpan::new("ok", Color::Red));
        assert_eq!(c.to_string_trimmed(), "\n  ok");
    }

    #[test]
    fn to_text_groups_equal_styles() {
        let mut c = canvas(4, 1);
        c.draw_text(Point::ORIGIN, &RichSpan::new("ab", Color::Red));
        let text = c.to_text();
        assert_eq!(text.lines.len(), 1);
        assert_eq!(text.lines[0].spans.len(), 2);
        assert_eq!(text.lines[0].spans[0].content, "ab");
    }
}
