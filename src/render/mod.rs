// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Block rendering.
//!
//! Blocks are drawn through the toolkit-neutral [`Painter`] trait in graph pixel coordinates.
//! [`CellCanvas`] implements it as a styled character grid for the terminal and for tests.

use std::collections::BTreeMap;

use ratatui::style::Color;

use crate::geometry::{self, Point, Rect};
use crate::model::{Addr, AddrRange, DisassemblyBlock, RichLine, RichSpan, RichText};
use crate::theme::{FontMetrics, Palette};

pub mod canvas;
pub mod edges;

pub use canvas::{CanvasError, CellCanvas};
pub use edges::{edge_configuration, ArrowShape, EdgeConfiguration};

pub const TERMINAL_ICON: char = '⏎';
pub const INDIRECT_CALL_ICON: char = '⇢';
pub const BREAKPOINT_MARKER: char = '●';

/// Drawing surface. Implementations clip; painting never fails.
pub trait Painter {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Draws one styled run with its top-left at `origin`. Runs without a background keep the
    /// background already painted underneath.
    fn draw_text(&mut self, origin: Point, span: &RichSpan);
    fn draw_border(&mut self, rect: Rect, color: Color);
    fn draw_glyph(&mut self, at: Point, glyph: char, color: Color);
    /// Axis-aligned segment; endpoints are inclusive.
    fn draw_line(&mut self, from: Point, to: Point, color: Color);
}

/// Per-frame state the block renderer reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub palette: &'a Palette,
    pub metrics: &'a FontMetrics,
    pub cursor: Option<Addr>,
    pub program_counter: Option<Addr>,
    pub selection: Option<AddrRange>,
    /// Address → enabled.
    pub breakpoints: &'a BTreeMap<Addr, bool>,
    /// Content of the highlighted token; every token of the block with equal content is marked.
    pub highlight: Option<&'a str>,
}

fn draw_line_runs(painter: &mut dyn Painter, line: &RichLine, origin: Point, metrics: &FontMetrics) {
    let mut col = 0;
    for span in line.spans() {
        painter.draw_text(origin.offset(metrics.cols_to_px(col), 0.0), span);
        col += span.width();
    }
}

fn draw_rich_text(painter: &mut dyn Painter, text: &RichText, origin: Point, metrics: &FontMetrics) {
    for (row, line) in text.lines().iter().enumerate() {
        draw_line_runs(painter, line, origin.offset(0.0, metrics.rows_to_px(row)), metrics);
    }
}

fn border_color(block: &DisassemblyBlock, palette: &Palette) -> Color {
    if block.terminal() {
        palette.ret_shadow
    } else if block.indirect_call() {
        palette.indirectcall_shadow
    } else {
        palette.border
    }
}

/// Draws one block into `rect` (graph coordinates).
///
/// Order: background and border, header, then per instruction the cursor, PC and selection
/// bands, breakpoint marker, highlighted tokens and styled runs, then the block icon.
pub fn draw_block(
    painter: &mut dyn Painter,
    ctx: &RenderContext<'_>,
    block: &DisassemblyBlock,
    rect: Rect,
) {
    let palette = ctx.palette;
    let metrics = ctx.metrics;

    painter.fill_rect(rect, palette.graph_node);
    painter.draw_border(rect, border_color(block, palette));

    let text_origin = rect.origin().offset(
        geometry::text_origin(metrics).x,
        geometry::text_origin(metrics).y,
    );
    draw_rich_text(painter, block.header_text(), text_origin, metrics);

    let band_x = rect.x + metrics.cols_to_px(1);
    let band_width = (rect.width - metrics.cols_to_px(2)).max(0.0);
    let marker_x = rect.x + metrics.cols_to_px(geometry::BLOCK_PAD_LEFT_COLS - 1);

    let mut row = block.header_text().line_count();
    for instr in block.instrs() {
        let y = text_origin.y + metrics.rows_to_px(row);
        let band = Rect::new(band_x, y, band_width, metrics.rows_to_px(instr.line_count()));

        if ctx.cursor == Some(instr.addr()) {
            painter.fill_rect(band, palette.selected_background);
        }
        if ctx.program_counter == Some(instr.addr()) {
            painter.fill_rect(band, palette.pc_band);
        }
        if ctx.selection.is_some_and(|range| range.contains(instr.addr())) {
            painter.fill_rect(band, palette.selection);
        }

        if let Some(&enabled) = ctx.breakpoints.get(&instr.addr()) {
            let color = if enabled {
                palette.breakpoint
            } else {
                palette.disabled_breakpoint
            };
            painter.draw_glyph(Point::new(marker_x, y), BREAKPOINT_MARKER, color);
        }

        if let Some(content) = ctx.highlight {
            for token in instr.tokens() {
                if token.kind.is_highlightable() && token.content.as_str() == content {
                    painter.fill_rect(
                        Rect::new(
                            text_origin.x + metrics.cols_to_px(token.start),
                            y,
                            metrics.cols_to_px(token.length),
                            metrics.char_height,
                        ),
                        palette.token_highlight,
                    );
                }
            }
        }

        draw_rich_text(painter, instr.full_text(), Point::new(text_origin.x, y), metrics);
        row += instr.line_count();
    }

    let icon = if block.terminal() {
        Some((TERMINAL_ICON, palette.ret_shadow))
    } else if block.indirect_call() {
        Some((INDIRECT_CALL_ICON, palette.indirectcall_shadow))
    } else {
        None
    };
    if let (Some((glyph, color)), Some(last)) = (icon, block.instrs().last()) {
        let last_row = row - last.line_count();
        let at = Point::new(
            rect.right() - metrics.cols_to_px(geometry::BLOCK_PAD_RIGHT_COLS),
            text_origin.y + metrics.rows_to_px(last_row),
        );
        painter.draw_glyph(at, glyph, color);
    }
}

/// Draws the placeholder block shown when no function is loaded.
pub fn draw_placeholder(
    painter: &mut dyn Painter,
    ctx: &RenderContext<'_>,
    placeholder: &DisassemblyBlock,
    rect: Rect,
) {
    painter.fill_rect(rect, ctx.palette.graph_node);
    painter.draw_border(rect, ctx.palette.border);
    let origin = rect.origin().offset(
        geometry::text_origin(ctx.metrics).x,
        geometry::text_origin(ctx.metrics).y,
    );
    draw_rich_text(painter, placeholder.header_text(), origin, ctx.metrics);
}
