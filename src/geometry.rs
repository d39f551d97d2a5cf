// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pixel geometry shared by sizing, hit testing, rendering and the viewport.
//!
//! A block is drawn as a bordered box. Inside the border, the first column is reserved for the
//! breakpoint marker and the last column for the block icon; text starts right after the marker
//! column and directly below the top border.

use serde::Serialize;

use crate::model::{BlockSize, DisassemblyBlock};
use crate::theme::FontMetrics;

/// Columns between the block's left edge and the first text column (border + marker).
pub const BLOCK_PAD_LEFT_COLS: usize = 2;
/// Columns between the last text column and the block's right edge (icon + border).
pub const BLOCK_PAD_RIGHT_COLS: usize = 2;
/// Rows between the block's top edge and the first text row (border).
pub const BLOCK_PAD_TOP_ROWS: usize = 1;
pub const BLOCK_PAD_BOTTOM_ROWS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn sub(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(origin: Point, size: BlockSize) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Offset of the first text cell relative to the block's top-left corner.
pub fn text_origin(metrics: &FontMetrics) -> Point {
    Point::new(
        metrics.cols_to_px(BLOCK_PAD_LEFT_COLS),
        metrics.rows_to_px(BLOCK_PAD_TOP_ROWS),
    )
}

/// Size a block needs with the given font: widest line by total line count, plus padding.
pub fn block_size(block: &DisassemblyBlock, metrics: &FontMetrics) -> BlockSize {
    let cols = block.text_width() + BLOCK_PAD_LEFT_COLS + BLOCK_PAD_RIGHT_COLS;
    let rows = block.line_count() + BLOCK_PAD_TOP_ROWS + BLOCK_PAD_BOTTOM_ROWS;
    BlockSize {
        width: metrics.cols_to_px(cols),
        height: metrics.rows_to_px(rows),
    }
}
