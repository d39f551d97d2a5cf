// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::GraphBlock;
use crate::geometry::Point;
use crate::model::EdgeKind;
use crate::render::{EdgeConfiguration, Painter};
use crate::viewport::{Modifiers, PointerButton, ViewportController};

/// Why the substrate moves focus to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// The cursor already moved there; only the viewport follows.
    Cursor,
    /// The substrate picked the block (e.g. focus cycling); the cursor follows the viewport.
    Substrate,
}

/// Callbacks the graph substrate invokes on the view that owns the block content.
///
/// Block-local points are measured from the block's top-left corner in graph pixels.
pub trait GraphHooks {
    /// Paints one block's content; `painter` already maps graph to view coordinates.
    fn draw_block(&self, painter: &mut dyn Painter, block: &GraphBlock);

    fn block_clicked(
        &mut self,
        block: &GraphBlock,
        local: Point,
        button: PointerButton,
        modifiers: Modifiers,
    );

    fn block_double_clicked(&mut self, block: &GraphBlock, local: Point);

    /// Hover help for a point inside a block.
    fn block_help(&self, block: &GraphBlock, local: Point) -> Option<String>;

    /// Styling of `from → to`; `to` is `None` when the edge target is not a block.
    fn edge_configuration(
        &self,
        from: &GraphBlock,
        kind: EdgeKind,
        to: Option<&GraphBlock>,
    ) -> EdgeConfiguration;

    fn block_transitioned_to(
        &mut self,
        block: &GraphBlock,
        cause: TransitionCause,
        viewport: &mut ViewportController,
    );
}
