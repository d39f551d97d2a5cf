// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::style::Color;
use serde::Serialize;

use crate::geometry::Rect;
use crate::model::{Addr, EdgeKind};
use crate::theme::Palette;

/// Arrow geometry, chosen from the relative position of the two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowShape {
    /// Target starts below the source's bottom edge.
    Forward,
    /// Target starts above the source's bottom edge.
    Backward,
    /// Source and target are the same block.
    SelfLoop,
    /// Target is not a block of the graph; the arrow leaves the visible graph.
    Exit,
}

impl ArrowShape {
    pub fn head(self) -> char {
        match self {
            Self::Exit => '↓',
            Self::Forward | Self::Backward | Self::SelfLoop => '▼',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeConfiguration {
    pub color: Color,
    pub kind: EdgeKind,
    pub arrow: ArrowShape,
}

/// Styling for the edge `from → to`; `to` is `None` when the target is not a block.
pub fn edge_configuration(
    palette: &Palette,
    kind: EdgeKind,
    from: (Addr, Rect),
    to: Option<(Addr, Rect)>,
) -> EdgeConfiguration {
    let (from_entry, from_rect) = from;
    let arrow = match to {
        None => ArrowShape::Exit,
        Some((to_entry, _)) if to_entry == from_entry => ArrowShape::SelfLoop,
        Some((_, to_rect)) if to_rect.y < from_rect.bottom() => ArrowShape::Backward,
        Some(_) => ArrowShape::Forward,
    };
    EdgeConfiguration {
        color: palette.edge_color(kind),
        kind,
        arrow,
    }
}
