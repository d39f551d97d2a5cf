// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured export of the current graph: block geometry plus the edge list.
//!
//! Picking a file format is the exporter's business; this only carries the data.

use serde::Serialize;

use crate::geometry::Rect;
use crate::layout::GraphLayout;
use crate::model::{Addr, GraphEdge, GraphModel, EMPTY_GRAPH_TEXT};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<ExportFunction>,
    pub bounds: Rect,
    pub blocks: Vec<ExportBlock>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFunction {
    pub name: String,
    pub entry: Addr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBlock {
    pub entry: Addr,
    pub rect: Rect,
    pub terminal: bool,
    pub indirect_call: bool,
    /// Header lines followed by instruction lines, as plain text.
    pub lines: Vec<String>,
}

impl ExportRequest {
    /// Collects every block of `model` with the geometry `layout` assigned to it.
    pub fn from_graph(model: &GraphModel, layout: &GraphLayout) -> Self {
        let title = model
            .header()
            .map(|header| header.plain())
            .unwrap_or_else(|| EMPTY_GRAPH_TEXT.to_owned());
        let function = model.function().map(|function| ExportFunction {
            name: function.name.clone(),
            entry: function.entry,
        });

        let Some(blocks) = model.blocks() else {
            return Self {
                title,
                function,
                bounds: layout.bounds(),
                blocks: Vec::new(),
                edges: Vec::new(),
            };
        };

        let exported = blocks
            .blocks()
            .map(|block| {
                let mut lines: Vec<String> = block
                    .header_text()
                    .lines()
                    .iter()
                    .map(|line| line.plain())
                    .collect();
                for instr in block.instrs() {
                    lines.extend(instr.full_text().lines().iter().map(|line| line.plain()));
                }
                ExportBlock {
                    entry: block.entry(),
                    rect: layout
                        .block(block.entry())
                        .map(|placed| placed.rect)
                        .unwrap_or_default(),
                    terminal: block.terminal(),
                    indirect_call: block.indirect_call(),
                    lines,
                }
            })
            .collect();

        Self {
            title,
            function,
            bounds: layout.bounds(),
            blocks: exported,
            edges: blocks.edges(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::ExportRequest;
    use crate::backend::fixtures;
    use crate::builder::GraphModelBuilder;
    use crate::layout::layout_graph;
    use crate::model::{Addr, EdgeKind};
    use crate::theme::{FontMetrics, Palette};

    #[test]
    fn export_carries_every_block_and_edge() {
        let metrics = FontMetrics::TERMINAL_CELL;
        let model = GraphModelBuilder::default()
            .build_function(&fixtures::branchy_function(), &Palette::default(), &metrics)
            .expect("model");
        let layout = layout_graph(&model, &metrics);

        let request = ExportRequest::from_graph(&model, &layout);
        assert_eq!(request.blocks.len(), 4);
        assert_eq!(request.edges.len(), 4);
        assert!(request
            .edges
            .iter()
            .any(|edge| edge.from == Addr::new(0x1000) && edge.to == Addr::new(0x1010) && edge.kind == EdgeKind::True));
        for block in &request.blocks {
            assert!(block.rect.width > 0.0);
            assert!(request.bounds.contains_rect(&block.rect));
        }
        assert_eq!(request.title, "sym.demo @ 0x1000 - 0x101a (4 blocks)");

        let json = request.to_json_pretty().expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["function"]["entry"], "0x1000");
        assert_eq!(value["edges"][0]["kind"], "true");
        assert_eq!(value["blocks"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn empty_model_exports_no_blocks() {
        let metrics = FontMetrics::TERMINAL_CELL;
        let model = GraphModelBuilder::default().empty_model(&Palette::default(), &metrics);
        let layout = layout_graph(&model, &metrics);

        let request = ExportRequest::from_graph(&model, &layout);
        assert!(request.blocks.is_empty());
        assert!(request.function.is_none());
        assert_eq!(request.title, "No function at this address");
    }
}
