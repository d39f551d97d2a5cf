// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Backend CFG → in-memory graph model.
//!
//! The builder turns a [`FunctionCfg`] into a [`GraphModel`]: styled instruction text with tokens,
//! classified edges, block headers and block sizes for the layout.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::backend::{CfgBlock, CfgOp, DisassemblyBackend, FunctionCfg, OpKind};
use crate::geometry::block_size;
use crate::model::{
    Addr, BlockMap, DisassemblyBlock, FunctionInfo, GraphModel, RichLine, RichSpan, RichText,
    EMPTY_GRAPH_TEXT,
};
use crate::theme::{FontMetrics, Palette};

mod tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    pub show_offsets: bool,
    pub show_bytes: bool,
    /// Opcode bytes shown before truncation.
    pub max_bytes: usize,
    /// Render comments on their own line below the instruction.
    pub comments_below: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            show_offsets: true,
            show_bytes: true,
            max_bytes: 6,
            comments_below: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphModelBuilder {
    options: BuilderOptions,
}

impl GraphModelBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    pub fn set_options(&mut self, options: BuilderOptions) {
        self.options = options;
    }

    /// Fetches the function containing `addr` and builds its model.
    pub fn rebuild(
        &self,
        backend: &dyn DisassemblyBackend,
        addr: Addr,
        palette: &Palette,
        metrics: &FontMetrics,
    ) -> Result<GraphModel, RebuildError> {
        let Some(function) = backend.function_at(addr) else {
            debug!(%addr, "backend has no function");
            return Err(RebuildError::NoData { addr });
        };
        self.build_function(&function, palette, metrics)
            .map_err(|_| RebuildError::NoData { addr })
    }

    pub fn build_function(
        &self,
        function: &FunctionCfg,
        palette: &Palette,
        metrics: &FontMetrics,
    ) -> Result<GraphModel, RebuildError> {
        if function.blocks.is_empty() {
            return Err(RebuildError::NoData {
                addr: function.addr,
            });
        }

        let entries: BTreeSet<Addr> = function.blocks.iter().map(|block| block.addr).collect();
        let mut blocks = BlockMap::new();
        for cfg_block in &function.blocks {
            if blocks.contains_entry(cfg_block.addr) {
                warn!(entry = %cfg_block.addr, "duplicate block entry ignored");
                continue;
            }
            let mut block = self.build_block(function, cfg_block, palette, &entries);
            block.set_size(block_size(&block, metrics));
            blocks.insert(block);
        }

        info!(
            function = %function.name,
            entry = %function.addr,
            blocks = blocks.len(),
            "graph rebuilt"
        );

        Ok(GraphModel::Ready {
            function: FunctionInfo {
                name: function.name.clone(),
                entry: function.addr,
            },
            header: self.build_header(function, palette),
            blocks,
        })
    }

    /// Title line for the whole function: name, address range and block count.
    pub fn build_header(&self, function: &FunctionCfg, palette: &Palette) -> RichText {
        let start = function
            .blocks
            .iter()
            .map(|block| block.addr)
            .chain(std::iter::once(function.addr))
            .min()
            .unwrap_or(function.addr);
        let end = function
            .blocks
            .iter()
            .flat_map(|block| block.ops.iter())
            .map(|op| op.addr.offset(op.size))
            .max()
            .unwrap_or(start);

        let mut line = RichLine::new();
        line.push(RichSpan::new(function.name.clone(), palette.label).with_bg(palette.label_bg));
        line.push(RichSpan::new(" @ ", palette.text));
        line.push(RichSpan::new(format!("{start} - {end}"), palette.address));
        line.push(RichSpan::new(
            format!(" ({} blocks)", function.blocks.len()),
            palette.comment,
        ));
        RichText::from_line(line)
    }

    /// Placeholder model shown when the backend has nothing for the requested address.
    pub fn empty_model(&self, palette: &Palette, metrics: &FontMetrics) -> GraphModel {
        let mut model = GraphModel::empty(RichText::single(
            EMPTY_GRAPH_TEXT,
            palette.comment,
            palette.comment_bg,
        ));
        if let GraphModel::Empty { placeholder } = &mut model {
            placeholder.set_size(block_size(placeholder, metrics));
        }
        model
    }

    /// Recomputes cached block sizes after a font change.
    pub fn resize(&self, model: &mut GraphModel, metrics: &FontMetrics) {
        match model {
            GraphModel::Ready { blocks, .. } => {
                for block in blocks.blocks_mut() {
                    let size = block_size(block, metrics);
                    block.set_size(size);
                }
            }
            GraphModel::Empty { placeholder } => {
                let size = block_size(placeholder, metrics);
                placeholder.set_size(size);
            }
        }
    }

    fn build_block(
        &self,
        function: &FunctionCfg,
        cfg_block: &CfgBlock,
        palette: &Palette,
        entries: &BTreeSet<Addr>,
    ) -> DisassemblyBlock {
        let mut ops: Vec<&CfgOp> = cfg_block.ops.iter().collect();
        ops.sort_by_key(|op| op.addr);
        let before = ops.len();
        ops.dedup_by_key(|op| op.addr);
        if ops.len() != before {
            warn!(entry = %cfg_block.addr, "duplicate instruction addresses dropped");
        }

        let instrs = ops
            .iter()
            .map(|op| tokens::build_instruction(op, &self.options, palette, entries))
            .collect();
        let header = block_header(function, cfg_block, palette);
        let mut block = DisassemblyBlock::new(cfg_block.addr, header, instrs);

        let edges = classify_edges(cfg_block, ops.last().copied());
        block.set_edges(edges.true_path, edges.false_path);
        block.set_terminal(block.true_path().is_none() && block.false_path().is_none());
        block.set_indirect_call(
            ops.iter()
                .any(|op| op.op_kind() == OpKind::IndirectCall),
        );
        block
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct BlockEdges {
    true_path: Option<Addr>,
    false_path: Option<Addr>,
}

/// Edge classification from the block's final instruction.
///
/// Conditional branches take the branch target as the true path and the fallthrough as the false
/// path; unconditional transfers only have a true path; returns and traps have neither.
fn classify_edges(block: &CfgBlock, last: Option<&CfgOp>) -> BlockEdges {
    let kind = last.map(CfgOp::op_kind).unwrap_or(OpKind::Other);
    let target = block.jump.or_else(|| last.and_then(|op| op.jump));

    match kind {
        OpKind::Ret | OpKind::Trap => BlockEdges::default(),
        OpKind::CondJump => BlockEdges {
            true_path: target,
            false_path: block
                .fail
                .or_else(|| last.map(|op| op.addr.offset(op.size))),
        },
        OpKind::Jump | OpKind::IndirectJump => BlockEdges {
            true_path: target,
            false_path: None,
        },
        OpKind::Other | OpKind::Call | OpKind::IndirectCall => match (block.jump, block.fail) {
            (Some(jump), Some(fail)) => BlockEdges {
                true_path: Some(jump),
                false_path: Some(fail),
            },
            (jump, fail) => BlockEdges {
                true_path: jump.or(fail),
                false_path: None,
            },
        },
    }
}

fn block_header(function: &FunctionCfg, block: &CfgBlock, palette: &Palette) -> RichText {
    let mut names: Vec<String> = Vec::new();
    if block.addr == function.addr {
        names.push(function.name.clone());
    }
    for label in &block.labels {
        let label = tokens::expand_tabs(label.trim());
        if !label.is_empty() && !names.contains(&label) {
            names.push(label);
        }
    }
    if names.is_empty() {
        names.push(format!("loc_{:x}", block.addr));
    }

    let mut header = RichText::new();
    for name in names {
        header.push_line(
            [RichSpan::new(format!("{name}:"), palette.label).with_bg(palette.label_bg)]
                .into_iter()
                .collect(),
        );
    }
    header
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildError {
    /// The backend returned nothing for the requested function.
    NoData { addr: Addr },
}

impl fmt::Display for RebuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData { addr } => write!(f, "no function data at {addr}"),
        }
    }
}

impl std::error::Error for RebuildError {}
