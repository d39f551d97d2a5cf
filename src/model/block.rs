// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::Serialize;

use super::addr::Addr;
use super::instr::Instruction;
use super::text::RichText;

/// Rendered size of a block in pixels, as required by the layout before positioning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BlockSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisassemblyBlock {
    entry: Addr,
    header_text: RichText,
    instrs: Vec<Instruction>,
    true_path: Option<Addr>,
    false_path: Option<Addr>,
    terminal: bool,
    indirect_call: bool,
    size: BlockSize,
}

impl DisassemblyBlock {
    pub fn new(entry: Addr, header_text: RichText, instrs: Vec<Instruction>) -> Self {
        Self {
            entry,
            header_text,
            instrs,
            true_path: None,
            false_path: None,
            terminal: false,
            indirect_call: false,
            size: BlockSize::default(),
        }
    }

    pub fn entry(&self) -> Addr {
        self.entry
    }

    pub fn header_text(&self) -> &RichText {
        &self.header_text
    }

    pub fn instrs(&self) -> &[Instruction] {
        &self.instrs
    }

    pub fn true_path(&self) -> Option<Addr> {
        self.true_path
    }

    pub fn false_path(&self) -> Option<Addr> {
        self.false_path
    }

    pub fn terminal(&self) -> bool {
        self.terminal
    }

    pub fn indirect_call(&self) -> bool {
        self.indirect_call
    }

    pub fn size(&self) -> BlockSize {
        self.size
    }

    /// Zero targets mean "no edge" and are dropped.
    pub fn set_edges(&mut self, true_path: Option<Addr>, false_path: Option<Addr>) {
        self.true_path = true_path.and_then(Addr::non_zero);
        self.false_path = false_path.and_then(Addr::non_zero);
    }

    pub fn set_terminal(&mut self, terminal: bool) {
        self.terminal = terminal;
    }

    pub fn set_indirect_call(&mut self, indirect_call: bool) {
        self.indirect_call = indirect_call;
    }

    pub fn set_size(&mut self, size: BlockSize) {
        self.size = size;
    }

    /// Lines drawn inside the block: header plus every instruction line.
    pub fn line_count(&self) -> usize {
        self.header_text.line_count()
            + self
                .instrs
                .iter()
                .map(Instruction::line_count)
                .sum::<usize>()
    }

    /// Widest drawn line in columns.
    pub fn text_width(&self) -> usize {
        self.instrs
            .iter()
            .map(|instr| instr.full_text().width())
            .chain(std::iter::once(self.header_text.width()))
            .max()
            .unwrap_or(0)
    }

    /// First address past the last instruction.
    pub fn end(&self) -> Addr {
        self.instrs
            .last()
            .map(Instruction::end)
            .unwrap_or(self.entry)
    }

    pub fn covers(&self, addr: Addr) -> bool {
        addr == self.entry || self.instrs.iter().any(|instr| instr.covers(addr))
    }

    /// Index of the instruction covering `addr`.
    pub fn instr_index(&self, addr: Addr) -> Option<usize> {
        self.instrs.iter().position(|instr| instr.covers(addr))
    }

    /// Outgoing edges in a stable order: true path first.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKind, Addr)> + '_ {
        let conditional = self.true_path.is_some() && self.false_path.is_some();
        let true_kind = if conditional {
            EdgeKind::True
        } else {
            EdgeKind::Jump
        };
        self.true_path
            .map(|target| (true_kind, target))
            .into_iter()
            .chain(self.false_path.map(|target| {
                let kind = if conditional {
                    EdgeKind::False
                } else {
                    EdgeKind::Jump
                };
                (kind, target)
            }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Taken side of a conditional branch.
    True,
    /// Fallthrough side of a conditional branch.
    False,
    /// Unconditional transfer.
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GraphEdge {
    pub from: Addr,
    pub to: Addr,
    pub kind: EdgeKind,
}

/// Entry address → block. Always replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockMap {
    blocks: BTreeMap<Addr, DisassemblyBlock>,
}

impl BlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a block. Returns the previous block with the same entry, if any.
    pub fn insert(&mut self, block: DisassemblyBlock) -> Option<DisassemblyBlock> {
        self.blocks.insert(block.entry(), block)
    }

    pub fn get(&self, entry: Addr) -> Option<&DisassemblyBlock> {
        self.blocks.get(&entry)
    }

    pub fn contains_entry(&self, entry: Addr) -> bool {
        self.blocks.contains_key(&entry)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &DisassemblyBlock> {
        self.blocks.values()
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut DisassemblyBlock> {
        self.blocks.values_mut()
    }

    pub fn entries(&self) -> impl Iterator<Item = Addr> + '_ {
        self.blocks.keys().copied()
    }

    /// Every edge of the graph, including edges whose target is not a block entry.
    pub fn edges(&self) -> Vec<GraphEdge> {
        let mut edges = Vec::new();
        for block in self.blocks.values() {
            for (kind, to) in block.edges() {
                edges.push(GraphEdge {
                    from: block.entry(),
                    to,
                    kind,
                });
            }
        }
        edges
    }

    /// Blocks with an edge into `entry`, ordered by entry address.
    pub fn predecessors(&self, entry: Addr) -> Vec<&DisassemblyBlock> {
        self.blocks
            .values()
            .filter(|block| block.true_path() == Some(entry) || block.false_path() == Some(entry))
            .collect()
    }

    /// Lowest and highest-exclusive address covered by the map.
    pub fn address_range(&self) -> Option<(Addr, Addr)> {
        let start = self.blocks.keys().next().copied()?;
        let end = self.blocks.values().map(DisassemblyBlock::end).max()?;
        Some((start, end))
    }
}
