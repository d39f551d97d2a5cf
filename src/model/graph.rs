// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::addr::Addr;
use super::block::{BlockMap, DisassemblyBlock};
use super::instr::Instruction;
use super::text::RichText;

pub const EMPTY_GRAPH_TEXT: &str = "No function at this address";

/// The graph currently shown by the view.
///
/// `Empty` carries a single placeholder block so the layout still has something to size; it has
/// no instructions and navigation treats it as "nothing to navigate".
#[derive(Debug, Clone, PartialEq)]
pub enum GraphModel {
    Empty {
        placeholder: DisassemblyBlock,
    },
    Ready {
        function: FunctionInfo,
        header: RichText,
        blocks: BlockMap,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub entry: Addr,
}

impl GraphModel {
    pub fn empty(placeholder_text: RichText) -> Self {
        Self::Empty {
            placeholder: DisassemblyBlock::new(Addr::default(), placeholder_text, Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn blocks(&self) -> Option<&BlockMap> {
        match self {
            Self::Ready { blocks, .. } => Some(blocks),
            Self::Empty { .. } => None,
        }
    }

    pub fn blocks_mut(&mut self) -> Option<&mut BlockMap> {
        match self {
            Self::Ready { blocks, .. } => Some(blocks),
            Self::Empty { .. } => None,
        }
    }

    pub fn function(&self) -> Option<&FunctionInfo> {
        match self {
            Self::Ready { function, .. } => Some(function),
            Self::Empty { .. } => None,
        }
    }

    pub fn header(&self) -> Option<&RichText> {
        match self {
            Self::Ready { header, .. } => Some(header),
            Self::Empty { .. } => None,
        }
    }

    pub fn placeholder(&self) -> Option<&DisassemblyBlock> {
        match self {
            Self::Empty { placeholder } => Some(placeholder),
            Self::Ready { .. } => None,
        }
    }

    pub fn block(&self, entry: Addr) -> Option<&DisassemblyBlock> {
        self.blocks()?.get(entry)
    }

    /// The instruction starting at or covering `addr`, with its owning block.
    pub fn instruction(&self, addr: Addr) -> Option<(&DisassemblyBlock, &Instruction)> {
        let blocks = self.blocks()?;
        blocks.blocks().find_map(|block| {
            block
                .instrs()
                .iter()
                .find(|instr| instr.covers(addr))
                .map(|instr| (block, instr))
        })
    }
}
