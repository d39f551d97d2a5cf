// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Disassembly graph model.
//!
//! A function is a [`BlockMap`] of basic blocks keyed by entry address; each block owns its
//! instructions and each instruction owns its styled text and tokens.

pub mod addr;
pub mod block;
pub mod graph;
pub mod instr;
pub mod text;

pub use addr::{Addr, AddrError, AddrRange};
pub use block::{BlockMap, BlockSize, DisassemblyBlock, EdgeKind, GraphEdge};
pub use graph::{FunctionInfo, GraphModel, EMPTY_GRAPH_TEXT};
pub use instr::{Instruction, Token, TokenKind, TokenRef};
pub use text::{RichLine, RichSpan, RichText};
