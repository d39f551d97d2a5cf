// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use cfgview::backend::{CfgBlock, CfgOp, FunctionCfg, StaticBackend};
use cfgview::model::{Addr, GraphModel};

const BASE: u64 = 0x40_0000;
const OP_SIZE: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumDense,
    LargeLongOperands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionParams {
    pub blocks: usize,
    pub ops_per_block: usize,
    /// Every `branch_every`-th block ends in a conditional jump.
    pub branch_every: usize,
    pub operand_len: usize,
}

impl FunctionParams {
    pub const fn new(
        blocks: usize,
        ops_per_block: usize,
        branch_every: usize,
        operand_len: usize,
    ) -> Self {
        Self {
            blocks,
            ops_per_block,
            branch_every,
            operand_len,
        }
    }
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumDense => "medium_dense",
            Self::LargeLongOperands => "large_long_operands",
        }
    }

    pub const fn params(self) -> FunctionParams {
        match self {
            Self::Small => FunctionParams::new(8, 4, 2, 12),
            Self::MediumDense => FunctionParams::new(40, 8, 2, 16),
            Self::LargeLongOperands => FunctionParams::new(120, 12, 3, 48),
        }
    }
}

fn block_addr(index: usize, params: FunctionParams) -> u64 {
    BASE + (index * params.ops_per_block) as u64 * OP_SIZE
}

fn operand_text(seed: usize, target_len: usize) -> String {
    let mut out = format!("rax, qword [rbp - {:#x}]", (seed % 64) * 8);
    while out.len() < target_len {
        out.push_str(" + rcx");
    }
    out
}

/// A function of `params.blocks` blocks; conditional blocks jump forward two blocks and every
/// fifth block loops back to the start of its region.
pub fn function(params: FunctionParams) -> FunctionCfg {
    let mut blocks = Vec::with_capacity(params.blocks);
    for index in 0..params.blocks {
        let start = block_addr(index, params);
        let last = index + 1 == params.blocks;
        let mut ops: Vec<CfgOp> = (0..params.ops_per_block.saturating_sub(1))
            .map(|op| {
                let addr = start + op as u64 * OP_SIZE;
                CfgOp::new(addr, OP_SIZE, "mov", &operand_text(index + op, params.operand_len))
                    .with_bytes(&[0x48, 0x8b, 0x45, (op & 0xff) as u8])
            })
            .collect();
        let tail = start + params.ops_per_block.saturating_sub(1) as u64 * OP_SIZE;

        let mut block;
        if last {
            ops.push(CfgOp::new(tail, OP_SIZE, "ret", "").with_bytes(&[0xc3, 0x90, 0x90, 0x90]));
            block = CfgBlock::new(start, ops);
        } else if index % params.branch_every == 0 {
            let target_index = if index % 5 == 4 {
                index.saturating_sub(4)
            } else {
                (index + 2).min(params.blocks - 1)
            };
            let target = block_addr(target_index, params);
            ops.push(
                CfgOp::new(tail, OP_SIZE, "jne", &format!("{target:#x}"))
                    .with_bytes(&[0x0f, 0x85, 0x00, 0x00])
                    .with_jump(target),
            );
            block = CfgBlock::new(start, ops)
                .with_jump(target)
                .with_fail(block_addr(index + 1, params));
        } else {
            let next = block_addr(index + 1, params);
            ops.push(
                CfgOp::new(tail, OP_SIZE, "jmp", &format!("{next:#x}"))
                    .with_bytes(&[0xeb, 0x00, 0x90, 0x90])
                    .with_jump(next),
            );
            block = CfgBlock::new(start, ops).with_jump(next);
        }
        if index % 7 == 0 {
            block = block.with_label(&format!("loc.bench_{index}"));
        }
        blocks.push(block);
    }

    FunctionCfg {
        name: "sym.bench".to_owned(),
        addr: Addr::new(BASE),
        blocks,
    }
}

pub fn fixture(case: Case) -> FunctionCfg {
    function(case.params())
}

pub fn backend(case: Case) -> StaticBackend {
    let mut backend = StaticBackend::new();
    backend.insert_function(fixture(case));
    backend
}

/// Every instruction address of the function, in block order.
pub fn instruction_addrs(function: &FunctionCfg) -> Vec<Addr> {
    function
        .blocks
        .iter()
        .flat_map(|block| block.ops.iter().map(|op| op.addr))
        .collect()
}

pub fn checksum_model(model: &GraphModel) -> u64 {
    let Some(blocks) = model.blocks() else {
        return 0;
    };
    let mut acc = 0u64;
    for block in blocks.blocks() {
        acc = acc.wrapping_mul(131).wrapping_add(block.entry().get());
        for instr in block.instrs() {
            acc = acc
                .wrapping_mul(131)
                .wrapping_add(instr.tokens().len() as u64);
            acc = acc
                .wrapping_mul(131)
                .wrapping_add(instr.text().width() as u64);
        }
    }
    acc
}
