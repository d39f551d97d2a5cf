// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in functions used by the demo TUI and by tests.

use super::{CfgBlock, CfgOp, FunctionCfg, StaticBackend};
use crate::model::Addr;

/// Diamond-shaped function: `0x1000` branches to `0x1010` (taken) or `0x1005` (fallthrough), both
/// join at the returning block `0x1018`.
pub fn branchy_function() -> FunctionCfg {
    FunctionCfg {
        name: "sym.demo".to_owned(),
        addr: Addr::new(0x1000),
        blocks: vec![
            CfgBlock::new(
                0x1000,
                vec![
                    CfgOp::new(0x1000, 3, "cmp", "edi, 0")
                        .with_bytes(&[0x83, 0xff, 0x00])
                        .with_comment("argc == 0?"),
                    CfgOp::new(0x1003, 2, "je", "0x1010")
                        .with_bytes(&[0x74, 0x0b])
                        .with_jump(0x1010),
                ],
            )
            .with_jump(0x1010)
            .with_fail(0x1005),
            CfgBlock::new(
                0x1005,
                vec![
                    CfgOp::new(0x1005, 5, "mov", "eax, 1")
                        .with_bytes(&[0xb8, 0x01, 0x00, 0x00, 0x00]),
                    CfgOp::new(0x100a, 2, "call", "qword [rbx]").with_bytes(&[0xff, 0x13]),
                    CfgOp::new(0x100c, 2, "jmp", "0x1018")
                        .with_bytes(&[0xeb, 0x0a])
                        .with_jump(0x1018),
                ],
            )
            .with_jump(0x1018),
            CfgBlock::new(
                0x1010,
                vec![
                    CfgOp::new(0x1010, 2, "xor", "eax, eax").with_bytes(&[0x31, 0xc0]),
                    CfgOp::new(0x1012, 5, "mov", "ecx, 0x10")
                        .with_bytes(&[0xb9, 0x10, 0x00, 0x00, 0x00]),
                    CfgOp::new(0x1017, 1, "nop", "").with_bytes(&[0x90]),
                ],
            )
            .with_jump(0x1018),
            CfgBlock::new(
                0x1018,
                vec![
                    CfgOp::new(0x1018, 1, "pop", "rbp").with_bytes(&[0x5d]),
                    CfgOp::new(0x1019, 1, "ret", "").with_bytes(&[0xc3]),
                ],
            ),
        ],
    }
}

/// Counting loop: `0x3005` branches back to itself until `ecx` hits zero.
pub fn looping_function() -> FunctionCfg {
    FunctionCfg {
        name: "sym.countdown".to_owned(),
        addr: Addr::new(0x3000),
        blocks: vec![
            CfgBlock::new(
                0x3000,
                vec![CfgOp::new(0x3000, 5, "mov", "ecx, 0xa")
                    .with_bytes(&[0xb9, 0x0a, 0x00, 0x00, 0x00])],
            )
            .with_jump(0x3005),
            CfgBlock::new(
                0x3005,
                vec![
                    CfgOp::new(0x3005, 2, "dec", "ecx").with_bytes(&[0xff, 0xc9]),
                    CfgOp::new(0x3007, 2, "jne", "0x3005")
                        .with_bytes(&[0x75, 0xfc])
                        .with_jump(0x3005),
                ],
            )
            .with_label("loc.loop")
            .with_jump(0x3005)
            .with_fail(0x3009),
            CfgBlock::new(
                0x3009,
                vec![CfgOp::new(0x3009, 1, "ret", "").with_bytes(&[0xc3])],
            ),
        ],
    }
}

/// Backend with both fixture functions, two breakpoints and a live program counter.
pub fn demo_backend() -> StaticBackend {
    let mut backend = StaticBackend::new();
    backend.insert_function(branchy_function());
    backend.insert_function(looping_function());
    backend.set_breakpoint(Addr::new(0x1005), true);
    backend.set_breakpoint(Addr::new(0x1012), false);
    backend.set_program_counter(Some(Addr::new(0x1003)));
    backend
}
