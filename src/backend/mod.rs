// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Collaborator interfaces.
//!
//! The disassembly engine, the debugger and the seek source all live outside this crate. They are
//! reached through [`DisassemblyBackend`] (inbound data) and [`SeekSink`] (outbound seeks).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Addr;

pub mod fixtures;
mod static_backend;

pub use static_backend::{BackendError, BackendFile, StaticBackend};

/// One decoded instruction as delivered by the disassembly engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgOp {
    pub addr: Addr,
    pub size: u64,
    #[serde(default, with = "hex_bytes")]
    pub bytes: Vec<u8>,
    pub mnemonic: String,
    #[serde(default)]
    pub operands: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// Backend classification; inferred from the mnemonic when absent.
    #[serde(default)]
    pub kind: Option<OpKind>,
    /// Static branch/call target, when the engine resolved one.
    #[serde(default)]
    pub jump: Option<Addr>,
}

impl CfgOp {
    pub fn new(addr: u64, size: u64, mnemonic: &str, operands: &str) -> Self {
        Self {
            addr: Addr::new(addr),
            size,
            bytes: Vec::new(),
            mnemonic: mnemonic.to_owned(),
            operands: operands.to_owned(),
            comment: None,
            kind: None,
            jump: None,
        }
    }

    pub fn with_bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes = bytes.to_vec();
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_owned());
        self
    }

    pub fn with_jump(mut self, jump: u64) -> Self {
        self.jump = Some(Addr::new(jump));
        self
    }

    pub fn op_kind(&self) -> OpKind {
        self.kind
            .unwrap_or_else(|| OpKind::infer(&self.mnemonic, &self.operands))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgBlock {
    pub addr: Addr,
    /// Taken target (or the only successor of an unconditional transfer).
    #[serde(default)]
    pub jump: Option<Addr>,
    /// Fallthrough target of a conditional branch.
    #[serde(default)]
    pub fail: Option<Addr>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub ops: Vec<CfgOp>,
}

impl CfgBlock {
    pub fn new(addr: u64, ops: Vec<CfgOp>) -> Self {
        Self {
            addr: Addr::new(addr),
            jump: None,
            fail: None,
            labels: Vec::new(),
            ops,
        }
    }

    pub fn with_jump(mut self, jump: u64) -> Self {
        self.jump = Some(Addr::new(jump));
        self
    }

    pub fn with_fail(mut self, fail: u64) -> Self {
        self.fail = Some(Addr::new(fail));
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.labels.push(label.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCfg {
    pub name: String,
    pub addr: Addr,
    pub blocks: Vec<CfgBlock>,
}

impl FunctionCfg {
    pub fn covers(&self, addr: Addr) -> bool {
        self.blocks.iter().any(|block| {
            block.addr == addr
                || block
                    .ops
                    .iter()
                    .any(|op| op.addr == addr || (addr > op.addr && addr < op.addr.offset(op.size)))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub addr: Addr,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Control-transfer class of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Other,
    Jump,
    IndirectJump,
    CondJump,
    Call,
    IndirectCall,
    Ret,
    Trap,
}

impl OpKind {
    /// Best-effort classification from the textual mnemonic (x86 and ARM spellings).
    pub fn infer(mnemonic: &str, operands: &str) -> Self {
        let m = mnemonic.trim().to_ascii_lowercase();
        let ops = operands.trim().to_ascii_lowercase();
        let direct_target = looks_like_direct_target(&ops);

        match m.as_str() {
            "ret" | "retn" | "retf" | "iret" | "iretd" | "iretq" | "eret" => Self::Ret,
            "hlt" | "ud2" | "int3" | "brk" | "udf" => Self::Trap,
            "bx" if ops == "lr" => Self::Ret,
            "jmp" | "b" | "br" | "bx" => {
                if direct_target {
                    Self::Jump
                } else {
                    Self::IndirectJump
                }
            }
            "call" | "bl" | "blx" | "blr" => {
                if direct_target {
                    Self::Call
                } else {
                    Self::IndirectCall
                }
            }
            "loop" | "loope" | "loopne" | "jcxz" | "jecxz" | "jrcxz" | "cbz" | "cbnz" | "tbz"
            | "tbnz" => Self::CondJump,
            _ if m.starts_with('j') && m.len() <= 4 => Self::CondJump,
            _ if m.starts_with("b.") => Self::CondJump,
            _ if is_arm_conditional_branch(&m) => Self::CondJump,
            _ => Self::Other,
        }
    }

    pub fn is_return_like(self) -> bool {
        matches!(self, Self::Ret | Self::Trap)
    }
}

fn looks_like_direct_target(operands: &str) -> bool {
    if operands.is_empty() || operands.contains('[') {
        return false;
    }
    operands.starts_with("0x")
        || operands.starts_with('#')
        || operands.chars().next().is_some_and(|ch| ch.is_ascii_digit())
        || operands.starts_with("sym.")
        || operands.starts_with("fcn.")
        || operands.starts_with("loc.")
        || operands.starts_with("reloc.")
}

fn is_arm_conditional_branch(mnemonic: &str) -> bool {
    const CONDS: [&str; 14] = [
        "eq", "ne", "cs", "cc", "mi", "pl", "vs", "vc", "hi", "ls", "ge", "lt", "gt", "le",
    ];
    mnemonic
        .strip_prefix('b')
        .is_some_and(|cond| CONDS.contains(&cond))
}

/// Source of disassembly data, breakpoints and debugger state.
pub trait DisassemblyBackend {
    /// CFG of the function containing `addr`, or `None` when there is no function there.
    fn function_at(&self, addr: Addr) -> Option<FunctionCfg>;

    fn breakpoints(&self) -> Vec<Breakpoint> {
        Vec::new()
    }

    /// Program counter of the active debug session.
    fn program_counter(&self) -> Option<Addr> {
        None
    }
}

impl<B: DisassemblyBackend + ?Sized> DisassemblyBackend for Box<B> {
    fn function_at(&self, addr: Addr) -> Option<FunctionCfg> {
        (**self).function_at(addr)
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        (**self).breakpoints()
    }

    fn program_counter(&self) -> Option<Addr> {
        (**self).program_counter()
    }
}

/// Receiver of locally initiated seeks. Delivery is fire-and-forget.
pub trait SeekSink {
    fn seek(&mut self, addr: Addr) -> Result<(), SeekError>;
}

impl<F> SeekSink for F
where
    F: FnMut(Addr) -> Result<(), SeekError>,
{
    fn seek(&mut self, addr: Addr) -> Result<(), SeekError> {
        self(addr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekError {
    Rejected { addr: Addr, reason: String },
    Disconnected,
}

impl fmt::Display for SeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { addr, reason } => write!(f, "seek to {addr} rejected: {reason}"),
            Self::Disconnected => f.write_str("seek sink disconnected"),
        }
    }
}

impl std::error::Error for SeekError {}

mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            let _ = write!(out, "{byte:02x}");
        }
        serializer.serialize_str(&out)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
        if !compact.is_ascii() || compact.len() % 2 != 0 {
            return Err(de::Error::custom(format!("malformed hex bytes: {raw}")));
        }
        (0..compact.len())
            .step_by(2)
            .map(|idx| {
                u8::from_str_radix(&compact[idx..idx + 2], 16)
                    .map_err(|_| de::Error::custom(format!("invalid hex bytes: {raw}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{CfgOp, OpKind};

    #[rstest]
    #[case("ret", "", OpKind::Ret)]
    #[case("hlt", "", OpKind::Trap)]
    #[case("jmp", "0x1018", OpKind::Jump)]
    #[case("jmp", "rax", OpKind::IndirectJump)]
    #[case("je", "0x1010", OpKind::CondJump)]
    #[case("jne", "0x1010", OpKind::CondJump)]
    #[case("call", "sym.imp.puts", OpKind::Call)]
    #[case("call", "qword [rbx]", OpKind::IndirectCall)]
    #[case("call", "rbx", OpKind::IndirectCall)]
    #[case("bl", "0x4000", OpKind::Call)]
    #[case("blr", "x8", OpKind::IndirectCall)]
    #[case("b.ne", "0x4010", OpKind::CondJump)]
    #[case("beq", "0x4010", OpKind::CondJump)]
    #[case("bx", "lr", OpKind::Ret)]
    #[case("mov", "eax, 1", OpKind::Other)]
    fn infers_op_kind_from_mnemonic(
        #[case] mnemonic: &str,
        #[case] operands: &str,
        #[case] expected: OpKind,
    ) {
        assert_eq!(OpKind::infer(mnemonic, operands), expected);
    }

    #[test]
    fn explicit_kind_wins_over_inference() {
        let mut op = CfgOp::new(0x1000, 2, "jmp", "rax");
        op.kind = Some(OpKind::Jump);
        assert_eq!(op.op_kind(), OpKind::Jump);
    }

    #[test]
    fn op_bytes_round_trip_as_hex_strings() {
        let json = r#"{"addr":"0x1000","size":2,"bytes":"74 0b","mnemonic":"je","operands":"0x100d"}"#;
        let op: CfgOp = serde_json::from_str(json).expect("op");
        assert_eq!(op.bytes, vec![0x74, 0x0b]);
        let back = serde_json::to_value(&op).expect("json");
        assert_eq!(back["bytes"], "740b");
    }

    #[test]
    fn op_bytes_reject_odd_hex() {
        let json = r#"{"addr":"0x1000","size":1,"bytes":"7","mnemonic":"nop"}"#;
        assert!(serde_json::from_str::<CfgOp>(json).is_err());
    }
}
