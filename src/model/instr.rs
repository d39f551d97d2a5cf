// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;
use smol_str::SmolStr;

use super::addr::Addr;
use super::text::RichText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Offset,
    Bytes,
    Mnemonic,
    Register,
    Number,
    Address,
    Symbol,
    Comment,
    Punct,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offset => "offset",
            Self::Bytes => "bytes",
            Self::Mnemonic => "mnemonic",
            Self::Register => "register",
            Self::Number => "number",
            Self::Address => "address",
            Self::Symbol => "symbol",
            Self::Comment => "comment",
            Self::Punct => "punct",
        }
    }

    /// Tokens that can be clicked to highlight every equal occurrence.
    pub fn is_highlightable(self) -> bool {
        !matches!(self, Self::Punct | Self::Bytes | Self::Comment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic sub-span of an instruction's plain text.
///
/// `start` and `length` count characters. `instr` refers back to the owning instruction by
/// address; it never owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub length: usize,
    pub kind: TokenKind,
    pub instr: Addr,
    pub name: SmolStr,
    pub content: SmolStr,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn contains_col(&self, col: usize) -> bool {
        col >= self.start && col < self.end()
    }

    /// Address this token points at, when it names one.
    pub fn target(&self) -> Option<Addr> {
        match self.kind {
            TokenKind::Address | TokenKind::Offset => self.content.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    addr: Addr,
    size: u64,
    opcode: Vec<u8>,
    text: RichText,
    full_text: RichText,
    plain_text: String,
    tokens: Vec<Token>,
    jump: Option<Addr>,
}

impl Instruction {
    pub fn new(
        addr: Addr,
        size: u64,
        opcode: Vec<u8>,
        text: RichText,
        full_text: RichText,
        tokens: Vec<Token>,
    ) -> Self {
        let plain_text = text.plain();
        Self {
            addr,
            size,
            opcode,
            text,
            full_text,
            plain_text,
            tokens,
            jump: None,
        }
    }

    pub fn with_jump(mut self, jump: Option<Addr>) -> Self {
        self.jump = jump;
        self
    }

    pub fn addr(&self) -> Addr {
        self.addr
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn end(&self) -> Addr {
        self.addr.offset(self.size)
    }

    /// Whether `addr` falls inside this instruction's bytes. Zero-sized instructions cover their
    /// own address.
    pub fn covers(&self, addr: Addr) -> bool {
        addr == self.addr || (addr > self.addr && addr < self.end())
    }

    pub fn opcode(&self) -> &[u8] {
        &self.opcode
    }

    pub fn text(&self) -> &RichText {
        &self.text
    }

    /// Text as drawn, including continuation lines such as comments rendered below.
    pub fn full_text(&self) -> &RichText {
        &self.full_text
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn jump(&self) -> Option<Addr> {
        self.jump
    }

    pub fn line_count(&self) -> usize {
        self.full_text.line_count().max(1)
    }

    pub fn opcode_hex(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(self.opcode.len() * 2);
        for byte in &self.opcode {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

/// Non-owning handle to a token inside the current block map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenRef {
    pub block: Addr,
    pub instr: Addr,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;
    use smol_str::SmolStr;

    use super::{Instruction, Token, TokenKind};
    use crate::model::{Addr, RichText};

    fn token(start: usize, length: usize, kind: TokenKind, content: &str) -> Token {
        Token {
            start,
            length,
            kind,
            instr: Addr::new(0x1000),
            name: SmolStr::new(content),
            content: SmolStr::new(content),
        }
    }

    #[test]
    fn token_span_is_half_open() {
        let token = token(4, 3, TokenKind::Register, "eax");
        assert!(!token.contains_col(3));
        assert!(token.contains_col(4));
        assert!(token.contains_col(6));
        assert!(!token.contains_col(7));
    }

    #[test]
    fn address_tokens_expose_their_target() {
        assert_eq!(
            token(0, 6, TokenKind::Address, "0x1010").target(),
            Some(Addr::new(0x1010))
        );
        assert_eq!(token(0, 3, TokenKind::Register, "eax").target(), None);
    }

    #[test]
    fn instruction_covers_its_byte_range() {
        let text = RichText::single("nop", Color::Gray, None);
        let instr = Instruction::new(
            Addr::new(0x1000),
            2,
            vec![0x66, 0x90],
            text.clone(),
            text,
            Vec::new(),
        );
        assert!(instr.covers(Addr::new(0x1000)));
        assert!(instr.covers(Addr::new(0x1001)));
        assert!(!instr.covers(Addr::new(0x1002)));
        assert_eq!(instr.opcode_hex(), "6690");
        assert_eq!(instr.plain_text(), "nop");
    }
}
