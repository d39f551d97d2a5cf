// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use smol_str::SmolStr;

use super::BuilderOptions;
use crate::backend::CfgOp;
use crate::model::{Addr, Instruction, RichLine, RichSpan, RichText, Token, TokenKind};
use crate::theme::Palette;

const TAB_WIDTH: usize = 4;
const MNEMONIC_WIDTH: usize = 6;
const SIZE_KEYWORDS: [&str; 10] = [
    "byte", "word", "dword", "qword", "tword", "xmmword", "ymmword", "zmmword", "ptr", "short",
];

fn operand_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?P<sym>\b(?:sym|fcn|loc|reloc|str|obj|section|imp)\.[A-Za-z0-9_.@$]+)
            | (?P<num>\#?-?(?:0x[0-9A-Fa-f]+|\b[0-9]+\b))
            | (?P<word>[A-Za-z_][A-Za-z0-9_.]*)
            | (?P<punct>[\[\]+\-*,:!{}()\#])
            ",
        )
        .expect("operand token regex")
    })
}

/// Accumulates colored runs for one line and records a token per semantic run.
struct LineBuilder<'a> {
    palette: &'a Palette,
    instr: Addr,
    line: RichLine,
    tokens: Vec<Token>,
    col: usize,
}

impl<'a> LineBuilder<'a> {
    fn new(palette: &'a Palette, instr: Addr) -> Self {
        Self {
            palette,
            instr,
            line: RichLine::new(),
            tokens: Vec::new(),
            col: 0,
        }
    }

    fn plain(&mut self, text: &str) {
        self.col += text.chars().count();
        self.line.push(RichSpan::new(text, self.palette.text));
    }

    fn token(&mut self, text: &str, kind: TokenKind, content: &str) {
        let length = text.chars().count();
        if length == 0 {
            return;
        }
        self.line.push(
            RichSpan::new(text, self.palette.token_color(kind))
                .with_bg(self.palette.token_background(kind)),
        );
        self.tokens.push(Token {
            start: self.col,
            length,
            kind,
            instr: self.instr,
            name: SmolStr::new(text),
            content: SmolStr::new(content),
        });
        self.col += length;
    }

    fn pad_to(&mut self, col: usize) {
        if self.col < col {
            let pad = " ".repeat(col - self.col);
            self.plain(&pad);
        }
    }

    fn operands(&mut self, operands: &str, jump: Option<Addr>, entries: &BTreeSet<Addr>) {
        let mut last = 0;
        for caps in operand_token_re().captures_iter(operands) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                self.plain(&operands[last..whole.start()]);
            }
            let text = whole.as_str();
            if caps.name("sym").is_some() {
                self.token(text, TokenKind::Symbol, text);
            } else if caps.name("num").is_some() {
                match parse_number(text).map(Addr::new) {
                    Some(value) if Some(value) == jump || entries.contains(&value) => {
                        self.token(text, TokenKind::Address, &value.to_string());
                    }
                    _ => self.token(text, TokenKind::Number, text),
                }
            } else if caps.name("word").is_some() {
                if SIZE_KEYWORDS.contains(&text.to_ascii_lowercase().as_str()) {
                    self.plain(text);
                } else {
                    self.token(text, TokenKind::Register, text);
                }
            } else {
                self.token(text, TokenKind::Punct, text);
            }
            last = whole.end();
        }
        if last < operands.len() {
            self.plain(&operands[last..]);
        }
    }

    fn finish(self) -> (RichLine, Vec<Token>) {
        (self.line, self.tokens)
    }
}

fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim_start_matches('#');
    if text.starts_with('-') {
        return None;
    }
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

pub(super) fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

fn bytes_column(op: &CfgOp, max_bytes: usize) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    if op.bytes.len() <= max_bytes {
        for byte in &op.bytes {
            let _ = write!(out, "{byte:02x}");
        }
    } else {
        for byte in op.bytes.iter().take(max_bytes.saturating_sub(1)) {
            let _ = write!(out, "{byte:02x}");
        }
        out.push_str("..");
    }
    out
}

/// Builds the styled text and tokens for one instruction.
///
/// Layout: `offset  bytes  mnemonic operands  ; comment`, offsets and bytes being optional. With
/// `comments_below` the comment moves to a second, indented line of the full text.
pub(super) fn build_instruction(
    op: &CfgOp,
    options: &BuilderOptions,
    palette: &Palette,
    entries: &BTreeSet<Addr>,
) -> Instruction {
    let mut line = LineBuilder::new(palette, op.addr);

    if options.show_offsets {
        let offset = format!("{:#010x}", op.addr.get());
        line.token(&offset, TokenKind::Offset, &op.addr.to_string());
        line.plain("  ");
    }

    if options.show_bytes && options.max_bytes > 0 {
        let start = line.col;
        let bytes = bytes_column(op, options.max_bytes);
        line.token(&bytes, TokenKind::Bytes, &bytes);
        line.pad_to(start + options.max_bytes * 2 + 2);
    }

    let mnemonic = expand_tabs(op.mnemonic.trim());
    let operands = expand_tabs(op.operands.trim());
    let mnemonic_start = line.col;
    line.token(&mnemonic, TokenKind::Mnemonic, &mnemonic);
    if !operands.is_empty() {
        line.pad_to(mnemonic_start + MNEMONIC_WIDTH);
        line.plain(" ");
        line.operands(&operands, op.jump, entries);
    }

    let comment = op
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|comment| !comment.is_empty())
        .map(|comment| format!("; {}", expand_tabs(comment)));

    let mut below = None;
    if let Some(comment) = comment.as_deref() {
        if options.comments_below {
            below = Some(comment.to_owned());
        } else {
            line.plain("  ");
            line.token(comment, TokenKind::Comment, comment);
        }
    }

    let (rich_line, tokens) = line.finish();
    let text = RichText::from_line(rich_line);
    let mut full_text = text.clone();
    if let Some(comment) = below {
        let mut comment_line = RichLine::new();
        comment_line.push(
            RichSpan::new(format!("    {comment}"), palette.comment).with_bg(palette.comment_bg),
        );
        full_text.push_line(comment_line);
    }

    Instruction::new(
        op.addr,
        op.size,
        op.bytes.clone(),
        text,
        full_text,
        tokens,
    )
    .with_jump(op.jump.and_then(Addr::non_zero))
}
