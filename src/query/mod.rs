// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only hit testing over blocks.
//!
//! Every query is a pure function of the block model and the font metrics. Coordinates are pixels;
//! block-relative points are measured from the block's top-left corner. All queries are total:
//! out-of-range, negative and non-finite input yields `None`.

use crate::geometry::{self, Point};
use crate::model::{Addr, BlockMap, DisassemblyBlock, Instruction, Token};
use crate::theme::FontMetrics;

pub use crate::geometry::text_origin;

/// What a block-relative point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHit {
    /// Index into the block's instructions.
    pub instr: usize,
    /// Index into the instruction's tokens, when the point is on a token.
    pub token: Option<usize>,
}

fn column(x: f64, metrics: &FontMetrics) -> Option<usize> {
    if !x.is_finite() || x < 0.0 {
        return None;
    }
    let col = (x / metrics.char_width).floor();
    if !col.is_finite() || col >= usize::MAX as f64 {
        return None;
    }
    Some(col as usize)
}

/// Token under text-relative `x` on the instruction's first line.
pub fn resolve_token<'a>(
    instr: &'a Instruction,
    x: f64,
    metrics: &FontMetrics,
) -> Option<&'a Token> {
    token_index(instr, x, metrics).map(|index| &instr.tokens()[index])
}

fn token_index(instr: &Instruction, x: f64, metrics: &FontMetrics) -> Option<usize> {
    let col = column(x, metrics)?;
    if col >= instr.text().width() {
        return None;
    }
    instr
        .tokens()
        .iter()
        .position(|token| token.contains_col(col))
}

/// Instruction and token under a block-relative point.
pub fn hit_test(block: &DisassemblyBlock, point: Point, metrics: &FontMetrics) -> Option<BlockHit> {
    if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    let size = block.size();
    if point.x >= size.width || point.y >= size.height {
        return None;
    }

    let text = point.sub(text_origin(metrics));
    if text.y < 0.0 {
        return None;
    }
    let row = (text.y / metrics.char_height).floor() as usize;
    let header_rows = block.header_text().line_count();
    let mut row = row.checked_sub(header_rows)?;

    for (index, instr) in block.instrs().iter().enumerate() {
        let lines = instr.line_count();
        if row < lines {
            let token = if row == 0 {
                token_index(instr, text.x, metrics)
            } else {
                None
            };
            return Some(BlockHit {
                instr: index,
                token,
            });
        }
        row -= lines;
    }
    None
}

/// Instruction under a block-relative point.
pub fn resolve_instruction<'a>(
    block: &'a DisassemblyBlock,
    point: Point,
    metrics: &FontMetrics,
) -> Option<&'a Instruction> {
    hit_test(block, point, metrics).map(|hit| &block.instrs()[hit.instr])
}

pub fn resolve_address(block: &DisassemblyBlock, point: Point, metrics: &FontMetrics) -> Option<Addr> {
    resolve_instruction(block, point, metrics).map(Instruction::addr)
}

/// Block whose entry is `addr`, else the block with an instruction covering it.
pub fn block_for_address(map: &BlockMap, addr: Addr) -> Option<&DisassemblyBlock> {
    map.get(addr)
        .or_else(|| map.blocks().find(|block| block.instr_index(addr).is_some()))
}

/// Block and instruction index covering `addr`.
pub fn instruction_at(map: &BlockMap, addr: Addr) -> Option<(&DisassemblyBlock, usize)> {
    if let Some(block) = map.get(addr) {
        if let Some(index) = block.instr_index(addr) {
            return Some((block, index));
        }
    }
    map.blocks()
        .find_map(|block| block.instr_index(addr).map(|index| (block, index)))
}

/// Top-left of the text row of instruction `index`, relative to the block.
pub fn instruction_origin(block: &DisassemblyBlock, index: usize, metrics: &FontMetrics) -> Point {
    let rows = block.header_text().line_count()
        + block
            .instrs()
            .iter()
            .take(index)
            .map(Instruction::line_count)
            .sum::<usize>();
    geometry::text_origin(metrics).offset(0.0, metrics.rows_to_px(rows))
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{
        block_for_address, hit_test, instruction_at, instruction_origin, resolve_address,
        resolve_instruction, resolve_token, BlockHit,
    };
    use crate::backend::fixtures;
    use crate::builder::{BuilderOptions, GraphModelBuilder};
    use crate::geometry::Point;
    use crate::model::{Addr, GraphModel, TokenKind};
    use crate::theme::{FontMetrics, Palette};

    fn metrics() -> FontMetrics {
        FontMetrics::new(8.0, 16.0, 12.0).expect("metrics")
    }

    #[fixture]
    fn model() -> GraphModel {
        let options = BuilderOptions {
            show_offsets: false,
            show_bytes: false,
            ..BuilderOptions::default()
        };
        GraphModelBuilder::new(options)
            .build_function(&fixtures::branchy_function(), &Palette::default(), &metrics())
            .expect("model")
    }

    #[rstest]
    fn resolves_tokens_by_column(model: GraphModel) {
        let (_, instr) = model.instruction(Addr::new(0x1000)).expect("instr");
        // "cmp    edi, 0  ; argc == 0?"
        let mnemonic = resolve_token(instr, 0.0, &metrics()).expect("mnemonic");
        assert_eq!(mnemonic.kind, TokenKind::Mnemonic);
        assert_eq!(mnemonic.name, "cmp");

        let register = resolve_token(instr, 7.0 * 8.0 + 4.0, &metrics()).expect("register");
        assert_eq!(register.name, "edi");

        assert!(resolve_token(instr, 4.0 * 8.0, &metrics()).is_none(), "gap after mnemonic");
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    #[case(1.0e300)]
    fn token_lookup_is_total(model: GraphModel, #[case] x: f64) {
        let (_, instr) = model.instruction(Addr::new(0x1000)).expect("instr");
        assert!(resolve_token(instr, x, &metrics()).is_none());
    }

    #[rstest]
    fn resolves_instructions_below_the_header(model: GraphModel) {
        let block = model.block(Addr::new(0x1005)).expect("block");
        let m = metrics();

        // border row, then one header row
        assert_eq!(resolve_instruction(block, Point::new(20.0, 20.0), &m), None);
        let first = resolve_address(block, Point::new(20.0, 2.0 * 16.0 + 1.0), &m);
        assert_eq!(first, Some(Addr::new(0x1005)));
        let third = resolve_address(block, Point::new(20.0, 4.0 * 16.0), &m);
        assert_eq!(third, Some(Addr::new(0x100c)));
        assert_eq!(resolve_address(block, Point::new(20.0, 5.0 * 16.0), &m), None);
        assert_eq!(
            resolve_address(block, Point::new(block.size().width, 2.0 * 16.0), &m),
            None
        );
    }

    #[rstest]
    #[case(Point::new(-0.5, 40.0))]
    #[case(Point::new(10.0, -3.0))]
    #[case(Point::new(f64::NAN, 40.0))]
    #[case(Point::new(10.0, f64::INFINITY))]
    fn block_hit_testing_is_total(model: GraphModel, #[case] point: Point) {
        let block = model.block(Addr::new(0x1005)).expect("block");
        assert_eq!(hit_test(block, point, &metrics()), None);
    }

    #[rstest]
    fn hit_test_reports_token_index(model: GraphModel) {
        let block = model.block(Addr::new(0x1000)).expect("block");
        let m = metrics();
        let origin = instruction_origin(block, 1, &m);
        let hit = hit_test(block, origin.offset(1.0, 1.0), &m).expect("hit");
        assert_eq!(hit, BlockHit { instr: 1, token: Some(0) });
        assert_eq!(block.instrs()[1].tokens()[0].name, "je");
    }

    #[rstest]
    fn finds_blocks_by_entry_or_covering_instruction(model: GraphModel) {
        let map = model.blocks().expect("blocks");
        assert_eq!(
            block_for_address(map, Addr::new(0x1010)).map(|b| b.entry()),
            Some(Addr::new(0x1010))
        );
        assert_eq!(
            block_for_address(map, Addr::new(0x1013)).map(|b| b.entry()),
            Some(Addr::new(0x1010))
        );
        assert!(block_for_address(map, Addr::new(0x2000)).is_none());

        let (block, index) = instruction_at(map, Addr::new(0x100c)).expect("instr");
        assert_eq!((block.entry(), index), (Addr::new(0x1005), 2));
        assert!(instruction_at(map, Addr::new(0x101a)).is_none());
    }
}
