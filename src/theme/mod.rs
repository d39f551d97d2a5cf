// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Colors and font metrics.
//!
//! [`ThemeManager`] owns the palette and the precomputed [`FontMetrics`] record shared by the
//! model builder (block sizing) and the renderer. Both are recomputed from a [`ThemeSource`]
//! whenever the theme or the font changes.

use std::fmt;

use ratatui::style::Color;
use tracing::{debug, warn};

use crate::events::ViewEvent;
use crate::model::{EdgeKind, TokenKind};

mod source;

pub use source::{EnvThemeSource, StaticThemeSource, ThemeSource, FONT_ENV, PALETTE_ENV};

/// Fixed-width character metrics, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub char_width: f64,
    pub char_height: f64,
    /// Distance from the top of a row to the text baseline.
    pub baseline: f64,
}

impl FontMetrics {
    /// One terminal cell per character.
    pub const TERMINAL_CELL: Self = Self {
        char_width: 1.0,
        char_height: 1.0,
        baseline: 1.0,
    };

    pub fn new(char_width: f64, char_height: f64, baseline: f64) -> Result<Self, ThemeError> {
        Self {
            char_width,
            char_height,
            baseline,
        }
        .validated()
    }

    pub(crate) fn validated(self) -> Result<Self, ThemeError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.char_width) || !positive(self.char_height) {
            return Err(ThemeError::InvalidFont(format!(
                "character size must be positive, got {}x{}",
                self.char_width, self.char_height
            )));
        }
        if !self.baseline.is_finite() || self.baseline < 0.0 || self.baseline > self.char_height {
            return Err(ThemeError::InvalidFont(format!(
                "baseline {} outside 0..={}",
                self.baseline, self.char_height
            )));
        }
        Ok(self)
    }

    pub fn cols_to_px(&self, cols: usize) -> f64 {
        cols as f64 * self.char_width
    }

    pub fn rows_to_px(&self, rows: usize) -> f64 {
        rows as f64 * self.char_height
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::TERMINAL_CELL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub graph_node: Color,
    pub border: Color,
    pub text: Color,
    /// Band behind the instruction under the cursor.
    pub selected_background: Color,
    /// Band behind instructions inside the active selection range.
    pub selection: Color,
    /// Band behind the instruction at the debugger's program counter.
    pub pc_band: Color,
    pub cip: Color,
    pub jmp: Color,
    pub br_true: Color,
    pub br_false: Color,
    pub ret_shadow: Color,
    pub indirectcall_shadow: Color,
    pub comment: Color,
    pub comment_bg: Option<Color>,
    pub label: Color,
    pub label_bg: Option<Color>,
    pub address: Color,
    pub address_bg: Option<Color>,
    pub bytes: Color,
    pub mnemonic: Color,
    pub register: Color,
    pub number: Color,
    pub symbol: Color,
    pub token_highlight: Color,
    pub breakpoint: Color,
    pub disabled_breakpoint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::Rgb(0x25, 0x28, 0x2c),
            graph_node: Color::Rgb(0x2b, 0x2f, 0x35),
            border: Color::Rgb(0x55, 0x5a, 0x66),
            text: Color::Rgb(0xd7, 0xda, 0xe0),
            selected_background: Color::Rgb(0x3a, 0x3f, 0x4b),
            selection: Color::Rgb(0x3b, 0x52, 0x6b),
            pc_band: Color::Rgb(0x5a, 0x3a, 0x1a),
            cip: Color::Rgb(0xff, 0xb8, 0x6c),
            jmp: Color::Rgb(0x5d, 0x9c, 0xec),
            br_true: Color::Rgb(0x57, 0xc1, 0x5a),
            br_false: Color::Rgb(0xe0, 0x5a, 0x52),
            ret_shadow: Color::Rgb(0x80, 0x40, 0x40),
            indirectcall_shadow: Color::Rgb(0x80, 0x60, 0x20),
            comment: Color::Rgb(0x9a, 0xa0, 0xa6),
            comment_bg: None,
            label: Color::Rgb(0xe5, 0xc0, 0x7b),
            label_bg: None,
            address: Color::Rgb(0x7f, 0x84, 0x8e),
            address_bg: None,
            bytes: Color::Rgb(0x5c, 0x63, 0x70),
            mnemonic: Color::Rgb(0x61, 0xaf, 0xef),
            register: Color::Rgb(0xc6, 0x78, 0xdd),
            number: Color::Rgb(0xd1, 0x9a, 0x66),
            symbol: Color::Rgb(0x56, 0xb6, 0xc2),
            token_highlight: Color::Rgb(0x4b, 0x4b, 0x20),
            breakpoint: Color::Rgb(0xe0, 0x3c, 0x31),
            disabled_breakpoint: Color::Rgb(0x80, 0x80, 0x80),
        }
    }
}

impl Palette {
    /// Overrides one entry by its snake_case field name.
    pub fn set_named(&mut self, key: &str, color: Color) -> Result<(), ThemeError> {
        let slot = match key {
            "background" => &mut self.background,
            "graph_node" => &mut self.graph_node,
            "border" => &mut self.border,
            "text" => &mut self.text,
            "selected_background" => &mut self.selected_background,
            "selection" => &mut self.selection,
            "pc_band" => &mut self.pc_band,
            "cip" => &mut self.cip,
            "jmp" => &mut self.jmp,
            "br_true" => &mut self.br_true,
            "br_false" => &mut self.br_false,
            "ret_shadow" => &mut self.ret_shadow,
            "indirectcall_shadow" => &mut self.indirectcall_shadow,
            "comment" => &mut self.comment,
            "label" => &mut self.label,
            "address" => &mut self.address,
            "bytes" => &mut self.bytes,
            "mnemonic" => &mut self.mnemonic,
            "register" => &mut self.register,
            "number" => &mut self.number,
            "symbol" => &mut self.symbol,
            "token_highlight" => &mut self.token_highlight,
            "breakpoint" => &mut self.breakpoint,
            "disabled_breakpoint" => &mut self.disabled_breakpoint,
            "comment_bg" => {
                self.comment_bg = Some(color);
                return Ok(());
            }
            "label_bg" => {
                self.label_bg = Some(color);
                return Ok(());
            }
            "address_bg" => {
                self.address_bg = Some(color);
                return Ok(());
            }
            _ => return Err(ThemeError::UnknownPaletteKey(key.to_owned())),
        };
        *slot = color;
        Ok(())
    }

    pub fn token_color(&self, kind: TokenKind) -> Color {
        match kind {
            TokenKind::Offset => self.address,
            TokenKind::Bytes => self.bytes,
            TokenKind::Mnemonic => self.mnemonic,
            TokenKind::Register => self.register,
            TokenKind::Number => self.number,
            TokenKind::Address | TokenKind::Symbol => self.symbol,
            TokenKind::Comment => self.comment,
            TokenKind::Punct => self.text,
        }
    }

    pub fn token_background(&self, kind: TokenKind) -> Option<Color> {
        match kind {
            TokenKind::Offset => self.address_bg,
            TokenKind::Comment => self.comment_bg,
            _ => None,
        }
    }

    pub fn edge_color(&self, kind: EdgeKind) -> Color {
        match kind {
            EdgeKind::True => self.br_true,
            EdgeKind::False => self.br_false,
            EdgeKind::Jump => self.jmp,
        }
    }
}

pub struct ThemeManager {
    source: Box<dyn ThemeSource>,
    palette: Palette,
    metrics: FontMetrics,
    rev: u64,
}

impl ThemeManager {
    /// Builds the manager and runs the first-time font and palette setup. Configuration errors
    /// are logged and the defaults are kept.
    pub fn new(source: Box<dyn ThemeSource>) -> Self {
        let mut manager = Self {
            source,
            palette: Palette::default(),
            metrics: FontMetrics::default(),
            rev: 0,
        };
        if let Err(err) = manager.init_font() {
            warn!(%err, "font configuration rejected; using defaults");
        }
        if let Err(err) = manager.load_palette() {
            warn!(%err, "palette configuration rejected; using defaults");
        }
        manager
    }

    pub fn from_env() -> Self {
        Self::new(Box::new(EnvThemeSource))
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Bumped on every successful recompute.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_source(&mut self, source: Box<dyn ThemeSource>) {
        self.source = source;
    }

    /// Shared font setup path for construction and font changes.
    pub fn init_font(&mut self) -> Result<(), ThemeError> {
        let metrics = self.source.font()?.validated()?;
        debug!(
            char_width = metrics.char_width,
            char_height = metrics.char_height,
            baseline = metrics.baseline,
            "font metrics initialized"
        );
        self.metrics = metrics;
        Ok(())
    }

    fn load_palette(&mut self) -> Result<(), ThemeError> {
        let mut palette = Palette::default();
        for (key, color) in self.source.palette_overrides()? {
            palette.set_named(&key, color)?;
        }
        self.palette = palette;
        Ok(())
    }

    /// Recomputes palette and metrics after a theme switch.
    ///
    /// On error the previous palette and metrics stay in effect.
    pub fn on_theme_changed(&mut self) -> Result<ViewEvent, ThemeError> {
        self.reload()?;
        Ok(ViewEvent::ThemeChanged)
    }

    /// Recomputes metrics and palette after a font switch.
    pub fn on_font_changed(&mut self) -> Result<ViewEvent, ThemeError> {
        self.reload()?;
        Ok(ViewEvent::FontChanged)
    }

    fn reload(&mut self) -> Result<(), ThemeError> {
        let previous = (self.palette.clone(), self.metrics);
        let result = self.init_font().and_then(|()| self.load_palette());
        if let Err(err) = result {
            (self.palette, self.metrics) = previous;
            return Err(err);
        }
        self.rev = self.rev.wrapping_add(1);
        Ok(())
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("palette", &self.palette)
            .field("metrics", &self.metrics)
            .field("rev", &self.rev)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeError {
    InvalidEnv { name: String, value: String },
    UnknownPaletteKey(String),
    InvalidFont(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { name, value } => write!(f, "invalid env {name}={value}"),
            Self::UnknownPaletteKey(key) => write!(f, "unknown palette key: {key}"),
            Self::InvalidFont(reason) => write!(f, "invalid font: {reason}"),
        }
    }
}

impl std::error::Error for ThemeError {}
