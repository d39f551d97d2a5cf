// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::Color;

use super::{FontMetrics, ThemeError};

pub const PALETTE_ENV: &str = "CFGVIEW_PALETTE";
pub const FONT_ENV: &str = "CFGVIEW_FONT";

/// Where colors and font metrics come from. Queried again on every theme/font change.
pub trait ThemeSource {
    /// Named palette entries overriding the built-in defaults.
    fn palette_overrides(&self) -> Result<Vec<(String, Color)>, ThemeError>;

    fn font(&self) -> Result<FontMetrics, ThemeError>;
}

/// Reads `CFGVIEW_PALETTE` (`key=color,key=color`) and `CFGVIEW_FONT` (`width,height[,baseline]`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvThemeSource;

impl ThemeSource for EnvThemeSource {
    fn palette_overrides(&self) -> Result<Vec<(String, Color)>, ThemeError> {
        match read_env(PALETTE_ENV)? {
            Some(value) => parse_palette_overrides(&value).map_err(|error| ThemeError::InvalidEnv {
                name: PALETTE_ENV.to_string(),
                value: format!("{value} ({error})"),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn font(&self) -> Result<FontMetrics, ThemeError> {
        match read_env(FONT_ENV)? {
            Some(value) => parse_font_spec(&value).map_err(|error| ThemeError::InvalidEnv {
                name: FONT_ENV.to_string(),
                value: format!("{value} ({error})"),
            }),
            None => Ok(FontMetrics::TERMINAL_CELL),
        }
    }
}

/// Fixed configuration, for embedding and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticThemeSource {
    pub overrides: Vec<(String, Color)>,
    pub font: FontMetrics,
}

impl StaticThemeSource {
    pub fn new(font: FontMetrics) -> Self {
        Self {
            overrides: Vec::new(),
            font,
        }
    }

    pub fn with_override(mut self, key: &str, color: Color) -> Self {
        self.overrides.push((key.to_owned(), color));
        self
    }
}

impl Default for StaticThemeSource {
    fn default() -> Self {
        Self::new(FontMetrics::TERMINAL_CELL)
    }
}

impl ThemeSource for StaticThemeSource {
    fn palette_overrides(&self) -> Result<Vec<(String, Color)>, ThemeError> {
        Ok(self.overrides.clone())
    }

    fn font(&self) -> Result<FontMetrics, ThemeError> {
        self.font.validated()
    }
}

fn read_env(name: &str) -> Result<Option<String>, ThemeError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_owned())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ThemeError::InvalidEnv {
            name: name.to_string(),
            value: "<non-unicode>".to_string(),
        }),
    }
}

pub(crate) fn parse_palette_overrides(value: &str) -> Result<Vec<(String, Color)>, String> {
    let mut out = Vec::new();
    for part in value.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let (key, color) = part
            .split_once('=')
            .ok_or_else(|| format!("expected key=color, got {part}"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing palette key in {part}"));
        }
        out.push((key.to_owned(), parse_palette_color(color)?));
    }
    Ok(out)
}

pub(crate) fn parse_font_spec(value: &str) -> Result<FontMetrics, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(format!(
            "expected char_width,char_height[,baseline], got {} values",
            parts.len()
        ));
    }
    let parse = |raw: &str| -> Result<f64, String> {
        raw.parse::<f64>().map_err(|_| format!("invalid number: {raw}"))
    };
    let char_width = parse(parts[0])?;
    let char_height = parse(parts[1])?;
    let baseline = match parts.get(2) {
        Some(raw) => parse(raw)?,
        None => char_height,
    };
    FontMetrics::new(char_width, char_height, baseline).map_err(|error| error.to_string())
}

pub(crate) fn parse_palette_color(value: &str) -> Result<Color, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("empty color".to_string());
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("rgb:") {
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 3 {
            return Err(format!("invalid rgb: value: {trimmed}"));
        }
        let r = parse_hex_channel(parts[0])?;
        let g = parse_hex_channel(parts[1])?;
        let b = parse_hex_channel(parts[2])?;
        return Ok(Color::Rgb(r, g, b));
    }

    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);

    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid hex color: {trimmed} (expected #RRGGBB)"));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex color: {trimmed}"))?;
    Ok(Color::Rgb(
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
    ))
}

fn parse_hex_channel(value: &str) -> Result<u8, String> {
    let value = value.trim();
    match value.len() {
        2 => u8::from_str_radix(value, 16).map_err(|_| format!("invalid rgb: component {value}")),
        // 16-bit X11 channels keep their high byte.
        4 => u16::from_str_radix(value, 16)
            .map(|parsed| (parsed >> 8) as u8)
            .map_err(|_| format!("invalid rgb: component {value}")),
        _ => Err(format!(
            "invalid rgb: component {value} (expected 2 or 4 hex digits)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::{parse_font_spec, parse_palette_color, parse_palette_overrides};

    #[test]
    fn palette_overrides_parse_named_colors() {
        let parsed = parse_palette_overrides("br_true=#00ff00, jmp = rgb:ff/80/0000 ,").expect("ok");
        assert_eq!(
            parsed,
            vec![
                ("br_true".to_owned(), Color::Rgb(0, 0xff, 0)),
                ("jmp".to_owned(), Color::Rgb(0xff, 0x80, 0)),
            ]
        );
    }

    #[test]
    fn palette_overrides_reject_garbage() {
        assert!(parse_palette_overrides("nope").unwrap_err().contains("key=color"));
        assert!(parse_palette_overrides("=#000000").is_err());
        assert!(parse_palette_color("#12345").is_err());
        assert!(parse_palette_color("rgb:1/2").is_err());
    }

    #[test]
    fn font_spec_defaults_baseline_to_height() {
        let metrics = parse_font_spec("8, 16").expect("font");
        assert_eq!(metrics.char_width, 8.0);
        assert_eq!(metrics.char_height, 16.0);
        assert_eq!(metrics.baseline, 16.0);

        let metrics = parse_font_spec("7.5,15,12").expect("font");
        assert_eq!(metrics.baseline, 12.0);
    }

    #[test]
    fn font_spec_rejects_non_positive_sizes() {
        assert!(parse_font_spec("0,16").is_err());
        assert!(parse_font_spec("8").is_err());
        assert!(parse_font_spec("8,x").is_err());
    }
}
