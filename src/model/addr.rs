// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A virtual address inside the analyzed binary.
///
/// Displayed as lowercase `0x…` hex. Serialized as a hex string; deserialization also accepts a
/// plain JSON number so hand-written backend files stay terse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Addr(u64);

impl Addr {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn offset(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Returns `Some(self)` unless the address is zero; backends use zero for "no edge".
    pub fn non_zero(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<u64> for Addr {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Addr> for u64 {
    fn from(value: Addr) -> Self {
        value.0
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Addr {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddrError::Empty);
        }
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex.is_empty() {
            return Err(AddrError::Empty);
        }
        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| AddrError::InvalidHex(trimmed.to_owned()))
    }
}

impl Serialize for Addr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Addr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Inclusive address interval; the bounds are kept ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AddrRange {
    start: Addr,
    end: Addr,
}

impl AddrRange {
    pub fn new(a: Addr, b: Addr) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(addr: Addr) -> Self {
        Self::new(addr, addr)
    }

    pub fn start(&self) -> Addr {
        self.start
    }

    pub fn end(&self) -> Addr {
        self.end
    }

    pub fn contains(&self, addr: Addr) -> bool {
        self.start <= addr && addr <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    Empty,
    InvalidHex(String),
}

impl fmt::Display for AddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("address must not be empty"),
            Self::InvalidHex(value) => write!(f, "invalid hex address: {value}"),
        }
    }
}

impl std::error::Error for AddrError {}
