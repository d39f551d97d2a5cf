// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Breakpoint, DisassemblyBackend, FunctionCfg};
use crate::model::Addr;

/// On-disk shape of a backend snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendFile {
    pub functions: Vec<FunctionCfg>,
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
    #[serde(default)]
    pub pc: Option<Addr>,
}

/// A backend serving a fixed set of functions, loaded from memory or a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    functions: BTreeMap<Addr, FunctionCfg>,
    breakpoints: BTreeMap<Addr, bool>,
    pc: Option<Addr>,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: BackendFile) -> Self {
        let mut backend = Self::new();
        for function in file.functions {
            backend.insert_function(function);
        }
        for breakpoint in file.breakpoints {
            backend.set_breakpoint(breakpoint.addr, breakpoint.enabled);
        }
        backend.pc = file.pc;
        backend
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<BackendFile>(json).map(Self::from_file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| BackendError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn insert_function(&mut self, function: FunctionCfg) {
        self.functions.insert(function.addr, function);
    }

    pub fn set_breakpoint(&mut self, addr: Addr, enabled: bool) {
        self.breakpoints.insert(addr, enabled);
    }

    pub fn remove_breakpoint(&mut self, addr: Addr) {
        self.breakpoints.remove(&addr);
    }

    pub fn set_program_counter(&mut self, pc: Option<Addr>) {
        self.pc = pc;
    }

    pub fn function_entries(&self) -> impl Iterator<Item = Addr> + '_ {
        self.functions.keys().copied()
    }
}

impl DisassemblyBackend for StaticBackend {
    fn function_at(&self, addr: Addr) -> Option<FunctionCfg> {
        if let Some(function) = self.functions.get(&addr) {
            return Some(function.clone());
        }
        self.functions
            .values()
            .find(|function| function.covers(addr))
            .cloned()
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        self.breakpoints
            .iter()
            .map(|(&addr, &enabled)| Breakpoint { addr, enabled })
            .collect()
    }

    fn program_counter(&self) -> Option<Addr> {
        self.pc
    }
}

#[derive(Debug)]
pub enum BackendError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendError, StaticBackend};
    use crate::backend::{fixtures, DisassemblyBackend};
    use crate::model::Addr;

    #[test]
    fn finds_function_by_entry_or_inner_address() {
        let mut backend = StaticBackend::new();
        backend.insert_function(fixtures::branchy_function());

        let by_entry = backend.function_at(Addr::new(0x1000)).expect("entry");
        let by_inner = backend.function_at(Addr::new(0x1006)).expect("inner");
        assert_eq!(by_entry, by_inner);
        assert!(backend.function_at(Addr::new(0x9000)).is_none());
    }

    #[test]
    fn loads_snapshot_json_with_breakpoints_and_pc() {
        let json = r#"{
  "functions": [
    {
      "name": "tiny",
      "addr": "0x2000",
      "blocks": [
        { "addr": "0x2000", "ops": [ { "addr": "0x2000", "size": 1, "bytes": "c3", "mnemonic": "ret" } ] }
      ]
    }
  ],
  "breakpoints": [ { "addr": "0x2000" }, { "addr": 8193, "enabled": false } ],
  "pc": "0x2000"
}"#;
        let backend = StaticBackend::from_json_str(json).expect("snapshot");
        assert_eq!(backend.program_counter(), Some(Addr::new(0x2000)));
        let breakpoints = backend.breakpoints();
        assert_eq!(breakpoints.len(), 2);
        assert!(breakpoints[0].enabled);
        assert!(!breakpoints[1].enabled);
        assert_eq!(backend.function_at(Addr::new(0x2000)).expect("fn").name, "tiny");
    }

    #[test]
    fn load_reports_missing_file_as_io_error() {
        let err = StaticBackend::load("/nonexistent/cfgview/snapshot.json").unwrap_err();
        assert!(matches!(err, BackendError::Io { .. }));
        assert!(err.to_string().contains("io error"));
    }
}
