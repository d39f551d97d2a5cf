// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cfgview — interactive control-flow graph view of disassembly.
//!
//! The crate turns function data from a [`backend::DisassemblyBackend`] into a
//! [`model::GraphModel`] of blocks and styled tokens, lays it out, paints it, and keeps a
//! single cursor in sync with an external seek source. [`view::GraphView`] composes the
//! pieces; [`tui`] hosts it in a terminal.

pub mod backend;
pub mod builder;
pub mod events;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod nav;
pub mod query;
pub mod render;
pub mod theme;
pub mod tui;
pub mod view;
pub mod viewport;
