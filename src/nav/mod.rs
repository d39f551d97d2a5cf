// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cursor and sync state machine.
//!
//! Every transition carries a [`Provenance`]. Only `Local` transitions with sync enabled produce
//! an outbound seek, so echoes of external seeks can never loop back to their source.

use serde::Serialize;
use tracing::debug;

use crate::model::{Addr, DisassemblyBlock, GraphModel};
use crate::query;

/// Who initiated a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The user acted inside this view.
    Local,
    /// The external seek source moved; never echoed back.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Empty,
    Ready {
        cursor: Addr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved {
        addr: Addr,
        provenance: Provenance,
        recenter: bool,
        /// Address to hand to the seek sink, if any.
        outbound: Option<Addr>,
    },
    /// Valid request with nowhere to go (no edge, no neighbor, already there).
    Unchanged,
    /// The address is not part of the current graph, or there is no graph.
    NotFound,
}

impl NavOutcome {
    pub fn moved_to(&self) -> Option<Addr> {
        match self {
            Self::Moved { addr, .. } => Some(*addr),
            Self::Unchanged | Self::NotFound => None,
        }
    }

    pub fn outbound(&self) -> Option<Addr> {
        match self {
            Self::Moved { outbound, .. } => *outbound,
            Self::Unchanged | Self::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationController {
    state: NavState,
    sync: bool,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationController {
    /// Starts empty with sync enabled.
    pub fn new() -> Self {
        Self {
            state: NavState::Empty,
            sync: true,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn cursor(&self) -> Option<Addr> {
        match self.state {
            NavState::Ready { cursor } => Some(cursor),
            NavState::Empty => None,
        }
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync
    }

    /// Flips sync and returns the new value. The cursor is untouched.
    pub fn toggle_sync(&mut self) -> bool {
        self.sync = !self.sync;
        debug!(sync = self.sync, "sync toggled");
        self.sync
    }

    pub fn set_sync(&mut self, enabled: bool) {
        self.sync = enabled;
    }

    /// Adopts a freshly built model.
    ///
    /// The cursor survives when it still names an instruction; otherwise it moves to the function
    /// entry (or the first instruction when the entry has none). An empty model empties the state.
    pub fn on_rebuilt(&mut self, model: &GraphModel) -> NavState {
        let (Some(blocks), Some(function)) = (model.blocks(), model.function()) else {
            self.state = NavState::Empty;
            return self.state;
        };

        let kept = self
            .cursor()
            .and_then(|cursor| query::instruction_at(blocks, cursor))
            .map(|(block, index)| block.instrs()[index].addr());
        let fallback = || {
            query::instruction_at(blocks, function.entry)
                .map(|(block, index)| block.instrs()[index].addr())
                .or_else(|| first_instruction(blocks.blocks()))
        };

        self.state = match kept.or_else(fallback) {
            Some(cursor) => NavState::Ready { cursor },
            None => NavState::Empty,
        };
        debug!(state = ?self.state, "navigation adopted rebuilt graph");
        self.state
    }

    /// Moves the cursor to the instruction covering `addr`.
    pub fn seek(
        &mut self,
        model: &GraphModel,
        addr: Addr,
        provenance: Provenance,
        recenter: bool,
    ) -> NavOutcome {
        let NavState::Ready { cursor } = self.state else {
            return NavOutcome::NotFound;
        };
        let Some(target) = model
            .blocks()
            .and_then(|blocks| query::instruction_at(blocks, addr))
            .map(|(block, index)| block.instrs()[index].addr())
        else {
            debug!(%addr, ?provenance, "seek target not in graph");
            return NavOutcome::NotFound;
        };
        if target == cursor {
            return NavOutcome::Unchanged;
        }

        self.state = NavState::Ready { cursor: target };
        let outbound = (provenance == Provenance::Local && self.sync).then_some(target);
        debug!(from = %cursor, to = %target, ?provenance, emits = outbound.is_some(), "cursor moved");
        NavOutcome::Moved {
            addr: target,
            provenance,
            recenter,
            outbound,
        }
    }

    /// Moves to the adjacent instruction, crossing block boundaries along edges.
    ///
    /// Forward crossings prefer the fallthrough (`false_path`) over the branch target and land on
    /// the instruction the edge targets. Backward crossings skip the block's own back edge, prefer
    /// the predecessor that falls through into the block, then the lowest predecessor entry, and
    /// land on its last instruction.
    pub fn step_instruction(&mut self, model: &GraphModel, direction: StepDirection) -> NavOutcome {
        let Some(cursor) = self.cursor() else {
            return NavOutcome::NotFound;
        };
        let Some(blocks) = model.blocks() else {
            return NavOutcome::NotFound;
        };
        let Some((block, index)) = query::instruction_at(blocks, cursor) else {
            return NavOutcome::NotFound;
        };

        let target = match direction {
            StepDirection::Next => block
                .instrs()
                .get(index + 1)
                .map(|instr| instr.addr())
                .or_else(|| {
                    [block.false_path(), block.true_path()]
                        .into_iter()
                        .flatten()
                        .find_map(|target| query::instruction_at(blocks, target))
                        .map(|(next, index)| next.instrs()[index].addr())
                }),
            StepDirection::Previous => match index.checked_sub(1) {
                Some(prev) => Some(block.instrs()[prev].addr()),
                None => {
                    let mut preds = blocks.predecessors(block.entry());
                    preds.retain(|pred| pred.entry() != block.entry());
                    preds
                        .iter()
                        .find(|pred| pred.end() == block.entry())
                        .or_else(|| preds.first())
                        .and_then(|pred| pred.instrs().last())
                        .map(|instr| instr.addr())
                }
            },
        };

        match target {
            Some(addr) => self.seek(model, addr, Provenance::Local, false),
            None => NavOutcome::Unchanged,
        }
    }

    /// Moves to the target of the current block's true or false edge.
    pub fn follow_edge(&mut self, model: &GraphModel, branch: Branch) -> NavOutcome {
        let Some(cursor) = self.cursor() else {
            return NavOutcome::NotFound;
        };
        let Some(block) = model
            .blocks()
            .and_then(|blocks| query::block_for_address(blocks, cursor))
        else {
            return NavOutcome::NotFound;
        };
        let target = match branch {
            Branch::True => block.true_path(),
            Branch::False => block.false_path(),
        };
        match target {
            Some(addr) => self.seek(model, addr, Provenance::Local, true),
            None => NavOutcome::Unchanged,
        }
    }
}

fn first_instruction<'a>(mut blocks: impl Iterator<Item = &'a DisassemblyBlock>) -> Option<Addr> {
    blocks.find_map(|block| block.instrs().first().map(|instr| instr.addr()))
}
