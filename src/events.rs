// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Explicit notifications between the view components and the host application.
//!
//! Subscribers register a callback and get a [`SubscriptionId`] back. Publishing is synchronous and
//! runs on the interaction thread; callbacks must not expect to re-enter the view.

use crate::model::Addr;
use crate::nav::Provenance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    ThemeChanged,
    FontChanged,
    SeekChanged { addr: Addr, provenance: Provenance },
    SyncToggled { enabled: bool },
    GraphInvalidated,
    ViewRefreshed,
    ViewZoomed,
    GraphMoved,
    Repaint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ViewEvent)>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
    published: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&ViewEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether a subscriber was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: ViewEvent) {
        self.published = self.published.wrapping_add(1);
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Total number of events published so far.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}
