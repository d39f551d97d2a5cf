// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Zoom, pan and pointer-mode state for the graph view.
//!
//! The viewport maps between view coordinates (pixels relative to the widget's top-left) and graph
//! coordinates (pixels in layout space). It never touches the block model.

use tracing::debug;

use crate::geometry::{Point, Rect};

pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 10.0;
const ZOOM_BASE: f64 = 1.25;
const PAN_STEPS: u32 = 8;
const DEFAULT_SCROLL_STEP: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMode {
    #[default]
    Idle,
    Panning,
    Selecting,
}

/// Result of a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMotion {
    None,
    Panned,
    /// Selection extends to this graph point.
    Selecting(Point),
}

/// Result of a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelAction {
    Zoomed,
    Scrolled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanAnimation {
    step: Point,
    remaining: u32,
    target: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    scale: f64,
    /// Graph point shown at the view's top-left corner.
    offset: Point,
    view_width: f64,
    view_height: f64,
    scroll_step: f64,
    mode: PointerMode,
    last_pointer: Point,
    pan: Option<PanAnimation>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl ViewportController {
    pub fn new(view_width: f64, view_height: f64) -> Self {
        Self {
            scale: 1.0,
            offset: Point::ORIGIN,
            view_width: sanitize_extent(view_width),
            view_height: sanitize_extent(view_height),
            scroll_step: DEFAULT_SCROLL_STEP,
            mode: PointerMode::Idle,
            last_pointer: Point::ORIGIN,
            pan: None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn is_animating(&self) -> bool {
        self.pan.is_some()
    }

    pub fn set_scroll_step(&mut self, step: f64) {
        if step.is_finite() && step > 0.0 {
            self.scroll_step = step;
        }
    }

    /// Keeps the graph point at the view center fixed while resizing.
    pub fn resize(&mut self, view_width: f64, view_height: f64) {
        let center = self.view_center_in_graph();
        self.view_width = sanitize_extent(view_width);
        self.view_height = sanitize_extent(view_height);
        self.center_on(center);
    }

    pub fn view_size(&self) -> (f64, f64) {
        (self.view_width, self.view_height)
    }

    pub fn map_to_graph(&self, view: Point) -> Point {
        Point::new(
            self.offset.x + view.x / self.scale,
            self.offset.y + view.y / self.scale,
        )
    }

    pub fn map_from_graph(&self, graph: Point) -> Point {
        Point::new(
            (graph.x - self.offset.x) * self.scale,
            (graph.y - self.offset.y) * self.scale,
        )
    }

    pub fn map_rect_from_graph(&self, rect: Rect) -> Rect {
        let origin = self.map_from_graph(rect.origin());
        Rect::new(
            origin.x,
            origin.y,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }

    /// Graph-space rectangle currently visible.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.view_width / self.scale,
            self.view_height / self.scale,
        )
    }

    fn view_center_in_graph(&self) -> Point {
        self.map_to_graph(Point::new(self.view_width / 2.0, self.view_height / 2.0))
    }

    /// Scales about `pivot` (view coordinates); the graph point under the pivot stays put.
    ///
    /// Positive velocity zooms in. Returns whether the scale changed.
    pub fn zoom(&mut self, pivot: Point, velocity: f64) -> bool {
        if !pivot.is_finite() || !velocity.is_finite() || velocity == 0.0 {
            return false;
        }
        let anchor = self.map_to_graph(pivot);
        let scale = (self.scale * ZOOM_BASE.powf(velocity)).clamp(MIN_SCALE, MAX_SCALE);
        if scale == self.scale {
            return false;
        }
        self.scale = scale;
        self.offset = Point::new(anchor.x - pivot.x / scale, anchor.y - pivot.y / scale);
        debug!(scale, "viewport zoomed");
        true
    }

    /// Unit scale, optionally centered on `center_on`.
    pub fn zoom_reset(&mut self, center_on: Option<Rect>) {
        self.scale = 1.0;
        self.pan = None;
        match center_on {
            Some(rect) => self.center_on(rect.center()),
            None => self.offset = Point::ORIGIN,
        }
    }

    pub fn center_on(&mut self, graph: Point) {
        if !graph.is_finite() {
            return;
        }
        self.offset = Point::new(
            graph.x - self.view_width / (2.0 * self.scale),
            graph.y - self.view_height / (2.0 * self.scale),
        );
    }

    /// Scrolls the minimum amount to bring `rect` into view. Returns whether the viewport moved.
    ///
    /// Rectangles larger than the view are aligned to their top-left corner.
    pub fn ensure_visible(&mut self, rect: Rect) -> bool {
        let visible = self.visible_rect();
        let mut offset = self.offset;

        if rect.width > visible.width || rect.x < visible.x {
            offset.x = rect.x;
        } else if rect.right() > visible.right() {
            offset.x = rect.right() - visible.width;
        }
        if rect.height > visible.height || rect.y < visible.y {
            offset.y = rect.y;
        } else if rect.bottom() > visible.bottom() {
            offset.y = rect.bottom() - visible.height;
        }

        if offset == self.offset || !offset.is_finite() {
            return false;
        }
        self.offset = offset;
        true
    }

    /// Wheel input: ctrl zooms about the pointer, shift scrolls horizontally, otherwise vertical.
    pub fn wheel(&mut self, delta: f64, modifiers: Modifiers, pointer: Point) -> WheelAction {
        if !delta.is_finite() || delta == 0.0 {
            return WheelAction::Ignored;
        }
        if modifiers.ctrl {
            return if self.zoom(pointer, delta) {
                WheelAction::Zoomed
            } else {
                WheelAction::Ignored
            };
        }
        let distance = delta * self.scroll_step / self.scale;
        if modifiers.shift {
            self.offset.x -= distance;
        } else {
            self.offset.y -= distance;
        }
        self.pan = None;
        WheelAction::Scrolled
    }

    /// Starts a pointer interaction. `on_block` tells whether the press hit a block.
    pub fn pointer_press(
        &mut self,
        point: Point,
        button: PointerButton,
        modifiers: Modifiers,
        on_block: bool,
    ) -> PointerMode {
        self.last_pointer = point;
        self.mode = match button {
            PointerButton::Middle => PointerMode::Panning,
            PointerButton::Left if modifiers.shift => PointerMode::Selecting,
            PointerButton::Left if !on_block => PointerMode::Panning,
            PointerButton::Left | PointerButton::Right => PointerMode::Idle,
        };
        if self.mode == PointerMode::Panning {
            self.pan = None;
        }
        self.mode
    }

    pub fn pointer_move(&mut self, point: Point) -> PointerMotion {
        if !point.is_finite() {
            return PointerMotion::None;
        }
        let motion = match self.mode {
            PointerMode::Idle => PointerMotion::None,
            PointerMode::Panning => {
                let delta = point.sub(self.last_pointer);
                self.offset = self
                    .offset
                    .offset(-delta.x / self.scale, -delta.y / self.scale);
                PointerMotion::Panned
            }
            PointerMode::Selecting => PointerMotion::Selecting(self.map_to_graph(point)),
        };
        self.last_pointer = point;
        motion
    }

    /// Ends the interaction and returns the mode that was active.
    pub fn pointer_release(&mut self) -> PointerMode {
        std::mem::take(&mut self.mode)
    }

    /// Starts a smooth pan that centers `target` (graph coordinates) over a fixed number of ticks.
    pub fn begin_pan_to(&mut self, target: Point) {
        if !target.is_finite() {
            return;
        }
        let current = self.view_center_in_graph();
        let delta = target.sub(current);
        if delta == Point::ORIGIN {
            self.pan = None;
            return;
        }
        self.pan = Some(PanAnimation {
            step: Point::new(delta.x / f64::from(PAN_STEPS), delta.y / f64::from(PAN_STEPS)),
            remaining: PAN_STEPS,
            target,
        });
    }

    /// Advances the pan animation. Returns whether more ticks are pending.
    pub fn tick(&mut self) -> bool {
        let Some(mut pan) = self.pan.take() else {
            return false;
        };
        pan.remaining -= 1;
        if pan.remaining == 0 {
            self.center_on(pan.target);
            return false;
        }
        self.offset = self.offset.offset(pan.step.x, pan.step.y);
        self.pan = Some(pan);
        true
    }

    /// Jumps to the end of a running pan animation.
    pub fn finish_pan(&mut self) {
        if let Some(pan) = self.pan.take() {
            self.center_on(pan.target);
        }
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
