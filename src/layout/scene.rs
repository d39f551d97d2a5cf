// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Painting and pointer dispatch over a laid-out graph.
//!
//! The substrate owns no block content: it paints edges, asks the hooks to paint blocks, and
//! routes pointer events to the block under the pointer. View points are widget pixels; the
//! viewport maps them to graph pixels.

use ratatui::style::Color;

use super::{GraphBlock, GraphHooks, GraphLayout, TransitionCause};
use crate::geometry::{Point, Rect};
use crate::model::{Addr, RichSpan};
use crate::render::Painter;
use crate::theme::FontMetrics;
use crate::viewport::{Modifiers, PointerButton, PointerMode, ViewportController};

/// Maps graph coordinates to view coordinates before forwarding to the inner painter.
///
/// Rectangles and line endpoints scale with the zoom. Glyphs keep their size, so text is
/// resampled: each view cell shows the character whose graph column contains the cell center,
/// which is the same rule [`hit`] applies to pointer positions.
pub struct ViewportPainter<'a> {
    inner: &'a mut dyn Painter,
    viewport: &'a ViewportController,
    metrics: FontMetrics,
}

impl<'a> ViewportPainter<'a> {
    pub fn new(
        inner: &'a mut dyn Painter,
        viewport: &'a ViewportController,
        metrics: FontMetrics,
    ) -> Self {
        Self {
            inner,
            viewport,
            metrics,
        }
    }
}

impl Painter for ViewportPainter<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.inner
            .fill_rect(self.viewport.map_rect_from_graph(rect), color);
    }

    fn draw_text(&mut self, origin: Point, span: &RichSpan) {
        let chars: Vec<char> = span.text().chars().collect();
        if chars.is_empty() || !origin.is_finite() {
            return;
        }
        let (cell_w, cell_h) = (self.metrics.char_width, self.metrics.char_height);
        let start = self.viewport.map_from_graph(origin);
        let end = self
            .viewport
            .map_from_graph(origin.offset(self.metrics.cols_to_px(chars.len()), cell_h));

        // First view row and column whose centers fall inside the run.
        let row = (start.y / cell_h - 0.5).ceil();
        if (row + 0.5) * cell_h >= end.y {
            return;
        }
        let first = (start.x / cell_w - 0.5).ceil();

        let mut text = String::new();
        let mut cell = first;
        while (cell + 0.5) * cell_w < end.x {
            let graph_x = self
                .viewport
                .map_to_graph(Point::new((cell + 0.5) * cell_w, 0.0))
                .x;
            let col = ((graph_x - origin.x) / cell_w).floor().max(0.0) as usize;
            text.push(chars[col.min(chars.len() - 1)]);
            cell += 1.0;
        }
        if text.is_empty() {
            return;
        }
        let resampled = RichSpan::new(text, span.fg())
            .with_bg(span.bg())
            .with_highlight(span.highlight());
        self.inner
            .draw_text(Point::new(first * cell_w, row * cell_h), &resampled);
    }

    fn draw_border(&mut self, rect: Rect, color: Color) {
        self.inner
            .draw_border(self.viewport.map_rect_from_graph(rect), color);
    }

    fn draw_glyph(&mut self, at: Point, glyph: char, color: Color) {
        self.inner
            .draw_glyph(self.viewport.map_from_graph(at), glyph, color);
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        self.inner.draw_line(
            self.viewport.map_from_graph(from),
            self.viewport.map_from_graph(to),
            color,
        );
    }
}

/// Paints edges, then every block intersecting the visible area.
pub fn paint(
    layout: &GraphLayout,
    viewport: &ViewportController,
    metrics: FontMetrics,
    hooks: &dyn GraphHooks,
    painter: &mut dyn Painter,
) {
    let mut painter = ViewportPainter::new(painter, viewport, metrics);
    let visible = viewport.visible_rect();
    let cull = visible.width > 0.0 && visible.height > 0.0;

    for block in layout.blocks() {
        for &(kind, target) in &block.edges {
            let to = layout.block(target);
            let config = hooks.edge_configuration(block, kind, to);
            let route = layout.route_edge(block, kind, to, config.arrow);
            for segment in route.windows(2) {
                painter.draw_line(segment[0], segment[1], config.color);
            }
            if let Some(&head) = route.last() {
                painter.draw_glyph(head, config.arrow.head(), config.color);
            }
        }
    }

    for block in layout.blocks() {
        if !cull || block.rect.intersects(&visible) {
            hooks.draw_block(&mut painter, block);
        }
    }
}

/// Block under a view point and the point relative to the block's top-left.
pub fn hit<'a>(
    layout: &'a GraphLayout,
    viewport: &ViewportController,
    view_point: Point,
) -> Option<(&'a GraphBlock, Point)> {
    if !view_point.is_finite() {
        return None;
    }
    let graph = viewport.map_to_graph(view_point);
    let block = layout.block_at(graph)?;
    Some((block, graph.sub(block.rect.origin())))
}

/// Starts a pointer interaction; presses that do not start a pan are delivered to the block.
pub fn press(
    layout: &GraphLayout,
    viewport: &mut ViewportController,
    hooks: &mut dyn GraphHooks,
    view_point: Point,
    button: PointerButton,
    modifiers: Modifiers,
) -> PointerMode {
    let target = hit(layout, viewport, view_point);
    let mode = viewport.pointer_press(view_point, button, modifiers, target.is_some());
    if let (Some((block, local)), false) = (target, mode == PointerMode::Panning) {
        hooks.block_clicked(block, local, button, modifiers);
    }
    mode
}

pub fn double_click(
    layout: &GraphLayout,
    viewport: &ViewportController,
    hooks: &mut dyn GraphHooks,
    view_point: Point,
) -> bool {
    match hit(layout, viewport, view_point) {
        Some((block, local)) => {
            hooks.block_double_clicked(block, local);
            true
        }
        None => false,
    }
}

pub fn help(
    layout: &GraphLayout,
    viewport: &ViewportController,
    hooks: &dyn GraphHooks,
    view_point: Point,
) -> Option<String> {
    let (block, local) = hit(layout, viewport, view_point)?;
    hooks.block_help(block, local)
}

/// Moves focus to `entry`.
///
/// Cursor-driven transitions only reach the hooks when the block is not fully visible;
/// substrate-driven ones always do. Returns whether the hooks were invoked.
pub fn transition_to(
    layout: &GraphLayout,
    viewport: &mut ViewportController,
    hooks: &mut dyn GraphHooks,
    entry: Addr,
    cause: TransitionCause,
) -> bool {
    let Some(block) = layout.block(entry) else {
        return false;
    };
    let visible = viewport.visible_rect().contains_rect(&block.rect);
    if cause == TransitionCause::Cursor && visible {
        return false;
    }
    hooks.block_transitioned_to(block, cause, viewport);
    true
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use ratatui::style::Color;

    use super::{double_click, help, hit, paint, press, transition_to, ViewportPainter};
    use crate::geometry::Point;
    use crate::layout::{layout_graph, GraphBlock, GraphHooks, GraphLayout, TransitionCause};
    use crate::model::{Addr, EdgeKind, RichSpan};
    use crate::render::{edge_configuration, CellCanvas, EdgeConfiguration, Painter};
    use crate::theme::{FontMetrics, Palette};
    use crate::viewport::{Modifiers, PointerButton, PointerMode, ViewportController};

    #[derive(Default)]
    struct Recorder {
        drawn: RefCell<Vec<Addr>>,
        clicks: Vec<(Addr, Point)>,
        double_clicks: Vec<Addr>,
        transitions: Vec<(Addr, TransitionCause)>,
    }

    impl GraphHooks for Recorder {
        fn draw_block(&self, painter: &mut dyn Painter, block: &GraphBlock) {
            self.drawn.borrow_mut().push(block.entry);
            painter.draw_border(block.rect, Color::White);
        }

        fn block_clicked(
            &mut self,
            block: &GraphBlock,
            local: Point,
            _button: PointerButton,
            _modifiers: Modifiers,
        ) {
            self.clicks.push((block.entry, local));
        }

        fn block_double_clicked(&mut self, block: &GraphBlock, _local: Point) {
            self.double_clicks.push(block.entry);
        }

        fn block_help(&self, block: &GraphBlock, _local: Point) -> Option<String> {
            Some(block.entry.to_string())
        }

        fn edge_configuration(
            &self,
            from: &GraphBlock,
            kind: EdgeKind,
            to: Option<&GraphBlock>,
        ) -> EdgeConfiguration {
            edge_configuration(
                &Palette::default(),
                kind,
                (from.entry, from.rect),
                to.map(|to| (to.entry, to.rect)),
            )
        }

        fn block_transitioned_to(
            &mut self,
            block: &GraphBlock,
            cause: TransitionCause,
            viewport: &mut ViewportController,
        ) {
            self.transitions.push((block.entry, cause));
            viewport.center_on(block.rect.center());
        }
    }

    fn diamond() -> GraphLayout {
        let metrics = FontMetrics::TERMINAL_CELL;
        let model = crate::builder::GraphModelBuilder::default()
            .build_function(
                &crate::backend::fixtures::branchy_function(),
                &Palette::default(),
                &metrics,
            )
            .expect("model");
        layout_graph(&model, &metrics)
    }

    #[test]
    fn paints_only_visible_blocks() {
        let layout = diamond();
        let head = layout.block(Addr::new(0x1000)).expect("head").rect;
        let mut viewport = ViewportController::new(head.width, head.height);
        viewport.zoom_reset(Some(head));

        let recorder = Recorder::default();
        let mut canvas = CellCanvas::new(head.width as usize, head.height as usize, FontMetrics::TERMINAL_CELL)
            .expect("canvas");
        paint(
            &layout,
            &viewport,
            FontMetrics::TERMINAL_CELL,
            &recorder,
            &mut canvas,
        );
        assert_eq!(*recorder.drawn.borrow(), vec![Addr::new(0x1000)]);
        assert_eq!(canvas.get(0, 0).expect("cell"), '┌');
    }

    #[test]
    fn zoomed_text_repeats_each_column_under_its_cells() {
        let metrics = FontMetrics::TERMINAL_CELL;
        let mut viewport = ViewportController::new(40.0, 12.0);
        assert!(viewport.zoom(Point::ORIGIN, 100.0));
        assert_eq!(viewport.scale(), 10.0);

        let mut canvas = CellCanvas::new(40, 12, metrics).expect("canvas");
        ViewportPainter::new(&mut canvas, &viewport, metrics)
            .draw_text(Point::new(1.0, 1.0), &RichSpan::new("abc", Color::White));

        let row: String = (0..40).map(|x| canvas.get(x, 10).expect("cell")).collect();
        assert_eq!(&row[..10], " ".repeat(10));
        assert_eq!(&row[10..], "a".repeat(10) + &"b".repeat(10) + &"c".repeat(10));
        assert_eq!(canvas.get(15, 9).expect("cell"), ' ');
        assert_eq!(canvas.get(15, 11).expect("cell"), ' ');
    }

    #[test]
    fn clicks_reach_the_block_with_local_coordinates() {
        let layout = diamond();
        let head = layout.block(Addr::new(0x1000)).expect("head").rect;
        let mut viewport = ViewportController::new(200.0, 100.0);
        let mut recorder = Recorder::default();

        let view_point = viewport.map_from_graph(head.origin().offset(3.0, 2.0));
        let mode = press(
            &layout,
            &mut viewport,
            &mut recorder,
            view_point,
            PointerButton::Left,
            Modifiers::NONE,
        );
        assert_eq!(mode, PointerMode::Idle);
        assert_eq!(recorder.clicks, vec![(Addr::new(0x1000), Point::new(3.0, 2.0))]);

        let empty = Point::new(-50.0, -50.0);
        viewport.pointer_release();
        let mode = press(&layout, &mut viewport, &mut recorder, empty, PointerButton::Left, Modifiers::NONE);
        assert_eq!(mode, PointerMode::Panning);
        assert_eq!(recorder.clicks.len(), 1);

        assert!(double_click(&layout, &viewport, &mut recorder, view_point));
        assert_eq!(recorder.double_clicks, vec![Addr::new(0x1000)]);
        assert_eq!(help(&layout, &viewport, &recorder, view_point).as_deref(), Some("0x1000"));
        assert!(hit(&layout, &viewport, Point::new(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn cursor_transitions_skip_visible_blocks() {
        let layout = diamond();
        let bounds = layout.bounds();
        let mut viewport = ViewportController::new(bounds.width, bounds.height);
        let mut recorder = Recorder::default();

        assert!(!transition_to(&layout, &mut viewport, &mut recorder, Addr::new(0x1018), TransitionCause::Cursor));
        assert!(transition_to(&layout, &mut viewport, &mut recorder, Addr::new(0x1018), TransitionCause::Substrate));
        assert!(!transition_to(&layout, &mut viewport, &mut recorder, Addr::new(0x9999), TransitionCause::Substrate));

        viewport.center_on(Point::new(10_000.0, 10_000.0));
        assert!(transition_to(&layout, &mut viewport, &mut recorder, Addr::new(0x1018), TransitionCause::Cursor));
        assert_eq!(
            recorder.transitions,
            vec![
                (Addr::new(0x1018), TransitionCause::Substrate),
                (Addr::new(0x1018), TransitionCause::Cursor)
            ]
        );
    }
}
