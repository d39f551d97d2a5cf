// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::rc::Rc;

use ratatui::style::Color;
use rstest::{fixture, rstest};

use super::{GraphView, Selection};
use crate::backend::{fixtures, SeekError};
use crate::builder::RebuildError;
use crate::events::ViewEvent;
use crate::geometry::Point;
use crate::model::{Addr, AddrRange, TokenKind};
use crate::nav::{NavOutcome, Provenance};
use crate::query;
use crate::render::CellCanvas;
use crate::theme::{FontMetrics, StaticThemeSource, ThemeManager};
use crate::viewport::{Modifiers, PointerButton, PointerMode, PointerMotion};

type Seen = Rc<RefCell<Vec<Addr>>>;

struct Harness {
    view: GraphView,
    seeks: Seen,
    events: Rc<RefCell<Vec<ViewEvent>>>,
}

fn harness_with(theme: StaticThemeSource) -> Harness {
    let seeks: Seen = Rc::default();
    let recorded = Rc::clone(&seeks);
    let mut view = GraphView::new(
        Box::new(fixtures::demo_backend()),
        ThemeManager::new(Box::new(theme)),
    )
    .with_sink(move |addr: Addr| -> Result<(), SeekError> {
        recorded.borrow_mut().push(addr);
        Ok(())
    });
    view.resize(200.0, 60.0);

    let events: Rc<RefCell<Vec<ViewEvent>>> = Rc::default();
    let log = Rc::clone(&events);
    view.events_mut()
        .subscribe(move |event| log.borrow_mut().push(*event));

    view.rebuild(Addr::new(0x1000)).expect("rebuild");
    events.borrow_mut().clear();
    Harness {
        view,
        seeks,
        events,
    }
}

#[fixture]
fn demo() -> Harness {
    harness_with(StaticThemeSource::default())
}

/// View point on the instruction at `addr`, `col` characters into its text.
fn point_on(view: &GraphView, addr: u64, col: usize) -> Point {
    let metrics = view.theme().metrics();
    let blocks = view.model().blocks().expect("blocks");
    let (content, index) = query::instruction_at(blocks, Addr::new(addr)).expect("instruction");
    let placed = view.layout().block(content.entry()).expect("placed");
    let row = query::instruction_origin(content, index, &metrics);
    let graph = placed
        .rect
        .origin()
        .offset(row.x + metrics.cols_to_px(col) + 0.5, row.y + 0.5);
    view.viewport().map_from_graph(graph)
}

fn token_col(view: &GraphView, addr: u64, kind: TokenKind) -> usize {
    let (_, instr) = view.model().instruction(Addr::new(addr)).expect("instruction");
    instr
        .tokens()
        .iter()
        .find(|token| token.kind == kind)
        .map(|token| token.start)
        .expect("token of kind")
}

fn click(view: &mut GraphView, at: Point, modifiers: Modifiers) -> PointerMode {
    let mode = view.pointer_press(at, PointerButton::Left, modifiers);
    view.pointer_release();
    mode
}

#[rstest]
fn rebuild_loads_function_and_overlays(demo: Harness) {
    let view = &demo.view;
    assert_eq!(view.cursor(), Some(Addr::new(0x1000)));
    assert_eq!(view.title(), "sym.demo @ 0x1000 - 0x101a (4 blocks)");
    assert_eq!(view.breakpoints().get(&Addr::new(0x1005)), Some(&true));
    assert_eq!(view.breakpoints().get(&Addr::new(0x1012)), Some(&false));
    assert_eq!(view.program_counter(), Some(Addr::new(0x1003)));
    assert_eq!(view.layout().blocks().count(), 4);
}

#[rstest]
fn no_data_leaves_navigation_inert(mut demo: Harness) {
    let err = demo.view.rebuild(Addr::new(0x9000)).unwrap_err();
    assert_eq!(err, RebuildError::NoData { addr: Addr::new(0x9000) });
    assert!(demo.view.model().is_empty());
    assert_eq!(demo.view.cursor(), None);

    assert_eq!(demo.view.next_instruction(), NavOutcome::NotFound);
    assert_eq!(demo.view.follow_true_edge(), NavOutcome::NotFound);
    assert_eq!(demo.view.seek_local(Addr::new(0x1000), true), NavOutcome::NotFound);
    assert_eq!(demo.view.cursor(), None);
    assert!(demo.seeks.borrow().is_empty());

    let mut canvas = CellCanvas::new(200, 60, FontMetrics::TERMINAL_CELL).expect("canvas");
    demo.view.render(&mut canvas);
    assert!(canvas
        .to_string_trimmed()
        .contains("No function at this address"));
}

#[rstest]
fn external_echo_of_a_local_seek_is_not_sent_back(mut demo: Harness) {
    let outcome = demo.view.seek_local(Addr::new(0x1010), false);
    assert_eq!(outcome.outbound(), Some(Addr::new(0x1010)));
    assert_eq!(*demo.seeks.borrow(), vec![Addr::new(0x1010)]);

    demo.view.on_seek_changed(Addr::new(0x1010));
    assert_eq!(*demo.seeks.borrow(), vec![Addr::new(0x1010)]);
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1010)));

    let outcome = demo.view.on_seek_changed(Addr::new(0x1018));
    assert!(matches!(
        outcome,
        NavOutcome::Moved {
            provenance: Provenance::External,
            outbound: None,
            ..
        }
    ));
    assert_eq!(demo.seeks.borrow().len(), 1);
    assert!(demo.events.borrow().contains(&ViewEvent::SeekChanged {
        addr: Addr::new(0x1018),
        provenance: Provenance::External,
    }));
}

#[rstest]
fn disabling_sync_silences_local_seeks(mut demo: Harness) {
    assert!(!demo.view.toggle_sync());
    assert!(demo
        .events
        .borrow()
        .contains(&ViewEvent::SyncToggled { enabled: false }));

    demo.view.follow_true_edge();
    demo.view.next_instruction();
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1012)));
    assert!(demo.seeks.borrow().is_empty());
}

#[test]
fn sink_failures_do_not_block_the_cursor() {
    let mut view = GraphView::new(
        Box::new(fixtures::demo_backend()),
        ThemeManager::new(Box::new(StaticThemeSource::default())),
    )
    .with_sink(|_: Addr| -> Result<(), SeekError> { Err(SeekError::Disconnected) });
    view.rebuild(Addr::new(0x1000)).expect("rebuild");

    let outcome = view.seek_local(Addr::new(0x1005), false);
    assert_eq!(outcome.moved_to(), Some(Addr::new(0x1005)));
    assert_eq!(view.cursor(), Some(Addr::new(0x1005)));
}

#[rstest]
fn external_seek_outside_the_graph_loads_its_function(mut demo: Harness) {
    let outcome = demo.view.on_seek_changed(Addr::new(0x3007));
    assert_eq!(outcome.moved_to(), Some(Addr::new(0x3007)));
    assert!(demo.view.title().starts_with("sym.countdown"));
    assert!(demo.seeks.borrow().is_empty());
    assert!(demo.events.borrow().contains(&ViewEvent::GraphInvalidated));

    assert_eq!(demo.view.on_seek_changed(Addr::new(0x9000)), NavOutcome::NotFound);
    assert!(demo.view.model().is_empty());
}

#[rstest]
fn following_edges_recenters_on_the_target(mut demo: Harness) {
    assert_eq!(demo.view.follow_true_edge().moved_to(), Some(Addr::new(0x1010)));
    let point = demo.view.cursor_point().expect("cursor point");
    assert_eq!(demo.view.viewport().visible_rect().center(), point);

    demo.view.seek_local(Addr::new(0x1000), false);
    assert_eq!(demo.view.follow_false_edge().moved_to(), Some(Addr::new(0x1005)));

    demo.view.seek_local(Addr::new(0x1019), false);
    assert_eq!(demo.view.follow_true_edge(), NavOutcome::Unchanged);
    assert_eq!(demo.view.follow_false_edge(), NavOutcome::Unchanged);
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1019)));
}

#[rstest]
fn clicking_a_register_moves_the_cursor_and_highlights_it(mut demo: Harness) {
    let col = token_col(&demo.view, 0x1012, TokenKind::Register);
    let at = point_on(&demo.view, 0x1012, col);

    assert_eq!(click(&mut demo.view, at, Modifiers::NONE), PointerMode::Idle);
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1012)));
    assert_eq!(*demo.seeks.borrow(), vec![Addr::new(0x1012)]);

    let token = demo.view.highlighted_token().expect("highlight");
    assert_eq!(token.content.as_str(), "ecx");
    assert!(matches!(demo.view.selection(), Some(Selection::Token(_))));
    assert_eq!(demo.view.copy_selection().as_deref(), Some("ecx"));

    let target = demo.view.context_target(at).expect("context target");
    assert_eq!(target.addr, Addr::new(0x1012));
    assert_eq!(target.token.map(|token| token.kind), Some(TokenKind::Register));
}

#[rstest]
fn shift_click_and_drag_extend_the_selection(mut demo: Harness) {
    let start = point_on(&demo.view, 0x1010, 0);
    click(&mut demo.view, start, Modifiers::NONE);
    let far = point_on(&demo.view, 0x1017, 0);
    let mode = demo
        .view
        .pointer_press(far, PointerButton::Left, Modifiers::SHIFT);
    assert_eq!(mode, PointerMode::Selecting);
    assert_eq!(
        demo.view.selection(),
        Some(Selection::Range(AddrRange::new(Addr::new(0x1010), Addr::new(0x1017))))
    );
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1010)));

    let copied = demo.view.copy_selection().expect("copied");
    let lines: Vec<&str> = copied.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("xor"));
    assert!(lines[2].contains("nop"));

    let near = point_on(&demo.view, 0x1012, 0);
    assert!(matches!(
        demo.view.pointer_move(near),
        PointerMotion::Selecting(_)
    ));
    assert_eq!(demo.view.copy_selection().map(|text| text.lines().count()), Some(2));
    demo.view.pointer_release();

    demo.view.clear_selection();
    assert_eq!(demo.view.selection(), None);
    assert_eq!(demo.view.copy_selection(), None);
}

#[rstest]
fn dragging_empty_space_pans(mut demo: Harness) {
    let before = demo.view.viewport().offset();
    let empty = Point::new(-5000.0, -5000.0);
    assert_eq!(
        demo.view
            .pointer_press(empty, PointerButton::Left, Modifiers::NONE),
        PointerMode::Panning
    );
    assert_eq!(
        demo.view.pointer_move(empty.offset(10.0, 0.0)),
        PointerMotion::Panned
    );
    assert_eq!(demo.view.pointer_release(), PointerMode::Panning);
    assert_eq!(demo.view.viewport().offset(), before.offset(-10.0, 0.0));
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1000)));
    assert!(demo.events.borrow().contains(&ViewEvent::GraphMoved));
}

#[rstest]
fn double_click_follows_the_branch_target(mut demo: Harness) {
    let col = token_col(&demo.view, 0x1003, TokenKind::Address);
    let at = point_on(&demo.view, 0x1003, col);

    assert!(demo.view.double_click(at));
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1010)));
    let point = demo.view.cursor_point().expect("cursor point");
    assert_eq!(demo.view.viewport().visible_rect().center(), point);
}

#[rstest]
fn tooltip_describes_the_instruction(demo: Harness) {
    let at = point_on(&demo.view, 0x1003, 0);
    let help = demo.view.tooltip(at).expect("tooltip");
    assert!(help.starts_with("0x1003  740b"), "{help}");
    assert!(help.contains("je"), "{help}");
    assert_eq!(demo.view.tooltip(Point::new(-5000.0, -5000.0)), None);
}

#[rstest]
fn substrate_focus_moves_the_cursor_to_the_block(mut demo: Harness) {
    assert!(demo.view.focus_block(Addr::new(0x1018)));
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1018)));
    assert_eq!(*demo.seeks.borrow(), vec![Addr::new(0x1018)]);
    assert!(demo.view.viewport().is_animating());

    while demo.view.tick() {}
    let rect = demo.view.layout().block(Addr::new(0x1018)).expect("block").rect;
    assert_eq!(demo.view.viewport().visible_rect().center(), rect.center());
}

#[rstest]
fn zoom_reset_restores_unit_scale_on_the_cursor_block(mut demo: Harness) {
    assert!(demo.view.zoom(Point::new(0.0, 0.0), 1.0));
    assert!(demo.view.viewport().scale() > 1.0);
    assert!(demo.view.zoom(Point::new(30.0, 10.0), -3.0));

    demo.view.zoom_reset();
    assert_eq!(demo.view.viewport().scale(), 1.0);
    let rect = demo.view.layout().block(Addr::new(0x1000)).expect("block").rect;
    assert_eq!(demo.view.viewport().visible_rect().center(), rect.center());
    assert!(demo.events.borrow().contains(&ViewEvent::ViewZoomed));
}

#[rstest]
fn render_draws_blocks_overlays_and_edges(demo: Harness) {
    let mut canvas = CellCanvas::new(200, 60, FontMetrics::TERMINAL_CELL).expect("canvas");
    demo.view.render(&mut canvas);
    let text = canvas.to_string_trimmed();
    assert!(text.contains("sym.demo:"), "{text}");
    assert!(text.contains("loc_1005:"), "{text}");
    assert!(text.contains('●'), "{text}");
    assert!(text.contains('▼'), "{text}");
}

#[rstest]
#[case::zoomed_in(3.0)]
#[case::zoomed_out(-1.0)]
fn clicking_a_drawn_character_highlights_its_token(mut demo: Harness, #[case] velocity: f64) {
    let pivot = point_on(&demo.view, 0x1000, 0);
    assert!(demo.view.zoom(pivot, velocity));
    assert_ne!(demo.view.viewport().scale(), 1.0);

    let mut canvas = CellCanvas::new(200, 60, FontMetrics::TERMINAL_CELL).expect("canvas");
    demo.view.render(&mut canvas);

    let mut clicked_edi = false;
    for y in 0..60 {
        for x in 0..200 {
            let drawn = canvas.get(x, y).expect("cell");
            if !drawn.is_ascii_alphanumeric() {
                continue;
            }
            demo.view.clear_selection();
            click(
                &mut demo.view,
                Point::new(x as f64 + 0.5, y as f64 + 0.5),
                Modifiers::NONE,
            );
            let Some(token) = demo.view.highlighted_token() else {
                continue;
            };
            assert!(
                token.content.contains(drawn),
                "cell ({x}, {y}) shows {drawn:?} but hits {:?}",
                token.content
            );
            clicked_edi |= token.content.as_str() == "edi";
        }
    }
    assert!(clicked_edi, "{}", canvas.to_string_trimmed());
}

#[rstest]
fn theme_change_restyles_and_drops_the_highlight(mut demo: Harness) {
    let col = token_col(&demo.view, 0x1012, TokenKind::Register);
    let at = point_on(&demo.view, 0x1012, col);
    click(&mut demo.view, at, Modifiers::NONE);
    assert!(demo.view.highlight().is_some());
    demo.events.borrow_mut().clear();

    demo.view.set_theme_source(Box::new(
        StaticThemeSource::default().with_override("mnemonic", Color::Red),
    ));
    demo.view.on_theme_changed().expect("theme");

    assert_eq!(demo.view.highlight(), None);
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1012)));
    assert_eq!(demo.view.theme().palette().mnemonic, Color::Red);
    let events = demo.events.borrow();
    assert_eq!(events.first(), Some(&ViewEvent::ThemeChanged));
    assert!(events.contains(&ViewEvent::GraphInvalidated));
    assert_eq!(events.last(), Some(&ViewEvent::Repaint));
}

#[rstest]
fn font_change_resizes_blocks(mut demo: Harness) {
    let before = demo.view.layout().block(Addr::new(0x1000)).expect("block").rect;
    let metrics = FontMetrics::new(2.0, 2.0, 2.0).expect("metrics");
    demo.view
        .set_theme_source(Box::new(StaticThemeSource::new(metrics)));
    demo.view.on_font_changed().expect("font");

    let after = demo.view.layout().block(Addr::new(0x1000)).expect("block").rect;
    assert_eq!(after.width, before.width * 2.0);
    assert_eq!(after.height, before.height * 2.0);
    assert_eq!(demo.view.cursor(), Some(Addr::new(0x1000)));
    assert_eq!(
        *demo.events.borrow(),
        vec![ViewEvent::FontChanged, ViewEvent::Repaint]
    );
}

#[rstest]
fn export_request_matches_the_layout(demo: Harness) {
    let request = demo.view.export_request();
    assert_eq!(request.blocks.len(), 4);
    for block in &request.blocks {
        let placed = demo.view.layout().block(block.entry).expect("placed");
        assert_eq!(block.rect, placed.rect);
    }
}
