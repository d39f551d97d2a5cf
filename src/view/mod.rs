// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The composed graph view.
//!
//! [`GraphView`] is the single owner of the model, the cursor and the overlays. Its content half
//! implements [`GraphHooks`], so the layout substrate can call back into it while the view still
//! lends out the layout and the viewport as separate borrows.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::backend::{DisassemblyBackend, SeekSink};
use crate::builder::{BuilderOptions, GraphModelBuilder, RebuildError};
use crate::events::{EventBus, ViewEvent};
use crate::export::ExportRequest;
use crate::geometry::{Point, Rect};
use crate::layout::{layout_graph, scene, GraphBlock, GraphHooks, GraphLayout, TransitionCause};
use crate::model::{
    Addr, AddrRange, DisassemblyBlock, EdgeKind, GraphModel, Token, TokenRef, EMPTY_GRAPH_TEXT,
};
use crate::nav::{Branch, NavOutcome, NavigationController, Provenance, StepDirection};
use crate::query::{self, BlockHit};
use crate::render::{self, EdgeConfiguration, Painter, RenderContext};
use crate::theme::{ThemeError, ThemeManager, ThemeSource};
use crate::viewport::{
    Modifiers, PointerButton, PointerMode, PointerMotion, ViewportController, WheelAction,
};

#[cfg(test)]
mod tests;

/// Rows scrolled per wheel notch.
const WHEEL_ROWS: usize = 3;

/// The active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Instructions whose addresses fall inside the range.
    Range(AddrRange),
    /// A single token.
    Token(TokenRef),
}

/// What a context menu would be opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTarget {
    pub addr: Addr,
    pub token: Option<Token>,
}

/// Everything the hooks need: model, cursor, overlays and the outbound channels.
struct ViewState {
    builder: GraphModelBuilder,
    backend: Box<dyn DisassemblyBackend>,
    sink: Option<Box<dyn SeekSink>>,
    theme: ThemeManager,
    events: EventBus,
    model: GraphModel,
    nav: NavigationController,
    breakpoints: BTreeMap<Addr, bool>,
    program_counter: Option<Addr>,
    selection: Option<Selection>,
    anchor: Option<Addr>,
    highlight: Option<TokenRef>,
    /// Address of the last rebuild request; used to refresh an empty view.
    requested: Option<Addr>,
    /// Cursor move made by a hook, waiting for the view to bring it into sight.
    pending: Option<NavOutcome>,
}

impl ViewState {
    fn load_overlays(&mut self) {
        self.breakpoints = self
            .backend
            .breakpoints()
            .into_iter()
            .map(|breakpoint| (breakpoint.addr, breakpoint.enabled))
            .collect();
        self.program_counter = self.backend.program_counter();
    }

    fn token(&self, token: TokenRef) -> Option<&Token> {
        let block = self.model.block(token.block)?;
        let index = block.instr_index(token.instr)?;
        block.instrs()[index].tokens().get(token.index)
    }

    fn highlighted_token(&self) -> Option<&Token> {
        self.highlight.and_then(|token| self.token(token))
    }

    fn selection_range(&self) -> Option<AddrRange> {
        match self.selection {
            Some(Selection::Range(range)) => Some(range),
            Some(Selection::Token(_)) | None => None,
        }
    }

    fn hit(&self, entry: Addr, local: Point) -> Option<(&DisassemblyBlock, BlockHit)> {
        let block = self.model.block(entry)?;
        let hit = query::hit_test(block, local, &self.theme.metrics())?;
        Some((block, hit))
    }

    /// Forwards a cursor move to the sink and the subscribers.
    fn dispatch(&mut self, outcome: NavOutcome) -> NavOutcome {
        let NavOutcome::Moved {
            addr,
            provenance,
            outbound,
            ..
        } = outcome
        else {
            return outcome;
        };

        if let (Some(target), Some(sink)) = (outbound, self.sink.as_mut()) {
            if let Err(err) = sink.seek(target) {
                warn!(%err, addr = %target, "seek sink failed; cursor kept");
            }
        }
        self.events.publish(ViewEvent::SeekChanged { addr, provenance });
        self.events.publish(ViewEvent::Repaint);
        self.pending = Some(outcome);
        outcome
    }

    fn extend_selection(&mut self, addr: Addr) {
        let Some(anchor) = self.anchor.or_else(|| self.nav.cursor()) else {
            return;
        };
        let range = AddrRange::new(anchor, addr);
        if self.selection != Some(Selection::Range(range)) {
            self.selection = Some(Selection::Range(range));
            self.events.publish(ViewEvent::Repaint);
        }
    }
}

impl GraphHooks for ViewState {
    fn draw_block(&self, painter: &mut dyn Painter, block: &GraphBlock) {
        let metrics = self.theme.metrics();
        let ctx = RenderContext {
            palette: self.theme.palette(),
            metrics: &metrics,
            cursor: self.nav.cursor(),
            program_counter: self.program_counter,
            selection: self.selection_range(),
            breakpoints: &self.breakpoints,
            highlight: self.highlighted_token().map(|token| token.content.as_str()),
        };
        match &self.model {
            GraphModel::Empty { placeholder } => {
                render::draw_placeholder(painter, &ctx, placeholder, block.rect);
            }
            GraphModel::Ready { blocks, .. } => {
                if let Some(content) = blocks.get(block.entry) {
                    render::draw_block(painter, &ctx, content, block.rect);
                }
            }
        }
    }

    fn block_clicked(
        &mut self,
        block: &GraphBlock,
        local: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) {
        let Some((addr, token)) = self.hit(block.entry, local).map(|(content, hit)| {
            let instr = &content.instrs()[hit.instr];
            let token = hit
                .token
                .filter(|&index| instr.tokens()[index].kind.is_highlightable())
                .map(|index| TokenRef {
                    block: block.entry,
                    instr: instr.addr(),
                    index,
                });
            (instr.addr(), token)
        }) else {
            return;
        };

        if button == PointerButton::Left && modifiers.shift {
            self.extend_selection(addr);
            return;
        }

        self.highlight = token;
        self.selection = token.map(Selection::Token);
        self.anchor = Some(addr);
        let outcome = self.nav.seek(&self.model, addr, Provenance::Local, false);
        if outcome == NavOutcome::Unchanged {
            self.events.publish(ViewEvent::Repaint);
        }
        self.dispatch(outcome);
    }

    fn block_double_clicked(&mut self, block: &GraphBlock, local: Point) {
        let Some(target) = self.hit(block.entry, local).and_then(|(content, hit)| {
            let instr = &content.instrs()[hit.instr];
            hit.token
                .and_then(|index| instr.tokens()[index].target())
                .or_else(|| instr.jump())
        }) else {
            return;
        };
        let outcome = self.nav.seek(&self.model, target, Provenance::Local, true);
        debug!(%target, ?outcome, "double click followed target");
        self.dispatch(outcome);
    }

    fn block_help(&self, block: &GraphBlock, local: Point) -> Option<String> {
        let (content, hit) = self.hit(block.entry, local)?;
        let instr = &content.instrs()[hit.instr];
        let mut help = instr.addr().to_string();
        let bytes = instr.opcode_hex();
        if !bytes.is_empty() {
            help.push_str("  ");
            help.push_str(&bytes);
        }
        help.push('\n');
        help.push_str(instr.plain_text().trim());
        if let Some(token) = hit.token.map(|index| &instr.tokens()[index]) {
            help.push('\n');
            help.push_str(&format!("{}: {}", token.kind, token.content));
        }
        Some(help)
    }

    fn edge_configuration(
        &self,
        from: &GraphBlock,
        kind: EdgeKind,
        to: Option<&GraphBlock>,
    ) -> EdgeConfiguration {
        render::edge_configuration(
            self.theme.palette(),
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
        let metrics = self.theme.metrics();
        let content = self.model.block(block.entry);
        let target = match (cause, content, self.nav.cursor()) {
            (TransitionCause::Cursor, Some(content), Some(cursor)) => content
                .instr_index(cursor)
                .map(|index| {
                    let row = query::instruction_origin(content, index, &metrics);
                    let origin = block.rect.origin().offset(row.x, row.y);
                    Point::new(block.rect.center().x, origin.y)
                })
                .unwrap_or_else(|| block.rect.center()),
            _ => block.rect.center(),
        };
        viewport.begin_pan_to(target);

        if cause == TransitionCause::Substrate {
            let first = content.and_then(|content| content.instrs().first()).map(|instr| instr.addr());
            if let Some(first) = first {
                let outcome = self.nav.seek(&self.model, first, Provenance::Local, false);
                self.dispatch(outcome);
            }
        }
    }
}

/// Interactive control-flow graph of one function.
pub struct GraphView {
    state: ViewState,
    layout: GraphLayout,
    viewport: ViewportController,
}

impl GraphView {
    /// Starts empty; call [`GraphView::rebuild`] to load a function.
    pub fn new(backend: Box<dyn DisassemblyBackend>, theme: ThemeManager) -> Self {
        let builder = GraphModelBuilder::default();
        let metrics = theme.metrics();
        let model = builder.empty_model(theme.palette(), &metrics);
        let layout = layout_graph(&model, &metrics);
        let mut viewport = ViewportController::new(0.0, 0.0);
        viewport.set_scroll_step(metrics.rows_to_px(WHEEL_ROWS));

        Self {
            state: ViewState {
                builder,
                backend,
                sink: None,
                theme,
                events: EventBus::new(),
                model,
                nav: NavigationController::new(),
                breakpoints: BTreeMap::new(),
                program_counter: None,
                selection: None,
                anchor: None,
                highlight: None,
                requested: None,
                pending: None,
            },
            layout,
            viewport,
        }
    }

    pub fn with_sink(mut self, sink: impl SeekSink + 'static) -> Self {
        self.state.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: Option<Box<dyn SeekSink>>) {
        self.state.sink = sink;
    }

    pub fn set_builder_options(&mut self, options: BuilderOptions) {
        self.state.builder.set_options(options);
    }

    pub fn set_theme_source(&mut self, source: Box<dyn ThemeSource>) {
        self.state.theme.set_source(source);
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.state.events
    }

    pub fn model(&self) -> &GraphModel {
        &self.state.model
    }

    pub fn layout(&self) -> &GraphLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.state.theme
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.state.nav
    }

    pub fn cursor(&self) -> Option<Addr> {
        self.state.nav.cursor()
    }

    pub fn sync_enabled(&self) -> bool {
        self.state.nav.sync_enabled()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.state.selection
    }

    pub fn highlight(&self) -> Option<TokenRef> {
        self.state.highlight
    }

    pub fn highlighted_token(&self) -> Option<&Token> {
        self.state.highlighted_token()
    }

    pub fn breakpoints(&self) -> &BTreeMap<Addr, bool> {
        &self.state.breakpoints
    }

    pub fn program_counter(&self) -> Option<Addr> {
        self.state.program_counter
    }

    /// Plain function title, or the placeholder text when nothing is loaded.
    pub fn title(&self) -> String {
        self.state
            .model
            .header()
            .map(|header| header.plain())
            .unwrap_or_else(|| EMPTY_GRAPH_TEXT.to_owned())
    }

    /// Replaces the model with the function containing `addr`.
    ///
    /// On `NoData` the view shows the placeholder and navigation stops until the next successful
    /// rebuild.
    pub fn rebuild(&mut self, addr: Addr) -> Result<(), RebuildError> {
        self.state.requested = Some(addr);
        let metrics = self.state.theme.metrics();
        let palette = self.state.theme.palette();
        let (model, result) =
            match self
                .state
                .builder
                .rebuild(&*self.state.backend, addr, palette, &metrics)
            {
                Ok(model) => (model, Ok(())),
                Err(err) => {
                    info!(%err, "showing empty graph");
                    (self.state.builder.empty_model(palette, &metrics), Err(err))
                }
            };
        self.install(model, true);
        result
    }

    /// Rebuilds the current function, keeping the cursor when it survives.
    pub fn refresh(&mut self) -> Result<(), RebuildError> {
        let addr = self
            .state
            .model
            .function()
            .map(|function| function.entry)
            .or(self.state.requested);
        let Some(addr) = addr else {
            return Ok(());
        };
        self.state.requested = Some(addr);
        let metrics = self.state.theme.metrics();
        let palette = self.state.theme.palette();
        let result = self
            .state
            .builder
            .rebuild(&*self.state.backend, addr, palette, &metrics);
        match result {
            Ok(model) => {
                self.install(model, false);
                Ok(())
            }
            Err(err) => {
                let model = self.state.builder.empty_model(palette, &metrics);
                self.install(model, true);
                Err(err)
            }
        }
    }

    fn install(&mut self, model: GraphModel, recenter: bool) {
        let state = &mut self.state;
        state.model = model;
        state.highlight = None;
        state.selection = None;
        state.anchor = None;
        state.pending = None;
        state.load_overlays();
        state.nav.on_rebuilt(&state.model);
        self.relayout();

        if recenter {
            match self.cursor_point() {
                Some(point) => self.viewport.center_on(point),
                None => self.viewport.center_on(self.layout.bounds().center()),
            }
        }
        self.state.events.publish(ViewEvent::GraphInvalidated);
        self.state.events.publish(ViewEvent::ViewRefreshed);
        self.state.events.publish(ViewEvent::Repaint);
    }

    fn relayout(&mut self) {
        self.layout = layout_graph(&self.state.model, &self.state.theme.metrics());
    }

    /// Re-reads breakpoints and the program counter without rebuilding.
    pub fn refresh_overlays(&mut self) {
        self.state.load_overlays();
        self.state.events.publish(ViewEvent::Repaint);
    }

    /// The external seek source moved. Never produces an outbound seek.
    ///
    /// Addresses outside the current graph load the function containing them first.
    pub fn on_seek_changed(&mut self, addr: Addr) -> NavOutcome {
        let in_graph = self
            .state
            .model
            .blocks()
            .is_some_and(|blocks| query::instruction_at(blocks, addr).is_some());
        if !in_graph && self.rebuild(addr).is_err() {
            return NavOutcome::NotFound;
        }
        let outcome = self
            .state
            .nav
            .seek(&self.state.model, addr, Provenance::External, false);
        let outcome = self.state.dispatch(outcome);
        self.reveal(outcome)
    }

    pub fn seek_local(&mut self, addr: Addr, recenter: bool) -> NavOutcome {
        let outcome = self
            .state
            .nav
            .seek(&self.state.model, addr, Provenance::Local, recenter);
        let outcome = self.state.dispatch(outcome);
        self.reveal(outcome)
    }

    pub fn step_instruction(&mut self, direction: StepDirection) -> NavOutcome {
        let outcome = self.state.nav.step_instruction(&self.state.model, direction);
        let outcome = self.state.dispatch(outcome);
        self.reveal(outcome)
    }

    pub fn next_instruction(&mut self) -> NavOutcome {
        self.step_instruction(StepDirection::Next)
    }

    pub fn prev_instruction(&mut self) -> NavOutcome {
        self.step_instruction(StepDirection::Previous)
    }

    pub fn follow_edge(&mut self, branch: Branch) -> NavOutcome {
        let outcome = self.state.nav.follow_edge(&self.state.model, branch);
        let outcome = self.state.dispatch(outcome);
        self.reveal(outcome)
    }

    pub fn follow_true_edge(&mut self) -> NavOutcome {
        self.follow_edge(Branch::True)
    }

    pub fn follow_false_edge(&mut self) -> NavOutcome {
        self.follow_edge(Branch::False)
    }

    /// Flips sync and returns the new value.
    pub fn toggle_sync(&mut self) -> bool {
        let enabled = self.state.nav.toggle_sync();
        self.state
            .events
            .publish(ViewEvent::SyncToggled { enabled });
        enabled
    }

    /// Brings a cursor move into view: recentering moves straight there, otherwise the substrate
    /// pans only when the block is not fully visible.
    fn reveal(&mut self, outcome: NavOutcome) -> NavOutcome {
        self.state.pending = None;
        let NavOutcome::Moved { addr, recenter, .. } = outcome else {
            return outcome;
        };
        if recenter {
            if let Some(point) = self.cursor_point() {
                self.viewport.center_on(point);
                self.state.events.publish(ViewEvent::GraphMoved);
            }
            return outcome;
        }
        let entry = self
            .state
            .model
            .blocks()
            .and_then(|blocks| query::block_for_address(blocks, addr))
            .map(DisassemblyBlock::entry);
        if let Some(entry) = entry {
            scene::transition_to(
                &self.layout,
                &mut self.viewport,
                &mut self.state,
                entry,
                TransitionCause::Cursor,
            );
            // the hooks may only pan here
            self.state.pending = None;
        }
        outcome
    }

    fn reveal_pending(&mut self) {
        if let Some(outcome) = self.state.pending.take() {
            self.reveal(outcome);
        }
    }

    /// Graph position of the cursor row, horizontally centered on its block.
    pub fn cursor_point(&self) -> Option<Point> {
        let cursor = self.state.nav.cursor()?;
        let (content, index) = query::instruction_at(self.state.model.blocks()?, cursor)?;
        let placed = self.layout.block(content.entry())?;
        let row = query::instruction_origin(content, index, &self.state.theme.metrics());
        Some(Point::new(placed.rect.center().x, placed.rect.y + row.y))
    }

    fn cursor_block_rect(&self) -> Option<Rect> {
        let cursor = self.state.nav.cursor()?;
        let content = query::block_for_address(self.state.model.blocks()?, cursor)?;
        self.layout.block(content.entry()).map(|placed| placed.rect)
    }

    /// Moves focus to a block on the substrate's initiative; the cursor follows to its entry.
    pub fn focus_block(&mut self, entry: Addr) -> bool {
        let moved = scene::transition_to(
            &self.layout,
            &mut self.viewport,
            &mut self.state,
            entry,
            TransitionCause::Substrate,
        );
        self.state.pending = None;
        moved
    }

    pub fn zoom(&mut self, pivot: Point, velocity: f64) -> bool {
        let zoomed = self.viewport.zoom(pivot, velocity);
        if zoomed {
            self.state.events.publish(ViewEvent::ViewZoomed);
            self.state.events.publish(ViewEvent::Repaint);
        }
        zoomed
    }

    /// Unit scale, centered on the block under the cursor.
    pub fn zoom_reset(&mut self) {
        let rect = self
            .cursor_block_rect()
            .unwrap_or_else(|| self.layout.bounds());
        self.viewport.zoom_reset(Some(rect));
        self.state.events.publish(ViewEvent::ViewZoomed);
        self.state.events.publish(ViewEvent::Repaint);
    }

    pub fn wheel(&mut self, delta: f64, modifiers: Modifiers, pointer: Point) -> WheelAction {
        let action = self.viewport.wheel(delta, modifiers, pointer);
        match action {
            WheelAction::Zoomed => self.state.events.publish(ViewEvent::ViewZoomed),
            WheelAction::Scrolled => self.state.events.publish(ViewEvent::GraphMoved),
            WheelAction::Ignored => return action,
        }
        self.state.events.publish(ViewEvent::Repaint);
        action
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.state.events.publish(ViewEvent::Repaint);
    }

    /// Advances the pan animation. Returns whether more ticks are pending.
    pub fn tick(&mut self) -> bool {
        if !self.viewport.is_animating() {
            return false;
        }
        let more = self.viewport.tick();
        self.state.events.publish(ViewEvent::GraphMoved);
        self.state.events.publish(ViewEvent::Repaint);
        more
    }

    pub fn finish_pan(&mut self) {
        self.viewport.finish_pan();
    }

    pub fn pointer_press(
        &mut self,
        point: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> PointerMode {
        let mode = scene::press(
            &self.layout,
            &mut self.viewport,
            &mut self.state,
            point,
            button,
            modifiers,
        );
        self.reveal_pending();
        mode
    }

    pub fn pointer_move(&mut self, point: Point) -> PointerMotion {
        let motion = self.viewport.pointer_move(point);
        match motion {
            PointerMotion::None => {}
            PointerMotion::Panned => {
                self.state.events.publish(ViewEvent::GraphMoved);
                self.state.events.publish(ViewEvent::Repaint);
            }
            PointerMotion::Selecting(graph) => {
                let addr = self.layout.block_at(graph).and_then(|placed| {
                    let local = graph.sub(placed.rect.origin());
                    self.state
                        .hit(placed.entry, local)
                        .map(|(content, hit)| content.instrs()[hit.instr].addr())
                });
                if let Some(addr) = addr {
                    self.state.extend_selection(addr);
                }
            }
        }
        motion
    }

    pub fn pointer_release(&mut self) -> PointerMode {
        self.viewport.pointer_release()
    }

    /// Returns whether the double click landed on a block.
    pub fn double_click(&mut self, point: Point) -> bool {
        let hit = scene::double_click(&self.layout, &self.viewport, &mut self.state, point);
        self.reveal_pending();
        hit
    }

    /// Hover help for a view point.
    pub fn tooltip(&self, point: Point) -> Option<String> {
        scene::help(&self.layout, &self.viewport, &self.state, point)
    }

    /// Address and token under a view point, for an external context-menu builder.
    pub fn context_target(&self, point: Point) -> Option<ContextTarget> {
        let (placed, local) = scene::hit(&self.layout, &self.viewport, point)?;
        let (content, hit) = self.state.hit(placed.entry, local)?;
        let instr = &content.instrs()[hit.instr];
        Some(ContextTarget {
            addr: instr.addr(),
            token: hit.token.map(|index| instr.tokens()[index].clone()),
        })
    }

    pub fn clear_selection(&mut self) {
        let had_selection = self.state.selection.take().is_some();
        let had_highlight = self.state.highlight.take().is_some();
        self.state.anchor = None;
        if had_selection || had_highlight {
            self.state.events.publish(ViewEvent::Repaint);
        }
    }

    /// Plain text for the clipboard: the selected instructions, else the selected or highlighted
    /// token.
    pub fn copy_selection(&self) -> Option<String> {
        match self.state.selection {
            Some(Selection::Range(range)) => {
                let mut lines: Vec<(Addr, &str)> = self
                    .state
                    .model
                    .blocks()?
                    .blocks()
                    .flat_map(|block| block.instrs())
                    .filter(|instr| range.contains(instr.addr()))
                    .map(|instr| (instr.addr(), instr.plain_text()))
                    .collect();
                lines.sort_by_key(|(addr, _)| *addr);
                if lines.is_empty() {
                    return None;
                }
                Some(
                    lines
                        .into_iter()
                        .map(|(_, text)| text.trim_end())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            }
            Some(Selection::Token(token)) => self
                .state
                .token(token)
                .map(|token| token.content.to_string()),
            None => self
                .state
                .highlighted_token()
                .map(|token| token.content.to_string()),
        }
    }

    pub fn export_request(&self) -> ExportRequest {
        ExportRequest::from_graph(&self.state.model, &self.layout)
    }

    /// Reloads the palette and rebuilds the styled text.
    pub fn on_theme_changed(&mut self) -> Result<(), ThemeError> {
        let event = self.state.theme.on_theme_changed()?;
        self.state.events.publish(event);
        if let Err(err) = self.refresh() {
            debug!(%err, "nothing to restyle");
        }
        Ok(())
    }

    /// Reloads the font metrics, resizes every block and lays the graph out again.
    pub fn on_font_changed(&mut self) -> Result<(), ThemeError> {
        let event = self.state.theme.on_font_changed()?;
        self.state.events.publish(event);
        let metrics = self.state.theme.metrics();
        self.state.builder.resize(&mut self.state.model, &metrics);
        self.viewport.set_scroll_step(metrics.rows_to_px(WHEEL_ROWS));
        self.relayout();
        self.state.events.publish(ViewEvent::Repaint);
        Ok(())
    }

    /// Paints the visible part of the graph in view coordinates.
    pub fn render(&self, painter: &mut dyn Painter) {
        scene::paint(
            &self.layout,
            &self.viewport,
            self.state.theme.metrics(),
            &self.state,
            painter,
        );
    }
}

impl std::fmt::Debug for GraphView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphView")
            .field("cursor", &self.state.nav.cursor())
            .field("sync", &self.state.nav.sync_enabled())
            .field("blocks", &self.state.model.blocks().map(|blocks| blocks.len()))
            .field("selection", &self.state.selection)
            .field("scale", &self.viewport.scale())
            .finish()
    }
}
