// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Block placement and the graph substrate.
//!
//! [`layout_graph`] places sized blocks on layers; [`scene`] drives painting and pointer dispatch
//! through the [`GraphHooks`] a view implements.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Point, Rect};
use crate::model::{Addr, EdgeKind, GraphModel};
use crate::render::ArrowShape;
use crate::theme::FontMetrics;

mod hooks;
pub mod scene;

pub use hooks::{GraphHooks, TransitionCause};

/// Gap between blocks of one layer, in columns.
pub const BLOCK_GAP_COLS: usize = 4;
/// Gap between layers, in rows.
pub const LAYER_GAP_ROWS: usize = 4;

/// A positioned block as the substrate sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBlock {
    pub entry: Addr,
    pub rect: Rect,
    pub layer: usize,
    /// Outgoing edges in the block's stable order (true path first).
    pub edges: Vec<(EdgeKind, Addr)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    blocks: BTreeMap<Addr, GraphBlock>,
    layers: Vec<Vec<Addr>>,
    bounds: Rect,
    metrics: FontMetrics,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            blocks: BTreeMap::new(),
            layers: Vec::new(),
            bounds: Rect::default(),
            metrics: FontMetrics::default(),
        }
    }
}

impl GraphLayout {
    pub fn blocks(&self) -> impl Iterator<Item = &GraphBlock> {
        self.blocks.values()
    }

    pub fn block(&self, entry: Addr) -> Option<&GraphBlock> {
        self.blocks.get(&entry)
    }

    pub fn layers(&self) -> &[Vec<Addr>] {
        &self.layers
    }

    /// Smallest rectangle enclosing every block.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block containing the graph point, if any.
    pub fn block_at(&self, point: Point) -> Option<&GraphBlock> {
        self.blocks.values().find(|block| block.rect.contains(point))
    }

    /// Polyline for one edge, in graph coordinates, ending where the arrow head goes.
    pub fn route_edge(
        &self,
        from: &GraphBlock,
        kind: EdgeKind,
        to: Option<&GraphBlock>,
        arrow: ArrowShape,
    ) -> Vec<Point> {
        let cw = self.metrics.char_width;
        let ch = self.metrics.char_height;
        let snap_x = |x: f64| (x / cw).floor() * cw;

        let anchor = match kind {
            EdgeKind::True => from.rect.x + from.rect.width / 3.0,
            EdgeKind::False => from.rect.x + from.rect.width * 2.0 / 3.0,
            EdgeKind::Jump => from.rect.center().x,
        };
        let start = Point::new(snap_x(anchor), from.rect.bottom());

        match (arrow, to) {
            (ArrowShape::Forward, Some(to)) => {
                let end = Point::new(snap_x(to.rect.center().x), to.rect.y - ch);
                let mid_y = ((start.y + end.y) / 2.0 / ch).floor() * ch;
                vec![
                    start,
                    Point::new(start.x, mid_y),
                    Point::new(end.x, mid_y),
                    end,
                ]
            }
            (ArrowShape::Backward | ArrowShape::SelfLoop, Some(to)) => {
                let side = snap_x(from.rect.right().max(to.rect.right()) + 2.0 * cw);
                let end = Point::new(snap_x(to.rect.center().x), to.rect.y - ch);
                let above = to.rect.y - 2.0 * ch;
                vec![
                    start,
                    Point::new(start.x, start.y + ch),
                    Point::new(side, start.y + ch),
                    Point::new(side, above),
                    Point::new(end.x, above),
                    end,
                ]
            }
            _ => vec![start, Point::new(start.x, start.y + 2.0 * ch)],
        }
    }
}

/// Lays out the model's blocks top-down.
///
/// Layers follow the longest forward path from the function entry; back edges found by a
/// depth-first walk are ignored for layering so loops do not push blocks down forever. Blocks
/// unreachable from the entry start new walks in address order. Within a layer, blocks are ordered
/// by the barycenter of their predecessors, then by address. The empty model lays out its
/// placeholder at the origin.
pub fn layout_graph(model: &GraphModel, metrics: &FontMetrics) -> GraphLayout {
    let (blocks, entry) = match model {
        GraphModel::Empty { placeholder } => {
            let rect = Rect::from_size(Point::ORIGIN, placeholder.size());
            let block = GraphBlock {
                entry: placeholder.entry(),
                rect,
                layer: 0,
                edges: Vec::new(),
            };
            return GraphLayout {
                blocks: BTreeMap::from([(block.entry, block)]),
                layers: vec![vec![placeholder.entry()]],
                bounds: rect,
                metrics: *metrics,
            };
        }
        GraphModel::Ready {
            blocks, function, ..
        } => (blocks, function.entry),
    };

    let outgoing: BTreeMap<Addr, Vec<(EdgeKind, Addr)>> = blocks
        .blocks()
        .map(|block| (block.entry(), block.edges().collect()))
        .collect();

    let (order, back_edges) = depth_first_order(&outgoing, entry);

    let mut layer_of: BTreeMap<Addr, usize> = order.iter().map(|&node| (node, 0)).collect();
    for &from in &order {
        let from_layer = layer_of.get(&from).copied().unwrap_or(0);
        for &(_, to) in outgoing.get(&from).into_iter().flatten() {
            if back_edges.contains(&(from, to)) || !outgoing.contains_key(&to) {
                continue;
            }
            let slot = layer_of.entry(to).or_insert(0);
            *slot = (*slot).max(from_layer + 1);
        }
    }

    let max_layer = layer_of.values().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<Addr>> = vec![Vec::new(); max_layer + 1];
    for (&node, &layer) in &layer_of {
        layers[layer].push(node);
    }

    let mut predecessors: BTreeMap<Addr, Vec<Addr>> = BTreeMap::new();
    for (&from, edges) in &outgoing {
        for &(_, to) in edges {
            if from != to {
                predecessors.entry(to).or_default().push(from);
            }
        }
    }
    for index in 1..layers.len() {
        let previous: BTreeMap<Addr, usize> = layers[index - 1]
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();
        sort_layer_by_barycenter(&mut layers[index], &previous, &predecessors);
    }

    place(blocks, &layers, &layer_of, &outgoing, metrics)
}

/// Reverse postorder of a depth-first walk plus the set of back edges it found.
fn depth_first_order(
    outgoing: &BTreeMap<Addr, Vec<(EdgeKind, Addr)>>,
    entry: Addr,
) -> (Vec<Addr>, BTreeSet<(Addr, Addr)>) {
    let mut visited = BTreeSet::new();
    let mut on_stack = BTreeSet::new();
    let mut postorder = Vec::with_capacity(outgoing.len());
    let mut back_edges = BTreeSet::new();

    let roots = std::iter::once(entry).chain(outgoing.keys().copied());
    for root in roots {
        if !outgoing.contains_key(&root) || !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        let mut stack: Vec<(Addr, usize)> = vec![(root, 0)];

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            let edges = outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(&(_, to)) = edges.get(*next) {
                *next += 1;
                if !outgoing.contains_key(&to) {
                    continue;
                }
                if on_stack.contains(&to) {
                    back_edges.insert((node, to));
                } else if visited.insert(to) {
                    on_stack.insert(to);
                    stack.push((to, 0));
                }
            } else {
                stack.pop();
                on_stack.remove(&node);
                postorder.push(node);
            }
        }
    }

    postorder.reverse();
    (postorder, back_edges)
}

fn sort_layer_by_barycenter(
    layer: &mut [Addr],
    previous: &BTreeMap<Addr, usize>,
    predecessors: &BTreeMap<Addr, Vec<Addr>>,
) {
    let barycenter = |node: &Addr| {
        let (sum, count) = predecessors
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|pred| previous.get(pred).copied())
            .fold((0usize, 0usize), |(sum, count), pos| (sum + pos, count + 1));
        (count > 0).then_some((sum, count))
    };

    layer.sort_by(|a, b| match (barycenter(a), barycenter(b)) {
        (None, None) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some((sum_a, count_a)), Some((sum_b, count_b))) => {
            let left = (sum_a as u128) * (count_b as u128);
            let right = (sum_b as u128) * (count_a as u128);
            left.cmp(&right).then_with(|| a.cmp(b))
        }
    });
}

fn place(
    blocks: &crate::model::BlockMap,
    layers: &[Vec<Addr>],
    layer_of: &BTreeMap<Addr, usize>,
    outgoing: &BTreeMap<Addr, Vec<(EdgeKind, Addr)>>,
    metrics: &FontMetrics,
) -> GraphLayout {
    let gap_x = metrics.cols_to_px(BLOCK_GAP_COLS);
    let gap_y = metrics.rows_to_px(LAYER_GAP_ROWS);
    let size_of = |entry: &Addr| blocks.get(*entry).map(|block| block.size()).unwrap_or_default();

    let layer_widths: Vec<f64> = layers
        .iter()
        .map(|layer| {
            let total: f64 = layer.iter().map(|entry| size_of(entry).width).sum();
            total + gap_x * layer.len().saturating_sub(1) as f64
        })
        .collect();
    let widest = layer_widths.iter().copied().fold(0.0, f64::max);

    let mut placed = BTreeMap::new();
    let mut bounds: Option<Rect> = None;
    let mut y = 0.0;
    for (layer_index, layer) in layers.iter().enumerate() {
        let indent = ((widest - layer_widths[layer_index]) / 2.0 / metrics.char_width).floor()
            * metrics.char_width;
        let mut x = indent;
        let mut tallest: f64 = 0.0;
        for &entry in layer {
            let size = size_of(&entry);
            let rect = Rect::new(x, y, size.width, size.height);
            bounds = Some(match bounds {
                None => rect,
                Some(acc) => union(acc, rect),
            });
            placed.insert(
                entry,
                GraphBlock {
                    entry,
                    rect,
                    layer: layer_of.get(&entry).copied().unwrap_or(layer_index),
                    edges: outgoing.get(&entry).cloned().unwrap_or_default(),
                },
            );
            x += size.width + gap_x;
            tallest = tallest.max(size.height);
        }
        y += tallest + gap_y;
    }

    GraphLayout {
        blocks: placed,
        layers: layers.to_vec(),
        bounds: bounds.unwrap_or_default(),
        metrics: *metrics,
    }
}

fn union(a: Rect, b: Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    Rect::new(x, y, a.right().max(b.right()) - x, a.bottom().max(b.bottom()) - y)
}
