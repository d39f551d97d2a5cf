// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use cfgview::builder::GraphModelBuilder;
use cfgview::geometry::Point;
use cfgview::layout::layout_graph;
use cfgview::model::Addr;
use cfgview::query;
use cfgview::render::CellCanvas;
use cfgview::theme::{FontMetrics, Palette, StaticThemeSource, ThemeManager};
use cfgview::view::GraphView;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

mod fixtures;
mod profiler;

const CASES: [fixtures::Case; 3] = [
    fixtures::Case::Small,
    fixtures::Case::MediumDense,
    fixtures::Case::LargeLongOperands,
];

// Benchmark identity (keep stable):
// - Group names in this file: `query.hit_test`, `query.instruction_at`, `builder.rebuild`,
//   `view.render`
// - Case IDs are `fixtures::Case::id()` and must not be renamed.
fn benches_hit_test(c: &mut Criterion) {
    let metrics = FontMetrics::TERMINAL_CELL;
    let palette = Palette::default();
    let builder = GraphModelBuilder::default();

    let mut group = c.benchmark_group("query.hit_test");
    for case in CASES {
        let model = builder
            .build_function(&fixtures::fixture(case), &palette, &metrics)
            .expect("build_function");
        let layout = layout_graph(&model, &metrics);
        let blocks = model.blocks().expect("blocks");

        // One sample point per text cell of every block, in block-relative coordinates.
        let samples: Vec<(Addr, Point)> = layout
            .blocks()
            .flat_map(|placed| {
                let entry = placed.entry;
                let rows = placed.rect.height as usize;
                let cols = placed.rect.width as usize;
                (0..rows).flat_map(move |row| {
                    (0..cols).map(move |col| (entry, Point::new(col as f64 + 0.5, row as f64 + 0.5)))
                })
            })
            .collect();

        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for (entry, point) in &samples {
                    let Some(block) = blocks.get(*entry) else {
                        continue;
                    };
                    if query::hit_test(block, black_box(*point), &metrics)
                        .and_then(|hit| hit.token)
                        .is_some()
                    {
                        hits += 1;
                    }
                }
                black_box(hits)
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("query.instruction_at");
    for case in CASES {
        let function = fixtures::fixture(case);
        let addrs = fixtures::instruction_addrs(&function);
        let model = builder
            .build_function(&function, &palette, &metrics)
            .expect("build_function");
        let blocks = model.blocks().expect("blocks");
        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let found = addrs
                    .iter()
                    .filter(|addr| query::instruction_at(blocks, black_box(**addr)).is_some())
                    .count();
                black_box(found)
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("builder.rebuild");
    for case in CASES {
        let function = fixtures::fixture(case);
        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let model = builder
                    .build_function(black_box(&function), &palette, &metrics)
                    .expect("build_function");
                black_box(fixtures::checksum_model(&model))
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("view.render");
    for case in CASES {
        let mut view = GraphView::new(
            Box::new(fixtures::backend(case)),
            ThemeManager::new(Box::new(StaticThemeSource::default())),
        );
        view.resize(200.0, 60.0);
        view.rebuild(fixtures::fixture(case).addr).expect("rebuild");
        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let mut canvas = CellCanvas::new(200, 60, metrics).expect("canvas");
                view.render(&mut canvas);
                black_box(canvas.to_text().lines.len())
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_hit_test
}
criterion_main!(benches);
