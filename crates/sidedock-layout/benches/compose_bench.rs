//! Benchmarks for the page compositor.
//!
//! Run with: cargo bench -p sidedock-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sidedock_core::{PanelId, Rect, Side, VisibilityMap};
use sidedock_layout::{BarSpec, LayoutCompositor, LayoutSpec, PanelSizing, PanelSlot};
use std::hint::black_box;

fn spec_with_panels(n: usize) -> LayoutSpec {
    (0..n).fold(
        LayoutSpec::new()
            .top_bar(BarSpec::new(40))
            .bottom_bar(BarSpec::new(32))
            .main_min_width(400),
        |spec, i| {
            let side = if i % 2 == 0 { Side::Left } else { Side::Right };
            spec.panel(PanelSlot::new(
                format!("panel-{i}"),
                side,
                PanelSizing::new(240, 120, 300).shrinkable(i % 3 == 0),
            ))
        },
    )
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/compose");
    let area = Rect::from_size(1920, 1080);

    for n in [2, 4, 8, 16] {
        let compositor = LayoutCompositor::new(spec_with_panels(n));
        let visibility: VisibilityMap = (0..n)
            .map(|i| (PanelId::new(format!("panel-{i}")), i % 4 == 3))
            .collect();
        group.bench_with_input(BenchmarkId::new("panels", n), &visibility, |b, vis| {
            b.iter(|| black_box(compositor.compose(vis, area)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
