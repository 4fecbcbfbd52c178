//! Benchmarks for grid solving.
//!
//! Run with: cargo bench -p weft-layout

use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use weft_layout::{Alignment, CellSpan, GridLayout, Placeable, Point, Rect, Size};

struct Block {
    bounds: Rect,
    min: Size,
}

impl Placeable for Block {
    fn current_bounds(&self) -> Rect {
        self.bounds
    }

    fn minimum_size(&self) -> Size {
        self.min
    }

    fn resize_and_reposition(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }
}

type Blocks = Vec<Rc<RefCell<Block>>>;

/// An `n` x `n` grid with one child per cell and every third child spanning two columns.
fn populated(n: usize) -> (GridLayout, Blocks) {
    let mut grid = GridLayout::with_dimensions(n, n);
    grid.set_row_stretches((0..n).map(|i| (i % 3) as f64)).unwrap();
    grid.set_column_stretches((0..n).map(|i| 1.0 + (i % 2) as f64))
        .unwrap();
    grid.set_border_margin(4).unwrap();
    grid.set_cell_margin(2).unwrap();

    let mut blocks = Vec::new();
    for row in 0..n {
        let mut col = 0;
        while col < n {
            let wide = (row + col) % 3 == 0 && col + 1 < n;
            let num_cols = if wide { 2 } else { 1 };
            let block = Rc::new(RefCell::new(Block {
                bounds: Rect::default(),
                min: Size::new(8 + (col as i32 % 5) * 3, 4 + (row as i32 % 4) * 2),
            }));
            let span = CellSpan::new(row, col, 1, num_cols).unwrap();
            grid.add_spanning(block.clone(), span, Alignment::NONE)
                .unwrap();
            blocks.push(block);
            col += num_cols;
        }
    }
    (grid, blocks)
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid/resize");

    for n in [4, 16, 48] {
        let (mut grid, _blocks) = populated(n);
        let mut width = 2000;
        group.bench_with_input(BenchmarkId::new("placement", n), &n, |b, _| {
            b.iter(|| {
                // Alternate sizes so every call redistributes.
                width = if width == 2000 { 2001 } else { 2000 };
                grid.on_container_resized(Point::new(0, 0), Point::new(width, 1500))
                    .unwrap();
                black_box(grid.column_tracks());
            })
        });
    }

    group.finish();
}

fn bench_full_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid/full_solve");

    for n in [4, 16, 48] {
        let (mut grid, _blocks) = populated(n);
        grid.on_container_resized(Point::new(0, 0), Point::new(2000, 1500))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("minimums+placement", n), &n, |b, _| {
            b.iter(|| {
                grid.on_child_min_size_changed().unwrap();
                black_box(grid.total_minimum_size().unwrap());
            })
        });
    }

    group.finish();
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid/populate");

    for n in [4, 16] {
        group.bench_with_input(BenchmarkId::new("add", n), &n, |b, &n| {
            b.iter(|| black_box(populated(n)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resize, bench_full_solve, bench_populate);
criterion_main!(benches);
