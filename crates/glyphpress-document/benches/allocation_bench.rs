// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the glyphpress-document crate: code point
// allocation over a realistic class count, and glyph padding at a typical
// lattice size.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};

use glyphpress_core::geometry::Lattice;
use glyphpress_document::allocate;
use glyphpress_document::glyphs::pad_to_lattice;

/// Allocate code points for a book-sized symbol dictionary (a few thousand
/// classes spanning a dozen or more fonts).
fn bench_allocation(c: &mut Criterion) {
    c.bench_function("allocate (3000 classes)", |b| {
        b.iter(|| black_box(allocate(black_box(3000))));
    });
}

/// Pad a small glyph bitmap to a 40x40 lattice, the hot operation of the
/// asset builder.
fn bench_padding(c: &mut Criterion) {
    let bitmap = GrayImage::from_pixel(23, 31, Luma([0u8]));
    let lattice = Lattice::new(40, 40);
    c.bench_function("pad_to_lattice (23x31 -> 40x40)", |b| {
        b.iter(|| black_box(pad_to_lattice(black_box(&bitmap), lattice).unwrap()));
    });
}

criterion_group!(benches, bench_allocation, bench_padding);
criterion_main!(benches);
