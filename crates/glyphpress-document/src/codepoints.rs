// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Code point allocation — bin-packing symbol classes into synthetic fonts.
//
// Each font exposes a restricted set of printable code points: 33..=255
// minus two non-printable gaps (127, and 154). Classes are assigned in index
// order, filling one font's usable sequence completely before the next font
// opens, so each font holds a contiguous run of classes and its assigned
// code points form a prefix of the usable sequence.

use tracing::info;

/// First usable code point in every font.
pub const FIRST_CODE_POINT: u8 = 33;

/// Last usable code point in every font.
pub const MAX_CODE_POINT: u8 = 255;

/// Usable code points per font: (33..=126) + (128..=153) + (155..=255).
pub const CODE_POINTS_PER_FONT: usize = 221;

/// The code point following `prev` in the usable sequence, skipping the two
/// non-printable gaps. `prev` must not be [`MAX_CODE_POINT`].
fn next_code_point(prev: u8) -> u8 {
    match prev {
        126 => 128,
        153 => 155,
        _ => prev + 1,
    }
}

/// Iterator over the full usable code point sequence of one font, in
/// allocation order.
pub fn code_point_sequence() -> impl Iterator<Item = u8> {
    let mut next = Some(FIRST_CODE_POINT);
    std::iter::from_fn(move || {
        let current = next?;
        next = (current != MAX_CODE_POINT).then(|| next_code_point(current));
        Some(current)
    })
}

/// The (font, code point) slot assigned to one symbol class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePointAssignment {
    /// Dense font index, starting at 0.
    pub font_index: u32,
    /// Code point within that font's character set.
    pub code_point: u8,
}

/// Immutable result of code point allocation: one assignment per symbol
/// class, indexed by class id, plus the number of fonts opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePointMap {
    assignments: Vec<CodePointAssignment>,
    font_count: u32,
}

impl CodePointMap {
    /// The assignment for a class id, or `None` for an unknown class.
    pub fn assignment(&self, class: u32) -> Option<&CodePointAssignment> {
        self.assignments.get(class as usize)
    }

    /// Number of symbol classes covered by the map.
    pub fn class_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of fonts opened; 0 only when the map is empty.
    pub fn font_count(&self) -> u32 {
        self.font_count
    }

    /// Iterate `(class_id, assignment)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &CodePointAssignment)> {
        self.assignments
            .iter()
            .enumerate()
            .map(|(id, a)| (id as u32, a))
    }
}

/// Assign every symbol class a (font, code point) slot.
///
/// A pure fold over `0..class_count` carrying the `(font_index, code_point)`
/// cursor: when the cursor sits at [`MAX_CODE_POINT`] the current font
/// closes and the cursor resets to [`FIRST_CODE_POINT`] of the next font,
/// otherwise it advances through the usable sequence. Deterministic for a
/// given class count; `class_count == 0` yields an empty map with zero
/// fonts.
pub fn allocate(class_count: usize) -> CodePointMap {
    let mut assignments = Vec::with_capacity(class_count);
    let mut font_index: u32 = 0;
    let mut code_point = FIRST_CODE_POINT;

    for _ in 0..class_count {
        assignments.push(CodePointAssignment {
            font_index,
            code_point,
        });
        if code_point == MAX_CODE_POINT {
            font_index += 1;
            code_point = FIRST_CODE_POINT;
        } else {
            code_point = next_code_point(code_point);
        }
    }

    let font_count = if class_count == 0 {
        0
    } else {
        class_count.div_ceil(CODE_POINTS_PER_FONT) as u32
    };
    info!(class_count, font_count, "Code points allocated");

    CodePointMap {
        assignments,
        font_count,
    }
}
