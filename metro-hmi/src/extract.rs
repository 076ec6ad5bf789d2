/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Sub-range extraction from raw controller arrays.
//!
//! A snapshot shorter than the configured window (e.g. mid-reconnect) is a
//! designed degradation path: [`extract`] returns whatever prefix of the
//! window is available instead of failing, so one short array never aborts a
//! refresh cycle.

use crate::topology::IndexRange;

/// Returns `source[start..end]`, clamped to the data actually present.
///
/// * `end > source.len()` → `source[start..]` (truncated).
/// * `start >= source.len()` → empty.
/// * `start > end` violates the precondition; it yields an empty slice and
///   trips a debug assertion.
pub fn extract<T>(source: &[T], start: usize, end: usize) -> &[T] {
    debug_assert!(start <= end, "extract called with start {start} > end {end}");
    let end = end.min(source.len());
    if start >= end {
        return &[];
    }
    &source[start..end]
}

/// [`extract`] over an [`IndexRange`].
pub fn extract_range<T>(source: &[T], range: IndexRange) -> &[T] {
    extract(source, range.start, range.end)
}

/// `true` when `source` cannot cover the whole of `range`.
pub fn is_truncated<T>(source: &[T], range: IndexRange) -> bool {
    source.len() < range.end && !range.is_empty()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
