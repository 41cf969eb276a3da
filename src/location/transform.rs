//! Coordinate transforms on parsed locations
//!
//! - [`rebase`] shifts every position by a signed offset
//! - [`clip`] intersects a location with a 1-based inclusive [`Window`]
//! - [`remap`] readdresses a clipped location so the window starts at 1
//!
//! Ranges that point into a foreign entry are never shifted or clipped:
//! their coordinates belong to another sequence.

use serde::{Deserialize, Serialize};

use crate::error::MirrorError;
use crate::location::types::{FPosition, FRange, FeatureLocation, LocationShape};

/// A 1-based inclusive coordinate window; `0..0` means the whole record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Window {
    pub start: i64,
    pub stop: i64,
}

impl Window {
    pub fn new(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    /// The whole record, no clipping
    pub fn whole() -> Self {
        Self { start: 0, stop: 0 }
    }

    pub fn is_whole(&self) -> bool {
        self.start == 0 && self.stop == 0
    }

    /// Whether `[begin, end]` lies completely inside the window
    pub fn contains(&self, begin: i64, end: i64) -> bool {
        self.is_whole() || (begin >= self.start && end <= self.stop)
    }

    /// Offset that readdresses window coordinates to start at 1
    pub fn remap_offset(&self) -> i64 {
        if self.is_whole() {
            0
        } else {
            -(self.start - 1)
        }
    }
}

/// Shift every local position of `location` by `offset`
///
/// `rebase(loc, x)` followed by `rebase(loc, -x)` restores `loc`.
pub fn rebase(location: &mut FeatureLocation, offset: i64) {
    if offset == 0 {
        return;
    }
    for range in location.ranges_mut().iter_mut().filter(|r| !r.is_foreign()) {
        range.min.shift(offset);
        range.max.shift(offset);
    }
}

/// [`rebase`] that refuses to move a position past the `i64` bounds
///
/// The location is left untouched on error.
pub fn try_rebase(location: &mut FeatureLocation, offset: i64) -> Result<(), MirrorError> {
    let overflow = || MirrorError::parse(0, format!("offset {} overflows a coordinate", offset));
    let mut shifted = location.clone();
    for range in shifted.ranges_mut().iter_mut().filter(|r| !r.is_foreign()) {
        range.min = range.min.checked_shift(offset).ok_or_else(overflow)?;
        range.max = range.max.checked_shift(offset).ok_or_else(overflow)?;
    }
    *location = shifted;
    Ok(())
}

/// Readdress a location so that the window's first base becomes 1
pub fn remap(location: &mut FeatureLocation, window: Window) {
    rebase(location, window.remap_offset());
}

/// Intersect `location` with `window`
///
/// Local ranges completely outside the window are dropped. A range crossing
/// an edge is cut at the edge and the cut endpoint is flagged as extending
/// beyond it (`<` on the left, `>` on the right). Ranges inside the window
/// come back unchanged. Returns `None` when no local range survives; the
/// caller then discards the feature.
pub fn clip(location: &FeatureLocation, window: Window) -> Option<FeatureLocation> {
    if window.is_whole() {
        return Some(location.clone());
    }

    let kept: Vec<FRange> = location
        .ranges()
        .iter()
        .filter_map(|range| clip_range(range, window))
        .collect();

    if kept.iter().all(FRange::is_foreign) {
        return None;
    }

    let shape = match &location.shape {
        LocationShape::Single(_) => LocationShape::Single(kept.into_iter().next()?),
        LocationShape::Compound { kind, .. } => LocationShape::Compound {
            kind: kind.clone(),
            ranges: kept,
        },
    };
    Some(FeatureLocation {
        strand: location.strand,
        shape,
    })
}

fn clip_range(range: &FRange, window: Window) -> Option<FRange> {
    if range.is_foreign() {
        return Some(range.clone());
    }
    if range.finish() < window.start || range.begin() > window.stop {
        return None;
    }

    let cut_left = range.begin() < window.start;
    let cut_right = range.finish() > window.stop;

    // A site or in-range base has one position; cutting it leaves the edge
    if range.min == range.max && (cut_left || cut_right) {
        let edge = if cut_left {
            FPosition::exact(window.start).with_fuzzy_start()
        } else {
            FPosition::exact(window.stop).with_fuzzy_end()
        };
        return Some(FRange::point(edge));
    }

    let mut clipped = range.clone();
    if cut_left {
        clipped.min = FPosition::exact(window.start).with_fuzzy_start();
    }
    if cut_right {
        clipped.max = FPosition::exact(window.stop).with_fuzzy_end();
    }
    Some(clipped)
}

/// From/to coordinates of a location for feature-table output
///
/// The outermost local bases are reported; an endpoint that extends beyond
/// the sequence or window edge is reported negated.
pub fn feature_span(location: &FeatureLocation) -> (i64, i64) {
    let mut from: Option<&FPosition> = None;
    let mut to: Option<&FPosition> = None;
    for range in location.local_ranges() {
        if from.map_or(true, |p| range.min.start < p.start) {
            from = Some(&range.min);
        }
        if to.map_or(true, |p| range.max.end > p.end) {
            to = Some(&range.max);
        }
    }

    let from = from.map_or(0, |p| if p.fuzzy_start { -p.start } else { p.start });
    let to = to.map_or(0, |p| if p.fuzzy_end { -p.end } else { p.end });
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::parse_location;
    use crate::location::types::{CompoundKind, Strand};

    fn loc(s: &str) -> FeatureLocation {
        parse_location(s, "TEST", 0).unwrap()
    }

    #[test]
    fn test_rebase_and_inverse() {
        let original = loc("join(10..20,30..>40)");
        let mut shifted = original.clone();
        rebase(&mut shifted, 25);
        assert_eq!(shifted.ranges()[0].begin(), 35);
        rebase(&mut shifted, -25);
        assert_eq!(shifted, original);
    }

    #[test]
    fn test_try_rebase_overflow() {
        let original = loc("join(1..10,9223372036854775800..9223372036854775807)");
        let mut l = original.clone();
        assert!(matches!(try_rebase(&mut l, 1), Err(MirrorError::Parse { .. })));
        assert_eq!(l, original);

        let mut l = loc("10..20");
        try_rebase(&mut l, -5).unwrap();
        assert_eq!(l.to_string(), "5..15");
    }

    #[test]
    fn test_rebase_skips_foreign_ranges() {
        let mut l = loc("join(1..10,X1.1:5..9)");
        rebase(&mut l, 100);
        assert_eq!(l.ranges()[0].begin(), 101);
        assert_eq!(l.ranges()[1].begin(), 5);
    }

    #[test]
    fn test_clip_whole_window_is_identity() {
        let l = loc("join(1..10,20..30)");
        assert_eq!(clip(&l, Window::whole()), Some(l));
    }

    #[test]
    fn test_clip_inside_is_identity() {
        let l = loc("100..200");
        assert_eq!(clip(&l, Window::new(50, 250)), Some(l));
    }

    #[test]
    fn test_clip_drops_outside_ranges() {
        let l = loc("join(1..10,20..30,40..50)");
        let clipped = clip(&l, Window::new(15, 35)).unwrap();
        assert_eq!(clipped.ranges(), &[FRange::span(20, 30)]);
        assert_eq!(clipped.kind(), Some(&CompoundKind::Join));
    }

    #[test]
    fn test_clip_cut_site_collapses_to_edge() {
        let clipped = clip(&loc("123^124"), Window::new(124, 200)).unwrap();
        assert_eq!(clipped.to_string(), "<124");
        let range = &clipped.ranges()[0];
        assert!(range.begin() <= range.finish());

        let clipped = clip(&loc("(102.110)"), Window::new(1, 105)).unwrap();
        assert_eq!(clipped.to_string(), ">105");
        assert_eq!(feature_span(&clipped), (105, -105));

        let inside = loc("(102.110)");
        assert_eq!(clip(&inside, Window::new(100, 200)), Some(inside));
    }

    #[test]
    fn test_clip_truncates_and_flags() {
        let l = loc("10..100");
        let clipped = clip(&l, Window::new(50, 80)).unwrap();
        let range = &clipped.ranges()[0];
        assert_eq!((range.begin(), range.finish()), (50, 80));
        assert!(range.min.fuzzy_start);
        assert!(range.max.fuzzy_end);
        assert_eq!(clipped.to_string(), "<50..>80");
    }

    #[test]
    fn test_clip_empty_result() {
        let l = loc("complement(10..20)");
        assert!(clip(&l, Window::new(30, 40)).is_none());
    }

    #[test]
    fn test_clip_only_foreign_left_is_empty() {
        let l = loc("join(1..10,X1.1:100..200)");
        assert!(clip(&l, Window::new(50, 60)).is_none());
    }

    #[test]
    fn test_clip_keeps_minus_order() {
        let l = loc("complement(join(1..10,20..30,40..50))");
        let clipped = clip(&l, Window::new(5, 45)).unwrap();
        assert_eq!(clipped.strand, Strand::Minus);
        let begins: Vec<i64> = clipped.ranges().iter().map(FRange::begin).collect();
        assert_eq!(begins, vec![40, 20, 5]);
    }

    #[test]
    fn test_remap() {
        let mut l = loc("100..200");
        remap(&mut l, Window::new(91, 300));
        assert_eq!(l.ranges(), &[FRange::span(10, 110)]);
    }

    #[test]
    fn test_feature_span() {
        assert_eq!(feature_span(&loc("join(10..20,30..40)")), (10, 40));
        assert_eq!(feature_span(&loc("complement(join(10..20,30..40))")), (10, 40));
        assert_eq!(feature_span(&loc("<5..>60")), (-5, -60));
    }

    #[test]
    fn test_window_remap_offset() {
        assert_eq!(Window::whole().remap_offset(), 0);
        assert_eq!(Window::new(10, 50).remap_offset(), -9);
        assert!(Window::whole().contains(1, 1_000_000));
    }
}
