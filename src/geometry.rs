//! Spatial hit-testing of cursor samples against sentence regions
//!
//! Regions are axis-aligned rectangles in viewport coordinates. A point hits a
//! region when it lies inside the rectangle grown by a small margin on every edge,
//! bounds inclusive, so points sitting exactly on a measured edge are not lost.

use crate::types::SentenceRegion;

impl SentenceRegion {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether all four edges are finite numbers
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    /// Whether the rectangle has `right < left` or `bottom < top`
    pub fn is_inverted(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }

    /// Inclusive containment test with `margin` added to every edge.
    ///
    /// Any NaN coordinate or edge fails the comparisons and yields `false`.
    pub fn contains(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= self.left - margin
            && x <= self.right + margin
            && y >= self.top - margin
            && y <= self.bottom + margin
    }
}

/// Maps a point to the region (by position in the region list) that contains it
pub trait HitTester {
    fn hit(&self, x: f64, y: f64) -> Option<usize>;
}

/// Scans regions in input order and returns the first match.
///
/// Cost is linear in the number of regions, which is fine for passages of a few
/// dozen sentences.
pub struct LinearHitTester<'a> {
    regions: &'a [SentenceRegion],
    margin: f64,
    /// Regions that take part in hit-testing
    active: Vec<bool>,
}

impl<'a> LinearHitTester<'a> {
    pub fn new(regions: &'a [SentenceRegion], margin: f64) -> Self {
        let active = regions.iter().map(|r| r.is_finite()).collect();
        Self {
            regions,
            margin,
            active,
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl HitTester for LinearHitTester<'_> {
    fn hit(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.regions
            .iter()
            .zip(&self.active)
            .position(|(region, &active)| active && region.contains(x, y, self.margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: u32, left: f64, top: f64, right: f64, bottom: f64) -> SentenceRegion {
        SentenceRegion::new(id, format!("Sentence {id}."), left, top, right, bottom)
    }

    #[test]
    fn test_contains_interior_and_edges() {
        let r = region(0, 0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(5.0, 5.0, 0.0));
        assert!(r.contains(0.0, 0.0, 0.0));
        assert!(r.contains(10.0, 10.0, 0.0));
        assert!(!r.contains(10.5, 5.0, 0.0));
    }

    #[test]
    fn test_margin_extends_every_edge() {
        let r = region(0, 0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(-2.0, 5.0, 2.0));
        assert!(r.contains(12.0, 5.0, 2.0));
        assert!(r.contains(5.0, -2.0, 2.0));
        assert!(r.contains(5.0, 12.0, 2.0));
        assert!(!r.contains(12.01, 5.0, 2.0));
        assert!(!r.contains(5.0, -2.01, 2.0));
    }

    #[test]
    fn test_nan_never_contained() {
        let r = region(0, 0.0, 0.0, 10.0, 10.0);
        assert!(!r.contains(f64::NAN, 5.0, 2.0));
        assert!(!r.contains(5.0, f64::NAN, 2.0));
    }

    #[test]
    fn test_dimensions_and_flags() {
        let r = region(0, 10.0, 20.0, 110.0, 40.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 20.0);
        assert!(r.is_finite());
        assert!(!r.is_inverted());
        assert!(region(1, 10.0, 0.0, 5.0, 10.0).is_inverted());
        assert!(!region(2, f64::NEG_INFINITY, 0.0, 5.0, 10.0).is_finite());
    }

    #[test]
    fn test_first_region_in_input_order_wins_on_overlap() {
        let regions = vec![
            region(7, 0.0, 0.0, 100.0, 20.0),
            region(3, 50.0, 0.0, 150.0, 20.0),
        ];
        let tester = LinearHitTester::new(&regions, 2.0);
        assert_eq!(tester.hit(75.0, 10.0), Some(0));
        assert_eq!(tester.hit(120.0, 10.0), Some(1));

        let reversed: Vec<SentenceRegion> = regions.into_iter().rev().collect();
        let tester = LinearHitTester::new(&reversed, 2.0);
        assert_eq!(tester.hit(75.0, 10.0), Some(0));
        assert_eq!(reversed[0].id, 3);
    }

    #[test]
    fn test_off_text_and_empty() {
        let regions = vec![region(0, 0.0, 0.0, 10.0, 10.0)];
        let tester = LinearHitTester::new(&regions, 2.0);
        assert_eq!(tester.hit(50.0, 50.0), None);
        assert_eq!(tester.len(), 1);

        let empty = LinearHitTester::new(&[], 2.0);
        assert!(empty.is_empty());
        assert_eq!(empty.hit(0.0, 0.0), None);
    }

    #[test]
    fn test_non_finite_region_is_skipped() {
        let regions = vec![
            region(0, f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY),
            region(1, 0.0, 0.0, 10.0, 10.0),
        ];
        let tester = LinearHitTester::new(&regions, 2.0);
        assert_eq!(tester.hit(5.0, 5.0), Some(1));
        assert_eq!(tester.hit(f64::INFINITY, 5.0), None);
    }
}
