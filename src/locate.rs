//! Finder-pattern location.
//!
//! An ECC200 finder pattern is the one place in the frame where two solid
//! perimeter edges of near-equal length meet at a near-right angle. The
//! locator extracts candidate contours at two threshold sensitivities
//! (no single sensitivity survives uneven illumination), keeps only contours
//! whose two longest edges look like that corner, and prunes duplicate and
//! mis-sized candidates.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::geom::{
    circular_edges, circularly_adjacent, cosine_between, cross2, longest_pair_indices,
};
use crate::raster::GrayView;
use crate::segment::extract_polylines;

/// Location and orientation of one Data Matrix finder pattern, in pixels.
///
/// `corner` is the vertex where the two solid border edges meet; `base` and
/// `side` point from it along those edges. Image coordinates have y pointing
/// down, and the vectors are ordered so that `base` precedes `side`
/// counter-clockwise on screen, which in this convention means
/// `cross(base, side) < 0`.
#[derive(Clone, Copy, Debug)]
pub struct FinderPattern {
    pub corner: Point2<f32>,
    pub base: Vector2<f32>,
    pub side: Vector2<f32>,
    /// Midpoint of the symbol, `corner + (base + side) / 2`.
    pub center: Point2<f32>,
    /// Half-diagonal of the symbol square.
    pub radius: f32,
}

impl FinderPattern {
    /// Build a pattern from a corner and its two edge vectors, normalizing
    /// the vector order to the documented orientation.
    pub fn new(corner: Point2<f32>, u: Vector2<f32>, v: Vector2<f32>) -> Self {
        let (base, side) = if cross2(u, v) < 0.0 { (u, v) } else { (v, u) };
        let center = corner + (base + side) * 0.5;
        let radius = ((base.norm_squared() + side.norm_squared()) / 4.0).sqrt();
        Self {
            corner,
            base,
            side,
            center,
            radius,
        }
    }

    /// The three located corners: the finder corner and the two edge ends.
    pub fn corners(&self) -> [Point2<f32>; 3] {
        [self.corner, self.corner + self.base, self.corner + self.side]
    }

    /// True if `p` lies strictly inside this pattern's radius.
    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        (p - self.center).norm_squared() < self.radius * self.radius
    }
}

/// Locator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocateParams {
    /// Adaptive-threshold box side length in pixels.
    pub block_size: u32,
    /// The two sensitivity offsets swept by the locator; the passes run
    /// independently and merge first-found-wins.
    pub threshold_offsets: [i16; 2],
    /// Douglas-Peucker tolerance for contour simplification.
    pub simplify_epsilon: f64,
    /// Minimum edge count for a candidate perimeter.
    pub min_edges: usize,
    /// Upper bound on |cos| between the two longest edges.
    pub max_abs_cosine: f32,
    /// Upper bound on |len_a - len_b| / (len_a + len_b).
    pub max_length_ratio: f32,
    /// Allowed relative deviation from the median pattern radius.
    pub radius_tolerance: f32,
    /// Radius filtering only kicks in above this many accepted patterns.
    pub min_outlier_samples: usize,
}

impl Default for LocateParams {
    fn default() -> Self {
        Self {
            block_size: 35,
            threshold_offsets: [16, 8],
            simplify_epsilon: 6.0,
            min_edges: 7,
            max_abs_cosine: 0.1,
            max_length_ratio: 0.1,
            radius_tolerance: 0.3,
            min_outlier_samples: 3,
        }
    }
}

/// Find all finder patterns in a grayscale frame.
///
/// Returns an empty vector when nothing resembling a symbol is present;
/// that is a normal outcome, not an error.
pub fn locate(image: &GrayView<'_>, params: &LocateParams) -> Vec<FinderPattern> {
    let [lo, hi] = params.threshold_offsets;
    let (pass_a, pass_b) = rayon::join(
        || extract_polylines(image, params.block_size, lo, params.simplify_epsilon),
        || extract_polylines(image, params.block_size, hi, params.simplify_epsilon),
    );

    let mut accepted = Vec::new();
    for (offset, polylines) in [(lo, &pass_a), (hi, &pass_b)] {
        let candidates = polylines
            .iter()
            .filter_map(|poly| candidate_from_polyline(poly, params));
        let fresh = merge_unique(&mut accepted, candidates);
        log::debug!(
            "threshold offset {offset}: {} contours, {fresh} new finder patterns",
            polylines.len()
        );
    }

    reject_radius_outliers(&mut accepted, params);
    accepted
}

/// Run the shape filters on one simplified contour.
pub(crate) fn candidate_from_polyline(
    polyline: &[Point2<f32>],
    params: &LocateParams,
) -> Option<FinderPattern> {
    let edges = circular_edges(polyline);
    if edges.len() < params.min_edges {
        return None;
    }

    let (i, j) = longest_pair_indices(&edges)?;
    if !circularly_adjacent(i, j, edges.len()) {
        return None;
    }

    let (a, b) = (&edges[i], &edges[j]);
    if cosine_between(a.direction(), b.direction()).abs() >= params.max_abs_cosine {
        return None;
    }
    let (len_a, len_b) = (a.length(), b.length());
    if (len_a - len_b).abs() / (len_a + len_b) >= params.max_length_ratio {
        return None;
    }

    let corner = a.shared_vertex(b)?;
    let u = a.other_endpoint(corner)? - corner;
    let v = b.other_endpoint(corner)? - corner;
    Some(FinderPattern::new(corner, u, v))
}

/// Append candidates whose centers do not fall inside an already accepted
/// pattern (first found wins). Returns how many were appended.
pub(crate) fn merge_unique(
    accepted: &mut Vec<FinderPattern>,
    candidates: impl IntoIterator<Item = FinderPattern>,
) -> usize {
    let mut fresh = 0;
    for fp in candidates {
        if accepted.iter().any(|existing| existing.contains(fp.center)) {
            continue;
        }
        accepted.push(fp);
        fresh += 1;
    }
    fresh
}

/// Drop patterns whose radius strays from the median by more than the
/// configured tolerance. Symbols on one puck are all about the same size, so
/// a far-off radius is image noise, not a pin.
pub(crate) fn reject_radius_outliers(patterns: &mut Vec<FinderPattern>, params: &LocateParams) {
    if patterns.len() <= params.min_outlier_samples {
        return;
    }
    let median = median_radius(patterns);
    let tolerance = params.radius_tolerance * median;
    let before = patterns.len();
    patterns.retain(|fp| (fp.radius - median).abs() <= tolerance);
    if patterns.len() < before {
        log::debug!(
            "radius filter: dropped {} of {before} patterns (median {median:.1}px)",
            before - patterns.len()
        );
    }
}

fn median_radius(patterns: &[FinderPattern]) -> f32 {
    let mut radii: Vec<f32> = patterns.iter().map(|fp| fp.radius).collect();
    radii.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = radii.len() / 2;
    if radii.len() % 2 == 1 {
        radii[mid]
    } else {
        (radii[mid - 1] + radii[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    /// Right-angle corner at the origin with 100 px arms along +x and +y and
    /// a jagged hypotenuse; both longest edges adjacent, orthogonal, equal.
    fn corner_polyline() -> Vec<Point2<f32>> {
        vec![
            p(0.0, 0.0),
            p(100.0, 0.0),
            p(70.0, 25.0),
            p(75.0, 35.0),
            p(45.0, 60.0),
            p(50.0, 70.0),
            p(20.0, 95.0),
            p(0.0, 100.0),
        ]
    }

    #[test]
    fn accepts_well_formed_corner() {
        let fp = candidate_from_polyline(&corner_polyline(), &LocateParams::default())
            .expect("corner polyline should pass all filters");
        assert_eq!(fp.corner, p(0.0, 0.0));
        assert!((fp.radius - (2.0f32).sqrt() * 50.0).abs() < 1.0);
    }

    #[test]
    fn rejects_simple_quadrilateral() {
        let square = vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 50.0), p(0.0, 50.0)];
        assert!(candidate_from_polyline(&square, &LocateParams::default()).is_none());
    }

    #[test]
    fn rejects_non_adjacent_longest_edges() {
        // Split the closing edge in two: the second-longest edge is no longer
        // next to the longest one.
        let mut poly = corner_polyline();
        poly.push(p(0.0, 50.0));
        assert!(candidate_from_polyline(&poly, &LocateParams::default()).is_none());
    }

    #[test]
    fn rejects_non_orthogonal_corner() {
        let mut poly = corner_polyline();
        // Tilt the closing edge to roughly 30 degrees off the vertical.
        poly[7] = p(60.0, 100.0);
        assert!(candidate_from_polyline(&poly, &LocateParams::default()).is_none());
    }

    #[test]
    fn rejects_mismatched_arm_lengths() {
        let poly = vec![
            p(0.0, 0.0),
            p(100.0, 0.0),
            p(70.0, 15.0),
            p(75.0, 25.0),
            p(45.0, 40.0),
            p(50.0, 50.0),
            p(20.0, 58.0),
            p(0.0, 60.0),
        ];
        assert!(candidate_from_polyline(&poly, &LocateParams::default()).is_none());
    }

    #[test]
    fn orientation_puts_base_before_side_on_screen() {
        // Arms pointing right and down (y grows downward): the downward arm
        // is the base, the rightward arm the side.
        let fp = FinderPattern::new(
            p(0.0, 0.0),
            Vector2::new(100.0, 0.0),
            Vector2::new(0.0, 100.0),
        );
        assert_eq!(fp.base, Vector2::new(0.0, 100.0));
        assert_eq!(fp.side, Vector2::new(100.0, 0.0));
        assert!(cross2(fp.base, fp.side) < 0.0);
    }

    #[test]
    fn orientation_is_rotation_invariant() {
        for angle_deg in [0.0f32, 30.0, 90.0, 145.0, 250.0] {
            let a = angle_deg.to_radians();
            let rot = |v: Vector2<f32>| {
                Vector2::new(a.cos() * v.x - a.sin() * v.y, a.sin() * v.x + a.cos() * v.y)
            };
            let base = rot(Vector2::new(100.0, 0.0));
            let side = rot(Vector2::new(0.0, -100.0));
            // Feed the vectors in both orders; the labeling must not change.
            let fp1 = FinderPattern::new(p(200.0, 200.0), base, side);
            let fp2 = FinderPattern::new(p(200.0, 200.0), side, base);
            for fp in [fp1, fp2] {
                assert!(cross2(fp.base, fp.side) < 0.0, "angle {angle_deg}");
                assert!((fp.base - base).norm() < 1e-3, "angle {angle_deg}");
                assert!((fp.side - side).norm() < 1e-3, "angle {angle_deg}");
            }
        }
    }

    #[test]
    fn overlapping_candidates_collapse_to_first_found() {
        let first = FinderPattern::new(
            p(100.0, 100.0),
            Vector2::new(40.0, 0.0),
            Vector2::new(0.0, -40.0),
        );
        let duplicate = FinderPattern::new(
            p(104.0, 103.0),
            Vector2::new(40.0, 0.0),
            Vector2::new(0.0, -40.0),
        );
        let far = FinderPattern::new(
            p(300.0, 100.0),
            Vector2::new(40.0, 0.0),
            Vector2::new(0.0, -40.0),
        );

        let mut accepted = Vec::new();
        assert_eq!(merge_unique(&mut accepted, [first]), 1);
        assert_eq!(merge_unique(&mut accepted, [duplicate, far]), 1);
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].corner, p(100.0, 100.0));
        assert_eq!(accepted[1].corner, p(300.0, 100.0));
    }

    fn pattern_with_radius(x: f32, radius: f32) -> FinderPattern {
        // radius = arm / sqrt(2) for equal arms.
        let arm = radius * (2.0f32).sqrt();
        FinderPattern::new(
            p(x, 0.0),
            Vector2::new(arm, 0.0),
            Vector2::new(0.0, -arm),
        )
    }

    #[test]
    fn radius_outlier_is_dropped() {
        let mut patterns: Vec<FinderPattern> = [10.0, 10.0, 10.0, 10.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &r)| pattern_with_radius(i as f32 * 500.0, r))
            .collect();
        reject_radius_outliers(&mut patterns, &LocateParams::default());
        assert_eq!(patterns.len(), 4);
        assert!(patterns.iter().all(|fp| fp.radius < 20.0));
    }

    #[test]
    fn small_sets_are_never_radius_filtered() {
        let mut patterns: Vec<FinderPattern> = [5.0, 50.0, 500.0]
            .iter()
            .enumerate()
            .map(|(i, &r)| pattern_with_radius(i as f32 * 2000.0, r))
            .collect();
        reject_radius_outliers(&mut patterns, &LocateParams::default());
        assert_eq!(patterns.len(), 3);
    }
}
