//! Fitting a puck template to located symbol centers.
//!
//! Not every slot holds a readable symbol and the locator may report
//! spurious patterns, so the fit must explain a subset of the observed
//! centers as a subset of the template slots. Every ordered template slot
//! pair mapped onto an observed center pair proposes one similarity
//! transform (uniform scale, rotation, translation); proposals are scored
//! by how many observed centers land close to some transformed slot, and
//! the winner is refined with a closed-form least-squares fit over its
//! matched pairs.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::puck::PuckTemplate;

/// Uniform scale + rotation + translation in the image plane.
///
/// The linear part is kept as a complex number `a`, so composing and
/// solving stay two-dimensional.
#[derive(Clone, Copy, Debug)]
pub struct Similarity {
    pub a: Vector2<f32>,
    pub t: Vector2<f32>,
}

impl Similarity {
    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(
            self.a.x * p.x - self.a.y * p.y + self.t.x,
            self.a.y * p.x + self.a.x * p.y + self.t.y,
        )
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.a.norm()
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.a.y.atan2(self.a.x)
    }

    /// The unique similarity taking `(s0, s1)` onto `(d0, d1)`, or `None`
    /// when either pair is degenerate.
    fn from_point_pair(
        s0: Point2<f32>,
        s1: Point2<f32>,
        d0: Point2<f32>,
        d1: Point2<f32>,
    ) -> Option<Self> {
        let sv = s1 - s0;
        let dv = d1 - d0;
        let denom = sv.norm_squared();
        if denom <= f32::EPSILON || dv.norm_squared() <= f32::EPSILON {
            return None;
        }
        // Complex division dv / sv.
        let a = Vector2::new(
            (dv.x * sv.x + dv.y * sv.y) / denom,
            (dv.y * sv.x - dv.x * sv.y) / denom,
        );
        let t = d0.coords - rotate(a, s0.coords);
        Some(Self { a, t })
    }

    /// Least-squares similarity over matched `(template, image)` pairs.
    fn least_squares(pairs: &[(Point2<f32>, Point2<f32>)]) -> Option<Self> {
        if pairs.len() < 2 {
            return None;
        }
        let inv = 1.0 / pairs.len() as f32;
        let sm: Vector2<f32> = pairs.iter().map(|(s, _)| s.coords).sum::<Vector2<f32>>() * inv;
        let dm: Vector2<f32> = pairs.iter().map(|(_, d)| d.coords).sum::<Vector2<f32>>() * inv;

        let mut num = Vector2::zeros();
        let mut denom = 0.0f32;
        for (s, d) in pairs {
            let sc = s.coords - sm;
            let dc = d.coords - dm;
            // dc * conj(sc), accumulated.
            num.x += dc.x * sc.x + dc.y * sc.y;
            num.y += dc.y * sc.x - dc.x * sc.y;
            denom += sc.norm_squared();
        }
        if denom <= f32::EPSILON {
            return None;
        }
        let a = num / denom;
        let t = dm - rotate(a, sm);
        Some(Self { a, t })
    }
}

#[inline]
fn rotate(a: Vector2<f32>, v: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(a.x * v.x - a.y * v.y, a.y * v.x + a.x * v.y)
}

/// Aligner configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignParams {
    /// Minimum usable centers for a fit, and the minimum inlier count for
    /// accepting one.
    pub min_centers: usize,
    /// Match radius as a fraction of the transformed slot radius.
    pub match_tolerance: f32,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            min_centers: 3,
            match_tolerance: 1.0,
        }
    }
}

/// Why no alignment was produced for a frame.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignError {
    #[error("puck alignment needs at least {needed} centers, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("no similarity transform matched at least {needed} centers")]
    TooFewInliers { needed: usize },
}

/// A puck template fitted to one frame.
#[derive(Clone, Debug)]
pub struct PuckAlignment {
    pub transform: Similarity,
    /// Puck center in image pixels.
    pub center: Point2<f32>,
    /// Puck radius in image pixels.
    pub radius: f32,
    /// Transformed slot centers, slot index order.
    pub slot_centers: Vec<Point2<f32>>,
    /// Slot radius in image pixels.
    pub slot_radius: f32,
    /// Observed centers matched by the final transform.
    pub inliers: usize,
}

impl PuckAlignment {
    /// Index of the slot a located pattern belongs to, or `None` when the
    /// pattern center is not within the slot radius of any slot.
    pub fn assign_slot(&self, center: Point2<f32>) -> Option<usize> {
        let (idx, dist) = nearest(&self.slot_centers, center)?;
        (dist <= self.slot_radius).then_some(idx)
    }
}

/// Fit `template` to the observed `centers`.
pub fn align(
    template: &PuckTemplate,
    centers: &[Point2<f32>],
    params: &AlignParams,
) -> Result<PuckAlignment, AlignError> {
    if centers.len() < params.min_centers {
        return Err(AlignError::InsufficientData {
            needed: params.min_centers,
            got: centers.len(),
        });
    }

    let slots = template.slots();
    let mut best: Option<(usize, f32, Similarity)> = None;
    for i in 0..centers.len() {
        for j in (i + 1)..centers.len() {
            for p in 0..slots.len() {
                for q in 0..slots.len() {
                    if p == q {
                        continue;
                    }
                    let Some(hyp) =
                        Similarity::from_point_pair(slots[p], slots[q], centers[i], centers[j])
                    else {
                        continue;
                    };
                    let tol = params.match_tolerance * hyp.scale() * template.slot_radius();
                    let (count, dist_sum) = score(&hyp, slots, centers, tol);
                    let better = match best {
                        None => true,
                        Some((n, d, _)) => count > n || (count == n && dist_sum < d),
                    };
                    if better {
                        best = Some((count, dist_sum, hyp));
                    }
                }
            }
        }
    }

    let Some((_, _, coarse)) = best else {
        return Err(AlignError::TooFewInliers {
            needed: params.min_centers,
        });
    };

    let tol = params.match_tolerance * coarse.scale() * template.slot_radius();
    let matched = matched_pairs(&coarse, slots, centers, tol);
    let transform = Similarity::least_squares(&matched).unwrap_or(coarse);

    let tol = params.match_tolerance * transform.scale() * template.slot_radius();
    let (inliers, _) = score(&transform, slots, centers, tol);
    if inliers < params.min_centers {
        return Err(AlignError::TooFewInliers {
            needed: params.min_centers,
        });
    }

    let slot_centers: Vec<Point2<f32>> = slots.iter().map(|&s| transform.apply(s)).collect();
    log::debug!(
        "puck alignment: {inliers}/{} centers matched, scale {:.2} px/unit, rotation {:.3} rad",
        centers.len(),
        transform.scale(),
        transform.rotation()
    );
    Ok(PuckAlignment {
        center: transform.apply(Point2::origin()),
        radius: transform.scale() * template.radius(),
        slot_centers,
        slot_radius: transform.scale() * template.slot_radius(),
        inliers,
        transform,
    })
}

/// Inlier count and summed match distance for one candidate transform.
fn score(
    transform: &Similarity,
    slots: &[Point2<f32>],
    centers: &[Point2<f32>],
    tolerance: f32,
) -> (usize, f32) {
    let projected: Vec<Point2<f32>> = slots.iter().map(|&s| transform.apply(s)).collect();
    let mut count = 0usize;
    let mut dist_sum = 0.0f32;
    for &c in centers {
        if let Some((_, dist)) = nearest(&projected, c) {
            if dist <= tolerance {
                count += 1;
                dist_sum += dist;
            }
        }
    }
    (count, dist_sum)
}

/// `(template slot, observed center)` pairs matched under `transform`.
fn matched_pairs(
    transform: &Similarity,
    slots: &[Point2<f32>],
    centers: &[Point2<f32>],
    tolerance: f32,
) -> Vec<(Point2<f32>, Point2<f32>)> {
    let projected: Vec<Point2<f32>> = slots.iter().map(|&s| transform.apply(s)).collect();
    centers
        .iter()
        .filter_map(|&c| {
            let (idx, dist) = nearest(&projected, c)?;
            (dist <= tolerance).then_some((slots[idx], c))
        })
        .collect()
}

fn nearest(points: &[Point2<f32>], p: Point2<f32>) -> Option<(usize, f32)> {
    points
        .iter()
        .enumerate()
        .map(|(i, &q)| (i, (q - p).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
