//! Small planar geometry helpers shared by the locator.
//!
//! Everything works on `nalgebra` points/vectors in pixel coordinates with
//! the y axis pointing down (raster convention).

use nalgebra::{Point2, Vector2};

/// A directed polyline edge between two vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: Point2<f32>,
    pub b: Point2<f32>,
}

impl Edge {
    #[inline]
    pub fn direction(&self) -> Vector2<f32> {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    /// The endpoint that is not `v`, or `None` if `v` is neither endpoint.
    pub fn other_endpoint(&self, v: Point2<f32>) -> Option<Point2<f32>> {
        if self.a == v {
            Some(self.b)
        } else if self.b == v {
            Some(self.a)
        } else {
            None
        }
    }

    /// The vertex shared between two edges, if any.
    pub fn shared_vertex(&self, other: &Edge) -> Option<Point2<f32>> {
        for v in [self.a, self.b] {
            if other.a == v || other.b == v {
                return Some(v);
            }
        }
        None
    }
}

/// Close a vertex list into its circular edge sequence
/// (`v0->v1, v1->v2, ..., vn->v0`). Fewer than two vertices yield no edges.
pub fn circular_edges(vertices: &[Point2<f32>]) -> Vec<Edge> {
    if vertices.len() < 2 {
        return Vec::new();
    }
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(&a, &b)| Edge { a, b })
        .collect()
}

/// Cosine of the angle between two vectors; 0 for degenerate input.
pub fn cosine_between(u: Vector2<f32>, v: Vector2<f32>) -> f32 {
    let denom = u.norm() * v.norm();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    u.dot(&v) / denom
}

/// 2-D cross product (z component of the 3-D cross).
#[inline]
pub fn cross2(u: Vector2<f32>, v: Vector2<f32>) -> f32 {
    u.x * v.y - u.y * v.x
}

/// Indices of the two longest edges, longest first.
pub fn longest_pair_indices(edges: &[Edge]) -> Option<(usize, usize)> {
    if edges.len() < 2 {
        return None;
    }
    let (mut first, mut second) = (0usize, 1usize);
    if edges[1].length() > edges[0].length() {
        (first, second) = (1, 0);
    }
    for (i, e) in edges.iter().enumerate().skip(2) {
        let len = e.length();
        if len > edges[first].length() {
            second = first;
            first = i;
        } else if len > edges[second].length() {
            second = i;
        }
    }
    Some((first, second))
}

/// True if indices `i` and `j` are neighbours in a circular sequence of
/// length `len`.
#[inline]
pub fn circularly_adjacent(i: usize, j: usize, len: usize) -> bool {
    let d = i.abs_diff(j);
    d == 1 || d == len - 1
}
