//! Candidate extraction: adaptive binarization, morphological cleanup and
//! contour tracing.
//!
//! This is the raster front end the locator consumes. Dark ink is mapped to
//! foreground, the binary mask is closed with a 3x3 element, and the closed
//! mask is traced into simplified polylines. Closing and contour tracing come
//! from `imageproc`; the mean threshold is a small integral-image routine
//! because `imageproc::contrast::adaptive_threshold` has no sensitivity
//! offset.

use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::geometry::approximate_polygon_dp;
use imageproc::morphology::close;
use nalgebra::Point2;

use crate::raster::GrayView;

/// One candidate-extraction pass: threshold at `mean - offset`, close, trace,
/// simplify. Returns closed polylines as vertex lists in pixel coordinates.
pub(crate) fn extract_polylines(
    src: &GrayView<'_>,
    block_size: u32,
    offset: i16,
    simplify_epsilon: f64,
) -> Vec<Vec<Point2<f32>>> {
    let mask = binarize_adaptive(src, block_size, offset);
    let closed = close(&mask, Norm::LInf, 1);

    find_contours::<i32>(&closed)
        .into_iter()
        .map(|c| approximate_polygon_dp(&c.points, simplify_epsilon, true))
        .filter(|poly| !poly.is_empty())
        .map(|poly| {
            poly.into_iter()
                .map(|p| Point2::new(p.x as f32, p.y as f32))
                .collect()
        })
        .collect()
}

/// Threshold a raster against its local mean: pixels darker than
/// `mean(block) - offset` become foreground (255).
///
/// `block_size` is the box side length in pixels and is clamped at the image
/// border; `offset` is the sensitivity constant the locator sweeps.
pub(crate) fn binarize_adaptive(src: &GrayView<'_>, block_size: u32, offset: i16) -> image::GrayImage {
    let w = src.width;
    let h = src.height;
    let mut out = image::GrayImage::new(w as u32, h as u32);
    if w == 0 || h == 0 {
        return out;
    }

    // Summed-area table with a one-cell zero border.
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += src.data[y * w + x] as u64;
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }
    let box_sum = |x0: usize, y0: usize, x1: usize, y1: usize| -> u64 {
        // Inclusive rectangle [x0..=x1] x [y0..=y1].
        integral[(y1 + 1) * (w + 1) + (x1 + 1)] + integral[y0 * (w + 1) + x0]
            - integral[y0 * (w + 1) + (x1 + 1)]
            - integral[(y1 + 1) * (w + 1) + x0]
    };

    let half = (block_size / 2) as usize;
    for y in 0..h {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(w - 1);
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
            let mean = (box_sum(x0, y0, x1, y1) / count) as i32;
            let value = src.data[y * w + x] as i32;
            if value < mean - offset as i32 {
                out.put_pixel(x as u32, y as u32, image::Luma([255]));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_patch_becomes_foreground() {
        let mut data = vec![230u8; 64 * 64];
        for y in 20..40 {
            for x in 20..40 {
                data[y * 64 + x] = 10;
            }
        }
        let view = GrayView::new(64, 64, &data).unwrap();
        let mask = binarize_adaptive(&view, 35, 16);

        assert_eq!(mask.get_pixel(30, 30)[0], 255);
        assert_eq!(mask.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn uniform_image_has_no_foreground() {
        let data = vec![128u8; 32 * 32];
        let view = GrayView::new(32, 32, &data).unwrap();
        let mask = binarize_adaptive(&view, 35, 8);
        assert!(mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn extract_polylines_traces_a_square() {
        let mut data = vec![240u8; 100 * 100];
        for y in 30..70 {
            for x in 30..70 {
                data[y * 100 + x] = 5;
            }
        }
        let view = GrayView::new(100, 100, &data).unwrap();
        let polys = extract_polylines(&view, 35, 16, 3.0);
        assert!(!polys.is_empty());
        // At least one polyline approximates the 40x40 square.
        assert!(polys.iter().any(|p| p.len() >= 4));
    }
}
