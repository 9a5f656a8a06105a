//! Intensity thresholds for module classification.

/// Otsu threshold over an arbitrary set of sampled intensities.
///
/// Used by the bit sampler to binarize one symbol's interior from the
/// intensities sampled at its module centers, so uneven lighting across the
/// frame does not bleed into the decision. Returns the midpoint of the two
/// class means at the optimal split, so both classes keep an equal margin
/// to the threshold.
pub(crate) fn otsu_from_samples(samples: &[u8]) -> f32 {
    if samples.is_empty() {
        return 127.5;
    }

    let mut lo = 255u8;
    let mut hi = 0u8;
    let mut hist = [0u32; 256];
    for &v in samples {
        lo = lo.min(v);
        hi = hi.max(v);
        hist[v as usize] += 1;
    }
    if lo == hi {
        return f32::from(lo);
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_below = 0.0f64;
    let mut weight_below = 0.0f64;
    let mut best_var = -1.0f64;
    let mut best_split = (lo as f64 + hi as f64) / 2.0;

    for (t, &h) in hist.iter().enumerate() {
        weight_below += h as f64;
        if weight_below < 1.0 {
            continue;
        }
        let weight_above = total - weight_below;
        if weight_above < 1.0 {
            break;
        }
        sum_below += t as f64 * h as f64;

        let mean_below = sum_below / weight_below;
        let mean_above = (sum_total - sum_below) / weight_above;
        let var = weight_below * weight_above * (mean_below - mean_above).powi(2);
        if var > best_var {
            best_var = var;
            best_split = (mean_below + mean_above) / 2.0;
        }
    }

    best_split as f32
}
