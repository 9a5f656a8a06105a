//! Bit-matrix sampling of a located symbol.
//!
//! A located finder pattern fixes a symbol-local frame: `u` runs along the
//! base edge, `v` along the side edge, both from 0 at the corner to 1 at
//! the far end. Module centers map into that frame, the pixel under each
//! center is read bilinearly, and a per-symbol Otsu threshold splits dark
//! modules from light ones. Each center is additionally probed at a ring of
//! sub-module "wiggle" offsets and the most decisive probe wins, which
//! tolerates small localization error without resampling the whole symbol.

use serde::{Deserialize, Serialize};

use crate::locate::FinderPattern;
use crate::raster::GrayView;
use crate::threshold::otsu_from_samples;

/// Modules per side of the data region.
pub const MATRIX_SIZE: usize = 12;
/// Modules per side of the whole symbol, finder and clock tracks included.
const SYMBOL_SIZE: usize = MATRIX_SIZE + 2;

/// The sampled 12x12 data region. Row 0 borders the clock track, row 11
/// the solid base edge; a set bit is a dark module.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct BitMatrix {
    bits: [[bool; MATRIX_SIZE]; MATRIX_SIZE],
}

impl BitMatrix {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.bits[row][col] = value;
    }
}

impl std::fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.bits {
            for &bit in row {
                f.write_str(if bit { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Sampler configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleParams {
    /// Sub-module offsets probed at every module center, in module units.
    /// The probe whose value lies farthest from the threshold decides the
    /// bit, so the first entry should stay `[0, 0]`.
    pub wiggle_offsets: Vec<[f32; 2]>,
}

impl Default for SampleParams {
    fn default() -> Self {
        let mut offsets = vec![[0.0, 0.0]];
        for w in [0.25f32, 0.5] {
            offsets.extend([
                [w, 0.0],
                [-w, 0.0],
                [0.0, w],
                [0.0, -w],
                [w, w],
                [w, -w],
                [-w, w],
                [-w, -w],
            ]);
        }
        Self {
            wiggle_offsets: offsets,
        }
    }
}

/// Read the data region of one symbol.
///
/// Probes that fall outside the frame are skipped; a module with no
/// in-frame probe reads as unset, and error correction downstream decides
/// whether the symbol survives.
pub fn sample_bits(
    image: &GrayView<'_>,
    pattern: &FinderPattern,
    params: &SampleParams,
) -> BitMatrix {
    let at = |u: f32, v: f32| pattern.corner + pattern.base * u + pattern.side * v;
    let n = SYMBOL_SIZE as f32;

    // Per-symbol threshold from one probe per module over the full 14x14
    // grid, so the solid finder edges anchor the dark class even for
    // sparse payloads.
    let mut samples = Vec::with_capacity(SYMBOL_SIZE * SYMBOL_SIZE);
    for j in 0..SYMBOL_SIZE {
        for i in 0..SYMBOL_SIZE {
            let p = at((i as f32 + 0.5) / n, (j as f32 + 0.5) / n);
            if image.contains_subpixel(p.x, p.y) {
                samples.push(image.sample_bilinear(p.x, p.y) as u8);
            }
        }
    }
    let threshold = otsu_from_samples(&samples);

    let mut bits = BitMatrix::default();
    for r in 0..MATRIX_SIZE {
        for c in 0..MATRIX_SIZE {
            let mut decisive: Option<f32> = None;
            for &[du, dv] in &params.wiggle_offsets {
                // Column c sits 1.5 modules in from the corner along the
                // base; row 0 sits 1.5 modules short of the far end along
                // the side.
                let u = (c as f32 + 1.5 + du) / n;
                let v = (MATRIX_SIZE as f32 + 0.5 - (r as f32 + dv)) / n;
                let p = at(u, v);
                if !image.contains_subpixel(p.x, p.y) {
                    continue;
                }
                let value = image.sample_bilinear(p.x, p.y);
                let better = decisive
                    .is_none_or(|best| (value - threshold).abs() > (best - threshold).abs());
                if better {
                    decisive = Some(value);
                }
            }
            bits.set(r, c, decisive.map_or(false, |value| value <= threshold));
        }
    }
    bits
}
