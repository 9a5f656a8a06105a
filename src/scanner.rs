//! One-pass scan orchestration: locate, sample, decode, align, label.

use nalgebra::Point2;
use rayon::prelude::*;

use crate::align::{align, PuckAlignment};
use crate::decode::{decode, DecodeError};
use crate::locate::{locate, FinderPattern};
use crate::params::ScanParams;
use crate::puck::PuckTemplate;
use crate::raster::GrayView;
use crate::sample::{sample_bits, BitMatrix};

/// One located symbol after decoding and slot assignment. Immutable once
/// the scan that produced it returns.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub pattern: FinderPattern,
    pub bits: BitMatrix,
    /// Message bytes, or why this symbol did not decode. A failed symbol
    /// still carries its geometry for overlay rendering.
    pub message: Result<Vec<u8>, DecodeError>,
    /// Slot index on the fitted puck, absent when alignment failed or the
    /// pattern sits on no slot.
    pub slot: Option<usize>,
}

/// Everything one pass over a frame produced.
#[derive(Clone, Debug)]
pub struct ScanResult {
    /// Symbols in slot order; unassigned symbols follow, ordered by
    /// center position for determinism.
    pub symbols: Vec<Symbol>,
    pub alignment: Option<PuckAlignment>,
}

/// Puck scanner: a template plus tuning, reusable across frames.
pub struct Scanner {
    template: PuckTemplate,
    params: ScanParams,
}

impl Scanner {
    pub fn new(template: PuckTemplate, params: ScanParams) -> Self {
        Self { template, params }
    }

    #[inline]
    pub fn template(&self) -> &PuckTemplate {
        &self.template
    }

    /// Scan one grayscale frame.
    ///
    /// A frame without a single finder pattern yields an empty result;
    /// per-symbol failures never abort the rest of the scan.
    pub fn scan(&self, image: &GrayView<'_>) -> ScanResult {
        let patterns = locate(image, &self.params.locate);
        if patterns.is_empty() {
            log::debug!("no finder patterns in frame");
            return ScanResult {
                symbols: Vec::new(),
                alignment: None,
            };
        }

        // Sampling and decoding are independent per pattern.
        let decoded: Vec<(BitMatrix, Result<Vec<u8>, DecodeError>)> = patterns
            .par_iter()
            .map(|pattern| {
                let bits = sample_bits(image, pattern, &self.params.sample);
                let message = decode(&bits);
                (bits, message)
            })
            .collect();

        let centers: Vec<Point2<f32>> = patterns.iter().map(|p| p.center).collect();
        let alignment = match align(&self.template, &centers, &self.params.align) {
            Ok(fit) => Some(fit),
            Err(err) => {
                log::info!("puck alignment unavailable: {err}");
                None
            }
        };

        let mut symbols: Vec<Symbol> = patterns
            .into_iter()
            .zip(decoded)
            .map(|(pattern, (bits, message))| {
                if let Err(err) = &message {
                    log::debug!(
                        "symbol at ({:.0}, {:.0}): {err}",
                        pattern.center.x,
                        pattern.center.y
                    );
                }
                let slot = alignment
                    .as_ref()
                    .and_then(|fit| fit.assign_slot(pattern.center));
                Symbol {
                    pattern,
                    bits,
                    message,
                    slot,
                }
            })
            .collect();

        symbols.sort_by(|a, b| {
            let rank = |s: &Symbol| s.slot.unwrap_or(usize::MAX);
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.pattern.center.x.total_cmp(&b.pattern.center.x))
                .then_with(|| a.pattern.center.y.total_cmp(&b.pattern.center.y))
        });

        log::debug!(
            "scan: {} symbols, {} decoded, alignment {}",
            symbols.len(),
            symbols.iter().filter(|s| s.message.is_ok()).count(),
            if alignment.is_some() { "fitted" } else { "absent" }
        );
        ScanResult { symbols, alignment }
    }
}
