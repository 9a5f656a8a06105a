//! Symbol decoding: sampled bits to message bytes.
//!
//! The 144 data-region modules pack into 18 codewords along the standard
//! ECC200 placement walk. Reed-Solomon correction repairs up to five bad
//! codewords, then the data bytes up to the end-of-message codeword form
//! the message.

mod gf256;
mod placement;
mod reed_solomon;

use std::sync::OnceLock;

use thiserror::Error;

use crate::sample::BitMatrix;

pub use reed_solomon::{encode, BLOCK_LEN, DATA_LEN, ECC_LEN};

/// Codeword that terminates the logical message inside the data block.
pub const END_OF_MESSAGE: u8 = 129;

/// Why a sampled symbol failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// More byte errors than the ten parity codewords can correct.
    #[error("uncorrectable symbol: error count exceeds parity capacity")]
    TooManyErrors,
    /// Correction converged on a block that still fails the syndrome check.
    #[error("uncorrectable symbol: residual syndromes after correction")]
    ResidualSyndrome,
    /// The corrected data bytes carry no end-of-message codeword.
    #[error("corrected block has no end-of-message codeword")]
    MissingTerminator,
}

fn cells() -> &'static [[(u8, u8); 8]; BLOCK_LEN] {
    static CELLS: OnceLock<[[(u8, u8); 8]; BLOCK_LEN]> = OnceLock::new();
    CELLS.get_or_init(placement::codeword_cells)
}

/// Module coordinates of every codeword bit, shared with the synthetic
/// symbol renderer.
pub(crate) fn codeword_cells() -> &'static [[(u8, u8); 8]; BLOCK_LEN] {
    cells()
}

/// Decode one sampled data region into its message bytes.
///
/// Pure function of the bit matrix; the end-of-message codeword is
/// stripped from the returned message.
pub fn decode(bits: &BitMatrix) -> Result<Vec<u8>, DecodeError> {
    let mut block = [0u8; BLOCK_LEN];
    for (byte, codeword) in block.iter_mut().zip(cells()) {
        for &(r, c) in codeword {
            *byte = (*byte << 1) | u8::from(bits.get(r as usize, c as usize));
        }
    }

    let corrected = reed_solomon::correct(&mut block)?;
    if corrected > 0 {
        log::debug!("symbol decoded after correcting {corrected} codewords");
    }

    let data = &block[..DATA_LEN];
    let end = data
        .iter()
        .position(|&b| b == END_OF_MESSAGE)
        .ok_or(DecodeError::MissingTerminator)?;
    Ok(data[..end].to_vec())
}
