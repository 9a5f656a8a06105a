//! Reed-Solomon codec for the fixed 18-byte ECC200 block.
//!
//! The block carries 8 data codewords followed by 10 error-correction
//! codewords generated from roots alpha^1 .. alpha^10 (the ECC200
//! convention), which corrects up to 5 byte errors anywhere in the block.

use super::gf256 as gf;
use super::DecodeError;

/// Data codewords per symbol, end-of-message byte included.
pub const DATA_LEN: usize = 8;
/// Error-correction codewords per symbol.
pub const ECC_LEN: usize = 10;
/// Total codewords per symbol.
pub const BLOCK_LEN: usize = DATA_LEN + ECC_LEN;

/// Append the 10 parity codewords to a data block.
pub fn encode(data: &[u8; DATA_LEN]) -> [u8; BLOCK_LEN] {
    let gen = generator_poly();

    let mut parity = [0u8; ECC_LEN];
    for &d in data {
        let factor = d ^ parity[0];
        parity.rotate_left(1);
        parity[ECC_LEN - 1] = 0;
        for (p, &g) in parity.iter_mut().zip(&gen[1..]) {
            *p = gf::add(*p, gf::mul(g, factor));
        }
    }

    let mut block = [0u8; BLOCK_LEN];
    block[..DATA_LEN].copy_from_slice(data);
    block[DATA_LEN..].copy_from_slice(&parity);
    block
}

/// Correct up to 5 byte errors in place; returns how many were corrected.
pub fn correct(block: &mut [u8; BLOCK_LEN]) -> Result<usize, DecodeError> {
    let syn = syndromes(block);
    if syn.iter().all(|&s| s == 0) {
        return Ok(0);
    }

    let (sigma, errors) = error_locator(&syn);
    if errors == 0 || errors > ECC_LEN / 2 {
        return Err(DecodeError::TooManyErrors);
    }

    let positions = chien_search(&sigma);
    if positions.len() != errors {
        return Err(DecodeError::TooManyErrors);
    }

    let omega = error_evaluator(&syn, &sigma);
    for &i in &positions {
        // Error locator X for position i is alpha^(n-1-i); its inverse is
        // the sigma root found by the Chien search.
        let x_inv = gf::inv(gf::alpha_pow(BLOCK_LEN - 1 - i));
        let denom = eval_derivative(&sigma, x_inv);
        if denom == 0 {
            return Err(DecodeError::TooManyErrors);
        }
        // Forney with first root alpha^1: magnitude = omega(X^-1) / sigma'(X^-1).
        block[i] ^= gf::div(eval(&omega, x_inv), denom);
    }

    if syndromes(block).iter().any(|&s| s != 0) {
        return Err(DecodeError::ResidualSyndrome);
    }
    Ok(errors)
}

/// `syn[j] = C(alpha^(j+1))` with the block read as a polynomial in
/// descending powers (first codeword is the highest term).
fn syndromes(block: &[u8; BLOCK_LEN]) -> [u8; ECC_LEN] {
    let mut syn = [0u8; ECC_LEN];
    for (j, s) in syn.iter_mut().enumerate() {
        let x = gf::alpha_pow(j + 1);
        let mut acc = 0u8;
        for &c in block {
            acc = gf::add(gf::mul(acc, x), c);
        }
        *s = acc;
    }
    syn
}

/// `g(x) = prod_{i=1..ECC_LEN} (x - alpha^i)`, coefficients leading-first.
fn generator_poly() -> [u8; ECC_LEN + 1] {
    let mut g = [0u8; ECC_LEN + 1];
    g[0] = 1;
    let mut degree = 0usize;
    for i in 1..=ECC_LEN {
        let root = gf::alpha_pow(i);
        degree += 1;
        // Multiply by (x + root) in place, highest coefficient first.
        for j in (1..=degree).rev() {
            g[j] = gf::add(g[j], gf::mul(root, g[j - 1]));
        }
    }
    g
}

/// Berlekamp-Massey: error locator polynomial (ascending coefficients,
/// `sigma[0] == 1`) and the estimated error count.
fn error_locator(syn: &[u8; ECC_LEN]) -> (Vec<u8>, usize) {
    let mut sigma = vec![1u8];
    let mut prev = vec![1u8];
    let mut degree = 0usize;
    let mut shift = 1usize;
    let mut last_delta = 1u8;

    for n in 0..ECC_LEN {
        let mut delta = syn[n];
        for j in 1..=degree {
            let c = sigma.get(j).copied().unwrap_or(0);
            delta = gf::add(delta, gf::mul(c, syn[n - j]));
        }

        if delta == 0 {
            shift += 1;
            continue;
        }

        let snapshot = sigma.clone();
        let coef = gf::div(delta, last_delta);
        if sigma.len() < prev.len() + shift {
            sigma.resize(prev.len() + shift, 0);
        }
        for (j, &p) in prev.iter().enumerate() {
            sigma[j + shift] = gf::add(sigma[j + shift], gf::mul(coef, p));
        }

        if 2 * degree <= n {
            degree = n + 1 - degree;
            prev = snapshot;
            last_delta = delta;
            shift = 1;
        } else {
            shift += 1;
        }
    }

    sigma.truncate(degree + 1);
    (sigma, degree)
}

/// Evaluate sigma at every candidate root; a zero marks an error position.
fn chien_search(sigma: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    for i in 0..BLOCK_LEN {
        let x = gf::inv(gf::alpha_pow(BLOCK_LEN - 1 - i));
        if eval(sigma, x) == 0 {
            positions.push(i);
        }
    }
    positions
}

/// `omega(x) = syn(x) * sigma(x) mod x^ECC_LEN`, ascending coefficients.
fn error_evaluator(syn: &[u8; ECC_LEN], sigma: &[u8]) -> Vec<u8> {
    let mut omega = vec![0u8; ECC_LEN];
    for (i, o) in omega.iter_mut().enumerate() {
        for (j, &s) in sigma.iter().enumerate().take(i + 1) {
            *o = gf::add(*o, gf::mul(s, syn[i - j]));
        }
    }
    omega
}

fn eval(poly: &[u8], x: u8) -> u8 {
    let mut acc = 0u8;
    for &c in poly.iter().rev() {
        acc = gf::add(gf::mul(acc, x), c);
    }
    acc
}

/// Formal derivative evaluation; in characteristic 2 only odd-degree terms
/// survive.
fn eval_derivative(poly: &[u8], x: u8) -> u8 {
    let mut acc = 0u8;
    for (j, &c) in poly.iter().enumerate().skip(1).step_by(2) {
        acc = gf::add(acc, gf::mul(c, gf::pow(x, j - 1)));
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: [u8; DATA_LEN] = [0x41, 0x42, 0x81, 0x81, 0x81, 0x81, 0x81, 0x81];

    #[test]
    fn encoded_block_has_zero_syndromes() {
        let block = encode(&MESSAGE);
        assert!(syndromes(&block).iter().all(|&s| s == 0));
    }

    #[test]
    fn clean_block_needs_no_correction() {
        let mut block = encode(&MESSAGE);
        assert_eq!(correct(&mut block), Ok(0));
        assert_eq!(block[..DATA_LEN], MESSAGE);
    }

    #[test]
    fn corrects_one_to_five_errors() {
        for n_errors in 1..=5usize {
            let mut block = encode(&MESSAGE);
            for e in 0..n_errors {
                // Spread errors over data and parity positions.
                block[e * 3] ^= 0x5A + e as u8;
            }
            assert_eq!(correct(&mut block), Ok(n_errors), "{n_errors} errors");
            assert_eq!(block, encode(&MESSAGE), "{n_errors} errors");
        }
    }

    #[test]
    fn corrects_errors_in_parity_only() {
        let mut block = encode(&MESSAGE);
        block[BLOCK_LEN - 1] ^= 0xFF;
        block[BLOCK_LEN - 2] ^= 0x33;
        assert_eq!(correct(&mut block), Ok(2));
        assert_eq!(block[..DATA_LEN], MESSAGE);
    }

    #[test]
    fn six_errors_are_uncorrectable() {
        let mut block = encode(&MESSAGE);
        for e in 0..6usize {
            block[e * 3] ^= 0x11 + e as u8;
        }
        assert!(correct(&mut block).is_err());
    }

    #[test]
    fn all_zero_block_is_a_valid_codeword() {
        let mut block = [0u8; BLOCK_LEN];
        assert_eq!(correct(&mut block), Ok(0));
    }
}
