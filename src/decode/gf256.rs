//! GF(256) arithmetic for ECC200 Reed-Solomon codes.
//!
//! ECC200 uses the primitive polynomial x^8 + x^5 + x^3 + x^2 + 1 (0x12D)
//! with generator element 2; note this differs from the QR-code field (0x11D).

const PRIMITIVE: u16 = 0x12D;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    exp[255] = exp[0]; // alpha^255 = 1
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();
const EXP: [u8; 256] = TABLES.0;
const LOG: [u8; 256] = TABLES.1;

#[inline]
pub(crate) fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub(crate) fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
}

/// Division in the field. `b` must be non-zero; the decoder guards every
/// call site, so a zero divisor is a programming error.
#[inline]
pub(crate) fn div(a: u8, b: u8) -> u8 {
    debug_assert!(b != 0, "division by zero in GF(256)");
    if a == 0 {
        return 0;
    }
    let (la, lb) = (LOG[a as usize] as usize, LOG[b as usize] as usize);
    EXP[(la + 255 - lb) % 255]
}

/// `alpha^n` for any exponent.
#[inline]
pub(crate) fn alpha_pow(n: usize) -> u8 {
    EXP[n % 255]
}

/// `a^n` for arbitrary field element and exponent.
pub(crate) fn pow(a: u8, n: usize) -> u8 {
    if a == 0 {
        return if n == 0 { 1 } else { 0 };
    }
    EXP[(LOG[a as usize] as usize * (n % 255)) % 255]
}

/// Multiplicative inverse of a non-zero element.
#[inline]
pub(crate) fn inv(a: u8) -> u8 {
    debug_assert!(a != 0, "zero has no inverse in GF(256)");
    EXP[(255 - LOG[a as usize] as usize) % 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_cycles_after_255_steps() {
        assert_eq!(alpha_pow(0), 1);
        assert_eq!(alpha_pow(255), 1);
        assert_eq!(alpha_pow(256), 2);
    }

    #[test]
    fn field_uses_ecc200_polynomial() {
        // 2^8 reduces by 0x12D: 0x100 ^ 0x12D = 0x2D.
        assert_eq!(alpha_pow(8), 0x2D);
    }

    #[test]
    fn mul_and_div_are_inverse() {
        for a in 1..=255u8 {
            assert_eq!(mul(a, inv(a)), 1);
            assert_eq!(div(mul(a, 77), 77), a);
        }
    }

    #[test]
    fn zero_annihilates() {
        assert_eq!(mul(0, 123), 0);
        assert_eq!(mul(123, 0), 0);
        assert_eq!(div(0, 9), 0);
        assert_eq!(pow(0, 5), 0);
        assert_eq!(pow(0, 0), 1);
    }

    #[test]
    fn pow_matches_repeated_mul() {
        let mut acc = 1u8;
        for n in 0..20 {
            assert_eq!(pow(3, n), acc);
            acc = mul(acc, 3);
        }
    }
}
