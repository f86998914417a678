/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! no_std logarithm for the reference models.
//!
//! `f32::ln` lives in `std`, so the reference models use this instead.

const LN2: f32 = 0.693_147_18;
const SQRT2: f32 = 1.414_213_56;

/// Natural logarithm of `x`, accurate to ~1e-6 relative error.
///
/// Returns `-inf` for `x == 0`, `NaN` for negative or NaN input, and `+inf`
/// for `+inf`.
pub fn ln(x: f32) -> f32 {
    if x.is_nan() || x < 0.0 {
        return f32::NAN;
    }
    if x == 0.0 {
        return f32::NEG_INFINITY;
    }
    if x.is_infinite() {
        return f32::INFINITY;
    }

    // Normalise subnormals so the exponent field is meaningful.
    let (x, bias) = if x < f32::MIN_POSITIVE {
        (x * 8_388_608.0, -23) // 2^23
    } else {
        (x, 0)
    };

    // x = m · 2^e with m in [1, 2)
    let bits = x.to_bits();
    let mut e = ((bits >> 23) & 0xff) as i32 - 127 + bias;
    let mut m = f32::from_bits((bits & 0x007f_ffff) | 0x3f80_0000);
    // Centre m on 1 so the series converges fast: m in [√2/2, √2).
    if m >= SQRT2 {
        m *= 0.5;
        e += 1;
    }

    // ln(m) = 2·atanh(s), s = (m − 1)/(m + 1), |s| ≤ 0.172
    let s = (m - 1.0) / (m + 1.0);
    let s2 = s * s;
    let series = s
        * (2.0
            + s2 * (2.0 / 3.0
                + s2 * (2.0 / 5.0 + s2 * (2.0 / 7.0 + s2 * (2.0 / 9.0)))));
    e as f32 * LN2 + series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-5 * (1.0 + b.abs())
    }

    #[test]
    fn ln_of_one_is_zero() {
        assert!(ln(1.0).abs() < 1e-7);
    }

    #[test]
    fn ln_known_values() {
        assert!(close(ln(2.0), 0.693_147_2), "{}", ln(2.0));
        assert!(close(ln(10.0), 2.302_585_1), "{}", ln(10.0));
        assert!(close(ln(0.5), -0.693_147_2), "{}", ln(0.5));
        assert!(close(ln(1e-3), -6.907_755_3), "{}", ln(1e-3));
        assert!(close(ln(12345.0), 9.421_006), "{}", ln(12345.0));
    }

    #[test]
    fn ln_edge_cases() {
        assert_eq!(ln(0.0), f32::NEG_INFINITY);
        assert!(ln(-1.0).is_nan());
        assert_eq!(ln(f32::INFINITY), f32::INFINITY);
        assert!(ln(1e-40).is_finite());
    }

    #[test]
    fn ln_is_additive() {
        let a = 3.7f32;
        let b = 0.21f32;
        assert!(close(ln(a * b), ln(a) + ln(b)));
    }
}
