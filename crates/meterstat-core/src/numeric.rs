//! Finite arithmetic for accumulated figures
//!
//! Every figure in a report must stay finite. Individual readings are
//! coerced at the bucketizer, but sums of large finite readings can still
//! overflow, so running totals go through these helpers and saturate at
//! `±f64::MAX`.

/// Pull a result back into the finite range
///
/// Infinities saturate to `±f64::MAX` and `NaN` becomes zero.
pub fn clamp_finite(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-f64::MAX, f64::MAX)
    }
}

/// `a + b`, saturating instead of overflowing
///
/// # Examples
///
/// ```
/// use meterstat_core::numeric::saturating_add;
///
/// assert_eq!(saturating_add(1.5, 2.5), 4.0);
/// assert_eq!(saturating_add(f64::MAX, f64::MAX), f64::MAX);
/// ```
pub fn saturating_add(a: f64, b: f64) -> f64 {
    clamp_finite(a + b)
}

/// `a - b`, saturating instead of overflowing
pub fn saturating_sub(a: f64, b: f64) -> f64 {
    clamp_finite(a - b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_arithmetic_is_exact() {
        assert_eq!(saturating_add(0.1, 0.2), 0.1 + 0.2);
        assert_eq!(saturating_sub(10.0, 4.0), 6.0);
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(saturating_add(1e308, 1e308), f64::MAX);
        assert_eq!(saturating_add(-1e308, -1e308), -f64::MAX);
        assert_eq!(saturating_sub(f64::MAX, -f64::MAX), f64::MAX);
        assert_eq!(saturating_sub(-f64::MAX, f64::MAX), -f64::MAX);
    }

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(f64::INFINITY), f64::MAX);
        assert_eq!(clamp_finite(f64::NEG_INFINITY), -f64::MAX);
        assert_eq!(clamp_finite(f64::NAN), 0.0);
        assert_eq!(clamp_finite(-3.0), -3.0);
    }
}
