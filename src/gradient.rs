//! Gradient offset for the line-colour-transition chart

use crate::aggregation_types::GradientOffset;

/// Position of `baseline` within `[domain_min, domain_max]`, from the top
///
/// `usable` is false when the domain is degenerate or the baseline is not
/// strictly inside it; the chart should then use one solid colour.
///
/// ```
/// use meterstat::gradient::compute_offset;
///
/// let g = compute_offset(0.0, 200.0, 150.0);
/// assert_eq!(g.offset, 0.25);
/// assert!(g.usable);
///
/// assert!(!compute_offset(0.0, 100.0, 144.0).usable);
/// ```
pub fn compute_offset(domain_min: f64, domain_max: f64, baseline: f64) -> GradientOffset {
    let span = domain_max - domain_min;
    if !span.is_finite() || span == 0.0 || !baseline.is_finite() {
        return GradientOffset {
            offset: 0.0,
            usable: false,
        };
    }

    GradientOffset {
        offset: ((domain_max - baseline) / span).clamp(0.0, 1.0),
        usable: domain_min < baseline && baseline < domain_max,
    }
}
