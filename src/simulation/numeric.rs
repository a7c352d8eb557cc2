/// Round to two decimal places.
///
/// Applied after every arithmetic combination so floating-point error cannot
/// accumulate across hundreds of ticks.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Clamp a villager attribute into `[0, 100]`.
pub fn clamp_attribute(value: f64) -> f64 {
    round2(value.clamp(0.0, 100.0))
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
