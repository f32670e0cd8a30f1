/// Round to the given precision, e.g. a precision of `1e2` rounds to 2 decimal places.
pub(crate) fn round_by_precision(src: f64, precision: f64) -> f64 {
    (precision * src).round() / precision
}

pub(crate) fn round_to_2dp(src: f64) -> f64 {
    round_by_precision(src, 1e2)
}

/// Floors a power-like value at zero. The result is never negative, and never `-0.0`.
pub(crate) fn floor_at_zero(value: f64) -> f64 {
    if value > 0. {
        value
    } else {
        0.
    }
}

/// Replace a negative zero with a positive one, leaving every other value alone.
pub(crate) fn without_negative_zero(value: f64) -> f64 {
    if value == 0. {
        0.
    } else {
        value
    }
}
