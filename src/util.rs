/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```should_panic
/// # use gridworld::assert_interval;
/// let alpha = 2.0;
/// assert_interval!(alpha, 0.0, 1.0);
/// ```
/// This will panic with the message "Invalid value for \`alpha\`. Must be in the interval \[0, 1\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Round `value` to `places` decimal places, half away from zero
pub fn round_to(value: f32, places: i32) -> f32 {
    let scale = 10f32.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_three_places() {
        assert_eq!(round_to(0.0016, 3), 0.002);
        assert_eq!(round_to(-0.0016, 3), -0.002);
        assert_eq!(round_to(0.2, 3), 0.2);
        assert_eq!(round_to(1.0, 3), 1.0);
    }

    #[test]
    #[should_panic(expected = "Invalid value for `alpha`")]
    fn assert_interval_panics_outside() {
        let alpha = 1.5;
        assert_interval!(alpha, 0.0, 1.0);
    }
}
