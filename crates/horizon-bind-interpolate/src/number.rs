//! Numeric interpolators and number formatting.

use crate::Interpolator;

/// Linear interpolation between two numbers.
///
/// ```
/// use horizon_bind_interpolate::interpolate_number;
///
/// let i = interpolate_number(0.0, 100.0);
/// assert_eq!(i(0.5), 50.0);
/// ```
pub fn interpolate_number(a: f64, b: f64) -> Interpolator<f64> {
    Box::new(move |t| a + (b - a) * t)
}

/// Linear interpolation rounded to the nearest integer (halves round up).
pub fn interpolate_round(a: f64, b: f64) -> Interpolator<f64> {
    Box::new(move |t| js_round(a + (b - a) * t))
}

/// Round half toward positive infinity, keeping NaN and infinities.
pub(crate) fn js_round(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = (value + 0.5).floor();
    // -0.4 rounds to -0 rather than 0; normalize for display.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Format a number the way it is embedded in interpolated strings: integral
/// values without a fractional part, `-0` as `0`, and otherwise the shortest
/// digits that parse back to the same value. Magnitudes below `1e-6` or from
/// `1e21` up use exponent form (`1e-7`, `1.5e+21`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{:e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        };
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i128);
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_endpoints() {
        let i = interpolate_number(10.0, 20.0);
        assert_eq!(i(0.0), 10.0);
        assert_eq!(i(1.0), 20.0);
        assert_eq!(i(0.25), 12.5);
        // Extrapolates outside [0, 1].
        assert_eq!(i(2.0), 30.0);
    }

    #[test]
    fn test_round_halves_up() {
        let i = interpolate_round(0.0, 100.0);
        assert_eq!(i(0.5), 50.0);
        assert_eq!(i(0.005), 1.0);
        assert_eq!(js_round(-0.5), 0.0);
        assert_eq!(js_round(-1.5), -1.0);
        assert_eq!(js_round(2.5), 3.0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-12.25), "-12.25");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_formatting_uses_exponent_outside_fixed_range() {
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-9), "-2.5e-9");
        assert_eq!(format_number(1e-6), "0.000001");
        assert_eq!(format_number(1.5e21), "1.5e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }
}
