//! Uniform cubic B-spline interpolation through a list of values.

use crate::Interpolator;

/// Evaluate one B-spline segment with local parameter `t1` and control
/// values `v0..v3`.
pub(crate) fn basis_point(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// A B-spline through `values`. The first and last values are reached at
/// `t = 0` and `t = 1`; interior values are control points.
///
/// A single value gives a constant; no values gives NaN everywhere.
///
/// ```
/// use horizon_bind_interpolate::interpolate_basis;
///
/// let i = interpolate_basis(vec![0.0, 10.0]);
/// assert_eq!(i(0.0), 0.0);
/// assert_eq!(i(1.0), 10.0);
/// ```
pub fn interpolate_basis(values: Vec<f64>) -> Interpolator<f64> {
    match values.len() {
        0 => return Box::new(|_| f64::NAN),
        1 => {
            let only = values[0];
            return Box::new(move |_| only);
        }
        _ => {}
    }

    let n = values.len() - 1;
    Box::new(move |t| {
        let (t, i) = if t <= 0.0 {
            (0.0, 0)
        } else if t >= 1.0 {
            (1.0, n - 1)
        } else {
            (t, (t * n as f64).floor() as usize)
        };
        let v1 = values[i];
        let v2 = values[i + 1];
        let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
        let v3 = if i + 2 <= n { values[i + 2] } else { 2.0 * v2 - v1 };
        basis_point((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
    })
}

/// A closed (cyclical) B-spline: the control points wrap so that `t = 0`
/// and `t = 1` meet smoothly. No values gives NaN everywhere.
pub fn interpolate_basis_closed(values: Vec<f64>) -> Interpolator<f64> {
    if values.is_empty() {
        return Box::new(|_| f64::NAN);
    }

    let n = values.len();
    Box::new(move |t| {
        let t = t.rem_euclid(1.0);
        let i = ((t * n as f64).floor() as usize).min(n - 1);
        let v0 = values[(i + n - 1) % n];
        let v1 = values[i % n];
        let v2 = values[(i + 1) % n];
        let v3 = values[(i + 2) % n];
        basis_point((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_open_spline_hits_endpoints() {
        let i = interpolate_basis(vec![1.0, 50.0, 30.0, 10.0]);
        assert!(close(i(0.0), 1.0));
        assert!(close(i(1.0), 10.0));
        // Clamped outside the domain.
        assert!(close(i(-1.0), 1.0));
        assert!(close(i(2.0), 10.0));
    }

    #[test]
    fn test_two_values_are_linear() {
        let i = interpolate_basis(vec![0.0, 12.0]);
        assert!(close(i(0.25), 3.0));
        assert!(close(i(0.5), 6.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(interpolate_basis(vec![])(0.5).is_nan());
        assert_eq!(interpolate_basis(vec![4.0])(0.3), 4.0);
        assert!(interpolate_basis_closed(vec![])(0.5).is_nan());
        assert!(close(interpolate_basis_closed(vec![4.0])(0.3), 4.0));
    }

    #[test]
    fn test_closed_spline_wraps() {
        let i = interpolate_basis_closed(vec![1.0, 50.0, 30.0, 10.0]);
        assert!(close(i(0.0), i(1.0)));
        assert!(close(i(0.25), i(1.25)));
        assert!(close(i(-0.75), i(0.25)));
        // (v3 + 4 v0 + v1) / 6 at t = 0.
        assert!(close(i(0.0), (10.0 + 4.0 + 50.0) / 6.0));
    }
}
