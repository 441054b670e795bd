//! Uniform sampling of an interpolator.

/// Sample `f` at `n` evenly spaced parameters from 0 to 1 inclusive.
///
/// `n == 1` samples `f(0)`; `n == 0` returns an empty list.
///
/// ```
/// use horizon_bind_interpolate::{interpolate_round, quantize};
///
/// assert_eq!(quantize(interpolate_round(-1.0, 2.0), 4), vec![-1.0, 0.0, 1.0, 2.0]);
/// ```
pub fn quantize<T, F>(f: F, n: usize) -> Vec<T>
where
    F: Fn(f64) -> T,
{
    match n {
        0 => Vec::new(),
        1 => vec![f(0.0)],
        _ => {
            let last = (n - 1) as f64;
            (0..n).map(|i| f(i as f64 / last)).collect()
        }
    }
}
