//! Interpolation in RGB space.
//!
//! All interpolators here produce CSS color strings (`rgb(..)` or
//! `rgba(..)`). A channel that is NaN in one endpoint takes the other
//! endpoint's value, so an undefined start color fades in from nothing.

use crate::Interpolator;
use crate::basis::{interpolate_basis, interpolate_basis_closed};
use crate::color::Rgb;

type Channel = Box<dyn Fn(f64) -> f64 + Send + Sync>;

fn constant_or(a: f64, b: f64) -> Channel {
    let value = if a.is_nan() { b } else { a };
    Box::new(move |_| value)
}

fn linear_channel(a: f64, b: f64) -> Channel {
    let d = b - a;
    if d == 0.0 || d.is_nan() {
        return constant_or(a, b);
    }
    Box::new(move |t| a + t * d)
}

fn gamma_channel(a: f64, b: f64, gamma: f64) -> Channel {
    if gamma == 1.0 {
        return linear_channel(a, b);
    }
    let d = b - a;
    if d == 0.0 || d.is_nan() {
        return constant_or(a, b);
    }
    let start = a.powf(gamma);
    let delta = b.powf(gamma) - start;
    let inverse = 1.0 / gamma;
    Box::new(move |t| (start + t * delta).powf(inverse))
}

/// Linear interpolation between two colors.
///
/// ```
/// use horizon_bind_interpolate::{Rgb, interpolate_rgb};
///
/// let seagreen = Rgb::parse("seagreen").unwrap();
/// let steelblue = Rgb::parse("steelblue").unwrap();
/// let i = interpolate_rgb(seagreen, steelblue);
/// assert_eq!(i(0.0), "rgb(46, 139, 87)");
/// assert_eq!(i(1.0), "rgb(70, 130, 180)");
/// ```
pub fn interpolate_rgb(a: Rgb, b: Rgb) -> Interpolator<String> {
    interpolate_rgb_gamma(a, b, 1.0)
}

/// Gamma-corrected interpolation: each channel is raised to `gamma` before
/// blending and to `1 / gamma` after. Opacity is always blended linearly.
pub fn interpolate_rgb_gamma(a: Rgb, b: Rgb, gamma: f64) -> Interpolator<String> {
    let r = gamma_channel(a.r, b.r, gamma);
    let g = gamma_channel(a.g, b.g, gamma);
    let bl = gamma_channel(a.b, b.b, gamma);
    let opacity = linear_channel(a.opacity, b.opacity);
    Box::new(move |t| Rgb::new(r(t), g(t), bl(t)).with_opacity(opacity(t)).to_string())
}

fn spline(colors: &[Rgb], basis: fn(Vec<f64>) -> Interpolator<f64>) -> Interpolator<String> {
    let channel = |pick: fn(&Rgb) -> f64| {
        basis(
            colors
                .iter()
                .map(|c| {
                    let v = pick(c);
                    if v.is_nan() { 0.0 } else { v }
                })
                .collect(),
        )
    };
    let r = channel(|c| c.r);
    let g = channel(|c| c.g);
    let b = channel(|c| c.b);
    Box::new(move |t| Rgb::new(r(t), g(t), b(t)).to_string())
}

/// A B-spline through the channels of `colors`. The result is opaque.
pub fn interpolate_rgb_basis(colors: &[Rgb]) -> Interpolator<String> {
    spline(colors, interpolate_basis)
}

/// A closed B-spline through the channels of `colors`. The result is opaque.
pub fn interpolate_rgb_basis_closed(colors: &[Rgb]) -> Interpolator<String> {
    spline(colors, interpolate_basis_closed)
}
