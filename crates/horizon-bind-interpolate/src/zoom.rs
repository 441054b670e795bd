//! Smooth zooming between two views.
//!
//! A view is `[cx, cy, width]`: the center of the viewport and its width.
//! The path zooms out, pans and zooms back in along the curve that keeps
//! perceived motion constant ("Smooth and efficient zooming and panning",
//! van Wijk and Nuij, 2003), and reports a duration proportional to its
//! length.

use std::time::Duration;

/// Curvature of the path. `sqrt(2)` balances zooming against panning.
const RHO: f64 = std::f64::consts::SQRT_2;
const RHO2: f64 = 2.0;
const RHO4: f64 = 4.0;
const EPSILON2: f64 = 1e-12;

/// A view: center x, center y, width.
pub type View = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Path {
    /// Same center: pure exponential zoom.
    Scale,
    /// Zoom out, pan and zoom in.
    Arc { distance: f64, r0: f64 },
}

/// Interpolates between two views. See [`interpolate_zoom`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomInterpolator {
    start: View,
    dx: f64,
    dy: f64,
    length: f64,
    path: Path,
}

impl ZoomInterpolator {
    /// The view at `t`, with `t = 0` the start view and `t = 1` the end view.
    pub fn at(&self, t: f64) -> View {
        let [ux0, uy0, w0] = self.start;
        let s = t * self.length;
        match self.path {
            Path::Scale => [ux0 + t * self.dx, uy0 + t * self.dy, w0 * (RHO * s).exp()],
            Path::Arc { distance, r0 } => {
                let cosh_r0 = r0.cosh();
                let u = w0 / (RHO2 * distance) * (cosh_r0 * (RHO * s + r0).tanh() - r0.sinh());
                [ux0 + u * self.dx, uy0 + u * self.dy, w0 * cosh_r0 / (RHO * s + r0).cosh()]
            }
        }
    }

    /// Recommended transition time, proportional to the length of the path.
    /// Degenerate views (a zero or non-finite width) give zero.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.length.abs()).unwrap_or_default()
    }
}

/// Interpolate between two views along a smooth zoom-and-pan path.
///
/// ```
/// use horizon_bind_interpolate::interpolate_zoom;
///
/// let zoom = interpolate_zoom([50.0, 50.0, 300.0], [100.0, 100.0, 500.0]);
/// let [x, y, w] = zoom.at(1.0);
/// assert!((x - 100.0).abs() < 1e-9 && (y - 100.0).abs() < 1e-9 && (w - 500.0).abs() < 1e-9);
/// assert!(zoom.duration().as_secs_f64() > 0.0);
/// ```
pub fn interpolate_zoom(p0: View, p1: View) -> ZoomInterpolator {
    let [ux0, uy0, w0] = p0;
    let [ux1, uy1, w1] = p1;
    let (dx, dy) = (ux1 - ux0, uy1 - uy0);
    let d2 = dx * dx + dy * dy;

    let (length, path) = if d2 < EPSILON2 {
        ((w1 / w0).ln() / RHO, Path::Scale)
    } else {
        let distance = d2.sqrt();
        let b0 = (w1 * w1 - w0 * w0 + RHO4 * d2) / (2.0 * w0 * RHO2 * distance);
        let b1 = (w1 * w1 - w0 * w0 - RHO4 * d2) / (2.0 * w1 * RHO2 * distance);
        let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
        let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
        ((r1 - r0) / RHO, Path::Arc { distance, r0 })
    };

    tracing::trace!(target: crate::LOG_TARGET, ?p0, ?p1, length, "zoom interpolator");
    ZoomInterpolator {
        start: p0,
        dx,
        dy,
        length,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: View, b: View) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_arc_path_hits_both_views() {
        let zoom = interpolate_zoom([50.0, 50.0, 300.0], [100.0, 100.0, 500.0]);
        assert!(close(zoom.at(0.0), [50.0, 50.0, 300.0]));
        assert!(close(zoom.at(1.0), [100.0, 100.0, 500.0]));
        let [_, _, mid] = zoom.at(0.5);
        assert!(mid > 300.0 && mid < 500.0);

        // A long pan at constant width zooms out on the way.
        let pan = interpolate_zoom([0.0, 0.0, 100.0], [1000.0, 0.0, 100.0]);
        let [x, _, w] = pan.at(0.5);
        assert!((x - 500.0).abs() < 1e-9);
        assert!(w > 1000.0);
    }

    #[test]
    fn test_same_center_zooms_exponentially() {
        let zoom = interpolate_zoom(
            [324.68721096803614, 59.43501602433761, 1.8827137399562621],
            [324.6872108946794, 59.43501601062763, 7.399052110984391],
        );
        assert!(close(
            zoom.at(0.5),
            [324.68721093135775, 59.43501601748262, 3.7323313186268305]
        ));

        let doubling = interpolate_zoom([0.0, 0.0, 100.0], [0.0, 0.0, 200.0]);
        assert!(close(doubling.at(0.5), [0.0, 0.0, 100.0 * std::f64::consts::SQRT_2]));
        let expected = std::f64::consts::LN_2 / std::f64::consts::SQRT_2;
        assert!((doubling.duration().as_secs_f64() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zooming_out_has_positive_duration() {
        let zoom = interpolate_zoom([0.0, 0.0, 200.0], [0.0, 0.0, 100.0]);
        assert!(zoom.duration() > Duration::ZERO);
        assert!(close(zoom.at(1.0), [0.0, 0.0, 100.0]));
    }

    #[test]
    fn test_degenerate_width_has_zero_duration() {
        let zoom = interpolate_zoom([0.0, 0.0, 0.0], [0.0, 0.0, 100.0]);
        assert_eq!(zoom.duration(), Duration::ZERO);
    }
}
