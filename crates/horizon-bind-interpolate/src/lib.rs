//! Stateless value interpolators for Horizon Bind.
//!
//! Every function here takes a pair of endpoint values and returns an
//! [`Interpolator`]: a closure mapping a parameter `t` (normally in `[0, 1]`)
//! to a value of the same shape as the endpoints. Nothing is cached or
//! shared between interpolators.
//!
//! # Example
//!
//! ```
//! use horizon_bind_interpolate::{Value, interpolate, interpolate_rgb, Rgb};
//!
//! let i = interpolate(Value::from(0.0), Value::from(10.0));
//! assert_eq!(i(0.5), Value::Number(5.0));
//!
//! let c = interpolate_rgb(Rgb::new(0.0, 0.0, 0.0), Rgb::new(255.0, 255.0, 255.0));
//! assert_eq!(c(0.5), "rgb(128, 128, 128)");
//! ```
//!
//! Color parsing goes through the `cssparser` crate and accepts hex
//! notation, `rgb()`/`rgba()` and a basic set of named colors. Transform
//! lists in CSS or SVG syntax are parsed the same way and interpolated
//! through their decomposition.

pub mod basis;
pub mod color;
mod error;
pub mod number;
pub mod quantize;
pub mod rgb;
pub mod string;
pub mod transform;
pub mod value;
pub mod zoom;

pub use basis::{interpolate_basis, interpolate_basis_closed};
pub use color::Rgb;
pub use error::{InterpolateError, Result};
pub use number::{format_number, interpolate_number, interpolate_round};
pub use quantize::quantize;
pub use rgb::{interpolate_rgb, interpolate_rgb_basis, interpolate_rgb_basis_closed, interpolate_rgb_gamma};
pub use string::interpolate_string;
pub use transform::{Transform, interpolate_transform_css, interpolate_transform_svg, interpolate_transforms};
pub use value::{Value, interpolate, interpolate_array, interpolate_object};
pub use zoom::{View, ZoomInterpolator, interpolate_zoom};

/// A function from a normalized parameter to an interpolated value.
pub type Interpolator<T> = Box<dyn Fn(f64) -> T + Send + Sync>;

/// Tracing target for this crate.
pub(crate) const LOG_TARGET: &str = "horizon_bind_interpolate";
