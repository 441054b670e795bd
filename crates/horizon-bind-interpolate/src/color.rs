//! RGB colors and CSS color parsing using the `cssparser` crate.
//!
//! Supports hex notation (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), the
//! `rgb()`/`rgba()` functions with numeric or percentage channels, and a set
//! of named colors.

use std::fmt;
use std::str::FromStr;

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

use crate::error::{InterpolateError, Result};
use crate::number::{format_number, js_round};

/// An RGB color with channels in `0..=255` and opacity in `0..=1`.
///
/// Channels are kept as `f64` so intermediate interpolation results are not
/// rounded; rounding and clamping happen on display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub opacity: f64,
}

impl Rgb {
    /// Create an opaque color.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r,
            g,
            b,
            opacity: 1.0,
        }
    }

    /// Return the color with a different opacity.
    pub const fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Parse a CSS color string.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser_input = ParserInput::new(input);
        let mut parser = Parser::new(&mut parser_input);
        parser
            .parse_entirely(|p| parse_color(p))
            .map_err(|_| InterpolateError::invalid_color(input, "unrecognized color syntax"))
    }

    /// Whether every channel is displayable (not NaN).
    pub fn is_displayable(&self) -> bool {
        !(self.r.is_nan() || self.g.is_nan() || self.b.is_nan())
    }

    fn channel(value: f64) -> u8 {
        let rounded = js_round(value);
        if rounded.is_nan() {
            0
        } else {
            rounded.clamp(0.0, 255.0) as u8
        }
    }
}

impl FromStr for Rgb {
    type Err = InterpolateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgb {
    /// Formats as `rgb(r, g, b)`, or `rgba(r, g, b, a)` when not opaque.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opacity = if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        };
        let (r, g, b) = (Self::channel(self.r), Self::channel(self.g), Self::channel(self.b));
        if opacity == 1.0 {
            write!(f, "rgb({}, {}, {})", r, g, b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", r, g, b, format_number(opacity))
        }
    }
}

fn parse_color<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<Rgb, CssParseError<'i, ()>> {
    parser.skip_whitespace();

    match parser.next()?.clone() {
        Token::Hash(hash) | Token::IDHash(hash) => {
            parse_hex(&hash).ok_or_else(|| parser.new_custom_error(()))
        }
        Token::Ident(name) => {
            named_color(&name.to_ascii_lowercase()).ok_or_else(|| parser.new_custom_error(()))
        }
        Token::Function(name)
            if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
        {
            parser.parse_nested_block(|p| {
                let r = parse_color_component(p)?;
                p.expect_comma()?;
                let g = parse_color_component(p)?;
                p.expect_comma()?;
                let b = parse_color_component(p)?;
                let opacity = if p.try_parse(|p| p.expect_comma()).is_ok() {
                    parse_alpha_component(p)?
                } else {
                    1.0
                };
                Ok(Rgb::new(r, g, b).with_opacity(opacity))
            })
        }
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_color_component<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<f64, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    match parser.next()?.clone() {
        Token::Number { value, .. } => Ok(f64::from(value)),
        Token::Percentage { unit_value, .. } => Ok(f64::from(unit_value) * 255.0),
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_alpha_component<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<f64, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    match parser.next()?.clone() {
        Token::Number { value, .. } => Ok(f64::from(value.clamp(0.0, 1.0))),
        Token::Percentage { unit_value, .. } => Ok(f64::from(unit_value)),
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    let rgb = |r: u8, g: u8, b: u8| Rgb::new(f64::from(r), f64::from(g), f64::from(b));

    match hex.len() {
        3 => Some(rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        4 => Some(
            rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)
                .with_opacity(f64::from(digit(3)? * 17) / 255.0),
        ),
        6 => Some(rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(rgb(pair(0)?, pair(2)?, pair(4)?).with_opacity(f64::from(pair(6)?) / 255.0)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let (r, g, b) = match name {
        "transparent" => return Some(Rgb::new(0.0, 0.0, 0.0).with_opacity(0.0)),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "lime" => (0, 255, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        "coral" => (255, 127, 80),
        "crimson" => (220, 20, 60),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "darkblue" => (0, 0, 139),
        "darkgreen" => (0, 100, 0),
        "darkred" => (139, 0, 0),
        "darkorange" => (255, 140, 0),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "lightblue" => (173, 216, 230),
        "lightgreen" => (144, 238, 144),
        "seagreen" => (46, 139, 87),
        "steelblue" => (70, 130, 180),
        "slategray" | "slategrey" => (112, 128, 144),
        "tomato" => (255, 99, 71),
        "orchid" => (218, 112, 214),
        "salmon" => (250, 128, 114),
        "khaki" => (240, 230, 140),
        "turquoise" => (64, 224, 208),
        "tan" => (210, 180, 140),
        "chocolate" => (210, 105, 30),
        "firebrick" => (178, 34, 34),
        "forestgreen" => (34, 139, 34),
        "royalblue" => (65, 105, 225),
        "skyblue" => (135, 206, 235),
        "midnightblue" => (25, 25, 112),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        _ => return None,
    };
    Some(Rgb::new(f64::from(r), f64::from(g), f64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Rgb::parse("#f00").unwrap(), Rgb::new(255.0, 0.0, 0.0));
        assert_eq!(Rgb::parse("#4682b4").unwrap(), Rgb::new(70.0, 130.0, 180.0));
        let c = Rgb::parse("#ff000080").unwrap();
        assert!((c.opacity - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgb::parse("steelblue").unwrap(), Rgb::new(70.0, 130.0, 180.0));
        assert_eq!(Rgb::parse("SeaGreen").unwrap(), Rgb::new(46.0, 139.0, 87.0));
        assert_eq!(Rgb::parse("transparent").unwrap().opacity, 0.0);
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(Rgb::parse("rgb(1, 2, 3)").unwrap(), Rgb::new(1.0, 2.0, 3.0));
        assert_eq!(
            Rgb::parse(" rgba(10, 20, 30, 0.5) ").unwrap(),
            Rgb::new(10.0, 20.0, 30.0).with_opacity(0.5)
        );
        assert_eq!(Rgb::parse("rgb(100%, 0%, 0%)").unwrap(), Rgb::new(255.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(Rgb::parse("notacolor").is_err());
        assert!(Rgb::parse("#12").is_err());
        assert!(Rgb::parse("rgb(1, 2)").is_err());
        assert!(Rgb::parse("red blue").is_err());
        assert!(Rgb::parse("5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgb::new(70.0, 130.0, 180.0).to_string(), "rgb(70, 130, 180)");
        assert_eq!(Rgb::new(300.0, -5.0, 1.5).to_string(), "rgb(255, 0, 2)");
        assert_eq!(Rgb::new(f64::NAN, 1.0, 2.0).to_string(), "rgb(0, 1, 2)");
        assert_eq!(
            Rgb::new(1.0, 2.0, 3.0).with_opacity(0.25).to_string(),
            "rgba(1, 2, 3, 0.25)"
        );
    }
}
