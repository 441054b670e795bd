//! 2D transform interpolation.
//!
//! A transform list is parsed with `cssparser`, multiplied out to a single
//! affine matrix and decomposed into translate, rotate, skewX and scale.
//! The decomposed parts are interpolated independently and written back as a
//! transform list that only names the parts which are not the identity.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

use crate::Interpolator;
use crate::error::{InterpolateError, Result};
use crate::number::format_number;

type ParseResult<'i, T> = std::result::Result<T, CssParseError<'i, ()>>;

/// Syntax of a transform list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// The CSS `transform` property: `px` lengths and angle units.
    Css,
    /// The SVG `transform` attribute: plain numbers, angles in degrees.
    Svg,
}

impl Dialect {
    fn px_comma(self) -> &'static str {
        match self {
            Dialect::Css => "px, ",
            Dialect::Svg => ", ",
        }
    }

    fn px_paren(self) -> &'static str {
        match self {
            Dialect::Css => "px)",
            Dialect::Svg => ")",
        }
    }

    fn deg_paren(self) -> &'static str {
        match self {
            Dialect::Css => "deg)",
            Dialect::Svg => ")",
        }
    }
}

/// An affine matrix `[a b c d e f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(x: f64, y: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, x, y])
    }

    fn scale(x: f64, y: f64) -> Self {
        Matrix([x, 0.0, 0.0, y, 0.0, 0.0])
    }

    fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Matrix([cos, sin, -sin, cos, 0.0, 0.0])
    }

    fn skew(x_degrees: f64, y_degrees: f64) -> Self {
        Matrix([1.0, y_degrees.to_radians().tan(), x_degrees.to_radians().tan(), 1.0, 0.0, 0.0])
    }

    /// `self` followed by `other`, in transform-list order.
    fn then(self, other: Matrix) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }
}

/// A transform decomposed into independently interpolable parts.
///
/// Parts are rounded to nine decimal places so that round-off from the
/// trigonometry (`rotate(60)` decomposing to `59.99999999999999`) does not
/// leak into the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    /// Degrees.
    pub rotate: f64,
    /// Degrees.
    pub skew_x: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        rotate: 0.0,
        skew_x: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Decompose the affine matrix `[a b c d e f]`.
    pub fn from_matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        let (mut a, mut b, mut c, mut d) = (a, b, c, d);
        let mut scale_x = (a * a + b * b).sqrt();
        if scale_x != 0.0 {
            a /= scale_x;
            b /= scale_x;
        }
        let mut skew_x = a * c + b * d;
        if skew_x != 0.0 {
            c -= a * skew_x;
            d -= b * skew_x;
        }
        let scale_y = (c * c + d * d).sqrt();
        if scale_y != 0.0 {
            skew_x /= scale_y;
        }
        if a * d < b * c {
            a = -a;
            b = -b;
            skew_x = -skew_x;
            scale_x = -scale_x;
        }
        Transform {
            translate_x: clean(e),
            translate_y: clean(f),
            rotate: clean(b.atan2(a).to_degrees()),
            skew_x: clean(skew_x.atan().to_degrees()),
            scale_x: clean(scale_x),
            scale_y: clean(scale_y),
        }
    }

    /// Parse a CSS `transform` value such as `translate(10px, 5px) rotate(45deg)`.
    /// An empty string or `none` is the identity.
    pub fn parse_css(input: &str) -> Result<Self> {
        parse_list(input, Dialect::Css)
    }

    /// Parse an SVG `transform` attribute such as `translate(10 5) rotate(45)`.
    /// An empty string is the identity.
    pub fn parse_svg(input: &str) -> Result<Self> {
        parse_list(input, Dialect::Svg)
    }
}

fn clean(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= 1e12 {
        return value;
    }
    let rounded = (value * 1e9).round() / 1e9;
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn parse_list(input: &str, dialect: Dialect) -> Result<Transform> {
    let trimmed = input.trim();
    if trimmed.is_empty() || (dialect == Dialect::Css && trimmed.eq_ignore_ascii_case("none")) {
        return Ok(Transform::IDENTITY);
    }
    let mut parser_input = ParserInput::new(trimmed);
    let mut parser = Parser::new(&mut parser_input);
    let [a, b, c, d, e, f] = parser
        .parse_entirely(|p| parse_functions(p, dialect))
        .map_err(|_| InterpolateError::invalid_transform(input, "unrecognized transform syntax"))?
        .0;
    Ok(Transform::from_matrix(a, b, c, d, e, f))
}

fn parse_functions<'i>(parser: &mut Parser<'i, '_>, dialect: Dialect) -> ParseResult<'i, Matrix> {
    let mut matrix = Matrix::IDENTITY;
    while !parser.is_exhausted() {
        let name = parser.expect_function()?.clone();
        let args = parser.parse_nested_block(parse_arguments)?;
        let step = function_matrix(&name.to_ascii_lowercase(), &args, dialect)
            .ok_or_else(|| parser.new_custom_error(()))?;
        matrix = matrix.then(step);
        // SVG separates transforms with whitespace or commas.
        let _ = parser.try_parse(|p| p.expect_comma());
    }
    Ok(matrix)
}

/// A numeric argument and its unit, if any.
#[derive(Debug, Clone, PartialEq)]
struct Argument {
    value: f64,
    unit: Option<String>,
}

fn parse_arguments<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Vec<Argument>> {
    let mut args = Vec::new();
    while !parser.is_exhausted() {
        parser.skip_whitespace();
        let start = parser.position();
        let token = parser.next()?.clone();
        // Tokens carry `f32` values; re-read the source text for full precision.
        let text = parser.slice_from(start).trim_end();
        let argument = match token {
            Token::Number { .. } => Argument {
                value: text.parse().map_err(|_| parser.new_custom_error(()))?,
                unit: None,
            },
            Token::Dimension { unit, .. } => {
                let digits = text.get(..text.len().saturating_sub(unit.len())).unwrap_or_default();
                Argument {
                    value: digits.parse().map_err(|_| parser.new_custom_error(()))?,
                    unit: Some(unit.to_ascii_lowercase()),
                }
            }
            _ => return Err(parser.new_custom_error(())),
        };
        args.push(argument);
        let _ = parser.try_parse(|p| p.expect_comma());
    }
    Ok(args)
}

impl Argument {
    fn length(&self, dialect: Dialect) -> Option<f64> {
        match (&self.unit, dialect) {
            (None, _) => Some(self.value),
            (Some(unit), Dialect::Css) if unit == "px" => Some(self.value),
            _ => None,
        }
    }

    fn angle(&self, dialect: Dialect) -> Option<f64> {
        match (&self.unit, dialect) {
            (None, _) => Some(self.value),
            (Some(unit), Dialect::Css) => match unit.as_str() {
                "deg" => Some(self.value),
                "rad" => Some(self.value.to_degrees()),
                "grad" => Some(self.value * 0.9),
                "turn" => Some(self.value * 360.0),
                _ => None,
            },
            _ => None,
        }
    }

    fn plain(&self) -> Option<f64> {
        match self.unit {
            None => Some(self.value),
            Some(_) => None,
        }
    }
}

fn function_matrix(name: &str, args: &[Argument], dialect: Dialect) -> Option<Matrix> {
    let length = |i: usize| args.get(i)?.length(dialect);
    let angle = |i: usize| args.get(i)?.angle(dialect);
    let plain = |i: usize| args.get(i)?.plain();

    let matrix = match (name, args.len()) {
        ("matrix", 6) => Matrix([plain(0)?, plain(1)?, plain(2)?, plain(3)?, length(4)?, length(5)?]),
        ("translate", 1) => Matrix::translate(length(0)?, 0.0),
        ("translate", 2) => Matrix::translate(length(0)?, length(1)?),
        ("translatex", 1) if dialect == Dialect::Css => Matrix::translate(length(0)?, 0.0),
        ("translatey", 1) if dialect == Dialect::Css => Matrix::translate(0.0, length(0)?),
        ("scale", 1) => Matrix::scale(plain(0)?, plain(0)?),
        ("scale", 2) => Matrix::scale(plain(0)?, plain(1)?),
        ("scalex", 1) if dialect == Dialect::Css => Matrix::scale(plain(0)?, 1.0),
        ("scaley", 1) if dialect == Dialect::Css => Matrix::scale(1.0, plain(0)?),
        ("rotate", 1) => Matrix::rotate(angle(0)?),
        ("rotate", 3) if dialect == Dialect::Svg => {
            let (cx, cy) = (length(1)?, length(2)?);
            Matrix::translate(cx, cy)
                .then(Matrix::rotate(angle(0)?))
                .then(Matrix::translate(-cx, -cy))
        }
        ("skewx", 1) => Matrix::skew(angle(0)?, 0.0),
        ("skewy", 1) => Matrix::skew(0.0, angle(0)?),
        ("skew", 1) if dialect == Dialect::Css => Matrix::skew(angle(0)?, 0.0),
        ("skew", 2) if dialect == Dialect::Css => Matrix::skew(angle(0)?, angle(1)?),
        _ => return None,
    };
    Some(matrix)
}

#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Number { a: f64, b: f64 },
}

/// The output transform list, with interpolated numbers as holes.
#[derive(Debug, Default)]
struct Pieces(Vec<Piece>);

impl Pieces {
    fn literal(&mut self, text: &str) {
        match self.0.last_mut() {
            Some(Piece::Literal(existing)) => existing.push_str(text),
            _ => self.0.push(Piece::Literal(text.to_string())),
        }
    }

    fn number(&mut self, a: f64, b: f64) {
        self.0.push(Piece::Number { a, b });
    }

    /// Begin another function in the list.
    fn function(&mut self, name: &str) {
        if !self.0.is_empty() {
            self.literal(" ");
        }
        self.literal(name);
        self.literal("(");
    }

    fn translate(&mut self, a: &Transform, b: &Transform, dialect: Dialect) {
        if a.translate_x != b.translate_x || a.translate_y != b.translate_y {
            self.function("translate");
            self.number(a.translate_x, b.translate_x);
            self.literal(dialect.px_comma());
            self.number(a.translate_y, b.translate_y);
            self.literal(dialect.px_paren());
        } else if b.translate_x != 0.0 || b.translate_y != 0.0 {
            self.function("translate");
            self.literal(&format_number(b.translate_x));
            self.literal(dialect.px_comma());
            self.literal(&format_number(b.translate_y));
            self.literal(dialect.px_paren());
        }
    }

    fn rotate(&mut self, a: &Transform, b: &Transform, dialect: Dialect) {
        let (mut from, mut to) = (a.rotate, b.rotate);
        if from != to {
            // Take the shorter way around.
            if from - to > 180.0 {
                to += 360.0;
            } else if to - from > 180.0 {
                from += 360.0;
            }
            self.function("rotate");
            self.number(from, to);
            self.literal(dialect.deg_paren());
        } else if to != 0.0 {
            self.function("rotate");
            self.literal(&format_number(to));
            self.literal(dialect.deg_paren());
        }
    }

    fn skew_x(&mut self, a: &Transform, b: &Transform, dialect: Dialect) {
        if a.skew_x != b.skew_x {
            self.function("skewX");
            self.number(a.skew_x, b.skew_x);
            self.literal(dialect.deg_paren());
        } else if b.skew_x != 0.0 {
            self.function("skewX");
            self.literal(&format_number(b.skew_x));
            self.literal(dialect.deg_paren());
        }
    }

    fn scale(&mut self, a: &Transform, b: &Transform) {
        if a.scale_x != b.scale_x || a.scale_y != b.scale_y {
            self.function("scale");
            self.number(a.scale_x, b.scale_x);
            self.literal(",");
            self.number(a.scale_y, b.scale_y);
            self.literal(")");
        } else if b.scale_x != 1.0 || b.scale_y != 1.0 {
            self.function("scale");
            self.literal(&format_number(b.scale_x));
            self.literal(",");
            self.literal(&format_number(b.scale_y));
            self.literal(")");
        }
    }

    fn into_interpolator(self) -> Interpolator<String> {
        let pieces = self.0;
        Box::new(move |t| {
            let mut out = String::new();
            for piece in &pieces {
                match piece {
                    Piece::Literal(text) => out.push_str(text),
                    Piece::Number { a, b } => out.push_str(&format_number(a + (b - a) * t)),
                }
            }
            out
        })
    }
}

/// Interpolate between two decomposed transforms, writing the result in
/// SVG syntax.
pub fn interpolate_transforms(a: &Transform, b: &Transform) -> Interpolator<String> {
    build(a, b, Dialect::Svg)
}

fn build(a: &Transform, b: &Transform, dialect: Dialect) -> Interpolator<String> {
    let mut pieces = Pieces::default();
    pieces.translate(a, b, dialect);
    pieces.rotate(a, b, dialect);
    pieces.skew_x(a, b, dialect);
    pieces.scale(a, b);
    tracing::trace!(target: crate::LOG_TARGET, ?a, ?b, ?dialect, "transform interpolator");
    pieces.into_interpolator()
}

/// Interpolate between two CSS `transform` values.
///
/// ```
/// use horizon_bind_interpolate::interpolate_transform_css;
///
/// let i = interpolate_transform_css("rotate(0deg)", "rotate(60deg)")?;
/// assert_eq!(i(0.5), "rotate(30deg)");
/// # Ok::<(), horizon_bind_interpolate::InterpolateError>(())
/// ```
pub fn interpolate_transform_css(a: &str, b: &str) -> Result<Interpolator<String>> {
    Ok(build(&Transform::parse_css(a)?, &Transform::parse_css(b)?, Dialect::Css))
}

/// Interpolate between two SVG `transform` attributes.
///
/// ```
/// use horizon_bind_interpolate::interpolate_transform_svg;
///
/// let i = interpolate_transform_svg("translate(10,20)", "translate(30,40) scale(2)")?;
/// assert_eq!(i(0.5), "translate(20, 30) scale(1.5,1.5)");
/// # Ok::<(), horizon_bind_interpolate::InterpolateError>(())
/// ```
pub fn interpolate_transform_svg(a: &str, b: &str) -> Result<Interpolator<String>> {
    Ok(build(&Transform::parse_svg(a)?, &Transform::parse_svg(b)?, Dialect::Svg))
}
