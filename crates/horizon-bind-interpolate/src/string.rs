//! String interpolation over embedded numbers.
//!
//! Numbers embedded in the end string are paired, in order, with the numbers
//! embedded in the start string. Paired numbers that differ are
//! interpolated; every other character comes from the end string.

use std::sync::LazyLock;

use regex::Regex;

use crate::Interpolator;
use crate::number::format_number;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:[0-9]+\.?[0-9]*|\.?[0-9]+)(?:[eE][-+]?[0-9]+)?").expect("number pattern is valid")
});

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Number { a: f64, b: f64 },
}

/// Interpolate the numbers embedded in two strings.
///
/// ```
/// use horizon_bind_interpolate::interpolate_string;
///
/// let i = interpolate_string("300 12px sans-serif", "500 36px Comic-Sans");
/// assert_eq!(i(0.5), "400 24px Comic-Sans");
/// ```
pub fn interpolate_string(a: &str, b: &str) -> Interpolator<String> {
    let a_numbers = find_numbers(a);
    let b_numbers = find_numbers(b);

    let mut segments: Vec<Segment> = Vec::new();

    let mut b_index = 0;
    for (&(a_start, a_end), &(b_start, b_end)) in a_numbers.iter().zip(&b_numbers) {
        push_literal(&mut segments, &b[b_index..b_start]);
        let a_text = &a[a_start..a_end];
        let b_text = &b[b_start..b_end];
        if a_text == b_text {
            push_literal(&mut segments, b_text);
        } else {
            segments.push(Segment::Number {
                a: parse_number(a_text),
                b: parse_number(b_text),
            });
        }
        b_index = b_end;
    }
    push_literal(&mut segments, &b[b_index..]);

    let interpolated = segments
        .iter()
        .filter(|s| matches!(s, Segment::Number { .. }))
        .count();
    if interpolated == 0 {
        let constant = b.to_string();
        return Box::new(move |_| constant.clone());
    }

    Box::new(move |t| {
        let mut out = String::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Number { a, b } => out.push_str(&format_number(a + (b - a) * t)),
            }
        }
        out
    })
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(Segment::Literal(existing)) => existing.push_str(text),
        _ => segments.push(Segment::Literal(text.to_string())),
    }
}

fn parse_number(text: &str) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

/// Byte ranges of the numbers embedded in `s`, left to right.
///
/// A number is an optional sign, digits with an optional fraction (or a
/// bare fraction such as `.5`), and an optional exponent.
pub(crate) fn find_numbers(s: &str) -> Vec<(usize, usize)> {
    NUMBER.find_iter(s).map(|m| (m.start(), m.end())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_numbers() {
        let s = "M-1.5,2e3L.25 x+4";
        let found: Vec<&str> = find_numbers(s).into_iter().map(|(a, b)| &s[a..b]).collect();
        assert_eq!(found, ["-1.5", "2e3", ".25", "+4"]);
    }

    #[test]
    fn test_interpolates_signed_numbers() {
        let i = interpolate_string("-1", "2");
        assert_eq!(i(0.0), "-1");
        assert_eq!(i(0.5), "0.5");
        assert_eq!(i(1.0), "2");
    }

    #[test]
    fn test_extra_end_numbers_are_literal() {
        let i = interpolate_string("1", "3 7");
        assert_eq!(i(0.5), "2 7");
    }

    #[test]
    fn test_equal_numbers_are_kept_verbatim() {
        let i = interpolate_string("translate(1.0,2)", "translate(1.0,4)");
        assert_eq!(i(0.5), "translate(1.0,3)");
    }

    #[test]
    fn test_no_numbers_returns_end() {
        let i = interpolate_string("foo", "bar");
        assert_eq!(i(0.0), "bar");
        assert_eq!(i(0.7), "bar");
    }
}
