//! Dynamically typed values and the generic interpolator.

use std::collections::BTreeMap;
use std::fmt;

use crate::color::Rgb;
use crate::number::{format_number, interpolate_number};
use crate::rgb::interpolate_rgb;
use crate::string::interpolate_string;
use crate::{Interpolator, LOG_TARGET};

/// A dynamically typed endpoint for [`interpolate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Color(Rgb),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Numeric coercion: booleans are 0/1, null is 0, strings are parsed
    /// (blank is 0), everything else is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Color(_) | Value::List(_) | Value::Map(_) => f64::NAN,
        }
    }

    /// Return the number if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the string if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn to_color(&self) -> Rgb {
        let undefined = Rgb::new(f64::NAN, f64::NAN, f64::NAN).with_opacity(f64::NAN);
        match self {
            Value::Color(c) => *c,
            Value::Str(s) => Rgb::parse(s).unwrap_or(undefined),
            _ => undefined,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Color(c) => write!(f, "{}", c),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Map(_) => write!(f, "[object Object]"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Rgb> for Value {
    fn from(c: Rgb) -> Self {
        Value::Color(c)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Pick an interpolator from the type of `b`:
///
/// - null or boolean: constant `b`
/// - number: numeric, with `a` coerced to a number
/// - string: RGB if `b` parses as a color, otherwise string interpolation
/// - color: RGB
/// - list: [`interpolate_array`]
/// - map: [`interpolate_object`]
///
/// ```
/// use horizon_bind_interpolate::{Value, interpolate};
///
/// let i = interpolate(Value::from("1"), Value::from(5.0));
/// assert_eq!(i(0.5), Value::Number(3.0));
///
/// let i = interpolate(Value::from(1.0), Value::from("5"));
/// assert_eq!(i(0.5), Value::from("3"));
/// ```
pub fn interpolate(a: Value, b: Value) -> Interpolator<Value> {
    match b {
        Value::Null | Value::Bool(_) => Box::new(move |_| b.clone()),
        Value::Number(end) => {
            let i = interpolate_number(a.to_number(), end);
            Box::new(move |t| Value::Number(i(t)))
        }
        Value::Str(ref end) => match Rgb::parse(end) {
            Ok(color) => {
                tracing::trace!(target: LOG_TARGET, end = %end, "interpolating string as color");
                let i = interpolate_rgb(a.to_color(), color);
                Box::new(move |t| Value::Str(i(t)))
            }
            Err(_) => {
                let i = interpolate_string(&a.to_string(), end);
                Box::new(move |t| Value::Str(i(t)))
            }
        },
        Value::Color(color) => {
            let i = interpolate_rgb(a.to_color(), color);
            Box::new(move |t| Value::Str(i(t)))
        }
        Value::List(items) => {
            let i = interpolate_array(a, items);
            Box::new(move |t| Value::List(i(t)))
        }
        Value::Map(map) => {
            let i = interpolate_object(a, map);
            Box::new(move |t| Value::Map(i(t)))
        }
    }
}

/// Interpolate element-wise. The result has `b`'s length: the first
/// `min(a.len(), b.len())` entries are interpolated and the rest are
/// copied from `b`. A non-list `a` counts as empty.
pub fn interpolate_array(a: Value, b: Vec<Value>) -> Interpolator<Vec<Value>> {
    let a_items = match a {
        Value::List(items) => items,
        _ => Vec::new(),
    };
    let shared = a_items.len().min(b.len());
    let interpolators: Vec<Interpolator<Value>> = a_items
        .into_iter()
        .zip(b.iter().cloned())
        .map(|(x, y)| interpolate(x, y))
        .collect();
    let tail: Vec<Value> = b[shared..].to_vec();

    Box::new(move |t| {
        let mut out: Vec<Value> = interpolators.iter().map(|i| i(t)).collect();
        out.extend(tail.iter().cloned());
        out
    })
}

/// Interpolate property-wise. Keys come from `b`: keys also present in `a`
/// are interpolated, keys only in `b` are copied. A non-map `a` counts as
/// empty.
pub fn interpolate_object(
    a: Value,
    b: BTreeMap<String, Value>,
) -> Interpolator<BTreeMap<String, Value>> {
    let mut a_map = match a {
        Value::Map(map) => map,
        _ => BTreeMap::new(),
    };
    let mut interpolated: Vec<(String, Interpolator<Value>)> = Vec::new();
    let mut copied: BTreeMap<String, Value> = BTreeMap::new();
    for (key, end) in b {
        match a_map.remove(&key) {
            Some(start) => interpolated.push((key, interpolate(start, end))),
            None => {
                copied.insert(key, end);
            }
        }
    }

    Box::new(move |t| {
        let mut out = copied.clone();
        for (key, i) in &interpolated {
            out.insert(key.clone(), i(t));
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), Value::Number(*v)))
                .collect(),
        )
    }

    #[test]
    fn test_constant_for_null_and_bool() {
        let i = interpolate(Value::from(1.0), Value::Bool(true));
        assert_eq!(i(0.3), Value::Bool(true));
        let i = interpolate(Value::from(1.0), Value::Null);
        assert_eq!(i(0.3), Value::Null);
    }

    #[test]
    fn test_color_strings() {
        let i = interpolate(Value::from("seagreen"), Value::from("steelblue"));
        assert_eq!(i(1.0), Value::from("rgb(70, 130, 180)"));

        let i = interpolate(Value::from("seagreen"), Value::Color(Rgb::new(100.0, 100.0, 100.0)));
        assert_eq!(i(0.0), Value::from("rgb(46, 139, 87)"));
    }

    #[test]
    fn test_arrays() {
        let i = interpolate(Value::from(vec!["1", "2"]), Value::from(vec![4.0, 8.0]));
        assert_eq!(i(0.5), Value::from(vec![2.5, 5.0]));

        let i = interpolate(Value::from(vec!["1", "2"]), Value::from(vec!["4", "8"]));
        assert_eq!(i(0.5), Value::from(vec!["2.5", "5"]));

        // Extra end entries are copied; extra start entries are dropped.
        let i = interpolate_array(Value::from(vec![0.0]), vec![Value::from(10.0), Value::from("x")]);
        assert_eq!(i(0.5), vec![Value::from(5.0), Value::from("x")]);
        let i = interpolate_array(Value::from(vec![0.0, 1.0, 2.0]), vec![Value::from(10.0)]);
        assert_eq!(i(0.5).len(), 1);
    }

    #[test]
    fn test_objects() {
        let i = interpolate(map(&[("x", 0.0), ("y", 1.0)]), map(&[("x", 1.0), ("y", 10.0), ("z", 100.0)]));
        assert_eq!(i(0.5), map(&[("x", 0.5), ("y", 5.5), ("z", 100.0)]));
    }

    #[test]
    fn test_coercion() {
        assert_eq!(Value::from(" 2 ").to_number(), 2.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::from(vec![1.0, 2.5]).to_string(), "1,2.5");
    }
}
