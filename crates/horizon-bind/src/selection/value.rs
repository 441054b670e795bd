//! Values accepted by the string-valued mutators.

use horizon_bind_interpolate::format_number;

/// A textual value for `attr`, `style` and `text`, or `None` to remove.
///
/// Numbers and booleans are converted to their textual form, so
/// `attr("checked", true)` stores `"true"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttrValue(Option<String>);

impl AttrValue {
    /// A value that removes the attribute or style.
    pub const fn none() -> Self {
        Self(None)
    }

    /// The text to store, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Consume the value, returning the text to store.
    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self(Some(value.clone()))
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self(Some(format_number(value)))
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        Self(Some(format_number(f64::from(value))))
    }
}

macro_rules! attr_value_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    Self(Some(value.to_string()))
                }
            }
        )*
    };
}

attr_value_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self(None), Into::into)
    }
}

/// Priority of an inline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    /// `!important`
    Important,
}

impl Priority {
    pub(crate) fn is_important(self) -> bool {
        self == Priority::Important
    }
}
