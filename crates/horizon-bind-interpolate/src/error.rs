//! Error types for interpolation inputs.

/// Result type alias for interpolation operations.
pub type Result<T> = std::result::Result<T, InterpolateError>;

/// Errors that can occur while preparing an interpolator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpolateError {
    /// A string could not be parsed as a color.
    #[error("Invalid color '{input}': {message}")]
    InvalidColor { input: String, message: String },

    /// A string could not be parsed as a transform list.
    #[error("Invalid transform '{input}': {message}")]
    InvalidTransform { input: String, message: String },
}

impl InterpolateError {
    /// Create a color error.
    pub fn invalid_color(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidColor {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a transform error.
    pub fn invalid_transform(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTransform {
            input: input.into(),
            message: message.into(),
        }
    }
}
