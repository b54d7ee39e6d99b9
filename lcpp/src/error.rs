//! The error taxonomy, rendered in the `"lcpp ERR [NNNN] message"` shape.

use std::fmt;

/// Errors that can occur while compiling a preprocessor input.
#[derive(Debug)]
pub enum PreprocessError {
    /// A file's conditional nesting did not return to zero, or an `#else`/`#endif`
    /// arrived with nothing open.
    UnbalancedConditional { lineno: usize, message: String },
    /// A `#`-prefixed line whose keyword is not recognized.
    UnknownDirective { lineno: usize, message: String },
    /// A malformed `#if`/`#elif`/`defined(...)` expression.
    ExpressionParseError { lineno: usize, message: String },
    /// `#define` of an already-bound identifier without an explicit override.
    RedefinitionError { lineno: usize, message: String },
    /// `#error` fired.
    UserError { lineno: usize, message: String },
    /// The include resolver could not find the requested file.
    IncludeNotFound { lineno: usize, message: String },
    /// Reading a file for `compile_file` failed.
    Io(std::io::Error),
}

impl PreprocessError {
    #[must_use]
    pub fn lineno(&self) -> Option<usize> {
        match self {
            PreprocessError::UnbalancedConditional { lineno, .. }
            | PreprocessError::UnknownDirective { lineno, .. }
            | PreprocessError::ExpressionParseError { lineno, .. }
            | PreprocessError::RedefinitionError { lineno, .. }
            | PreprocessError::UserError { lineno, .. }
            | PreprocessError::IncludeNotFound { lineno, .. } => Some(*lineno),
            PreprocessError::Io(_) => None,
        }
    }
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::UnbalancedConditional { lineno, message } => {
                write!(f, "lcpp ERR [{lineno:04}] unbalanced conditional: {message}")
            }
            PreprocessError::UnknownDirective { lineno, message } => {
                write!(f, "lcpp ERR [{lineno:04}] unknown directive: {message}")
            }
            PreprocessError::ExpressionParseError { lineno, message } => {
                write!(f, "lcpp ERR [{lineno:04}] expression parse error: {message}")
            }
            PreprocessError::RedefinitionError { lineno, message } => {
                write!(f, "lcpp ERR [{lineno:04}] redefinition of {message}")
            }
            PreprocessError::UserError { lineno, message } => {
                write!(f, "lcpp ERR [{lineno:04}] {message}")
            }
            PreprocessError::IncludeNotFound { lineno, message } => {
                write!(f, "lcpp ERR [{lineno:04}] include not found: {message}")
            }
            PreprocessError::Io(err) => write!(f, "lcpp ERR [----] I/O error: {err}"),
        }
    }
}

impl std::error::Error for PreprocessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreprocessError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PreprocessError {
    fn from(err: std::io::Error) -> Self {
        PreprocessError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_documented_shape() {
        let err = PreprocessError::UnknownDirective {
            lineno: 42,
            message: "#foo".to_string(),
        };
        assert_eq!(err.to_string(), "lcpp ERR [0042] unknown directive: #foo");
    }
}
