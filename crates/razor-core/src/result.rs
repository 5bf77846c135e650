//! Result type alias for Razor front-end operations

use crate::error::RazorError;

/// Standard Result type for Razor front-end operations
pub type Result<T> = std::result::Result<T, RazorError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Convert an error to `Ok(None)` when it is recoverable
    fn recoverable(self) -> Result<Option<T>>;

    /// Log the error and continue with None
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Recoverable error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn log_and_continue(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                if err.is_recoverable() {
                    tracing::warn!("Continuing after error: {}", err);
                } else {
                    tracing::error!("Fatal error: {}", err);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_swallows_config_errors() {
        let result: Result<u32> = Err(RazorError::config_error("missing"));
        assert!(matches!(result.recoverable(), Ok(None)));
    }

    #[test]
    fn test_recoverable_keeps_internal_errors() {
        let result: Result<u32> = Err(RazorError::internal_error("bad state"));
        assert!(result.recoverable().is_err());
    }

    #[test]
    fn test_log_and_continue() {
        let ok: Result<u32> = Ok(3);
        assert_eq!(ok.log_and_continue(), Some(3));
        let err: Result<u32> = Err(RazorError::descriptor_error("x"));
        assert_eq!(err.log_and_continue(), None);
    }
}
