//! Error types.
//!
//! - `LstsqError`: failures raised by the numeric core (`crate::math`).
//! - `AppError`: what the `lstsq` binary reports (message + process exit code).

use thiserror::Error;

/// Result alias for the numeric core.
pub type Result<T> = std::result::Result<T, LstsqError>;

/// Failures of the factorization / least-squares core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LstsqError {
    /// Operand shapes are inconsistent for the requested operation.
    #[error("Dimension mismatch in {op}: expected {expected}, got {got}")]
    DimensionMismatch {
        op: &'static str,
        expected: String,
        got: String,
    },

    /// The triangular factor has a (numerically) zero pivot.
    #[error("Singular system: zero pivot at diagonal index {index}")]
    SingularSystem { index: usize },

    /// The sketch has fewer rows than the problem has unknowns.
    #[error("Invalid sketch size {sketch}: must be at least the column count {cols}")]
    InvalidSketchSize { sketch: usize, cols: usize },
}

impl LstsqError {
    pub(crate) fn dims(
        op: &'static str,
        expected: impl std::fmt::Display,
        got: impl std::fmt::Display,
    ) -> Self {
        Self::DimensionMismatch {
            op,
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<LstsqError> for AppError {
    fn from(err: LstsqError) -> Self {
        let exit_code = match err {
            LstsqError::DimensionMismatch { .. } | LstsqError::InvalidSketchSize { .. } => 2,
            LstsqError::SingularSystem { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let app: AppError = LstsqError::SingularSystem { index: 3 }.into();
        assert_eq!(app.exit_code(), 4);
        assert!(app.to_string().contains("index 3"));

        let app: AppError = LstsqError::InvalidSketchSize { sketch: 5, cols: 10 }.into();
        assert_eq!(app.exit_code(), 2);
    }
}
