/// Recoverable failures of the curve engine.
///
/// None of these are fatal inside the interactive loop: the point store keeps
/// publishing its last good snapshot and surfaces the error as status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// A pivot was exactly zero during elimination, or two points share an x-value.
    #[error("singular system: zero pivot at row {row} (duplicate x-values?)")]
    SingularMatrix { row: usize },

    #[error("need at least 2 control points to fit a curve, found {found}")]
    InsufficientPoints { found: usize },

    #[error("control point index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid point list '{input}': {reason}")]
    Parse { input: String, reason: String },
}

impl CurveError {
    /// True for the conditions that leave the last good curve in place.
    pub fn is_fit_failure(&self) -> bool {
        matches!(
            self,
            CurveError::SingularMatrix { .. } | CurveError::InsufficientPoints { .. }
        )
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

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        let exit_code = match err {
            CurveError::Parse { .. } | CurveError::IndexOutOfRange { .. } => 2,
            CurveError::SingularMatrix { .. } | CurveError::InsufficientPoints { .. } => 3,
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
    fn curve_errors_map_to_exit_codes() {
        let singular: AppError = CurveError::SingularMatrix { row: 1 }.into();
        assert_eq!(singular.exit_code(), 3);

        let parse: AppError = CurveError::Parse {
            input: "1".to_string(),
            reason: "missing y".to_string(),
        }
        .into();
        assert_eq!(parse.exit_code(), 2);
        assert!(parse.to_string().contains("missing y"));
    }

    #[test]
    fn only_fit_conditions_are_fit_failures() {
        assert!(CurveError::InsufficientPoints { found: 1 }.is_fit_failure());
        assert!(!CurveError::IndexOutOfRange { index: 3, len: 2 }.is_fit_failure());
    }
}
