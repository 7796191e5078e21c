use std::fmt;

use thiserror::Error;

/// Error type shared by every classifier, the evaluator and the tensor engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid axis: {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("Label count mismatch: {rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("Label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("Row {row} is missing the constant 1.0 bias column")]
    MissingBiasColumn { row: usize },

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate statistics for class {class}: {reason}")]
    DegenerateStatistics { class: usize, reason: String },

    #[error("Singular matrix: cannot factorize")]
    SingularMatrix,

    #[error("Numeric instability: {0}")]
    NumericInstability(String),
}

impl ClassifyError {
    /// True for the fail-fast input validation family.
    pub fn is_input_shape(&self) -> bool {
        matches!(
            self,
            ClassifyError::ShapeMismatch { .. }
                | ClassifyError::IndexOutOfBounds { .. }
                | ClassifyError::InvalidAxis { .. }
                | ClassifyError::LabelCountMismatch { .. }
                | ClassifyError::LabelOutOfRange { .. }
                | ClassifyError::MissingBiasColumn { .. }
                | ClassifyError::EmptyInput(_)
        )
    }
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Non-fatal diagnostic: an iterative trainer used its whole budget without
/// the tracked quantity settling below the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ConvergenceWarning {
    /// Class the warning refers to, when training is per class.
    pub class: Option<usize>,
    pub iterations: usize,
    pub last_change: f64,
    pub tolerance: f64,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(c) = self.class {
            write!(f, "class {}: ", c)?;
        }
        write!(
            f,
            "did not converge after {} iterations (last change {:.3e} > tolerance {:.3e})",
            self.iterations, self.last_change, self.tolerance
        )
    }
}
