//! # patternml
//!
//! Supervised classifiers for small tabular problems (Iris species,
//! vowel formants), trained once and evaluated with a confusion matrix.
//!
//! ## Modules
//!
//! - **core**: `Tensor`, `Dataset`, `ProblemConfig`, errors, `Classifier`/`Predictor`
//! - **linalg**: Cholesky factorization for full-covariance densities
//! - **linear**: Linear discriminant trained by batch gradient descent on sigmoid MSE
//! - **gaussian**: One multivariate Gaussian per class (full or diagonal covariance)
//! - **mixture**: Diagonal Gaussian mixture per class, fit by EM
//! - **metrics**: Confusion matrix, error rate, precision, recall
//! - **preprocessing**: Normalization, per-class split, feature removal, bias column
//! - **model**: `TrainedModel` over the three model kinds and `evaluate`

pub mod model;

pub use model::{evaluate, Evaluation, TrainedModel};

/// Tensors, datasets, configuration and errors.
pub use patternml_core as core;

/// Linear algebra operations.
pub use patternml_linalg as linalg;

/// Gradient-descent linear classifier.
pub use patternml_linear as linear;

/// Single-Gaussian classifier and density primitives.
pub use patternml_gaussian as gaussian;

/// Gaussian mixture classifier.
pub use patternml_mixture as mixture;

/// Evaluation metrics.
pub use patternml_metrics as metrics;

/// Data preparation.
pub use patternml_preprocessing as preprocessing;
