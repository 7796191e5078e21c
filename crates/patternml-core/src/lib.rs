pub mod config;
pub mod dataset;
pub mod dtype;
pub mod error;
pub mod shape;
pub mod tensor;
pub mod traits;

pub use config::ProblemConfig;
pub use dataset::Dataset;
pub use dtype::Float;
pub use error::{ClassifyError, ClassifyResult, ConvergenceWarning};
pub use shape::Shape;
pub use tensor::Tensor;
pub use traits::{argmax, Classifier, Predictor};
