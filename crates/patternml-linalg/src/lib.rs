pub mod cholesky;

pub use cholesky::*;
