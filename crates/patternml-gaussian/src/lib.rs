pub mod density;
pub mod moments;
pub mod single;

pub use density::{log_density_diag, log_density_full, log_sum_exp};
pub use moments::mean_and_covariance;
pub use single::*;
