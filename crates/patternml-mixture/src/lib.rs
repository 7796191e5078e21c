pub mod classifier;
pub mod em;
pub mod init;
pub mod stats;

pub use classifier::*;
pub use em::{em_step, fit_class_mixture, init_mixture, ClassFit, ClassMixture, Component, EmParams};
pub use init::{KMeansInit, Partition};
pub use stats::SufficientStats;
