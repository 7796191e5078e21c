pub mod features;
pub mod scaler;
pub mod split;

pub use features::*;
pub use scaler::*;
pub use split::*;
