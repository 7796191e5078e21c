pub mod gradient_descent;
pub mod sigmoid;

pub use gradient_descent::*;
pub use sigmoid::sigmoid;
