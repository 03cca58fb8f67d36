pub mod aggregators;
pub mod highlights;
pub mod statistics;

pub use aggregators::*;
pub use highlights::*;
pub use statistics::*;
