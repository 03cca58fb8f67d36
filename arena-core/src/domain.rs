pub mod ids;
pub mod config;
pub mod framework;
pub mod pricing;
pub mod combination;
pub mod record;

pub use ids::*;
pub use config::*;
pub use framework::*;
pub use pricing::*;
pub use combination::*;
pub use record::*;
