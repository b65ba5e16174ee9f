pub mod analysis;
pub mod config;
pub mod report;
pub mod statement;

pub use analysis::*;
pub use config::{Config, DiscrepancyConfig, VisionConfig, VisionEndpoint};
pub use report::*;
pub use statement::*;
