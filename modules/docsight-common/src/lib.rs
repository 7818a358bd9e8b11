pub mod config;
pub mod error;
pub mod types;

pub use config::{PipelineConfig, ServiceConfig, ServicePaths};
pub use error::ConfigError;
pub use types::*;
