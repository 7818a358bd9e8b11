pub mod config;
pub mod providers;
pub mod routes;

pub use config::FunctionsConfig;
pub use routes::{build_router, AppState};
