pub mod app;
pub mod config;
pub mod error;
pub mod validation;

pub use app::{build_router, AppState};
pub use config::ServerConfig;
pub use error::ApiError;
