// Core modules
pub mod config;
pub mod execution;
pub mod gateway;
pub mod indicators;
pub mod models;
pub mod strategy;
pub mod telemetry;

// Re-export commonly used types
pub use models::*;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
