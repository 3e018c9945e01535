// Public modules
pub mod cleanup;
pub mod config;
pub mod error;
pub mod github;
pub mod labels;
pub mod platform;
pub mod stale;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
