// common/src/lib.rs
pub mod aggregate;
pub mod config;
pub mod error;
pub mod feed;
pub mod flatten;
pub mod models;
pub mod orchestrator;

// Re-export commonly used items
pub use aggregate::*;
pub use config::*;
pub use error::*;
pub use feed::*;
pub use flatten::*;
pub use models::*;
pub use orchestrator::*;
