//! Infrastructure layer: I/O implementations and DI container
//!
//! Real renderer, log and process runner behind the boundary traits.

pub mod di;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
