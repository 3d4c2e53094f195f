//! Copper CRM records, the MCP envelope, and the transformers between them.
//!
//! Transformation is pure and synchronous; nothing in this crate performs I/O
//! apart from reading configuration from the environment.

pub mod config;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod models;
pub mod transform;
pub mod validate;

pub use config::{Config, CopperConfig, Credentials};
pub use entity::*;
pub use envelope::*;
pub use error::*;
pub use transform::{from_mcp, from_mcp_as, to_mcp, WriteMode};
pub use validate::Validate;
