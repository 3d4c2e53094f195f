//! Authenticated HTTP access to the Copper developer API.
//!
//! [`CopperClient`] owns the connection pool, auth headers and retry policy.
//! Callers that only need CRUD over entity kinds should depend on the
//! [`CrmBackend`] trait so an in-memory backend can stand in during tests.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::{CrmBackend, Page};
pub use client::CopperClient;
pub use error::ApiError;
