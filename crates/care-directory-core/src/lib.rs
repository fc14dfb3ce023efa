//! # Care Directory Core
//!
//! Shared, runtime-free logic for Care Directory: data models, validation,
//! the error taxonomy, the service-type catalog, the facility query engine,
//! the chat suggestion scan, and the store abstraction.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. The
//! application crate wires it to configuration, seed data, and the server.

pub mod catalog;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod suggest;

pub use error::{DirectoryError, Result};
