//! Shutdown Manager - tracks applications slated for decommission
//!
//! Applications own the servers that host them; both are created one at a
//! time over JSON or in bulk from CSV, and every write is committed
//! atomically against a relational store.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod import;
pub mod infrastructure;
pub mod service;

pub use error::{Error, Result};
pub use service::App;
