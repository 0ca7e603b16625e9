//! Infrastructure layer for the shutdown manager
//!
//! This module contains the implementations for external concerns like
//! the database connection and the relational store built on it.

pub mod database;
pub mod store;

pub use database::*;
pub use store::{InventoryStore, SqliteStore};
