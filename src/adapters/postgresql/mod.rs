//! PostgreSQL source integration
//!
//! Reads changed film works, genres and persons from the content schema.

pub mod adapter;
pub mod client;
pub mod models;
pub mod queries;

pub use adapter::PostgreSQLAdapter;
pub use client::{redact_connection_string, PostgreSQLClient};
