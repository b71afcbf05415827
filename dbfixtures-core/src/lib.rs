//! Embeddable core library for dbfixtures.
//!
//! Provides a clap-free entry point for capturing fixtures from a live server
//! and resolving which (flavour, version) a server belongs to.
//!
//! # Port traits
//!
//! The live database is abstracted behind [`ServerConnection`](ports::ServerConnection).
//! The [`adapters`] module provides a `mongosh`-backed implementation and an
//! in-memory one for embedding and tests.
//!
//! # Entry points
//!
//! - [`resolve`](resolver::resolve): derive the [`ServerIdentity`] of a connection
//! - [`run_collect`](pipeline::run_collect): run every configured command and store the replies

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod resolver;
pub mod settings;

// Re-export storage and identity types so embedders don't need the leaf crates directly.
pub use dbfixtures_store::{FixtureStore, StoreError};
pub use dbfixtures_types::{CollectSummary, FixtureKey, Flavour, ServerIdentity, Version};
