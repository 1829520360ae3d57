//! Core execution engine for a node-based automation platform: typed node
//! graphs, durable step-wise execution, a parameter codec that keeps large
//! binary payloads off the hot path, and a content-addressed object store.
//!
//! Hosts (an HTTP API, a worker pool, an MCP-style agent surface) sit on top
//! of this crate and normalize their own trigger shapes into a single
//! [`workflow::ExecutionRequest`].

pub mod blob;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod nodes;
pub mod store;
pub mod workflow;

/// Fixtures and in-memory store implementations shared by this crate's own
/// tests and by downstream crates' test suites.
pub mod testing;
