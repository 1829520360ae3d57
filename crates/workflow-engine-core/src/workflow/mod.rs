//! # Workflow Orchestration
//!
//! Ties the data model, validator, and executor together. A [`crate::model::Workflow`]
//! is a plain value; this module is where it gets checked and run.

pub mod executor;
pub mod validator;

pub use executor::{Executor, ExecutionRequest};
pub use validator::{validate, Issue};
