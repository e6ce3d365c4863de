//! Submission module - the declaration's lifecycle from filing to archive.
//!
//! - `models` - request/response and stored types
//! - `number` - document numbers
//! - `state` - allowed status transitions
//! - `repository` - persistence seam
//! - `service` - workflow operations
//! - `handlers` - HTTP endpoints

pub mod handlers;
pub mod models;
pub mod number;
pub mod repository;
pub mod service;
pub mod state;

pub use service::{SubmissionError, SubmissionService};
