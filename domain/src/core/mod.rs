//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: the hosted model a conversation is sent to
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
