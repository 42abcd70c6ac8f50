//! # Storage Module
//!
//! Storage abstraction for the project tracker. The domain layer only sees
//! the traits in [`traits`]; the in-memory implementation in [`memory`] is
//! the collaborator used by the REST surface and by tests. Durable
//! persistence lives behind the same seam and is out of scope here.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{PaymentStorage, ProjectStorage, TaskStorage};

use thiserror::Error;

/// Typed storage failure, mapped onto HTTP status codes by the REST layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
}
