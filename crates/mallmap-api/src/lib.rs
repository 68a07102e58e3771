//! Typed HTTP client for the mall/brand directory backend.
//!
//! Wraps `reqwest` with directory-specific error handling, bearer-token
//! auth, and typed response deserialization. Every response arrives in a
//! `{ success, message, data }` envelope; application-level failures are
//! surfaced as [`DirectoryError::Api`]. Transient transport failures are
//! retried with exponential back-off.

pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::{DirectoryClient, StoreListQuery, TreeQuery};
pub use error::DirectoryError;
pub use types::{BrandStore, PageInfo, Paginated};
