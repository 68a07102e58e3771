//! Pure domain logic for the mallmap directory console.
//!
//! Holds the geographic region model, the tri-level cascade selection and its
//! invariants, the brand-distribution tree builder, the list filter, and the
//! application configuration. No I/O happens in this crate; the HTTP client
//! lives in `mallmap-api` and the console driver in `mallmap-cli`.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod filter;
pub mod regions;
pub mod tree;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{filter_items, FilterState, FilterTarget};
pub use regions::{Region, Selection};
pub use tree::{build_tree, NodeKey, TreeNode};

/// Errors raised while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
