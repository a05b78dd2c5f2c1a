//! voucherkit Common Library
//!
//! Shared error type, configuration and the app contract used by the
//! voucherkit crates.

pub mod config;
pub mod contract;
pub mod error;

// Re-export commonly used types
pub use config::{RunnerKind, VoucherkitConfig, DEFAULT_CONFIG_FILE};
pub use contract::{CodeKind, CodeStatus, Role, SessionStatus, VoucherCode};
pub use error::{Error, Result};

/// voucherkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
