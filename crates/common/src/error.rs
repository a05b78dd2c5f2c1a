//! Error types for voucherkit

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using voucherkit Error
pub type Result<T> = std::result::Result<T, Error>;

/// voucherkit error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("File is not valid UTF-8: {}", .0.display())]
    NotUtf8(PathBuf),

    #[error("Invalid voucher code '{code}': {reason}")]
    InvalidVoucherCode { code: String, reason: String },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
