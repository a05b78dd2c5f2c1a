//! CLI Commands

pub mod auth;
pub mod contract;
pub mod run;
pub mod steps;

use voucherkit_common::VoucherkitConfig;

use crate::output::OutputFormat;

/// Loaded configuration and global flags shared by every command
pub struct Context {
    pub config: VoucherkitConfig,
    pub format: OutputFormat,
}
