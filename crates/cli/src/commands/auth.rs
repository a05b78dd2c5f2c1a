//! Storage-state fixture command

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use voucherkit_e2e::auth_state::{default_users, write_fixtures};

use crate::commands::Context;
use crate::output::{print_json, print_success, OutputFormat};

#[derive(Args)]
pub struct AuthStateArgs {
    /// Output directory for the fixtures
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Origin the localStorage entries belong to
    #[arg(short, long)]
    pub origin: Option<String>,
}

pub fn execute(args: AuthStateArgs, ctx: &Context) -> Result<i32> {
    let dir = args.dir.unwrap_or_else(|| ctx.config.auth.dir.clone());
    let origin = args.origin.unwrap_or_else(|| ctx.config.auth.origin.clone());

    let written = write_fixtures(&dir, &origin, &default_users())?;

    match ctx.format {
        OutputFormat::Json => print_json(&written)?,
        OutputFormat::Text | OutputFormat::Table => {
            for path in &written {
                println!("  {}", path.display());
            }
            print_success(&format!(
                "Wrote {} storage state file(s) for {}",
                written.len(),
                origin
            ));
        }
    }
    Ok(0)
}
