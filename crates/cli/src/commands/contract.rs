//! Frontend contract reference

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use voucherkit_common::contract::{
    login_redirect, LOGIN_EMAIL_FIELD, LOGIN_PASSWORD_FIELD, LOGIN_PATH, TOKEN_STORAGE_KEY,
    USER_STORAGE_KEY,
};
use voucherkit_common::{CodeKind, CodeStatus, Role, SessionStatus, VoucherCode};

use crate::commands::Context;
use crate::output::{print_json, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ContractArgs {
    /// Validate a voucher code instead of printing the contract
    #[arg(long)]
    pub code: Option<String>,
}

#[derive(Serialize)]
pub struct RoleRoute {
    pub role: Role,
    pub dashboard: String,
}

impl TableDisplay for RoleRoute {
    fn headers() -> Vec<&'static str> {
        vec!["Role", "Dashboard"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.role.to_string(), self.dashboard.clone()]
    }
}

#[derive(Serialize)]
pub struct StatusRule {
    pub status: SessionStatus,
    pub allows_backup: bool,
}

impl TableDisplay for StatusRule {
    fn headers() -> Vec<&'static str> {
        vec!["Session status", "Backup code"]
    }

    fn row(&self) -> Vec<String> {
        let backup = if self.allows_backup { "yes" } else { "no" };
        vec![self.status.to_string(), backup.to_string()]
    }
}

#[derive(Serialize)]
pub struct CodeStatusRule {
    pub status: CodeStatus,
    pub redeemable: bool,
}

impl TableDisplay for CodeStatusRule {
    fn headers() -> Vec<&'static str> {
        vec!["Code status", "Redeemable"]
    }

    fn row(&self) -> Vec<String> {
        let redeemable = if self.redeemable { "yes" } else { "no" };
        vec![self.status.to_string(), redeemable.to_string()]
    }
}

#[derive(Serialize)]
pub struct ContractInfo {
    pub login_path: &'static str,
    pub login_fields: [&'static str; 2],
    pub storage_keys: [&'static str; 2],
    pub unauthenticated_redirect: String,
    pub roles: Vec<RoleRoute>,
    pub session_statuses: Vec<StatusRule>,
    pub code_kinds: Vec<CodeKind>,
    pub code_statuses: Vec<CodeStatusRule>,
}

impl ContractInfo {
    pub fn collect() -> Self {
        Self {
            login_path: LOGIN_PATH,
            login_fields: [LOGIN_EMAIL_FIELD, LOGIN_PASSWORD_FIELD],
            storage_keys: [TOKEN_STORAGE_KEY, USER_STORAGE_KEY],
            unauthenticated_redirect: login_redirect("<path>"),
            roles: Role::ALL
                .into_iter()
                .map(|role| RoleRoute {
                    role,
                    dashboard: role.dashboard_path(),
                })
                .collect(),
            session_statuses: SessionStatus::ALL
                .into_iter()
                .map(|status| StatusRule {
                    status,
                    allows_backup: status.allows_backup(),
                })
                .collect(),
            code_kinds: CodeKind::ALL.to_vec(),
            code_statuses: CodeStatus::ALL
                .into_iter()
                .map(|status| CodeStatusRule {
                    status,
                    redeemable: status.redeemable(),
                })
                .collect(),
        }
    }
}

pub fn execute(args: ContractArgs, ctx: &Context) -> Result<i32> {
    if let Some(raw) = args.code {
        let code = VoucherCode::parse(&raw)?;
        match ctx.format {
            OutputFormat::Json => print_json(&code)?,
            _ => print_success(&format!("{} is a valid voucher code", code.as_str())),
        }
        return Ok(0);
    }

    let info = ContractInfo::collect();
    match ctx.format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Text | OutputFormat::Table => {
            println!("Login: {} (fields: {})", info.login_path, info.login_fields.join(", "));
            println!("Unauthenticated visits: {}", info.unauthenticated_redirect);
            println!("localStorage keys: {}", info.storage_keys.join(", "));
            println!();
            print_list(&info.roles, "No roles.");
            print_list(&info.session_statuses, "No session statuses.");
            let kinds: Vec<&str> = info.code_kinds.iter().map(|k| k.as_str()).collect();
            println!("Voucher code kinds: {}", kinds.join(", "));
            print_list(&info.code_statuses, "No code statuses.");
        }
    }
    Ok(0)
}
