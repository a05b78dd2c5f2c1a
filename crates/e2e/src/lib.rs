//! voucherkit suite runner
//!
//! Runs browser E2E spec files one at a time through an external runner and
//! summarises the results:
//! - Discovers spec/feature files, or takes a fixed list
//! - Spawns Cypress/Playwright per file with its JSON reporter
//! - Parses mocha and Playwright JSON reports
//! - Makes sure the app under test is reachable, starting it if configured
//! - Writes Playwright storage-state fixtures for logged-in suites
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SuiteRunner (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suite::discover / from_list -> [SuiteEntry]                │
//! │  AppServer::ensure(app)      -> reused | spawned            │
//! │  for each entry:                                            │
//! │    npx cypress run --spec <entry> --reporter json           │
//! │    stdout -> parse_report() -> SpecOutcome                  │
//! │  SuiteSummary -> text | json | suite-summary.json           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod auth_state;
pub mod error;
mod process;
pub mod report;
pub mod runner;
pub mod server;
pub mod suite;
pub mod summary;

pub use error::{E2eError, E2eResult};
pub use runner::{RunnerCommand, SpecOutcome, SpecResult, SuiteRunner};
pub use suite::{Suite, SuiteEntry};
pub use summary::SuiteSummary;
