#![warn(clippy::uninlined_format_args)]

pub mod config;
pub mod debt_derivation;
pub mod error;
pub mod ledger_processor;
pub mod model;
pub mod ports;

pub use config::LedgerConfig;
pub use debt_derivation::{debts_from_bills, participant_identity};
pub use error::{ConfigError, LedgerError};
pub use ledger_processor::LedgerProcessor;
pub use model::{DebtSource, LedgerReport, LedgerSnapshot, Viewer};
pub use ports::IdentityDirectory;
