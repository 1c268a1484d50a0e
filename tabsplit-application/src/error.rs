use tabsplit_domain::BillEditError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be one of {expected} (found '{found}')")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    BillEdit(#[from] BillEditError),
    #[error("bill '{0}' not found in snapshot")]
    UnknownBill(String),
    #[error("no viewer identity given; pass one or include `viewer` in the snapshot")]
    MissingViewer,
}
