#![warn(clippy::uninlined_format_args)]

pub mod ledger_presenter;
pub mod text_table;

pub use ledger_presenter::{EmptyDirectory, LedgerPresenter, directory_from_bills};
pub use text_table::{Alignment, TextTableBuilder};
