pub mod balance_aggregator;
pub mod debt_simplifier;
pub mod identity_table;
pub mod share_calculator;

pub use balance_aggregator::{BalanceAggregator, EmailMatch, calculate_net_balance};
pub use debt_simplifier::{DebtSimplifier, simplify_debts};
pub use identity_table::IdentityTable;
pub use share_calculator::{ShareCalculator, calculate_participant_share};
