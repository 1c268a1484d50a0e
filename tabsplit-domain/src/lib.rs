#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    BalanceDirection, BalanceSummary, Bill, BillEditError, BillItem, CURRENCY_SCALE, Debt,
    DebtSimplification, Money, NetPosition, Participant, PersonBalance, SimplifiedPayment,
};
pub use services::{
    BalanceAggregator, DebtSimplifier, EmailMatch, IdentityTable, ShareCalculator,
    calculate_net_balance, calculate_participant_share, simplify_debts,
};
