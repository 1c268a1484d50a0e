use serde::{Deserialize, Serialize};
use tabsplit_domain::{BalanceSummary, Bill, Debt, DebtSimplification};

/// The identity whose point of view balances are computed from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub identity: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Already-fetched ledger data handed over by the persistence layer.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub viewer: Option<Viewer>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    /// Explicit debts, e.g. for a multi-payer group event. When empty, debts
    /// are derived from the unpaid shares on `bills`.
    #[serde(default)]
    pub debts: Vec<Debt>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtSource {
    Supplied,
    DerivedFromBills,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    pub viewer: Viewer,
    pub summary: BalanceSummary,
    pub debt_source: DebtSource,
    pub settlement: DebtSimplification,
}
