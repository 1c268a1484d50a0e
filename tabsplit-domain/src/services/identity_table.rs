use crate::model::{Debt, Money, NetPosition};
use indexmap::IndexMap;

struct IdentityEntry {
    display: String,
    net: Money,
}

/// Net balances keyed by case-insensitive identity.
///
/// Iteration follows first appearance, and the display string is the casing
/// seen first. Both properties feed the simplifier's tie-break.
#[derive(Default)]
pub struct IdentityTable {
    entries: IndexMap<String, IdentityEntry>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_debts(debts: &[Debt]) -> Self {
        let mut table = Self::new();
        for debt in debts {
            table.record(debt);
        }
        table
    }

    /// Applies `net[debtor] -= amount; net[creditor] += amount`.
    ///
    /// Self-debts cancel out and negative amounts act as reversed debts
    /// without any special casing. Nets saturate at the decimal bounds.
    pub fn record(&mut self, debt: &Debt) {
        self.adjust(&debt.debtor, -debt.amount);
        self.adjust(&debt.creditor, debt.amount);
    }

    fn adjust(&mut self, identity: &str, delta: Money) {
        let net = self.net_mut(identity);
        let current = *net;
        *net = current.checked_add(delta).unwrap_or_else(|| {
            tracing::warn!(
                identity,
                net = %current,
                delta = %delta,
                "Net balance overflowed; saturating"
            );
            current.saturating_add(delta)
        });
    }

    fn net_mut(&mut self, identity: &str) -> &mut Money {
        &mut self
            .entries
            .entry(normalize_identity(identity))
            .or_insert_with(|| IdentityEntry {
                display: identity.to_owned(),
                net: Money::ZERO,
            })
            .net
    }

    pub fn net_of(&self, identity: &str) -> Option<Money> {
        self.entries
            .get(&normalize_identity(identity))
            .map(|entry| entry.net)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = NetPosition> + '_ {
        self.entries.values().map(|entry| NetPosition {
            identity: entry.display.clone(),
            net: entry.net,
        })
    }

    pub fn into_positions(self) -> Vec<NetPosition> {
        self.entries
            .into_values()
            .map(|entry| NetPosition {
                identity: entry.display,
                net: entry.net,
            })
            .collect()
    }
}

/// Case folding shared by every identity and email comparison.
pub fn normalize_identity(identity: &str) -> String {
    identity.to_lowercase()
}
