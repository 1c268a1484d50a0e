use crate::{
    model::{Debt, DebtSimplification, Money, NetPosition, SimplifiedPayment},
    services::IdentityTable,
};

/// Collapses pairwise debts into net settlement payments.
///
/// Greedy largest-debtor / largest-creditor matching. This is a heuristic,
/// not an exact minimum-transaction solver, but for `k` unsettled identities
/// in a balanced set it emits at most `k - 1` payments.
pub struct DebtSimplifier;

impl DebtSimplifier {
    pub fn simplify(&self, debts: &[Debt]) -> DebtSimplification {
        let table = IdentityTable::from_debts(debts);
        let identity_count = table.len();
        let mut positions: Vec<NetPosition> = table
            .into_positions()
            .into_iter()
            .filter(|position| !position.net.is_settled())
            .collect();

        tracing::debug!(
            debt_count = debts.len(),
            identity_count,
            unsettled_count = positions.len(),
            "Netted debts before greedy matching"
        );

        let mut payments = Vec::new();
        // Every round settles at least one side, so this terminates after at most
        // `positions.len()` rounds.
        while let (Some(debtor_idx), Some(creditor_idx)) =
            (largest_debtor(&positions), largest_creditor(&positions))
        {
            let debtor_owes = positions[debtor_idx].net.abs();
            let creditor_due = positions[creditor_idx].net;
            let amount = debtor_owes.min(creditor_due).round_to_cents();
            if !amount.is_positive() {
                break;
            }

            positions[debtor_idx].net += amount;
            positions[creditor_idx].net -= amount;
            payments.push(SimplifiedPayment {
                from: positions[debtor_idx].identity.clone(),
                to: positions[creditor_idx].identity.clone(),
                amount,
            });

            positions.retain(|position| !position.net.is_settled());
        }

        if !positions.is_empty() {
            let residual: Money = positions.iter().map(|position| position.net).sum();
            tracing::warn!(
                residual_count = positions.len(),
                residual = %residual,
                "Residual nets left unmatched; the debt set is unbalanced or sub-cent rounding accumulated on the last counterparty"
            );
        }

        let original_count = debts.len();
        let simplified_count = payments.len();
        DebtSimplification {
            simplified_payments: payments,
            original_count,
            simplified_count,
            savings_count: original_count as i64 - simplified_count as i64,
            savings_message: tabsplit_i18n::savings_message(original_count, simplified_count),
        }
    }
}

pub fn simplify_debts(debts: &[Debt]) -> DebtSimplification {
    DebtSimplifier.simplify(debts)
}

// Strict comparisons keep the earliest identity on exact ties.
fn largest_debtor(positions: &[NetPosition]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, position) in positions.iter().enumerate() {
        if !position.net.is_negative() {
            continue;
        }
        if best.is_none_or(|best_idx| position.net < positions[best_idx].net) {
            best = Some(idx);
        }
    }
    best
}

fn largest_creditor(positions: &[NetPosition]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, position) in positions.iter().enumerate() {
        if !position.net.is_positive() {
            continue;
        }
        if best.is_none_or(|best_idx| position.net > positions[best_idx].net) {
            best = Some(idx);
        }
    }
    best
}
