use tabsplit_domain::{Bill, Debt, Participant};

/// Identity a participant is settled under: email, else wallet address,
/// else a key local to the bill.
pub fn participant_identity(bill: &Bill, participant: &Participant) -> String {
    participant
        .email
        .clone()
        .or_else(|| participant.address.clone())
        .unwrap_or_else(|| format!("{}:{}", bill.id, participant.id))
}

/// One debt per unpaid share, owed by the participant to the bill's creator.
///
/// The creator's own entry is skipped. Zero shares are skipped as well since
/// they carry no obligation.
pub fn debts_from_bills(bills: &[Bill]) -> Vec<Debt> {
    bills
        .iter()
        .flat_map(|bill| {
            bill.participants
                .iter()
                .filter(|participant| !participant.paid && !participant.share.is_zero())
                .filter(|participant| !is_creator_entry(bill, participant))
                .map(move |participant| Debt {
                    debtor: participant_identity(bill, participant),
                    creditor: bill.creator_identity.clone(),
                    amount: participant.share.round_to_cents(),
                })
        })
        .collect()
}

fn is_creator_entry(bill: &Bill, participant: &Participant) -> bool {
    participant.address.as_deref() == Some(bill.creator_identity.as_str())
        || participant.email.as_deref() == Some(bill.creator_identity.as_str())
}
