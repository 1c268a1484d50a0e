use crate::{
    model::{BalanceDirection, BalanceSummary, Bill, Money, Participant, PersonBalance},
    services::identity_table::normalize_identity,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a participant's email is compared with the viewer's email.
///
/// `Exact` reproduces the observed production behaviour. `CaseInsensitive`
/// is available behind configuration until the product decides on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailMatch {
    #[default]
    Exact,
    CaseInsensitive,
}

impl EmailMatch {
    pub fn matches(self, lhs: &str, rhs: &str) -> bool {
        match self {
            EmailMatch::Exact => lhs == rhs,
            EmailMatch::CaseInsensitive => normalize_identity(lhs) == normalize_identity(rhs),
        }
    }
}

/// Cross-bill balances for a single viewing identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct BalanceAggregator {
    email_match: EmailMatch,
}

/// One unpaid share seen from the viewer's side.
struct Contribution<'a> {
    bill: &'a Bill,
    participant: &'a Participant,
    direction: BalanceDirection,
}

struct Accumulated {
    name: String,
    email: Option<String>,
    address: Option<String>,
    // Positive while the counterparty owes the viewer.
    signed: Money,
}

impl BalanceAggregator {
    pub fn new(email_match: EmailMatch) -> Self {
        Self { email_match }
    }

    pub fn calculate_balances(
        &self,
        viewer: &str,
        bills: &[Bill],
        viewer_email: Option<&str>,
    ) -> BalanceSummary {
        let mut total_owed_to_me = Money::ZERO;
        let mut total_i_owe = Money::ZERO;

        for contribution in self.contributions(viewer, bills, viewer_email) {
            match contribution.direction {
                BalanceDirection::OwesMe => total_owed_to_me += contribution.participant.share,
                BalanceDirection::IOwe => total_i_owe += contribution.participant.share,
            }
        }

        let balances = self.group_balances_by_person(viewer, bills, viewer_email);

        tracing::debug!(
            bill_count = bills.len(),
            counterparty_count = balances.len(),
            total_owed_to_me = %total_owed_to_me,
            total_i_owe = %total_i_owe,
            "Aggregated balances"
        );

        BalanceSummary {
            total_owed_to_me,
            total_i_owe,
            net_balance: calculate_net_balance(total_owed_to_me, total_i_owe),
            balances,
        }
    }

    /// Per-counterparty view of the same contributions as [`Self::calculate_balances`].
    ///
    /// Entries merge only when they share a normalized key: the counterparty's
    /// lower-cased email (or a per-participant key without one) for money owed
    /// to the viewer, and the creator identity for money the viewer owes. An
    /// email-keyed and an address-keyed entry for the same real person stay
    /// separate. Sorted by amount descending, ties in first-appearance order.
    pub fn group_balances_by_person(
        &self,
        viewer: &str,
        bills: &[Bill],
        viewer_email: Option<&str>,
    ) -> Vec<PersonBalance> {
        let mut grouped: IndexMap<String, Accumulated> = IndexMap::new();

        for Contribution {
            bill,
            participant,
            direction,
        } in self.contributions(viewer, bills, viewer_email)
        {
            let (key, signed) = match direction {
                BalanceDirection::OwesMe => (owed_to_me_key(bill, participant), participant.share),
                BalanceDirection::IOwe => (normalize_identity(&bill.creator_identity), -participant.share),
            };

            grouped
                .entry(key)
                .or_insert_with(|| match direction {
                    BalanceDirection::OwesMe => Accumulated {
                        name: participant.name.clone(),
                        email: participant.email.clone(),
                        address: participant.address.clone(),
                        signed: Money::ZERO,
                    },
                    BalanceDirection::IOwe => Accumulated {
                        name: bill
                            .creator_name
                            .clone()
                            .unwrap_or_else(|| bill.creator_identity.clone()),
                        email: None,
                        address: Some(bill.creator_identity.clone()),
                        signed: Money::ZERO,
                    },
                })
                .signed += signed;
        }

        let mut balances: Vec<PersonBalance> = grouped
            .into_iter()
            .filter(|(_, entry)| !entry.signed.is_zero())
            .map(|(key, entry)| PersonBalance {
                key,
                name: entry.name,
                email: entry.email,
                address: entry.address,
                amount: entry.signed.abs(),
                direction: if entry.signed.is_positive() {
                    BalanceDirection::OwesMe
                } else {
                    BalanceDirection::IOwe
                },
            })
            .collect();

        // `sort_by` is stable, which keeps ties in first-appearance order.
        balances.sort_by(|lhs, rhs| rhs.amount.cmp(&lhs.amount));
        balances
    }

    fn contributions<'a>(
        &'a self,
        viewer: &'a str,
        bills: &'a [Bill],
        viewer_email: Option<&'a str>,
    ) -> impl Iterator<Item = Contribution<'a>> + 'a {
        bills.iter().flat_map(move |bill| {
            let is_creator = bill.creator_identity == viewer;
            bill.participants
                .iter()
                .filter(|participant| !participant.paid)
                .filter_map(move |participant| {
                    let direction = if is_creator {
                        if self.is_viewer_entry(participant, viewer, viewer_email) {
                            return None;
                        }
                        BalanceDirection::OwesMe
                    } else {
                        let email = participant.email.as_deref()?;
                        let viewer_email = viewer_email?;
                        if !self.email_match.matches(email, viewer_email) {
                            return None;
                        }
                        BalanceDirection::IOwe
                    };
                    Some(Contribution {
                        bill,
                        participant,
                        direction,
                    })
                })
        })
    }

    fn is_viewer_entry(
        &self,
        participant: &Participant,
        viewer: &str,
        viewer_email: Option<&str>,
    ) -> bool {
        if participant.address.as_deref() == Some(viewer) {
            return true;
        }
        let Some(email) = participant.email.as_deref() else {
            return false;
        };
        self.email_match.matches(email, viewer)
            || viewer_email.is_some_and(|viewer_email| self.email_match.matches(email, viewer_email))
    }
}

pub fn calculate_net_balance(owed_to_me: Money, i_owe: Money) -> Money {
    owed_to_me - i_owe
}

fn owed_to_me_key(bill: &Bill, participant: &Participant) -> String {
    match participant.email.as_deref() {
        Some(email) => normalize_identity(email),
        None => format!("participant:{}:{}", bill.id, participant.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    const ME: &str = "0xme";
    const MY_EMAIL: &str = "me@example.com";

    #[fixture]
    fn aggregator() -> BalanceAggregator {
        BalanceAggregator::default()
    }

    fn bill(id: &str, creator: &str, participants: Vec<Participant>) -> Bill {
        let total = participants.iter().map(|p| p.share).sum();
        Bill {
            id: id.into(),
            creator_identity: creator.into(),
            total,
            participants,
            ..Bill::default()
        }
    }

    fn share(id: &str, name: &str, amount: i64) -> Participant {
        Participant::new(id, name).with_share(Money::from_i64(amount))
    }

    #[rstest]
    fn creator_is_owed_unpaid_shares(aggregator: BalanceAggregator) {
        let bills = [bill(
            "b1",
            ME,
            vec![
                share("p1", "Alice", 50),
                share("p2", "Bob", 50).with_paid(true),
            ],
        )];

        let summary = aggregator.calculate_balances(ME, &bills, None);

        assert_eq!(summary.total_owed_to_me, Money::from_i64(50));
        assert_eq!(summary.total_i_owe, Money::ZERO);
        assert_eq!(summary.net_balance, Money::from_i64(50));
    }

    #[rstest]
    #[case::by_address(share("p0", "Me", 40).with_address(ME))]
    #[case::by_viewer_email(share("p0", "Me", 40).with_email(MY_EMAIL))]
    fn creator_own_entry_is_skipped(aggregator: BalanceAggregator, #[case] own: Participant) {
        let bills = [bill("b1", ME, vec![own, share("p1", "Alice", 10)])];

        let summary = aggregator.calculate_balances(ME, &bills, Some(MY_EMAIL));

        assert_eq!(summary.total_owed_to_me, Money::from_i64(10));
        assert_eq!(summary.balances.len(), 1);
    }

    #[rstest]
    fn viewer_owes_unpaid_share_on_other_bills(aggregator: BalanceAggregator) {
        let bills = [
            bill(
                "b1",
                "0xfriend",
                vec![share("p1", "Me", 30).with_email(MY_EMAIL)],
            ),
            bill(
                "b2",
                "0xfriend",
                vec![share("p1", "Me", 5).with_email(MY_EMAIL).with_paid(true)],
            ),
            bill(
                "b3",
                "0xother",
                vec![share("p1", "Someone", 70).with_email("someone@example.com")],
            ),
        ];

        let summary = aggregator.calculate_balances(ME, &bills, Some(MY_EMAIL));

        assert_eq!(summary.total_owed_to_me, Money::ZERO);
        assert_eq!(summary.total_i_owe, Money::from_i64(30));
        assert_eq!(summary.net_balance, Money::from_i64(-30));
    }

    #[rstest]
    fn without_viewer_email_nothing_is_owed(aggregator: BalanceAggregator) {
        let bills = [bill(
            "b1",
            "0xfriend",
            vec![share("p1", "Me", 30).with_email(MY_EMAIL)],
        )];

        let summary = aggregator.calculate_balances(ME, &bills, None);
        assert_eq!(summary.total_i_owe, Money::ZERO);
        assert!(summary.balances.is_empty());
    }

    #[rstest]
    #[case::exact_is_case_sensitive(EmailMatch::Exact, Money::ZERO)]
    #[case::opt_in_case_insensitive(EmailMatch::CaseInsensitive, Money::from_i64(30))]
    fn email_match_policy(#[case] email_match: EmailMatch, #[case] expected: Money) {
        let bills = [bill(
            "b1",
            "0xfriend",
            vec![share("p1", "Me", 30).with_email("Me@Example.com")],
        )];

        let summary =
            BalanceAggregator::new(email_match).calculate_balances(ME, &bills, Some(MY_EMAIL));
        assert_eq!(summary.total_i_owe, expected);
    }

    #[test]
    fn case_insensitive_matching_folds_like_merge_keys() {
        let aggregator = BalanceAggregator::new(EmailMatch::CaseInsensitive);
        let owed = [bill(
            "b1",
            "0xfriend",
            vec![share("p1", "Élodie", 12).with_email("ÉLODIE@example.fr")],
        )];
        let summary = aggregator.calculate_balances("0xelodie", &owed, Some("élodie@example.fr"));
        assert_eq!(summary.total_i_owe, Money::from_i64(12));

        let mine = [
            bill("b2", ME, vec![share("p1", "Élodie", 7).with_email("ÉLODIE@example.fr")]),
            bill("b3", ME, vec![share("p1", "Élodie", 3).with_email("élodie@example.fr")]),
        ];
        let grouped = aggregator.group_balances_by_person(ME, &mine, None);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].amount, Money::from_i64(10));
    }

    #[rstest]
    fn groups_by_email_and_creator(aggregator: BalanceAggregator) {
        let bills = [
            bill(
                "b1",
                ME,
                vec![
                    share("p1", "Alice", 20).with_email("alice@example.com"),
                    share("p2", "Walk-in", 15),
                ],
            ),
            bill(
                "b2",
                ME,
                vec![
                    share("p1", "Alice A.", 25).with_email("ALICE@example.com"),
                    share("p2", "Walk-in", 15),
                ],
            ),
            bill(
                "b3",
                "0xAlice",
                vec![share("p1", "Me", 12).with_email(MY_EMAIL)],
            ),
        ];

        let balances = aggregator.group_balances_by_person(ME, &bills, Some(MY_EMAIL));

        let view: Vec<(&str, Money, BalanceDirection)> = balances
            .iter()
            .map(|b| (b.name.as_str(), b.amount, b.direction))
            .collect();
        assert_eq!(
            view,
            vec![
                ("Alice", Money::from_i64(45), BalanceDirection::OwesMe),
                ("Walk-in", Money::from_i64(15), BalanceDirection::OwesMe),
                ("Walk-in", Money::from_i64(15), BalanceDirection::OwesMe),
                ("0xAlice", Money::from_i64(12), BalanceDirection::IOwe),
            ]
        );
        assert_eq!(balances[0].key, "alice@example.com");
        assert_eq!(balances[1].key, "participant:b1:p2");
        assert_eq!(balances[2].key, "participant:b2:p2");
        assert_eq!(balances[3].address.as_deref(), Some("0xAlice"));
    }

    #[rstest]
    fn same_key_on_both_sides_nets_out(aggregator: BalanceAggregator) {
        let friend = "friend@example.com";
        let bills = [
            bill(
                "b1",
                ME,
                vec![share("p1", "Friend", 40).with_email(friend)],
            ),
            bill(
                "b2",
                friend,
                vec![share("p1", "Me", 25).with_email(MY_EMAIL)],
            ),
        ];

        let balances = aggregator.group_balances_by_person(ME, &bills, Some(MY_EMAIL));

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount, Money::from_i64(15));
        assert_eq!(balances[0].direction, BalanceDirection::OwesMe);
    }

    #[rstest]
    fn settled_contributions_are_excluded(aggregator: BalanceAggregator) {
        let bills = [bill(
            "b1",
            ME,
            vec![share("p1", "Alice", 20).with_email("a@x.io").with_paid(true)],
        )];

        assert!(aggregator
            .group_balances_by_person(ME, &bills, None)
            .is_empty());
    }

    #[rstest]
    fn creator_match_is_exact(aggregator: BalanceAggregator) {
        let bills = [bill("b1", "0xME", vec![share("p1", "Alice", 20)])];
        let summary = aggregator.calculate_balances(ME, &bills, None);
        assert_eq!(summary.total_owed_to_me, Money::ZERO);
    }

    #[test]
    fn empty_bill_list_is_all_zero() {
        let summary = BalanceAggregator::default().calculate_balances(ME, &[], Some(MY_EMAIL));
        assert_eq!(summary.total_owed_to_me, Money::ZERO);
        assert_eq!(summary.total_i_owe, Money::ZERO);
        assert_eq!(summary.net_balance, Money::ZERO);
        assert!(summary.balances.is_empty());
    }

    #[test]
    fn net_balance_is_difference() {
        assert_eq!(
            calculate_net_balance(Money::from(dec!(12.5)), Money::from(dec!(20))),
            Money::from(dec!(-7.5))
        );
    }
}
