use crate::text_table::{Alignment, TextTableBuilder};
use std::{borrow::Cow, collections::HashMap, fmt::Write};
use tabsplit_application::{IdentityDirectory, LedgerReport};
use tabsplit_domain::{
    BalanceDirection, BalanceSummary, Bill, Money, PersonBalance, SimplifiedPayment,
};
use tabsplit_i18n as i18n;

pub struct LedgerPresenter<'a> {
    currency: &'a str,
    directory: &'a dyn IdentityDirectory,
}

impl<'a> LedgerPresenter<'a> {
    pub fn new(currency: &'a str, directory: &'a dyn IdentityDirectory) -> Self {
        Self {
            currency,
            directory,
        }
    }

    pub fn render_report(&self, report: &LedgerReport) -> String {
        let mut out = self.render_summary(&report.summary);
        if !report.summary.balances.is_empty() {
            out.push('\n');
            out.push_str(&self.render_person_balances(&report.summary.balances));
        }
        out.push('\n');
        out.push_str(&self.render_payments(&report.settlement.simplified_payments));
        let _ = writeln!(out, "{}", report.settlement.savings_message);
        out
    }

    pub fn render_summary(&self, summary: &BalanceSummary) -> String {
        let headers = [Cow::Borrowed(i18n::NET_BALANCE), Cow::Borrowed(i18n::AMOUNT)];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&headers)
            .row([
                Cow::Borrowed(i18n::TOTAL_OWED_TO_ME),
                self.amount(summary.total_owed_to_me),
            ])
            .row([
                Cow::Borrowed(i18n::TOTAL_I_OWE),
                self.amount(summary.total_i_owe),
            ])
            .row([
                Cow::Borrowed(i18n::NET_BALANCE),
                self.signed_amount(summary.net_balance),
            ])
            .build()
    }

    pub fn render_person_balances(&self, balances: &[PersonBalance]) -> String {
        let headers = [
            Cow::Borrowed(i18n::PERSON),
            Cow::Borrowed(i18n::DIRECTION),
            Cow::Borrowed(i18n::AMOUNT),
        ];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(balances.iter().map(|balance| {
                [
                    self.person_label(balance),
                    Cow::Borrowed(match balance.direction {
                        BalanceDirection::OwesMe => i18n::OWES_ME,
                        BalanceDirection::IOwe => i18n::I_OWE,
                    }),
                    self.amount(balance.amount),
                ]
            }))
            .build()
    }

    pub fn render_payments(&self, payments: &[SimplifiedPayment]) -> String {
        if payments.is_empty() {
            return format!("{}\n", i18n::NO_PAYMENTS_NEEDED);
        }

        let headers = [
            Cow::Borrowed(i18n::FROM),
            Cow::Borrowed(i18n::TO),
            Cow::Borrowed(i18n::AMOUNT),
        ];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(payments.iter().map(|payment| {
                [
                    self.identity_label(&payment.from),
                    self.identity_label(&payment.to),
                    self.amount(payment.amount),
                ]
            }))
            .build()
    }

    pub fn render_bill_shares(&self, bill: &Bill) -> String {
        let headers = [
            Cow::Borrowed(i18n::PARTICIPANT),
            Cow::Borrowed(i18n::SHARE),
            Cow::Borrowed(i18n::PAID),
        ];
        let table = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right, Alignment::Left])
            .headers(&headers)
            .rows(bill.participants.iter().map(|participant| {
                [
                    Cow::Borrowed(participant.name.as_str()),
                    self.amount(participant.share),
                    Cow::Borrowed(if participant.paid {
                        i18n::PAID
                    } else {
                        i18n::UNPAID
                    }),
                ]
            }))
            .build();

        format!(
            "{}\n{table}",
            i18n::bill_heading(&bill.id, self.amount(bill.total))
        )
    }

    fn amount(&self, amount: Money) -> Cow<'a, str> {
        Cow::Owned(format!("{amount} {}", self.currency))
    }

    fn signed_amount(&self, amount: Money) -> Cow<'a, str> {
        let sign = if amount.is_positive() { "+" } else { "" };
        Cow::Owned(format!("{sign}{amount} {}", self.currency))
    }

    fn identity_label<'b>(&'b self, identity: &'b str) -> Cow<'b, str> {
        match self.directory.display_name(identity) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Borrowed(identity),
        }
    }

    fn person_label<'b>(&'b self, balance: &'b PersonBalance) -> Cow<'b, str> {
        let contact = balance.email.as_deref().or(balance.address.as_deref());
        match contact {
            Some(contact) if contact != balance.name => {
                Cow::Owned(format!("{} <{contact}>", balance.name))
            }
            _ => Cow::Borrowed(balance.name.as_str()),
        }
    }
}

/// Directory that knows nobody; labels fall back to the raw identity.
pub struct EmptyDirectory;

impl IdentityDirectory for EmptyDirectory {
    fn display_name(&self, _identity: &str) -> Option<&str> {
        None
    }
}

/// Builds a directory from the participants of `bills`, keyed by the identity
/// each participant is settled under.
pub fn directory_from_bills(bills: &[Bill]) -> HashMap<String, String> {
    let mut directory = HashMap::new();
    for bill in bills {
        for participant in &bill.participants {
            let identity = tabsplit_application::participant_identity(bill, participant);
            directory
                .entry(identity)
                .or_insert_with(|| participant.name.clone());
        }
        if let Some(name) = &bill.creator_name {
            directory
                .entry(bill.creator_identity.clone())
                .or_insert_with(|| name.clone());
        }
    }
    directory
}
