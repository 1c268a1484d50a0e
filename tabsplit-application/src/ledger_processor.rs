use crate::{
    config::LedgerConfig,
    debt_derivation::debts_from_bills,
    error::LedgerError,
    model::{DebtSource, LedgerReport, LedgerSnapshot, Viewer},
};
use chrono::{DateTime, Utc};
use tabsplit_domain::{BalanceAggregator, BalanceSummary, Bill, DebtSimplification, DebtSimplifier};

/// Entry point for the ledger use cases over a fetched snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct LedgerProcessor {
    aggregator: BalanceAggregator,
}

impl LedgerProcessor {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            aggregator: BalanceAggregator::new(config.email_match),
        }
    }

    /// Recomputes totals and shares of every itemized bill.
    pub fn refresh_shares(&self, bills: &mut [Bill]) {
        for bill in bills.iter_mut() {
            bill.recalculate();
        }
    }

    pub fn balances(&self, viewer: &Viewer, bills: &[Bill]) -> BalanceSummary {
        self.aggregator
            .calculate_balances(&viewer.identity, bills, viewer.email.as_deref())
    }

    /// Simplifies the snapshot's explicit debts, or debts derived from its
    /// bills when none were supplied.
    pub fn settle(&self, snapshot: &LedgerSnapshot) -> (DebtSource, DebtSimplification) {
        if snapshot.debts.is_empty() {
            let derived = debts_from_bills(&snapshot.bills);
            tracing::debug!(
                bill_count = snapshot.bills.len(),
                debt_count = derived.len(),
                "Derived debts from unpaid shares"
            );
            (DebtSource::DerivedFromBills, DebtSimplifier.simplify(&derived))
        } else {
            (DebtSource::Supplied, DebtSimplifier.simplify(&snapshot.debts))
        }
    }

    /// Full report: shares refreshed, balances for the viewer, settlement plan.
    ///
    /// `viewer` overrides the viewer recorded in the snapshot.
    pub fn process(
        &self,
        mut snapshot: LedgerSnapshot,
        viewer: Option<Viewer>,
    ) -> Result<LedgerReport, LedgerError> {
        let viewer = viewer
            .or_else(|| snapshot.viewer.clone())
            .ok_or(LedgerError::MissingViewer)?;

        self.refresh_shares(&mut snapshot.bills);
        let summary = self.balances(&viewer, &snapshot.bills);
        let (debt_source, settlement) = self.settle(&snapshot);

        tracing::info!(
            viewer = %viewer.identity,
            net_balance = %summary.net_balance,
            original_count = settlement.original_count,
            simplified_count = settlement.simplified_count,
            "Processed ledger snapshot"
        );

        Ok(LedgerReport {
            viewer,
            summary,
            debt_source,
            settlement,
        })
    }

    pub fn mark_paid(
        &self,
        snapshot: &mut LedgerSnapshot,
        bill_id: &str,
        participant_id: &str,
        paid_at: DateTime<Utc>,
        transaction_ref: Option<String>,
    ) -> Result<(), LedgerError> {
        let bill = snapshot
            .bills
            .iter_mut()
            .find(|bill| bill.id == bill_id)
            .ok_or_else(|| LedgerError::UnknownBill(bill_id.to_owned()))?;
        bill.mark_paid(participant_id, paid_at, transaction_ref)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tabsplit_domain::{BillEditError, BillItem, Debt, EmailMatch, Money, Participant};

    const HOST: &str = "0xhost";

    #[fixture]
    fn processor() -> LedgerProcessor {
        LedgerProcessor::default()
    }

    fn host() -> Viewer {
        Viewer {
            identity: HOST.into(),
            email: None,
        }
    }

    fn itemized_snapshot() -> LedgerSnapshot {
        let mut bill = Bill::new("dinner", HOST);
        bill.add_participant(Participant::new("h", "Host").with_address(HOST))
            .unwrap();
        bill.add_participant(Participant::new("a", "Alice").with_email("alice@example.com"))
            .unwrap();
        bill.add_participant(Participant::new("b", "Bob").with_email("bob@example.com"))
            .unwrap();
        bill.add_item(BillItem::new(Money::from_i64(30), 1, ["h", "a", "b"]))
            .unwrap();
        bill.add_item(BillItem::new(Money::from_i64(20), 1, ["a"]))
            .unwrap();

        LedgerSnapshot {
            viewer: Some(host()),
            bills: vec![bill],
            debts: Vec::new(),
        }
    }

    #[rstest]
    fn process_builds_balances_and_settlement(processor: LedgerProcessor) {
        let report = processor.process(itemized_snapshot(), None).unwrap();

        assert_eq!(report.summary.total_owed_to_me, Money::from_i64(40));
        assert_eq!(report.summary.total_i_owe, Money::ZERO);
        assert_eq!(report.debt_source, DebtSource::DerivedFromBills);
        assert_eq!(report.settlement.original_count, 2);
        assert_eq!(report.settlement.simplified_count, 2);
        assert_eq!(
            report.settlement.simplified_payments[0].from,
            "alice@example.com"
        );
        assert_eq!(
            report.settlement.simplified_payments[0].amount,
            Money::from_i64(30)
        );
    }

    #[rstest]
    fn supplied_debts_take_precedence(processor: LedgerProcessor) {
        let mut snapshot = itemized_snapshot();
        snapshot.debts = vec![
            Debt::new("x", "y", Money::from_i64(10)),
            Debt::new("y", "x", Money::from_i64(10)),
        ];

        let (source, settlement) = processor.settle(&snapshot);

        assert_eq!(source, DebtSource::Supplied);
        assert!(settlement.simplified_payments.is_empty());
        assert_eq!(settlement.savings_count, 2);
    }

    #[rstest]
    fn explicit_viewer_overrides_snapshot(processor: LedgerProcessor) {
        let viewer = Viewer {
            identity: "0xalice".into(),
            email: Some("alice@example.com".into()),
        };
        let report = processor
            .process(itemized_snapshot(), Some(viewer.clone()))
            .unwrap();

        assert_eq!(report.viewer, viewer);
        assert_eq!(report.summary.total_i_owe, Money::from_i64(30));
        assert_eq!(report.summary.net_balance, Money::from_i64(-30));
    }

    #[rstest]
    fn missing_viewer_is_an_error(processor: LedgerProcessor) {
        let mut snapshot = itemized_snapshot();
        snapshot.viewer = None;
        let err = processor.process(snapshot, None).unwrap_err();
        assert!(matches!(err, LedgerError::MissingViewer));
    }

    #[rstest]
    fn paid_participants_drop_out_of_the_report(processor: LedgerProcessor) {
        let mut snapshot = itemized_snapshot();
        processor
            .mark_paid(&mut snapshot, "dinner", "a", Utc::now(), Some("0xtx".into()))
            .unwrap();

        let report = processor.process(snapshot, None).unwrap();
        assert_eq!(report.summary.total_owed_to_me, Money::from_i64(10));
        assert_eq!(report.settlement.simplified_count, 1);
    }

    #[rstest]
    fn mark_paid_reports_unknown_bill_and_repeat(processor: LedgerProcessor) {
        let mut snapshot = itemized_snapshot();
        let err = processor
            .mark_paid(&mut snapshot, "lunch", "a", Utc::now(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownBill(id) if id == "lunch"));

        processor
            .mark_paid(&mut snapshot, "dinner", "b", Utc::now(), None)
            .unwrap();
        let err = processor
            .mark_paid(&mut snapshot, "dinner", "b", Utc::now(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::BillEdit(BillEditError::AlreadyPaid { .. })
        ));
    }

    #[test]
    fn config_controls_email_matching() {
        let config = LedgerConfig {
            email_match: EmailMatch::CaseInsensitive,
            ..LedgerConfig::default()
        };
        let viewer = Viewer {
            identity: "0xalice".into(),
            email: Some("ALICE@example.com".into()),
        };

        let report = LedgerProcessor::new(&config)
            .process(itemized_snapshot(), Some(viewer))
            .unwrap();
        assert_eq!(report.summary.total_i_owe, Money::from_i64(30));
    }
}
