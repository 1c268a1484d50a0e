use crate::model::{BillItem, Money};
use rust_decimal::Decimal;

/// Per-participant share computation for a single bill.
pub struct ShareCalculator;

impl ShareCalculator {
    /// Share of one participant: the even split of every item assigned to them,
    /// plus tax and tip in proportion to their part of the item subtotal.
    ///
    /// Nothing is rounded here. Items without assignees count towards nobody,
    /// and a zero subtotal yields a zero proportion.
    pub fn participant_share(
        participant_id: &str,
        items: &[BillItem],
        tax: Money,
        tip: Money,
        subtotal: Money,
    ) -> Money {
        let items_share: Money = items
            .iter()
            .filter(|item| item.is_assigned_to(participant_id))
            .map(|item| {
                let assignees = Decimal::from(item.assignees.len());
                Money::from(item.line_total().as_decimal() / assignees)
            })
            .sum();

        let proportion = items_share.ratio_to(subtotal);
        items_share + tax.mul_decimal(proportion) + tip.mul_decimal(proportion)
    }
}

pub fn calculate_participant_share(
    participant_id: &str,
    items: &[BillItem],
    tax: Money,
    tip: Money,
    subtotal: Money,
) -> Money {
    ShareCalculator::participant_share(participant_id, items, tax, tip, subtotal)
}
