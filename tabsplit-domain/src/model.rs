use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::ShareCalculator;

/// Number of decimal places amounts are rounded to before they leave the core.
pub const CURRENCY_SCALE: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// Settlement tolerance: nets at or below this magnitude are treated as settled.
    pub const HALF_CENT: Self = Self(Decimal::from_parts(5, 0, 0, false, 3));

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// True when the magnitude is within half a cent of zero.
    pub fn is_settled(self) -> bool {
        self.abs() <= Self::HALF_CENT
    }

    /// Rounds half away from zero to currency precision.
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn mul_decimal(self, factor: Decimal) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Divides by `divisor`, yielding zero when the divisor is zero and
    /// saturating at the decimal bounds.
    pub fn ratio_to(self, divisor: Money) -> Decimal {
        if divisor.is_zero() {
            return Decimal::ZERO;
        }
        self.0.checked_div(divisor.0).unwrap_or_else(|| {
            if self.0.is_sign_negative() == divisor.0.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents().0;
        write!(f, "{rounded:.2}")
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    #[serde(default)]
    pub name: Option<String>,
    pub price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub assignees: IndexSet<String>,
}

fn default_quantity() -> u32 {
    1
}

impl BillItem {
    pub fn new<I, S>(price: Money, quantity: u32, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            price,
            quantity,
            assignees: assignees.into_iter().map(Into::into).collect(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.price.mul_decimal(Decimal::from(self.quantity))
    }

    pub fn is_assigned_to(&self, participant_id: &str) -> bool {
        self.assignees.contains(participant_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Wallet address, when the participant is linked to one.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub share: Money,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transaction_ref: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_share(mut self, share: Money) -> Self {
        self.share = share;
        self
    }

    pub fn with_paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillEditError {
    #[error("participant '{participant_id}' is not on bill '{bill_id}'")]
    UnknownParticipant {
        bill_id: String,
        participant_id: String,
    },
    #[error("participant '{participant_id}' is already on bill '{bill_id}'")]
    DuplicateParticipant {
        bill_id: String,
        participant_id: String,
    },
    #[error("participant '{participant_id}' on bill '{bill_id}' has already paid")]
    AlreadyPaid {
        bill_id: String,
        participant_id: String,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub creator_identity: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    #[serde(default)]
    pub tip: Money,
    #[serde(default)]
    pub tip_percent: Option<Decimal>,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub items: Vec<BillItem>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Bill {
    /// Creates an empty draft bill.
    pub fn new(id: impl Into<String>, creator_identity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            creator_identity: creator_identity.into(),
            ..Self::default()
        }
    }

    pub fn with_tax_percent(mut self, percent: Decimal) -> Self {
        self.tax_percent = Some(percent);
        self.recalculate();
        self
    }

    pub fn with_tip_percent(mut self, percent: Decimal) -> Self {
        self.tip_percent = Some(percent);
        self.recalculate();
        self
    }

    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub fn is_itemized(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn add_participant(&mut self, participant: Participant) -> Result<(), BillEditError> {
        if self.participant(&participant.id).is_some() {
            return Err(BillEditError::DuplicateParticipant {
                bill_id: self.id.clone(),
                participant_id: participant.id,
            });
        }
        self.participants.push(participant);
        self.recalculate();
        Ok(())
    }

    /// Adds an item; every assignee must already be a participant.
    pub fn add_item(&mut self, item: BillItem) -> Result<(), BillEditError> {
        if let Some(unknown) = item
            .assignees
            .iter()
            .find(|assignee| self.participant(assignee).is_none())
        {
            return Err(BillEditError::UnknownParticipant {
                bill_id: self.id.clone(),
                participant_id: unknown.clone(),
            });
        }
        self.items.push(item);
        self.recalculate();
        Ok(())
    }

    /// Flips a participant to paid. Paid status never reverts.
    pub fn mark_paid(
        &mut self,
        participant_id: &str,
        paid_at: DateTime<Utc>,
        transaction_ref: Option<String>,
    ) -> Result<(), BillEditError> {
        let bill_id = &self.id;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| BillEditError::UnknownParticipant {
                bill_id: bill_id.clone(),
                participant_id: participant_id.to_owned(),
            })?;
        if participant.paid {
            return Err(BillEditError::AlreadyPaid {
                bill_id: bill_id.clone(),
                participant_id: participant_id.to_owned(),
            });
        }
        participant.paid = true;
        participant.paid_at = Some(paid_at);
        participant.transaction_ref = transaction_ref;
        Ok(())
    }

    /// Recomputes subtotal, percent-derived tax/tip, total, and every share.
    ///
    /// Bills without items keep the amounts they were constructed with; their
    /// shares are treated as already computed upstream.
    pub fn recalculate(&mut self) {
        if !self.is_itemized() {
            return;
        }

        self.subtotal = self.items.iter().map(BillItem::line_total).sum();
        if let Some(percent) = self.tax_percent {
            self.tax = self.subtotal.mul_decimal(percent / Decimal::ONE_HUNDRED);
        }
        if let Some(percent) = self.tip_percent {
            self.tip = self.subtotal.mul_decimal(percent / Decimal::ONE_HUNDRED);
        }
        self.total = self.subtotal + self.tax + self.tip;

        for participant in &mut self.participants {
            participant.share = ShareCalculator::participant_share(
                &participant.id,
                &self.items,
                self.tax,
                self.tip,
                self.subtotal,
            );
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub debtor: String,
    pub creditor: String,
    pub amount: Money,
}

impl Debt {
    pub fn new(debtor: impl Into<String>, creditor: impl Into<String>, amount: Money) -> Self {
        Self {
            debtor: debtor.into(),
            creditor: creditor.into(),
            amount,
        }
    }
}

/// Signed running balance for one identity; positive means the identity is owed money.
#[derive(Clone, Debug, PartialEq)]
pub struct NetPosition {
    pub identity: String,
    pub net: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedPayment {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSimplification {
    pub simplified_payments: Vec<SimplifiedPayment>,
    pub original_count: usize,
    pub simplified_count: usize,
    pub savings_count: i64,
    pub savings_message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceDirection {
    OwesMe,
    IOwe,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonBalance {
    #[serde(skip)]
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub amount: Money,
    pub direction: BalanceDirection,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub total_owed_to_me: Money,
    pub total_i_owe: Money,
    pub net_balance: Money,
    pub balances: Vec<PersonBalance>,
}
