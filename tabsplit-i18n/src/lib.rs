#[cfg(all(feature = "ja", feature = "en"))]
compile_error!("Cannot enable both 'ja' and 'en' features at the same time");

#[cfg(feature = "ja")]
pub mod strings {
    pub const PERSON: &str = "相手";
    pub const DIRECTION: &str = "種別";
    pub const FROM: &str = "支払人";
    pub const TO: &str = "受取人";
    pub const AMOUNT: &str = "金額";
    pub const OWES_ME: &str = "受取予定";
    pub const I_OWE: &str = "支払予定";
    pub const TOTAL_OWED_TO_ME: &str = "受取予定の合計";
    pub const TOTAL_I_OWE: &str = "支払予定の合計";
    pub const NET_BALANCE: &str = "差引";
    pub const PARTICIPANT: &str = "参加者";
    pub const SHARE: &str = "負担額";
    pub const PAID: &str = "支払済";
    pub const UNPAID: &str = "未払い";
    pub const NO_PAYMENTS_NEEDED: &str = "清算の必要はありません";
}

#[cfg(not(feature = "ja"))]
pub mod strings {
    pub const PERSON: &str = "Person";
    pub const DIRECTION: &str = "Direction";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const OWES_ME: &str = "Owes me";
    pub const I_OWE: &str = "I owe";
    pub const TOTAL_OWED_TO_ME: &str = "Owed to me";
    pub const TOTAL_I_OWE: &str = "I owe";
    pub const NET_BALANCE: &str = "Net balance";
    pub const PARTICIPANT: &str = "Participant";
    pub const SHARE: &str = "Share";
    pub const PAID: &str = "Paid";
    pub const UNPAID: &str = "Unpaid";
    pub const NO_PAYMENTS_NEEDED: &str = "Everyone is settled up";
}

pub use strings::*;

#[cfg(feature = "ja")]
pub fn savings_message(original_count: usize, simplified_count: usize) -> String {
    format!("{original_count}件の支払いを{simplified_count}件にまとめました")
}

#[cfg(not(feature = "ja"))]
pub fn savings_message(original_count: usize, simplified_count: usize) -> String {
    let noun = if original_count == 1 { "payment" } else { "payments" };
    format!("Reduced {original_count} {noun} to {simplified_count}")
}

#[cfg(feature = "ja")]
pub fn bill_heading(bill_id: impl std::fmt::Display, total: impl std::fmt::Display) -> String {
    format!("伝票 {bill_id} (合計 {total})")
}

#[cfg(not(feature = "ja"))]
pub fn bill_heading(bill_id: impl std::fmt::Display, total: impl std::fmt::Display) -> String {
    format!("Bill {bill_id} (total {total})")
}
