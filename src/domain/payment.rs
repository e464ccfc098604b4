use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, ExpenseId};

pub type PaymentId = Uuid;

/// How the repayment amount is resolved against the expense's remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Pay the whole remaining balance
    Full,
    /// Pay half of the current remaining balance
    Partial,
    /// Caller supplies an explicit amount
    Custom,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Full => "full",
            PaymentType::Partial => "partial",
            PaymentType::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full" => Some(PaymentType::Full),
            "partial" => Some(PaymentType::Partial),
            "custom" => Some(PaymentType::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentType::from_str(s)
            .ok_or_else(|| format!("unknown payment type '{}' (full, partial, custom)", s))
    }
}

/// A repayment applied against one expense. Payments are immutable once
/// recorded; the history is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub expense_id: ExpenseId,
    /// Amount in paise (always positive)
    pub amount_cents: Cents,
    pub payment_type: PaymentType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(expense_id: ExpenseId, amount_cents: Cents, payment_type: PaymentType) -> Self {
        assert!(amount_cents > 0, "Payment amount must be positive");
        Self {
            id: Uuid::new_v4(),
            expense_id,
            amount_cents,
            payment_type,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_roundtrip() {
        for pt in [PaymentType::Full, PaymentType::Partial, PaymentType::Custom] {
            assert_eq!(PaymentType::from_str(pt.as_str()), Some(pt));
        }
        assert_eq!(PaymentType::from_str("half"), None);
    }

    #[test]
    fn test_new_payment() {
        let expense_id = Uuid::new_v4();
        let payment = Payment::new(expense_id, 2500, PaymentType::Custom).with_notes("via gpay");
        assert_eq!(payment.expense_id, expense_id);
        assert_eq!(payment.amount_cents, 2500);
        assert_eq!(payment.notes.as_deref(), Some("via gpay"));
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn test_zero_payment_rejected() {
        Payment::new(Uuid::new_v4(), 0, PaymentType::Full);
    }
}
