use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, PersonId};

pub type ExpenseId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Gift,
    Recharge,
    Bill,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Gift,
        Category::Recharge,
        Category::Bill,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Gift => "gift",
            Category::Recharge => "recharge",
            Category::Bill => "bill",
            Category::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "food" => Some(Category::Food),
            "gift" => Some(Category::Gift),
            "recharge" => Some(Category::Recharge),
            "bill" => Some(Category::Bill),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_str(s)
            .ok_or_else(|| format!("unknown category '{}' (food, gift, recharge, bill, other)", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Upi,
    GiftCard,
    OnlinePayment,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::GiftCard => "gift_card",
            PaymentMethod::OnlinePayment => "online_payment",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit_card" => Some(PaymentMethod::CreditCard),
            "upi" => Some(PaymentMethod::Upi),
            "gift_card" => Some(PaymentMethod::GiftCard),
            "online_payment" => Some(PaymentMethod::OnlinePayment),
            "cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::from_str(s).ok_or_else(|| {
            format!(
                "unknown payment method '{}' (credit_card, upi, gift_card, online_payment, cash)",
                s
            )
        })
    }
}

/// UPI sub-app, meaningful only when the payment method is UPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpiApp {
    #[serde(rename = "paytm")]
    Paytm,
    #[serde(rename = "gpay")]
    Gpay,
    #[serde(rename = "amazonpay")]
    AmazonPay,
    #[serde(rename = "phonepe")]
    PhonePe,
    #[serde(rename = "other_upi")]
    OtherUpi,
}

impl UpiApp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpiApp::Paytm => "paytm",
            UpiApp::Gpay => "gpay",
            UpiApp::AmazonPay => "amazonpay",
            UpiApp::PhonePe => "phonepe",
            UpiApp::OtherUpi => "other_upi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "paytm" => Some(UpiApp::Paytm),
            "gpay" => Some(UpiApp::Gpay),
            "amazonpay" => Some(UpiApp::AmazonPay),
            "phonepe" => Some(UpiApp::PhonePe),
            "other_upi" => Some(UpiApp::OtherUpi),
            _ => None,
        }
    }
}

impl std::fmt::Display for UpiApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UpiApp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpiApp::from_str(s).ok_or_else(|| {
            format!(
                "unknown UPI app '{}' (paytm, gpay, amazonpay, phonepe, other_upi)",
                s
            )
        })
    }
}

/// An outlay the owner paid on behalf of a friend. `amount_paid_cents`
/// accumulates repayments until it reaches `amount_cents`, at which point the
/// expense is settled and accepts no further payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub person_id: PersonId,
    /// Total paid on the friend's behalf (always positive)
    pub amount_cents: Cents,
    /// Repaid so far (0 <= paid <= amount)
    pub amount_paid_cents: Cents,
    pub category: Category,
    pub payment_method: PaymentMethod,
    /// Set only when payment_method is Upi
    pub upi_app: Option<UpiApp>,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        person_id: PersonId,
        amount_cents: Cents,
        category: Category,
        payment_method: PaymentMethod,
    ) -> Self {
        assert!(amount_cents > 0, "Expense amount must be positive");
        Self {
            id: Uuid::new_v4(),
            person_id,
            amount_cents,
            amount_paid_cents: 0,
            category,
            payment_method,
            upi_app: None,
            notes: None,
            is_paid: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_upi_app(mut self, app: UpiApp) -> Self {
        self.upi_app = Some(app);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Amount still outstanding on this expense.
    pub fn remaining_cents(&self) -> Cents {
        self.amount_cents - self.amount_paid_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_str(cat.as_str()), Some(cat));
        }
        assert_eq!(Category::from_str("snacks"), None);
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::CreditCard,
            PaymentMethod::Upi,
            PaymentMethod::GiftCard,
            PaymentMethod::OnlinePayment,
            PaymentMethod::Cash,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_upi_app_roundtrip() {
        for app in [
            UpiApp::Paytm,
            UpiApp::Gpay,
            UpiApp::AmazonPay,
            UpiApp::PhonePe,
            UpiApp::OtherUpi,
        ] {
            assert_eq!(UpiApp::from_str(app.as_str()), Some(app));
        }
    }

    #[test]
    fn test_new_expense_starts_unpaid() {
        let expense = Expense::new(
            Uuid::new_v4(),
            10000,
            Category::Food,
            PaymentMethod::Upi,
        )
        .with_upi_app(UpiApp::Gpay);

        assert_eq!(expense.amount_paid_cents, 0);
        assert!(!expense.is_paid);
        assert_eq!(expense.remaining_cents(), 10000);
        assert_eq!(expense.upi_app, Some(UpiApp::Gpay));
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn test_zero_amount_rejected() {
        Expense::new(Uuid::new_v4(), 0, Category::Other, PaymentMethod::Cash);
    }
}
