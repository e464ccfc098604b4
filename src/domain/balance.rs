use std::collections::HashMap;

use super::{Cents, Expense, PaymentType, PersonId};

/// Aggregate view across all friends. Positive `net_balance` means money is
/// still owed to the tracker's owner overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BalanceTotals {
    /// Sum of positive per-person balances ("to collect")
    pub total_owed: Cents,
    /// Sum of negative per-person balances, as a positive number ("to pay")
    pub total_owing: Cents,
    pub net_balance: Cents,
}

/// Outstanding balance of a single person's expenses.
/// net = sum of (amount - paid) over that person's expenses.
pub fn outstanding_cents(expenses: &[Expense]) -> Cents {
    expenses.iter().map(Expense::remaining_cents).sum()
}

/// Compute outstanding balances for all people from a list of expenses.
/// Returns a map of person_id -> outstanding. People without expenses
/// won't be in the map (balance = 0).
pub fn outstanding_by_person(expenses: &[Expense]) -> HashMap<PersonId, Cents> {
    let mut balances: HashMap<PersonId, Cents> = HashMap::new();
    for expense in expenses {
        *balances.entry(expense.person_id).or_insert(0) += expense.remaining_cents();
    }
    balances
}

/// Fold signed per-person balances into the aggregate overview.
pub fn aggregate_totals<I>(net_balances: I) -> BalanceTotals
where
    I: IntoIterator<Item = Cents>,
{
    let (total_owed, total_owing) = net_balances
        .into_iter()
        .fold((0, 0), |(owed, owing), net| {
            (owed + net.max(0), owing + (-net).max(0))
        });

    BalanceTotals {
        total_owed,
        total_owing,
        net_balance: total_owed - total_owing,
    }
}

/// Resolve the amount a payment will apply against an expense's remainder.
///
/// - `Full` pays the whole remainder, ignoring any requested amount.
/// - `Partial` pays half of the *current* remainder, rounded up to a whole
///   paisa so the result stays positive while anything remains.
/// - `Custom` requires an explicit amount in (0, remaining].
pub fn resolve_payment_amount(
    payment_type: PaymentType,
    remaining: Cents,
    requested: Option<Cents>,
) -> Result<Cents, PaymentAmountError> {
    match payment_type {
        PaymentType::Full => Ok(remaining),
        PaymentType::Partial => Ok((remaining + 1) / 2),
        PaymentType::Custom => {
            let amount = requested.ok_or(PaymentAmountError::AmountRequired)?;
            if amount <= 0 || amount > remaining {
                return Err(PaymentAmountError::OutOfRange { remaining });
            }
            Ok(amount)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentAmountError {
    AmountRequired,
    OutOfRange { remaining: Cents },
}

impl std::fmt::Display for PaymentAmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentAmountError::AmountRequired => {
                write!(f, "custom payments require an explicit amount")
            }
            PaymentAmountError::OutOfRange { remaining } => {
                write!(
                    f,
                    "amount must be between 0.01 and {}",
                    super::format_cents(*remaining)
                )
            }
        }
    }
}

impl std::error::Error for PaymentAmountError {}
