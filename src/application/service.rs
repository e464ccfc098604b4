use std::collections::HashMap;

use crate::domain::{
    BalanceTotals, Category, Cents, Expense, ExpenseId, Payment, PaymentMethod, PaymentType,
    Person, PersonId, UpiApp, aggregate_totals, resolve_payment_amount,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the expense
/// tracker. This is the primary interface for any client (CLI, export, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// A person together with their derived balance.
pub struct PersonBalance {
    pub person: Person,
    /// Signed: positive means the person still owes the owner money
    pub net_balance_cents: Cents,
    /// Number of expenses recorded for the person, settled or not
    pub transaction_count: i64,
}

/// An expense joined with the person it was paid for.
pub struct ExpenseWithPerson {
    pub expense: Expense,
    pub person: Person,
}

/// Full detail view of one expense.
pub struct ExpenseInfo {
    pub expense: Expense,
    pub person: Person,
    pub payments: Vec<Payment>,
}

/// Result of recording a payment.
pub struct PaymentReceipt {
    pub expense: Expense,
    pub payment: Payment,
    pub person_name: String,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Friend operations
    // ========================

    /// Add a new friend.
    pub async fn create_person(
        &self,
        name: String,
        color: Option<String>,
        avatar: Option<String>,
    ) -> Result<Person, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("name", "name is required"));
        }
        if name.chars().count() > 50 {
            return Err(AppError::validation(
                "name",
                "name must be less than 50 characters",
            ));
        }

        if self.repo.get_person_by_name(&name).await?.is_some() {
            return Err(AppError::PersonAlreadyExists(name));
        }

        let mut person = Person::new(name);
        if let Some(color) = color {
            person = person.with_color(color);
        }
        if let Some(avatar) = avatar {
            person = person.with_avatar(avatar);
        }

        // A concurrent create with the same name can slip past the check
        // above; the UNIQUE constraint on people.name catches it.
        if let Err(err) = self.repo.save_person(&person).await {
            let duplicate = err
                .downcast_ref::<sqlx::Error>()
                .and_then(|e| e.as_database_error())
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                return Err(AppError::PersonAlreadyExists(person.name));
            }
            return Err(err.into());
        }
        Ok(person)
    }

    /// Get a friend by name.
    pub async fn get_person(&self, name: &str) -> Result<Person, AppError> {
        self.repo
            .get_person_by_name(name)
            .await?
            .ok_or_else(|| AppError::PersonNotFound(name.to_string()))
    }

    /// List all friends.
    pub async fn list_people(&self) -> Result<Vec<Person>, AppError> {
        Ok(self.repo.list_people().await?)
    }

    /// Remove a friend. Blocked while the friend still owes anything;
    /// once settled, the friend's expense history is removed with them.
    pub async fn delete_person(&self, name: &str) -> Result<Person, AppError> {
        let person = self.get_person(name).await?;
        let outstanding = self.repo.outstanding_for_person(person.id).await?;

        if outstanding != 0 {
            return Err(AppError::OutstandingBalance {
                name: person.name.clone(),
                balance: outstanding,
            });
        }

        self.repo.delete_person(person.id).await?;
        Ok(person)
    }

    /// Get one friend together with their balance.
    pub async fn get_person_balance(&self, name: &str) -> Result<PersonBalance, AppError> {
        let person = self.get_person(name).await?;
        let rows = self.repo.person_balance_rows().await?;

        let (net_balance_cents, transaction_count) = rows
            .into_iter()
            .find(|row| row.person_id == person.id)
            .map(|row| (row.outstanding_cents, row.expense_count))
            .unwrap_or((0, 0));

        Ok(PersonBalance {
            person,
            net_balance_cents,
            transaction_count,
        })
    }

    /// List all friends together with their balances.
    pub async fn list_people_with_balances(&self) -> Result<Vec<PersonBalance>, AppError> {
        let people = self.repo.list_people().await?;
        let rows = self.repo.person_balance_rows().await?;

        let by_person: HashMap<PersonId, (Cents, i64)> = rows
            .into_iter()
            .map(|row| (row.person_id, (row.outstanding_cents, row.expense_count)))
            .collect();

        Ok(people
            .into_iter()
            .map(|person| {
                let (net_balance_cents, transaction_count) =
                    by_person.get(&person.id).copied().unwrap_or((0, 0));
                PersonBalance {
                    person,
                    net_balance_cents,
                    transaction_count,
                }
            })
            .collect())
    }

    /// Aggregate to-collect / to-pay totals across all friends.
    /// Always recomputed from current expense state.
    pub async fn aggregate_balances(&self) -> Result<BalanceTotals, AppError> {
        let rows = self.repo.person_balance_rows().await?;
        Ok(aggregate_totals(
            rows.into_iter().map(|row| row.outstanding_cents),
        ))
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a new expense paid on behalf of a friend.
    pub async fn create_expense(
        &self,
        person_name: &str,
        amount_cents: Cents,
        category: Category,
        payment_method: PaymentMethod,
        upi_app: Option<UpiApp>,
        notes: Option<String>,
    ) -> Result<ExpenseWithPerson, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::validation(
                "amount",
                "amount must be a positive number",
            ));
        }

        let person = self
            .repo
            .get_person_by_name(person_name)
            .await?
            .ok_or_else(|| {
                AppError::validation("person", format!("no such person: {}", person_name))
            })?;

        let mut expense = Expense::new(person.id, amount_cents, category, payment_method);

        // The sub-app only means anything for UPI payments
        if payment_method == PaymentMethod::Upi {
            if let Some(app) = upi_app {
                expense = expense.with_upi_app(app);
            }
        }
        if let Some(notes) = notes {
            expense = expense.with_notes(notes);
        }

        self.repo.save_expense(&expense).await?;
        Ok(ExpenseWithPerson { expense, person })
    }

    /// List expenses (newest first), optionally scoped to one friend and/or
    /// only unpaid ones.
    pub async fn list_expenses(
        &self,
        person_name: Option<&str>,
        unpaid_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<ExpenseWithPerson>, AppError> {
        let person_id = match person_name {
            Some(name) => Some(self.get_person(name).await?.id),
            None => None,
        };

        let expenses = self.repo.list_expenses(person_id, unpaid_only, limit).await?;
        let people: HashMap<PersonId, Person> = self
            .repo
            .list_people()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        expenses
            .into_iter()
            .map(|expense| {
                let person = people
                    .get(&expense.person_id)
                    .cloned()
                    .ok_or_else(|| AppError::PersonNotFound(expense.person_id.to_string()))?;
                Ok(ExpenseWithPerson { expense, person })
            })
            .collect()
    }

    /// Get full expense detail: the expense, its person, its payment history.
    pub async fn get_expense_info(&self, id: ExpenseId) -> Result<ExpenseInfo, AppError> {
        let expense = self
            .repo
            .get_expense(id)
            .await?
            .ok_or_else(|| AppError::ExpenseNotFound(id.to_string()))?;

        let person = self
            .repo
            .get_person(expense.person_id)
            .await?
            .ok_or_else(|| AppError::PersonNotFound(expense.person_id.to_string()))?;

        let payments = self.repo.list_payments_for_expense(id).await?;

        Ok(ExpenseInfo {
            expense,
            person,
            payments,
        })
    }

    // ========================
    // Payment operations
    // ========================

    /// List every payment in the ledger, oldest first.
    pub async fn list_all_payments(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.repo.list_payments().await?)
    }

    /// Record a repayment against an expense.
    ///
    /// The amount is resolved from the payment type against the current
    /// remainder; the write is guarded so racing payments cannot overpay.
    pub async fn record_payment(
        &self,
        expense_id: ExpenseId,
        payment_type: PaymentType,
        amount_cents: Option<Cents>,
        notes: Option<String>,
    ) -> Result<PaymentReceipt, AppError> {
        let expense = self
            .repo
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| AppError::ExpenseNotFound(expense_id.to_string()))?;

        if expense.is_paid {
            return Err(AppError::AlreadySettled(expense_id.to_string()));
        }

        let amount = resolve_payment_amount(payment_type, expense.remaining_cents(), amount_cents)
            .map_err(|e| AppError::validation("amount", e.to_string()))?;

        let mut payment = Payment::new(expense_id, amount, payment_type);
        if let Some(notes) = notes {
            payment = payment.with_notes(notes);
        }

        match self.repo.apply_payment(&payment).await? {
            Some(updated) => {
                let person = self
                    .repo
                    .get_person(updated.person_id)
                    .await?
                    .ok_or_else(|| AppError::PersonNotFound(updated.person_id.to_string()))?;

                Ok(PaymentReceipt {
                    expense: updated,
                    payment,
                    person_name: person.name,
                })
            }
            // A concurrent payment changed the remainder between our read and
            // the guarded write. Re-read to report against current state.
            None => {
                let current = self
                    .repo
                    .get_expense(expense_id)
                    .await?
                    .ok_or_else(|| AppError::ExpenseNotFound(expense_id.to_string()))?;

                if current.is_paid {
                    Err(AppError::AlreadySettled(expense_id.to_string()))
                } else {
                    Err(AppError::validation(
                        "amount",
                        format!(
                            "amount must be between 0.01 and {}",
                            crate::domain::format_cents(current.remaining_cents())
                        ),
                    ))
                }
            }
        }
    }
}
