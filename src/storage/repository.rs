use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Category, Cents, Expense, ExpenseId, Payment, PaymentMethod, PaymentType, Person, PersonId,
    UpiApp,
};

use super::MIGRATION_001_INITIAL;

/// Per-person balance aggregation row.
#[derive(Debug, Clone)]
pub struct BalanceRow {
    pub person_id: PersonId,
    pub outstanding_cents: Cents,
    pub expense_count: i64,
}

/// Repository for persisting and querying people, expenses and payments.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Person operations
    // ========================

    /// Save a new person to the database.
    pub async fn save_person(&self, person: &Person) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO people (id, name, initials, color, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(person.id.to_string())
        .bind(&person.name)
        .bind(&person.initials)
        .bind(&person.color)
        .bind(&person.avatar)
        .bind(person.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save person")?;
        Ok(())
    }

    /// Get a person by ID.
    pub async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        let row = sqlx::query(
            "SELECT id, name, initials, color, avatar, created_at FROM people WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch person")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_person(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a person by name.
    pub async fn get_person_by_name(&self, name: &str) -> Result<Option<Person>> {
        let row = sqlx::query(
            "SELECT id, name, initials, color, avatar, created_at FROM people WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch person by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_person(&row)?)),
            None => Ok(None),
        }
    }

    /// List all people, ordered by name.
    pub async fn list_people(&self) -> Result<Vec<Person>> {
        let rows = sqlx::query(
            "SELECT id, name, initials, color, avatar, created_at FROM people ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list people")?;

        rows.iter().map(Self::row_to_person).collect()
    }

    /// Delete a person together with their expense and payment history.
    /// The caller is responsible for checking the outstanding balance first.
    pub async fn delete_person(&self, id: PersonId) -> Result<()> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await.context("Failed to begin delete")?;

        sqlx::query(
            "DELETE FROM payments WHERE expense_id IN (SELECT id FROM expenses WHERE person_id = ?)",
        )
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .context("Failed to delete payments for person")?;

        sqlx::query("DELETE FROM expenses WHERE person_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .context("Failed to delete expenses for person")?;

        sqlx::query("DELETE FROM people WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .context("Failed to delete person")?;

        tx.commit().await.context("Failed to commit delete")?;
        Ok(())
    }

    fn row_to_person(row: &sqlx::sqlite::SqliteRow) -> Result<Person> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Person {
            id: Uuid::parse_str(&id_str).context("Invalid person ID")?,
            name: row.get("name"),
            initials: row.get("initials"),
            color: row.get("color"),
            avatar: row.get("avatar"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Expense operations
    // ========================

    /// Save a new expense to the database.
    pub async fn save_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, person_id, amount_cents, amount_paid_cents, category, payment_method, upi_app, notes, is_paid, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(expense.person_id.to_string())
        .bind(expense.amount_cents)
        .bind(expense.amount_paid_cents)
        .bind(expense.category.as_str())
        .bind(expense.payment_method.as_str())
        .bind(expense.upi_app.map(|app| app.as_str()))
        .bind(&expense.notes)
        .bind(expense.is_paid)
        .bind(expense.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;
        Ok(())
    }

    /// Get an expense by ID.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let row = sqlx::query(
            r#"
            SELECT id, person_id, amount_cents, amount_paid_cents, category, payment_method, upi_app, notes, is_paid, created_at
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch expense")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_expense(&row)?)),
            None => Ok(None),
        }
    }

    /// List expenses, newest first, optionally scoped to one person and/or
    /// only those not yet settled.
    pub async fn list_expenses(
        &self,
        person_id: Option<PersonId>,
        unpaid_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Expense>> {
        let mut query = String::from(
            "SELECT id, person_id, amount_cents, amount_paid_cents, category, payment_method, upi_app, notes, is_paid, created_at FROM expenses WHERE 1=1",
        );

        let person_id_str = person_id.map(|id| id.to_string());

        if person_id.is_some() {
            query.push_str(" AND person_id = ?");
        }
        if unpaid_only {
            query.push_str(" AND is_paid = 0");
        }

        query.push_str(" ORDER BY created_at DESC");

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query);
        if let Some(ref pid) = person_id_str {
            sql_query = sql_query.bind(pid);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// Apply a payment to its expense atomically.
    ///
    /// The expense update is guarded so the add can never push
    /// `amount_paid_cents` past `amount_cents`, even when two payments race
    /// on the same expense: the guard re-checks the remainder under SQLite's
    /// write lock, and the loser matches no rows. Returns the updated expense,
    /// or `None` when the guard rejected the payment (caller re-reads to
    /// distinguish a settled expense from a shrunk remainder).
    pub async fn apply_payment(&self, payment: &Payment) -> Result<Option<Expense>> {
        let mut tx = self.pool.begin().await.context("Failed to begin payment")?;

        let row = sqlx::query(
            r#"
            UPDATE expenses
            SET amount_paid_cents = amount_paid_cents + ?,
                is_paid = CASE WHEN amount_paid_cents + ? = amount_cents THEN 1 ELSE 0 END
            WHERE id = ? AND is_paid = 0 AND amount_paid_cents + ? <= amount_cents
            RETURNING id, person_id, amount_cents, amount_paid_cents, category, payment_method, upi_app, notes, is_paid, created_at
            "#,
        )
        .bind(payment.amount_cents)
        .bind(payment.amount_cents)
        .bind(payment.expense_id.to_string())
        .bind(payment.amount_cents)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to update expense for payment")?;

        let Some(row) = row else {
            tx.rollback().await.context("Failed to roll back payment")?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO payments (id, expense_id, amount_cents, payment_type, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.expense_id.to_string())
        .bind(payment.amount_cents)
        .bind(payment.payment_type.as_str())
        .bind(&payment.notes)
        .bind(payment.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Failed to save payment")?;

        let expense = Self::row_to_expense(&row)?;
        tx.commit().await.context("Failed to commit payment")?;
        Ok(Some(expense))
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id_str: String = row.get("id");
        let person_id_str: String = row.get("person_id");
        let category_str: String = row.get("category");
        let method_str: String = row.get("payment_method");
        let upi_app_str: Option<String> = row.get("upi_app");
        let created_at_str: String = row.get("created_at");

        Ok(Expense {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            person_id: Uuid::parse_str(&person_id_str).context("Invalid person ID")?,
            amount_cents: row.get("amount_cents"),
            amount_paid_cents: row.get("amount_paid_cents"),
            category: Category::from_str(&category_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", category_str))?,
            payment_method: PaymentMethod::from_str(&method_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid payment method: {}", method_str))?,
            upi_app: upi_app_str
                .map(|s| {
                    UpiApp::from_str(&s).ok_or_else(|| anyhow::anyhow!("Invalid UPI app: {}", s))
                })
                .transpose()?,
            notes: row.get("notes"),
            is_paid: row.get::<i32, _>("is_paid") != 0,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Payment operations
    // ========================

    /// List payments recorded against an expense, oldest first.
    pub async fn list_payments_for_expense(&self, expense_id: ExpenseId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, expense_id, amount_cents, payment_type, notes, created_at
            FROM payments
            WHERE expense_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(expense_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments for expense")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// List all payments, oldest first.
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, expense_id, amount_cents, payment_type, notes, created_at
            FROM payments
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment> {
        let id_str: String = row.get("id");
        let expense_id_str: String = row.get("expense_id");
        let payment_type_str: String = row.get("payment_type");
        let created_at_str: String = row.get("created_at");

        Ok(Payment {
            id: Uuid::parse_str(&id_str).context("Invalid payment ID")?,
            expense_id: Uuid::parse_str(&expense_id_str).context("Invalid expense ID")?,
            amount_cents: row.get("amount_cents"),
            payment_type: PaymentType::from_str(&payment_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid payment type: {}", payment_type_str))?,
            notes: row.get("notes"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Balance aggregation
    // ========================

    /// Compute outstanding balance and expense count for every person in a
    /// single query. People without expenses get a zero row.
    pub async fn person_balance_rows(&self) -> Result<Vec<BalanceRow>> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.id as person_id,
                COALESCE(SUM(e.amount_cents - e.amount_paid_cents), 0) as outstanding,
                COUNT(e.id) as expense_count
            FROM people p
            LEFT JOIN expenses e ON e.person_id = p.id
            GROUP BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute balances")?;

        rows.iter()
            .map(|row| {
                let person_id_str: String = row.get("person_id");
                Ok(BalanceRow {
                    person_id: Uuid::parse_str(&person_id_str).context("Invalid person ID")?,
                    outstanding_cents: row.get("outstanding"),
                    expense_count: row.get("expense_count"),
                })
            })
            .collect()
    }

    /// Outstanding balance for a single person using SQL aggregation.
    pub async fn outstanding_for_person(&self, person_id: PersonId) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents - amount_paid_cents), 0) as outstanding
            FROM expenses
            WHERE person_id = ?
            "#,
        )
        .bind(person_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute outstanding balance")?;

        Ok(row.get("outstanding"))
    }
}
