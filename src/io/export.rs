use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::LedgerService;
use crate::domain::{Expense, Payment, Person, format_cents};

/// Exports ledger data as CSV (tabular views) or JSON (full snapshot).
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

/// Complete portable dump of the database.
#[derive(Serialize)]
pub struct FullSnapshot {
    pub people: Vec<Person>,
    pub expenses: Vec<Expense>,
    pub payments: Vec<Payment>,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export all expenses as CSV. Returns the number of rows written.
    pub async fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses(None, false, None).await?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record([
                "id",
                "person",
                "amount",
                "paid",
                "remaining",
                "category",
                "payment_method",
                "upi_app",
                "is_paid",
                "notes",
                "created_at",
            ])
            .context("Failed to write CSV header")?;

        let count = expenses.len();
        for item in expenses {
            let expense = &item.expense;
            csv_writer
                .write_record([
                    expense.id.to_string(),
                    item.person.name.clone(),
                    format_cents(expense.amount_cents),
                    format_cents(expense.amount_paid_cents),
                    format_cents(expense.remaining_cents()),
                    expense.category.to_string(),
                    expense.payment_method.to_string(),
                    expense
                        .upi_app
                        .map(|app| app.to_string())
                        .unwrap_or_default(),
                    expense.is_paid.to_string(),
                    expense.notes.clone().unwrap_or_default(),
                    expense.created_at.to_rfc3339(),
                ])
                .context("Failed to write expense row")?;
        }

        csv_writer.flush().context("Failed to flush CSV")?;
        Ok(count)
    }

    /// Export per-person balances as CSV. Returns the number of rows written.
    pub async fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let balances = self.service.list_people_with_balances().await?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(["person", "net_balance", "transaction_count"])
            .context("Failed to write CSV header")?;

        let count = balances.len();
        for entry in balances {
            csv_writer
                .write_record([
                    entry.person.name,
                    format_cents(entry.net_balance_cents),
                    entry.transaction_count.to_string(),
                ])
                .context("Failed to write balance row")?;
        }

        csv_writer.flush().context("Failed to flush CSV")?;
        Ok(count)
    }

    /// Export the payment history as CSV. Returns the number of rows written.
    pub async fn export_payments_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let payments = self.service.list_all_payments().await?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(["id", "expense_id", "amount", "payment_type", "notes", "created_at"])
            .context("Failed to write CSV header")?;

        let count = payments.len();
        for payment in payments {
            csv_writer
                .write_record([
                    payment.id.to_string(),
                    payment.expense_id.to_string(),
                    format_cents(payment.amount_cents),
                    payment.payment_type.to_string(),
                    payment.notes.unwrap_or_default(),
                    payment.created_at.to_rfc3339(),
                ])
                .context("Failed to write payment row")?;
        }

        csv_writer.flush().context("Failed to flush CSV")?;
        Ok(count)
    }

    /// Export the whole database as a JSON snapshot.
    pub async fn export_full_json<W: Write>(&self, writer: W) -> Result<FullSnapshot> {
        let people = self.service.list_people().await?;
        let expenses = self
            .service
            .list_expenses(None, false, None)
            .await?
            .into_iter()
            .map(|item| item.expense)
            .collect();
        let payments = self.service.list_all_payments().await?;

        let snapshot = FullSnapshot {
            people,
            expenses,
            payments,
        };

        serde_json::to_writer_pretty(writer, &snapshot).context("Failed to write JSON snapshot")?;
        Ok(snapshot)
    }
}
