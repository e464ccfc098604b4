use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::LedgerService;
use crate::domain::{
    Category, PaymentMethod, PaymentType, UpiApp, format_cents, format_currency, parse_cents,
};

/// Udhaar - track money lent to friends
#[derive(Parser)]
#[command(name = "udhaar")]
#[command(about = "A local-first tracker for money lent to friends")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "udhaar.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Friend management commands
    #[command(subcommand)]
    Friend(FriendCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Record a repayment against an expense
    Pay {
        /// Expense ID
        id: String,

        /// Payment kind: full, partial, custom
        #[arg(short, long, default_value = "full")]
        kind: String,

        /// Amount for custom payments (e.g., "50.00" or "50")
        #[arg(short, long)]
        amount: Option<String>,

        /// Notes for the payment
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show per-friend balances
    Balances {
        /// Include friends that are fully settled
        #[arg(long)]
        all: bool,
    },

    /// Show the aggregate to-collect / to-pay overview
    Summary,

    /// Export data to CSV or JSON
    Export {
        /// What to export: expenses, balances, payments, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum FriendCommands {
    /// Add a new friend
    Add {
        /// Friend name (must be unique)
        name: String,

        /// Display color as a hex string (picked from a palette if omitted)
        #[arg(short, long)]
        color: Option<String>,

        /// Avatar reference
        #[arg(short, long)]
        avatar: Option<String>,
    },

    /// List all friends
    List,

    /// Show detailed friend information
    Show {
        /// Friend name
        name: String,
    },

    /// Remove a friend (blocked while they still owe anything)
    Remove {
        /// Friend name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense paid on behalf of a friend
    Add {
        /// Amount paid for (e.g., "250.00" or "250")
        amount: String,

        /// Friend the expense was paid for
        #[arg(long = "for")]
        person: String,

        /// Category: food, gift, recharge, bill, other
        #[arg(short, long)]
        category: String,

        /// Payment method: credit_card, upi, gift_card, online_payment, cash
        #[arg(short, long)]
        method: String,

        /// UPI app when method is upi: paytm, gpay, amazonpay, phonepe, other_upi
        #[arg(long)]
        app: Option<String>,

        /// Notes for the expense
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List expenses, newest first
    List {
        /// Filter by friend name
        #[arg(long = "for")]
        person: Option<String>,

        /// Show only expenses that are not settled yet
        #[arg(long)]
        unpaid: bool,

        /// Maximum number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show detailed expense information with payment history
    Show {
        /// Expense ID
        id: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Friend(friend_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_friend_command(&service, friend_cmd).await?;
            }

            Commands::Expense(expense_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_expense_command(&service, expense_cmd).await?;
            }

            Commands::Pay {
                id,
                kind,
                amount,
                notes,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let expense_id =
                    Uuid::parse_str(&id).context("Invalid expense ID format (expected UUID)")?;

                let payment_type: PaymentType = kind
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid payment kind: {}", e))?;

                let amount_cents = amount
                    .map(|a| parse_cents(&a))
                    .transpose()
                    .context("Invalid amount format. Use '50.00' or '50'")?;

                let receipt = service
                    .record_payment(expense_id, payment_type, amount_cents, notes)
                    .await?;

                println!(
                    "Recorded {} payment of {} from {}",
                    receipt.payment.payment_type,
                    format_currency(receipt.payment.amount_cents),
                    receipt.person_name
                );
                if receipt.expense.is_paid {
                    println!("Expense is now fully settled.");
                } else {
                    println!(
                        "Remaining: {}",
                        format_currency(receipt.expense.remaining_cents())
                    );
                }
            }

            Commands::Balances { all } => {
                let service = LedgerService::connect(&self.database).await?;
                run_balances_command(&service, all).await?;
            }

            Commands::Summary => {
                let service = LedgerService::connect(&self.database).await?;
                let totals = service.aggregate_balances().await?;

                println!("To collect: {:>12}", format_currency(totals.total_owed));
                println!("To pay:     {:>12}", format_currency(totals.total_owing));
                println!("{}", "-".repeat(25));
                println!("Net:        {:>12}", format_currency(totals.net_balance));
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn run_friend_command(service: &LedgerService, cmd: FriendCommands) -> Result<()> {
    match cmd {
        FriendCommands::Add {
            name,
            color,
            avatar,
        } => {
            let person = service.create_person(name, color, avatar).await?;
            println!("Added friend: {} ({})", person.name, person.initials);
        }

        FriendCommands::List => {
            let people = service.list_people().await?;
            if people.is_empty() {
                println!("No friends found.");
            } else {
                println!("{:<20} {:<10} {:<9}", "NAME", "INITIALS", "COLOR");
                println!("{}", "-".repeat(40));
                for person in people {
                    println!(
                        "{:<20} {:<10} {:<9}",
                        person.name, person.initials, person.color
                    );
                }
            }
        }

        FriendCommands::Show { name } => {
            let entry = service.get_person_balance(&name).await?;
            let person = &entry.person;

            println!("Friend: {}", person.name);
            println!("  ID:           {}", person.id);
            println!("  Initials:     {}", person.initials);
            println!("  Color:        {}", person.color);
            if let Some(avatar) = &person.avatar {
                println!("  Avatar:       {}", avatar);
            }
            println!(
                "  Added:        {}",
                person.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!();
            println!(
                "  Balance:      {}",
                format_currency(entry.net_balance_cents)
            );
            println!(
                "  Transactions: {}",
                entry.transaction_count
            );
        }

        FriendCommands::Remove { name } => {
            service.delete_person(&name).await?;
            println!("Removed friend: {}", name);
        }
    }
    Ok(())
}

async fn run_expense_command(service: &LedgerService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            amount,
            person,
            category,
            method,
            app,
            notes,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '250.00' or '250'")?;

            let category: Category = category
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid category: {}", e))?;

            let method: PaymentMethod = method
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid payment method: {}", e))?;

            let app: Option<UpiApp> = app
                .map(|a| a.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("Invalid UPI app: {}", e))?;

            let result = service
                .create_expense(&person, amount_cents, category, method, app, notes)
                .await?;

            println!(
                "Recorded expense: {} for {} ({})",
                format_currency(result.expense.amount_cents),
                result.person.name,
                result.expense.id
            );
        }

        ExpenseCommands::List {
            person,
            unpaid,
            limit,
        } => {
            let expenses = service
                .list_expenses(person.as_deref(), unpaid, limit)
                .await?;

            if expenses.is_empty() {
                println!("No expenses found.");
            } else {
                println!(
                    "{:<12} {:<15} {:>10} {:>10} {:<10} {:<8}",
                    "DATE", "FRIEND", "AMOUNT", "REMAINING", "CATEGORY", "STATUS"
                );
                println!("{}", "-".repeat(72));
                for item in expenses {
                    let expense = &item.expense;
                    let status = if expense.is_paid {
                        "paid"
                    } else if expense.amount_paid_cents > 0 {
                        "partial"
                    } else {
                        "unpaid"
                    };
                    println!(
                        "{:<12} {:<15} {:>10} {:>10} {:<10} {:<8}",
                        expense.created_at.format("%Y-%m-%d"),
                        truncate(&item.person.name, 15),
                        format_cents(expense.amount_cents),
                        format_cents(expense.remaining_cents()),
                        expense.category,
                        status
                    );
                }
            }
        }

        ExpenseCommands::Show { id } => {
            let expense_id =
                Uuid::parse_str(&id).context("Invalid expense ID format (expected UUID)")?;
            run_show_expense_command(service, expense_id).await?;
        }
    }
    Ok(())
}

async fn run_show_expense_command(service: &LedgerService, expense_id: Uuid) -> Result<()> {
    let info = service.get_expense_info(expense_id).await?;
    let expense = &info.expense;

    println!("Expense: {}", expense.id);
    println!("  Paid for:    {}", info.person.name);
    println!(
        "  Amount:      {}",
        format_currency(expense.amount_cents)
    );
    println!(
        "  Repaid:      {}",
        format_currency(expense.amount_paid_cents)
    );
    println!(
        "  Remaining:   {}",
        format_currency(expense.remaining_cents())
    );
    println!("  Category:    {}", expense.category);
    println!("  Method:      {}", expense.payment_method);
    if let Some(app) = expense.upi_app {
        println!("  UPI app:     {}", app);
    }
    if let Some(notes) = &expense.notes {
        println!("  Notes:       {}", notes);
    }
    println!(
        "  Status:      {}",
        if expense.is_paid { "settled" } else { "open" }
    );
    println!(
        "  Recorded at: {}",
        expense.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    if !info.payments.is_empty() {
        println!();
        println!("  Payments:");
        for payment in &info.payments {
            println!(
                "    - {} ({}) on {}",
                format_currency(payment.amount_cents),
                payment.payment_type,
                payment.created_at.format("%Y-%m-%d")
            );
        }
    }

    Ok(())
}

async fn run_balances_command(service: &LedgerService, all: bool) -> Result<()> {
    let mut balances = service.list_people_with_balances().await?;

    // Settled friends are noise in the default view
    if !all {
        balances.retain(|entry| entry.net_balance_cents != 0);
    }

    if balances.is_empty() {
        println!("All settled up! No outstanding balances.");
        return Ok(());
    }

    println!(
        "{:<20} {:>12} {:>14}",
        "FRIEND", "BALANCE", "TRANSACTIONS"
    );
    println!("{}", "-".repeat(48));
    for entry in &balances {
        println!(
            "{:<20} {:>12} {:>14}",
            truncate(&entry.person.name, 20),
            format_currency(entry.net_balance_cents),
            entry.transaction_count
        );
    }

    let totals = service.aggregate_balances().await?;
    println!("{}", "-".repeat(48));
    println!(
        "{:<20} {:>12}",
        "NET",
        format_currency(totals.net_balance)
    );

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    use crate::io::Exporter;

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} expenses", count);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} balances", count);
            }
        }
        "payments" => {
            let count = exporter.export_payments_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} payments", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} people, {} expenses, {} payments",
                    snapshot.people.len(),
                    snapshot.expenses.len(),
                    snapshot.payments.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: expenses, balances, payments, full",
                export_type
            );
        }
    }

    Ok(())
}

// Counts chars, not bytes, so names in non-Latin scripts don't split
// mid-character.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", prefix)
    }
}
