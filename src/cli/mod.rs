pub mod assets;
pub mod bills;
pub mod budget;
pub mod debts;
pub mod demo;
pub mod deposits;
pub mod goals;
pub mod income;
pub mod init;
pub mod payday;
pub mod status;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::error::{PayplanError, Result};
use crate::fmt::parse_amount;
use crate::planner::CustomAllocations;
use crate::settings::db_path;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn open_db() -> Result<Connection> {
    let path = db_path();
    if !path.exists() {
        return Err(PayplanError::Other(
            "no database found; run `payplan init` first".to_string(),
        ));
    }
    crate::db::get_connection(&path)
}

/// Parse repeated `--debt NAME=AMOUNT` / `--goal NAME=AMOUNT` overrides.
pub(crate) fn parse_overrides(debts: &[String], goals: &[String]) -> Result<CustomAllocations> {
    fn split(entry: &str) -> Result<(String, crate::fmt::Cents)> {
        let (name, amount) = entry.rsplit_once('=').ok_or_else(|| {
            PayplanError::Validation(format!("expected NAME=AMOUNT, got {entry:?}"))
        })?;
        Ok((name.to_string(), parse_amount(amount)?))
    }

    let mut custom = CustomAllocations::default();
    for entry in debts {
        custom.debts.push(split(entry)?);
    }
    for entry in goals {
        custom.goals.push(split(entry)?);
    }
    Ok(custom)
}

#[derive(Parser)]
#[command(
    name = "payplan",
    about = "Payday planning CLI: split paychecks into buckets, pay bills, knock out debt.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up payplan: choose a data directory and initialize the database.
    Init {
        /// Path for payplan data (default: ~/Documents/payplan)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show or change the budget split and debt strategy.
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Manage income sources.
    Income {
        #[command(subcommand)]
        command: IncomeCommands,
    },
    /// Manage recurring bills.
    Bill {
        #[command(subcommand)]
        command: BillCommands,
    },
    /// Manage debts.
    Debt {
        #[command(subcommand)]
        command: DebtCommands,
    },
    /// Manage assets.
    Asset {
        #[command(subcommand)]
        command: AssetCommands,
    },
    /// Manage savings goals.
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Manage one-time deposits.
    Deposit {
        #[command(subcommand)]
        command: DepositCommands,
    },
    /// Preview how the next paycheck splits across buckets, bills, debts and goals.
    Plan {
        /// Override a debt payment: NAME=AMOUNT (switches to custom allocation)
        #[arg(long = "debt", value_name = "NAME=AMOUNT")]
        debts: Vec<String>,
        /// Override a goal deposit: NAME=AMOUNT (switches to custom allocation)
        #[arg(long = "goal", value_name = "NAME=AMOUNT")]
        goals: Vec<String>,
    },
    /// Mark the payday complete: record history, apply allocations, advance paydays.
    Complete {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Override a debt payment: NAME=AMOUNT (switches to custom allocation)
        #[arg(long = "debt", value_name = "NAME=AMOUNT")]
        debts: Vec<String>,
        /// Override a goal deposit: NAME=AMOUNT (switches to custom allocation)
        #[arg(long = "goal", value_name = "NAME=AMOUNT")]
        goals: Vec<String>,
    },
    /// Show the most recent completed paydays.
    History,
    /// Load sample data to explore payplan.
    Demo,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show the budget split and bucket balances.
    Show,
    /// Set budget fields; omitted flags keep their current values.
    Set {
        /// Estimated monthly income, e.g. 4000 or 4000.50
        #[arg(long = "monthly-income")]
        monthly_income: Option<String>,
        /// Percent of each paycheck routed to the Bills bucket
        #[arg(long = "bills-pct")]
        bills_pct: Option<f64>,
        /// Percent routed to the Spending bucket
        #[arg(long = "spending-pct")]
        spending_pct: Option<f64>,
        /// Percent routed to the Savings bucket
        #[arg(long = "savings-pct")]
        savings_pct: Option<f64>,
        /// Debt payoff strategy: avalanche or snowball
        #[arg(long)]
        strategy: Option<String>,
        /// Whether savings sit in a high-yield account
        #[arg(long)]
        hysa: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Add an income source.
    Add {
        name: String,
        /// Paycheck amount
        #[arg(long)]
        amount: String,
        /// weekly, biweekly, semimonthly, monthly or irregular
        #[arg(long)]
        frequency: String,
        /// Next payday: YYYY-MM-DD
        #[arg(long = "next-payday")]
        next_payday: Option<String>,
        /// Mark as the primary household income
        #[arg(long)]
        primary: bool,
    },
    List,
    /// Change an income; omitted flags keep their current values.
    Edit {
        name: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long = "next-payday")]
        next_payday: Option<String>,
        /// Make this the primary household income
        #[arg(long)]
        primary: bool,
    },
    /// Remove an income source.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum BillCommands {
    /// Add a recurring bill (future occurrences generate automatically).
    Add {
        name: String,
        #[arg(long)]
        amount: String,
        /// First due date: YYYY-MM-DD
        #[arg(long)]
        due: String,
        /// housing, utilities, transportation, insurance, subscriptions,
        /// debt_payments, child_family, health, taxes, furniture_rental, other
        #[arg(long, default_value = "other")]
        category: String,
        /// weekly, biweekly, monthly, quarterly, biannually, annually, one_time
        #[arg(long, default_value = "monthly")]
        frequency: String,
        /// Last date payable without being late: YYYY-MM-DD
        #[arg(long = "late-by")]
        late_by: Option<String>,
        /// Bill pays automatically
        #[arg(long)]
        autopay: bool,
        /// Amount varies month to month
        #[arg(long)]
        variable: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List upcoming bill occurrences (seven-month window).
    List {
        /// Include occurrences beyond the window
        #[arg(long)]
        all: bool,
    },
    /// Mark a bill occurrence paid (earliest unpaid, or pick one with --due).
    Pay {
        name: String,
        #[arg(long)]
        due: Option<String>,
    },
    /// Clear a bill occurrence's paid mark.
    Unpay {
        name: String,
        #[arg(long)]
        due: Option<String>,
    },
    /// Remove a bill and every occurrence sharing its name.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum DebtCommands {
    /// Add a debt. A minimum payment also creates its monthly payment bill.
    Add {
        name: String,
        #[arg(long)]
        balance: String,
        #[arg(long)]
        apr: f64,
        /// Day of month the payment is due (1-31)
        #[arg(long = "due-day")]
        due_day: u32,
        #[arg(long = "minimum-payment")]
        minimum_payment: Option<String>,
        #[arg(long = "original-balance")]
        original_balance: Option<String>,
        /// Last day of month payable without being late (1-31)
        #[arg(long = "late-by-day")]
        late_by_day: Option<u32>,
        #[arg(long = "statement-day")]
        statement_day: Option<u32>,
        /// credit_card, student_loan, car_loan, personal_loan, mortgage, medical, other
        #[arg(long = "type", default_value = "credit_card")]
        debt_type: String,
        #[arg(long = "credit-limit")]
        credit_limit: Option<String>,
        /// Name of an owned asset backing this debt
        #[arg(long = "linked-asset")]
        linked_asset: Option<String>,
    },
    List,
    /// Change a debt; the companion payment bill is kept in sync.
    Edit {
        name: String,
        #[arg(long)]
        balance: Option<String>,
        #[arg(long)]
        apr: Option<f64>,
        #[arg(long = "due-day")]
        due_day: Option<u32>,
        #[arg(long = "minimum-payment")]
        minimum_payment: Option<String>,
        #[arg(long = "credit-limit")]
        credit_limit: Option<String>,
        #[arg(long = "statement-day")]
        statement_day: Option<u32>,
    },
    /// Remove a debt and its payment bill series.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum AssetCommands {
    /// Add an asset.
    Add {
        name: String,
        #[arg(long)]
        value: String,
        /// property, vehicle or other
        #[arg(long = "type", default_value = "other")]
        asset_type: String,
        #[arg(long = "purchase-price")]
        purchase_price: Option<String>,
        /// YYYY-MM-DD
        #[arg(long = "purchase-date")]
        purchase_date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    List,
    /// Change an asset; omitted flags keep their current values.
    Edit {
        name: String,
        #[arg(long)]
        value: Option<String>,
        #[arg(long = "purchase-price")]
        purchase_price: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove an asset.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Add a savings goal.
    Add {
        name: String,
        #[arg(long)]
        target: String,
        #[arg(long, default_value = "0")]
        current: String,
        /// YYYY-MM-DD
        #[arg(long = "target-date")]
        target_date: Option<String>,
        /// Lower numbers fund first
        #[arg(long)]
        priority: Option<i64>,
    },
    List,
    /// Change a goal; omitted flags keep their current values.
    Edit {
        name: String,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        current: Option<String>,
        #[arg(long = "target-date")]
        target_date: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Remove a savings goal.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum DepositCommands {
    /// Track an expected one-time deposit (tax return, bonus, ...).
    Add {
        name: String,
        #[arg(long)]
        amount: String,
        /// YYYY-MM-DD
        #[arg(long)]
        expected: String,
        #[arg(long)]
        notes: Option<String>,
    },
    List,
    /// Change a deposit; omitted flags keep their current values.
    Edit {
        name: String,
        #[arg(long)]
        amount: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        expected: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a deposit received and split it into the buckets now.
    Receive { name: String },
    /// Remove a deposit.
    Remove { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_parse_names_and_amounts() {
        let custom = parse_overrides(
            &["Visa=150".to_string(), "Car Loan=75.50".to_string()],
            &["Emergency=20".to_string()],
        )
        .unwrap();
        assert_eq!(custom.debts[0], ("Visa".to_string(), 15_000));
        assert_eq!(custom.debts[1], ("Car Loan".to_string(), 7_550));
        assert_eq!(custom.goals[0], ("Emergency".to_string(), 2_000));
    }

    #[test]
    fn overrides_reject_missing_equals() {
        assert!(parse_overrides(&["Visa150".to_string()], &[]).is_err());
    }
}
