use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::planner::next_payday_event;
use crate::settings::load_settings;
use crate::store;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("payplan.db");

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `payplan init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;

    let incomes = store::list_incomes(&conn)?;
    let bills: i64 = conn.query_row("SELECT count(*) FROM bills", [], |r| r.get(0))?;
    let debts = store::list_debts(&conn)?;
    let goals: i64 = conn.query_row("SELECT count(*) FROM savings_goals", [], |r| r.get(0))?;
    let deposits: i64 = conn.query_row(
        "SELECT count(*) FROM one_time_deposits WHERE received = 0",
        [],
        |r| r.get(0),
    )?;
    let paydays: i64 = conn.query_row("SELECT count(*) FROM payday_history", [], |r| r.get(0))?;

    println!();
    println!("Incomes:           {}", incomes.len());
    println!("Bill occurrences:  {bills}");
    println!("Debts:             {}", debts.len());
    println!("Savings goals:     {goals}");
    println!("Pending deposits:  {deposits}");
    println!("Completed paydays: {paydays}");

    let owed: i64 = debts.iter().map(|d| d.balance).sum();
    if owed > 0 {
        println!("Total debt:        {}", money(owed));
    }

    if let Some(event) = next_payday_event(&incomes, crate::cli::today()) {
        println!();
        println!(
            "Next payday: {} ({} expected)",
            event.date,
            money(event.paycheck_amount)
        );
    }

    if let Some(budget) = store::get_budget(&conn)? {
        println!(
            "Bucket balances: bills {} | spending {} | savings {}",
            money(budget.bills_bucket_balance),
            money(budget.spending_bucket_balance),
            money(budget.savings_bucket_balance)
        );
    } else {
        println!();
        println!("No budget set. Run `payplan budget set` to choose your split.");
    }
    Ok(())
}
