use std::collections::HashMap;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::{money, parse_positive_amount, percent_of, Cents};
use crate::models::DebtStrategy;
use crate::planner::monthly_income_estimate;
use crate::store;

pub fn show() -> Result<()> {
    let conn = open_db()?;
    let Some(budget) = store::get_budget(&conn)? else {
        println!("No budget yet. Run `payplan budget set` to create one.");
        return Ok(());
    };

    let mut table = Table::new();
    table.set_header(vec!["Bucket", "Percent", "Carried Balance"]);
    table.add_row(vec![
        Cell::new("Bills"),
        Cell::new(format!("{}%", budget.bills_percentage)),
        Cell::new(money(budget.bills_bucket_balance)),
    ]);
    table.add_row(vec![
        Cell::new("Spending"),
        Cell::new(format!("{}%", budget.spending_percentage)),
        Cell::new(money(budget.spending_bucket_balance)),
    ]);
    table.add_row(vec![
        Cell::new("Savings"),
        Cell::new(format!("{}%", budget.savings_percentage)),
        Cell::new(money(budget.savings_bucket_balance)),
    ]);

    println!("Budget\n{table}");
    println!("Monthly income:  {}", money(budget.monthly_income));
    println!("Debt strategy:   {}", budget.debt_strategy.as_str());
    println!("HYSA:            {}", if budget.has_hysa { "yes" } else { "no" });
    if !budget.has_hysa {
        println!(
            "{}",
            "Tip: your Bills and Savings buckets should sit in a high-yield savings account."
                .yellow()
        );
    }
    Ok(())
}

pub fn set(
    monthly_income: Option<&str>,
    bills_pct: Option<f64>,
    spending_pct: Option<f64>,
    savings_pct: Option<f64>,
    strategy: Option<&str>,
    hysa: Option<bool>,
) -> Result<()> {
    let conn = open_db()?;
    let mut budget = store::get_budget(&conn)?.unwrap_or_default();

    match monthly_income {
        Some(raw) => budget.monthly_income = parse_positive_amount(raw)?,
        None => {
            // Re-derive from income sources (irregular pay never counts).
            let incomes = store::list_incomes(&conn)?;
            if !incomes.is_empty() {
                budget.monthly_income = monthly_income_estimate(&incomes);
            }
        }
    }
    if let Some(pct) = bills_pct {
        budget.bills_percentage = pct;
    }
    if let Some(pct) = spending_pct {
        budget.spending_percentage = pct;
    }
    if let Some(pct) = savings_pct {
        budget.savings_percentage = pct;
    }
    if let Some(raw) = strategy {
        budget.debt_strategy = DebtStrategy::parse(raw)?;
    }
    if let Some(flag) = hysa {
        budget.has_hysa = flag;
    }

    let sum = budget.percentages_sum();
    if (sum - 100.0).abs() > 0.001 {
        println!(
            "{}",
            format!("Warning: bucket percentages sum to {sum}%, not 100%").yellow()
        );
    }

    // Each recurring bill counts once toward the monthly total, not once
    // per generated occurrence.
    let bills = store::list_bills(&conn)?;
    let mut unique: HashMap<&str, Cents> = HashMap::new();
    for bill in &bills {
        unique.entry(bill.name.as_str()).or_insert(bill.amount);
    }
    let monthly_bills: Cents = unique.values().sum();
    let bills_bucket = percent_of(budget.monthly_income, budget.bills_percentage);
    if budget.monthly_income > 0 && monthly_bills > bills_bucket {
        let recommended =
            (monthly_bills as f64 * 100.0 / budget.monthly_income as f64).ceil() as i64;
        println!(
            "{}",
            format!(
                "Warning: your bills total {} but the Bills bucket only gets {} per month \
                 ({} short). Consider --bills-pct {recommended}.",
                money(monthly_bills),
                money(bills_bucket),
                money(monthly_bills - bills_bucket)
            )
            .yellow()
        );
    }

    store::save_budget(&conn, &budget)?;
    println!(
        "Budget saved: {}/{}/{} split, {} strategy",
        budget.bills_percentage,
        budget.spending_percentage,
        budget.savings_percentage,
        budget.debt_strategy.as_str()
    );
    Ok(())
}
