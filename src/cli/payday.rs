use std::io::{self, BufRead, Write};

use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::cli::{open_db, parse_overrides, today};
use crate::error::{PayplanError, Result};
use crate::fmt::money;
use crate::models::UserBudget;
use crate::payday::complete_payday;
use crate::planner::{build_plan, next_payday_event, AllocationMode, PaydayPlan};
use crate::schedule::ensure_horizon;
use crate::store;

fn load_plan(
    conn: &mut Connection,
    debts: &[String],
    goals: &[String],
) -> Result<(Option<PaydayPlan>, Option<UserBudget>)> {
    let today = today();
    ensure_horizon(conn, today)?;

    let custom = parse_overrides(debts, goals)?;
    let budget = store::get_budget(conn)?;
    let plan = build_plan(
        budget.as_ref(),
        &store::list_incomes(conn)?,
        &store::list_bills(conn)?,
        &store::list_debts(conn)?,
        &store::list_goals(conn)?,
        today,
        (!custom.is_empty()).then_some(&custom),
    )?;
    Ok((plan, budget))
}

fn render(plan: &PaydayPlan, budget: Option<&UserBudget>) {
    let date = plan.event.date.format("%A, %B %-d").to_string();
    println!("{} ({} pay)", date.bold(), plan.event.frequency_label());
    println!(
        "Expected paycheck: {}",
        money(plan.event.paycheck_amount).green().bold()
    );
    if plan.event.incomes.len() > 1 {
        for income in &plan.event.incomes {
            println!("  {}: {}", income.name, money(income.paycheck_amount));
        }
    }
    if budget.is_none() {
        println!(
            "{}",
            "No budget set; every bucket is $0. Run `payplan budget set`.".yellow()
        );
    }
    println!();

    let carried = (
        budget.map(|b| b.bills_bucket_balance).unwrap_or(0),
        budget.map(|b| b.spending_bucket_balance).unwrap_or(0),
        budget.map(|b| b.savings_bucket_balance).unwrap_or(0),
    );
    let mut buckets = Table::new();
    buckets.set_header(vec!["Bucket", "Amount", "Carried In"]);
    buckets.add_row(vec![
        Cell::new("Bills"),
        Cell::new(money(plan.buckets.bills)),
        Cell::new(money(carried.0)),
    ]);
    buckets.add_row(vec![
        Cell::new("Spending"),
        Cell::new(money(plan.buckets.spending)),
        Cell::new(money(carried.1)),
    ]);
    buckets.add_row(vec![
        Cell::new("Savings"),
        Cell::new(money(plan.buckets.savings)),
        Cell::new(money(carried.2)),
    ]);
    println!("Buckets\n{buckets}");
    println!();

    if plan.bills.due_now.is_empty() {
        println!("{}", "No bills due this check!".green());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Pay Now", "Due", "Amount", ""]);
        for bill in &plan.bills.due_now {
            let mut flags = Vec::new();
            if bill.is_autopay {
                flags.push("autopay".to_string());
            }
            if let Some(late) = bill.late_by_date {
                flags.push(format!("late by {late}"));
            }
            table.add_row(vec![
                Cell::new(&bill.name),
                Cell::new(bill.due_date),
                Cell::new(money(bill.amount)),
                Cell::new(flags.join(", ")),
            ]);
        }
        println!("{table}");
        println!("Paying now: {}", money(plan.bills.total_due_now));
    }
    for bill in &plan.bills.skipped {
        println!(
            "{}",
            format!(
                "Deferred (doesn't fit the bucket): {} {} due {}",
                bill.name,
                money(bill.amount),
                bill.due_date
            )
            .yellow()
        );
    }
    println!("Bills carried to next payday: {}", money(plan.bills.unallocated).bold());
    println!();

    let mode = match plan.savings.mode {
        AllocationMode::Auto => "auto",
        AllocationMode::Custom => "custom",
    };
    println!(
        "Savings allocation ({mode}): {} available",
        money(plan.savings.available).bold()
    );
    if !plan.savings.debts.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Extra Debt Payment", "Amount", "Balance", "APR"]);
        for alloc in &plan.savings.debts {
            table.add_row(vec![
                Cell::new(&alloc.debt.name),
                Cell::new(money(alloc.amount)),
                Cell::new(money(alloc.debt.balance)),
                Cell::new(format!("{:.2}%", alloc.debt.apr)),
            ]);
        }
        println!("{table}");
    }
    if !plan.savings.goals.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Goal Deposit", "Amount", "Saved", "Target"]);
        for alloc in &plan.savings.goals {
            table.add_row(vec![
                Cell::new(&alloc.goal.name),
                Cell::new(money(alloc.amount)),
                Cell::new(money(alloc.goal.current_amount)),
                Cell::new(money(alloc.goal.target_amount)),
            ]);
        }
        println!("{table}");
    }
    println!(
        "To debt {} | to goals {} | unallocated {}",
        money(plan.savings.debt_total),
        money(plan.savings.goal_total),
        money(plan.savings.unallocated).bold()
    );
    if plan.savings.is_over {
        println!(
            "{}",
            format!(
                "Allocations total {} but only {} is available. Reduce amounts before completing.",
                money(plan.savings.total_allocated()),
                money(plan.savings.available)
            )
            .red()
            .bold()
        );
    }
}

pub fn plan(debts: Vec<String>, goals: Vec<String>) -> Result<()> {
    let mut conn = open_db()?;
    match load_plan(&mut conn, &debts, &goals)? {
        (None, _) => {
            println!("No payday scheduled. Give an income a next payday:");
            println!("  payplan income edit \"My Job\" --next-payday 2026-08-21");
            Ok(())
        }
        (Some(plan), budget) => {
            render(&plan, budget.as_ref());
            Ok(())
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn complete(yes: bool, debts: Vec<String>, goals: Vec<String>) -> Result<()> {
    let mut conn = open_db()?;
    let (plan, budget) = load_plan(&mut conn, &debts, &goals)?;
    let Some(plan) = plan else {
        return Err(PayplanError::Precondition(
            "no upcoming payday; set an income's next payday first".to_string(),
        ));
    };

    render(&plan, budget.as_ref());
    println!();

    if !yes
        && !confirm("Mark this payday complete? This records allocations and advances your next payday.")?
    {
        println!("Aborted; nothing was written.");
        return Ok(());
    }

    complete_payday(&mut conn, &plan)?;
    println!("{}", "Payday marked complete!".green().bold());

    let incomes = store::list_incomes(&conn)?;
    if let Some(next) = next_payday_event(&incomes, today()) {
        println!("Next payday: {}", next.date);
    }
    Ok(())
}

pub fn history() -> Result<()> {
    let conn = open_db()?;
    let records = store::list_history(&conn)?;
    if records.is_empty() {
        println!("No payday history yet. Complete your first payday to see it here.");
        return Ok(());
    }

    for record in &records {
        let date = record.payday_date.format("%A, %B %-d, %Y").to_string();
        println!(
            "{} - paycheck {}",
            date.bold(),
            money(record.paycheck_amount).green()
        );
        println!(
            "  Buckets: bills {} | spending {} | savings {}",
            money(record.bills_amount),
            money(record.spending_amount),
            money(record.savings_amount)
        );
        if !record.bills_allocated.is_empty() {
            println!("  Bills paid:");
            for bill in &record.bills_allocated {
                let autopay = if bill.was_autopay { " (autopay)" } else { "" };
                println!(
                    "    {} {}{autopay}",
                    bill.bill_name,
                    money(bill.amount_allocated)
                );
            }
        }
        if !record.debts_allocated.is_empty() {
            println!("  Debt payments:");
            for debt in &record.debts_allocated {
                println!("    {} {}", debt.debt_name, money(debt.amount_allocated));
            }
        }
        if !record.savings_goals_allocated.is_empty() {
            println!("  Goal deposits:");
            for goal in &record.savings_goals_allocated {
                println!("    {} {}", goal.goal_name, money(goal.amount_allocated));
            }
        }
        if record.bills_unallocated > 0 || record.savings_unallocated > 0 {
            println!(
                "  Carried forward: bills {}, savings {}",
                money(record.bills_unallocated),
                money(record.savings_unallocated)
            );
        }
        println!();
    }
    Ok(())
}
