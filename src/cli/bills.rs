use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, today};
use crate::error::{PayplanError, Result};
use crate::fmt::{money, parse_date, parse_positive_amount};
use crate::models::{Bill, BillCategory, BillFrequency, NewBill};
use crate::schedule::{ensure_horizon, horizon_end};
use crate::store;

#[allow(clippy::too_many_arguments)]
pub fn add(
    name: &str,
    amount: &str,
    due: &str,
    category: &str,
    frequency: &str,
    late_by: Option<&str>,
    autopay: bool,
    variable: bool,
    notes: Option<&str>,
) -> Result<()> {
    let mut conn = open_db()?;
    let due_date = parse_date(due)?;
    let late_by_date = late_by.map(parse_date).transpose()?;
    if let Some(late) = late_by_date {
        if late < due_date {
            return Err(PayplanError::Validation(format!(
                "late-by date {late} is before the due date {due_date}"
            )));
        }
    }

    store::create_bill(
        &conn,
        &NewBill {
            name: name.to_string(),
            amount: parse_positive_amount(amount)?,
            is_variable: variable,
            due_date,
            late_by_date,
            category: BillCategory::parse(category)?,
            is_autopay: autopay,
            frequency: BillFrequency::parse(frequency)?,
            notes: notes.map(str::to_string),
        },
    )?;

    let generated = ensure_horizon(&mut conn, today())?;
    println!("Added bill: {name} ({generated} future occurrences generated)");
    Ok(())
}

fn status_cell(bill: &Bill, today: chrono::NaiveDate) -> Cell {
    if bill.last_paid_date.is_some() {
        Cell::new("paid")
    } else if today > bill.late_by_or_due() {
        Cell::new("late")
    } else if bill.due_date < today {
        Cell::new("overdue")
    } else {
        Cell::new("")
    }
}

pub fn list(all: bool) -> Result<()> {
    let mut conn = open_db()?;
    let today = today();
    ensure_horizon(&mut conn, today)?;

    let horizon = horizon_end(today);
    let bills: Vec<Bill> = store::list_bills(&conn)?
        .into_iter()
        .filter(|b| all || b.due_date <= horizon)
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["Due", "Name", "Amount", "Category", "Frequency", "Autopay", "Status"]);
    for bill in &bills {
        table.add_row(vec![
            Cell::new(bill.due_date),
            Cell::new(&bill.name),
            Cell::new(money(bill.amount)),
            Cell::new(bill.category.as_str()),
            Cell::new(bill.frequency.as_str()),
            Cell::new(if bill.is_autopay { "auto" } else { "" }),
            status_cell(bill, today),
        ]);
    }
    println!("Bills\n{table}");

    let owed: i64 = bills
        .iter()
        .filter(|b| b.last_paid_date.is_none())
        .map(|b| b.amount)
        .sum();
    println!("Unpaid in window: {}", money(owed).bold());
    Ok(())
}

/// Pick the occurrence to toggle: an exact due date when given, otherwise the
/// earliest one in the wanted paid-state.
fn find_occurrence(
    conn: &rusqlite::Connection,
    name: &str,
    due: Option<&str>,
    paid: bool,
) -> Result<Bill> {
    let occurrences = store::list_bills_named(conn, name)?;
    if occurrences.is_empty() {
        return Err(PayplanError::NotFound(format!("bill {name}")));
    }
    if let Some(raw) = due {
        let due_date = parse_date(raw)?;
        return occurrences
            .into_iter()
            .find(|b| b.due_date == due_date)
            .ok_or_else(|| PayplanError::NotFound(format!("bill {name} due {due_date}")));
    }
    occurrences
        .into_iter()
        .find(|b| b.last_paid_date.is_some() == paid)
        .ok_or_else(|| {
            let state = if paid { "paid" } else { "unpaid" };
            PayplanError::NotFound(format!("no {state} occurrence of bill {name}"))
        })
}

pub fn pay(name: &str, due: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let mut bill = find_occurrence(&conn, name, due, false)?;
    bill.last_paid_date = Some(today());
    store::update_bill(&conn, &bill)?;
    println!("Marked {} (due {}) paid", bill.name, bill.due_date);
    Ok(())
}

pub fn unpay(name: &str, due: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let mut bill = find_occurrence(&conn, name, due, true)?;
    bill.last_paid_date = None;
    store::update_bill(&conn, &bill)?;
    println!("Cleared paid mark on {} (due {})", bill.name, bill.due_date);
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = open_db()?;
    let removed = store::delete_bill_series(&conn, name)?;
    println!("Removed {name} ({removed} occurrences)");
    Ok(())
}
