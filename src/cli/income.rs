use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::{money, parse_date, parse_positive_amount};
use crate::models::{normalize_primary, Income, PayFrequency};
use crate::store;

/// Re-establish the single-primary invariant and persist whatever changed.
fn apply_primary(conn: &Connection, promote: Option<i64>) -> Result<()> {
    let mut incomes = store::list_incomes(conn)?;
    for id in normalize_primary(&mut incomes, promote) {
        if let Some(income) = incomes.iter().find(|i| i.id == id) {
            store::update_income(conn, income)?;
        }
    }
    Ok(())
}

pub fn add(
    name: &str,
    amount: &str,
    frequency: &str,
    next_payday: Option<&str>,
    primary: bool,
) -> Result<()> {
    let conn = open_db()?;
    let income = Income {
        id: 0,
        name: name.to_string(),
        paycheck_amount: parse_positive_amount(amount)?,
        pay_frequency: PayFrequency::parse(frequency)?,
        next_payday: next_payday.map(parse_date).transpose()?,
        is_primary: primary,
    };
    let created = store::create_income(&conn, &income)?;
    apply_primary(&conn, primary.then_some(created.id))?;
    println!("Added income: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let incomes = store::list_incomes(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Paycheck", "Frequency", "Next Payday", "Primary"]);
    for income in &incomes {
        table.add_row(vec![
            Cell::new(&income.name),
            Cell::new(money(income.paycheck_amount)),
            Cell::new(income.pay_frequency.as_str()),
            Cell::new(
                income
                    .next_payday
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(if income.is_primary { "yes" } else { "" }),
        ]);
    }
    println!("Income Sources\n{table}");
    Ok(())
}

pub fn edit(
    name: &str,
    amount: Option<&str>,
    frequency: Option<&str>,
    next_payday: Option<&str>,
    primary: bool,
) -> Result<()> {
    let conn = open_db()?;
    let mut income = store::get_income_named(&conn, name)?;

    if let Some(raw) = amount {
        income.paycheck_amount = parse_positive_amount(raw)?;
    }
    if let Some(raw) = frequency {
        income.pay_frequency = PayFrequency::parse(raw)?;
    }
    if let Some(raw) = next_payday {
        income.next_payday = Some(parse_date(raw)?);
    }
    store::update_income(&conn, &income)?;
    apply_primary(&conn, primary.then_some(income.id))?;
    println!("Updated income: {name}");
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = open_db()?;
    let income = store::get_income_named(&conn, name)?;
    store::delete_income(&conn, income.id)?;
    // Deleting the primary promotes the first remaining income.
    apply_primary(&conn, None)?;
    println!("Removed income: {name}");
    Ok(())
}
