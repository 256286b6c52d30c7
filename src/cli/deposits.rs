use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, today};
use crate::error::Result;
use crate::fmt::{money, parse_date, parse_positive_amount};
use crate::models::OneTimeDeposit;
use crate::payday::receive_deposit;
use crate::store;

pub fn add(name: &str, amount: &str, expected: &str, notes: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    store::create_deposit(
        &conn,
        &OneTimeDeposit {
            id: 0,
            name: name.to_string(),
            amount: parse_positive_amount(amount)?,
            expected_date: parse_date(expected)?,
            notes: notes.map(str::to_string),
            received: false,
            received_date: None,
        },
    )?;
    println!("Added deposit: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let deposits = store::list_deposits(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Amount", "Expected", "Status"]);
    for deposit in &deposits {
        let status = match deposit.received_date {
            Some(d) => format!("received {d}"),
            None if deposit.received => "received".to_string(),
            None => "pending".to_string(),
        };
        table.add_row(vec![
            Cell::new(&deposit.name),
            Cell::new(money(deposit.amount)),
            Cell::new(deposit.expected_date),
            Cell::new(status),
        ]);
    }
    println!("One-Time Deposits\n{table}");
    Ok(())
}

pub fn edit(
    name: &str,
    amount: Option<&str>,
    expected: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let conn = open_db()?;
    let mut deposit = store::get_deposit_named(&conn, name)?;

    if let Some(raw) = amount {
        deposit.amount = parse_positive_amount(raw)?;
    }
    if let Some(raw) = expected {
        deposit.expected_date = parse_date(raw)?;
    }
    if let Some(raw) = notes {
        deposit.notes = Some(raw.to_string());
    }

    store::update_deposit(&conn, &deposit)?;
    println!("Updated deposit: {name}");
    Ok(())
}

pub fn receive(name: &str) -> Result<()> {
    let mut conn = open_db()?;
    let deposit = store::get_deposit_named(&conn, name)?;
    let shares = receive_deposit(&mut conn, &deposit, today())?;

    println!("Received {}: {}", deposit.name, money(deposit.amount).bold());
    println!("  Bills bucket    +{}", money(shares.bills));
    println!("  Spending bucket +{}", money(shares.spending));
    println!("  Savings bucket  +{}", money(shares.savings));
    if shares.bills + shares.spending + shares.savings == 0 {
        println!("{}", "No budget set, so nothing was split into buckets.".yellow());
    }
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = open_db()?;
    let deposit = store::get_deposit_named(&conn, name)?;
    store::delete_deposit(&conn, deposit.id)?;
    println!("Removed deposit: {name}");
    Ok(())
}
