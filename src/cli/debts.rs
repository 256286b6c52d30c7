use std::collections::HashMap;

use chrono::Duration;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::cli::{open_db, today};
use crate::error::{PayplanError, Result};
use crate::fmt::{money, parse_positive_amount, Cents};
use crate::models::{Asset, Debt, DebtType, NewDebt};
use crate::schedule::{companion_bills, late_day_after_due};
use crate::store;

fn validate_day(day: u32, what: &str) -> Result<u32> {
    if !(1..=31).contains(&day) {
        return Err(PayplanError::Validation(format!("{what} must be 1-31, got {day}")));
    }
    Ok(day)
}

/// Bring the `"{name} Payment"` bill series in line with the debt's minimum
/// payment: create the series when missing, otherwise rewrite each occurrence.
fn sync_payment_bills(conn: &mut Connection, debt: &Debt) -> Result<()> {
    let Some(minimum) = debt.minimum_payment else {
        return Ok(());
    };

    let existing = store::list_bills_named(conn, &debt.payment_bill_name())?;
    if existing.is_empty() {
        let series = companion_bills(&debt.name, minimum, debt.due_day, today());
        store::bulk_create_bills(conn, &series)?;
        return Ok(());
    }

    for mut bill in existing {
        bill.amount = minimum;
        bill.late_by_date = Some(bill.due_date + Duration::days(30));
        bill.category = crate::models::BillCategory::DebtPayments;
        bill.frequency = crate::models::BillFrequency::Monthly;
        bill.notes = Some(format!("Auto-generated from debt: {}", debt.name));
        store::update_bill(conn, &bill)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    name: &str,
    balance: &str,
    apr: f64,
    due_day: u32,
    minimum_payment: Option<&str>,
    original_balance: Option<&str>,
    late_by_day: Option<u32>,
    statement_day: Option<u32>,
    debt_type: &str,
    credit_limit: Option<&str>,
    linked_asset: Option<&str>,
) -> Result<()> {
    let mut conn = open_db()?;
    if apr < 0.0 {
        return Err(PayplanError::Validation(format!("APR cannot be negative: {apr}")));
    }
    validate_day(due_day, "due day")?;
    if let Some(day) = late_by_day {
        validate_day(day, "late-by day")?;
    }
    if let Some(day) = statement_day {
        validate_day(day, "statement day")?;
    }

    let balance = parse_positive_amount(balance)?;
    let linked_asset_id = linked_asset
        .map(|asset_name| store::get_asset_named(&conn, asset_name).map(|a| a.id))
        .transpose()?;

    // Asset-backed debts derive their late-by day: 30 days past the due day.
    let late_by_day = if linked_asset_id.is_some() {
        Some(late_day_after_due(due_day))
    } else {
        late_by_day
    };

    let debt = store::create_debt(
        &conn,
        &NewDebt {
            name: name.to_string(),
            balance,
            original_balance: original_balance
                .map(parse_positive_amount)
                .transpose()?
                .unwrap_or(balance),
            minimum_payment: minimum_payment.map(parse_positive_amount).transpose()?,
            apr,
            due_day,
            late_by_day,
            statement_day,
            debt_type: DebtType::parse(debt_type)?,
            credit_limit: credit_limit.map(parse_positive_amount).transpose()?,
            linked_asset_id,
        },
    )?;

    sync_payment_bills(&mut conn, &debt)?;
    if debt.minimum_payment.is_some() {
        println!("Added debt: {name} (with monthly \"{}\" bill)", debt.payment_bill_name());
    } else {
        println!("Added debt: {name}");
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let debts = store::list_debts(&conn)?;
    let assets: HashMap<i64, Asset> = store::list_assets(&conn)?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["Name", "Type", "Balance", "APR", "Min Payment", "Due Day", "Paid Off", "Asset"]);
    for debt in &debts {
        let linked = debt.linked_asset_id.and_then(|id| assets.get(&id));
        let paid_off = debt
            .percent_paid(linked.and_then(|a| a.purchase_price))
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&debt.name),
            Cell::new(debt.debt_type.as_str()),
            Cell::new(money(debt.balance)),
            Cell::new(format!("{:.2}%", debt.apr)),
            Cell::new(
                debt.minimum_payment
                    .map(money)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(debt.due_day),
            Cell::new(paid_off),
            Cell::new(linked.map(|a| a.name.as_str()).unwrap_or("")),
        ]);
    }
    println!("Debts\n{table}");

    let total: Cents = debts.iter().map(|d| d.balance).sum();
    println!("Total owed: {}", money(total));

    for debt in &debts {
        if let Some(asset) = debt.linked_asset_id.and_then(|id| assets.get(&id)) {
            let equity = asset.current_value - debt.balance;
            println!("{}: {} equity in {}", debt.name, money(equity), asset.name);
        }
    }
    Ok(())
}

pub fn edit(
    name: &str,
    balance: Option<&str>,
    apr: Option<f64>,
    due_day: Option<u32>,
    minimum_payment: Option<&str>,
    credit_limit: Option<&str>,
    statement_day: Option<u32>,
) -> Result<()> {
    let mut conn = open_db()?;
    let mut debt = store::get_debt_named(&conn, name)?;

    if let Some(raw) = balance {
        debt.balance = parse_positive_amount(raw)?;
        debt.original_balance = debt.original_balance.max(debt.balance);
    }
    if let Some(raw) = apr {
        if raw < 0.0 {
            return Err(PayplanError::Validation(format!("APR cannot be negative: {raw}")));
        }
        debt.apr = raw;
    }
    if let Some(day) = due_day {
        debt.due_day = validate_day(day, "due day")?;
        if debt.linked_asset_id.is_some() {
            debt.late_by_day = Some(late_day_after_due(day));
        }
    }
    if let Some(raw) = minimum_payment {
        debt.minimum_payment = Some(parse_positive_amount(raw)?);
    }
    if let Some(raw) = credit_limit {
        debt.credit_limit = Some(parse_positive_amount(raw)?);
    }
    if let Some(day) = statement_day {
        debt.statement_day = Some(validate_day(day, "statement day")?);
    }

    store::update_debt(&conn, &debt)?;
    sync_payment_bills(&mut conn, &debt)?;
    println!("Updated debt: {name}");
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = open_db()?;
    let debt = store::get_debt_named(&conn, name)?;

    // The companion bill series goes with the debt.
    match store::delete_bill_series(&conn, &debt.payment_bill_name()) {
        Ok(_) | Err(PayplanError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }
    store::delete_debt(&conn, debt.id)?;
    println!("Removed debt: {name}");
    Ok(())
}
