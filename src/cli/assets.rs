use std::collections::HashMap;

use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::{money, parse_date, parse_positive_amount, Cents};
use crate::models::{Asset, AssetType, Debt};
use crate::store;

pub fn add(
    name: &str,
    value: &str,
    asset_type: &str,
    purchase_price: Option<&str>,
    purchase_date: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let conn = open_db()?;
    store::create_asset(
        &conn,
        &Asset {
            id: 0,
            name: name.to_string(),
            asset_type: AssetType::parse(asset_type)?,
            current_value: parse_positive_amount(value)?,
            purchase_price: purchase_price.map(parse_positive_amount).transpose()?,
            purchase_date: purchase_date.map(parse_date).transpose()?,
            notes: notes.map(str::to_string),
        },
    )?;
    println!("Added asset: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let assets = store::list_assets(&conn)?;
    let linked_debts: HashMap<i64, Debt> = store::list_debts(&conn)?
        .into_iter()
        .filter_map(|d| d.linked_asset_id.map(|id| (id, d)))
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["Name", "Type", "Value", "Debt Against", "Equity"]);
    let mut net: Cents = 0;
    for asset in &assets {
        let debt_balance = linked_debts.get(&asset.id).map(|d| d.balance).unwrap_or(0);
        let equity = asset.current_value - debt_balance;
        net += equity;
        table.add_row(vec![
            Cell::new(&asset.name),
            Cell::new(asset.asset_type.as_str()),
            Cell::new(money(asset.current_value)),
            Cell::new(if debt_balance > 0 { money(debt_balance) } else { "-".to_string() }),
            Cell::new(money(equity)),
        ]);
    }
    println!("Assets\n{table}");
    println!("Total equity: {}", money(net));
    Ok(())
}

pub fn edit(
    name: &str,
    value: Option<&str>,
    purchase_price: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let conn = open_db()?;
    let mut asset = store::get_asset_named(&conn, name)?;

    if let Some(raw) = value {
        asset.current_value = parse_positive_amount(raw)?;
    }
    if let Some(raw) = purchase_price {
        asset.purchase_price = Some(parse_positive_amount(raw)?);
    }
    if let Some(raw) = notes {
        asset.notes = Some(raw.to_string());
    }

    store::update_asset(&conn, &asset)?;
    println!("Updated asset: {name}");
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = open_db()?;
    let asset = store::get_asset_named(&conn, name)?;
    store::delete_asset(&conn, asset.id)?;
    println!("Removed asset: {name}");
    Ok(())
}
