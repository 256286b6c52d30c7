use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{PayplanError, Result};
use crate::fmt::{money, parse_amount, parse_date, parse_positive_amount};
use crate::models::SavingsGoal;
use crate::store;

pub fn add(
    name: &str,
    target: &str,
    current: &str,
    target_date: Option<&str>,
    priority: Option<i64>,
) -> Result<()> {
    let conn = open_db()?;
    let current_amount = parse_amount(current)?;
    if current_amount < 0 {
        return Err(PayplanError::Validation(format!(
            "current amount cannot be negative: {current}"
        )));
    }
    store::create_goal(
        &conn,
        &SavingsGoal {
            id: 0,
            name: name.to_string(),
            target_amount: parse_positive_amount(target)?,
            current_amount,
            target_date: target_date.map(parse_date).transpose()?,
            priority,
        },
    )?;
    println!("Added savings goal: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let goals = store::list_goals(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Priority", "Name", "Saved", "Target", "Progress", "Target Date"]);
    for goal in &goals {
        let progress = if goal.target_amount > 0 {
            format!("{}%", (goal.current_amount * 100 / goal.target_amount).clamp(0, 100))
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(goal.priority.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(&goal.name),
            Cell::new(money(goal.current_amount)),
            Cell::new(money(goal.target_amount)),
            Cell::new(progress),
            Cell::new(
                goal.target_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    println!("Savings Goals\n{table}");
    Ok(())
}

pub fn edit(
    name: &str,
    target: Option<&str>,
    current: Option<&str>,
    target_date: Option<&str>,
    priority: Option<i64>,
) -> Result<()> {
    let conn = open_db()?;
    let mut goal = store::get_goal_named(&conn, name)?;

    if let Some(raw) = target {
        goal.target_amount = parse_positive_amount(raw)?;
    }
    if let Some(raw) = current {
        let amount = parse_amount(raw)?;
        if amount < 0 {
            return Err(PayplanError::Validation(format!(
                "current amount cannot be negative: {raw}"
            )));
        }
        goal.current_amount = amount;
    }
    if let Some(raw) = target_date {
        goal.target_date = Some(parse_date(raw)?);
    }
    if priority.is_some() {
        goal.priority = priority;
    }

    store::update_goal(&conn, &goal)?;
    println!("Updated savings goal: {name}");
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = open_db()?;
    let goal = store::get_goal_named(&conn, name)?;
    store::delete_goal(&conn, goal.id)?;
    println!("Removed savings goal: {name}");
    Ok(())
}
