//! Typed CRUD over the SQLite store, one group of functions per entity.
//!
//! `update_*`/`delete_*` report a missing id as NotFound. History is
//! append-only and reads back at most the 10 most recent paydays.

use rusqlite::{params, Connection, Row};

use crate::error::{PayplanError, Result};
use crate::fmt::Cents;
use crate::models::{
    Asset, Bill, Debt, Income, NewBill, NewDebt, OneTimeDeposit, PaydayRecord, SavingsGoal,
    UserBudget,
};

fn not_found(what: &str, key: impl std::fmt::Display) -> PayplanError {
    PayplanError::NotFound(format!("{what} {key}"))
}

// ---------------------------------------------------------------------------
// Budget (zero or one row, id fixed at 1)
// ---------------------------------------------------------------------------

fn budget_from_row(row: &Row) -> rusqlite::Result<UserBudget> {
    Ok(UserBudget {
        monthly_income: row.get(0)?,
        bills_percentage: row.get(1)?,
        spending_percentage: row.get(2)?,
        savings_percentage: row.get(3)?,
        bills_bucket_balance: row.get(4)?,
        spending_bucket_balance: row.get(5)?,
        savings_bucket_balance: row.get(6)?,
        debt_strategy: row.get(7)?,
        has_hysa: row.get(8)?,
    })
}

pub fn get_budget(conn: &Connection) -> Result<Option<UserBudget>> {
    let mut stmt = conn.prepare(
        "SELECT monthly_income, bills_percentage, spending_percentage, savings_percentage, \
         bills_bucket_balance, spending_bucket_balance, savings_bucket_balance, \
         debt_strategy, has_hysa FROM user_budget WHERE id = 1",
    )?;
    let mut rows = stmt.query_map([], budget_from_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn save_budget(conn: &Connection, budget: &UserBudget) -> Result<()> {
    conn.execute(
        "INSERT INTO user_budget (id, monthly_income, bills_percentage, spending_percentage, \
         savings_percentage, bills_bucket_balance, spending_bucket_balance, \
         savings_bucket_balance, debt_strategy, has_hysa) \
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         ON CONFLICT(id) DO UPDATE SET \
         monthly_income = ?1, bills_percentage = ?2, spending_percentage = ?3, \
         savings_percentage = ?4, bills_bucket_balance = ?5, spending_bucket_balance = ?6, \
         savings_bucket_balance = ?7, debt_strategy = ?8, has_hysa = ?9, \
         updated_at = datetime('now')",
        params![
            budget.monthly_income,
            budget.bills_percentage,
            budget.spending_percentage,
            budget.savings_percentage,
            budget.bills_bucket_balance,
            budget.spending_bucket_balance,
            budget.savings_bucket_balance,
            budget.debt_strategy,
            budget.has_hysa,
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Incomes
// ---------------------------------------------------------------------------

const INCOME_COLS: &str = "id, name, paycheck_amount, pay_frequency, next_payday, is_primary";

fn income_from_row(row: &Row) -> rusqlite::Result<Income> {
    Ok(Income {
        id: row.get(0)?,
        name: row.get(1)?,
        paycheck_amount: row.get(2)?,
        pay_frequency: row.get(3)?,
        next_payday: row.get(4)?,
        is_primary: row.get(5)?,
    })
}

pub fn list_incomes(conn: &Connection) -> Result<Vec<Income>> {
    let mut stmt = conn.prepare(&format!("SELECT {INCOME_COLS} FROM incomes ORDER BY id"))?;
    let rows = stmt.query_map([], income_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_income_named(conn: &Connection, name: &str) -> Result<Income> {
    let mut stmt =
        conn.prepare(&format!("SELECT {INCOME_COLS} FROM incomes WHERE name = ?1 LIMIT 1"))?;
    let mut rows = stmt.query_map([name], income_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(not_found("income", name)),
    }
}

pub fn create_income(conn: &Connection, income: &Income) -> Result<Income> {
    conn.execute(
        "INSERT INTO incomes (name, paycheck_amount, pay_frequency, next_payday, is_primary) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            income.name,
            income.paycheck_amount,
            income.pay_frequency,
            income.next_payday,
            income.is_primary,
        ],
    )?;
    let mut created = income.clone();
    created.id = conn.last_insert_rowid();
    Ok(created)
}

pub fn update_income(conn: &Connection, income: &Income) -> Result<()> {
    let n = conn.execute(
        "UPDATE incomes SET name = ?1, paycheck_amount = ?2, pay_frequency = ?3, \
         next_payday = ?4, is_primary = ?5, updated_at = datetime('now') WHERE id = ?6",
        params![
            income.name,
            income.paycheck_amount,
            income.pay_frequency,
            income.next_payday,
            income.is_primary,
            income.id,
        ],
    )?;
    if n == 0 {
        return Err(not_found("income id", income.id));
    }
    Ok(())
}

pub fn delete_income(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM incomes WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(not_found("income id", id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

const BILL_COLS: &str = "id, name, amount, is_variable, due_date, late_by_date, category, \
                         is_autopay, frequency, notes, last_paid_date, allocated_amount, \
                         last_allocated_date";

fn bill_from_row(row: &Row) -> rusqlite::Result<Bill> {
    Ok(Bill {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        is_variable: row.get(3)?,
        due_date: row.get(4)?,
        late_by_date: row.get(5)?,
        category: row.get(6)?,
        is_autopay: row.get(7)?,
        frequency: row.get(8)?,
        notes: row.get(9)?,
        last_paid_date: row.get(10)?,
        allocated_amount: row.get(11)?,
        last_allocated_date: row.get(12)?,
    })
}

pub fn list_bills(conn: &Connection) -> Result<Vec<Bill>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {BILL_COLS} FROM bills ORDER BY due_date, name"))?;
    let rows = stmt.query_map([], bill_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn list_bills_named(conn: &Connection, name: &str) -> Result<Vec<Bill>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BILL_COLS} FROM bills WHERE name = ?1 ORDER BY due_date"
    ))?;
    let rows = stmt.query_map([name], bill_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn create_bill(conn: &Connection, bill: &NewBill) -> Result<Bill> {
    conn.execute(
        "INSERT INTO bills (name, amount, is_variable, due_date, late_by_date, category, \
         is_autopay, frequency, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            bill.name,
            bill.amount,
            bill.is_variable,
            bill.due_date,
            bill.late_by_date,
            bill.category,
            bill.is_autopay,
            bill.frequency,
            bill.notes,
        ],
    )?;
    let id = conn.last_insert_rowid();
    let mut stmt = conn.prepare(&format!("SELECT {BILL_COLS} FROM bills WHERE id = ?1"))?;
    Ok(stmt.query_row([id], bill_from_row)?)
}

/// Insert a batch of generated occurrences in one flush.
pub fn bulk_create_bills(conn: &mut Connection, bills: &[NewBill]) -> Result<usize> {
    let tx = conn.transaction()?;
    for bill in bills {
        tx.execute(
            "INSERT INTO bills (name, amount, is_variable, due_date, late_by_date, category, \
             is_autopay, frequency, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                bill.name,
                bill.amount,
                bill.is_variable,
                bill.due_date,
                bill.late_by_date,
                bill.category,
                bill.is_autopay,
                bill.frequency,
                bill.notes,
            ],
        )?;
    }
    tx.commit()?;
    Ok(bills.len())
}

pub fn update_bill(conn: &Connection, bill: &Bill) -> Result<()> {
    let n = conn.execute(
        "UPDATE bills SET name = ?1, amount = ?2, is_variable = ?3, due_date = ?4, \
         late_by_date = ?5, category = ?6, is_autopay = ?7, frequency = ?8, notes = ?9, \
         last_paid_date = ?10, allocated_amount = ?11, last_allocated_date = ?12, \
         updated_at = datetime('now') WHERE id = ?13",
        params![
            bill.name,
            bill.amount,
            bill.is_variable,
            bill.due_date,
            bill.late_by_date,
            bill.category,
            bill.is_autopay,
            bill.frequency,
            bill.notes,
            bill.last_paid_date,
            bill.allocated_amount,
            bill.last_allocated_date,
            bill.id,
        ],
    )?;
    if n == 0 {
        return Err(not_found("bill id", bill.id));
    }
    Ok(())
}

pub fn delete_bill(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM bills WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(not_found("bill id", id));
    }
    Ok(())
}

/// Deleting a recurring bill means deleting every same-named occurrence.
pub fn delete_bill_series(conn: &Connection, name: &str) -> Result<usize> {
    let n = conn.execute("DELETE FROM bills WHERE name = ?1", [name])?;
    if n == 0 {
        return Err(not_found("bill", name));
    }
    Ok(n)
}

// ---------------------------------------------------------------------------
// Debts
// ---------------------------------------------------------------------------

const DEBT_COLS: &str = "id, name, balance, original_balance, minimum_payment, apr, due_day, \
                         late_by_day, statement_day, debt_type, credit_limit, linked_asset_id";

fn debt_from_row(row: &Row) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        original_balance: row.get(3)?,
        minimum_payment: row.get(4)?,
        apr: row.get(5)?,
        due_day: row.get(6)?,
        late_by_day: row.get(7)?,
        statement_day: row.get(8)?,
        debt_type: row.get(9)?,
        credit_limit: row.get(10)?,
        linked_asset_id: row.get(11)?,
    })
}

pub fn list_debts(conn: &Connection) -> Result<Vec<Debt>> {
    let mut stmt = conn.prepare(&format!("SELECT {DEBT_COLS} FROM debts ORDER BY id"))?;
    let rows = stmt.query_map([], debt_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_debt_named(conn: &Connection, name: &str) -> Result<Debt> {
    let mut stmt =
        conn.prepare(&format!("SELECT {DEBT_COLS} FROM debts WHERE name = ?1 LIMIT 1"))?;
    let mut rows = stmt.query_map([name], debt_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(not_found("debt", name)),
    }
}

pub fn create_debt(conn: &Connection, debt: &NewDebt) -> Result<Debt> {
    conn.execute(
        "INSERT INTO debts (name, balance, original_balance, minimum_payment, apr, due_day, \
         late_by_day, statement_day, debt_type, credit_limit, linked_asset_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            debt.name,
            debt.balance,
            debt.original_balance,
            debt.minimum_payment,
            debt.apr,
            debt.due_day,
            debt.late_by_day,
            debt.statement_day,
            debt.debt_type,
            debt.credit_limit,
            debt.linked_asset_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    let mut stmt = conn.prepare(&format!("SELECT {DEBT_COLS} FROM debts WHERE id = ?1"))?;
    Ok(stmt.query_row([id], debt_from_row)?)
}

pub fn update_debt(conn: &Connection, debt: &Debt) -> Result<()> {
    let n = conn.execute(
        "UPDATE debts SET name = ?1, balance = ?2, original_balance = ?3, minimum_payment = ?4, \
         apr = ?5, due_day = ?6, late_by_day = ?7, statement_day = ?8, debt_type = ?9, \
         credit_limit = ?10, linked_asset_id = ?11, updated_at = datetime('now') WHERE id = ?12",
        params![
            debt.name,
            debt.balance,
            debt.original_balance,
            debt.minimum_payment,
            debt.apr,
            debt.due_day,
            debt.late_by_day,
            debt.statement_day,
            debt.debt_type,
            debt.credit_limit,
            debt.linked_asset_id,
            debt.id,
        ],
    )?;
    if n == 0 {
        return Err(not_found("debt id", debt.id));
    }
    Ok(())
}

pub fn delete_debt(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM debts WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(not_found("debt id", id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

const ASSET_COLS: &str = "id, name, asset_type, current_value, purchase_price, purchase_date, notes";

fn asset_from_row(row: &Row) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        asset_type: row.get(2)?,
        current_value: row.get(3)?,
        purchase_price: row.get(4)?,
        purchase_date: row.get(5)?,
        notes: row.get(6)?,
    })
}

pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!("SELECT {ASSET_COLS} FROM assets ORDER BY id"))?;
    let rows = stmt.query_map([], asset_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_asset_named(conn: &Connection, name: &str) -> Result<Asset> {
    let mut stmt =
        conn.prepare(&format!("SELECT {ASSET_COLS} FROM assets WHERE name = ?1 LIMIT 1"))?;
    let mut rows = stmt.query_map([name], asset_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(not_found("asset", name)),
    }
}

pub fn create_asset(conn: &Connection, asset: &Asset) -> Result<Asset> {
    conn.execute(
        "INSERT INTO assets (name, asset_type, current_value, purchase_price, purchase_date, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            asset.name,
            asset.asset_type,
            asset.current_value,
            asset.purchase_price,
            asset.purchase_date,
            asset.notes,
        ],
    )?;
    let mut created = asset.clone();
    created.id = conn.last_insert_rowid();
    Ok(created)
}

pub fn update_asset(conn: &Connection, asset: &Asset) -> Result<()> {
    let n = conn.execute(
        "UPDATE assets SET name = ?1, asset_type = ?2, current_value = ?3, purchase_price = ?4, \
         purchase_date = ?5, notes = ?6, updated_at = datetime('now') WHERE id = ?7",
        params![
            asset.name,
            asset.asset_type,
            asset.current_value,
            asset.purchase_price,
            asset.purchase_date,
            asset.notes,
            asset.id,
        ],
    )?;
    if n == 0 {
        return Err(not_found("asset id", asset.id));
    }
    Ok(())
}

pub fn delete_asset(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM assets WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(not_found("asset id", id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Savings goals
// ---------------------------------------------------------------------------

const GOAL_COLS: &str = "id, name, target_amount, current_amount, target_date, priority";

fn goal_from_row(row: &Row) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        current_amount: row.get(3)?,
        target_date: row.get(4)?,
        priority: row.get(5)?,
    })
}

pub fn list_goals(conn: &Connection) -> Result<Vec<SavingsGoal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLS} FROM savings_goals ORDER BY priority IS NULL, priority, id"
    ))?;
    let rows = stmt.query_map([], goal_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_goal_named(conn: &Connection, name: &str) -> Result<SavingsGoal> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLS} FROM savings_goals WHERE name = ?1 LIMIT 1"
    ))?;
    let mut rows = stmt.query_map([name], goal_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(not_found("savings goal", name)),
    }
}

pub fn create_goal(conn: &Connection, goal: &SavingsGoal) -> Result<SavingsGoal> {
    conn.execute(
        "INSERT INTO savings_goals (name, target_amount, current_amount, target_date, priority) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            goal.name,
            goal.target_amount,
            goal.current_amount,
            goal.target_date,
            goal.priority,
        ],
    )?;
    let mut created = goal.clone();
    created.id = conn.last_insert_rowid();
    Ok(created)
}

pub fn update_goal(conn: &Connection, goal: &SavingsGoal) -> Result<()> {
    let n = conn.execute(
        "UPDATE savings_goals SET name = ?1, target_amount = ?2, current_amount = ?3, \
         target_date = ?4, priority = ?5, updated_at = datetime('now') WHERE id = ?6",
        params![
            goal.name,
            goal.target_amount,
            goal.current_amount,
            goal.target_date,
            goal.priority,
            goal.id,
        ],
    )?;
    if n == 0 {
        return Err(not_found("savings goal id", goal.id));
    }
    Ok(())
}

pub fn delete_goal(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM savings_goals WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(not_found("savings goal id", id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// One-time deposits
// ---------------------------------------------------------------------------

const DEPOSIT_COLS: &str = "id, name, amount, expected_date, notes, received, received_date";

fn deposit_from_row(row: &Row) -> rusqlite::Result<OneTimeDeposit> {
    Ok(OneTimeDeposit {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        expected_date: row.get(3)?,
        notes: row.get(4)?,
        received: row.get(5)?,
        received_date: row.get(6)?,
    })
}

pub fn list_deposits(conn: &Connection) -> Result<Vec<OneTimeDeposit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEPOSIT_COLS} FROM one_time_deposits ORDER BY expected_date, id"
    ))?;
    let rows = stmt.query_map([], deposit_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_deposit_named(conn: &Connection, name: &str) -> Result<OneTimeDeposit> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEPOSIT_COLS} FROM one_time_deposits WHERE name = ?1 LIMIT 1"
    ))?;
    let mut rows = stmt.query_map([name], deposit_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(not_found("deposit", name)),
    }
}

pub fn create_deposit(conn: &Connection, deposit: &OneTimeDeposit) -> Result<OneTimeDeposit> {
    conn.execute(
        "INSERT INTO one_time_deposits (name, amount, expected_date, notes, received, received_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            deposit.name,
            deposit.amount,
            deposit.expected_date,
            deposit.notes,
            deposit.received,
            deposit.received_date,
        ],
    )?;
    let mut created = deposit.clone();
    created.id = conn.last_insert_rowid();
    Ok(created)
}

pub fn update_deposit(conn: &Connection, deposit: &OneTimeDeposit) -> Result<()> {
    let n = conn.execute(
        "UPDATE one_time_deposits SET name = ?1, amount = ?2, expected_date = ?3, notes = ?4, \
         received = ?5, received_date = ?6, updated_at = datetime('now') WHERE id = ?7",
        params![
            deposit.name,
            deposit.amount,
            deposit.expected_date,
            deposit.notes,
            deposit.received,
            deposit.received_date,
            deposit.id,
        ],
    )?;
    if n == 0 {
        return Err(not_found("deposit id", deposit.id));
    }
    Ok(())
}

pub fn delete_deposit(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM one_time_deposits WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(not_found("deposit id", id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Payday history (append-only)
// ---------------------------------------------------------------------------

pub fn append_history(conn: &Connection, record: &PaydayRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO payday_history (payday_date, paycheck_amount, bills_amount, \
         spending_amount, savings_amount, bills_allocated, debts_allocated, \
         savings_goals_allocated, bills_unallocated, savings_unallocated) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.payday_date,
            record.paycheck_amount,
            record.bills_amount,
            record.spending_amount,
            record.savings_amount,
            serde_json::to_string(&record.bills_allocated)?,
            serde_json::to_string(&record.debts_allocated)?,
            serde_json::to_string(&record.savings_goals_allocated)?,
            record.bills_unallocated,
            record.savings_unallocated,
        ],
    )?;
    Ok(())
}

/// The 10 most recent paydays, newest first.
pub fn list_history(conn: &Connection) -> Result<Vec<PaydayRecord>> {
    let mut stmt = conn.prepare(
        "SELECT payday_date, paycheck_amount, bills_amount, spending_amount, savings_amount, \
         bills_allocated, debts_allocated, savings_goals_allocated, bills_unallocated, \
         savings_unallocated FROM payday_history ORDER BY payday_date DESC, id DESC LIMIT 10",
    )?;
    type RawRow = (
        chrono::NaiveDate,
        Cents,
        Cents,
        Cents,
        Cents,
        String,
        String,
        String,
        Cents,
        Cents,
    );
    let rows = stmt.query_map([], |row| {
        Ok::<RawRow, rusqlite::Error>((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (date, paycheck, bills, spending, savings, b_json, d_json, g_json, b_un, s_un) = row?;
        records.push(PaydayRecord {
            payday_date: date,
            paycheck_amount: paycheck,
            bills_amount: bills,
            spending_amount: spending,
            savings_amount: savings,
            bills_allocated: serde_json::from_str(&b_json)?,
            debts_allocated: serde_json::from_str(&d_json)?,
            savings_goals_allocated: serde_json::from_str(&g_json)?,
            bills_unallocated: b_un,
            savings_unallocated: s_un,
        });
    }
    Ok(records)
}
