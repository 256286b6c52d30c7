use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user_budget (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    monthly_income INTEGER NOT NULL DEFAULT 0,
    bills_percentage REAL NOT NULL DEFAULT 50,
    spending_percentage REAL NOT NULL DEFAULT 30,
    savings_percentage REAL NOT NULL DEFAULT 20,
    bills_bucket_balance INTEGER NOT NULL DEFAULT 0,
    spending_bucket_balance INTEGER NOT NULL DEFAULT 0,
    savings_bucket_balance INTEGER NOT NULL DEFAULT 0,
    debt_strategy TEXT NOT NULL DEFAULT 'avalanche',
    has_hysa INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS incomes (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    paycheck_amount INTEGER NOT NULL,
    pay_frequency TEXT NOT NULL,
    next_payday TEXT,
    is_primary INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS bills (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    amount INTEGER NOT NULL,
    is_variable INTEGER NOT NULL DEFAULT 0,
    due_date TEXT NOT NULL,
    late_by_date TEXT,
    category TEXT NOT NULL,
    is_autopay INTEGER NOT NULL DEFAULT 0,
    frequency TEXT NOT NULL,
    notes TEXT,
    last_paid_date TEXT,
    allocated_amount INTEGER NOT NULL DEFAULT 0,
    last_allocated_date TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_bills_name_due ON bills(name, due_date);

CREATE TABLE IF NOT EXISTS debts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    balance INTEGER NOT NULL,
    original_balance INTEGER NOT NULL,
    minimum_payment INTEGER,
    apr REAL NOT NULL DEFAULT 0,
    due_day INTEGER NOT NULL,
    late_by_day INTEGER,
    statement_day INTEGER,
    debt_type TEXT NOT NULL,
    credit_limit INTEGER,
    linked_asset_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    asset_type TEXT NOT NULL,
    current_value INTEGER NOT NULL,
    purchase_price INTEGER,
    purchase_date TEXT,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS savings_goals (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    target_amount INTEGER NOT NULL,
    current_amount INTEGER NOT NULL DEFAULT 0,
    target_date TEXT,
    priority INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS one_time_deposits (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    amount INTEGER NOT NULL,
    expected_date TEXT NOT NULL,
    notes TEXT,
    received INTEGER NOT NULL DEFAULT 0,
    received_date TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS payday_history (
    id INTEGER PRIMARY KEY,
    payday_date TEXT NOT NULL,
    paycheck_amount INTEGER NOT NULL,
    bills_amount INTEGER NOT NULL,
    spending_amount INTEGER NOT NULL,
    savings_amount INTEGER NOT NULL,
    bills_allocated TEXT NOT NULL,
    debts_allocated TEXT NOT NULL,
    savings_goals_allocated TEXT NOT NULL,
    bills_unallocated INTEGER NOT NULL,
    savings_unallocated INTEGER NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
