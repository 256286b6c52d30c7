//! Committing money events against the store: payday completion and
//! one-time deposit receipt.
//!
//! The planner computes, this module mutates. Each commit runs inside a
//! single SQLite transaction, so a failure anywhere in the write sequence
//! rolls back to zero writes.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::{PayplanError, Result};
use crate::fmt::money;
use crate::models::{BillCategory, OneTimeDeposit, PaydayRecord, PAYMENT_BILL_SUFFIX};
use crate::planner::{split_deposit, BucketAmounts, PaydayPlan};
use crate::schedule::advance_payday;
use crate::store;

/// Commit a computed plan: append the history receipt, apply every bill,
/// debt, goal and income effect, and reset the bucket balances to the
/// carried-forward remainders.
pub fn complete_payday(conn: &mut Connection, plan: &PaydayPlan) -> Result<PaydayRecord> {
    if plan.event.incomes.is_empty() {
        return Err(PayplanError::Precondition(
            "no income pays out on this payday".to_string(),
        ));
    }
    if plan.savings.is_over {
        return Err(PayplanError::OverAllocation(format!(
            "planned {} but only {} is in the savings bucket",
            money(plan.savings.total_allocated()),
            money(plan.savings.available),
        )));
    }

    let record = plan.to_record();
    let payday = plan.event.date;

    let tx = conn.transaction()?;

    // The durable receipt, written with pre-mutation numbers.
    store::append_history(&tx, &record)?;

    for bill in &plan.bills.due_now {
        tx.execute(
            "UPDATE bills SET allocated_amount = allocated_amount + ?1, \
             last_allocated_date = ?2, updated_at = datetime('now') WHERE id = ?3",
            params![bill.amount, payday, bill.id],
        )?;
    }

    // Minimum payments ride the Bills bucket; knock them off the owning debt.
    for bill in &plan.bills.due_now {
        if bill.category != BillCategory::DebtPayments {
            continue;
        }
        let debt_name = bill.name.strip_suffix(PAYMENT_BILL_SUFFIX).unwrap_or(&bill.name);
        tx.execute(
            "UPDATE debts SET balance = MAX(0, balance - ?1), updated_at = datetime('now') \
             WHERE name = ?2",
            params![bill.amount, debt_name],
        )?;
    }

    for alloc in &plan.savings.debts {
        tx.execute(
            "UPDATE debts SET balance = MAX(0, balance - ?1), updated_at = datetime('now') \
             WHERE id = ?2",
            params![alloc.amount, alloc.debt.id],
        )?;
    }

    for alloc in &plan.savings.goals {
        tx.execute(
            "UPDATE savings_goals SET current_amount = current_amount + ?1, \
             updated_at = datetime('now') WHERE id = ?2",
            params![alloc.amount, alloc.goal.id],
        )?;
    }

    for income in &plan.event.incomes {
        if let Some(next) = advance_payday(payday, income.pay_frequency) {
            tx.execute(
                "UPDATE incomes SET next_payday = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![next, income.id],
            )?;
        }
    }

    // Spending never carries forward; the other buckets keep their remainders.
    if plan.has_budget {
        tx.execute(
            "UPDATE user_budget SET bills_bucket_balance = ?1, spending_bucket_balance = 0, \
             savings_bucket_balance = ?2, updated_at = datetime('now') WHERE id = 1",
            params![plan.bills.unallocated, plan.savings.unallocated],
        )?;
    }

    tx.commit()?;
    Ok(record)
}

/// Mark a deposit received and fold its amount into the bucket balances by
/// the budget percentages, effective immediately (no payday involved).
pub fn receive_deposit(
    conn: &mut Connection,
    deposit: &OneTimeDeposit,
    today: NaiveDate,
) -> Result<BucketAmounts> {
    if deposit.received {
        return Err(PayplanError::Validation(format!(
            "deposit {} was already received",
            deposit.name
        )));
    }

    let budget = store::get_budget(conn)?;
    let shares = budget
        .as_ref()
        .map(|b| split_deposit(b, deposit.amount))
        .unwrap_or_default();

    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE one_time_deposits SET received = 1, received_date = ?1, \
         updated_at = datetime('now') WHERE id = ?2",
        params![today, deposit.id],
    )?;
    if budget.is_some() {
        tx.execute(
            "UPDATE user_budget SET \
             bills_bucket_balance = bills_bucket_balance + ?1, \
             spending_bucket_balance = spending_bucket_balance + ?2, \
             savings_bucket_balance = savings_bucket_balance + ?3, \
             updated_at = datetime('now') WHERE id = 1",
            params![shares.bills, shares.spending, shares.savings],
        )?;
    }
    tx.commit()?;
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::{
        Bill, BillFrequency, Debt, DebtType, Income, NewBill, NewDebt, PayFrequency, SavingsGoal,
        UserBudget,
    };
    use crate::planner::{build_plan, CustomAllocations};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_budget(conn: &Connection) {
        store::save_budget(conn, &UserBudget { monthly_income: 400_000, ..UserBudget::default() })
            .unwrap();
    }

    fn seed_income(conn: &Connection, amount: i64, freq: PayFrequency, payday: NaiveDate) -> Income {
        store::create_income(
            conn,
            &Income {
                id: 0,
                name: "Job".into(),
                paycheck_amount: amount,
                pay_frequency: freq,
                next_payday: Some(payday),
                is_primary: true,
            },
        )
        .unwrap()
    }

    fn seed_bill(conn: &Connection, name: &str, amount: i64, due: NaiveDate, autopay: bool) -> Bill {
        store::create_bill(
            conn,
            &NewBill {
                name: name.into(),
                amount,
                is_variable: false,
                due_date: due,
                late_by_date: None,
                category: BillCategory::Insurance,
                is_autopay: autopay,
                frequency: BillFrequency::Monthly,
                notes: None,
            },
        )
        .unwrap()
    }

    fn seed_payment_bill(conn: &Connection, debt_name: &str, amount: i64, due: NaiveDate) -> Bill {
        store::create_bill(
            conn,
            &NewBill {
                name: format!("{debt_name}{PAYMENT_BILL_SUFFIX}"),
                amount,
                is_variable: false,
                due_date: due,
                late_by_date: None,
                category: BillCategory::DebtPayments,
                is_autopay: false,
                frequency: BillFrequency::Monthly,
                notes: None,
            },
        )
        .unwrap()
    }

    fn seed_debt(conn: &Connection, name: &str, balance: i64, apr: f64) -> Debt {
        store::create_debt(
            conn,
            &NewDebt {
                name: name.into(),
                balance,
                original_balance: balance,
                minimum_payment: None,
                apr,
                due_day: 15,
                late_by_day: None,
                statement_day: None,
                debt_type: DebtType::CreditCard,
                credit_limit: None,
                linked_asset_id: None,
            },
        )
        .unwrap()
    }

    fn plan_for(conn: &Connection, today: NaiveDate) -> crate::planner::PaydayPlan {
        let budget = store::get_budget(conn).unwrap();
        build_plan(
            budget.as_ref(),
            &store::list_incomes(conn).unwrap(),
            &store::list_bills(conn).unwrap(),
            &store::list_debts(conn).unwrap(),
            &store::list_goals(conn).unwrap(),
            today,
            None,
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn end_to_end_paycheck_completion() {
        let (_dir, mut conn) = test_db();
        let today = date(2026, 8, 7);
        let payday = date(2026, 8, 14);
        seed_budget(&conn);
        seed_income(&conn, 200_000, PayFrequency::Biweekly, payday);
        let bill = seed_bill(&conn, "Car Insurance", 50_000, payday, true);

        let plan = plan_for(&conn, today);
        assert_eq!(plan.buckets.bills, 100_000);
        assert_eq!(plan.bills.due_now.len(), 1);
        assert_eq!(plan.bills.unallocated, 50_000);

        complete_payday(&mut conn, &plan).unwrap();

        let budget = store::get_budget(&conn).unwrap().unwrap();
        assert_eq!(budget.bills_bucket_balance, 50_000);
        assert_eq!(budget.spending_bucket_balance, 0);
        assert_eq!(budget.savings_bucket_balance, 40_000);

        let bills = store::list_bills_named(&conn, "Car Insurance").unwrap();
        assert_eq!(bills[0].allocated_amount, bill.allocated_amount + 50_000);
        assert_eq!(bills[0].last_allocated_date, Some(payday));
        // Allocation is not the manual paid toggle.
        assert_eq!(bills[0].last_paid_date, None);

        let income = store::get_income_named(&conn, "Job").unwrap();
        assert_eq!(income.next_payday, Some(date(2026, 8, 28)));

        let history = store::list_history(&conn).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].payday_date, payday);
        assert_eq!(history[0].paycheck_amount, 200_000);
        assert_eq!(history[0].bills_unallocated, 50_000);
    }

    #[test]
    fn minimum_payment_bill_reduces_debt_balance() {
        let (_dir, mut conn) = test_db();
        let today = date(2026, 8, 7);
        let payday = date(2026, 8, 14);
        seed_budget(&conn);
        seed_income(&conn, 200_000, PayFrequency::Biweekly, payday);
        seed_debt(&conn, "Visa", 100_000, 24.99);
        seed_debt(&conn, "Loan", 500_000, 6.0);
        seed_payment_bill(&conn, "Visa", 5_000, payday);

        let plan = plan_for(&conn, today);
        // Visa's minimum rides the Bills bucket, so extra principal skips it.
        assert!(plan.savings.debts.iter().all(|d| d.debt.name != "Visa"));

        complete_payday(&mut conn, &plan).unwrap();

        let visa = store::get_debt_named(&conn, "Visa").unwrap();
        assert_eq!(visa.balance, 95_000);
        // Savings bucket ($400) went to Loan as extra principal.
        let loan = store::get_debt_named(&conn, "Loan").unwrap();
        assert_eq!(loan.balance, 500_000 - 40_000);
    }

    #[test]
    fn debt_balance_floors_at_zero() {
        let (_dir, mut conn) = test_db();
        let today = date(2026, 8, 7);
        let payday = date(2026, 8, 14);
        seed_budget(&conn);
        seed_income(&conn, 200_000, PayFrequency::Biweekly, payday);
        seed_debt(&conn, "Tiny", 3_000, 24.99);
        seed_payment_bill(&conn, "Tiny", 5_000, payday);

        let plan = plan_for(&conn, today);
        complete_payday(&mut conn, &plan).unwrap();

        assert_eq!(store::get_debt_named(&conn, "Tiny").unwrap().balance, 0);
    }

    #[test]
    fn goal_allocations_and_unallocated_carry() {
        let (_dir, mut conn) = test_db();
        let today = date(2026, 8, 7);
        let payday = date(2026, 8, 14);
        seed_budget(&conn);
        seed_income(&conn, 200_000, PayFrequency::Biweekly, payday);
        store::create_goal(
            &conn,
            &SavingsGoal {
                id: 0,
                name: "Emergency".into(),
                target_amount: 100_000,
                current_amount: 90_000,
                target_date: None,
                priority: Some(1),
            },
        )
        .unwrap();

        let plan = plan_for(&conn, today);
        assert_eq!(plan.savings.goal_total, 10_000);
        assert_eq!(plan.savings.unallocated, 30_000);

        complete_payday(&mut conn, &plan).unwrap();

        let goal = store::get_goal_named(&conn, "Emergency").unwrap();
        assert_eq!(goal.current_amount, 100_000);
        let budget = store::get_budget(&conn).unwrap().unwrap();
        assert_eq!(budget.savings_bucket_balance, 30_000);
    }

    #[test]
    fn over_allocated_plan_is_refused_with_zero_writes() {
        let (_dir, mut conn) = test_db();
        let today = date(2026, 8, 7);
        let payday = date(2026, 8, 14);
        seed_budget(&conn);
        seed_income(&conn, 200_000, PayFrequency::Biweekly, payday);
        let debt = seed_debt(&conn, "Visa", 1_000_000, 24.99);

        let custom = CustomAllocations {
            debts: vec![("Visa".to_string(), 999_000)],
            goals: vec![],
        };
        let budget = store::get_budget(&conn).unwrap();
        let plan = build_plan(
            budget.as_ref(),
            &store::list_incomes(&conn).unwrap(),
            &[],
            &store::list_debts(&conn).unwrap(),
            &[],
            today,
            Some(&custom),
        )
        .unwrap()
        .unwrap();
        assert!(plan.savings.is_over);

        let err = complete_payday(&mut conn, &plan);
        assert!(matches!(err, Err(PayplanError::OverAllocation(_))));

        // Nothing moved.
        assert!(store::list_history(&conn).unwrap().is_empty());
        assert_eq!(store::get_debt_named(&conn, "Visa").unwrap().balance, debt.balance);
        assert_eq!(
            store::get_income_named(&conn, "Job").unwrap().next_payday,
            Some(payday)
        );
        let budget = store::get_budget(&conn).unwrap().unwrap();
        assert_eq!(budget.savings_bucket_balance, 0);
    }

    #[test]
    fn irregular_income_keeps_its_payday() {
        let (_dir, mut conn) = test_db();
        let today = date(2026, 8, 7);
        let payday = date(2026, 8, 14);
        seed_budget(&conn);
        seed_income(&conn, 200_000, PayFrequency::Irregular, payday);

        let plan = plan_for(&conn, today);
        complete_payday(&mut conn, &plan).unwrap();

        let income = store::get_income_named(&conn, "Job").unwrap();
        assert_eq!(income.next_payday, Some(payday));
    }

    #[test]
    fn deposit_receipt_splits_into_buckets_immediately() {
        let (_dir, mut conn) = test_db();
        seed_budget(&conn);
        let deposit = store::create_deposit(
            &conn,
            &OneTimeDeposit {
                id: 0,
                name: "Tax Return".into(),
                amount: 120_000,
                expected_date: date(2026, 8, 20),
                notes: None,
                received: false,
                received_date: None,
            },
        )
        .unwrap();

        let today = date(2026, 8, 7);
        let shares = receive_deposit(&mut conn, &deposit, today).unwrap();
        assert_eq!(shares.bills, 60_000);
        assert_eq!(shares.spending, 36_000);
        assert_eq!(shares.savings, 24_000);

        let budget = store::get_budget(&conn).unwrap().unwrap();
        assert_eq!(budget.bills_bucket_balance, 60_000);
        assert_eq!(budget.spending_bucket_balance, 36_000);
        assert_eq!(budget.savings_bucket_balance, 24_000);

        let stored = store::get_deposit_named(&conn, "Tax Return").unwrap();
        assert!(stored.received);
        assert_eq!(stored.received_date, Some(today));

        // A second receipt must not double-fund the buckets.
        assert!(matches!(
            receive_deposit(&mut conn, &stored, today),
            Err(PayplanError::Validation(_))
        ));
    }
}
