use chrono::{Duration, NaiveDate};

use crate::cli::{open_db, today};
use crate::error::Result;
use crate::models::{
    Asset, AssetType, BillCategory, BillFrequency, DebtType, Income, NewBill, NewDebt,
    OneTimeDeposit, PayFrequency, SavingsGoal, UserBudget,
};
use crate::schedule::{
    add_months_clamped, companion_bills, ensure_horizon, late_day_after_due, with_day_clamped,
};
use crate::store;

/// The next date landing on `day` of the month, today or later.
fn next_on_day(today: NaiveDate, day: u32) -> NaiveDate {
    let candidate = with_day_clamped(today, day);
    if candidate < today {
        add_months_clamped(candidate, 1, day)
    } else {
        candidate
    }
}

struct DemoBill {
    name: &'static str,
    amount: i64,
    day: u32,
    category: BillCategory,
    autopay: bool,
}

const BILLS: &[DemoBill] = &[
    DemoBill { name: "Rent", amount: 140_000, day: 1, category: BillCategory::Housing, autopay: false },
    DemoBill { name: "Internet", amount: 8_000, day: 15, category: BillCategory::Utilities, autopay: true },
    DemoBill { name: "Streaming Bundle", amount: 1_599, day: 8, category: BillCategory::Subscriptions, autopay: true },
    DemoBill { name: "Car Insurance", amount: 15_500, day: 20, category: BillCategory::Insurance, autopay: false },
];

pub fn run() -> Result<()> {
    let mut conn = open_db()?;
    let today = today();

    store::save_budget(
        &conn,
        &UserBudget { monthly_income: 520_000, has_hysa: true, ..UserBudget::default() },
    )?;

    store::create_income(
        &conn,
        &Income {
            id: 0,
            name: "Day Job".into(),
            paycheck_amount: 240_000,
            pay_frequency: PayFrequency::Biweekly,
            next_payday: Some(today + Duration::days(7)),
            is_primary: true,
        },
    )?;
    store::create_income(
        &conn,
        &Income {
            id: 0,
            name: "Side Gig".into(),
            paycheck_amount: 40_000,
            pay_frequency: PayFrequency::Irregular,
            next_payday: None,
            is_primary: false,
        },
    )?;

    for bill in BILLS {
        store::create_bill(
            &conn,
            &NewBill {
                name: bill.name.to_string(),
                amount: bill.amount,
                is_variable: false,
                due_date: next_on_day(today, bill.day),
                late_by_date: None,
                category: bill.category,
                is_autopay: bill.autopay,
                frequency: BillFrequency::Monthly,
                notes: None,
            },
        )?;
    }

    let car = store::create_asset(
        &conn,
        &Asset {
            id: 0,
            name: "Honda Civic".into(),
            asset_type: AssetType::Vehicle,
            current_value: 1_650_000,
            purchase_price: Some(2_240_000),
            purchase_date: None,
            notes: None,
        },
    )?;

    let visa = store::create_debt(
        &conn,
        &NewDebt {
            name: "Visa".into(),
            balance: 320_000,
            original_balance: 410_000,
            minimum_payment: Some(8_000),
            apr: 24.99,
            due_day: 21,
            late_by_day: None,
            statement_day: Some(25),
            debt_type: DebtType::CreditCard,
            credit_limit: Some(800_000),
            linked_asset_id: None,
        },
    )?;
    let car_loan = store::create_debt(
        &conn,
        &NewDebt {
            name: "Car Loan".into(),
            balance: 910_000,
            original_balance: 1_890_000,
            minimum_payment: Some(35_000),
            apr: 6.4,
            due_day: 5,
            late_by_day: Some(late_day_after_due(5)),
            statement_day: None,
            debt_type: DebtType::CarLoan,
            credit_limit: None,
            linked_asset_id: Some(car.id),
        },
    )?;
    store::bulk_create_bills(&mut conn, &companion_bills(&visa.name, 8_000, 21, today))?;
    store::bulk_create_bills(&mut conn, &companion_bills(&car_loan.name, 35_000, 5, today))?;

    store::create_goal(
        &conn,
        &SavingsGoal {
            id: 0,
            name: "Emergency Fund".into(),
            target_amount: 500_000,
            current_amount: 120_000,
            target_date: None,
            priority: Some(1),
        },
    )?;
    store::create_goal(
        &conn,
        &SavingsGoal {
            id: 0,
            name: "Trip to Japan".into(),
            target_amount: 300_000,
            current_amount: 45_000,
            target_date: Some(add_months_clamped(today, 10, 1)),
            priority: Some(2),
        },
    )?;

    store::create_deposit(
        &conn,
        &OneTimeDeposit {
            id: 0,
            name: "Tax Return".into(),
            amount: 120_000,
            expected_date: today + Duration::days(30),
            notes: Some("Federal refund".into()),
            received: false,
            received_date: None,
        },
    )?;

    let generated = ensure_horizon(&mut conn, today)?;

    println!("Loaded demo data:");
    println!("  2 incomes, {} bills ({generated} generated), 2 debts, 2 goals, 1 pending deposit", BILLS.len() + 2);
    println!();
    println!("Try:");
    println!("  payplan plan");
    println!("  payplan bill list");
    println!("  payplan complete");
    Ok(())
}
