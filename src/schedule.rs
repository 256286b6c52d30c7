//! Calendar arithmetic and recurring-bill occurrence generation.
//!
//! Every recurring bill series keeps dated instances covering a rolling
//! seven-month horizon. The earliest-due occurrence of a name is the series
//! template; generation is idempotent and dedupes on (name, due_date).

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

use crate::error::Result;
use crate::fmt::Cents;
use crate::models::{Bill, BillCategory, BillFrequency, NewBill, PayFrequency};
use crate::store;

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_y, next_m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Same month, preferred day-of-month clamped to the month's last day.
pub fn with_day_clamped(date: NaiveDate, day: u32) -> NaiveDate {
    let clamped = day.min(days_in_month(date.year(), date.month()));
    date.with_day(clamped).unwrap_or(date)
}

/// Month arithmetic that keeps the preferred day sensible when the target
/// month is shorter: Jan 31 + 1 month -> Feb 28 (29 in leap years).
pub fn add_months_clamped(date: NaiveDate, months: i32, preferred_day: u32) -> NaiveDate {
    let month0 = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = month0.div_euclid(12);
    let month = month0.rem_euclid(12) as u32 + 1;
    let day = preferred_day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// End of the rolling generation window.
pub fn horizon_end(today: NaiveDate) -> NaiveDate {
    add_months_clamped(today, 7, today.day())
}

/// Due date of occurrence `index` of a series, None once the series is done.
fn occurrence_date(template_due: NaiveDate, frequency: BillFrequency, index: u32) -> Option<NaiveDate> {
    let preferred_day = template_due.day();
    match frequency {
        BillFrequency::Weekly => Some(template_due + Duration::days(7 * index as i64)),
        BillFrequency::Biweekly => Some(template_due + Duration::days(14 * index as i64)),
        BillFrequency::Monthly => Some(add_months_clamped(template_due, index as i32, preferred_day)),
        BillFrequency::Quarterly => {
            Some(add_months_clamped(template_due, 3 * index as i32, preferred_day))
        }
        BillFrequency::Biannually => {
            Some(add_months_clamped(template_due, 6 * index as i32, preferred_day))
        }
        BillFrequency::Annually => {
            Some(add_months_clamped(template_due, 12 * index as i32, preferred_day))
        }
        BillFrequency::OneTime => (index == 0).then_some(template_due),
    }
}

/// The minimal set of new occurrences needed so every series has an instance
/// for each period boundary up to the horizon. Re-running with nothing
/// missing yields an empty batch.
pub fn missing_occurrences(bills: &[Bill], today: NaiveDate) -> Vec<NewBill> {
    let horizon = horizon_end(today);

    let mut templates: BTreeMap<&str, &Bill> = BTreeMap::new();
    for bill in bills {
        templates
            .entry(bill.name.as_str())
            .and_modify(|t| {
                if bill.due_date < t.due_date {
                    *t = bill;
                }
            })
            .or_insert(bill);
    }

    let existing: HashSet<(&str, NaiveDate)> =
        bills.iter().map(|b| (b.name.as_str(), b.due_date)).collect();

    let mut generated = Vec::new();
    for (name, template) in &templates {
        let late_day = template.late_by_date.map(|d| d.day());
        for index in 0..template.frequency.max_occurrences() {
            let Some(due) = occurrence_date(template.due_date, template.frequency, index) else {
                break;
            };
            if due > horizon {
                break;
            }
            if existing.contains(&(*name, due)) {
                continue;
            }
            generated.push(NewBill {
                name: template.name.clone(),
                amount: template.amount,
                is_variable: template.is_variable,
                due_date: due,
                late_by_date: late_day.map(|d| with_day_clamped(due, d)),
                category: template.category,
                is_autopay: template.is_autopay,
                frequency: template.frequency,
                notes: template.notes.clone(),
            });
        }
    }
    generated
}

/// Top up the rolling horizon, persisting any missing occurrences in one
/// flush. Returns how many were created.
pub fn ensure_horizon(conn: &mut Connection, today: NaiveDate) -> Result<usize> {
    let bills = store::list_bills(conn)?;
    let batch = missing_occurrences(&bills, today);
    if batch.is_empty() {
        return Ok(0);
    }
    store::bulk_create_bills(conn, &batch)
}

/// Advance a payday date by one pay period; irregular incomes have no schedule.
pub fn advance_payday(date: NaiveDate, frequency: PayFrequency) -> Option<NaiveDate> {
    match frequency {
        PayFrequency::Weekly => Some(date + Duration::days(7)),
        PayFrequency::Biweekly => Some(date + Duration::days(14)),
        PayFrequency::Semimonthly => Some(date + Duration::days(15)),
        PayFrequency::Monthly => Some(add_months_clamped(date, 1, date.day())),
        PayFrequency::Irregular => None,
    }
}

/// Day-of-month landed on 30 days after the due day (asset-backed debts
/// derive their late-by day this way).
pub fn late_day_after_due(due_day: u32) -> u32 {
    NaiveDate::from_ymd_opt(2025, 1, due_day.clamp(1, 31))
        .map(|d| (d + Duration::days(30)).day())
        .unwrap_or(due_day)
}

/// The companion minimum-payment series for a debt: seven monthly
/// occurrences starting with the first due day on or after `today`,
/// each late 30 days after it falls due.
pub fn companion_bills(
    debt_name: &str,
    minimum_payment: Cents,
    due_day: u32,
    today: NaiveDate,
) -> Vec<NewBill> {
    let mut first = with_day_clamped(today, due_day);
    if first < today {
        first = add_months_clamped(first, 1, due_day);
    }

    (0..7)
        .map(|i| {
            let due = add_months_clamped(first, i, due_day);
            NewBill {
                name: format!("{debt_name}{}", crate::models::PAYMENT_BILL_SUFFIX),
                amount: minimum_payment,
                is_variable: false,
                due_date: due,
                late_by_date: Some(due + Duration::days(30)),
                category: BillCategory::DebtPayments,
                is_autopay: false,
                frequency: BillFrequency::Monthly,
                notes: Some(format!("Auto-generated from debt: {debt_name}")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(name: &str, due: NaiveDate, frequency: BillFrequency) -> Bill {
        Bill {
            id: 1,
            name: name.to_string(),
            amount: 10_000,
            is_variable: false,
            due_date: due,
            late_by_date: None,
            category: BillCategory::Utilities,
            is_autopay: false,
            frequency,
            notes: None,
            last_paid_date: None,
            allocated_amount: 0,
            last_allocated_date: None,
        }
    }

    #[test]
    fn month_rollover_clamps_to_short_months() {
        assert_eq!(add_months_clamped(date(2026, 1, 31), 1, 31), date(2026, 2, 28));
        assert_eq!(add_months_clamped(date(2024, 1, 31), 1, 31), date(2024, 2, 29));
        assert_eq!(add_months_clamped(date(2026, 1, 31), 2, 31), date(2026, 3, 31));
        assert_eq!(add_months_clamped(date(2026, 1, 31), 3, 31), date(2026, 4, 30));
        assert_eq!(add_months_clamped(date(2026, 11, 15), 2, 15), date(2027, 1, 15));
    }

    #[test]
    fn monthly_series_keeps_preferred_day_after_short_month() {
        // Day 31 template passing through February still lands on the 31st in March.
        let bills = vec![bill("Rent", date(2026, 1, 31), BillFrequency::Monthly)];
        let generated = missing_occurrences(&bills, date(2026, 1, 31));
        let days: Vec<NaiveDate> = generated.iter().map(|b| b.due_date).collect();
        assert!(days.contains(&date(2026, 2, 28)));
        assert!(days.contains(&date(2026, 3, 31)));
        assert!(days.contains(&date(2026, 4, 30)));
        assert!(days.contains(&date(2026, 5, 31)));
    }

    #[test]
    fn generator_is_idempotent() {
        let mut bills = vec![bill("Internet", date(2026, 8, 10), BillFrequency::Monthly)];
        let today = date(2026, 8, 1);
        let first_pass = missing_occurrences(&bills, today);
        assert!(!first_pass.is_empty());

        for (i, new_bill) in first_pass.iter().enumerate() {
            let mut b = bill("Internet", new_bill.due_date, BillFrequency::Monthly);
            b.id = 100 + i as i64;
            bills.push(b);
        }
        assert!(missing_occurrences(&bills, today).is_empty());
    }

    #[test]
    fn generator_respects_horizon() {
        let bills = vec![bill("Internet", date(2026, 8, 10), BillFrequency::Monthly)];
        let today = date(2026, 8, 1);
        let horizon = horizon_end(today);
        let generated = missing_occurrences(&bills, today);
        assert!(generated.iter().all(|b| b.due_date <= horizon));
        // Template already exists; Sep 2026 through Feb 2027 get filled.
        assert_eq!(generated.len(), 6);
    }

    #[test]
    fn one_time_bills_generate_nothing() {
        let bills = vec![bill("Car Registration", date(2026, 9, 1), BillFrequency::OneTime)];
        assert!(missing_occurrences(&bills, date(2026, 8, 1)).is_empty());
    }

    #[test]
    fn earliest_occurrence_is_the_template() {
        // A stale later occurrence with a different amount must not win.
        let mut later = bill("Gym", date(2026, 9, 5), BillFrequency::Monthly);
        later.amount = 99_999;
        let bills = vec![later, bill("Gym", date(2026, 8, 5), BillFrequency::Monthly)];
        let generated = missing_occurrences(&bills, date(2026, 8, 1));
        assert!(generated.iter().all(|b| b.amount == 10_000));
        assert!(!generated.iter().any(|b| b.due_date == date(2026, 9, 5)));
    }

    #[test]
    fn late_by_day_follows_each_occurrence_month() {
        let mut template = bill("Electric", date(2026, 8, 5), BillFrequency::Monthly);
        template.late_by_date = Some(date(2026, 8, 20));
        let generated = missing_occurrences(&[template], date(2026, 8, 1));
        for new_bill in &generated {
            let late = new_bill.late_by_date.unwrap();
            assert_eq!(late.month(), new_bill.due_date.month());
            assert_eq!(late.day(), 20);
        }
    }

    #[test]
    fn weekly_series_fills_the_window() {
        let bills = vec![bill("Cleaner", date(2026, 8, 7), BillFrequency::Weekly)];
        let generated = missing_occurrences(&bills, date(2026, 8, 1));
        assert!(generated.len() > 20);
        let mut dates: Vec<NaiveDate> = generated.iter().map(|b| b.due_date).collect();
        dates.sort();
        assert_eq!(dates[0], date(2026, 8, 14));
        assert_eq!(dates[1] - dates[0], Duration::days(7));
    }

    #[test]
    fn advance_payday_per_frequency() {
        let d = date(2026, 8, 14);
        assert_eq!(advance_payday(d, PayFrequency::Weekly), Some(date(2026, 8, 21)));
        assert_eq!(advance_payday(d, PayFrequency::Biweekly), Some(date(2026, 8, 28)));
        assert_eq!(advance_payday(d, PayFrequency::Semimonthly), Some(date(2026, 8, 29)));
        assert_eq!(advance_payday(d, PayFrequency::Monthly), Some(date(2026, 9, 14)));
        assert_eq!(advance_payday(date(2026, 1, 31), PayFrequency::Monthly), Some(date(2026, 2, 28)));
        assert_eq!(advance_payday(d, PayFrequency::Irregular), None);
    }

    #[test]
    fn companion_series_starts_on_or_after_today() {
        let bills = companion_bills("Visa", 5_000, 15, date(2026, 8, 20));
        assert_eq!(bills.len(), 7);
        assert_eq!(bills[0].due_date, date(2026, 9, 15));
        assert_eq!(bills[0].name, "Visa Payment");
        assert_eq!(bills[0].category, BillCategory::DebtPayments);
        assert_eq!(bills[0].late_by_date, Some(date(2026, 10, 15)));

        let same_day = companion_bills("Visa", 5_000, 20, date(2026, 8, 20));
        assert_eq!(same_day[0].due_date, date(2026, 8, 20));
    }

    #[test]
    fn late_day_after_due_wraps_the_month() {
        assert_eq!(late_day_after_due(5), 4);
        assert_eq!(late_day_after_due(15), 14);
    }
}
