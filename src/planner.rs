//! The payday allocation engine.
//!
//! Everything here is a pure function over a snapshot of stored entities.
//! Building a [`PaydayPlan`] never touches the store; committing one is the
//! completion transaction's job. Compute first, mutate second.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{PayplanError, Result};
use crate::fmt::{percent_of, Cents};
use crate::models::{
    Bill, BillAllocated, BillCategory, Debt, DebtAllocated, DebtStrategy, GoalAllocated, Income,
    PayFrequency, PaydayRecord, SavingsGoal, UserBudget,
};
use crate::schedule::advance_payday;

/// One upcoming payday: every income landing on the same date is combined
/// into a single paycheck event.
#[derive(Debug, Clone)]
pub struct PaydayEvent {
    pub date: NaiveDate,
    pub incomes: Vec<Income>,
    pub paycheck_amount: Cents,
}

impl PaydayEvent {
    pub fn frequency_label(&self) -> String {
        if self.incomes.len() > 1 {
            "combined".to_string()
        } else {
            self.incomes
                .first()
                .map(|i| i.pay_frequency.as_str().to_string())
                .unwrap_or_else(|| "biweekly".to_string())
        }
    }
}

/// The earliest today-or-later payday across all incomes.
pub fn next_payday_event(incomes: &[Income], today: NaiveDate) -> Option<PaydayEvent> {
    let date = incomes
        .iter()
        .filter_map(|i| i.next_payday)
        .filter(|d| *d >= today)
        .min()?;

    let members: Vec<Income> = incomes
        .iter()
        .filter(|i| i.next_payday == Some(date))
        .cloned()
        .collect();
    let paycheck_amount = members.iter().map(|i| i.paycheck_amount).sum();

    Some(PaydayEvent { date, incomes: members, paycheck_amount })
}

/// The payday after this one, which bounds the bill-due window. A second
/// distinct future date wins; otherwise one period is synthesized from the
/// event's own frequency. Irregular pay has no following payday.
pub fn following_payday(
    incomes: &[Income],
    event: &PaydayEvent,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let mut dates: Vec<NaiveDate> = incomes
        .iter()
        .filter_map(|i| i.next_payday)
        .filter(|d| *d >= today && *d != event.date)
        .collect();
    dates.sort();
    if let Some(second) = dates.first() {
        return Some(*second);
    }

    let lead = event.incomes.first()?;
    advance_payday(event.date, lead.pay_frequency)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BucketAmounts {
    pub bills: Cents,
    pub spending: Cents,
    pub savings: Cents,
}

/// Paycheck split by the budget percentages, plus carried-forward balances.
/// No budget means nothing to split.
pub fn bucket_amounts(budget: Option<&UserBudget>, paycheck: Cents) -> BucketAmounts {
    match budget {
        None => BucketAmounts::default(),
        Some(b) => BucketAmounts {
            bills: percent_of(paycheck, b.bills_percentage) + b.bills_bucket_balance,
            spending: percent_of(paycheck, b.spending_percentage) + b.spending_bucket_balance,
            savings: percent_of(paycheck, b.savings_percentage) + b.savings_bucket_balance,
        },
    }
}

#[derive(Debug, Clone)]
pub struct BillSelection {
    /// Every unpaid bill in the due window, priority-ordered.
    pub eligible: Vec<Bill>,
    pub due_now: Vec<Bill>,
    pub skipped: Vec<Bill>,
    pub total_due_now: Cents,
    pub unallocated: Cents,
}

/// Greedy bin-pack of the Bills bucket over the due window.
///
/// Autopay bills come first (skipping one has real-world consequences), then
/// soonest late-by date. A bill is paid only when it fits the remaining
/// bucket; everything else is deferred, still owed. Deliberately not
/// value-maximizing.
pub fn select_bills(
    bills: &[Bill],
    today: NaiveDate,
    following: Option<NaiveDate>,
    bills_bucket: Cents,
) -> BillSelection {
    let mut eligible: Vec<Bill> = bills
        .iter()
        .filter(|b| b.last_paid_date.is_none())
        .filter(|b| match following {
            // No next payday scheduled: everything unpaid is on the table.
            None => true,
            Some(next) => b.due_date < today || b.due_date < next,
        })
        .cloned()
        .collect();

    eligible.sort_by(|a, b| {
        b.is_autopay
            .cmp(&a.is_autopay)
            .then(a.late_by_or_due().cmp(&b.late_by_or_due()))
    });

    let mut remaining = bills_bucket;
    let mut due_now = Vec::new();
    let mut skipped = Vec::new();
    for bill in &eligible {
        if bill.amount <= remaining {
            remaining -= bill.amount;
            due_now.push(bill.clone());
        } else {
            skipped.push(bill.clone());
        }
    }

    let total_due_now = due_now.iter().map(|b| b.amount).sum();
    BillSelection { eligible, due_now, skipped, total_due_now, unallocated: remaining }
}

#[derive(Debug, Clone)]
pub struct DebtAllocation {
    pub debt: Debt,
    pub amount: Cents,
}

#[derive(Debug, Clone)]
pub struct GoalAllocation {
    pub goal: SavingsGoal,
    pub amount: Cents,
}

/// Order open debts by payoff strategy: avalanche attacks the highest APR,
/// snowball the smallest balance. Stable on ties.
pub fn order_debts(debts: &[Debt], strategy: DebtStrategy) -> Vec<Debt> {
    let mut ordered: Vec<Debt> = debts.iter().filter(|d| d.balance > 0).cloned().collect();
    match strategy {
        DebtStrategy::Snowball => ordered.sort_by_key(|d| d.balance),
        DebtStrategy::Avalanche => {
            ordered.sort_by(|a, b| b.apr.partial_cmp(&a.apr).unwrap_or(Ordering::Equal))
        }
    }
    ordered
}

/// Greedily put the Savings bucket toward extra principal. Debts whose
/// minimum payment already rides through the Bills bucket this payday are
/// excluded so the minimum is not counted twice.
pub fn allocate_debts(
    debts: &[Debt],
    payment_bill_names: &HashSet<String>,
    strategy: DebtStrategy,
    available: Cents,
) -> (Vec<DebtAllocation>, Cents) {
    let ordered = order_debts(debts, strategy);

    let mut remaining = available;
    let mut allocations = Vec::new();
    for debt in ordered {
        if remaining <= 0 {
            break;
        }
        if payment_bill_names.contains(&debt.payment_bill_name()) {
            continue;
        }
        let amount = debt.balance.min(remaining);
        if amount > 0 {
            remaining -= amount;
            allocations.push(DebtAllocation { debt, amount });
        }
    }
    (allocations, remaining)
}

/// Fund active goals in priority order from whatever debt allocation left.
pub fn fund_goals(goals: &[SavingsGoal], available: Cents) -> (Vec<GoalAllocation>, Cents) {
    let mut active: Vec<SavingsGoal> = goals.iter().filter(|g| g.is_active()).cloned().collect();
    active.sort_by_key(|g| g.priority_rank());

    let mut remaining = available;
    let mut allocations = Vec::new();
    for goal in active {
        if remaining <= 0 {
            break;
        }
        let amount = goal.need().min(remaining);
        if amount > 0 {
            remaining -= amount;
            allocations.push(GoalAllocation { goal, amount });
        }
    }
    (allocations, remaining)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    Auto,
    Custom,
}

#[derive(Debug, Clone)]
pub struct SavingsPlan {
    pub mode: AllocationMode,
    pub available: Cents,
    pub debts: Vec<DebtAllocation>,
    pub goals: Vec<GoalAllocation>,
    pub debt_total: Cents,
    pub goal_total: Cents,
    pub unallocated: Cents,
    pub is_over: bool,
}

impl SavingsPlan {
    pub fn total_allocated(&self) -> Cents {
        self.debt_total + self.goal_total
    }

    fn from_allocations(
        mode: AllocationMode,
        available: Cents,
        debts: Vec<DebtAllocation>,
        goals: Vec<GoalAllocation>,
    ) -> Self {
        let debt_total: Cents = debts.iter().map(|d| d.amount).sum();
        let goal_total: Cents = goals.iter().map(|g| g.amount).sum();
        let total = debt_total + goal_total;
        SavingsPlan {
            mode,
            available,
            debts,
            goals,
            debt_total,
            goal_total,
            unallocated: (available - total).max(0),
            // Integer cents make the float epsilon unnecessary here.
            is_over: total > available,
        }
    }
}

/// User-directed savings split, keyed by debt/goal name.
#[derive(Debug, Clone, Default)]
pub struct CustomAllocations {
    pub debts: Vec<(String, Cents)>,
    pub goals: Vec<(String, Cents)>,
}

impl CustomAllocations {
    pub fn is_empty(&self) -> bool {
        self.debts.is_empty() && self.goals.is_empty()
    }
}

/// Build the savings plan from explicit amounts instead of the greedy walk.
/// Each entry is clamped to what the debt or goal can absorb; the plan is
/// flagged over-allocated when the clamped total still exceeds the bucket.
pub fn custom_savings_plan(
    debts: &[Debt],
    goals: &[SavingsGoal],
    custom: &CustomAllocations,
    available: Cents,
) -> Result<SavingsPlan> {
    let mut debt_allocations = Vec::new();
    for (name, raw) in &custom.debts {
        let debt = debts
            .iter()
            .find(|d| &d.name == name)
            .ok_or_else(|| PayplanError::NotFound(format!("debt {name}")))?;
        let amount = (*raw).clamp(0, debt.balance.max(0));
        if amount > 0 {
            debt_allocations.push(DebtAllocation { debt: debt.clone(), amount });
        }
    }

    let mut goal_allocations = Vec::new();
    for (name, raw) in &custom.goals {
        let goal = goals
            .iter()
            .find(|g| &g.name == name)
            .ok_or_else(|| PayplanError::NotFound(format!("savings goal {name}")))?;
        let amount = (*raw).clamp(0, goal.need());
        if amount > 0 {
            goal_allocations.push(GoalAllocation { goal: goal.clone(), amount });
        }
    }

    Ok(SavingsPlan::from_allocations(
        AllocationMode::Custom,
        available,
        debt_allocations,
        goal_allocations,
    ))
}

/// The full computed plan for the next payday. Immutable once built; the
/// completion transaction commits exactly what is here.
#[derive(Debug, Clone)]
pub struct PaydayPlan {
    pub event: PaydayEvent,
    pub following_payday: Option<NaiveDate>,
    pub buckets: BucketAmounts,
    pub bills: BillSelection,
    pub savings: SavingsPlan,
    pub has_budget: bool,
}

impl PaydayPlan {
    /// Snapshot for the history log, taken with pre-mutation numbers.
    pub fn to_record(&self) -> PaydayRecord {
        PaydayRecord {
            payday_date: self.event.date,
            paycheck_amount: self.event.paycheck_amount,
            bills_amount: self.buckets.bills,
            spending_amount: self.buckets.spending,
            savings_amount: self.buckets.savings,
            bills_allocated: self
                .bills
                .due_now
                .iter()
                .map(|b| BillAllocated {
                    bill_name: b.name.clone(),
                    amount_due: b.amount,
                    amount_allocated: b.amount,
                    due_date: b.due_date,
                    was_autopay: b.is_autopay,
                })
                .collect(),
            debts_allocated: self
                .savings
                .debts
                .iter()
                .map(|d| DebtAllocated {
                    debt_name: d.debt.name.clone(),
                    amount_allocated: d.amount,
                    apr: d.debt.apr,
                })
                .collect(),
            savings_goals_allocated: self
                .savings
                .goals
                .iter()
                .map(|g| GoalAllocated {
                    goal_name: g.goal.name.clone(),
                    amount_allocated: g.amount,
                })
                .collect(),
            bills_unallocated: self.bills.unallocated,
            savings_unallocated: self.savings.unallocated,
        }
    }
}

/// Compute the plan for the next payday, or None when no payday is scheduled.
/// `custom` switches the savings split from the greedy strategy walk to the
/// user's explicit amounts.
pub fn build_plan(
    budget: Option<&UserBudget>,
    incomes: &[Income],
    bills: &[Bill],
    debts: &[Debt],
    goals: &[SavingsGoal],
    today: NaiveDate,
    custom: Option<&CustomAllocations>,
) -> Result<Option<PaydayPlan>> {
    let Some(event) = next_payday_event(incomes, today) else {
        return Ok(None);
    };
    let following = following_payday(incomes, &event, today);
    let buckets = bucket_amounts(budget, event.paycheck_amount);
    let selection = select_bills(bills, today, following, buckets.bills);

    let savings = match custom {
        Some(custom) => custom_savings_plan(debts, goals, custom, buckets.savings)?,
        None => {
            let payment_bill_names: HashSet<String> = selection
                .eligible
                .iter()
                .filter(|b| b.category == BillCategory::DebtPayments)
                .map(|b| b.name.clone())
                .collect();
            let strategy = budget.map(|b| b.debt_strategy).unwrap_or(DebtStrategy::Avalanche);
            let (debt_allocations, after_debts) =
                allocate_debts(debts, &payment_bill_names, strategy, buckets.savings);
            let (goal_allocations, _) = fund_goals(goals, after_debts);
            SavingsPlan::from_allocations(
                AllocationMode::Auto,
                buckets.savings,
                debt_allocations,
                goal_allocations,
            )
        }
    };

    Ok(Some(PaydayPlan {
        event,
        following_payday: following,
        buckets,
        bills: selection,
        savings,
        has_budget: budget.is_some(),
    }))
}

/// Estimated monthly income across all sources. Irregular pay never
/// contributes to the estimate.
pub fn monthly_income_estimate(incomes: &[Income]) -> Cents {
    incomes
        .iter()
        .map(|i| match i.pay_frequency {
            PayFrequency::Weekly => i.paycheck_amount * 52 / 12,
            PayFrequency::Biweekly => i.paycheck_amount * 26 / 12,
            PayFrequency::Semimonthly => i.paycheck_amount * 2,
            PayFrequency::Monthly => i.paycheck_amount,
            PayFrequency::Irregular => 0,
        })
        .sum()
}

/// Per-bucket shares of a received one-time deposit. Applied to the bucket
/// balances immediately, not gated behind a payday.
pub fn split_deposit(budget: &UserBudget, amount: Cents) -> BucketAmounts {
    BucketAmounts {
        bills: percent_of(amount, budget.bills_percentage),
        spending: percent_of(amount, budget.spending_percentage),
        savings: percent_of(amount, budget.savings_percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillFrequency, DebtType, PayFrequency};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn income(name: &str, amount: Cents, freq: PayFrequency, payday: Option<NaiveDate>) -> Income {
        Income {
            id: name.len() as i64,
            name: name.to_string(),
            paycheck_amount: amount,
            pay_frequency: freq,
            next_payday: payday,
            is_primary: false,
        }
    }

    fn bill(name: &str, amount: Cents, due: NaiveDate, autopay: bool) -> Bill {
        Bill {
            id: name.len() as i64,
            name: name.to_string(),
            amount,
            is_variable: false,
            due_date: due,
            late_by_date: None,
            category: BillCategory::Utilities,
            is_autopay: autopay,
            frequency: BillFrequency::Monthly,
            notes: None,
            last_paid_date: None,
            allocated_amount: 0,
            last_allocated_date: None,
        }
    }

    fn debt(name: &str, balance: Cents, apr: f64) -> Debt {
        Debt {
            id: name.len() as i64,
            name: name.to_string(),
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
        }
    }

    fn goal(name: &str, target: Cents, current: Cents, priority: Option<i64>) -> SavingsGoal {
        SavingsGoal {
            id: name.len() as i64,
            name: name.to_string(),
            target_amount: target,
            current_amount: current,
            target_date: None,
            priority,
        }
    }

    fn budget_50_30_20() -> UserBudget {
        UserBudget { monthly_income: 400_000, ..UserBudget::default() }
    }

    fn today() -> NaiveDate {
        date(2026, 8, 7)
    }

    #[test]
    fn earliest_future_payday_wins() {
        let incomes = vec![
            income("A", 100_000, PayFrequency::Biweekly, Some(date(2026, 8, 21))),
            income("B", 50_000, PayFrequency::Monthly, Some(date(2026, 8, 14))),
            income("Old", 75_000, PayFrequency::Weekly, Some(date(2026, 8, 1))),
        ];
        let event = next_payday_event(&incomes, today()).unwrap();
        assert_eq!(event.date, date(2026, 8, 14));
        assert_eq!(event.paycheck_amount, 50_000);
        assert_eq!(event.frequency_label(), "monthly");
    }

    #[test]
    fn same_day_incomes_combine() {
        let incomes = vec![
            income("A", 100_000, PayFrequency::Biweekly, Some(date(2026, 8, 14))),
            income("B", 50_000, PayFrequency::Monthly, Some(date(2026, 8, 14))),
        ];
        let event = next_payday_event(&incomes, today()).unwrap();
        assert_eq!(event.paycheck_amount, 150_000);
        assert_eq!(event.incomes.len(), 2);
        assert_eq!(event.frequency_label(), "combined");
    }

    #[test]
    fn following_payday_prefers_second_distinct_date() {
        let incomes = vec![
            income("A", 100_000, PayFrequency::Biweekly, Some(date(2026, 8, 14))),
            income("B", 50_000, PayFrequency::Monthly, Some(date(2026, 8, 20))),
        ];
        let event = next_payday_event(&incomes, today()).unwrap();
        assert_eq!(following_payday(&incomes, &event, today()), Some(date(2026, 8, 20)));
    }

    #[test]
    fn following_payday_synthesized_from_frequency() {
        let incomes = vec![income("A", 100_000, PayFrequency::Biweekly, Some(date(2026, 8, 14)))];
        let event = next_payday_event(&incomes, today()).unwrap();
        assert_eq!(following_payday(&incomes, &event, today()), Some(date(2026, 8, 28)));
    }

    #[test]
    fn irregular_income_has_no_following_payday() {
        let incomes = vec![income("Gig", 100_000, PayFrequency::Irregular, Some(date(2026, 8, 14)))];
        let event = next_payday_event(&incomes, today()).unwrap();
        assert_eq!(following_payday(&incomes, &event, today()), None);
    }

    #[test]
    fn bucket_identity_holds_exactly() {
        let mut budget = budget_50_30_20();
        budget.bills_bucket_balance = 1_234;
        budget.spending_bucket_balance = 56;
        budget.savings_bucket_balance = 789;
        let paycheck = 200_000;
        let buckets = bucket_amounts(Some(&budget), paycheck);
        assert_eq!(buckets.bills, percent_of(paycheck, 50.0) + 1_234);
        assert_eq!(buckets.spending, percent_of(paycheck, 30.0) + 56);
        assert_eq!(buckets.savings, percent_of(paycheck, 20.0) + 789);
    }

    #[test]
    fn no_budget_means_empty_buckets() {
        let buckets = bucket_amounts(None, 200_000);
        assert_eq!(buckets.bills, 0);
        assert_eq!(buckets.spending, 0);
        assert_eq!(buckets.savings, 0);
    }

    #[test]
    fn selection_never_overspends_the_bucket() {
        let today = today();
        let bills = vec![
            bill("Rent", 80_000, date(2026, 8, 10), false),
            bill("Power", 15_000, date(2026, 8, 12), false),
            bill("Water", 9_000, date(2026, 8, 13), false),
        ];
        let selection = select_bills(&bills, today, Some(date(2026, 8, 21)), 90_000);
        assert!(selection.total_due_now <= 90_000);
        assert_eq!(selection.unallocated, 90_000 - selection.total_due_now);
        // Rent fits, Power does not afterwards, Water still does.
        let names: Vec<&str> = selection.due_now.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Water"]);
        assert_eq!(selection.skipped[0].name, "Power");
    }

    #[test]
    fn autopay_wins_when_only_one_fits() {
        let today = today();
        let bills = vec![
            bill("Manual", 40_000, date(2026, 8, 9), false),
            bill("Autopay", 40_000, date(2026, 8, 12), true),
        ];
        let selection = select_bills(&bills, today, Some(date(2026, 8, 21)), 40_000);
        assert_eq!(selection.due_now.len(), 1);
        assert!(selection.due_now[0].is_autopay);
    }

    #[test]
    fn due_window_ends_day_before_following_payday() {
        let today = today();
        let bills = vec![
            bill("Before", 1_000, date(2026, 8, 20), false),
            bill("OnPayday", 1_000, date(2026, 8, 21), false),
            bill("Overdue", 1_000, date(2026, 8, 1), false),
        ];
        let selection = select_bills(&bills, today, Some(date(2026, 8, 21)), 100_000);
        let names: Vec<&str> = selection.eligible.iter().map(|b| b.name.as_str()).collect();
        assert!(names.contains(&"Before"));
        assert!(names.contains(&"Overdue"));
        assert!(!names.contains(&"OnPayday"));
    }

    #[test]
    fn paid_bills_are_not_selected() {
        let today = today();
        let mut paid = bill("Rent", 80_000, date(2026, 8, 10), false);
        paid.last_paid_date = Some(date(2026, 8, 5));
        let selection = select_bills(&[paid], today, Some(date(2026, 8, 21)), 100_000);
        assert!(selection.eligible.is_empty());
    }

    #[test]
    fn no_following_payday_includes_all_unpaid_bills() {
        let today = today();
        let bills = vec![bill("FarOut", 1_000, date(2027, 1, 1), false)];
        let selection = select_bills(&bills, today, None, 100_000);
        assert_eq!(selection.eligible.len(), 1);
    }

    #[test]
    fn avalanche_orders_by_descending_apr() {
        let debts = vec![debt("Low", 500_000, 6.0), debt("High", 100_000, 24.0), debt("Mid", 1, 12.0)];
        let ordered = order_debts(&debts, DebtStrategy::Avalanche);
        let aprs: Vec<f64> = ordered.iter().map(|d| d.apr).collect();
        assert_eq!(aprs, vec![24.0, 12.0, 6.0]);
    }

    #[test]
    fn snowball_orders_by_ascending_balance() {
        let debts = vec![debt("Big", 500_000, 6.0), debt("Small", 100, 24.0), debt("Mid", 1_000, 12.0)];
        let ordered = order_debts(&debts, DebtStrategy::Snowball);
        let balances: Vec<Cents> = ordered.iter().map(|d| d.balance).collect();
        assert_eq!(balances, vec![100, 1_000, 500_000]);
    }

    #[test]
    fn avalanche_allocation_caps_at_balance_and_stops() {
        // Card A $1000 @ 24%, Loan B $5000 @ 6%, savings bucket $800.
        let debts = vec![debt("Card A", 100_000, 24.0), debt("Loan B", 500_000, 6.0)];
        let (allocations, remaining) =
            allocate_debts(&debts, &HashSet::new(), DebtStrategy::Avalanche, 80_000);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].debt.name, "Card A");
        assert_eq!(allocations[0].amount, 80_000);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn debts_with_minimum_payment_bills_in_window_are_excluded() {
        let debts = vec![debt("Visa", 100_000, 24.0), debt("Loan", 500_000, 6.0)];
        let excluded: HashSet<String> = ["Visa Payment".to_string()].into();
        let (allocations, _) =
            allocate_debts(&debts, &excluded, DebtStrategy::Avalanche, 50_000);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].debt.name, "Loan");
    }

    #[test]
    fn goals_fund_in_priority_order_with_missing_priority_last() {
        let goals = vec![
            goal("Nice to have", 100_000, 0, None),
            goal("Emergency", 100_000, 40_000, Some(1)),
            goal("Vacation", 50_000, 0, Some(2)),
        ];
        let (allocations, remaining) = fund_goals(&goals, 80_000);
        let names: Vec<&str> = allocations.iter().map(|g| g.goal.name.as_str()).collect();
        assert_eq!(names, vec!["Emergency", "Vacation"]);
        assert_eq!(allocations[0].amount, 60_000); // capped at need
        assert_eq!(allocations[1].amount, 20_000); // whatever was left
        assert_eq!(remaining, 0);
    }

    #[test]
    fn full_goals_are_skipped() {
        let goals = vec![goal("Done", 50_000, 50_000, Some(1)), goal("Open", 50_000, 0, Some(2))];
        let (allocations, _) = fund_goals(&goals, 10_000);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].goal.name, "Open");
    }

    #[test]
    fn allocation_conserves_the_bucket() {
        let debts = vec![debt("Card", 30_000, 24.0)];
        let goals = vec![goal("Emergency", 100_000, 95_000, Some(1))];
        let (debt_allocs, after) = allocate_debts(&debts, &HashSet::new(), DebtStrategy::Avalanche, 40_000);
        let (goal_allocs, unallocated) = fund_goals(&goals, after);
        let debt_total: Cents = debt_allocs.iter().map(|d| d.amount).sum();
        let goal_total: Cents = goal_allocs.iter().map(|g| g.amount).sum();
        assert_eq!(debt_total + goal_total + unallocated, 40_000);
        assert_eq!(debt_total, 30_000);
        assert_eq!(goal_total, 5_000);
        assert_eq!(unallocated, 5_000);
    }

    #[test]
    fn custom_plan_clamps_and_flags_overallocation() {
        let debts = vec![debt("Card", 30_000, 24.0)];
        let goals = vec![goal("Trip", 50_000, 20_000, Some(1))];

        let custom = CustomAllocations {
            debts: vec![("Card".to_string(), 99_999)],
            goals: vec![("Trip".to_string(), 99_999)],
        };
        let plan = custom_savings_plan(&debts, &goals, &custom, 40_000).unwrap();
        assert_eq!(plan.debt_total, 30_000); // clamped to balance
        assert_eq!(plan.goal_total, 30_000); // clamped to need
        assert!(plan.is_over); // 60,000 > 40,000
        assert_eq!(plan.unallocated, 0);

        let fits = CustomAllocations {
            debts: vec![("Card".to_string(), 10_000)],
            goals: vec![("Trip".to_string(), 5_000)],
        };
        let plan = custom_savings_plan(&debts, &goals, &fits, 40_000).unwrap();
        assert!(!plan.is_over);
        assert_eq!(plan.unallocated, 25_000);
        assert_eq!(plan.total_allocated() + plan.unallocated, 40_000);
    }

    #[test]
    fn custom_plan_rejects_unknown_names() {
        let custom = CustomAllocations {
            debts: vec![("Nope".to_string(), 1_000)],
            goals: vec![],
        };
        assert!(matches!(
            custom_savings_plan(&[], &[], &custom, 40_000),
            Err(PayplanError::NotFound(_))
        ));
    }

    #[test]
    fn negative_custom_amounts_clamp_to_zero() {
        let debts = vec![debt("Card", 30_000, 24.0)];
        let custom = CustomAllocations {
            debts: vec![("Card".to_string(), -5_000)],
            goals: vec![],
        };
        let plan = custom_savings_plan(&debts, &[], &custom, 40_000).unwrap();
        assert!(plan.debts.is_empty());
        assert_eq!(plan.unallocated, 40_000);
    }

    #[test]
    fn end_to_end_plan_matches_the_paycheck_scenario() {
        // Income $2000 biweekly on payday T, budget 50/30/20 with empty
        // buckets, one $500 autopay bill due on T.
        let t = date(2026, 8, 14);
        let incomes = vec![income("Job", 200_000, PayFrequency::Biweekly, Some(t))];
        let bills = vec![bill("Car Insurance", 50_000, t, true)];
        let plan = build_plan(
            Some(&budget_50_30_20()),
            &incomes,
            &bills,
            &[],
            &[],
            today(),
            None,
        )
        .unwrap()
        .unwrap();

        assert_eq!(plan.buckets.bills, 100_000);
        assert_eq!(plan.buckets.spending, 60_000);
        assert_eq!(plan.buckets.savings, 40_000);
        assert_eq!(plan.bills.due_now.len(), 1);
        assert_eq!(plan.bills.due_now[0].name, "Car Insurance");
        assert_eq!(plan.bills.unallocated, 50_000);
        assert_eq!(plan.savings.unallocated, 40_000);

        let record = plan.to_record();
        assert_eq!(record.payday_date, t);
        assert_eq!(record.bills_allocated.len(), 1);
        assert!(record.bills_allocated[0].was_autopay);
        assert_eq!(record.bills_unallocated, 50_000);
    }

    #[test]
    fn no_scheduled_payday_yields_no_plan() {
        let plan = build_plan(None, &[], &[], &[], &[], today(), None).unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn monthly_estimate_skips_irregular_income() {
        let incomes = vec![
            income("Weekly", 50_000, PayFrequency::Weekly, None),
            income("Biweekly", 100_000, PayFrequency::Biweekly, None),
            income("Semi", 100_000, PayFrequency::Semimonthly, None),
            income("Monthly", 300_000, PayFrequency::Monthly, None),
            income("Gig", 999_999, PayFrequency::Irregular, None),
        ];
        let expected = 50_000 * 52 / 12 + 100_000 * 26 / 12 + 200_000 + 300_000;
        assert_eq!(monthly_income_estimate(&incomes), expected);
    }

    #[test]
    fn deposit_split_uses_budget_percentages() {
        let split = split_deposit(&budget_50_30_20(), 120_000);
        assert_eq!(split.bills, 60_000);
        assert_eq!(split.spending, 36_000);
        assert_eq!(split.savings, 24_000);
    }
}
