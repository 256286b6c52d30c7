use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

use crate::error::{PayplanError, Result};
use crate::fmt::Cents;

/// Suffix linking a debt to its minimum-payment bill series.
pub const PAYMENT_BILL_SUFFIX: &str = " Payment";

/// Treated as lowest priority when a goal has none set.
pub const DEFAULT_GOAL_PRIORITY: i64 = 999;

macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                <$ty>::parse(s).map_err(|e| FromSqlError::Other(e.to_string().into()))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
    Irregular,
}

impl PayFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::Biweekly => "biweekly",
            PayFrequency::Semimonthly => "semimonthly",
            PayFrequency::Monthly => "monthly",
            PayFrequency::Irregular => "irregular",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "weekly" => Ok(PayFrequency::Weekly),
            "biweekly" => Ok(PayFrequency::Biweekly),
            "semimonthly" => Ok(PayFrequency::Semimonthly),
            "monthly" => Ok(PayFrequency::Monthly),
            "irregular" => Ok(PayFrequency::Irregular),
            _ => Err(PayplanError::Validation(format!("unknown pay frequency: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Biannually,
    Annually,
    OneTime,
}

impl BillFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillFrequency::Weekly => "weekly",
            BillFrequency::Biweekly => "biweekly",
            BillFrequency::Monthly => "monthly",
            BillFrequency::Quarterly => "quarterly",
            BillFrequency::Biannually => "biannually",
            BillFrequency::Annually => "annually",
            BillFrequency::OneTime => "one_time",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "weekly" => Ok(BillFrequency::Weekly),
            "biweekly" => Ok(BillFrequency::Biweekly),
            "monthly" => Ok(BillFrequency::Monthly),
            "quarterly" => Ok(BillFrequency::Quarterly),
            "biannually" => Ok(BillFrequency::Biannually),
            "annually" => Ok(BillFrequency::Annually),
            "one_time" => Ok(BillFrequency::OneTime),
            _ => Err(PayplanError::Validation(format!("unknown bill frequency: {s}"))),
        }
    }

    /// Upper bound on generated occurrences per series.
    pub fn max_occurrences(&self) -> u32 {
        match self {
            BillFrequency::Weekly => 52,
            BillFrequency::Biweekly => 26,
            BillFrequency::Monthly => 12,
            BillFrequency::Quarterly => 8,
            BillFrequency::Biannually => 4,
            BillFrequency::Annually => 2,
            BillFrequency::OneTime => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillCategory {
    Housing,
    Utilities,
    Transportation,
    Insurance,
    Subscriptions,
    DebtPayments,
    ChildFamily,
    Health,
    Taxes,
    FurnitureRental,
    Other,
}

impl BillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillCategory::Housing => "housing",
            BillCategory::Utilities => "utilities",
            BillCategory::Transportation => "transportation",
            BillCategory::Insurance => "insurance",
            BillCategory::Subscriptions => "subscriptions",
            BillCategory::DebtPayments => "debt_payments",
            BillCategory::ChildFamily => "child_family",
            BillCategory::Health => "health",
            BillCategory::Taxes => "taxes",
            BillCategory::FurnitureRental => "furniture_rental",
            BillCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "housing" => Ok(BillCategory::Housing),
            "utilities" => Ok(BillCategory::Utilities),
            "transportation" => Ok(BillCategory::Transportation),
            "insurance" => Ok(BillCategory::Insurance),
            "subscriptions" => Ok(BillCategory::Subscriptions),
            "debt_payments" => Ok(BillCategory::DebtPayments),
            "child_family" => Ok(BillCategory::ChildFamily),
            "health" => Ok(BillCategory::Health),
            "taxes" => Ok(BillCategory::Taxes),
            "furniture_rental" => Ok(BillCategory::FurnitureRental),
            "other" => Ok(BillCategory::Other),
            _ => Err(PayplanError::Validation(format!("unknown bill category: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtType {
    CreditCard,
    StudentLoan,
    CarLoan,
    PersonalLoan,
    Mortgage,
    Medical,
    Other,
}

impl DebtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::CreditCard => "credit_card",
            DebtType::StudentLoan => "student_loan",
            DebtType::CarLoan => "car_loan",
            DebtType::PersonalLoan => "personal_loan",
            DebtType::Mortgage => "mortgage",
            DebtType::Medical => "medical",
            DebtType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "credit_card" => Ok(DebtType::CreditCard),
            "student_loan" => Ok(DebtType::StudentLoan),
            "car_loan" => Ok(DebtType::CarLoan),
            "personal_loan" => Ok(DebtType::PersonalLoan),
            "mortgage" => Ok(DebtType::Mortgage),
            "medical" => Ok(DebtType::Medical),
            "other" => Ok(DebtType::Other),
            _ => Err(PayplanError::Validation(format!("unknown debt type: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Property,
    Vehicle,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Property => "property",
            AssetType::Vehicle => "vehicle",
            AssetType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "property" => Ok(AssetType::Property),
            "vehicle" => Ok(AssetType::Vehicle),
            "other" => Ok(AssetType::Other),
            _ => Err(PayplanError::Validation(format!("unknown asset type: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtStrategy {
    Avalanche,
    Snowball,
}

impl DebtStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStrategy::Avalanche => "avalanche",
            DebtStrategy::Snowball => "snowball",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "avalanche" => Ok(DebtStrategy::Avalanche),
            "snowball" => Ok(DebtStrategy::Snowball),
            _ => Err(PayplanError::Validation(format!("unknown debt strategy: {s}"))),
        }
    }
}

text_column!(PayFrequency);
text_column!(BillFrequency);
text_column!(BillCategory);
text_column!(DebtType);
text_column!(AssetType);
text_column!(DebtStrategy);

#[derive(Debug, Clone)]
pub struct Income {
    pub id: i64,
    pub name: String,
    pub paycheck_amount: Cents,
    pub pay_frequency: PayFrequency,
    pub next_payday: Option<NaiveDate>,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct Bill {
    pub id: i64,
    pub name: String,
    pub amount: Cents,
    pub is_variable: bool,
    pub due_date: NaiveDate,
    pub late_by_date: Option<NaiveDate>,
    pub category: BillCategory,
    pub is_autopay: bool,
    pub frequency: BillFrequency,
    pub notes: Option<String>,
    pub last_paid_date: Option<NaiveDate>,
    pub allocated_amount: Cents,
    pub last_allocated_date: Option<NaiveDate>,
}

impl Bill {
    /// Date used for late-risk ordering: late_by_date when set, else due_date.
    pub fn late_by_or_due(&self) -> NaiveDate {
        self.late_by_date.unwrap_or(self.due_date)
    }
}

/// Insert payload for a bill occurrence before it has a row id.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub name: String,
    pub amount: Cents,
    pub is_variable: bool,
    pub due_date: NaiveDate,
    pub late_by_date: Option<NaiveDate>,
    pub category: BillCategory,
    pub is_autopay: bool,
    pub frequency: BillFrequency,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Debt {
    pub id: i64,
    pub name: String,
    pub balance: Cents,
    pub original_balance: Cents,
    pub minimum_payment: Option<Cents>,
    pub apr: f64,
    pub due_day: u32,
    pub late_by_day: Option<u32>,
    pub statement_day: Option<u32>,
    pub debt_type: DebtType,
    pub credit_limit: Option<Cents>,
    pub linked_asset_id: Option<i64>,
}

impl Debt {
    /// Name of the companion minimum-payment bill series.
    pub fn payment_bill_name(&self) -> String {
        format!("{}{}", self.name, PAYMENT_BILL_SUFFIX)
    }

    /// Percent of the payoff basis already paid down, if a basis exists.
    /// Basis: the linked asset's purchase price when available, else the
    /// original balance.
    pub fn percent_paid(&self, linked_purchase_price: Option<Cents>) -> Option<u32> {
        let basis = linked_purchase_price.unwrap_or(self.original_balance);
        if basis <= 0 {
            return None;
        }
        let pct = ((basis - self.balance) as f64 / basis as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u32)
    }
}

/// Insert payload for a debt before it has a row id.
#[derive(Debug, Clone)]
pub struct NewDebt {
    pub name: String,
    pub balance: Cents,
    pub original_balance: Cents,
    pub minimum_payment: Option<Cents>,
    pub apr: f64,
    pub due_day: u32,
    pub late_by_day: Option<u32>,
    pub statement_day: Option<u32>,
    pub debt_type: DebtType,
    pub credit_limit: Option<Cents>,
    pub linked_asset_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub asset_type: AssetType,
    pub current_value: Cents,
    pub purchase_price: Option<Cents>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SavingsGoal {
    pub id: i64,
    pub name: String,
    pub target_amount: Cents,
    pub current_amount: Cents,
    pub target_date: Option<NaiveDate>,
    pub priority: Option<i64>,
}

impl SavingsGoal {
    /// A goal funds only while it still needs money.
    pub fn is_active(&self) -> bool {
        self.current_amount < self.target_amount
    }

    pub fn need(&self) -> Cents {
        (self.target_amount - self.current_amount).max(0)
    }

    pub fn priority_rank(&self) -> i64 {
        self.priority.unwrap_or(DEFAULT_GOAL_PRIORITY)
    }
}

/// Zero-or-one budget for the household; never ambient state, always passed
/// explicitly into the planner.
#[derive(Debug, Clone)]
pub struct UserBudget {
    pub monthly_income: Cents,
    pub bills_percentage: f64,
    pub spending_percentage: f64,
    pub savings_percentage: f64,
    pub bills_bucket_balance: Cents,
    pub spending_bucket_balance: Cents,
    pub savings_bucket_balance: Cents,
    pub debt_strategy: DebtStrategy,
    pub has_hysa: bool,
}

impl Default for UserBudget {
    fn default() -> Self {
        Self {
            monthly_income: 0,
            bills_percentage: 50.0,
            spending_percentage: 30.0,
            savings_percentage: 20.0,
            bills_bucket_balance: 0,
            spending_bucket_balance: 0,
            savings_bucket_balance: 0,
            debt_strategy: DebtStrategy::Avalanche,
            has_hysa: false,
        }
    }
}

impl UserBudget {
    pub fn percentages_sum(&self) -> f64 {
        self.bills_percentage + self.spending_percentage + self.savings_percentage
    }
}

#[derive(Debug, Clone)]
pub struct OneTimeDeposit {
    pub id: i64,
    pub name: String,
    pub amount: Cents,
    pub expected_date: NaiveDate,
    pub notes: Option<String>,
    pub received: bool,
    pub received_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Payday history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillAllocated {
    pub bill_name: String,
    pub amount_due: Cents,
    pub amount_allocated: Cents,
    pub due_date: NaiveDate,
    pub was_autopay: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtAllocated {
    pub debt_name: String,
    pub amount_allocated: Cents,
    pub apr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalAllocated {
    pub goal_name: String,
    pub amount_allocated: Cents,
}

/// Immutable receipt of one completed payday.
#[derive(Debug, Clone)]
pub struct PaydayRecord {
    pub payday_date: NaiveDate,
    pub paycheck_amount: Cents,
    pub bills_amount: Cents,
    pub spending_amount: Cents,
    pub savings_amount: Cents,
    pub bills_allocated: Vec<BillAllocated>,
    pub debts_allocated: Vec<DebtAllocated>,
    pub savings_goals_allocated: Vec<GoalAllocated>,
    pub bills_unallocated: Cents,
    pub savings_unallocated: Cents,
}

// ---------------------------------------------------------------------------
// Income invariants
// ---------------------------------------------------------------------------

/// Enforce the at-most-one-primary invariant over the whole income collection.
///
/// With `promote` set, that income becomes the primary and every other flag is
/// cleared. Otherwise the first flagged income wins (duplicates cleared), and
/// if none is flagged the first income is promoted. Returns the ids whose flag
/// changed so callers can write just those rows back.
pub fn normalize_primary(incomes: &mut [Income], promote: Option<i64>) -> Vec<i64> {
    let mut changed = Vec::new();
    if incomes.is_empty() {
        return changed;
    }

    let keeper = match promote {
        Some(id) => incomes.iter().position(|i| i.id == id),
        None => incomes.iter().position(|i| i.is_primary),
    }
    .unwrap_or(0);

    for (idx, income) in incomes.iter_mut().enumerate() {
        let should_be = idx == keeper;
        if income.is_primary != should_be {
            income.is_primary = should_be;
            changed.push(income.id);
        }
    }
    changed
}
