use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::config::MAX_TERM_MONTHS;
use crate::errors::CoreError;

/// Terms of a new loan as entered in the "Add New Loan" form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Display name (e.g., "Car Loan")
    pub name: String,

    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual interest rate in percent (12.0 = 12 %)
    pub annual_rate_percent: f64,

    /// Number of monthly payments
    pub term_months: u32,

    /// Date the loan starts; the first payment falls one month later
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        name: impl Into<String>,
        principal: f64,
        annual_rate_percent: f64,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            principal,
            annual_rate_percent,
            term_months,
            start_date,
        }
    }

    /// Check the terms before any computation runs.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidLoanTerms("loan name must not be empty".into()));
        }
        if self.term_months < 1 {
            return Err(CoreError::InvalidLoanTerms(
                "term must be at least 1 month".into(),
            ));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(CoreError::InvalidLoanTerms(format!(
                "term of {} months exceeds the maximum of {MAX_TERM_MONTHS}",
                self.term_months
            )));
        }
        if calendar::add_months(self.start_date, self.term_months).is_none() {
            return Err(CoreError::InvalidLoanTerms(
                "final due date is out of the supported date range".into(),
            ));
        }
        if !self.principal.is_finite() || self.principal < 0.0 {
            return Err(CoreError::InvalidLoanTerms(format!(
                "principal must be a non-negative number, got {}",
                self.principal
            )));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(CoreError::InvalidLoanTerms(format!(
                "annual rate must be a non-negative number, got {}",
                self.annual_rate_percent
            )));
        }
        Ok(())
    }

    /// Periodic rate used by the schedule (0.0 for interest-free loans).
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }
}

/// One row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based month number
    pub month_index: u32,

    pub due_date: NaiveDate,

    /// Fixed monthly payment (same for every entry)
    pub payment_amount: f64,

    pub interest_portion: f64,

    pub principal_portion: f64,

    /// Balance left after this payment; exactly 0.0 on the last entry
    pub remaining_balance: f64,

    /// Residual balance folded into `principal_portion` by the final-period
    /// balancing adjustment. Always 0.0 except on the last entry.
    #[serde(default)]
    pub balancing_adjustment: f64,
}

/// A fully amortized loan, derived from its [`LoanTerms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub name: String,
    pub principal: f64,
    pub rate_percent: f64,
    pub term_months: u32,
    pub start_date: NaiveDate,

    /// Sum of every entry's interest portion
    pub total_interest_paid: f64,

    /// principal + total_interest_paid
    pub total_repaid: f64,

    pub monthly_payment: f64,

    /// Due date of the first scheduled payment
    pub next_payment_date: NaiveDate,

    /// Entries ordered by month ascending
    pub schedule: Vec<AmortizationEntry>,
}

impl LoanSummary {
    /// Remaining balance after `month` payments. Month 0 is the full principal;
    /// months past the term report 0.0.
    #[must_use]
    pub fn remaining_balance_after(&self, month: u32) -> f64 {
        if month == 0 {
            return self.principal;
        }
        self.schedule
            .iter()
            .find(|e| e.month_index == month)
            .map(|e| e.remaining_balance)
            .unwrap_or(0.0)
    }

    /// Entries whose due date falls within `from..=to`.
    #[must_use]
    pub fn entries_due_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&AmortizationEntry> {
        self.schedule
            .iter()
            .filter(|e| e.due_date >= from && e.due_date <= to)
            .collect()
    }

    /// Sum of principal portions across the schedule.
    #[must_use]
    pub fn total_principal_paid(&self) -> f64 {
        self.schedule.iter().map(|e| e.principal_portion).sum()
    }
}

/// How often a recurring expense repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "Monthly"),
        }
    }
}

/// Planner template created for every new loan, so the monthly repayment
/// shows up in the budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    /// "<loan name> Payment"
    pub name: String,

    /// Equal to the loan's monthly payment
    pub amount: f64,

    /// Always "Debt Repayment"
    pub category: String,

    pub first_due: NaiveDate,

    pub frequency: Frequency,

    pub is_recurring: bool,

    /// Slugged loan name plus a uniqueness token, e.g. `car_loan_5f0c…`
    pub loan_id: String,
}

/// Output of processing a new loan: the summary and its planner stub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPlan {
    pub summary: LoanSummary,
    pub recurring_expense: RecurringExpense,
}
