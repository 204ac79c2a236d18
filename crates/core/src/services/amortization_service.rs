use tracing::debug;
use uuid::Uuid;

use crate::calendar;
use crate::config::DEBT_REPAYMENT_CATEGORY;
use crate::errors::CoreError;
use crate::models::loan::{
    AmortizationEntry, Frequency, LoanPlan, LoanSummary, LoanTerms, RecurringExpense,
};

/// Fixed-payment loan amortization: monthly payment, full schedule,
/// and the planner template for the repayment.
///
/// Stateless; every call works only on its arguments.
pub struct AmortizationService;

impl AmortizationService {
    pub fn new() -> Self {
        Self
    }

    /// Fixed monthly payment for an amortizing loan.
    ///
    /// `M = P · i(1+i)^n / ((1+i)^n − 1)` with `i = rate / 100 / 12`,
    /// or `P / n` when the rate is zero. No rounding is applied.
    ///
    /// The caller must pass `term_months >= 1` and non-negative principal
    /// and rate; other inputs produce non-finite results. Use
    /// [`generate_schedule`](Self::generate_schedule) for validated input.
    pub fn compute_monthly_payment(&self, principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
        let n = f64::from(term_months);
        if annual_rate_percent == 0.0 {
            return principal / n;
        }
        let monthly_rate = annual_rate_percent / 100.0 / 12.0;
        let power_term = (1.0 + monthly_rate).powf(n);
        principal * (monthly_rate * power_term) / (power_term - 1.0)
    }

    /// Build the month-by-month schedule for a loan.
    ///
    /// Terms are validated first (including the term cap and date range), and
    /// a rate so large that the payment overflows is rejected as
    /// `InvalidLoanTerms`.
    ///
    /// The payment is computed once and reused for every period. On the last
    /// period the remaining balance is folded into the principal portion and
    /// the balance is set to exactly 0.0 (see [`apply_final_period_adjustment`]).
    pub fn generate_schedule(&self, terms: &LoanTerms) -> Result<LoanSummary, CoreError> {
        terms.validate()?;

        let payment = self.compute_monthly_payment(
            terms.principal,
            terms.annual_rate_percent,
            terms.term_months,
        );
        if !payment.is_finite() {
            return Err(CoreError::InvalidLoanTerms(format!(
                "rate of {}% over {} months does not yield a finite payment",
                terms.annual_rate_percent, terms.term_months
            )));
        }
        let monthly_rate = terms.monthly_rate();

        let mut balance = terms.principal;
        let mut total_interest_paid = 0.0;
        let mut schedule = Vec::with_capacity(terms.term_months as usize);

        for month in 1..=terms.term_months {
            let interest_portion = balance * monthly_rate;
            let principal_portion = payment - interest_portion;

            total_interest_paid += interest_portion;
            balance -= principal_portion;

            let due_date = calendar::add_months(terms.start_date, month).ok_or_else(|| {
                CoreError::InvalidLoanTerms(format!(
                    "due date for month {month} is out of the supported date range"
                ))
            })?;

            let mut entry = AmortizationEntry {
                month_index: month,
                due_date,
                payment_amount: payment,
                interest_portion,
                principal_portion,
                remaining_balance: balance,
                balancing_adjustment: 0.0,
            };

            if month == terms.term_months {
                apply_final_period_adjustment(&mut entry);
                balance = 0.0;
            }

            schedule.push(entry);
        }

        debug!(
            loan = %terms.name,
            term_months = terms.term_months,
            monthly_payment = payment,
            total_interest_paid,
            final_balance = balance,
            "generated amortization schedule"
        );

        let next_payment_date = schedule
            .first()
            .map(|e| e.due_date)
            .unwrap_or(terms.start_date);

        Ok(LoanSummary {
            name: terms.name.clone(),
            principal: terms.principal,
            rate_percent: terms.annual_rate_percent,
            term_months: terms.term_months,
            start_date: terms.start_date,
            total_interest_paid,
            total_repaid: terms.principal + total_interest_paid,
            monthly_payment: payment,
            next_payment_date,
            schedule,
        })
    }

    /// Process a newly entered loan: schedule plus planner template, linked by
    /// a fresh random token.
    pub fn process_new_loan(&self, terms: &LoanTerms) -> Result<LoanPlan, CoreError> {
        let token = Uuid::new_v4().simple().to_string();
        self.process_new_loan_with_token(terms, &token)
    }

    /// Same as [`process_new_loan`](Self::process_new_loan) with a caller-supplied
    /// uniqueness token for the loan id.
    pub fn process_new_loan_with_token(
        &self,
        terms: &LoanTerms,
        token: &str,
    ) -> Result<LoanPlan, CoreError> {
        let summary = self.generate_schedule(terms)?;
        let recurring_expense = recurring_expense_for(&summary, token);
        Ok(LoanPlan {
            summary,
            recurring_expense,
        })
    }
}

impl Default for AmortizationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Final-period balancing adjustment.
///
/// Floating-point drift leaves a small residual balance after the last
/// regular payment. It is moved into the entry's principal portion, recorded
/// in `balancing_adjustment`, and the remaining balance becomes exactly 0.0.
pub fn apply_final_period_adjustment(entry: &mut AmortizationEntry) {
    let residual = entry.remaining_balance;
    entry.principal_portion += residual;
    entry.balancing_adjustment = residual;
    entry.remaining_balance = 0.0;
}

/// Lowercase the loan name and replace each whitespace character with `_`.
pub fn loan_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn recurring_expense_for(summary: &LoanSummary, token: &str) -> RecurringExpense {
    RecurringExpense {
        name: format!("{} Payment", summary.name),
        amount: summary.monthly_payment,
        category: DEBT_REPAYMENT_CATEGORY.to_string(),
        first_due: summary.next_payment_date,
        frequency: Frequency::Monthly,
        is_recurring: true,
        loan_id: format!("{}_{}", loan_slug(&summary.name), token),
    }
}
