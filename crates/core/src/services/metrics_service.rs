use tracing::{debug, warn};

use crate::config::{
    HealthScoreThreshold, BUDGET_ALERT_THRESHOLDS, DEFAULT_FREEDOM_MULTIPLIER,
    HEALTH_SCORE_THRESHOLDS,
};
use crate::models::metrics::{BudgetAlert, DebtStrategy, EmergencyFundPlan, MonthsToGoal};
use crate::models::profile::{Debt, FinancialSnapshot};

/// Financial health formulas: net worth, ratios, growth and savings goals.
///
/// Every method is a pure function of its arguments. Divisions by a
/// possibly-zero denominator return 0.0 instead of NaN/infinity.
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    pub fn total_income(&self, snapshot: &FinancialSnapshot) -> f64 {
        snapshot.income.total()
    }

    pub fn total_debts(&self, snapshot: &FinancialSnapshot) -> f64 {
        snapshot.debts.iter().map(|d| d.amount).sum()
    }

    pub fn total_assets(&self, snapshot: &FinancialSnapshot) -> f64 {
        snapshot.assets.iter().map(|a| a.value).sum()
    }

    /// Fixed plus variable monthly expenses.
    pub fn monthly_expenses(&self, snapshot: &FinancialSnapshot) -> f64 {
        snapshot.expenses.total()
    }

    /// Σ assets − Σ debts. May be negative.
    pub fn net_worth(&self, snapshot: &FinancialSnapshot) -> f64 {
        self.total_assets(snapshot) - self.total_debts(snapshot)
    }

    /// Total debt as a percentage of annual income (monthly income × 12).
    ///
    /// This compares outstanding balances, not monthly repayments, against
    /// income. Returns 0.0 when there is no income.
    pub fn debt_to_income_ratio(&self, snapshot: &FinancialSnapshot) -> f64 {
        let total_income = self.total_income(snapshot);
        if total_income == 0.0 {
            return 0.0;
        }
        (self.total_debts(snapshot) / (total_income * 12.0)) * 100.0
    }

    /// Savings as a percentage of income. Returns 0.0 when there is no income.
    pub fn savings_rate(&self, snapshot: &FinancialSnapshot, total_savings: f64) -> f64 {
        let total_income = self.total_income(snapshot);
        if total_income == 0.0 {
            return 0.0;
        }
        (total_savings / total_income) * 100.0
    }

    /// Investment target for financial independence: annual expenses × multiplier.
    pub fn financial_freedom_number(&self, annual_expenses: f64, multiplier: f64) -> f64 {
        annual_expenses * multiplier
    }

    /// [`financial_freedom_number`](Self::financial_freedom_number) with the 25× rule.
    pub fn default_financial_freedom_number(&self, annual_expenses: f64) -> f64 {
        self.financial_freedom_number(annual_expenses, DEFAULT_FREEDOM_MULTIPLIER)
    }

    /// Compound annual growth rate in percent.
    ///
    /// Returns 0.0 when `initial_investment <= 0` or `years == 0`.
    pub fn investment_return_cagr(&self, initial_investment: f64, final_value: f64, years: f64) -> f64 {
        debug!(initial_investment, final_value, years, "running CAGR calculator");
        if initial_investment <= 0.0 || years == 0.0 {
            return 0.0;
        }
        ((final_value / initial_investment).powf(1.0 / years) - 1.0) * 100.0
    }

    /// Future value of a starting balance plus monthly contributions,
    /// compounded monthly over `years × 12` periods.
    ///
    /// With a zero return rate the result is simply
    /// `initial_balance + monthly_contribution × periods`.
    pub fn retirement_projection(
        &self,
        initial_balance: f64,
        monthly_contribution: f64,
        annual_return_rate: f64,
        years: f64,
    ) -> f64 {
        debug!(
            initial_balance,
            monthly_contribution, annual_return_rate, years, "running retirement projection"
        );
        let monthly_rate = annual_return_rate / 100.0 / 12.0;
        let num_periods = years * 12.0;

        if monthly_rate == 0.0 {
            return initial_balance + monthly_contribution * num_periods;
        }

        let power_term = (1.0 + monthly_rate).powf(num_periods);
        let fv_lump_sum = initial_balance * power_term;
        let fv_annuity = monthly_contribution * ((power_term - 1.0) / monthly_rate);
        fv_lump_sum + fv_annuity
    }

    /// Emergency fund target, shortfall and time to reach it.
    pub fn emergency_fund_target(
        &self,
        monthly_expenses: f64,
        months_coverage: f64,
        current_savings: f64,
        monthly_savings_target: f64,
    ) -> EmergencyFundPlan {
        debug!(
            monthly_expenses,
            months_coverage, current_savings, monthly_savings_target, "running emergency fund calculator"
        );
        let target_amount = monthly_expenses * months_coverage;
        let shortfall = (target_amount - current_savings).max(0.0);
        let months_to_goal = if monthly_savings_target > 0.0 {
            MonthsToGoal::Months((shortfall / monthly_savings_target).ceil() as u64)
        } else {
            MonthsToGoal::Never
        };

        EmergencyFundPlan {
            target_amount,
            shortfall,
            months_to_goal,
            recommendation: format!(
                "Target: {months_coverage} months of expenses ({target_amount:.0})"
            ),
        }
    }

    /// Sort debts into repayment priority order.
    ///
    /// Only the ordering is provided; no payoff timeline is simulated.
    /// Ties keep their input order.
    pub fn order_debts_for_payoff(&self, debts: &[Debt], strategy: DebtStrategy) -> Vec<Debt> {
        let mut ordered = debts.to_vec();
        match strategy {
            DebtStrategy::Snowball => ordered.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
            DebtStrategy::Avalanche => ordered.sort_by(|a, b| {
                b.annual_rate_percent.total_cmp(&a.annual_rate_percent)
            }),
        }
        ordered
    }

    /// Tier for a 0–100 financial health score. Scores below zero or NaN are Poor.
    pub fn health_tier(&self, score: f64) -> &'static HealthScoreThreshold {
        HEALTH_SCORE_THRESHOLDS
            .iter()
            .find(|t| score >= t.min_score)
            .unwrap_or(&HEALTH_SCORE_THRESHOLDS[HEALTH_SCORE_THRESHOLDS.len() - 1])
    }

    /// Highest alert level reached by `spent` against `limit`, if any.
    pub fn budget_alert(&self, spent: f64, limit: f64) -> Option<BudgetAlert> {
        if limit.is_nan() || limit <= 0.0 || !spent.is_finite() {
            warn!(spent, limit, "budget alert requested with unusable input");
            return None;
        }
        let usage_pct = spent / limit * 100.0;
        BUDGET_ALERT_THRESHOLDS
            .iter()
            .rev()
            .find(|t| usage_pct >= t.percentage)
            .map(|t| BudgetAlert {
                level: t.level.to_string(),
                message: t.message.to_string(),
                usage_pct,
            })
    }
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}
