pub mod calendar;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Once;

use models::{
    loan::{LoanPlan, LoanSummary, LoanTerms, RecurringExpense},
    metrics::EmergencyFundPlan,
    profile::{Asset, Debt, Expenses, Income, UserProfile},
};
use services::{amortization_service::AmortizationService, metrics_service::MetricsService};
use storage::{manager::StorageManager, store::KeyValueStore};

use errors::CoreError;

/// Storage key of the user profile.
pub const PROFILE_KEY: &str = "userProfile";
/// Storage key of the processed loans.
pub const LOANS_KEY: &str = "loans";
/// Storage key of the planner's recurring expenses.
pub const RECURRING_EXPENSES_KEY: &str = "recurringExpenses";

static INIT_TRACING: Once = Once::new();

/// Install a global `tracing` subscriber (fmt + `RUST_LOG` filter,
/// `jibajeti_core=info` by default). Safe to call more than once.
///
/// The library never calls this itself; hosts that already install a
/// subscriber should skip it.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("jibajeti_core=info"));
        // Another subscriber may already be installed by the host.
        let _ = fmt().with_env_filter(filter).try_init();
        tracing::info!("jibajeti-core tracing initialized");
    });
}

/// Main entry point for the Ji-bajeti core library.
/// Holds the user's profile and loans, plus the services that compute on them.
#[must_use]
pub struct JiBajeti {
    profile: UserProfile,
    loans: Vec<LoanPlan>,
    amortization_service: AmortizationService,
    metrics_service: MetricsService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for JiBajeti {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiBajeti")
            .field("user", &self.profile.personal.user_name)
            .field("loans", &self.loans.len())
            .field("debts", &self.profile.financial.debts.len())
            .field("assets", &self.profile.financial.assets.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl JiBajeti {
    /// Start with a default profile and no loans.
    pub fn create_new() -> Self {
        Self::build(UserProfile::default(), Vec::new())
    }

    /// Load profile and loans from storage. Missing keys fall back to a fresh
    /// profile / empty loan list.
    ///
    /// A password is required when the stored data was sealed.
    pub fn load<S: KeyValueStore>(
        storage: &StorageManager<S>,
        password: Option<&str>,
    ) -> Result<Self, CoreError> {
        let (profile, loans) = match password {
            Some(pw) => (
                storage.load_sealed::<UserProfile>(PROFILE_KEY, pw)?,
                storage.load_sealed::<Vec<LoanPlan>>(LOANS_KEY, pw)?,
            ),
            None => (
                storage.load::<UserProfile>(PROFILE_KEY)?,
                storage.load::<Vec<LoanPlan>>(LOANS_KEY)?,
            ),
        };
        Ok(Self::build(
            profile.unwrap_or_default(),
            loans.unwrap_or_default(),
        ))
    }

    /// Save profile, loans and the recurring-expense list.
    ///
    /// When the profile has local encryption enabled, a password is required
    /// and profile and loans are sealed. The recurring-expense list is always
    /// stored as plain JSON for the planner.
    ///
    /// Writes are not transactional. If a write fails, the error is returned,
    /// the unsaved-changes flag stays set, and the stored profile keeps its
    /// previous value; loans written before the failure may already be newer.
    /// Clears the unsaved-changes flag on success.
    pub fn save<S: KeyValueStore>(
        &mut self,
        storage: &mut StorageManager<S>,
        password: Option<&str>,
    ) -> Result<(), CoreError> {
        // Loans and the planner list go first; the profile is written last, so a
        // failure before it leaves the stored profile untouched.
        if self.profile.security.local_encryption_enabled {
            let pw = password.ok_or_else(|| {
                CoreError::ValidationError(
                    "local encryption is enabled; a password is required to save".into(),
                )
            })?;
            storage.save_sealed(LOANS_KEY, &self.loans, pw)?;
            storage.save(RECURRING_EXPENSES_KEY, &self.recurring_expenses())?;
            storage.save_sealed(PROFILE_KEY, &self.profile, pw)?;
        } else {
            storage.save(LOANS_KEY, &self.loans)?;
            storage.save(RECURRING_EXPENSES_KEY, &self.recurring_expenses())?;
            storage.save(PROFILE_KEY, &self.profile)?;
        }
        self.dirty = false;
        Ok(())
    }

    /// Returns `true` if anything changed since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Profile ─────────────────────────────────────────────────────

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// New users go through the onboarding quiz before using the dashboard.
    #[must_use]
    pub fn needs_onboarding(&self) -> bool {
        !self.profile.personal.onboarding_complete
    }

    /// Mark onboarding as done and record the user's name.
    pub fn complete_onboarding(&mut self, user_name: &str) -> Result<(), CoreError> {
        let name = user_name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError("user name must not be empty".into()));
        }
        self.profile.personal.user_name = name.to_string();
        self.profile.personal.onboarding_complete = true;
        self.dirty = true;
        Ok(())
    }

    /// Set the display currency. Must be exactly 3 ASCII letters.
    pub fn set_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        let code = currency.trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., TZS, KES, USD)"
            )));
        }
        self.profile.preferences.currency = code;
        self.dirty = true;
        Ok(())
    }

    /// Turn sealing of the stored profile on or off (takes effect on next save).
    pub fn set_local_encryption(&mut self, enabled: bool) {
        self.profile.security.local_encryption_enabled = enabled;
        self.dirty = true;
    }

    pub fn set_income(&mut self, income: Income) -> Result<(), CoreError> {
        for (label, v) in [
            ("primary", income.primary),
            ("secondary", income.secondary),
            ("passive", income.passive),
        ] {
            non_negative(label, v)?;
        }
        self.profile.financial.income = income;
        self.dirty = true;
        Ok(())
    }

    pub fn set_expenses(&mut self, expenses: Expenses) -> Result<(), CoreError> {
        non_negative("fixed expenses", expenses.fixed)?;
        non_negative("variable expenses", expenses.variable)?;
        self.profile.financial.expenses = expenses;
        self.dirty = true;
        Ok(())
    }

    pub fn add_debt(&mut self, debt: Debt) -> Result<(), CoreError> {
        non_negative("debt amount", debt.amount)?;
        non_negative("debt interest rate", debt.annual_rate_percent)?;
        self.profile.financial.debts.push(debt);
        self.dirty = true;
        Ok(())
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<(), CoreError> {
        if !asset.value.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "asset value must be a finite number, got {}",
                asset.value
            )));
        }
        self.profile.financial.assets.push(asset);
        self.dirty = true;
        Ok(())
    }

    // ── Loans ───────────────────────────────────────────────────────

    /// Amortize a new loan and register its recurring repayment.
    /// Returns the plan; its `recurring_expense.loan_id` identifies the loan.
    pub fn add_loan(&mut self, terms: &LoanTerms) -> Result<LoanPlan, CoreError> {
        let plan = self.amortization_service.process_new_loan(terms)?;
        self.loans.push(plan.clone());
        self.dirty = true;
        Ok(plan)
    }

    /// Remove a loan (and its recurring expense) by loan id.
    pub fn remove_loan(&mut self, loan_id: &str) -> Result<LoanPlan, CoreError> {
        let idx = self
            .loans
            .iter()
            .position(|p| p.recurring_expense.loan_id == loan_id)
            .ok_or_else(|| CoreError::LoanNotFound(loan_id.to_string()))?;
        self.dirty = true;
        Ok(self.loans.remove(idx))
    }

    /// Processed loans, in the order they were added.
    #[must_use]
    pub fn loans(&self) -> Vec<&LoanSummary> {
        self.loans.iter().map(|p| &p.summary).collect()
    }

    #[must_use]
    pub fn get_loan(&self, loan_id: &str) -> Option<&LoanSummary> {
        self.loans
            .iter()
            .find(|p| p.recurring_expense.loan_id == loan_id)
            .map(|p| &p.summary)
    }

    /// Recurring repayment templates for the planner, one per loan.
    #[must_use]
    pub fn recurring_expenses(&self) -> Vec<RecurringExpense> {
        self.loans
            .iter()
            .map(|p| p.recurring_expense.clone())
            .collect()
    }

    /// Sum of monthly payments across all loans.
    #[must_use]
    pub fn total_monthly_loan_payments(&self) -> f64 {
        self.loans.iter().map(|p| p.summary.monthly_payment).sum()
    }

    // ── Metrics ─────────────────────────────────────────────────────

    #[must_use]
    pub fn net_worth(&self) -> f64 {
        self.metrics_service.net_worth(&self.profile.financial)
    }

    #[must_use]
    pub fn debt_to_income_ratio(&self) -> f64 {
        self.metrics_service
            .debt_to_income_ratio(&self.profile.financial)
    }

    #[must_use]
    pub fn savings_rate(&self, total_savings: f64) -> f64 {
        self.metrics_service
            .savings_rate(&self.profile.financial, total_savings)
    }

    /// Freedom number from the profile's monthly expenses (× 12 for a year).
    /// `None` uses the default 25× multiplier.
    #[must_use]
    pub fn financial_freedom_number(&self, multiplier: Option<f64>) -> f64 {
        let annual_expenses = self.metrics_service.monthly_expenses(&self.profile.financial) * 12.0;
        match multiplier {
            Some(m) => self
                .metrics_service
                .financial_freedom_number(annual_expenses, m),
            None => self
                .metrics_service
                .default_financial_freedom_number(annual_expenses),
        }
    }

    /// Emergency fund plan based on the profile's monthly expenses.
    #[must_use]
    pub fn emergency_fund(
        &self,
        months_coverage: f64,
        current_savings: f64,
        monthly_savings_target: f64,
    ) -> EmergencyFundPlan {
        let monthly_expenses = self.metrics_service.monthly_expenses(&self.profile.financial);
        self.metrics_service.emergency_fund_target(
            monthly_expenses,
            months_coverage,
            current_savings,
            monthly_savings_target,
        )
    }

    /// Name of the tier a 0–100 health score falls into.
    #[must_use]
    pub fn health_tier(&self, score: f64) -> &'static str {
        self.metrics_service.health_tier(score).name
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(profile: UserProfile, loans: Vec<LoanPlan>) -> Self {
        Self {
            profile,
            loans,
            amortization_service: AmortizationService::new(),
            metrics_service: MetricsService::new(),
            dirty: false,
        }
    }
}

fn non_negative(label: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::ValidationError(format!(
            "{label} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
