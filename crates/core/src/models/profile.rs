use serde::{Deserialize, Serialize};

use super::settings::{Preferences, SecuritySettings};

/// The persisted user profile. Every section falls back to its default when
/// missing from stored data, so older or partial profiles still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub personal: PersonalInfo,
    pub financial: FinancialSnapshot,
    pub preferences: Preferences,
    pub security: SecuritySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub user_name: String,
    pub email: String,
    pub onboarding_complete: bool,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        Self {
            user_name: "New User".to_string(),
            email: String::new(),
            onboarding_complete: false,
        }
    }
}

/// Income, expenses, debts and assets — the read-only input to every metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialSnapshot {
    pub income: Income,
    pub expenses: Expenses,
    pub debts: Vec<Debt>,
    pub assets: Vec<Asset>,
}

/// Monthly income streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Income {
    pub primary: f64,
    pub secondary: f64,
    pub passive: f64,
}

impl Income {
    pub fn total(&self) -> f64 {
        self.primary + self.secondary + self.passive
    }
}

/// Monthly expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expenses {
    pub fixed: f64,
    pub variable: f64,
}

impl Expenses {
    pub fn total(&self) -> f64 {
        self.fixed + self.variable
    }
}

/// An outstanding debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub name: String,

    /// Outstanding balance
    pub amount: f64,

    /// Annual interest rate in percent
    #[serde(default)]
    pub annual_rate_percent: f64,

    /// Minimum monthly payment
    #[serde(default)]
    pub minimum_payment: f64,
}

impl Debt {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            annual_rate_percent: 0.0,
            minimum_payment: 0.0,
        }
    }

    pub fn with_rate(mut self, annual_rate_percent: f64) -> Self {
        self.annual_rate_percent = annual_rate_percent;
        self
    }
}

/// Something the user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub value: f64,
}

impl Asset {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
