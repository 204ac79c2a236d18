use serde::{Deserialize, Serialize};

use crate::config::{AUTO_LOGOUT_TIMEOUT_MS, DEFAULT_CURRENCY};

/// User-configurable display preferences, stored inside the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// ISO currency code used for display (e.g., "TZS", "KES", "USD").
    pub currency: String,

    /// Date format string shown to the user (e.g., "DD/MM/YYYY").
    pub date_format: String,

    pub financial_goals: FinancialGoals,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            date_format: "DD/MM/YYYY".to_string(),
            financial_goals: FinancialGoals::default(),
        }
    }
}

/// Free-text goals grouped by horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialGoals {
    pub short_term: Vec<String>,
    pub medium_term: Vec<String>,
    pub long_term: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// When set, the profile is sealed with the user's password before storage.
    pub local_encryption_enabled: bool,

    pub auto_logout_timeout_ms: u64,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            local_encryption_enabled: false,
            auto_logout_timeout_ms: AUTO_LOGOUT_TIMEOUT_MS,
        }
    }
}
