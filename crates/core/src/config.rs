//! Application-wide constants: expense categories, score and alert tiers,
//! storage and backup settings.

/// Currency used for a freshly created profile.
pub const DEFAULT_CURRENCY: &str = "TZS";

/// Prefix applied to every key written to the key-value store.
pub const STORAGE_KEY_PREFIX: &str = "JBP_";

/// Default multiplier for the financial freedom number (25× annual expenses).
pub const DEFAULT_FREEDOM_MULTIPLIER: f64 = 25.0;

/// Idle time before the app logs the user out (30 minutes).
pub const AUTO_LOGOUT_TIMEOUT_MS: u64 = 1_800_000;

/// Hours between automatic backups.
pub const AUTO_BACKUP_INTERVAL_HOURS: i64 = 24;

/// Longest loan term accepted (100 years of monthly payments).
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// Category assigned to recurring loan repayments.
pub const DEBT_REPAYMENT_CATEGORY: &str = "Debt Repayment";

/// A planner expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseCategory {
    pub name: &'static str,
    /// CSS hex colour used by the dashboard
    pub color: &'static str,
}

pub const EXPENSE_CATEGORIES: &[ExpenseCategory] = &[
    ExpenseCategory { name: "Housing", color: "#2563eb" },
    ExpenseCategory { name: "Food", color: "#f59e0b" },
    ExpenseCategory { name: "Transportation", color: "#ef4444" },
    ExpenseCategory { name: "Healthcare", color: "#10b981" },
    ExpenseCategory { name: "Education", color: "#06b6d4" },
    ExpenseCategory { name: "Shopping", color: "#a855f7" },
    ExpenseCategory { name: "Savings", color: "#16a34a" },
    ExpenseCategory { name: "Entertainment", color: "#ec4899" },
    ExpenseCategory { name: DEBT_REPAYMENT_CATEGORY, color: "#374151" },
    ExpenseCategory { name: "Miscellaneous", color: "#9ca3af" },
];

/// Look up a category by name (case-insensitive).
pub fn expense_category(name: &str) -> Option<&'static ExpenseCategory> {
    EXPENSE_CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// Financial health score tier, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthScoreThreshold {
    pub name: &'static str,
    pub min_score: f64,
}

/// Must stay sorted by `min_score` descending; the last entry covers everything ≥ 0.
pub const HEALTH_SCORE_THRESHOLDS: &[HealthScoreThreshold] = &[
    HealthScoreThreshold { name: "Excellent", min_score: 90.0 },
    HealthScoreThreshold { name: "Good", min_score: 70.0 },
    HealthScoreThreshold { name: "Fair", min_score: 50.0 },
    HealthScoreThreshold { name: "Poor", min_score: 0.0 },
];

/// Budget usage alert tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetAlertThreshold {
    pub level: &'static str,
    /// Percentage of the budget limit at which this level triggers
    pub percentage: f64,
    pub message: &'static str,
}

/// Sorted by `percentage` ascending.
pub const BUDGET_ALERT_THRESHOLDS: &[BudgetAlertThreshold] = &[
    BudgetAlertThreshold { level: "Warning", percentage: 80.0, message: "Approaching limit" },
    BudgetAlertThreshold { level: "Critical", percentage: 90.0, message: "Near budget limit" },
    BudgetAlertThreshold { level: "Breach", percentage: 100.0, message: "Budget limit reached" },
];
