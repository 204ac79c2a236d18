use serde::{Deserialize, Serialize};

/// How many months until a savings goal is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthsToGoal {
    Months(u64),
    /// No positive monthly saving, so the goal is never reached
    Never,
}

impl std::fmt::Display for MonthsToGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthsToGoal::Months(n) => write!(f, "{n} months"),
            MonthsToGoal::Never => write!(f, "never"),
        }
    }
}

/// Result of the emergency fund calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyFundPlan {
    /// monthly expenses × months of coverage
    pub target_amount: f64,

    /// max(0, target - current savings)
    pub shortfall: f64,

    pub months_to_goal: MonthsToGoal,

    /// Human-readable summary for the dashboard
    pub recommendation: String,
}

/// Ordering used when prioritising debt repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtStrategy {
    /// Lowest balance first
    Snowball,
    /// Highest interest rate first
    Avalanche,
}

/// A budget usage alert raised when spending crosses a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub level: String,
    pub message: String,
    /// spent / limit × 100
    pub usage_pct: f64,
}
