// ═══════════════════════════════════════════════════════════════════
// Integration Tests — JiBajeti facade: profile, loans, metrics, persistence
// ═══════════════════════════════════════════════════════════════════

use std::cell::Cell;
use std::rc::Rc;

use chrono::NaiveDate;

use jibajeti_core::errors::CoreError;
use jibajeti_core::models::loan::{LoanPlan, LoanTerms, RecurringExpense};
use jibajeti_core::models::metrics::MonthsToGoal;
use jibajeti_core::models::profile::{Asset, Debt, Expenses, Income, UserProfile};
use jibajeti_core::storage::envelope::KdfParams;
use jibajeti_core::storage::manager::StorageManager;
use jibajeti_core::storage::store::{KeyValueStore, MemoryStore};
use jibajeti_core::{JiBajeti, LOANS_KEY, PROFILE_KEY, RECURRING_EXPENSES_KEY};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn storage() -> StorageManager<MemoryStore> {
    StorageManager::with_kdf_params(
        MemoryStore::new(),
        KdfParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        },
    )
}

fn populated() -> JiBajeti {
    let mut app = JiBajeti::create_new();
    app.set_income(Income {
        primary: 1_500_000.0,
        secondary: 300_000.0,
        passive: 200_000.0,
    })
    .unwrap();
    app.set_expenses(Expenses {
        fixed: 600_000.0,
        variable: 400_000.0,
    })
    .unwrap();
    app.add_debt(Debt::new("SACCO loan", 6_000_000.0).with_rate(14.0))
        .unwrap();
    app.add_asset(Asset::new("Land", 20_000_000.0)).unwrap();
    app.add_asset(Asset::new("M-Pesa", 500_000.0)).unwrap();
    app
}

// ═══════════════════════════════════════════════════════════════════
//  Profile lifecycle
// ═══════════════════════════════════════════════════════════════════

mod profile {
    use super::*;

    #[test]
    fn new_app_needs_onboarding_and_is_clean() {
        let app = JiBajeti::create_new();
        assert!(app.needs_onboarding());
        assert!(!app.has_unsaved_changes());
        assert!(app.loans().is_empty());
    }

    #[test]
    fn complete_onboarding() {
        let mut app = JiBajeti::create_new();
        app.complete_onboarding("  Neema ").unwrap();
        assert!(!app.needs_onboarding());
        assert_eq!(app.profile().personal.user_name, "Neema");
        assert!(app.has_unsaved_changes());
    }

    #[test]
    fn onboarding_needs_a_name() {
        let mut app = JiBajeti::create_new();
        assert!(matches!(
            app.complete_onboarding(" "),
            Err(CoreError::ValidationError(_))
        ));
        assert!(app.needs_onboarding());
    }

    #[test]
    fn currency_validation() {
        let mut app = JiBajeti::create_new();
        app.set_currency("kes").unwrap();
        assert_eq!(app.profile().preferences.currency, "KES");
        assert!(app.set_currency("SHILLING").is_err());
        assert!(app.set_currency("K3S").is_err());
        assert_eq!(app.profile().preferences.currency, "KES");
    }

    #[test]
    fn negative_inputs_rejected() {
        let mut app = JiBajeti::create_new();
        assert!(app
            .set_income(Income {
                primary: -1.0,
                secondary: 0.0,
                passive: 0.0
            })
            .is_err());
        assert!(app.add_debt(Debt::new("bad", -10.0)).is_err());
        assert!(app.add_asset(Asset::new("bad", f64::NAN)).is_err());
        assert!(!app.has_unsaved_changes());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Metrics through the facade
// ═══════════════════════════════════════════════════════════════════

mod metrics {
    use super::*;

    #[test]
    fn dashboard_numbers() {
        let app = populated();
        assert_eq!(app.net_worth(), 14_500_000.0);
        // 6,000,000 / (2,000,000 × 12) × 100
        assert!((app.debt_to_income_ratio() - 25.0).abs() < 1e-9);
        assert!((app.savings_rate(500_000.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn freedom_number_from_monthly_expenses() {
        let app = populated();
        assert_eq!(app.financial_freedom_number(None), 300_000_000.0);
        assert_eq!(app.financial_freedom_number(Some(10.0)), 120_000_000.0);
    }

    #[test]
    fn emergency_fund_from_profile() {
        let app = populated();
        let plan = app.emergency_fund(3.0, 1_000_000.0, 500_000.0);
        assert_eq!(plan.target_amount, 3_000_000.0);
        assert_eq!(plan.shortfall, 2_000_000.0);
        assert_eq!(plan.months_to_goal, MonthsToGoal::Months(4));
    }

    #[test]
    fn empty_profile_ratios_are_zero() {
        let app = JiBajeti::create_new();
        assert_eq!(app.debt_to_income_ratio(), 0.0);
        assert_eq!(app.savings_rate(1000.0), 0.0);
        assert_eq!(app.net_worth(), 0.0);
    }

    #[test]
    fn health_tier_name() {
        assert_eq!(JiBajeti::create_new().health_tier(72.0), "Good");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Loans
// ═══════════════════════════════════════════════════════════════════

mod loans {
    use super::*;

    fn car_loan() -> LoanTerms {
        LoanTerms::new("Car Loan", 1_200_000.0, 12.0, 12, d(2024, 1, 1))
    }

    #[test]
    fn add_loan_registers_recurring_expense() {
        let mut app = JiBajeti::create_new();
        let plan = app.add_loan(&car_loan()).unwrap();
        assert_eq!(app.loans().len(), 1);
        let expenses = app.recurring_expenses();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0], plan.recurring_expense);
        assert_eq!(
            app.get_loan(&plan.recurring_expense.loan_id).unwrap().schedule.len(),
            12
        );
        assert!(app.has_unsaved_changes());
    }

    #[test]
    fn total_monthly_payments() {
        let mut app = JiBajeti::create_new();
        app.add_loan(&car_loan()).unwrap();
        app.add_loan(&LoanTerms::new("Phone", 1200.0, 0.0, 12, d(2024, 1, 1)))
            .unwrap();
        let expected = app.loans()[0].monthly_payment + 100.0;
        assert!((app.total_monthly_loan_payments() - expected).abs() < 1e-9);
    }

    #[test]
    fn invalid_loan_not_added() {
        let mut app = JiBajeti::create_new();
        let mut terms = car_loan();
        terms.principal = -5.0;
        assert!(matches!(
            app.add_loan(&terms),
            Err(CoreError::InvalidLoanTerms(_))
        ));
        assert!(app.loans().is_empty());
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn remove_loan() {
        let mut app = JiBajeti::create_new();
        let plan = app.add_loan(&car_loan()).unwrap();
        let removed = app.remove_loan(&plan.recurring_expense.loan_id).unwrap();
        assert_eq!(removed, plan);
        assert!(app.recurring_expenses().is_empty());
        assert!(matches!(
            app.remove_loan(&plan.recurring_expense.loan_id),
            Err(CoreError::LoanNotFound(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Persistence
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[test]
    fn load_from_empty_storage_gives_fresh_app() {
        let app = JiBajeti::load(&storage(), None).unwrap();
        assert!(app.needs_onboarding());
        assert!(app.loans().is_empty());
    }

    #[test]
    fn save_and_reload_plain() {
        let mut store = storage();
        let mut app = populated();
        app.complete_onboarding("Neema").unwrap();
        let plan = app
            .add_loan(&LoanTerms::new("Car Loan", 1_200_000.0, 12.0, 12, d(2024, 1, 1)))
            .unwrap();
        app.save(&mut store, None).unwrap();
        assert!(!app.has_unsaved_changes());

        let reloaded = JiBajeti::load(&store, None).unwrap();
        assert_eq!(reloaded.profile(), app.profile());
        assert_eq!(reloaded.loans().len(), 1);
        assert_eq!(reloaded.loans()[0], &plan.summary);
        assert!(!reloaded.has_unsaved_changes());

        let planner: Vec<RecurringExpense> = store.load(RECURRING_EXPENSES_KEY).unwrap().unwrap();
        assert_eq!(planner, vec![plan.recurring_expense]);
    }

    #[test]
    fn encrypted_profile_requires_password() {
        let mut store = storage();
        let mut app = populated();
        app.set_local_encryption(true);
        assert!(matches!(
            app.save(&mut store, None),
            Err(CoreError::ValidationError(_))
        ));

        app.save(&mut store, Some("s3cret")).unwrap();
        assert!(JiBajeti::load(&store, None).is_err());
        assert!(matches!(
            JiBajeti::load(&store, Some("wrong")),
            Err(CoreError::Decryption)
        ));

        let reloaded = JiBajeti::load(&store, Some("s3cret")).unwrap();
        assert_eq!(reloaded.net_worth(), app.net_worth());
        assert!(reloaded.profile().security.local_encryption_enabled);
    }

    #[test]
    fn planner_list_stays_readable_when_encrypted() {
        let mut store = storage();
        let mut app = JiBajeti::create_new();
        app.set_local_encryption(true);
        app.add_loan(&LoanTerms::new("Boda", 2_400_000.0, 18.0, 24, d(2024, 6, 30)))
            .unwrap();
        app.save(&mut store, Some("pw")).unwrap();

        assert!(store.load::<Vec<LoanPlan>>(LOANS_KEY).is_err());
        let planner: Vec<RecurringExpense> = store.load(RECURRING_EXPENSES_KEY).unwrap().unwrap();
        assert_eq!(planner.len(), 1);
        assert_eq!(planner[0].first_due, d(2024, 7, 30));
    }

    #[test]
    fn stored_keys() {
        let mut store = storage();
        JiBajeti::create_new().save(&mut store, None).unwrap();
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec![LOANS_KEY, RECURRING_EXPENSES_KEY, PROFILE_KEY]);
    }

    /// Memory store whose writes to the loans key fail while `reject_loans` is set.
    struct LoansWriteFails {
        inner: MemoryStore,
        reject_loans: Rc<Cell<bool>>,
    }

    impl KeyValueStore for LoansWriteFails {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CoreError> {
            if self.reject_loans.get() && key.ends_with(LOANS_KEY) {
                return Err(CoreError::Storage("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<bool, CoreError> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>, CoreError> {
            self.inner.keys()
        }
    }

    #[test]
    fn failed_loans_write_keeps_previous_profile_and_loans() {
        let reject_loans = Rc::new(Cell::new(false));
        let mut store = StorageManager::new(LoansWriteFails {
            inner: MemoryStore::new(),
            reject_loans: Rc::clone(&reject_loans),
        });

        let mut app = populated();
        app.complete_onboarding("Neema").unwrap();
        app.save(&mut store, None).unwrap();
        let saved_profile = app.profile().clone();

        reject_loans.set(true);
        app.set_currency("KES").unwrap();
        app.add_loan(&LoanTerms::new("Car Loan", 1_200_000.0, 12.0, 12, d(2024, 1, 1)))
            .unwrap();
        assert!(matches!(
            app.save(&mut store, None),
            Err(CoreError::Storage(_))
        ));
        assert!(app.has_unsaved_changes());

        let stored: UserProfile = store.load(PROFILE_KEY).unwrap().unwrap();
        assert_eq!(stored, saved_profile);
        assert_eq!(stored.preferences.currency, "TZS");
        let stored_loans: Vec<LoanPlan> = store.load(LOANS_KEY).unwrap().unwrap();
        assert!(stored_loans.is_empty());

        reject_loans.set(false);
        app.save(&mut store, None).unwrap();
        let reloaded = JiBajeti::load(&store, None).unwrap();
        assert_eq!(reloaded.profile().preferences.currency, "KES");
        assert_eq!(reloaded.loans().len(), 1);
    }
}
