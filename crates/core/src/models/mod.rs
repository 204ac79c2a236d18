pub mod loan;
pub mod metrics;
pub mod profile;
pub mod settings;
