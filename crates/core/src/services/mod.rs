pub mod amortization_service;
pub mod metrics_service;
