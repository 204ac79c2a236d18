pub mod envelope;
pub mod manager;
pub mod store;
