pub mod contracts;
pub mod payments;
pub mod reconciliation;
pub mod worker;
