pub mod application;
pub mod contract;
pub mod money;
pub mod party;
pub mod payment;
pub mod policy;
pub mod ports;
pub mod verification;
