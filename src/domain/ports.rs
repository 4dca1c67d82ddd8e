use crate::domain::contract::Contract;
use crate::domain::party::{Agent, Client, InsuranceService};
use crate::domain::payment::Payment;
use crate::domain::verification::DocumentVerification;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Contract persistence plus the filter queries the reconciliation engine
/// runs. Queries take the clock values as arguments so callers (and tests)
/// control time. `store` is an upsert.
#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn store(&self, contract: Contract) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Contract>>;
    async fn get_all(&self) -> Result<Vec<Contract>>;

    /// Contracts past their end date that have not reached a terminal state.
    async fn overdue(&self, today: NaiveDate) -> Result<Vec<Contract>>;
    /// Unpaid contracts still awaiting payment, created before `now - threshold_days`.
    async fn unpaid(&self, threshold_days: i64, now: DateTime<Utc>) -> Result<Vec<Contract>>;
    /// Active, unflagged contracts ending within the renewal window.
    async fn requiring_renewal(&self, today: NaiveDate, window_days: i64)
    -> Result<Vec<Contract>>;
    /// Same population as `overdue`; the expired pass transitions them.
    async fn expired(&self, today: NaiveDate) -> Result<Vec<Contract>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn get_by_contract(&self, contract_id: Uuid) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait VerificationStore: Send + Sync {
    async fn store(&self, verification: DocumentVerification) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<DocumentVerification>>;
    async fn get_by_client(&self, client_id: Uuid) -> Result<Vec<DocumentVerification>>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn store(&self, client: Client) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Client>>;
}

#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn store(&self, agent: Agent) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Agent>>;
}

#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn store(&self, service: InsuranceService) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<InsuranceService>>;
}

/// What the external payment processor reported. A declined payment is a
/// soft outcome carried in the response; `Err` is reserved for transport
/// faults.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub error: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn process_payment(
        &self,
        amount: Decimal,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<GatewayResponse>;
}

/// Fire-and-forget notification delivery; the core imposes no retry contract.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, email: &str, subject: &str, body: &str) -> Result<()>;
}

pub type ContractStoreRef = Arc<dyn ContractStore>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
pub type VerificationStoreRef = Arc<dyn VerificationStore>;
pub type ClientStoreRef = Arc<dyn ClientStore>;
pub type AgentStoreRef = Arc<dyn AgentStore>;
pub type ServiceStoreRef = Arc<dyn ServiceStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type NotificationSenderRef = Arc<dyn NotificationSender>;
