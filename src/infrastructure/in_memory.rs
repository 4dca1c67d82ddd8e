use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::party::{Agent, Client, InsuranceService};
use crate::domain::payment::Payment;
use crate::domain::ports::{
    AgentStore, ClientStore, ContractStore, GatewayResponse, NotificationSender, PaymentGateway,
    PaymentStore, ServiceStore, VerificationStore,
};
use crate::domain::verification::DocumentVerification;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Statuses excluded from the overdue/expired scans.
const TERMINAL_STATUSES: [ContractStatus; 3] = [
    ContractStatus::Expired,
    ContractStatus::Cancelled,
    ContractStatus::Completed,
];

/// Thread-safe in-memory contract store; the default backend for tests and
/// small deployments.
#[derive(Default, Clone)]
pub struct InMemoryContractStore {
    contracts: Arc<RwLock<HashMap<Uuid, Contract>>>,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn store(&self, contract: Contract) -> Result<()> {
        let mut contracts = self.contracts.write().await;
        contracts.insert(contract.id(), contract);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Contract>> {
        let contracts = self.contracts.read().await;
        Ok(contracts.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Contract>> {
        let contracts = self.contracts.read().await;
        Ok(contracts.values().cloned().collect())
    }

    async fn overdue(&self, today: NaiveDate) -> Result<Vec<Contract>> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .values()
            .filter(|c| c.end_date() < today && !TERMINAL_STATUSES.contains(&c.status()))
            .cloned()
            .collect())
    }

    async fn unpaid(&self, threshold_days: i64, now: DateTime<Utc>) -> Result<Vec<Contract>> {
        let threshold = now - Duration::days(threshold_days);
        let contracts = self.contracts.read().await;
        Ok(contracts
            .values()
            .filter(|c| {
                !c.is_paid()
                    && matches!(
                        c.status(),
                        ContractStatus::Registered | ContractStatus::PendingPayment
                    )
                    && c.created_at() < threshold
            })
            .cloned()
            .collect())
    }

    async fn requiring_renewal(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Contract>> {
        let horizon = today + Duration::days(window_days);
        let contracts = self.contracts.read().await;
        Ok(contracts
            .values()
            .filter(|c| {
                c.status() == ContractStatus::Active
                    && !c.is_flagged_problem()
                    && c.end_date() >= today
                    && c.end_date() <= horizon
            })
            .cloned()
            .collect())
    }

    async fn expired(&self, today: NaiveDate) -> Result<Vec<Contract>> {
        self.overdue(today).await
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id(), payment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn get_by_contract(&self, contract_id: Uuid) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.contract_id() == contract_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryVerificationStore {
    verifications: Arc<RwLock<HashMap<Uuid, DocumentVerification>>>,
}

impl InMemoryVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn store(&self, verification: DocumentVerification) -> Result<()> {
        let mut verifications = self.verifications.write().await;
        verifications.insert(verification.id(), verification);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentVerification>> {
        let verifications = self.verifications.read().await;
        Ok(verifications.get(&id).cloned())
    }

    async fn get_by_client(&self, client_id: Uuid) -> Result<Vec<DocumentVerification>> {
        let verifications = self.verifications.read().await;
        Ok(verifications
            .values()
            .filter(|v| v.client_id() == client_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryClientStore {
    clients: Arc<RwLock<HashMap<Uuid, Client>>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn store(&self, client: Client) -> Result<()> {
        let mut clients = self.clients.write().await;
        clients.insert(client.id, client);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.get(&id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAgentStore {
    agents: Arc<RwLock<HashMap<Uuid, Agent>>>,
}

impl InMemoryAgentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn store(&self, agent: Agent) -> Result<()> {
        let mut agents = self.agents.write().await;
        agents.insert(agent.id, agent);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Agent>> {
        let agents = self.agents.read().await;
        Ok(agents.get(&id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryServiceStore {
    services: Arc<RwLock<HashMap<Uuid, InsuranceService>>>,
}

impl InMemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStore for InMemoryServiceStore {
    async fn store(&self, service: InsuranceService) -> Result<()> {
        let mut services = self.services.write().await;
        services.insert(service.id, service);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<InsuranceService>> {
        let services = self.services.read().await;
        Ok(services.get(&id).cloned())
    }
}

/// Gateway stub for development and tests. Never performs a real charge;
/// always confirms with a fabricated transaction id.
#[derive(Default, Clone)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn process_payment(
        &self,
        _amount: Decimal,
        _currency: &str,
        _idempotency_key: &str,
    ) -> Result<GatewayResponse> {
        Ok(GatewayResponse {
            success: true,
            transaction_id: Some(format!("MOCK-{}", Uuid::new_v4().simple())),
            error: None,
        })
    }
}

/// Gateway stub that declines everything; used to exercise the failure path.
#[derive(Clone)]
pub struct DecliningPaymentGateway {
    pub error: String,
}

impl DecliningPaymentGateway {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[async_trait]
impl PaymentGateway for DecliningPaymentGateway {
    async fn process_payment(
        &self,
        _amount: Decimal,
        _currency: &str,
        _idempotency_key: &str,
    ) -> Result<GatewayResponse> {
        Ok(GatewayResponse {
            success: false,
            transaction_id: None,
            error: Some(self.error.clone()),
        })
    }
}

/// Logs notifications instead of delivering them; the binary's default
/// sender until a real email/SMS channel exists.
#[derive(Default, Clone)]
pub struct LoggingNotificationSender;

impl LoggingNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(&self, email: &str, subject: &str, _body: &str) -> Result<()> {
        info!(email, subject, "notification sent");
        Ok(())
    }
}

/// A delivered notification captured by [`RecordingNotificationSender`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// Test double that records every send for later assertions.
#[derive(Default, Clone)]
pub struct RecordingNotificationSender {
    sent: Arc<RwLock<Vec<SentNotification>>>,
}

impl RecordingNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(&self, email: &str, subject: &str, body: &str) -> Result<()> {
        let mut sent = self.sent.write().await;
        sent.push(SentNotification {
            email: email.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
