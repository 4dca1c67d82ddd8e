use chrono::{Duration, NaiveDate, Utc};
use polisa::application::contracts::ContractService;
use polisa::application::payments::PaymentService;
use polisa::application::reconciliation::{ContractReconciler, ReconciliationConfig};
use polisa::domain::party::{Agent, Client, InsuranceService};
use polisa::domain::ports::{
    AgentStore, ClientStore, PaymentGatewayRef, ServiceStore, VerificationStore,
};
use polisa::domain::verification::DocumentVerification;
use polisa::infrastructure::in_memory::{
    InMemoryAgentStore, InMemoryClientStore, InMemoryContractStore, InMemoryPaymentStore,
    InMemoryServiceStore, InMemoryVerificationStore, MockPaymentGateway,
    RecordingNotificationSender,
};
use std::sync::Arc;
use uuid::Uuid;

/// Everything a scenario needs: shared in-memory stores, both orchestration
/// services, the reconciler, and a seeded client/agent/service triple.
pub struct Fixture {
    pub contracts: Arc<InMemoryContractStore>,
    pub payments: Arc<InMemoryPaymentStore>,
    pub verifications: Arc<InMemoryVerificationStore>,
    pub clients: Arc<InMemoryClientStore>,
    pub notifications: Arc<RecordingNotificationSender>,
    pub contract_service: ContractService,
    pub payment_service: PaymentService,
    pub reconciler: ContractReconciler,
    pub client_id: Uuid,
    pub agent_id: Uuid,
    pub service_id: Uuid,
}

pub async fn fixture() -> Fixture {
    fixture_with_gateway(Arc::new(MockPaymentGateway::new())).await
}

pub async fn fixture_with_gateway(gateway: PaymentGatewayRef) -> Fixture {
    let contracts = Arc::new(InMemoryContractStore::new());
    let payments = Arc::new(InMemoryPaymentStore::new());
    let verifications = Arc::new(InMemoryVerificationStore::new());
    let clients = Arc::new(InMemoryClientStore::new());
    let agents = Arc::new(InMemoryAgentStore::new());
    let services = Arc::new(InMemoryServiceStore::new());
    let notifications = Arc::new(RecordingNotificationSender::new());

    let client = Client::new("Иван Петров", "ivan.petrov@example.com");
    let client_id = client.id;
    clients.store(client).await.unwrap();

    let agent = Agent::new("Анна Смирнова", "a.smirnova@agency.ru");
    let agent_id = agent.id;
    agents.store(agent).await.unwrap();

    let service = InsuranceService::new("КАСКО");
    let service_id = service.id;
    services.store(service).await.unwrap();

    let contract_service = ContractService::new(
        contracts.clone(),
        clients.clone(),
        services.clone(),
        agents.clone(),
        verifications.clone(),
    );
    let payment_service = PaymentService::new(
        payments.clone(),
        contracts.clone(),
        gateway,
        verifications.clone(),
    );
    let reconciler = ContractReconciler::new(
        contracts.clone(),
        verifications.clone(),
        clients.clone(),
        notifications.clone(),
        ReconciliationConfig::default(),
    );

    Fixture {
        contracts,
        payments,
        verifications,
        clients,
        notifications,
        contract_service,
        payment_service,
        reconciler,
        client_id,
        agent_id,
        service_id,
    }
}

impl Fixture {
    /// Stores approved FullName + Passport verifications for the seeded client.
    pub async fn approve_mandatory_documents(&self) {
        for (document_type, number) in [("FullName", "Иван Петров"), ("Passport", "4510 123456")] {
            let mut verification = DocumentVerification::new(
                self.client_id,
                None,
                Some(document_type.to_string()),
                Some(number.to_string()),
                None,
            )
            .unwrap();
            verification.approve(self.agent_id, None).unwrap();
            self.verifications.store(verification).await.unwrap();
        }
    }

    pub async fn add_pending_verification(&self, document_type: &str) {
        let verification = DocumentVerification::new(
            self.client_id,
            None,
            Some(document_type.to_string()),
            None,
            None,
        )
        .unwrap();
        self.verifications.store(verification).await.unwrap();
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}
