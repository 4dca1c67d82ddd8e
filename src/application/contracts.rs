use crate::domain::contract::Contract;
use crate::domain::money::Money;
use crate::domain::policy;
use crate::domain::ports::{
    AgentStoreRef, ClientStoreRef, ContractStoreRef, ServiceStoreRef, VerificationStoreRef,
};
use crate::error::{AgencyError, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// Coordinates contract creation, registration and activation against the
/// domain state machine and the gating policy.
pub struct ContractService {
    contracts: ContractStoreRef,
    clients: ClientStoreRef,
    services: ServiceStoreRef,
    agents: AgentStoreRef,
    verifications: VerificationStoreRef,
}

impl ContractService {
    pub fn new(
        contracts: ContractStoreRef,
        clients: ClientStoreRef,
        services: ServiceStoreRef,
        agents: AgentStoreRef,
        verifications: VerificationStoreRef,
    ) -> Self {
        Self {
            contracts,
            clients,
            services,
            agents,
            verifications,
        }
    }

    /// Creates a contract in Draft, immediately auto-registers it under a
    /// generated number, and persists it.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_contract(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        premium_amount: Decimal,
        premium_currency: &str,
        notes: Option<String>,
        agent_id: Uuid,
    ) -> Result<Contract> {
        self.clients
            .get(client_id)
            .await?
            .ok_or_else(|| AgencyError::NotFound(format!("Client {} not found", client_id)))?;
        self.services
            .get(service_id)
            .await?
            .ok_or_else(|| {
                AgencyError::NotFound(format!("Insurance service {} not found", service_id))
            })?;
        self.agents
            .get(agent_id)
            .await?
            .ok_or_else(|| AgencyError::NotFound(format!("Agent {} not found", agent_id)))?;

        let premium = Money::new(premium_amount, premium_currency)?;
        let mut contract = Contract::new(
            client_id,
            service_id,
            start_date,
            end_date,
            premium,
            Some(agent_id),
            notes,
        )?;

        let number = generate_contract_number();
        contract.register(&number, agent_id)?;

        self.contracts.store(contract.clone()).await?;
        info!(contract_id = %contract.id(), number, "contract created and registered");
        Ok(contract)
    }

    pub async fn register_contract(
        &self,
        contract_id: Uuid,
        number: &str,
        agent_id: Uuid,
    ) -> Result<Contract> {
        let mut contract = self.load(contract_id).await?;
        contract.register(number, agent_id)?;
        self.contracts.store(contract.clone()).await?;
        Ok(contract)
    }

    /// Activates a Paid contract once the client's mandatory personal data
    /// has been verified (full three-stage gate).
    pub async fn activate_contract(&self, contract_id: Uuid) -> Result<Contract> {
        let mut contract = self.load(contract_id).await?;
        let verifications = self.verifications.get_by_client(contract.client_id()).await?;
        policy::check_activation(&verifications)?;

        contract.activate()?;
        self.contracts.store(contract.clone()).await?;
        info!(contract_id = %contract.id(), "contract activated");
        Ok(contract)
    }

    pub async fn get_all(&self) -> Result<Vec<Contract>> {
        self.contracts.get_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Contract>> {
        self.contracts.get(id).await
    }

    async fn load(&self, contract_id: Uuid) -> Result<Contract> {
        self.contracts
            .get(contract_id)
            .await?
            .ok_or_else(|| AgencyError::NotFound(format!("Contract {} not found", contract_id)))
    }
}

/// `CTR-{utc date}-{6 random hex chars}`.
fn generate_contract_number() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("CTR-{}-{}", Utc::now().format("%Y%m%d"), &random[..6])
}
