use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::party::{Agent, Client, InsuranceService};
use crate::domain::payment::Payment;
use crate::domain::ports::{
    AgentStore, ClientStore, ContractStore, PaymentStore, ServiceStore, VerificationStore,
};
use crate::domain::verification::DocumentVerification;
use crate::error::{AgencyError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub const CF_CONTRACTS: &str = "contracts";
pub const CF_PAYMENTS: &str = "payments";
pub const CF_VERIFICATIONS: &str = "verifications";
pub const CF_CLIENTS: &str = "clients";
pub const CF_AGENTS: &str = "agents";
pub const CF_SERVICES: &str = "services";

const TERMINAL_STATUSES: [ContractStatus; 3] = [
    ContractStatus::Expired,
    ContractStatus::Cancelled,
    ContractStatus::Completed,
];

/// Persistent store backing all entity kinds with one column family each.
/// Values are JSON; keys are the entity id bytes. Filter queries scan the
/// contracts family and filter in memory, which is adequate for an agency-
/// sized population.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [
            CF_CONTRACTS,
            CF_PAYMENTS,
            CF_VERIFICATIONS,
            CF_CLIENTS,
            CF_AGENTS,
            CF_SERVICES,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
        .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs).map_err(AgencyError::internal)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn put<T: Serialize>(&self, cf_name: &str, id: Uuid, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value).map_err(AgencyError::internal)?;
        self.db
            .put_cf(&cf, id.as_bytes(), bytes)
            .map_err(AgencyError::internal)
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, id: Uuid) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        let result = self
            .db
            .get_cf(&cf, id.as_bytes())
            .map_err(AgencyError::internal)?;
        match result {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).map_err(AgencyError::internal)?,
            )),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(AgencyError::internal)?;
            values.push(serde_json::from_slice(&value).map_err(AgencyError::internal)?);
        }
        Ok(values)
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            AgencyError::internal(std::io::Error::other(format!(
                "{} column family not found",
                name
            )))
        })
    }
}

#[async_trait]
impl ContractStore for RocksDbStore {
    async fn store(&self, contract: Contract) -> Result<()> {
        self.put(CF_CONTRACTS, contract.id(), &contract)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Contract>> {
        self.fetch(CF_CONTRACTS, id)
    }

    async fn get_all(&self) -> Result<Vec<Contract>> {
        self.scan(CF_CONTRACTS)
    }

    async fn overdue(&self, today: NaiveDate) -> Result<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self.scan(CF_CONTRACTS)?;
        contracts.retain(|c| c.end_date() < today && !TERMINAL_STATUSES.contains(&c.status()));
        Ok(contracts)
    }

    async fn unpaid(&self, threshold_days: i64, now: DateTime<Utc>) -> Result<Vec<Contract>> {
        let threshold = now - Duration::days(threshold_days);
        let mut contracts: Vec<Contract> = self.scan(CF_CONTRACTS)?;
        contracts.retain(|c| {
            !c.is_paid()
                && matches!(
                    c.status(),
                    ContractStatus::Registered | ContractStatus::PendingPayment
                )
                && c.created_at() < threshold
        });
        Ok(contracts)
    }

    async fn requiring_renewal(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Contract>> {
        let horizon = today + Duration::days(window_days);
        let mut contracts: Vec<Contract> = self.scan(CF_CONTRACTS)?;
        contracts.retain(|c| {
            c.status() == ContractStatus::Active
                && !c.is_flagged_problem()
                && c.end_date() >= today
                && c.end_date() <= horizon
        });
        Ok(contracts)
    }

    async fn expired(&self, today: NaiveDate) -> Result<Vec<Contract>> {
        self.overdue(today).await
    }
}

#[async_trait]
impl PaymentStore for RocksDbStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        self.put(CF_PAYMENTS, payment.id(), &payment)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        self.fetch(CF_PAYMENTS, id)
    }

    async fn get_by_contract(&self, contract_id: Uuid) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self.scan(CF_PAYMENTS)?;
        payments.retain(|p| p.contract_id() == contract_id);
        Ok(payments)
    }
}

#[async_trait]
impl VerificationStore for RocksDbStore {
    async fn store(&self, verification: DocumentVerification) -> Result<()> {
        self.put(CF_VERIFICATIONS, verification.id(), &verification)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentVerification>> {
        self.fetch(CF_VERIFICATIONS, id)
    }

    async fn get_by_client(&self, client_id: Uuid) -> Result<Vec<DocumentVerification>> {
        let mut verifications: Vec<DocumentVerification> = self.scan(CF_VERIFICATIONS)?;
        verifications.retain(|v| v.client_id() == client_id);
        Ok(verifications)
    }
}

#[async_trait]
impl ClientStore for RocksDbStore {
    async fn store(&self, client: Client) -> Result<()> {
        self.put(CF_CLIENTS, client.id, &client)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>> {
        self.fetch(CF_CLIENTS, id)
    }
}

#[async_trait]
impl AgentStore for RocksDbStore {
    async fn store(&self, agent: Agent) -> Result<()> {
        self.put(CF_AGENTS, agent.id, &agent)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Agent>> {
        self.fetch(CF_AGENTS, id)
    }
}

#[async_trait]
impl ServiceStore for RocksDbStore {
    async fn store(&self, service: InsuranceService) -> Result<()> {
        self.put(CF_SERVICES, service.id, &service)
    }

    async fn get(&self, id: Uuid) -> Result<Option<InsuranceService>> {
        self.fetch(CF_SERVICES, id)
    }
}
