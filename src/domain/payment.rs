use crate::error::{AgencyError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Created,
    Processing,
    Confirmed,
    Failed,
    Refunded,
    Chargeback,
    Timeout,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A payment attempt against a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: Uuid,
    contract_id: Uuid,
    amount: Decimal,
    currency: String,
    status: PaymentStatus,
    psp_transaction_id: Option<String>,
    idempotency_key: Option<String>,
    attempts: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        contract_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
        idempotency_key: Option<String>,
    ) -> Result<Self> {
        let currency = currency.into();
        if contract_id.is_nil() {
            return Err(AgencyError::Validation("ContractId required".to_string()));
        }
        if amount <= Decimal::ZERO {
            return Err(AgencyError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        if currency.trim().is_empty() {
            return Err(AgencyError::Validation("Currency required".to_string()));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            contract_id,
            amount,
            currency,
            status: PaymentStatus::Created,
            psp_transaction_id: None,
            idempotency_key,
            attempts: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn contract_id(&self) -> Uuid {
        self.contract_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn psp_transaction_id(&self) -> Option<&str> {
        self.psp_transaction_id.as_deref()
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves the payment into Processing and counts the attempt. Legal from
    /// Created, Failed and Timeout (retry entry points).
    pub fn mark_processing(&mut self) -> Result<()> {
        if !matches!(
            self.status,
            PaymentStatus::Created | PaymentStatus::Failed | PaymentStatus::Timeout
        ) {
            return Err(AgencyError::Domain(format!(
                "Cannot mark processing from state {}",
                self.status
            )));
        }
        self.status = PaymentStatus::Processing;
        self.attempts += 1;
        self.touch();
        Ok(())
    }

    pub fn mark_confirmed(&mut self, transaction_id: &str) -> Result<()> {
        if transaction_id.trim().is_empty() {
            return Err(AgencyError::Validation("transactionId required".to_string()));
        }
        self.status = PaymentStatus::Confirmed;
        self.psp_transaction_id = Some(transaction_id.to_string());
        self.touch();
        Ok(())
    }

    pub fn mark_failed(&mut self, _reason: Option<&str>) {
        self.status = PaymentStatus::Failed;
        self.touch();
    }

    pub fn mark_refunded(&mut self) -> Result<()> {
        if self.status != PaymentStatus::Confirmed {
            return Err(AgencyError::Domain(
                "Only confirmed payments can be refunded".to_string(),
            ));
        }
        self.status = PaymentStatus::Refunded;
        self.touch();
        Ok(())
    }

    pub fn mark_chargeback(&mut self) {
        self.status = PaymentStatus::Chargeback;
        self.touch();
    }

    pub fn mark_timeout(&mut self) {
        self.status = PaymentStatus::Timeout;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
