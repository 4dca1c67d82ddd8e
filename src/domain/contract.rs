use crate::domain::money::Money;
use crate::error::{AgencyError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Draft,
    Registered,
    PendingPayment,
    Paid,
    Active,
    Overdue,
    Suspended,
    Cancelled,
    Problematic,
    Expired,
    Completed,
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An insurance contract between a client and the agency.
///
/// All lifecycle changes go through the named transition methods; fields are
/// never mutated directly by callers. Contracts are never deleted: Cancelled,
/// Expired and Completed are logical ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    id: Uuid,
    number: Option<String>,
    client_id: Uuid,
    agent_id: Option<Uuid>,
    service_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    premium: Money,
    status: ContractStatus,
    is_paid: bool,
    is_flagged_problem: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Ids of payments made against this contract. The Payment entities
    /// themselves live in the payment store and point back via contract_id.
    payment_ids: Vec<Uuid>,
}

impl Contract {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_id: Uuid,
        service_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        premium: Money,
        agent_id: Option<Uuid>,
        notes: Option<String>,
    ) -> Result<Self> {
        if client_id.is_nil() {
            return Err(AgencyError::Validation("ClientId is required".to_string()));
        }
        if service_id.is_nil() {
            return Err(AgencyError::Validation("ServiceId is required".to_string()));
        }
        if end_date < start_date {
            return Err(AgencyError::Validation(
                "EndDate must be after StartDate".to_string(),
            ));
        }
        if premium.amount() <= Decimal::ZERO {
            return Err(AgencyError::Validation(
                "Premium amount must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            number: None,
            client_id,
            agent_id,
            service_id,
            start_date,
            end_date,
            premium,
            status: ContractStatus::Draft,
            is_paid: false,
            is_flagged_problem: false,
            notes,
            created_at: now,
            updated_at: now,
            payment_ids: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    pub fn agent_id(&self) -> Option<Uuid> {
        self.agent_id
    }

    pub fn service_id(&self) -> Uuid {
        self.service_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn premium(&self) -> &Money {
        &self.premium
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn is_flagged_problem(&self) -> bool {
        self.is_flagged_problem
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn payment_ids(&self) -> &[Uuid] {
        &self.payment_ids
    }

    /// Assigns the contract number and responsible agent. Legal from Draft
    /// and Suspended.
    pub fn register(&mut self, number: &str, agent_id: Uuid) -> Result<()> {
        if number.trim().is_empty() {
            return Err(AgencyError::Validation(
                "Contract number cannot be empty".to_string(),
            ));
        }
        if self.status != ContractStatus::Draft && self.status != ContractStatus::Suspended {
            return Err(AgencyError::Domain(format!(
                "Cannot register contract from state {}",
                self.status
            )));
        }

        self.number = Some(number.to_string());
        self.agent_id = Some(agent_id);
        self.status = ContractStatus::Registered;
        self.touch();
        Ok(())
    }

    /// Sets the paid flag. Idempotent; the status only moves to Paid when the
    /// contract is awaiting payment.
    pub fn mark_as_paid(&mut self) {
        if self.is_paid {
            return;
        }
        self.is_paid = true;
        if self.status == ContractStatus::Registered || self.status == ContractStatus::PendingPayment
        {
            self.status = ContractStatus::Paid;
        }
        self.touch();
    }

    /// Makes a Paid contract legally effective. The caller is responsible for
    /// checking the client's mandatory document verifications first.
    pub fn activate(&mut self) -> Result<()> {
        if self.status != ContractStatus::Paid {
            return Err(AgencyError::Domain(format!(
                "Cannot activate contract from state {}. Contract must be Paid.",
                self.status
            )));
        }
        self.status = ContractStatus::Active;
        self.touch();
        Ok(())
    }

    pub fn mark_overdue(&mut self) {
        self.status = ContractStatus::Overdue;
        self.touch();
    }

    pub fn suspend(&mut self, reason: Option<&str>) {
        self.status = ContractStatus::Suspended;
        self.append_note(&format!("Suspended: {}", reason.unwrap_or("")));
        self.touch();
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.status != ContractStatus::Suspended {
            return Err(AgencyError::Domain("Contract is not suspended".to_string()));
        }
        self.status = ContractStatus::Registered;
        self.touch();
        Ok(())
    }

    /// Sticky problem marker; cleared only by renew.
    pub fn mark_problematic(&mut self, reason: &str) {
        self.is_flagged_problem = true;
        self.status = ContractStatus::Problematic;
        self.append_note(&format!("Problem: {}", reason));
        self.touch();
    }

    pub fn cancel(&mut self, reason: Option<&str>) {
        self.status = ContractStatus::Cancelled;
        self.append_note(&format!("Cancelled: {}", reason.unwrap_or("")));
        self.touch();
    }

    pub fn expire(&mut self) {
        self.status = ContractStatus::Expired;
        self.touch();
    }

    /// Resets the term and premium for a fresh period. Clears the problem
    /// flag and puts the contract back in Registered.
    pub fn renew(
        &mut self,
        new_start: NaiveDate,
        new_end: NaiveDate,
        new_premium: Money,
    ) -> Result<()> {
        if new_end < new_start {
            return Err(AgencyError::Validation(
                "newEnd must be after newStart".to_string(),
            ));
        }
        self.start_date = new_start;
        self.end_date = new_end;
        self.premium = new_premium;
        self.status = ContractStatus::Registered;
        self.is_flagged_problem = false;
        self.touch();
        Ok(())
    }

    /// Links a payment to this contract, deduplicating by id. Touches
    /// updated_at even when the payment is already linked.
    pub fn add_payment(&mut self, payment_id: Uuid) {
        if !self.payment_ids.contains(&payment_id) {
            self.payment_ids.push(payment_id);
        }
        self.touch();
    }

    fn append_note(&mut self, new_note: &str) {
        if new_note.trim().is_empty() {
            return;
        }
        self.notes = match self.notes.take() {
            Some(existing) if !existing.trim().is_empty() => {
                Some(format!("{} | {}", existing, new_note))
            }
            _ => Some(new_note.to_string()),
        };
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
