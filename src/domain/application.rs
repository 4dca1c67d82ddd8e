use crate::error::{AgencyError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    /// A contract has been created from the application.
    Processed,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A client's request for a new insurance contract, reviewed by an agent
/// before any Contract exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractApplication {
    id: Uuid,
    client_id: Uuid,
    service_id: Uuid,
    desired_start_date: DateTime<Utc>,
    desired_end_date: DateTime<Utc>,
    desired_premium: Decimal,
    notes: Option<String>,
    status: ApplicationStatus,
    processed_by_agent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContractApplication {
    pub fn new(
        client_id: Uuid,
        service_id: Uuid,
        desired_start_date: DateTime<Utc>,
        desired_end_date: DateTime<Utc>,
        desired_premium: Decimal,
        notes: Option<String>,
    ) -> Result<Self> {
        if client_id.is_nil() {
            return Err(AgencyError::Validation("ClientId is required".to_string()));
        }
        if service_id.is_nil() {
            return Err(AgencyError::Validation("ServiceId is required".to_string()));
        }
        if desired_end_date < desired_start_date {
            return Err(AgencyError::Validation(
                "EndDate must be after StartDate".to_string(),
            ));
        }
        if desired_premium <= Decimal::ZERO {
            return Err(AgencyError::Validation(
                "Premium must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            client_id,
            service_id,
            desired_start_date,
            desired_end_date,
            desired_premium,
            notes,
            status: ApplicationStatus::Pending,
            processed_by_agent_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    pub fn service_id(&self) -> Uuid {
        self.service_id
    }

    pub fn desired_start_date(&self) -> DateTime<Utc> {
        self.desired_start_date
    }

    pub fn desired_end_date(&self) -> DateTime<Utc> {
        self.desired_end_date
    }

    pub fn desired_premium(&self) -> Decimal {
        self.desired_premium
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn processed_by_agent_id(&self) -> Option<Uuid> {
        self.processed_by_agent_id
    }

    pub fn approve(&mut self, agent_id: Uuid) -> Result<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(AgencyError::Domain(format!(
                "Cannot approve application in status {}",
                self.status
            )));
        }
        self.status = ApplicationStatus::Approved;
        self.processed_by_agent_id = Some(agent_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn reject(&mut self, reason: Option<&str>) -> Result<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(AgencyError::Domain(format!(
                "Cannot reject application in status {}",
                self.status
            )));
        }
        self.status = ApplicationStatus::Rejected;
        let note = format!("Rejected: {}", reason.unwrap_or(""));
        self.notes = match self.notes.take() {
            Some(existing) if !existing.trim().is_empty() => {
                Some(format!("{} | {}", existing, note))
            }
            _ => Some(note),
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn process(&mut self, agent_id: Uuid) -> Result<()> {
        if self.status != ApplicationStatus::Approved {
            return Err(AgencyError::Domain(format!(
                "Cannot process application in status {}",
                self.status
            )));
        }
        self.status = ApplicationStatus::Processed;
        self.processed_by_agent_id = Some(agent_id);
        self.updated_at = Utc::now();
        Ok(())
    }
}
