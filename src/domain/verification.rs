use crate::error::{AgencyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// An agency-reviewed claim about a client's personal data (passport, full
/// name, ...). Submitted either by the client (no agent yet) or by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVerification {
    id: Uuid,
    client_id: Uuid,
    /// None until an agent picks the verification up or decides it.
    verified_by_agent_id: Option<Uuid>,
    status: VerificationStatus,
    document_type: Option<String>,
    document_number: Option<String>,
    notes: Option<String>,
    verified_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl DocumentVerification {
    pub fn new(
        client_id: Uuid,
        verified_by_agent_id: Option<Uuid>,
        document_type: Option<String>,
        document_number: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        if client_id.is_nil() {
            return Err(AgencyError::Validation("ClientId is required".to_string()));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            client_id,
            verified_by_agent_id,
            status: VerificationStatus::Pending,
            document_type,
            document_number,
            notes,
            verified_at: now,
            created_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    pub fn verified_by_agent_id(&self) -> Option<Uuid> {
        self.verified_by_agent_id
    }

    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref()
    }

    pub fn document_number(&self) -> Option<&str> {
        self.document_number.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn verified_at(&self) -> DateTime<Utc> {
        self.verified_at
    }

    /// Assigns the reviewing agent without deciding the verification.
    pub fn assign_agent(&mut self, agent_id: Uuid) -> Result<()> {
        if agent_id.is_nil() {
            return Err(AgencyError::Validation("AgentId is required".to_string()));
        }
        self.verified_by_agent_id = Some(agent_id);
        Ok(())
    }

    pub fn approve(&mut self, agent_id: Uuid, notes: Option<&str>) -> Result<()> {
        if agent_id.is_nil() {
            return Err(AgencyError::Validation("AgentId is required".to_string()));
        }
        if self.verified_by_agent_id.is_none() {
            self.verified_by_agent_id = Some(agent_id);
        }
        self.status = VerificationStatus::Approved;
        if let Some(notes) = notes {
            self.append_note(notes);
        }
        self.verified_at = Utc::now();
        Ok(())
    }

    pub fn reject(&mut self, agent_id: Uuid, reason: &str) -> Result<()> {
        if agent_id.is_nil() {
            return Err(AgencyError::Validation("AgentId is required".to_string()));
        }
        if reason.trim().is_empty() {
            return Err(AgencyError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }
        if self.verified_by_agent_id.is_none() {
            self.verified_by_agent_id = Some(agent_id);
        }
        self.status = VerificationStatus::Rejected;
        self.append_note(&format!("Rejected: {}", reason));
        self.verified_at = Utc::now();
        Ok(())
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
}
