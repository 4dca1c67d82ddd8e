use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An insured client. Referenced from contracts and verifications by id only;
/// display joins happen at read time in the stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub passport: Option<String>,
}

impl Client {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            passport: None,
        }
    }
}

/// An agency employee responsible for contracts and verifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub employee_number: Option<String>,
}

impl Agent {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            employee_number: None,
        }
    }
}

/// An insurance product offered by the agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceService {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl InsuranceService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
        }
    }
}
