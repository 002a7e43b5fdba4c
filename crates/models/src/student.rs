use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Audited;
use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse a gender from free-form request text.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            unknown => Err(ModelError::Validation(format!("unknown gender: {unknown}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub user_id: String,
    pub identity_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_date: DateTime<Utc>,
}

impl Audited for Student {
    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn created_by(&self) -> Uuid {
        self.created_by
    }

    fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    fn updated_by(&self) -> Uuid {
        self.updated_by
    }

    fn updated_date(&self) -> DateTime<Utc> {
        self.updated_date
    }
}
