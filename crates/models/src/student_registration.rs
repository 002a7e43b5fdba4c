use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Audited;

/// Links a student to a course registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentRegistration {
    pub id: Uuid,
    pub student_id: Uuid,
    pub registration_id: Uuid,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_date: DateTime<Utc>,
}

impl Audited for StudentRegistration {
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
