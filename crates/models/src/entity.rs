use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Uniform access to the identifier and audit fields every entity carries.
///
/// The service layer validates audit-field presence and the modify-time
/// snapshot cross-checks through this trait instead of per-entity code.
pub trait Audited {
    fn entity_id(&self) -> Uuid;
    fn created_by(&self) -> Uuid;
    fn created_date(&self) -> DateTime<Utc>;
    fn updated_by(&self) -> Uuid;
    fn updated_date(&self) -> DateTime<Utc>;
}
