//! Shared validation vocabulary used by every entity service.

use chrono::{DateTime, Duration, Utc};
use models::entity::Audited;
use uuid::Uuid;

/// A single violated field rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    pub field: &'static str,
    pub message: String,
}

impl Fault {
    pub fn required_id(field: &'static str) -> Self {
        Self { field, message: "Id is required".to_string() }
    }

    pub fn required_text(field: &'static str) -> Self {
        Self { field, message: "Text is required".to_string() }
    }

    pub fn required_date(field: &'static str) -> Self {
        Self { field, message: "Date is required".to_string() }
    }

    pub fn same_as(field: &'static str, other: &str) -> Self {
        Self { field, message: format!("Date is the same as {other}") }
    }

    pub fn not_recent(field: &'static str) -> Self {
        Self { field, message: "Date is not recent".to_string() }
    }

    pub fn stored_mismatch(field: &'static str) -> Self {
        Self { field, message: format!("Does not match the stored {field}") }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Render a fault list for error messages.
pub fn describe(faults: &[Fault]) -> String {
    faults
        .iter()
        .map(Fault::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn id_missing(id: Uuid) -> bool {
    id.is_nil()
}

pub fn text_missing(text: &str) -> bool {
    text.trim().is_empty()
}

pub fn date_missing(date: DateTime<Utc>) -> bool {
    date == DateTime::<Utc>::default()
}

/// Presence faults for the audit fields common to all entities.
pub fn audit_faults<E: Audited>(entity: &E) -> Vec<Fault> {
    let mut faults = Vec::new();
    if id_missing(entity.created_by()) {
        faults.push(Fault::required_id("created_by"));
    }
    if date_missing(entity.created_date()) {
        faults.push(Fault::required_date("created_date"));
    }
    if id_missing(entity.updated_by()) {
        faults.push(Fault::required_id("updated_by"));
    }
    if date_missing(entity.updated_date()) {
        faults.push(Fault::required_date("updated_date"));
    }
    faults
}

/// Temporal tolerance applied by modify-time validation.
#[derive(Clone, Copy, Debug)]
pub struct ValidationPolicy {
    pub recency_window: Duration,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self { recency_window: Duration::seconds(60) }
    }
}

impl ValidationPolicy {
    pub fn from_secs(secs: i64) -> Self {
        Self { recency_window: Duration::seconds(secs) }
    }

    /// Whether `candidate` lies within the window around `now`, either side.
    pub fn is_recent(&self, now: DateTime<Utc>, candidate: DateTime<Utc>) -> bool {
        now.signed_duration_since(candidate).abs() <= self.recency_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_is_missing() {
        assert!(text_missing(""));
        assert!(text_missing("   "));
        assert!(!text_missing("x"));
    }

    #[test]
    fn epoch_default_date_is_missing() {
        assert!(date_missing(DateTime::<Utc>::default()));
        assert!(!date_missing(Utc::now()));
    }

    #[test]
    fn recency_window_is_symmetric() {
        let policy = ValidationPolicy::default();
        let now = Utc::now();

        assert!(policy.is_recent(now, now));
        assert!(policy.is_recent(now, now - Duration::seconds(59)));
        assert!(policy.is_recent(now, now + Duration::seconds(59)));
        assert!(!policy.is_recent(now, now - Duration::seconds(61)));
        assert!(!policy.is_recent(now, now + Duration::seconds(61)));
    }

    #[test]
    fn describe_joins_faults_in_order() {
        let faults = vec![Fault::required_id("id"), Fault::required_text("label")];
        assert_eq!(describe(&faults), "id: Id is required; label: Text is required");
    }
}
