use std::sync::Arc;

use async_trait::async_trait;
use models::student::Student;
use uuid::Uuid;

use crate::brokers::clock::Clock;
use crate::brokers::logging::FailureLog;
use crate::brokers::storage::{EntityStore, StorageError};
use crate::crud::EntityService;
use crate::validation::{self, Fault, ValidationPolicy};

use super::errors::{StudentError, StudentValidation};

/// Student business service independent of transport and persistence.
///
/// Every operation runs the same pipeline: validate the input, invoke the
/// storage broker, normalize any failure into [`StudentError`], and log it
/// exactly once before returning it.
pub struct StudentService<S, C, L> {
    store: Arc<S>,
    clock: Arc<C>,
    log: Arc<L>,
    policy: ValidationPolicy,
}

impl<S, C, L> StudentService<S, C, L>
where
    S: EntityStore<Student>,
    C: Clock,
    L: FailureLog,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, log: Arc<L>, policy: ValidationPolicy) -> Self {
        Self { store, clock, log, policy }
    }

    /// Validate and persist a new student.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use chrono::{Duration, Utc};
    /// use models::student::{Gender, Student};
    /// use service::brokers::{clock::FixedClock, logging::RecordingLog, memory::InMemoryStore};
    /// use service::student::StudentService;
    /// use service::validation::ValidationPolicy;
    /// use uuid::Uuid;
    ///
    /// let now = Utc::now();
    /// let service = StudentService::new(
    ///     Arc::new(InMemoryStore::new()),
    ///     Arc::new(FixedClock::at(now)),
    ///     Arc::new(RecordingLog::new()),
    ///     ValidationPolicy::default(),
    /// );
    /// let student = Student {
    ///     id: Uuid::new_v4(),
    ///     user_id: "user-001".into(),
    ///     identity_number: "SID-0001".into(),
    ///     first_name: "Ada".into(),
    ///     middle_name: None,
    ///     last_name: "Lovelace".into(),
    ///     gender: Gender::Female,
    ///     birth_date: now - Duration::days(8000),
    ///     created_by: Uuid::new_v4(),
    ///     created_date: now,
    ///     updated_by: Uuid::new_v4(),
    ///     updated_date: now,
    /// };
    /// let saved = tokio_test::block_on(service.insert(Some(student))).unwrap();
    /// assert_eq!(saved.first_name, "Ada");
    /// ```
    pub async fn insert(&self, student: Option<Student>) -> Result<Student, StudentError> {
        let student = self.ensure_present(student)?;
        self.ensure_valid(&student)?;
        self.store
            .insert(student)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    /// Re-validate an existing student against its stored snapshot, then
    /// persist the change.
    pub async fn modify(&self, student: Option<Student>) -> Result<Student, StudentError> {
        let student = self.ensure_present(student)?;
        self.ensure_valid(&student)?;
        self.ensure_dates_differ(&student)?;
        self.ensure_recent(&student)?;
        let stored = self.lookup(student.id).await?;
        self.ensure_matches_stored(&student, &stored)?;
        self.store
            .update(student)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    pub async fn retrieve_by_id(&self, id: Uuid) -> Result<Student, StudentError> {
        self.ensure_id(id)?;
        self.lookup(id).await
    }

    pub async fn retrieve_all(&self) -> Result<Vec<Student>, StudentError> {
        self.store
            .select_all()
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    /// Look up and delete a student, returning the removed record.
    pub async fn remove_by_id(&self, id: Uuid) -> Result<Student, StudentError> {
        self.ensure_id(id)?;
        let stored = self.lookup(id).await?;
        self.store
            .delete(stored)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    // --- validation -------------------------------------------------------

    fn ensure_present(&self, student: Option<Student>) -> Result<Student, StudentError> {
        student.ok_or_else(|| self.validation_failure(StudentValidation::Missing))
    }

    fn ensure_id(&self, id: Uuid) -> Result<(), StudentError> {
        if validation::id_missing(id) {
            return Err(self.validation_failure(StudentValidation::Invalid(vec![
                Fault::required_id("id"),
            ])));
        }
        Ok(())
    }

    /// Structural validation; faults are aggregated across the full field set.
    fn ensure_valid(&self, student: &Student) -> Result<(), StudentError> {
        let mut faults = Vec::new();
        if validation::id_missing(student.id) {
            faults.push(Fault::required_id("id"));
        }
        if validation::text_missing(&student.user_id) {
            faults.push(Fault::required_text("user_id"));
        }
        if validation::text_missing(&student.identity_number) {
            faults.push(Fault::required_text("identity_number"));
        }
        if validation::text_missing(&student.first_name) {
            faults.push(Fault::required_text("first_name"));
        }
        if validation::text_missing(&student.last_name) {
            faults.push(Fault::required_text("last_name"));
        }
        if validation::date_missing(student.birth_date) {
            faults.push(Fault::required_date("birth_date"));
        }
        faults.extend(validation::audit_faults(student));

        if faults.is_empty() {
            Ok(())
        } else {
            Err(self.validation_failure(StudentValidation::Invalid(faults)))
        }
    }

    fn ensure_dates_differ(&self, student: &Student) -> Result<(), StudentError> {
        if student.updated_date == student.created_date {
            return Err(self.validation_failure(StudentValidation::Invalid(vec![
                Fault::same_as("updated_date", "created_date"),
            ])));
        }
        Ok(())
    }

    fn ensure_recent(&self, student: &Student) -> Result<(), StudentError> {
        let now = self.clock.now();
        if !self.policy.is_recent(now, student.updated_date) {
            return Err(self.validation_failure(StudentValidation::Invalid(vec![
                Fault::not_recent("updated_date"),
            ])));
        }
        Ok(())
    }

    fn ensure_matches_stored(
        &self,
        student: &Student,
        stored: &Student,
    ) -> Result<(), StudentError> {
        if student.created_date != stored.created_date {
            return Err(self.validation_failure(StudentValidation::Invalid(vec![
                Fault::stored_mismatch("created_date"),
            ])));
        }
        if student.created_by != stored.created_by {
            return Err(self.validation_failure(StudentValidation::Invalid(vec![
                Fault::stored_mismatch("created_by"),
            ])));
        }
        if student.updated_date == stored.updated_date {
            return Err(self.validation_failure(StudentValidation::Invalid(vec![
                Fault::same_as("updated_date", "the stored updated_date"),
            ])));
        }
        Ok(())
    }

    async fn lookup(&self, id: Uuid) -> Result<Student, StudentError> {
        match self.store.select_by_id(id).await {
            Ok(Some(student)) => Ok(student),
            Ok(None) => Err(self.validation_failure(StudentValidation::NotFound(id))),
            Err(failure) => Err(self.storage_failure(failure)),
        }
    }

    // --- failure normalization -------------------------------------------

    fn validation_failure(&self, validation: StudentValidation) -> StudentError {
        let failure = StudentError::Validation(validation);
        self.log.error(&failure);
        failure
    }

    fn storage_failure(&self, failure: StorageError) -> StudentError {
        match failure {
            StorageError::Connectivity(_) => {
                let wrapped = StudentError::Dependency(failure);
                self.log.critical(&wrapped);
                wrapped
            }
            StorageError::Conflict(_) | StorageError::Stale(_) => {
                let wrapped = StudentError::Dependency(failure);
                self.log.error(&wrapped);
                wrapped
            }
            StorageError::Other(_) => {
                let wrapped = StudentError::Service(failure);
                self.log.error(&wrapped);
                wrapped
            }
        }
    }
}

#[async_trait]
impl<S, C, L> EntityService<Student> for StudentService<S, C, L>
where
    S: EntityStore<Student>,
    C: Clock,
    L: FailureLog,
{
    type Error = StudentError;

    async fn insert(&self, entity: Option<Student>) -> Result<Student, StudentError> {
        StudentService::insert(self, entity).await
    }

    async fn modify(&self, entity: Option<Student>) -> Result<Student, StudentError> {
        StudentService::modify(self, entity).await
    }

    async fn retrieve_by_id(&self, id: Uuid) -> Result<Student, StudentError> {
        StudentService::retrieve_by_id(self, id).await
    }

    async fn retrieve_all(&self) -> Result<Vec<Student>, StudentError> {
        StudentService::retrieve_all(self).await
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<Student, StudentError> {
        StudentService::remove_by_id(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokers::clock::FixedClock;
    use crate::brokers::logging::{RecordingLog, Severity};
    use crate::test_support::{sample_student, InjectedFailure, TrackingStore};
    use chrono::{DateTime, Duration, Utc};
    use std::sync::atomic::Ordering;

    struct Fixture {
        service: StudentService<TrackingStore<Student>, FixedClock, RecordingLog>,
        store: Arc<TrackingStore<Student>>,
        clock: Arc<FixedClock>,
        log: Arc<RecordingLog>,
        now: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let store = Arc::new(TrackingStore::new());
        let clock = Arc::new(FixedClock::at(now));
        let log = Arc::new(RecordingLog::new());
        let service = StudentService::new(
            store.clone(),
            clock.clone(),
            log.clone(),
            ValidationPolicy::default(),
        );
        Fixture { service, store, clock, log, now }
    }

    fn assert_single_error(log: &RecordingLog) {
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].0, Severity::Error);
    }

    #[tokio::test]
    async fn insert_rejects_missing_student() {
        let f = fixture();

        let err = f.service.insert(None).await.unwrap_err();

        assert_eq!(err.validation(), Some(&StudentValidation::Missing));
        assert_eq!(f.store.total_calls(), 0);
        assert_eq!(f.clock.reads(), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn insert_reports_every_structural_fault() {
        let f = fixture();
        let invalid = Student {
            id: Uuid::nil(),
            user_id: String::new(),
            identity_number: "   ".to_string(),
            first_name: String::new(),
            middle_name: None,
            last_name: String::new(),
            gender: models::student::Gender::Other,
            birth_date: DateTime::<Utc>::default(),
            created_by: Uuid::nil(),
            created_date: DateTime::<Utc>::default(),
            updated_by: Uuid::nil(),
            updated_date: DateTime::<Utc>::default(),
        };

        let err = f.service.insert(Some(invalid)).await.unwrap_err();

        let validation = err.validation().unwrap();
        for field in [
            "id",
            "user_id",
            "identity_number",
            "first_name",
            "last_name",
            "birth_date",
            "created_by",
            "created_date",
            "updated_by",
            "updated_date",
        ] {
            assert!(validation.cites(field), "missing fault for {field}");
        }
        assert_eq!(f.store.total_calls(), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn insert_persists_valid_student() -> Result<(), anyhow::Error> {
        let f = fixture();
        let student = sample_student(f.now);

        let saved = f.service.insert(Some(student.clone())).await?;

        assert_eq!(saved, student);
        assert_eq!(f.store.inserts.load(Ordering::SeqCst), 1);
        assert!(f.log.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn connectivity_failure_is_a_critical_dependency() {
        let f = fixture();
        f.store.fail_next(InjectedFailure::Connectivity);

        let err = f.service.insert(Some(sample_student(f.now))).await.unwrap_err();

        assert!(matches!(
            err,
            StudentError::Dependency(StorageError::Connectivity(_))
        ));
        assert_eq!(f.log.len(), 1);
        assert_eq!(f.log.entries()[0].0, Severity::Critical);
        assert_eq!(f.store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn conflict_failure_is_a_dependency() {
        let f = fixture();
        f.store.fail_next(InjectedFailure::Conflict);

        let err = f.service.insert(Some(sample_student(f.now))).await.unwrap_err();

        assert!(matches!(
            err,
            StudentError::Dependency(StorageError::Conflict(_))
        ));
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn unknown_storage_failure_is_a_service_error() {
        let f = fixture();
        f.store.fail_next(InjectedFailure::Other);

        let err = f.service.insert(Some(sample_student(f.now))).await.unwrap_err();

        assert!(matches!(err, StudentError::Service(StorageError::Other(_))));
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_missing_student() {
        let f = fixture();

        let err = f.service.modify(None).await.unwrap_err();

        assert_eq!(err.validation(), Some(&StudentValidation::Missing));
        assert_eq!(f.store.total_calls(), 0);
        assert_eq!(f.clock.reads(), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_equal_created_and_updated_dates() {
        let f = fixture();
        // Freshly-inserted records carry identical audit dates
        let unchanged = sample_student(f.now);

        let err = f.service.modify(Some(unchanged)).await.unwrap_err();

        assert!(err.validation().unwrap().cites("updated_date"));
        assert_eq!(f.clock.reads(), 0);
        assert_eq!(f.store.total_calls(), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_stale_updated_date() {
        let f = fixture();
        let mut student = sample_student(f.now);
        student.updated_date = f.now - Duration::minutes(5);

        let err = f.service.modify(Some(student)).await.unwrap_err();

        assert!(err.validation().unwrap().cites("updated_date"));
        assert_eq!(f.clock.reads(), 1);
        assert_eq!(f.store.total_calls(), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_unknown_student() {
        let f = fixture();
        let mut student = sample_student(f.now);
        student.updated_date = f.now;

        let err = f.service.modify(Some(student.clone())).await.unwrap_err();

        assert_eq!(
            err.validation(),
            Some(&StudentValidation::NotFound(student.id))
        );
        assert_eq!(f.store.selects_by_id.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.updates.load(Ordering::SeqCst), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_created_date_drift() {
        let f = fixture();
        let stored = sample_student(f.now);
        f.store.preload(stored.clone()).await;

        let mut payload = stored.clone();
        payload.updated_date = f.now;
        payload.created_date = stored.created_date + Duration::minutes(1);

        let err = f.service.modify(Some(payload)).await.unwrap_err();

        assert!(err.validation().unwrap().cites("created_date"));
        assert_eq!(f.store.selects_by_id.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.updates.load(Ordering::SeqCst), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_changed_created_by() {
        let f = fixture();
        let stored = sample_student(f.now);
        f.store.preload(stored.clone()).await;

        let mut payload = stored.clone();
        payload.updated_date = f.now;
        payload.created_by = Uuid::new_v4();

        let err = f.service.modify(Some(payload)).await.unwrap_err();

        assert!(err.validation().unwrap().cites("created_by"));
        assert_eq!(f.store.updates.load(Ordering::SeqCst), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_rejects_unchanged_updated_date() {
        let f = fixture();
        // Simulate a row that was already modified at "now"
        let mut stored = sample_student(f.now);
        stored.updated_date = f.now;
        f.store.preload(stored.clone()).await;

        let payload = stored.clone();

        let err = f.service.modify(Some(payload)).await.unwrap_err();

        assert!(err.validation().unwrap().cites("updated_date"));
        assert_eq!(f.store.selects_by_id.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.updates.load(Ordering::SeqCst), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn modify_updates_valid_student() -> Result<(), anyhow::Error> {
        let f = fixture();
        let stored = sample_student(f.now);
        f.store.preload(stored.clone()).await;

        let mut payload = stored.clone();
        payload.updated_date = f.now;
        payload.last_name = "Byron".to_string();

        let updated = f.service.modify(Some(payload)).await?;

        assert_eq!(updated.last_name, "Byron");
        assert_eq!(f.clock.reads(), 1);
        assert_eq!(f.store.selects_by_id.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.updates.load(Ordering::SeqCst), 1);
        assert!(f.log.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn retrieve_by_id_rejects_nil_id() {
        let f = fixture();

        let err = f.service.retrieve_by_id(Uuid::nil()).await.unwrap_err();

        assert!(err.validation().unwrap().cites("id"));
        assert_eq!(f.store.total_calls(), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn retrieve_by_id_reports_unknown_student() {
        let f = fixture();
        let id = Uuid::new_v4();

        let err = f.service.retrieve_by_id(id).await.unwrap_err();

        assert_eq!(err.validation(), Some(&StudentValidation::NotFound(id)));
        assert_eq!(f.store.selects_by_id.load(Ordering::SeqCst), 1);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn remove_by_id_returns_the_removed_student() -> Result<(), anyhow::Error> {
        let f = fixture();
        let stored = sample_student(f.now);
        f.store.preload(stored.clone()).await;

        let removed = f.service.remove_by_id(stored.id).await?;

        assert_eq!(removed, stored);
        assert_eq!(f.store.selects_by_id.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.deletes.load(Ordering::SeqCst), 1);
        assert!(f.log.is_empty());

        let err = f.service.retrieve_by_id(stored.id).await.unwrap_err();
        assert_eq!(err.validation(), Some(&StudentValidation::NotFound(stored.id)));
        Ok(())
    }

    #[tokio::test]
    async fn remove_by_id_reports_unknown_student() {
        let f = fixture();
        let id = Uuid::new_v4();

        let err = f.service.remove_by_id(id).await.unwrap_err();

        assert_eq!(err.validation(), Some(&StudentValidation::NotFound(id)));
        assert_eq!(f.store.deletes.load(Ordering::SeqCst), 0);
        assert_single_error(&f.log);
    }

    #[tokio::test]
    async fn retrieve_all_lists_every_student() -> Result<(), anyhow::Error> {
        let f = fixture();
        f.store.preload(sample_student(f.now)).await;
        f.store.preload(sample_student(f.now)).await;

        let all = f.service.retrieve_all().await?;

        assert_eq!(all.len(), 2);
        assert!(f.log.is_empty());
        Ok(())
    }

    async fn count_generically<E, S>(service: &S) -> Result<usize, S::Error>
    where
        S: EntityService<E>,
    {
        Ok(service.retrieve_all().await?.len())
    }

    #[tokio::test]
    async fn service_is_usable_through_the_capability_trait() -> Result<(), anyhow::Error> {
        let f = fixture();
        f.store.preload(sample_student(f.now)).await;

        assert_eq!(count_generically(&f.service).await?, 1);
        Ok(())
    }
}
