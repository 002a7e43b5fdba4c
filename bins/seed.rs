//! Seeds the in-memory brokers through the service layer and prints the
//! resulting records, exercising the full CRUD surface end to end.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use configs::AppConfig;
use models::attachment::Attachment;
use models::student::{Gender, Student};
use models::student_registration::StudentRegistration;
use service::attachment::AttachmentService;
use service::brokers::clock::SystemClock;
use service::brokers::logging::TracingFailureLog;
use service::brokers::memory::InMemoryStore;
use service::crud::EntityService;
use service::registration::StudentRegistrationService;
use service::student::StudentService;
use service::validation::ValidationPolicy;

async fn report<E, S>(label: &str, service: &S) -> Result<usize, S::Error>
where
    S: EntityService<E>,
{
    let count = service.retrieve_all().await?.len();
    info!(label, count, "records in store");
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppConfig::load_or_default()?;
    if cfg.logging.json {
        common::utils::logging::init_logging_json(&cfg.logging.level);
    } else {
        common::utils::logging::init_logging_default(&cfg.logging.level);
    }

    let policy = ValidationPolicy::from_secs(cfg.validation.recency_window_secs as i64);
    let clock = Arc::new(SystemClock);
    let log = Arc::new(TracingFailureLog);

    let students = StudentService::new(
        Arc::new(InMemoryStore::new()),
        clock.clone(),
        log.clone(),
        policy,
    );
    let attachments = AttachmentService::new(
        Arc::new(InMemoryStore::new()),
        clock.clone(),
        log.clone(),
        policy,
    );
    let registrations = StudentRegistrationService::new(
        Arc::new(InMemoryStore::new()),
        clock.clone(),
        log.clone(),
        policy,
    );

    let now = Utc::now();
    let registrar = Uuid::new_v4();

    let student = students
        .insert(Some(Student {
            id: Uuid::new_v4(),
            user_id: "user-001".to_string(),
            identity_number: "SID-0001".to_string(),
            first_name: "Ada".to_string(),
            middle_name: None,
            last_name: "Lovelace".to_string(),
            gender: Gender::Female,
            birth_date: now - Duration::days(8000),
            created_by: registrar,
            created_date: now,
            updated_by: registrar,
            updated_date: now,
        }))
        .await?;
    info!(student_id = %student.id, "seeded student");

    let attachment = attachments
        .insert(Some(Attachment {
            id: Uuid::new_v4(),
            label: "transcript".to_string(),
            description: "End of term transcript".to_string(),
            content_type: "application/pdf".to_string(),
            extension: "pdf".to_string(),
            created_by: registrar,
            created_date: now,
            updated_by: registrar,
            updated_date: now,
        }))
        .await?;
    info!(attachment_id = %attachment.id, "seeded attachment");

    let registration = registrations
        .insert(Some(StudentRegistration {
            id: Uuid::new_v4(),
            student_id: student.id,
            registration_id: Uuid::new_v4(),
            notes: None,
            created_by: registrar,
            created_date: now,
            updated_by: registrar,
            updated_date: now,
        }))
        .await?;
    info!(registration_id = %registration.id, "seeded registration");

    let mut renamed = student.clone();
    renamed.last_name = "Byron".to_string();
    renamed.updated_date = Utc::now();
    let renamed = students.modify(Some(renamed)).await?;
    info!(student_id = %renamed.id, last_name = %renamed.last_name, "modified student");

    report("students", &students).await?;
    report("attachments", &attachments).await?;
    report("registrations", &registrations).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&students.retrieve_all().await?)?
    );

    let removed = students.remove_by_id(renamed.id).await?;
    info!(student_id = %removed.id, "removed student");

    Ok(())
}
