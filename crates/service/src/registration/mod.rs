//! Student-registration service: links students to course registrations,
//! failing fast on the first violated field rule.

pub mod errors;
pub mod service;

pub use service::StudentRegistrationService;
