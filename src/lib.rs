//! Facade over the school API service core.
//!
//! Re-exports the workspace crates so downstream callers depend on a single
//! package.

pub use common;
pub use configs;
pub use models;
pub use service;
