//! Domain model for the SSL dashboard.
//!
//! Pure types and rules shared by the storage and HTTP layers: the domain
//! record, input validation, status classification and stats aggregation.
pub mod classifier;
pub mod types;
pub mod validation;

pub use types::{DomainPatch, DomainRecord, DomainStats, NewDomain, SslStatus};
pub use validation::{DomainInput, ValidatedDomain, ValidationError};
