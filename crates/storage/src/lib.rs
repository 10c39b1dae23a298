//! Storage seam for domain records.
//!
//! The HTTP layer only talks to [`DomainRepository`]; [`InMemoryDomainRepository`]
//! is the process-local backend used by the binary and by tests.
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use ssl_dashboard_core::types::{DomainPatch, DomainRecord, DomainStats, NewDomain};

pub use memory::{sample_domains, InMemoryDomainRepository};

/// Repository contract for the authoritative collection of domain records.
///
/// Each operation either fully succeeds or leaves the collection untouched.
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Lists every record ordered by name ascending.
    async fn list(&self) -> Result<Vec<DomainRecord>, DomainStoreError>;

    async fn get(&self, id: u64) -> Result<Option<DomainRecord>, DomainStoreError>;

    /// Looks up a record by exact, case-sensitive name.
    async fn get_by_name(&self, name: &str) -> Result<Option<DomainRecord>, DomainStoreError>;

    /// Inserts a record with a freshly assigned identifier.
    ///
    /// Fails with [`DomainStoreError::AlreadyExists`] when the name is taken.
    async fn create(
        &self,
        domain: NewDomain,
        created_at: DateTime<Utc>,
    ) -> Result<DomainRecord, DomainStoreError>;

    /// Merges `patch` into the record. Returns `Ok(None)` for unknown ids.
    async fn update(
        &self,
        id: u64,
        patch: DomainPatch,
    ) -> Result<Option<DomainRecord>, DomainStoreError>;

    /// Removes the record permanently. Returns `false` for unknown ids.
    async fn delete(&self, id: u64) -> Result<bool, DomainStoreError>;

    async fn stats(&self) -> Result<DomainStats, DomainStoreError>;
}

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum DomainStoreError {
    #[error("Domain {0} already exists")]
    AlreadyExists(String),
    #[error("domain {id} would have status {status} with inconsistent expiry date")]
    InconsistentSsl { id: u64, status: String },
    #[error("domain id space exhausted")]
    IdsExhausted,
    #[error("storage backend failure: {0}")]
    Backend(String),
}
