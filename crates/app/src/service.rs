use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use thiserror::Error;
use tracing::info;

use ssl_dashboard_core::classifier::reclassify;
use ssl_dashboard_core::types::{DomainPatch, DomainRecord, DomainStats};
use ssl_dashboard_core::validation::{DomainInput, ValidationError};
use ssl_dashboard_storage::{DomainRepository, DomainStoreError};
use ssl_dashboard_util::StatusMode;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Orchestrates registry calls for the HTTP layer.
///
/// Owns the clock used to stamp creation times and simulated certificate
/// issuance, and applies the configured [`StatusMode`] to every record it
/// returns.
#[derive(Clone)]
pub struct DomainService {
    repository: Arc<dyn DomainRepository>,
    clock: Clock,
    status_mode: StatusMode,
    expiring_soon_days: i64,
}

impl DomainService {
    pub fn new(
        repository: Arc<dyn DomainRepository>,
        clock: Clock,
        status_mode: StatusMode,
        expiring_soon_days: i64,
    ) -> Self {
        Self {
            repository,
            clock,
            status_mode,
            expiring_soon_days,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn present(&self, record: DomainRecord) -> DomainRecord {
        match self.status_mode {
            StatusMode::Snapshot => record,
            StatusMode::Recompute => reclassify(&record, self.now(), self.expiring_soon_days),
        }
    }

    pub async fn list(&self) -> Result<Vec<DomainRecord>, DomainServiceError> {
        let records = self.repository.list().await?;
        Ok(records
            .into_iter()
            .map(|record| self.present(record))
            .collect())
    }

    pub async fn stats(&self) -> Result<DomainStats, DomainServiceError> {
        match self.status_mode {
            StatusMode::Snapshot => Ok(self.repository.stats().await?),
            StatusMode::Recompute => Ok(DomainStats::from_records(&self.list().await?)),
        }
    }

    /// Validates and stores a new domain, issuing a simulated certificate when requested.
    pub async fn create(&self, input: DomainInput) -> Result<DomainRecord, DomainServiceError> {
        let validated = input.validate()?;
        let mut domain = validated.domain;
        if validated.install_ssl {
            domain = domain.with_issued_certificate(self.today());
        }

        let record = self.repository.create(domain, self.now()).await?;
        counter!("domain_mutations_total", "op" => "create").increment(1);
        if validated.install_ssl {
            counter!("ssl_install_total", "result" => "issued").increment(1);
        }
        info!(
            stage = "registry",
            id = record.id,
            name = %record.name,
            ssl_status = %record.ssl_status,
            "domain created"
        );
        Ok(self.present(record))
    }

    /// Simulates certificate issuance for an existing domain.
    pub async fn install_ssl(&self, id: u64) -> Result<DomainRecord, DomainServiceError> {
        if self.repository.get(id).await?.is_none() {
            counter!("ssl_install_total", "result" => "not_found").increment(1);
            return Err(DomainServiceError::NotFound);
        }

        let patch = DomainPatch::certificate_issued(self.today());
        let Some(record) = self.repository.update(id, patch).await? else {
            counter!("ssl_install_total", "result" => "not_found").increment(1);
            return Err(DomainServiceError::NotFound);
        };

        counter!("domain_mutations_total", "op" => "install_ssl").increment(1);
        counter!("ssl_install_total", "result" => "issued").increment(1);
        info!(
            stage = "registry",
            id = record.id,
            name = %record.name,
            expires = ?record.ssl_expiry_date,
            "ssl certificate installed"
        );
        Ok(self.present(record))
    }

    /// Deletes a domain, returning the removed record.
    pub async fn delete(&self, id: u64) -> Result<DomainRecord, DomainServiceError> {
        let Some(record) = self.repository.get(id).await? else {
            return Err(DomainServiceError::NotFound);
        };
        if !self.repository.delete(id).await? {
            return Err(DomainServiceError::NotFound);
        }

        counter!("domain_mutations_total", "op" => "delete").increment(1);
        info!(stage = "registry", id, name = %record.name, "domain deleted");
        Ok(record)
    }
}

#[derive(Debug, Error)]
pub enum DomainServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Domain {0} already exists")]
    AlreadyExists(String),
    #[error("Domain not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(DomainStoreError),
}

impl From<DomainStoreError> for DomainServiceError {
    fn from(err: DomainStoreError) -> Self {
        match err {
            DomainStoreError::AlreadyExists(name) => Self::AlreadyExists(name),
            other => Self::Storage(other),
        }
    }
}
