use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::RwLock;

use ssl_dashboard_core::types::{DomainPatch, DomainRecord, DomainStats, NewDomain, SslStatus};

use crate::{DomainRepository, DomainStoreError};

/// Process-local repository. All state is lost when the process exits.
#[derive(Debug)]
pub struct InMemoryDomainRepository {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: BTreeMap<u64, DomainRecord>,
    next_id: u64,
}

impl Inner {
    fn name_taken(&self, name: &str, except: Option<u64>) -> bool {
        self.records
            .values()
            .any(|record| record.name == name && Some(record.id) != except)
    }
}

impl InMemoryDomainRepository {
    /// Creates an empty repository whose first identifier is `1`.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Creates a repository holding `records`; new identifiers continue after the highest one.
    pub fn with_records(records: Vec<DomainRecord>) -> Self {
        let next_id = records
            .iter()
            .map(|record| record.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let records = records
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        Self {
            inner: RwLock::new(Inner { records, next_id }),
        }
    }

    /// Creates a repository preloaded with [`sample_domains`].
    pub fn seeded() -> Self {
        Self::with_records(sample_domains())
    }
}

impl Default for InMemoryDomainRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn list(&self) -> Result<Vec<DomainRecord>, DomainStoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<DomainRecord> = inner.records.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    async fn get(&self, id: u64) -> Result<Option<DomainRecord>, DomainStoreError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<DomainRecord>, DomainStoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .find(|record| record.name == name)
            .cloned())
    }

    async fn create(
        &self,
        domain: NewDomain,
        created_at: DateTime<Utc>,
    ) -> Result<DomainRecord, DomainStoreError> {
        // Uniqueness check and insert share one write guard.
        let mut inner = self.inner.write().await;
        if inner.name_taken(&domain.name, None) {
            return Err(DomainStoreError::AlreadyExists(domain.name));
        }

        let id = inner.next_id;
        let record = DomainRecord {
            id,
            name: domain.name,
            ssl_status: domain.ssl_status,
            ssl_expiry_date: domain.ssl_expiry_date,
            created_at,
        };
        if !record.is_consistent() {
            return Err(DomainStoreError::InconsistentSsl {
                id,
                status: record.ssl_status.to_string(),
            });
        }

        inner.next_id = id.checked_add(1).ok_or(DomainStoreError::IdsExhausted)?;
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: u64,
        patch: DomainPatch,
    ) -> Result<Option<DomainRecord>, DomainStoreError> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.records.get(&id) else {
            return Ok(None);
        };

        let updated = patch.apply_to(existing);
        if !updated.is_consistent() {
            return Err(DomainStoreError::InconsistentSsl {
                id,
                status: updated.ssl_status.to_string(),
            });
        }
        if updated.name != existing.name && inner.name_taken(&updated.name, Some(id)) {
            return Err(DomainStoreError::AlreadyExists(updated.name));
        }

        inner.records.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: u64) -> Result<bool, DomainStoreError> {
        Ok(self.inner.write().await.records.remove(&id).is_some())
    }

    async fn stats(&self) -> Result<DomainStats, DomainStoreError> {
        let inner = self.inner.read().await;
        Ok(DomainStats::from_records(inner.records.values()))
    }
}

/// The four demonstration records loaded on startup.
pub fn sample_domains() -> Vec<DomainRecord> {
    vec![
        sample(1, "example.com", SslStatus::Valid, (2024, 8, 15), (2024, 1, 1)),
        sample(
            2,
            "blog.example.com",
            SslStatus::ExpiringSoon,
            (2024, 7, 5),
            (2024, 2, 1),
        ),
        sample(3, "old.example.com", SslStatus::Expired, (2024, 4, 10), (2024, 1, 15)),
        DomainRecord {
            id: 4,
            name: "shop.example.com".to_string(),
            ssl_status: SslStatus::NoSsl,
            ssl_expiry_date: None,
            created_at: midnight(2024, 3, 1),
        },
    ]
}

fn sample(
    id: u64,
    name: &str,
    ssl_status: SslStatus,
    expiry: (i32, u32, u32),
    created: (i32, u32, u32),
) -> DomainRecord {
    DomainRecord {
        id,
        name: name.to_string(),
        ssl_status,
        ssl_expiry_date: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2),
        created_at: midnight(created.0, created.1, created.2),
    }
}

fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}
