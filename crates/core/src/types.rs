use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of days a simulated certificate stays valid after issuance.
pub const SSL_VALIDITY_DAYS: u64 = 90;

/// SSL certificate state tracked for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslStatus {
    Valid,
    ExpiringSoon,
    Expired,
    #[default]
    NoSsl,
}

impl SslStatus {
    pub const ALL: [SslStatus; 4] = [
        Self::Valid,
        Self::ExpiringSoon,
        Self::Expired,
        Self::NoSsl,
    ];

    /// Returns the canonical wire representation for the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
            Self::NoSsl => "no_ssl",
        }
    }

    /// Returns `true` when the status models an installed certificate.
    ///
    /// Records with such a status must carry an expiry date.
    pub fn has_certificate(self) -> bool {
        !matches!(self, Self::NoSsl)
    }
}

impl fmt::Display for SslStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "valid" => Ok(Self::Valid),
            "expiring_soon" => Ok(Self::ExpiringSoon),
            "expired" => Ok(Self::Expired),
            "no_ssl" => Ok(Self::NoSsl),
            _ => Err(()),
        }
    }
}

/// A tracked hostname together with its SSL snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub id: u64,
    pub name: String,
    pub ssl_status: SslStatus,
    pub ssl_expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl DomainRecord {
    /// Returns `true` when the expiry date agrees with the status.
    pub fn is_consistent(&self) -> bool {
        self.ssl_status.has_certificate() == self.ssl_expiry_date.is_some()
    }
}

/// Validated data required to insert a new domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDomain {
    pub name: String,
    pub ssl_status: SslStatus,
    pub ssl_expiry_date: Option<NaiveDate>,
}

impl NewDomain {
    /// Creates a domain without a certificate.
    pub fn without_ssl(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ssl_status: SslStatus::NoSsl,
            ssl_expiry_date: None,
        }
    }

    /// Replaces the SSL fields with a freshly issued certificate.
    pub fn with_issued_certificate(self, issued_on: NaiveDate) -> Self {
        Self {
            ssl_status: SslStatus::Valid,
            ssl_expiry_date: Some(simulated_expiry(issued_on)),
            ..self
        }
    }
}

/// Partial update applied to an existing record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainPatch {
    pub name: Option<String>,
    pub ssl_status: Option<SslStatus>,
    pub ssl_expiry_date: Option<Option<NaiveDate>>,
}

impl DomainPatch {
    /// Patch describing a simulated certificate installation.
    pub fn certificate_issued(issued_on: NaiveDate) -> Self {
        Self {
            name: None,
            ssl_status: Some(SslStatus::Valid),
            ssl_expiry_date: Some(Some(simulated_expiry(issued_on))),
        }
    }

    /// Merges the patch into `record`. The identifier and creation time never change.
    pub fn apply_to(&self, record: &DomainRecord) -> DomainRecord {
        DomainRecord {
            id: record.id,
            name: self.name.clone().unwrap_or_else(|| record.name.clone()),
            ssl_status: self.ssl_status.unwrap_or(record.ssl_status),
            ssl_expiry_date: self.ssl_expiry_date.unwrap_or(record.ssl_expiry_date),
            created_at: record.created_at,
        }
    }
}

/// Expiry date of a certificate issued on `issued_on`.
pub fn simulated_expiry(issued_on: NaiveDate) -> NaiveDate {
    issued_on
        .checked_add_days(Days::new(SSL_VALIDITY_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Point-in-time counts of domains by SSL status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub total_domains: u64,
    pub active_ssl: u64,
    pub expiring_soon: u64,
    pub expired: u64,
}

impl DomainStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DomainRecord>,
    {
        records
            .into_iter()
            .fold(Self::default(), |mut stats, record| {
                stats.total_domains += 1;
                match record.ssl_status {
                    SslStatus::Valid => stats.active_ssl += 1,
                    SslStatus::ExpiringSoon => stats.expiring_soon += 1,
                    SslStatus::Expired => stats.expired += 1,
                    SslStatus::NoSsl => {}
                }
                stats
            })
    }
}
