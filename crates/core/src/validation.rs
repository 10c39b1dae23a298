use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{NewDomain, SslStatus};

static DOMAIN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("domain name pattern compiles")
});

/// Returns `true` when `name` is a dot-separated list of 1-63 character labels
/// made of ASCII alphanumerics and inner hyphens.
pub fn is_valid_domain_name(name: &str) -> bool {
    DOMAIN_NAME.is_match(name)
}

/// Raw create request as submitted by API clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ssl_status: Option<String>,
    #[serde(default)]
    pub ssl_expiry_date: Option<String>,
    #[serde(default)]
    pub install_ssl: Option<bool>,
}

/// A create request that passed validation.
///
/// `install_ssl` is consumed by the caller at creation time and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDomain {
    pub domain: NewDomain,
    pub install_ssl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Domain name is required")]
    NameRequired,
    #[error("Invalid domain format")]
    InvalidName,
    #[error("Invalid SSL status: {0}")]
    InvalidStatus(String),
    #[error("Invalid SSL expiry date: {0}")]
    InvalidExpiryDate(String),
    #[error("SSL expiry date is required when status is {0}")]
    MissingExpiryDate(SslStatus),
    #[error("SSL expiry date is only allowed with an installed certificate")]
    UnexpectedExpiryDate,
}

impl DomainInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_install_ssl(mut self, install: bool) -> Self {
        self.install_ssl = Some(install);
        self
    }

    /// Checks every field and produces the record draft. Nothing is mutated on failure.
    pub fn validate(self) -> Result<ValidatedDomain, ValidationError> {
        let name = self.name.as_str();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        if !is_valid_domain_name(name) {
            return Err(ValidationError::InvalidName);
        }

        let ssl_status = match self.ssl_status.as_deref() {
            None => SslStatus::NoSsl,
            Some(raw) => raw
                .parse()
                .map_err(|_| ValidationError::InvalidStatus(raw.to_string()))?,
        };

        let ssl_expiry_date = self
            .ssl_expiry_date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| ValidationError::InvalidExpiryDate(raw.to_string()))
            })
            .transpose()?;

        let install_ssl = self.install_ssl.unwrap_or(false);
        if !install_ssl {
            match (ssl_status.has_certificate(), ssl_expiry_date) {
                (true, None) => return Err(ValidationError::MissingExpiryDate(ssl_status)),
                (false, Some(_)) => return Err(ValidationError::UnexpectedExpiryDate),
                _ => {}
            }
        }

        Ok(ValidatedDomain {
            domain: NewDomain {
                name: name.to_string(),
                ssl_status,
                ssl_expiry_date,
            },
            install_ssl,
        })
    }
}
