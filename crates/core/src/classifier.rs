use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::types::{DomainRecord, SslStatus};

/// Days before expiry at which a certificate is reported as expiring soon.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Returns the number of calendar days between `now` and the expiry date.
///
/// The expiry date is interpreted as midnight UTC and partial days round up.
/// Without an expiry date the result is `0`.
pub fn days_to_expire(expiry: Option<NaiveDate>, now: DateTime<Utc>) -> i64 {
    let Some(expiry) = expiry else {
        return 0;
    };
    let expiry_at = expiry.and_time(NaiveTime::MIN).and_utc();
    let millis = expiry_at.signed_duration_since(now).num_milliseconds();

    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// Derives the SSL status implied by an expiry date at `now`.
pub fn classify_expiry(
    expiry: Option<NaiveDate>,
    now: DateTime<Utc>,
    expiring_soon_days: i64,
) -> SslStatus {
    if expiry.is_none() {
        return SslStatus::NoSsl;
    }
    let days = days_to_expire(expiry, now);
    if days < 0 {
        SslStatus::Expired
    } else if days <= expiring_soon_days {
        SslStatus::ExpiringSoon
    } else {
        SslStatus::Valid
    }
}

/// Returns a copy of `record` whose status is recomputed from its expiry date.
pub fn reclassify(
    record: &DomainRecord,
    now: DateTime<Utc>,
    expiring_soon_days: i64,
) -> DomainRecord {
    DomainRecord {
        ssl_status: classify_expiry(record.ssl_expiry_date, now, expiring_soon_days),
        ..record.clone()
    }
}

/// How urgently a status should be surfaced to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
    Neutral,
}

/// Human-facing rendering hints for an SSL status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub label: &'static str,
    pub severity: Severity,
}

pub fn status_presentation(status: SslStatus) -> StatusPresentation {
    match status {
        SslStatus::Valid => StatusPresentation {
            label: "Valid",
            severity: Severity::Normal,
        },
        SslStatus::ExpiringSoon => StatusPresentation {
            label: "Expiring Soon",
            severity: Severity::Warning,
        },
        SslStatus::Expired => StatusPresentation {
            label: "Expired",
            severity: Severity::Critical,
        },
        SslStatus::NoSsl => StatusPresentation {
            label: "No SSL",
            severity: Severity::Neutral,
        },
    }
}

/// Presentation for a raw status string; unknown values render as `no_ssl`.
pub fn presentation_for(raw: &str) -> StatusPresentation {
    status_presentation(raw.parse().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(raw: &str) -> Option<NaiveDate> {
        Some(raw.parse().expect("date"))
    }

    #[test]
    fn counts_whole_days_until_expiry() {
        assert_eq!(days_to_expire(date("2024-07-05"), at(2024, 6, 30, 0)), 5);
    }

    #[test]
    fn partial_days_round_up() {
        assert_eq!(days_to_expire(date("2024-07-05"), at(2024, 6, 30, 12)), 5);
        assert_eq!(days_to_expire(date("2024-07-05"), at(2024, 7, 4, 23)), 1);
    }

    #[test]
    fn missing_expiry_is_zero_days() {
        assert_eq!(days_to_expire(None, at(2024, 6, 30, 0)), 0);
    }

    #[test]
    fn past_expiry_is_negative() {
        assert_eq!(days_to_expire(date("2024-04-10"), at(2024, 6, 30, 0)), -81);
        assert!(days_to_expire(date("2024-06-29"), at(2024, 6, 30, 6)) < 0);
    }

    #[test]
    fn classification_follows_thresholds() {
        let now = at(2024, 6, 30, 0);
        assert_eq!(classify_expiry(None, now, 30), SslStatus::NoSsl);
        assert_eq!(classify_expiry(date("2024-06-20"), now, 30), SslStatus::Expired);
        assert_eq!(classify_expiry(date("2024-07-10"), now, 30), SslStatus::ExpiringSoon);
        assert_eq!(classify_expiry(date("2024-07-30"), now, 30), SslStatus::ExpiringSoon);
        assert_eq!(classify_expiry(date("2024-07-31"), now, 30), SslStatus::Valid);
    }

    #[test]
    fn reclassify_only_touches_status() {
        let record = DomainRecord {
            id: 1,
            name: "example.com".to_string(),
            ssl_status: SslStatus::Valid,
            ssl_expiry_date: date("2024-07-05"),
            created_at: at(2024, 1, 1, 0),
        };

        let updated = reclassify(&record, at(2024, 6, 30, 0), DEFAULT_EXPIRING_SOON_DAYS);
        assert_eq!(updated.ssl_status, SslStatus::ExpiringSoon);
        assert_eq!(updated.ssl_expiry_date, record.ssl_expiry_date);
        assert_eq!(updated.id, record.id);
    }

    #[test]
    fn presentation_covers_all_statuses() {
        assert_eq!(status_presentation(SslStatus::Valid).label, "Valid");
        assert_eq!(
            status_presentation(SslStatus::ExpiringSoon).severity,
            Severity::Warning
        );
        assert_eq!(
            status_presentation(SslStatus::Expired).severity,
            Severity::Critical
        );
        assert_eq!(status_presentation(SslStatus::NoSsl).label, "No SSL");
    }

    #[test]
    fn unknown_raw_status_falls_back_to_no_ssl() {
        assert_eq!(presentation_for("bogus"), status_presentation(SslStatus::NoSsl));
        assert_eq!(presentation_for("expired").label, "Expired");
    }
}
