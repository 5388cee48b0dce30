use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

/// Records expiring within this many days count as expiring.
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Expiring records at or under this many days are urgent in alerts.
pub const URGENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryStatus {
    Expired,
    Expiring,
    Healthy,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::Expiring => "expiring",
            ExpiryStatus::Healthy => "healthy",
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpiryStatus {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expired" => Ok(ExpiryStatus::Expired),
            "expiring" => Ok(ExpiryStatus::Expiring),
            "healthy" => Ok(ExpiryStatus::Healthy),
            _ => Err("Allowed statuses: expired, expiring, healthy"),
        }
    }
}

/// Derived expiry state of one record on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryInfo {
    pub status: ExpiryStatus,
    /// Days left until expiry, 0 once expired.
    pub days_remaining: i64,
    /// Days past expiry, 0 unless expired. Display only.
    pub overdue_days: i64,
}

impl ExpiryInfo {
    pub fn is_urgent(&self) -> bool {
        self.status == ExpiryStatus::Expiring && self.days_remaining <= URGENT_WINDOW_DAYS
    }

    pub fn status_text(&self) -> String {
        match self.status {
            ExpiryStatus::Expired => format!("Expired {} ago", days(self.overdue_days)),
            ExpiryStatus::Expiring => format!("Expires in {}", days(self.days_remaining)),
            ExpiryStatus::Healthy => "Good".to_string(),
        }
    }
}

fn days(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

/// Classifies an expiry date against `today`.
///
/// Both sides are calendar dates, so a record flips to expired at the first
/// midnight after its expiry date rather than 24 hours after some moment.
pub fn classify(expiry: NaiveDate, today: NaiveDate) -> ExpiryInfo {
    let diff_days = (expiry - today).num_days();

    if diff_days < 0 {
        ExpiryInfo {
            status: ExpiryStatus::Expired,
            days_remaining: 0,
            overdue_days: -diff_days,
        }
    } else if diff_days <= EXPIRING_WINDOW_DAYS {
        ExpiryInfo {
            status: ExpiryStatus::Expiring,
            days_remaining: diff_days,
            overdue_days: 0,
        }
    } else {
        ExpiryInfo {
            status: ExpiryStatus::Healthy,
            days_remaining: diff_days,
            overdue_days: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn expiring_today_is_expiring_with_zero_days() {
        let info = classify(today(), today());
        assert_eq!(info.status, ExpiryStatus::Expiring);
        assert_eq!(info.days_remaining, 0);
        assert!(info.is_urgent());
    }

    #[test]
    fn thirty_day_boundary() {
        let info = classify(today() + Duration::days(30), today());
        assert_eq!(info.status, ExpiryStatus::Expiring);
        assert_eq!(info.days_remaining, 30);
        assert!(!info.is_urgent());

        let info = classify(today() + Duration::days(31), today());
        assert_eq!(info.status, ExpiryStatus::Healthy);
        assert_eq!(info.days_remaining, 31);
    }

    #[test]
    fn yesterday_is_expired_with_zero_remaining() {
        let info = classify(today() - Duration::days(1), today());
        assert_eq!(info.status, ExpiryStatus::Expired);
        assert_eq!(info.days_remaining, 0);
        assert_eq!(info.overdue_days, 1);
        assert_eq!(info.status_text(), "Expired 1 day ago");
    }

    #[test]
    fn status_text_counts_days() {
        assert_eq!(
            classify(today() + Duration::days(1), today()).status_text(),
            "Expires in 1 day"
        );
        assert_eq!(classify(today(), today()).status_text(), "Expires in 0 days");
        assert_eq!(
            classify(today() - Duration::days(12), today()).status_text(),
            "Expired 12 days ago"
        );
        assert_eq!(
            classify(today() + Duration::days(90), today()).status_text(),
            "Good"
        );
    }

    #[test]
    fn urgent_band_ends_at_seven_days() {
        assert!(classify(today() + Duration::days(7), today()).is_urgent());
        assert!(!classify(today() + Duration::days(8), today()).is_urgent());
        assert!(!classify(today() - Duration::days(3), today()).is_urgent());
    }

    #[test]
    fn status_parses_from_its_display_form() {
        for status in [
            ExpiryStatus::Expired,
            ExpiryStatus::Expiring,
            ExpiryStatus::Healthy,
        ] {
            assert_eq!(status.to_string().parse::<ExpiryStatus>(), Ok(status));
        }
        assert!("soon".parse::<ExpiryStatus>().is_err());
    }
}
