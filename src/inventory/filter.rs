use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::expiry::{classify, ExpiryStatus};
use crate::db::models::MedicineRecord;

/// Status selection for the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ExpiryStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ExpiryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            other => other
                .parse::<ExpiryStatus>()
                .map(StatusFilter::Only)
                .map_err(|_| "Allowed filters: all, expired, expiring, healthy"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Grid => f.write_str("grid"),
            ViewMode::List => f.write_str("list"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            _ => Err("Allowed views: grid, list"),
        }
    }
}

/// Transient display selections. Never persisted; a fresh value is the
/// state after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub status: StatusFilter,
    pub mode: ViewMode,
    pub search: String,
}

/// Returns the records passing both the status filter and the search text,
/// in their original order. Search is a case-insensitive substring match on
/// name or brand; an empty search passes everything.
pub fn filter_medicines<'a>(
    records: &'a [MedicineRecord],
    status: StatusFilter,
    search: &str,
    today: NaiveDate,
) -> Vec<&'a MedicineRecord> {
    let needle = search.to_lowercase();

    records
        .iter()
        .filter(|record| status.matches(classify(record.expiry, today).status))
        .filter(|record| {
            needle.is_empty()
                || record.name.to_lowercase().contains(&needle)
                || record.brand.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn record(id: i64, name: &str, brand: &str, expiry_offset: i64) -> MedicineRecord {
        MedicineRecord {
            id,
            name: name.to_string(),
            brand: brand.to_string(),
            stock: 1,
            expiry: today() + Duration::days(expiry_offset),
            opened: None,
            image: None,
            added_date: today(),
        }
    }

    fn sample() -> Vec<MedicineRecord> {
        vec![
            record(1, "Aspirin", "Bayer", -10),
            record(2, "Paracetamol", "Aspirin Co", -2),
            record(3, "Aspirin Forte", "Generic", 90),
            record(4, "Ibuprofen", "Advil", 5),
            record(5, "Cough syrup", "Generic", -40),
        ]
    }

    fn ids(records: &[&MedicineRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id).collect()
    }

    #[test]
    fn all_with_empty_search_passes_everything() {
        let records = sample();
        let filtered = filter_medicines(&records, StatusFilter::All, "", today());
        assert_eq!(ids(&filtered), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn expired_and_search_compose() {
        let records = sample();
        let filtered = filter_medicines(
            &records,
            StatusFilter::Only(ExpiryStatus::Expired),
            "aspirin",
            today(),
        );
        assert_eq!(ids(&filtered), vec![1, 2]);
    }

    #[test]
    fn search_is_case_insensitive_on_brand() {
        let records = sample();
        let filtered = filter_medicines(&records, StatusFilter::All, "GENERIC", today());
        assert_eq!(ids(&filtered), vec![3, 5]);
    }

    #[test]
    fn search_is_not_trimmed() {
        let records = sample();
        assert!(filter_medicines(&records, StatusFilter::All, "asp ", today()).is_empty());
        assert!(filter_medicines(&records, StatusFilter::All, "   ", today()).is_empty());
        let filtered = filter_medicines(&records, StatusFilter::All, "aspirin ", today());
        assert_eq!(ids(&filtered), vec![2, 3]);
    }

    #[test]
    fn status_only() {
        let records = sample();
        let expiring = filter_medicines(
            &records,
            StatusFilter::Only(ExpiryStatus::Expiring),
            "",
            today(),
        );
        assert_eq!(ids(&expiring), vec![4]);

        let healthy = filter_medicines(
            &records,
            StatusFilter::Only(ExpiryStatus::Healthy),
            "",
            today(),
        );
        assert_eq!(ids(&healthy), vec![3]);
    }

    #[test]
    fn parses_filters_and_views() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Expiring".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(ExpiryStatus::Expiring))
        );
        assert!("stale".parse::<StatusFilter>().is_err());
        assert_eq!("LIST".parse::<ViewMode>(), Ok(ViewMode::List));
        assert!("table".parse::<ViewMode>().is_err());
    }
}
