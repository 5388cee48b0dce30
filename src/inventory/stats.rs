use chrono::NaiveDate;

use super::expiry::{classify, ExpiryStatus};
use crate::db::models::MedicineRecord;

/// Summary counts over the whole, unfiltered inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total: usize,
    pub expired: usize,
    pub expiring_soon: usize,
    pub healthy: usize,
}

impl Statistics {
    pub fn compute(records: &[MedicineRecord], today: NaiveDate) -> Self {
        records.iter().fold(
            Statistics {
                total: records.len(),
                ..Default::default()
            },
            |mut stats, record| {
                match classify(record.expiry, today).status {
                    ExpiryStatus::Expired => stats.expired += 1,
                    ExpiryStatus::Expiring => stats.expiring_soon += 1,
                    ExpiryStatus::Healthy => stats.healthy += 1,
                }
                stats
            },
        )
    }

    /// Records that need attention: expired plus expiring.
    pub fn warning_count(&self) -> usize {
        self.expired + self.expiring_soon
    }
}

/// Counts behind the alert banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryAlerts {
    pub expired: usize,
    pub expiring_within_week: usize,
}

impl ExpiryAlerts {
    pub fn compute(records: &[MedicineRecord], today: NaiveDate) -> Self {
        let mut alerts = ExpiryAlerts::default();
        for record in records {
            let info = classify(record.expiry, today);
            if info.status == ExpiryStatus::Expired {
                alerts.expired += 1;
            } else if info.is_urgent() {
                alerts.expiring_within_week += 1;
            }
        }
        alerts
    }

    pub fn is_empty(&self) -> bool {
        self.expired == 0 && self.expiring_within_week == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn record(id: i64, name: &str, stock: u32, expiry_offset: i64) -> MedicineRecord {
        MedicineRecord {
            id,
            name: name.to_string(),
            brand: "Generic".to_string(),
            stock,
            expiry: today() + Duration::days(expiry_offset),
            opened: None,
            image: None,
            added_date: today(),
        }
    }

    #[test]
    fn aspirin_and_vitamin_c() {
        let records = vec![record(1, "Aspirin", 5, -30), record(2, "VitaminC", 0, 60)];
        let stats = Statistics::compute(&records, today());
        assert_eq!(
            stats,
            Statistics {
                total: 2,
                expired: 1,
                expiring_soon: 0,
                healthy: 1,
            }
        );
        assert_eq!(stats.warning_count(), 1);
    }

    #[test]
    fn empty_inventory() {
        let stats = Statistics::compute(&[], today());
        assert_eq!(stats, Statistics::default());
        assert!(ExpiryAlerts::compute(&[], today()).is_empty());
    }

    #[test]
    fn alerts_only_count_the_urgent_band() {
        let records = vec![
            record(1, "A", 1, -1),
            record(2, "B", 1, 0),
            record(3, "C", 1, 7),
            record(4, "D", 1, 20),
            record(5, "E", 1, 200),
        ];
        let alerts = ExpiryAlerts::compute(&records, today());
        assert_eq!(alerts.expired, 1);
        assert_eq!(alerts.expiring_within_week, 2);

        let stats = Statistics::compute(&records, today());
        assert_eq!(stats.expiring_soon, 3);
        assert_eq!(stats.warning_count(), 4);
    }
}
