use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Brand shown when the user leaves the brand empty.
pub const UNKNOWN_BRAND: &str = "Unknown brand";

fn unknown_brand() -> String {
    UNKNOWN_BRAND.to_string()
}

/// A medicine kept in the household cabinet.
///
/// Field names follow the stored JSON layout, so `added_date` is written as
/// `addedDate`. Fields that were added after the first release carry a
/// `serde(default)` so older blobs still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    pub id: i64,
    pub name: String,
    #[serde(default = "unknown_brand")]
    pub brand: String,
    pub stock: u32,
    pub expiry: NaiveDate,
    #[serde(default)]
    pub opened: Option<NaiveDate>,
    /// Photo of the package as a `data:` URI.
    #[serde(default)]
    pub image: Option<String>,
    pub added_date: NaiveDate,
}

/// Input for a new record. The caller validates presence of the name and
/// expiry date before handing it over.
#[derive(Debug, Clone, Default)]
pub struct NewMedicine {
    pub name: String,
    pub brand: Option<String>,
    pub stock: u32,
    pub expiry: NaiveDate,
    pub opened: Option<NaiveDate>,
    pub image: Option<String>,
}

impl NewMedicine {
    pub fn new(name: impl Into<String>, stock: u32, expiry: NaiveDate) -> Self {
        Self {
            name: name.into(),
            stock,
            expiry,
            ..Default::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_opened(mut self, opened: NaiveDate) -> Self {
        self.opened = Some(opened);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub(crate) fn into_record(self, id: i64, added_date: NaiveDate) -> MedicineRecord {
        let brand = self
            .brand
            .map(|brand| brand.trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(unknown_brand);

        MedicineRecord {
            id,
            name: self.name,
            brand,
            stock: self.stock,
            expiry: self.expiry,
            opened: self.opened,
            image: self.image,
            added_date,
        }
    }
}

/// Fields that may change after creation. `None` leaves a field untouched;
/// `opened: Some(None)` clears the opened date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineUpdate {
    pub stock: Option<u32>,
    pub opened: Option<Option<NaiveDate>>,
}

impl MedicineUpdate {
    pub(crate) fn apply(self, record: &mut MedicineRecord) {
        if let Some(stock) = self.stock {
            record.stock = stock;
        }
        if let Some(opened) = self.opened {
            record.opened = opened;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serializes_with_camel_case_dates() {
        let record = NewMedicine::new("Aspirin", 5, date(2026, 3, 1))
            .with_brand("Bayer")
            .into_record(1_700_000_000_000, date(2025, 1, 2));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["addedDate"], "2025-01-02");
        assert_eq!(json["expiry"], "2026-03-01");
        assert_eq!(json["opened"], serde_json::Value::Null);
        assert_eq!(json["image"], serde_json::Value::Null);
    }

    #[test]
    fn empty_brand_falls_back_to_placeholder() {
        let record = NewMedicine::new("Ibuprofen", 1, date(2026, 1, 1))
            .with_brand("   ")
            .into_record(1, date(2025, 1, 1));
        assert_eq!(record.brand, UNKNOWN_BRAND);
    }

    #[test]
    fn old_records_without_optional_fields_still_load() {
        let json = r#"{"id":1,"name":"Aspirin","stock":3,"expiry":"2026-01-01","addedDate":"2025-01-01"}"#;
        let record: MedicineRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.brand, UNKNOWN_BRAND);
        assert_eq!(record.opened, None);
        assert_eq!(record.image, None);
    }

    #[test]
    fn update_only_touches_given_fields() {
        let mut record = NewMedicine::new("Aspirin", 5, date(2026, 3, 1))
            .with_opened(date(2025, 2, 1))
            .into_record(1, date(2025, 1, 1));

        MedicineUpdate {
            stock: Some(9),
            opened: None,
        }
        .apply(&mut record);
        assert_eq!(record.stock, 9);
        assert_eq!(record.opened, Some(date(2025, 2, 1)));

        MedicineUpdate {
            stock: None,
            opened: Some(None),
        }
        .apply(&mut record);
        assert_eq!(record.stock, 9);
        assert_eq!(record.opened, None);
    }
}
