use chrono::{DateTime, Local, NaiveDate};

use super::filter::{filter_medicines, ViewState};
use super::stats::{ExpiryAlerts, Statistics};
use super::StoreError;
use crate::db::models::{MedicineRecord, MedicineUpdate, NewMedicine};
use crate::db::KeyValueStorage;

/// Storage key holding the serialized record sequence.
pub const STORAGE_KEY: &str = "medicines";

/// The in-memory record sequence and the storage it is mirrored to.
///
/// Every successful mutation rewrites the whole sequence under
/// [`STORAGE_KEY`]. Rejected operations leave both memory and storage
/// untouched.
#[derive(Debug)]
pub struct MedicineStore<S> {
    storage: S,
    records: Vec<MedicineRecord>,
}

impl<S: KeyValueStorage> MedicineStore<S> {
    /// Reads the sequence from `storage`. Missing, unreadable or corrupt
    /// data starts an empty inventory.
    pub async fn load(storage: S) -> Self {
        let records = match storage.get(STORAGE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<MedicineRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Stored medicines are corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read stored medicines, starting empty: {}", e);
                Vec::new()
            }
        };

        log::info!("Loaded {} medicines", records.len());
        Self { storage, records }
    }

    pub fn records(&self) -> &[MedicineRecord] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&MedicineRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filtered(&self, view: &ViewState, today: NaiveDate) -> Vec<&MedicineRecord> {
        filter_medicines(&self.records, view.status, &view.search, today)
    }

    pub fn statistics(&self, today: NaiveDate) -> Statistics {
        Statistics::compute(&self.records, today)
    }

    pub fn alerts(&self, today: NaiveDate) -> ExpiryAlerts {
        ExpiryAlerts::compute(&self.records, today)
    }

    /// Appends a new record stamped with the current time.
    pub async fn add(&mut self, medicine: NewMedicine) -> Result<MedicineRecord, StoreError> {
        self.add_at(medicine, Local::now()).await
    }

    /// Appends a new record created at `now`. The id is the creation time in
    /// milliseconds, bumped past the newest id so two records added within
    /// the same millisecond stay distinct.
    pub async fn add_at(
        &mut self,
        medicine: NewMedicine,
        now: DateTime<Local>,
    ) -> Result<MedicineRecord, StoreError> {
        let newest = self.records.iter().map(|record| record.id).max();
        let id = match newest {
            Some(newest) if newest >= now.timestamp_millis() => newest
                .checked_add(1)
                .ok_or(StoreError::IdsExhausted(newest))?,
            _ => now.timestamp_millis(),
        };

        let record = medicine.into_record(id, now.date_naive());
        log::info!("Adding medicine {} ({})", record.name, record.id);
        self.records.push(record.clone());
        self.persist().await?;

        Ok(record)
    }

    /// Applies `update` to the record with `id`.
    pub async fn update(
        &mut self,
        id: i64,
        update: MedicineUpdate,
    ) -> Result<MedicineRecord, StoreError> {
        let record = self.find_mut(id)?;
        update.apply(record);
        let record = record.clone();

        log::info!("Updated medicine {} ({})", record.name, record.id);
        self.persist().await?;
        Ok(record)
    }

    /// Uses one unit of the record with `id`.
    pub async fn decrement(&mut self, id: i64) -> Result<MedicineRecord, StoreError> {
        let record = self.find_mut(id)?;
        if record.stock == 0 {
            log::warn!("Medicine {} ({}) is out of stock", record.name, record.id);
            return Err(StoreError::InsufficientStock {
                id,
                name: record.name.clone(),
            });
        }

        record.stock -= 1;
        let record = record.clone();

        log::info!(
            "Used one {} ({}), {} left",
            record.name,
            record.id,
            record.stock
        );
        self.persist().await?;
        Ok(record)
    }

    /// Deletes the record with `id`, keeping the order of the rest.
    pub async fn remove(&mut self, id: i64) -> Result<MedicineRecord, StoreError> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let record = self.records.remove(index);

        log::info!("Removed medicine {} ({})", record.name, record.id);
        self.persist().await?;
        Ok(record)
    }

    /// Overwrites the stored blob with the current sequence.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.records).map_err(crate::db::DatabaseError::from)?;
        self.storage.set(STORAGE_KEY, &raw).await?;
        Ok(())
    }

    fn find_mut(&mut self, id: i64) -> Result<&mut MedicineRecord, StoreError> {
        self.records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}
