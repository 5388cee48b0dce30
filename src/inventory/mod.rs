use thiserror::Error;

use crate::db::DatabaseError;

pub mod expiry;
pub mod filter;
pub mod stats;
pub mod store;

pub use expiry::{classify, ExpiryInfo, ExpiryStatus};
pub use filter::{filter_medicines, StatusFilter, ViewMode, ViewState};
pub use stats::{ExpiryAlerts, Statistics};
pub use store::{MedicineStore, STORAGE_KEY};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Medicine {0} not found")]
    NotFound(i64),
    #[error("{name} is out of stock")]
    InsufficientStock { id: i64, name: String },
    #[error("No ids left after {0}")]
    IdsExhausted(i64),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
