use chrono::{Duration, Local, NaiveDate};
use envconfig::Envconfig;

use medkit::config::DatabaseConfig;
use medkit::db::models::NewMedicine;
use medkit::db::{init_db, KeyValueStorage};
use medkit::inventory::{MedicineStore, StoreError};

/// Sample cabinet spread over every status, relative to `today`.
fn get_seed_data(today: NaiveDate) -> Vec<NewMedicine> {
    vec![
        NewMedicine::new("Aspirin", 5, today - Duration::days(30)).with_brand("Bayer"),
        NewMedicine::new("Vitamin C", 0, today + Duration::days(60)).with_brand("Redoxon"),
        NewMedicine::new("Amoxicillin", 12, today + Duration::days(5))
            .with_brand("Sandoz")
            .with_opened(today - Duration::days(2)),
        NewMedicine::new("Ibuprofen", 24, today + Duration::days(21)).with_brand("Advil"),
        NewMedicine::new("Loratadine", 10, today + Duration::days(400)).with_brand("Claritin"),
        NewMedicine::new("Cough syrup", 1, today - Duration::days(3))
            .with_opened(today - Duration::days(90)),
        NewMedicine::new("Saline drops", 3, today + Duration::days(180)),
    ]
}

pub async fn seed_database<S: KeyValueStorage>(
    store: &mut MedicineStore<S>,
) -> Result<usize, StoreError> {
    let medicines = get_seed_data(Local::now().date_naive());
    let count = medicines.len();

    for medicine in medicines {
        store.add(medicine).await?;
    }

    Ok(count)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenvy::dotenv().ok();

    let config = DatabaseConfig::init_from_env()?;
    let storage = init_db(&config.database_url).await?;
    let mut store = MedicineStore::load(storage).await;

    let count = seed_database(&mut store).await?;
    log::info!("Seeded {} medicines, {} in total", count, store.len());
    Ok(())
}
