use chrono::{Duration, Local};

use medkit::db::models::{MedicineUpdate, NewMedicine};
use medkit::db::{init_db, KeyValueStorage};
use medkit::inventory::{
    ExpiryStatus, MedicineStore, StatusFilter, StoreError, ViewState, STORAGE_KEY,
};

#[tokio::test]
async fn records_survive_a_reload() {
    let storage = init_db("sqlite::memory:").await.expect("Failed to open database");
    let today = Local::now().date_naive();

    let mut store = MedicineStore::load(storage.clone()).await;
    assert!(store.is_empty());

    let aspirin = store
        .add(NewMedicine::new("Aspirin", 5, today - Duration::days(30)).with_brand("Bayer"))
        .await
        .expect("Failed to add aspirin");
    let vitamin = store
        .add(
            NewMedicine::new("VitaminC", 0, today + Duration::days(60))
                .with_opened(today - Duration::days(1))
                .with_image("data:image/jpeg;base64,YWJj"),
        )
        .await
        .expect("Failed to add vitamin");
    store
        .update(
            aspirin.id,
            MedicineUpdate {
                stock: Some(4),
                opened: None,
            },
        )
        .await
        .expect("Failed to update aspirin");

    let reloaded = MedicineStore::load(storage.clone()).await;
    assert_eq!(reloaded.records(), store.records());
    assert_eq!(reloaded.get(aspirin.id).map(|r| r.stock), Some(4));
    assert_eq!(reloaded.get(vitamin.id), Some(&vitamin));

    let stats = reloaded.statistics(today);
    assert_eq!((stats.total, stats.expired, stats.expiring_soon, stats.healthy), (2, 1, 0, 1));
}

#[tokio::test]
async fn rejected_decrement_leaves_the_blob_alone() {
    let storage = init_db("sqlite::memory:").await.expect("Failed to open database");
    let today = Local::now().date_naive();

    let mut store = MedicineStore::load(storage.clone()).await;
    let empty = store
        .add(NewMedicine::new("VitaminC", 0, today + Duration::days(60)))
        .await
        .expect("Failed to add");
    let before = storage.get(STORAGE_KEY).await.expect("Failed to read");

    let err = store.decrement(empty.id).await.unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { .. }));
    assert_eq!(storage.get(STORAGE_KEY).await.expect("Failed to read"), before);

    store.remove(empty.id).await.expect("Failed to remove");
    assert!(matches!(
        store.remove(empty.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(
        storage.get(STORAGE_KEY).await.expect("Failed to read").as_deref(),
        Some("[]")
    );
}

#[tokio::test]
async fn corrupt_blob_loads_empty() {
    let storage = init_db("sqlite::memory:").await.expect("Failed to open database");
    storage
        .set(STORAGE_KEY, "[{\"id\": \"not a number\"}]")
        .await
        .expect("Failed to write");

    let store = MedicineStore::load(storage).await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn filtered_view_over_stored_records() {
    let storage = init_db("sqlite::memory:").await.expect("Failed to open database");
    let today = Local::now().date_naive();

    let mut store = MedicineStore::load(storage).await;
    for (name, brand, offset) in [
        ("Aspirin", "Bayer", -5),
        ("Paracetamol", "Aspirin Labs", -1),
        ("Aspirin Forte", "Bayer", 120),
        ("Ibuprofen", "Advil", -8),
    ] {
        store
            .add(NewMedicine::new(name, 1, today + Duration::days(offset)).with_brand(brand))
            .await
            .expect("Failed to add");
    }

    let view = ViewState {
        status: StatusFilter::Only(ExpiryStatus::Expired),
        search: "aspirin".to_string(),
        ..Default::default()
    };
    let names: Vec<_> = store
        .filtered(&view, today)
        .into_iter()
        .map(|record| record.name.as_str())
        .collect();
    assert_eq!(names, vec!["Aspirin", "Paracetamol"]);
}
