use chrono::Duration;
use storage::repository::{SnapshotRepository, Storage};
use storage::sqlite::SqliteRepository;
use thesis_core::model::{Catalog, CompletionStore, SectionIndex};
use thesis_core::snapshot::{self, STORAGE_KEY};
use thesis_core::time::fixed_now;

#[tokio::test]
async fn sqlite_roundtrip_persists_snapshot_blob() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snapshot_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let catalog = Catalog::thesis();
    let mut store = CompletionStore::fresh(&catalog);
    store.toggle(SectionIndex::new(4)).unwrap();
    store.set_note(SectionIndex::new(4), "scope agreed with supervisor").unwrap();
    let payload = snapshot::encode(&store).unwrap();

    repo.save_snapshot(STORAGE_KEY, &payload, fixed_now())
        .await
        .expect("save");

    let stored = repo
        .load_snapshot(STORAGE_KEY)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(stored.saved_at, fixed_now());

    let restored = snapshot::decode(&catalog, &stored.payload).expect("decode");
    assert_eq!(restored, store);
}

#[tokio::test]
async fn sqlite_save_overwrites_and_clear_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snapshot_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // migrations are idempotent
    repo.migrate().await.expect("migrate again");

    assert!(repo.load_snapshot(STORAGE_KEY).await.unwrap().is_none());

    repo.save_snapshot(STORAGE_KEY, "{}", fixed_now())
        .await
        .unwrap();
    let later = fixed_now() + Duration::minutes(5);
    repo.save_snapshot(STORAGE_KEY, r#"{"0":{"completed":true}}"#, later)
        .await
        .unwrap();

    let stored = repo.load_snapshot(STORAGE_KEY).await.unwrap().unwrap();
    assert_eq!(stored.payload, r#"{"0":{"completed":true}}"#);
    assert_eq!(stored.saved_at, later);

    repo.clear_snapshot(STORAGE_KEY).await.unwrap();
    assert!(repo.load_snapshot(STORAGE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn storage_sqlite_keeps_keys_apart() {
    let storage = Storage::sqlite("sqlite:file:memdb_snapshot_keys?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage
        .snapshots
        .save_snapshot("a", "{}", fixed_now())
        .await
        .unwrap();
    assert!(storage.snapshots.load_snapshot("b").await.unwrap().is_none());
    assert!(storage.snapshots.load_snapshot("a").await.unwrap().is_some());
}
