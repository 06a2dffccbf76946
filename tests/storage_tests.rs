use nss_portal::storage::{
    LocalStorage, MockStorageService, StorageError, StorageService, remove_all,
};
use std::path::PathBuf;
use uuid::Uuid;

/// Every test gets its own root so nothing needs serializing.
fn scratch_root() -> PathBuf {
    std::env::temp_dir().join(format!("nss-storage-test-{}", Uuid::new_v4()))
}

#[tokio::test]
async fn local_store_writes_under_the_root_and_builds_the_url() {
    let root = scratch_root();
    let storage = LocalStorage::new(&root, "http://localhost:3000");
    storage.ensure_ready().await;

    let stored = storage
        .store("abc_camp.jpg", b"jpegbytes", "image/jpeg")
        .await
        .unwrap();

    assert_eq!(stored.public_id, "abc_camp.jpg");
    assert_eq!(stored.url, "http://localhost:3000/uploads/abc_camp.jpg");
    assert_eq!(
        tokio::fs::read(root.join("abc_camp.jpg")).await.unwrap(),
        b"jpegbytes"
    );

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn local_remove_is_idempotent() {
    let root = scratch_root();
    let storage = LocalStorage::new(&root, "http://localhost:3000");
    storage.ensure_ready().await;

    storage.store("gone.png", b"x", "image/png").await.unwrap();
    storage.remove("gone.png").await.unwrap();
    assert!(!root.join("gone.png").exists());

    // Removing a missing object is success, not an error.
    storage.remove("gone.png").await.unwrap();
    storage.remove("never-existed.png").await.unwrap();

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn local_storage_refuses_traversal_names() {
    let root = scratch_root();
    let storage = LocalStorage::new(&root, "http://localhost:3000");
    storage.ensure_ready().await;

    for name in ["../evil.png", "a/b.png", "..", ".", "", "..\\evil.png"] {
        let stored = storage.store(name, b"x", "image/png").await;
        assert!(
            matches!(stored, Err(StorageError::InvalidName(_))),
            "stored {:?}",
            name
        );
        let removed = storage.remove(name).await;
        assert!(
            matches!(removed, Err(StorageError::InvalidName(_))),
            "removed {:?}",
            name
        );
    }

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn mock_storage_records_operations() {
    let storage = MockStorageService::new();

    let stored = storage.store("pic.png", b"x", "image/png").await.unwrap();
    assert!(stored.url.contains("signature=fake"));
    assert_eq!(storage.stored.lock().unwrap().as_slice(), ["pic.png"]);

    storage.remove("pic.png").await.unwrap();
    assert_eq!(storage.removed.lock().unwrap().as_slice(), ["pic.png"]);
}

#[tokio::test]
async fn mock_storage_can_simulate_failure() {
    let storage = MockStorageService::new_failing();
    assert!(storage.store("pic.png", b"x", "image/png").await.is_err());
    assert!(storage.remove("pic.png").await.is_err());
}

#[tokio::test]
async fn remove_all_is_best_effort() {
    // Removal failures are collected, not propagated: the caller can delete
    // its metadata and leave the orphans for reconciliation.
    let storage = MockStorageService::new_with_failing_removals();
    let outcome = remove_all(
        &storage,
        ["a.png".to_string(), "b.png".to_string()],
    )
    .await;

    assert_eq!(outcome.removed, 0);
    assert_eq!(outcome.failed, vec!["a.png".to_string(), "b.png".to_string()]);
    assert!(!outcome.is_clean());

    let storage = MockStorageService::new();
    let outcome = remove_all(&storage, ["a.png".to_string()]).await;
    assert_eq!(outcome.removed, 1);
    assert!(outcome.is_clean());
}
