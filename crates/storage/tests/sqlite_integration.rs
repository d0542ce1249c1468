use storage::repository::{KeyValueStore, Storage};
use storage::snapshot::UserRecord;
use storage::sqlite::SqliteRepository;
use tracker_core::model::{User, UserId};

#[tokio::test]
async fn sqlite_kv_put_replace_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_basic?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("user").await.unwrap(), None);

    repo.put("user", "first").await.unwrap();
    repo.put("user", "second").await.unwrap();
    assert_eq!(repo.get("user").await.unwrap().as_deref(), Some("second"));

    repo.remove("user").await.unwrap();
    assert_eq!(repo.get("user").await.unwrap(), None);

    // removing a missing key is not an error
    repo.remove("user").await.unwrap();
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let url = "sqlite:file:memdb_kv_migrate?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.put("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn sqlite_storage_keeps_user_snapshot() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_snapshot?mode=memory&cache=shared")
        .await
        .expect("open storage");

    let user = User::new(
        UserId::generate(),
        "Edsger Dijkstra",
        "ewd@example.com",
        "edsgerdijkstra",
        None,
    )
    .unwrap();
    let raw = UserRecord::from_user(&user).to_json().unwrap();
    storage.kv.put("user", &raw).await.unwrap();

    let stored = storage.kv.get("user").await.unwrap().expect("snapshot present");
    let restored = UserRecord::from_json(&stored).unwrap().into_user().unwrap();
    assert_eq!(restored, user);
}
