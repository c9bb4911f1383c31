use chrono::TimeZone;

use super::*;

fn artwork(id: i64, uri: &str, title: Option<&str>) -> ArtworkItem {
    let mut item = ArtworkItem::new(ArtworkId(id), "com.example.featured", uri);
    item.title = title.map(str::to_string);
    item.date_added = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("fixed date");
    item
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn empty_store_has_no_current_artwork() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.current_artwork().await.expect("query").is_none());
    assert_eq!(storage.artwork_count().await.expect("count"), 0);
}

#[tokio::test]
async fn insert_round_trips_all_fields() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut item = artwork(7, "img://sunset", Some("Sunset"));
    item.byline = Some("A. Painter".into());
    item.attribution = Some("Museum".into());
    item.metadata = Some("{\"year\":1890}".into());

    storage.insert_artwork(&item).await.expect("insert");

    let stored = storage
        .current_artwork()
        .await
        .expect("query")
        .expect("current artwork");
    assert_eq!(stored.artwork, item);
}

#[tokio::test]
async fn reselecting_upserts_by_image_uri() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage
        .insert_artwork(&artwork(1, "img://a", Some("Old title")))
        .await
        .expect("insert a");
    storage
        .insert_artwork(&artwork(2, "img://b", None))
        .await
        .expect("insert b");
    let again = storage
        .insert_artwork(&artwork(1, "img://a", Some("New title")))
        .await
        .expect("reinsert a");

    assert_eq!(first, again);
    assert_eq!(storage.artwork_count().await.expect("count"), 2);

    let current = storage
        .current_artwork()
        .await
        .expect("query")
        .expect("current artwork");
    assert_eq!(current.artwork.image_uri.as_str(), "img://a");
    assert_eq!(current.artwork.title.as_deref(), Some("New title"));
}

#[tokio::test]
async fn looks_up_artwork_by_image_uri() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_artwork(&artwork(3, "img://c", None))
        .await
        .expect("insert");

    let found = storage
        .artwork_by_image_uri(&ImageUri::new("img://c"))
        .await
        .expect("query");
    let missing = storage
        .artwork_by_image_uri(&ImageUri::new("img://zzz"))
        .await
        .expect("query");

    assert_eq!(found.map(|stored| stored.artwork.id), Some(ArtworkId(3)));
    assert!(missing.is_none());
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("browse_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("browse.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let _ = std::fs::remove_dir_all(temp_root);
}

#[test]
fn sqlite_path_skips_memory_urls() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(sqlite_path("postgres://host/db"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/browse.db?mode=rwc"),
        Some(PathBuf::from("./data/browse.db"))
    );
}
