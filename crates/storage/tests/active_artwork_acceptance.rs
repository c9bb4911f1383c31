use std::sync::Arc;

use browse_core::{
    ArtworkWriter, BrowseSettings, SelectionHandler, TracingAnalyticsSink,
};
use shared::domain::{ArtworkId, ArtworkItem};
use storage::Storage;

#[tokio::test]
async fn selecting_artwork_persists_it_as_active() {
    let storage = Arc::new(Storage::new("sqlite::memory:").await.expect("db"));
    let handler = SelectionHandler::new(
        Arc::new(TracingAnalyticsSink),
        storage.clone() as Arc<dyn ArtworkWriter>,
        BrowseSettings::default(),
    );

    let item = ArtworkItem::new(ArtworkId(11), "com.example.featured", "img://harbor")
        .with_title("Harbor");
    let message = handler.select(&item).await.expect("select");

    assert!(message.contains("Harbor"));
    let current = storage
        .current_artwork()
        .await
        .expect("query")
        .expect("active artwork");
    assert_eq!(current.artwork.image_uri, item.image_uri);
    assert_eq!(current.artwork.id, ArtworkId(11));
}

#[tokio::test]
async fn latest_selection_wins() {
    let storage = Arc::new(Storage::new("sqlite::memory:").await.expect("db"));
    let first = ArtworkItem::new(ArtworkId(1), "com.example.featured", "img://first");
    let second = ArtworkItem::new(ArtworkId(2), "com.example.featured", "img://second");

    storage.write_active_artwork(&first).await.expect("first");
    storage.write_active_artwork(&second).await.expect("second");

    let current = storage
        .current_artwork()
        .await
        .expect("query")
        .expect("active artwork");
    assert_eq!(current.artwork.image_uri, second.image_uri);
    assert_eq!(storage.artwork_count().await.expect("count"), 2);
}
