use anyhow::{Context, Result};
use async_trait::async_trait;
use browse_core::ArtworkWriter;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{ArtworkId, ArtworkItem, ImageUri};

/// Durable record of which artwork the user picked. The most recently
/// selected row is the active wallpaper.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredArtwork {
    pub row_id: i64,
    pub artwork: ArtworkItem,
    pub selected_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Upserts by image uri. Re-selecting an existing artwork refreshes its
    /// fields and moves it to the top.
    pub async fn insert_artwork(&self, artwork: &ArtworkItem) -> Result<i64> {
        let selected_at = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO artworks (
                provider_artwork_id, provider_authority, image_uri, title, byline,
                attribution, metadata, date_added, selected_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(image_uri) DO UPDATE SET
                provider_artwork_id = excluded.provider_artwork_id,
                provider_authority = excluded.provider_authority,
                title = excluded.title,
                byline = excluded.byline,
                attribution = excluded.attribution,
                metadata = excluded.metadata,
                date_added = excluded.date_added,
                selected_at = excluded.selected_at
            RETURNING id
            "#,
        )
        .bind(artwork.id.0)
        .bind(&artwork.provider_authority)
        .bind(artwork.image_uri.as_str())
        .bind(&artwork.title)
        .bind(&artwork.byline)
        .bind(&artwork.attribution)
        .bind(&artwork.metadata)
        .bind(artwork.date_added)
        .bind(selected_at)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to store artwork '{}'", artwork.image_uri))?;
        Ok(row.get::<i64, _>(0))
    }

    pub async fn current_artwork(&self) -> Result<Option<StoredArtwork>> {
        let row = sqlx::query(
            r#"
            SELECT id, provider_artwork_id, provider_authority, image_uri, title, byline,
                   attribution, metadata, date_added, selected_at
            FROM artworks
            ORDER BY selected_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(stored_artwork_from_row).transpose()
    }

    pub async fn artwork_by_image_uri(&self, image_uri: &ImageUri) -> Result<Option<StoredArtwork>> {
        let row = sqlx::query(
            r#"
            SELECT id, provider_artwork_id, provider_authority, image_uri, title, byline,
                   attribution, metadata, date_added, selected_at
            FROM artworks
            WHERE image_uri = ?
            "#,
        )
        .bind(image_uri.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(stored_artwork_from_row).transpose()
    }

    pub async fn artwork_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM artworks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn stored_artwork_from_row(row: SqliteRow) -> Result<StoredArtwork> {
    let artwork = ArtworkItem {
        id: ArtworkId(row.try_get("provider_artwork_id")?),
        provider_authority: row.try_get("provider_authority")?,
        image_uri: ImageUri::new(row.try_get::<String, _>("image_uri")?),
        title: row.try_get("title")?,
        byline: row.try_get("byline")?,
        attribution: row.try_get("attribution")?,
        metadata: row.try_get("metadata")?,
        date_added: row.try_get("date_added")?,
    };
    Ok(StoredArtwork {
        row_id: row.try_get("id")?,
        artwork,
        selected_at: row.try_get("selected_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[async_trait]
impl ArtworkWriter for Storage {
    async fn write_active_artwork(&self, artwork: &ArtworkItem) -> Result<()> {
        let row_id = self.insert_artwork(artwork).await?;
        debug!(row_id, image_uri = %artwork.image_uri, "active artwork stored");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
