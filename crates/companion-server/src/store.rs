use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use companion_core::config::DatabaseConfig;
use companion_core::record::{NewArtifact, StoredArtifact};
use companion_core::types::ArtifactKind;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence for generated artifacts, one logical table per kind.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn insert(&self, artifact: NewArtifact) -> Result<Uuid>;

    async fn fetch(&self, kind: ArtifactKind, id: Uuid) -> Result<Option<StoredArtifact>>;

    async fn ping(&self) -> Result<()>;
}

/// Postgres when a URL is configured, otherwise an in-process store.
pub async fn connect(cfg: &DatabaseConfig) -> Result<Arc<dyn ArtifactStore>> {
    match cfg.url.as_deref() {
        Some(url) => Ok(Arc::new(PgStore::connect(url, cfg.max_connections).await?)),
        None => {
            tracing::info!("no database configured, artifacts are kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

// ─── Postgres ─────────────────────────────────────────────────────────────

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool and apply the embedded migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("connected to postgres, migrations applied");
        Ok(Self { pool })
    }

    fn row_to_artifact(kind: ArtifactKind, row: PgRow) -> Result<StoredArtifact> {
        Ok(StoredArtifact {
            id: row.try_get("id")?,
            kind,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            project_id: row.try_get("project_id")?,
            specification_id: row.try_get("specification_id")?,
            design_id: row.try_get("design_id")?,
            metadata: row.try_get("metadata")?,
            provider: row.try_get("provider")?,
            model: row.try_get("model")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ArtifactStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, artifact: NewArtifact) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let query = format!(
            r#"
            INSERT INTO {} (
                id, title, content, project_id, specification_id, design_id,
                metadata, provider, model, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
            artifact.kind.table()
        );
        sqlx::query(&query)
            .bind(id)
            .bind(&artifact.title)
            .bind(&artifact.content)
            .bind(artifact.project_id)
            .bind(artifact.specification_id)
            .bind(artifact.design_id)
            .bind(&artifact.metadata)
            .bind(&artifact.provider)
            .bind(&artifact.model)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn fetch(&self, kind: ArtifactKind, id: Uuid) -> Result<Option<StoredArtifact>> {
        let query = format!(
            r#"
            SELECT id, title, content, project_id, specification_id, design_id,
                   metadata, provider, model, created_at
            FROM {}
            WHERE id = $1
            "#,
            kind.table()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Self::row_to_artifact(kind, r)).transpose()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ─── In-memory ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<(ArtifactKind, Uuid), StoredArtifact>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows of `kind`.
    pub async fn count(&self, kind: ArtifactKind) -> usize {
        self.rows.read().await.keys().filter(|(k, _)| *k == kind).count()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, artifact: NewArtifact) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let kind = artifact.kind;
        let stored = artifact.into_stored(id, Utc::now());
        self.rows.write().await.insert((kind, id), stored);
        Ok(id)
    }

    async fn fetch(&self, kind: ArtifactKind, id: Uuid) -> Result<Option<StoredArtifact>> {
        Ok(self.rows.read().await.get(&(kind, id)).cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
