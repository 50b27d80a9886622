//! PostgreSQL Backend
//!
//! Remote row store using SQLx. One row per envelope in a single table,
//! created on connect when missing:
//!
//! | column           | type          |                                   |
//! |------------------|---------------|-----------------------------------|
//! | `id`             | `TEXT`        | primary key, `"{owner}_{card id}"`|
//! | `user_id`        | `TEXT`        | owner scope                       |
//! | `card_id`        | `TEXT`        | envelope id                       |
//! | `encrypted_data` | `TEXT`        |                                   |
//! | `timestamp`      | `TIMESTAMPTZ` | envelope creation time            |
//! | `card_type`      | `TEXT`        |                                   |
//! | `last_four`      | `TEXT`        |                                   |
//! | `created_at`     | `TIMESTAMPTZ` | row insertion time, list order    |

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::card::CardType;
use crate::error::{VaultError, VaultResult};
use crate::storage::traits::StorageBackend;
use crate::storage::types::{BackendKind, Envelope, OwnerScope, RemoteConfig};

pub const DEFAULT_TABLE: &str = "card_vault";
const DEFAULT_DATABASE: &str = "cardvault";
const DEFAULT_PORT: u16 = 5432;
const MAX_CONNECTIONS: u32 = 5;

type CardRowTuple = (String, String, DateTime<Utc>, String, String);

/// One row of the card table
#[derive(Debug, Clone, PartialEq)]
struct CardRow {
    card_id: String,
    encrypted_data: String,
    timestamp: DateTime<Utc>,
    card_type: String,
    last_four: String,
}

impl CardRow {
    fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            card_id: envelope.id.clone(),
            encrypted_data: envelope.encrypted_data.clone(),
            timestamp: envelope.timestamp,
            card_type: envelope.card_type.label().to_string(),
            last_four: envelope.last_four.clone(),
        }
    }

    fn from_tuple(
        (card_id, encrypted_data, timestamp, card_type, last_four): CardRowTuple,
    ) -> Self {
        Self {
            card_id,
            encrypted_data,
            timestamp,
            card_type,
            last_four,
        }
    }

    fn into_envelope(self) -> Envelope {
        Envelope {
            id: self.card_id,
            encrypted_data: self.encrypted_data,
            timestamp: self.timestamp,
            card_type: CardType::from_label(&self.card_type),
            last_four: self.last_four,
        }
    }
}

/// Quotes an identifier, doubling embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         id TEXT PRIMARY KEY, \
         user_id TEXT NOT NULL, \
         card_id TEXT NOT NULL, \
         encrypted_data TEXT NOT NULL, \
         \"timestamp\" TIMESTAMPTZ NOT NULL, \
         card_type TEXT NOT NULL, \
         last_four TEXT NOT NULL, \
         created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp())",
        quote_ident(table)
    )
}

fn upsert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {} (id, user_id, card_id, encrypted_data, \"timestamp\", card_type, last_four) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (id) DO UPDATE SET \
         encrypted_data = EXCLUDED.encrypted_data, \
         \"timestamp\" = EXCLUDED.\"timestamp\", \
         card_type = EXCLUDED.card_type, \
         last_four = EXCLUDED.last_four",
        quote_ident(table)
    )
}

fn select_sql(table: &str) -> String {
    format!(
        "SELECT card_id, encrypted_data, \"timestamp\", card_type, last_four FROM {} \
         WHERE user_id = $1 ORDER BY created_at, card_id",
        quote_ident(table)
    )
}

fn delete_sql(table: &str) -> String {
    format!(
        "DELETE FROM {} WHERE id = $1 AND user_id = $2",
        quote_ident(table)
    )
}

fn clear_sql(table: &str) -> String {
    format!("DELETE FROM {} WHERE user_id = $1", quote_ident(table))
}

/// PostgreSQL backend implementation
pub struct RowStoreBackend {
    config: RemoteConfig,
    owner: OwnerScope,
    connect_timeout: Duration,
    pool: RwLock<Option<PgPool>>,
}

impl RowStoreBackend {
    pub fn new(config: RemoteConfig, owner: OwnerScope, connect_timeout: Duration) -> Self {
        Self {
            config,
            owner,
            connect_timeout,
            pool: RwLock::new(None),
        }
    }

    /// Builds a connection string from config
    fn build_connection_string(config: &RemoteConfig) -> String {
        if let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }

        let ssl_mode = if config.ssl { "require" } else { "disable" };
        let db = config.database.as_deref().unwrap_or(DEFAULT_DATABASE);
        let port = if config.port == 0 { DEFAULT_PORT } else { config.port };

        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            config.username, config.password, config.host, port, db, ssl_mode
        )
    }

    fn table(&self) -> &str {
        self.config.container.as_deref().unwrap_or(DEFAULT_TABLE)
    }

    async fn pool(&self) -> VaultResult<PgPool> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or_else(|| VaultError::backend_unavailable("PostgreSQL is not connected"))
    }

    async fn ensure_schema(&self, pool: &PgPool) -> VaultResult<()> {
        sqlx::query(&create_table_sql(self.table()))
            .execute(pool)
            .await
            .map_err(|e| VaultError::backend_unavailable(format!("Failed to prepare table: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for RowStoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteRow
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    #[instrument(skip(self), fields(table = %self.table()))]
    async fn connect(&self) -> VaultResult<()> {
        if !self.config.is_configured() {
            return Err(VaultError::backend_unavailable("PostgreSQL is not configured"));
        }

        let conn_str = Self::build_connection_string(&self.config);

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(self.connect_timeout)
            .connect(&conn_str)
            .await
            .map_err(|e| VaultError::backend_unavailable(e.to_string()))?;

        self.ensure_schema(&pool).await?;

        let previous = self.pool.write().await.replace(pool);
        if let Some(previous) = previous {
            previous.close().await;
        }
        info!(owner = %self.owner, "Connected to PostgreSQL");
        Ok(())
    }

    async fn disconnect(&self) -> VaultResult<()> {
        let pool = self.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
        }
        Ok(())
    }

    #[instrument(skip(self, envelope), fields(card_id = %envelope.id))]
    async fn save(&self, envelope: &Envelope) -> VaultResult<()> {
        let pool = self.pool().await?;
        let row = CardRow::from_envelope(envelope);

        sqlx::query(&upsert_sql(self.table()))
            .bind(self.owner.scoped_key(&envelope.id))
            .bind(self.owner.as_str())
            .bind(&row.card_id)
            .bind(&row.encrypted_data)
            .bind(row.timestamp)
            .bind(&row.card_type)
            .bind(&row.last_four)
            .execute(&pool)
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;

        debug!("Card saved to PostgreSQL");
        Ok(())
    }

    async fn list(&self) -> VaultResult<Vec<Envelope>> {
        let pool = self.pool().await?;

        let rows: Vec<CardRowTuple> = sqlx::query_as(&select_sql(self.table()))
            .bind(self.owner.as_str())
            .fetch_all(&pool)
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| CardRow::from_tuple(row).into_envelope())
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> VaultResult<()> {
        let pool = self.pool().await?;

        sqlx::query(&delete_sql(self.table()))
            .bind(self.owner.scoped_key(id))
            .bind(self.owner.as_str())
            .execute(&pool)
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> VaultResult<()> {
        let pool = self.pool().await?;

        let result = sqlx::query(&clear_sql(self.table()))
            .bind(self.owner.as_str())
            .execute(&pool)
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;

        debug!(deleted = result.rows_affected(), "Cleared PostgreSQL envelopes");
        Ok(())
    }
}
