//! MongoDB Backend
//!
//! Remote document store. One document per envelope, keyed
//! `"{owner}_{id}"` and tagged with `ownerId` so every read and bulk delete
//! stays inside the vault's owner scope.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::{options::ClientOptions, Client, Collection};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::card::{timestamp, CardType};
use crate::error::{VaultError, VaultResult};
use crate::storage::traits::StorageBackend;
use crate::storage::types::{BackendKind, Envelope, OwnerScope, RemoteConfig};

pub const DEFAULT_COLLECTION: &str = "card_vault";
const DEFAULT_DATABASE: &str = "cardvault";
const DEFAULT_PORT: u16 = 27017;

/// MongoDB backend implementation
pub struct DocumentStoreBackend {
    config: RemoteConfig,
    owner: OwnerScope,
    connect_timeout: Duration,
    client: RwLock<Option<Client>>,
}

impl DocumentStoreBackend {
    pub fn new(config: RemoteConfig, owner: OwnerScope, connect_timeout: Duration) -> Self {
        Self {
            config,
            owner,
            connect_timeout,
            client: RwLock::new(None),
        }
    }

    /// Builds a connection string from config
    fn build_connection_string(config: &RemoteConfig) -> String {
        if let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }

        let db = config.database.as_deref().unwrap_or(DEFAULT_DATABASE);
        let port = if config.port == 0 { DEFAULT_PORT } else { config.port };
        let tls = if config.ssl { "true" } else { "false" };

        if config.username.is_empty() {
            format!("mongodb://{}:{}/{}?tls={}", config.host, port, db, tls)
        } else {
            format!(
                "mongodb://{}:{}@{}:{}/{}?authSource=admin&tls={}",
                config.username, config.password, config.host, port, db, tls
            )
        }
    }

    fn database_name(&self) -> &str {
        self.config.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    fn collection_name(&self) -> &str {
        self.config.container.as_deref().unwrap_or(DEFAULT_COLLECTION)
    }

    async fn collection(&self) -> VaultResult<Collection<Document>> {
        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or_else(|| VaultError::backend_unavailable("MongoDB is not connected"))?;

        Ok(client
            .database(self.database_name())
            .collection::<Document>(self.collection_name()))
    }

    /// Persisted document for an envelope, without `createdAt`
    pub(crate) fn envelope_to_document(owner: &OwnerScope, envelope: &Envelope) -> Document {
        doc! {
            "_id": owner.scoped_key(&envelope.id),
            "ownerId": owner.as_str(),
            "cardId": envelope.id.as_str(),
            "encryptedData": envelope.encrypted_data.as_str(),
            "timestamp": timestamp::format(&envelope.timestamp),
            "cardType": envelope.card_type.label(),
            "lastFour": envelope.last_four.as_str(),
        }
    }

    pub(crate) fn document_to_envelope(doc: &Document) -> VaultResult<Envelope> {
        let field = |name: &str| {
            doc.get_str(name)
                .map_err(|e| VaultError::storage(format!("Malformed document field '{}': {}", name, e)))
        };

        Ok(Envelope {
            id: field("cardId")?.to_string(),
            encrypted_data: field("encryptedData")?.to_string(),
            timestamp: timestamp::parse(field("timestamp")?)
                .map_err(|e| VaultError::storage(format!("Malformed document timestamp: {}", e)))?,
            card_type: CardType::from_label(field("cardType")?),
            last_four: field("lastFour")?.to_string(),
        })
    }

    /// Maps fetched documents, skipping any that are malformed.
    pub(crate) fn documents_to_envelopes(docs: impl IntoIterator<Item = Document>) -> Vec<Envelope> {
        docs.into_iter()
            .filter_map(|doc| match Self::document_to_envelope(&doc) {
                Ok(envelope) => Some(envelope),
                Err(e) => {
                    let id = doc.get_str("_id").unwrap_or("<unknown>");
                    warn!(document_id = %id, error = %e, "Skipping malformed document");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl StorageBackend for DocumentStoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteDocument
    }

    fn display_name(&self) -> &'static str {
        "MongoDB"
    }

    #[instrument(skip(self), fields(collection = %self.collection_name()))]
    async fn connect(&self) -> VaultResult<()> {
        if !self.config.is_configured() {
            return Err(VaultError::backend_unavailable("MongoDB is not configured"));
        }

        let conn_str = Self::build_connection_string(&self.config);

        let mut options = ClientOptions::parse(&conn_str)
            .await
            .map_err(|e| VaultError::backend_unavailable(e.to_string()))?;
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.connect_timeout);

        let client = Client::with_options(options)
            .map_err(|e| VaultError::backend_unavailable(e.to_string()))?;

        // Client construction is lazy; ping forces a round trip
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| VaultError::backend_unavailable(e.to_string()))?;

        *self.client.write().await = Some(client);
        info!(owner = %self.owner, "Connected to MongoDB");
        Ok(())
    }

    async fn disconnect(&self) -> VaultResult<()> {
        self.client.write().await.take();
        Ok(())
    }

    #[instrument(skip(self, envelope), fields(card_id = %envelope.id))]
    async fn save(&self, envelope: &Envelope) -> VaultResult<()> {
        let collection = self.collection().await?;

        let key = self.owner.scoped_key(&envelope.id);
        let mut fields = Self::envelope_to_document(&self.owner, envelope);
        fields.remove("_id");

        collection
            .update_one(
                doc! { "_id": key },
                doc! {
                    "$set": fields,
                    "$setOnInsert": { "createdAt": BsonDateTime::now() },
                },
            )
            .upsert(true)
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;

        debug!("Card saved to MongoDB");
        Ok(())
    }

    async fn list(&self) -> VaultResult<Vec<Envelope>> {
        let collection = self.collection().await?;

        let mut cursor = collection
            .find(doc! { "ownerId": self.owner.as_str() })
            .sort(doc! { "createdAt": 1, "_id": 1 })
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;

        let mut documents = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?
        {
            documents.push(doc);
        }

        Ok(Self::documents_to_envelopes(documents))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> VaultResult<()> {
        let collection = self.collection().await?;

        collection
            .delete_one(doc! { "_id": self.owner.scoped_key(id), "ownerId": self.owner.as_str() })
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> VaultResult<()> {
        let collection = self.collection().await?;

        let result = collection
            .delete_many(doc! { "ownerId": self.owner.as_str() })
            .await
            .map_err(|e| VaultError::storage(e.to_string()))?;

        debug!(deleted = result.deleted_count, "Cleared MongoDB envelopes");
        Ok(())
    }
}
