//! Vault Facade
//!
//! Single entry point for the card lifecycle. Ties together the session key,
//! the record codec and whichever storage backend is currently selected.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::card::{generate_id, timestamp, validation, CardInput, CardRecord};
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::storage::drivers::{DocumentStoreBackend, LocalBackend, RowStoreBackend};
use crate::storage::registry::BackendRegistry;
use crate::storage::traits::StorageBackend;
use crate::storage::types::{BackendKind, Envelope, OwnerScope};
use crate::vault::codec::RecordCodec;
use crate::vault::session_key::{KeyProvisioner, SessionKey};

/// Which backend the vault writes to, and how it answered last
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSelection {
    pub active: BackendKind,
    /// False once the active backend reports itself unreachable, true again
    /// after its next successful call
    pub connected: bool,
    /// User-facing reason for the last fallback or outage
    pub last_error: Option<String>,
}

impl BackendSelection {
    fn local() -> Self {
        Self {
            active: BackendKind::Local,
            connected: true,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStatus {
    pub backend: BackendKind,
    pub display_name: &'static str,
    pub connected: bool,
    pub last_error: Option<String>,
    pub owner_scope: String,
}

/// An envelope that was listed but could not be opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub id: String,
    pub reason: String,
}

/// Result of listing the vault
#[derive(Debug, Default)]
pub struct CardListing {
    pub cards: Vec<CardRecord>,
    pub failures: Vec<DecodeFailure>,
}

fn card_id() -> String {
    generate_id("card")
}

pub struct Vault {
    registry: Arc<BackendRegistry>,
    keys: KeyProvisioner,
    codec: RecordCodec,
    selection: RwLock<BackendSelection>,
    owner: OwnerScope,
    id_generator: fn() -> String,
    connect_timeout: Duration,
}

impl Vault {
    /// Creates a vault over the given backends, starting on local storage.
    ///
    /// The registry must contain a local backend; it is the fallback target
    /// whenever a remote backend cannot be reached.
    pub fn new(registry: BackendRegistry, owner: OwnerScope) -> VaultResult<Self> {
        if registry.get(BackendKind::Local).is_none() {
            return Err(VaultError::config("A local backend must be registered"));
        }

        Ok(Self {
            registry: Arc::new(registry),
            keys: KeyProvisioner::new(),
            codec: RecordCodec::new(),
            selection: RwLock::new(BackendSelection::local()),
            owner,
            id_generator: card_id,
            connect_timeout: Duration::from_millis(crate::config::DEFAULT_CONNECT_TIMEOUT_MS),
        })
    }

    /// Builds the local, document and row backends described by `config`.
    pub async fn from_config(config: &VaultConfig) -> VaultResult<Self> {
        let owner = config.owner_scope();
        let connect_timeout = config.connect_timeout();

        let local = match &config.local.path {
            Some(path) => LocalBackend::open(path).await?,
            None => LocalBackend::in_memory(),
        };

        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(local));
        registry.register(Arc::new(DocumentStoreBackend::new(
            config.document_store.clone(),
            owner.clone(),
            connect_timeout,
        )));
        registry.register(Arc::new(RowStoreBackend::new(
            config.row_store.clone(),
            owner.clone(),
            connect_timeout,
        )));

        info!(owner = %owner, backends = registry.len(), "Vault initialized");

        Ok(Self::new(registry, owner)?.with_connect_timeout(connect_timeout))
    }

    pub fn with_session_key(mut self, key: SessionKey) -> Self {
        self.keys = KeyProvisioner::with_key(key);
        self
    }

    pub fn with_id_generator(mut self, generator: fn() -> String) -> Self {
        self.id_generator = generator;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn owner_scope(&self) -> &OwnerScope {
        &self.owner
    }

    /// Handle to the active backend. The selection lock is released before
    /// the caller awaits on the backend.
    async fn active_backend(&self) -> VaultResult<Arc<dyn StorageBackend>> {
        let active = self.selection.read().await.active;
        self.registry
            .get(active)
            .ok_or_else(|| VaultError::config(format!("Backend not registered: {}", active)))
    }

    /// Updates `connected` from the outcome of a call on `kind`, as long as
    /// `kind` is still the active backend.
    async fn record_outcome<T>(&self, kind: BackendKind, result: &VaultResult<T>) {
        let connected = match result {
            Ok(_) => true,
            Err(e) if e.is_unavailable() => false,
            Err(_) => return,
        };

        {
            let selection = self.selection.read().await;
            if selection.active != kind || selection.connected == connected {
                return;
            }
        }

        let mut selection = self.selection.write().await;
        if selection.active != kind {
            return;
        }
        selection.connected = connected;
        match result {
            Ok(_) => info!(backend = %kind, "Storage backend reachable again"),
            Err(e) => {
                warn!(backend = %kind, error = %e, "Storage backend unreachable");
                selection.last_error = Some(e.user_message());
            }
        }
    }

    /// Validates, encrypts and stores a card
    ///
    /// Nothing is encrypted or written when validation fails; the error then
    /// lists every rejected field.
    #[instrument(skip(self, input))]
    pub async fn submit_card(&self, input: CardInput) -> VaultResult<Envelope> {
        let input = input.normalized();
        let today = chrono::Local::now().date_naive();

        if let Err(errors) = validation::validate(&input, today) {
            warn!(fields = %errors, "Card rejected by validation");
            return Err(errors.into());
        }

        let record = CardRecord::from_input(&input, (self.id_generator)(), timestamp::now());
        let envelope = self.codec.encode(&record, self.keys.get_or_create_key())?;

        let backend = self.active_backend().await?;
        let result = backend.save(&envelope).await;
        self.record_outcome(backend.kind(), &result).await;
        result.inspect_err(|e| {
            warn!(backend = %backend.kind(), error = %e, "Failed to save card");
        })?;

        info!(
            card_id = %envelope.id,
            card_type = %envelope.card_type,
            last_four = %envelope.last_four,
            backend = %backend.kind(),
            "Card saved"
        );
        Ok(envelope)
    }

    /// Decrypts every card in the active backend
    ///
    /// Envelopes that fail to decrypt (earlier session key, corrupted data)
    /// are skipped and reported in `failures`.
    #[instrument(skip(self))]
    pub async fn list_cards(&self) -> VaultResult<CardListing> {
        let backend = self.active_backend().await?;
        let result = backend.list().await;
        self.record_outcome(backend.kind(), &result).await;
        let envelopes = result.inspect_err(|e| {
            warn!(backend = %backend.kind(), error = %e, "Failed to list cards");
        })?;

        let key = self.keys.get_or_create_key();
        let mut listing = CardListing::default();

        for envelope in envelopes {
            match self.codec.decode(&envelope, key) {
                Ok(record) => listing.cards.push(record),
                Err(e) => {
                    warn!(card_id = %envelope.id, error = %e, "Skipping card that failed to decrypt");
                    listing.failures.push(DecodeFailure {
                        id: envelope.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(listing)
    }

    /// Deleting an id that is not stored is a no-op
    #[instrument(skip(self))]
    pub async fn delete_card(&self, id: &str) -> VaultResult<()> {
        let backend = self.active_backend().await?;
        let result = backend.delete(id).await;
        self.record_outcome(backend.kind(), &result).await;
        result.inspect_err(|e| {
            warn!(backend = %backend.kind(), error = %e, "Failed to delete card");
        })?;
        info!(backend = %backend.kind(), "Card deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clear_vault(&self) -> VaultResult<()> {
        let backend = self.active_backend().await?;
        let result = backend.clear_all().await;
        self.record_outcome(backend.kind(), &result).await;
        result.inspect_err(|e| {
            warn!(backend = %backend.kind(), error = %e, "Failed to clear vault");
        })?;
        info!(backend = %backend.kind(), "Vault cleared");
        Ok(())
    }

    /// Number of stored envelopes, decryptable or not
    pub async fn card_count(&self) -> VaultResult<usize> {
        let backend = self.active_backend().await?;
        let result = backend.list().await;
        self.record_outcome(backend.kind(), &result).await;
        Ok(result?.len())
    }

    /// Switches the active backend
    ///
    /// Returns `false` when `target` is not registered, not configured, or
    /// does not answer within the connect timeout; the vault is then on
    /// local storage. Existing envelopes are never copied between backends.
    #[instrument(skip(self), fields(timeout_ms = self.connect_timeout.as_millis() as u64))]
    pub async fn set_backend(&self, target: BackendKind) -> bool {
        let outcome = match self.registry.get(target) {
            Some(backend) => match timeout(self.connect_timeout, backend.connect()).await {
                Ok(result) => result,
                Err(_) => Err(VaultError::Timeout {
                    timeout_ms: self.connect_timeout.as_millis() as u64,
                }),
            },
            None => Err(VaultError::backend_unavailable(format!(
                "Backend not registered: {}",
                target
            ))),
        };

        let (next, switched, last_error) = match outcome {
            Ok(()) => (target, true, None),
            Err(e) => {
                warn!(
                    backend = %target,
                    error = %e,
                    "Backend unavailable, falling back to local storage"
                );
                (BackendKind::Local, false, Some(e.user_message()))
            }
        };

        let previous = {
            let mut selection = self.selection.write().await;
            let previous = selection.active;
            *selection = BackendSelection {
                active: next,
                connected: true,
                last_error,
            };
            previous
        };

        if previous != next && previous.is_remote() {
            if let Some(old) = self.registry.get(previous) {
                if let Err(e) = old.disconnect().await {
                    warn!(backend = %previous, error = %e, "Failed to disconnect backend");
                }
            }
        }

        if switched {
            info!(backend = %next, "Storage backend switched");
        }
        switched
    }

    pub async fn selection(&self) -> BackendSelection {
        self.selection.read().await.clone()
    }

    pub async fn status(&self) -> VaultStatus {
        let selection = self.selection().await;
        let display_name = self
            .registry
            .get(selection.active)
            .map(|backend| backend.display_name())
            .unwrap_or("unregistered");

        VaultStatus {
            backend: selection.active,
            display_name,
            connected: selection.connected,
            last_error: selection.last_error,
            owner_scope: self.owner.to_string(),
        }
    }

    /// Registered backend kinds, in selector order
    pub fn backends(&self) -> Vec<BackendKind> {
        self.registry.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use crate::card::{CardField, CardType};

    /// Remote stand-in whose connect always fails or never returns
    struct UnreachableBackend {
        kind: BackendKind,
        hang: bool,
    }

    #[async_trait]
    impl StorageBackend for UnreachableBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn display_name(&self) -> &'static str {
            "Unreachable"
        }

        async fn connect(&self) -> VaultResult<()> {
            if self.hang {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Err(VaultError::backend_unavailable("connection refused"))
        }

        async fn save(&self, _envelope: &Envelope) -> VaultResult<()> {
            Err(VaultError::backend_unavailable("connection refused"))
        }

        async fn list(&self) -> VaultResult<Vec<Envelope>> {
            Err(VaultError::backend_unavailable("connection refused"))
        }

        async fn delete(&self, _id: &str) -> VaultResult<()> {
            Err(VaultError::backend_unavailable("connection refused"))
        }

        async fn clear_all(&self) -> VaultResult<()> {
            Err(VaultError::backend_unavailable("connection refused"))
        }
    }

    /// Second local store registered under a remote kind, always reachable
    struct ReachableRemote(LocalBackend);

    #[async_trait]
    impl StorageBackend for ReachableRemote {
        fn kind(&self) -> BackendKind {
            BackendKind::RemoteRow
        }

        fn display_name(&self) -> &'static str {
            "Reachable"
        }

        async fn save(&self, envelope: &Envelope) -> VaultResult<()> {
            self.0.save(envelope).await
        }

        async fn list(&self) -> VaultResult<Vec<Envelope>> {
            self.0.list().await
        }

        async fn delete(&self, id: &str) -> VaultResult<()> {
            self.0.delete(id).await
        }

        async fn clear_all(&self) -> VaultResult<()> {
            self.0.clear_all().await
        }
    }

    /// Reachable document store that can be taken down after connecting
    #[derive(Default)]
    struct FlakyRemote {
        inner: LocalBackend,
        down: AtomicBool,
    }

    impl FlakyRemote {
        fn check(&self) -> VaultResult<()> {
            if self.down.load(Ordering::SeqCst) {
                return Err(VaultError::backend_unavailable("connection reset"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StorageBackend for FlakyRemote {
        fn kind(&self) -> BackendKind {
            BackendKind::RemoteDocument
        }

        fn display_name(&self) -> &'static str {
            "Flaky"
        }

        async fn save(&self, envelope: &Envelope) -> VaultResult<()> {
            self.check()?;
            self.inner.save(envelope).await
        }

        async fn list(&self) -> VaultResult<Vec<Envelope>> {
            self.check()?;
            self.inner.list().await
        }

        async fn delete(&self, id: &str) -> VaultResult<()> {
            self.check()?;
            self.inner.delete(id).await
        }

        async fn clear_all(&self) -> VaultResult<()> {
            self.check()?;
            self.inner.clear_all().await
        }
    }

    fn local_vault() -> Vault {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::in_memory()));
        Vault::new(registry, OwnerScope::new("user_1_testscope")).expect("vault")
    }

    fn visa() -> CardInput {
        CardInput::new("John Doe", "4532 0151 1283 0366", "12/99", "123")
    }

    fn mastercard() -> CardInput {
        CardInput::new("Jane Roe", "5425233430109903", "01/98", "4567")
    }

    #[tokio::test]
    async fn submit_then_list_decrypts_cards() {
        let vault = local_vault();

        let envelope = vault.submit_card(visa()).await.expect("submit");
        assert!(envelope.id.starts_with("card_"));
        assert_eq!(envelope.card_type, CardType::Visa);
        assert_eq!(envelope.last_four, "0366");

        let listing = vault.list_cards().await.expect("list");
        assert!(listing.failures.is_empty());
        assert_eq!(listing.cards.len(), 1);
        assert_eq!(listing.cards[0].card_number, "4532015112830366");
        assert_eq!(listing.cards[0].cardholder_name, "John Doe");
        assert_eq!(listing.cards[0].id, envelope.id);
    }

    #[tokio::test]
    async fn invalid_card_is_not_stored() {
        let vault = local_vault();

        let err = vault
            .submit_card(CardInput::new("J0hn", "4532015112830367", "13/20", "1"))
            .await
            .expect_err("should be rejected");

        match err {
            VaultError::Validation(errors) => {
                assert!(errors.has_field(CardField::CardholderName));
                assert!(errors.has_field(CardField::CardNumber));
                assert!(errors.has_field(CardField::ExpiryDate));
                assert!(errors.has_field(CardField::Cvv));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(vault.card_count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let vault = local_vault();
        let first = vault.submit_card(visa()).await.expect("submit");
        let second = vault.submit_card(mastercard()).await.expect("submit");

        vault.delete_card(&first.id).await.expect("delete");
        vault.delete_card(&first.id).await.expect("second delete is a no-op");

        let listing = vault.list_cards().await.expect("list");
        let ids: Vec<&str> = listing.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str()]);
    }

    #[tokio::test]
    async fn clear_vault_empties_listing() {
        let vault = local_vault();
        vault.submit_card(visa()).await.expect("submit");
        vault.submit_card(mastercard()).await.expect("submit");

        vault.clear_vault().await.expect("clear");
        let listing = vault.list_cards().await.expect("list");
        assert!(listing.cards.is_empty());
        assert!(listing.failures.is_empty());
    }

    #[tokio::test]
    async fn forced_id_collision_keeps_one_envelope() {
        let vault = local_vault().with_id_generator(|| "card_fixed".to_string());

        vault.submit_card(visa()).await.expect("submit");
        vault.submit_card(mastercard()).await.expect("submit");

        assert_eq!(vault.card_count().await.expect("count"), 1);
        let listing = vault.list_cards().await.expect("list");
        assert_eq!(listing.cards.len(), 1);
        assert_eq!(listing.cards[0].card_number, "5425233430109903");
    }

    #[tokio::test]
    async fn envelopes_from_another_session_are_reported() {
        let local = Arc::new(LocalBackend::in_memory());

        let mut registry = BackendRegistry::new();
        registry.register(local.clone());
        let earlier = Vault::new(registry, OwnerScope::new("user_1_a"))
            .expect("vault")
            .with_session_key(SessionKey::from_bytes([1; 32]));
        let orphan = earlier.submit_card(visa()).await.expect("submit");

        let mut registry = BackendRegistry::new();
        registry.register(local);
        let current = Vault::new(registry, OwnerScope::new("user_1_a"))
            .expect("vault")
            .with_session_key(SessionKey::from_bytes([2; 32]));
        current.submit_card(mastercard()).await.expect("submit");

        let listing = current.list_cards().await.expect("list");
        assert_eq!(listing.cards.len(), 1);
        assert_eq!(listing.cards[0].last_four(), "9903");
        assert_eq!(listing.failures.len(), 1);
        assert_eq!(listing.failures[0].id, orphan.id);
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back_to_local() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::in_memory()));
        registry.register(Arc::new(UnreachableBackend {
            kind: BackendKind::RemoteDocument,
            hang: false,
        }));
        let vault = Vault::new(registry, OwnerScope::new("user_1_a")).expect("vault");

        assert!(!vault.set_backend(BackendKind::RemoteDocument).await);
        assert_eq!(vault.selection().await.active, BackendKind::Local);

        // later writes land in local storage
        vault.submit_card(visa()).await.expect("submit");
        assert_eq!(vault.card_count().await.expect("count"), 1);
        assert_eq!(vault.status().await.display_name, "LocalStorage");
    }

    #[tokio::test]
    async fn hanging_remote_times_out() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::in_memory()));
        registry.register(Arc::new(UnreachableBackend {
            kind: BackendKind::RemoteRow,
            hang: true,
        }));
        let vault = Vault::new(registry, OwnerScope::new("user_1_a"))
            .expect("vault")
            .with_connect_timeout(Duration::from_millis(50));

        assert!(!vault.set_backend(BackendKind::RemoteRow).await);
        assert_eq!(vault.selection().await.active, BackendKind::Local);
    }

    #[tokio::test]
    async fn unconfigured_document_store_falls_back() {
        let vault = Vault::from_config(&VaultConfig::default()).await.expect("vault");
        assert_eq!(
            vault.backends(),
            vec![BackendKind::Local, BackendKind::RemoteDocument, BackendKind::RemoteRow]
        );

        assert!(!vault.set_backend(BackendKind::RemoteDocument).await);
        assert!(!vault.set_backend(BackendKind::RemoteRow).await);

        let status = vault.status().await;
        assert_eq!(status.backend, BackendKind::Local);
        assert!(status.connected);
        assert!(status.owner_scope.starts_with("user_"));
    }

    #[tokio::test]
    async fn unregistered_backend_falls_back() {
        let vault = local_vault();
        assert!(!vault.set_backend(BackendKind::RemoteRow).await);
        assert_eq!(vault.selection().await.active, BackendKind::Local);
        assert!(vault.set_backend(BackendKind::Local).await);
    }

    #[tokio::test]
    async fn switching_does_not_migrate_envelopes() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::in_memory()));
        registry.register(Arc::new(ReachableRemote(LocalBackend::in_memory())));
        let vault = Vault::new(registry, OwnerScope::new("user_1_a")).expect("vault");

        vault.submit_card(visa()).await.expect("submit");

        assert!(vault.set_backend(BackendKind::RemoteRow).await);
        assert_eq!(vault.status().await.display_name, "Reachable");
        assert_eq!(vault.card_count().await.expect("count"), 0);
        vault.submit_card(mastercard()).await.expect("submit");

        assert!(vault.set_backend(BackendKind::Local).await);
        let listing = vault.list_cards().await.expect("list");
        assert_eq!(listing.cards.len(), 1);
        assert_eq!(listing.cards[0].last_four(), "0366");
    }

    #[tokio::test]
    async fn vault_requires_local_backend() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(UnreachableBackend {
            kind: BackendKind::RemoteDocument,
            hang: false,
        }));
        assert!(matches!(
            Vault::new(registry, OwnerScope::new("user_1_a")),
            Err(VaultError::Config(_))
        ));
    }

    #[tokio::test]
    async fn from_config_uses_local_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = VaultConfig {
            owner_scope: Some("user_7_fixedscope".to_string()),
            ..Default::default()
        };
        config.local.path = Some(dir.path().join("envelopes.json"));

        let vault = Vault::from_config(&config).await.expect("vault");
        vault.submit_card(visa()).await.expect("submit");
        assert_eq!(vault.owner_scope().as_str(), "user_7_fixedscope");

        let reopened = LocalBackend::open(dir.path().join("envelopes.json"))
            .await
            .expect("reopen");
        assert_eq!(reopened.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn fallback_reason_is_kept_until_next_switch() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::in_memory()));
        registry.register(Arc::new(UnreachableBackend {
            kind: BackendKind::RemoteDocument,
            hang: false,
        }));
        registry.register(Arc::new(UnreachableBackend {
            kind: BackendKind::RemoteRow,
            hang: true,
        }));
        let vault = Vault::new(registry, OwnerScope::new("user_1_a"))
            .expect("vault")
            .with_connect_timeout(Duration::from_millis(50));
        assert_eq!(vault.status().await.last_error, None);

        assert!(!vault.set_backend(BackendKind::RemoteDocument).await);
        assert_eq!(
            vault.status().await.last_error,
            Some(VaultError::backend_unavailable("connection refused").user_message())
        );

        assert!(!vault.set_backend(BackendKind::RemoteRow).await);
        assert_eq!(
            vault.status().await.last_error,
            Some(VaultError::Timeout { timeout_ms: 50 }.user_message())
        );

        assert!(vault.set_backend(BackendKind::Local).await);
        assert_eq!(vault.status().await.last_error, None);
    }

    #[tokio::test]
    async fn remote_outage_clears_connected_until_it_answers() {
        let remote = Arc::new(FlakyRemote::default());
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::in_memory()));
        registry.register(remote.clone());
        let vault = Vault::new(registry, OwnerScope::new("user_1_a")).expect("vault");

        assert!(vault.set_backend(BackendKind::RemoteDocument).await);
        vault.submit_card(visa()).await.expect("submit");
        assert!(vault.status().await.connected);

        remote.down.store(true, Ordering::SeqCst);
        assert!(matches!(
            vault.submit_card(mastercard()).await,
            Err(VaultError::BackendUnavailable(_))
        ));
        let status = vault.status().await;
        assert_eq!(status.backend, BackendKind::RemoteDocument);
        assert!(!status.connected);
        assert!(status.last_error.is_some());

        // the next call that gets through marks it reachable again
        remote.down.store(false, Ordering::SeqCst);
        assert_eq!(vault.card_count().await.expect("count"), 1);
        assert!(vault.status().await.connected);
    }
}
