//! Owner of the current schema snapshot.
//!
//! The manager fetches rows from a [`RowSource`], parses them, reconciles them against the
//! current snapshot, installs the new snapshot and then broadcasts the resulting events.
//! Refreshes are serialized; readers never wait for one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::config::schema::SchemaConfig;
use crate::identifier::Identifier;
use crate::metadata::SchemaSnapshot;
use crate::parser::{ParseError, SchemaParser};
use crate::refresh::{SchemaChangeEvent, SchemaRefresh};
use crate::rows::SchemaRows;

/// Which part of the schema a [`RowSource`] is asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshScope {
    Full,
    Keyspace(Identifier),
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch schema rows: {message}")]
pub struct RowSourceError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RowSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Fetches the rows describing (part of) the schema from the cluster.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// For [`RefreshScope::Keyspace`], the returned rows must only describe that keyspace; no
    /// keyspace row means the keyspace doesn't exist.
    async fn fetch_rows(&self, scope: &RefreshScope) -> Result<SchemaRows, RowSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    RowSource(#[from] RowSourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type ManagerResult<T, E = ManagerError> = Result<T, E>;

pub struct MetadataManager {
    source: Arc<dyn RowSource>,
    config: SchemaConfig,
    log_prefix: String,
    snapshot: ArcSwap<SchemaSnapshot>,
    // Held for the whole fetch/compute/swap sequence so that refreshes don't interleave
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<Arc<SchemaChangeEvent>>,
}

impl MetadataManager {
    pub fn new(source: Arc<dyn RowSource>, config: SchemaConfig, log_prefix: String) -> Self {
        // The broadcast channel can't be empty
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            source,
            config,
            log_prefix,
            snapshot: ArcSwap::from_pointee(SchemaSnapshot::default()),
            refresh_lock: Mutex::new(()),
            events,
        }
    }

    /// The current snapshot; it stays valid (and unchanged) across later refreshes.
    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        self.snapshot.load_full()
    }

    /// Receive the events of every refresh completed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SchemaChangeEvent>> {
        self.events.subscribe()
    }

    /// Reload the whole schema. Keyspaces that are gone get dropped.
    pub async fn refresh_full(&self) -> ManagerResult<Vec<Arc<SchemaChangeEvent>>> {
        if !self.config.enabled {
            debug!("[{}] Schema metadata disabled, skipping refresh", self.log_prefix);
            return Ok(vec![]);
        }

        let _guard = self.refresh_lock.lock().await;
        let rows = self.fetch(&RefreshScope::Full).await?;
        let keyspaces = SchemaParser::new(&rows)
            .with_log_prefix(&self.log_prefix)
            .with_keyspace_filter(self.config.refreshed_keyspaces())
            .parse_full_schema()
            .map_err(|error| self.parse_failed(error))?;

        Ok(self.install(SchemaRefresh::Full(keyspaces)))
    }

    /// Reload a single keyspace, leaving all others as they are.
    pub async fn refresh_keyspace(
        &self,
        keyspace: &Identifier,
    ) -> ManagerResult<Vec<Arc<SchemaChangeEvent>>> {
        if !self.config.enabled {
            debug!("[{}] Schema metadata disabled, skipping refresh", self.log_prefix);
            return Ok(vec![]);
        }
        let filter = self.config.refreshed_keyspaces();
        if !filter.is_empty() && !filter.contains(keyspace) {
            debug!(
                "[{}] Ignoring refresh of {keyspace}, not in the refreshed keyspaces",
                self.log_prefix
            );
            return Ok(vec![]);
        }

        let _guard = self.refresh_lock.lock().await;
        let rows = self
            .fetch(&RefreshScope::Keyspace(keyspace.clone()))
            .await?;
        let parser = SchemaParser::new(&rows).with_log_prefix(&self.log_prefix);

        let refresh = match rows
            .keyspaces
            .iter()
            .find(|row| row.identifier("keyspace_name").ok().as_ref() == Some(keyspace))
        {
            Some(row) => SchemaRefresh::Keyspaces(vec![parser
                .parse_keyspace(row)
                .map_err(|error| self.parse_failed(error))?]),
            None => SchemaRefresh::DropKeyspace(keyspace.clone()),
        };

        Ok(self.install(refresh))
    }

    /// Apply an already computed change, e.g. a keyspace drop pushed by the cluster.
    pub async fn apply(&self, refresh: SchemaRefresh) -> Vec<Arc<SchemaChangeEvent>> {
        if !self.config.enabled {
            return vec![];
        }
        let _guard = self.refresh_lock.lock().await;
        self.install(refresh)
    }

    async fn fetch(&self, scope: &RefreshScope) -> ManagerResult<SchemaRows> {
        self.source.fetch_rows(scope).await.map_err(|error| {
            warn!(
                "[{}] Failed to fetch schema rows for {scope:?}, keeping the current schema: {error}",
                self.log_prefix
            );
            ManagerError::from(error)
        })
    }

    fn parse_failed(&self, error: ParseError) -> ManagerError {
        warn!(
            "[{}] Failed to parse schema rows, keeping the current schema: {error}",
            self.log_prefix
        );
        ManagerError::from(error)
    }

    // Must be called with the refresh lock held
    fn install(&self, refresh: SchemaRefresh) -> Vec<Arc<SchemaChangeEvent>> {
        let current = self.snapshot.load_full();
        if let SchemaRefresh::DropKeyspace(name) = &refresh {
            if current.keyspace(name).is_none() {
                debug!(
                    "[{}] Keyspace {name} is already absent from the schema",
                    self.log_prefix
                );
            }
        }

        let (snapshot, events) = refresh.compute(&current).into_parts();
        debug!(
            "[{}] Computed {} schema change event(s), {} keyspace(s) in the new snapshot",
            self.log_prefix,
            events.len(),
            snapshot.len()
        );
        self.snapshot.store(Arc::new(snapshot));

        let events: Vec<_> = events.into_iter().map(Arc::new).collect();
        for event in &events {
            info!("[{}] {event}", self.log_prefix);
            // No receivers is fine
            self.events.send(event.clone()).ok();
        }
        events
    }
}
