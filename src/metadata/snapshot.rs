use std::collections::BTreeMap;
use std::sync::Arc;

use crate::identifier::Identifier;
use crate::metadata::KeyspaceMetadata;

/// The whole schema at one point in time.
///
/// Cloning is cheap; a refresh never modifies a snapshot but produces a new one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaSnapshot {
    keyspaces: Arc<BTreeMap<Identifier, Arc<KeyspaceMetadata>>>,
}

impl SchemaSnapshot {
    pub fn new(keyspaces: impl IntoIterator<Item = Arc<KeyspaceMetadata>>) -> Self {
        Self::from_map(
            keyspaces
                .into_iter()
                .map(|keyspace| (keyspace.name().clone(), keyspace))
                .collect(),
        )
    }

    pub(crate) fn from_map(keyspaces: BTreeMap<Identifier, Arc<KeyspaceMetadata>>) -> Self {
        Self {
            keyspaces: Arc::new(keyspaces),
        }
    }

    pub fn keyspaces(&self) -> &BTreeMap<Identifier, Arc<KeyspaceMetadata>> {
        &self.keyspaces
    }

    pub fn keyspace(&self, name: &Identifier) -> Option<&Arc<KeyspaceMetadata>> {
        self.keyspaces.get(name)
    }

    pub fn len(&self) -> usize {
        self.keyspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyspaces.is_empty()
    }
}
