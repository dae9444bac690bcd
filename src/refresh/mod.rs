//! Reconciliation of a new set of keyspace values against the current snapshot.
//!
//! Everything here is synchronous and pure: a [`SchemaRefresh`] never touches the snapshot it's
//! computed against, and always produces a new one along with the events leading to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::identifier::Identifier;
use crate::metadata::{KeyspaceMetadata, SchemaSnapshot};

mod diff;
mod events;

pub use diff::{compute_keyspace_events, diff_children};
pub use events::{ChangeEvent, ChangeType, SchemaChangeEvent, SchemaObject};

/// A pending change to the schema snapshot.
#[derive(Clone, Debug)]
pub enum SchemaRefresh {
    /// The complete set of keyspaces; keyspaces missing from it are dropped.
    Full(Vec<KeyspaceMetadata>),
    /// New values for some keyspaces; all others are kept as they are. A keyspace listed twice
    /// takes its last value.
    Keyspaces(Vec<KeyspaceMetadata>),
    /// The cluster reported that a keyspace was dropped.
    DropKeyspace(Identifier),
}

impl SchemaRefresh {
    pub fn compute(self, current: &SchemaSnapshot) -> RefreshResult {
        let mut events = vec![];

        let keyspaces = match self {
            SchemaRefresh::Full(keyspaces) => {
                let new: BTreeMap<_, _> = keyspaces
                    .into_iter()
                    .map(|keyspace| (keyspace.name().clone(), Arc::new(keyspace)))
                    .collect();

                events.extend(
                    current
                        .keyspaces()
                        .iter()
                        .filter(|(name, _)| !new.contains_key(name))
                        .map(|(_, old)| {
                            SchemaChangeEvent::Keyspace(ChangeEvent::Dropped(old.clone()))
                        }),
                );
                for (name, keyspace) in &new {
                    compute_keyspace_events(current.keyspace(name), keyspace, &mut events);
                }
                new
            }
            SchemaRefresh::Keyspaces(keyspaces) => {
                let new: BTreeMap<_, _> = keyspaces
                    .into_iter()
                    .map(|keyspace| (keyspace.name().clone(), Arc::new(keyspace)))
                    .collect();

                let mut merged = current.keyspaces().clone();
                for (name, keyspace) in new {
                    compute_keyspace_events(current.keyspace(&name), &keyspace, &mut events);
                    merged.insert(name, keyspace);
                }
                merged
            }
            SchemaRefresh::DropKeyspace(name) => {
                let mut remaining = current.keyspaces().clone();
                if let Some(old) = remaining.remove(&name) {
                    events.push(SchemaChangeEvent::Keyspace(ChangeEvent::Dropped(old)));
                }
                remaining
            }
        };

        RefreshResult {
            snapshot: SchemaSnapshot::from_map(keyspaces),
            events,
        }
    }
}

/// The outcome of a refresh: the snapshot to install, and the events to deliver once it is.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshResult {
    snapshot: SchemaSnapshot,
    events: Vec<SchemaChangeEvent>,
}

impl RefreshResult {
    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }

    pub fn events(&self) -> &[SchemaChangeEvent] {
        &self.events
    }

    pub fn into_parts(self) -> (SchemaSnapshot, Vec<SchemaChangeEvent>) {
        (self.snapshot, self.events)
    }
}
