use std::collections::BTreeMap;
use std::sync::Arc;

use crate::metadata::KeyspaceMetadata;
use crate::refresh::events::{ChangeEvent, SchemaChangeEvent};

/// Compare two keyed collections of schema objects, pushing one event per differing key.
///
/// Keys only in `old` are reported first through `on_dropped`, then every key of `new` in
/// order: `on_created` if it's not in `old`, `on_updated` if its value differs structurally.
pub fn diff_children<K, V, E>(
    old: &BTreeMap<K, Arc<V>>,
    new: &BTreeMap<K, Arc<V>>,
    on_dropped: impl Fn(Arc<V>) -> E,
    on_created: impl Fn(Arc<V>) -> E,
    on_updated: impl Fn(Arc<V>, Arc<V>) -> E,
    events: &mut Vec<E>,
) where
    K: Ord,
    V: PartialEq,
{
    events.extend(
        old.iter()
            .filter(|(key, _)| !new.contains_key(key))
            .map(|(_, value)| on_dropped(value.clone())),
    );

    for (key, new_value) in new {
        match old.get(key) {
            None => events.push(on_created(new_value.clone())),
            Some(old_value) if !Arc::ptr_eq(old_value, new_value) && old_value != new_value => {
                events.push(on_updated(old_value.clone(), new_value.clone()))
            }
            Some(_) => {}
        }
    }
}

fn diff_into<K: Ord, V: PartialEq>(
    old: &BTreeMap<K, Arc<V>>,
    new: &BTreeMap<K, Arc<V>>,
    wrap: fn(ChangeEvent<V>) -> SchemaChangeEvent,
    events: &mut Vec<SchemaChangeEvent>,
) {
    diff_children(
        old,
        new,
        |dropped| wrap(ChangeEvent::Dropped(dropped)),
        |created| wrap(ChangeEvent::Created(created)),
        |old, new| wrap(ChangeEvent::Updated { old, new }),
        events,
    )
}

/// Compute the events turning `old` into `new`, for a single keyspace.
///
/// A keyspace that didn't exist before only yields `Keyspace(Created)`: listeners are not told
/// about its children separately.
pub fn compute_keyspace_events(
    old: Option<&Arc<KeyspaceMetadata>>,
    new: &Arc<KeyspaceMetadata>,
    events: &mut Vec<SchemaChangeEvent>,
) {
    let old = match old {
        None => {
            events.push(SchemaChangeEvent::Keyspace(ChangeEvent::Created(new.clone())));
            return;
        }
        Some(old) => old,
    };

    if !old.shallow_equals(new) {
        events.push(SchemaChangeEvent::Keyspace(ChangeEvent::Updated {
            old: old.clone(),
            new: new.clone(),
        }));
    }

    diff_into(old.tables(), new.tables(), SchemaChangeEvent::Table, events);
    diff_into(old.views(), new.views(), SchemaChangeEvent::View, events);
    diff_into(old.user_types(), new.user_types(), SchemaChangeEvent::Type, events);
    diff_into(old.functions(), new.functions(), SchemaChangeEvent::Function, events);
    diff_into(old.aggregates(), new.aggregates(), SchemaChangeEvent::Aggregate, events);
}
