use std::fmt;
use std::sync::Arc;

use strum_macros::{AsRefStr, Display, EnumString};

use crate::metadata::{
    AggregateMetadata, FunctionMetadata, KeyspaceMetadata, ObjectKind, TableMetadata,
    UserTypeMetadata, ViewMetadata,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeType {
    Created,
    Updated,
    Dropped,
}

/// A schema object that change events can be emitted for.
pub trait SchemaObject {
    const KIND: ObjectKind;

    /// Fully qualified name, as used in logs (`ks.t1`, `ks.plus(int)`...).
    fn qualified_name(&self) -> String;
}

impl SchemaObject for KeyspaceMetadata {
    const KIND: ObjectKind = ObjectKind::Keyspace;

    fn qualified_name(&self) -> String {
        self.name().to_string()
    }
}

impl SchemaObject for TableMetadata {
    const KIND: ObjectKind = ObjectKind::Table;

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }
}

impl SchemaObject for ViewMetadata {
    const KIND: ObjectKind = ObjectKind::View;

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }
}

impl SchemaObject for UserTypeMetadata {
    const KIND: ObjectKind = ObjectKind::Type;

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }
}

impl SchemaObject for FunctionMetadata {
    const KIND: ObjectKind = ObjectKind::Function;

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.signature)
    }
}

impl SchemaObject for AggregateMetadata {
    const KIND: ObjectKind = ObjectKind::Aggregate;

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.signature)
    }
}

/// A change to a single schema object. Values are shared with the snapshots they come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent<T> {
    Created(Arc<T>),
    Updated { old: Arc<T>, new: Arc<T> },
    Dropped(Arc<T>),
}

impl<T> ChangeEvent<T> {
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeEvent::Created(_) => ChangeType::Created,
            ChangeEvent::Updated { .. } => ChangeType::Updated,
            ChangeEvent::Dropped(_) => ChangeType::Dropped,
        }
    }

    /// The object before the change, if it existed.
    pub fn previous(&self) -> Option<&Arc<T>> {
        match self {
            ChangeEvent::Created(_) => None,
            ChangeEvent::Updated { old, .. } | ChangeEvent::Dropped(old) => Some(old),
        }
    }

    /// The object after the change, unless it was dropped.
    pub fn current(&self) -> Option<&Arc<T>> {
        match self {
            ChangeEvent::Created(new) | ChangeEvent::Updated { new, .. } => Some(new),
            ChangeEvent::Dropped(_) => None,
        }
    }

    // Whichever side of the change is available; both carry the same key.
    fn subject(&self) -> &Arc<T> {
        match self {
            ChangeEvent::Created(value)
            | ChangeEvent::Updated { new: value, .. }
            | ChangeEvent::Dropped(value) => value,
        }
    }
}

impl<T: SchemaObject> fmt::Display for ChangeEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            T::KIND,
            self.subject().qualified_name(),
            self.change_type()
        )
    }
}

/// A change to the schema, as delivered to listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaChangeEvent {
    Keyspace(ChangeEvent<KeyspaceMetadata>),
    Table(ChangeEvent<TableMetadata>),
    View(ChangeEvent<ViewMetadata>),
    Type(ChangeEvent<UserTypeMetadata>),
    Function(ChangeEvent<FunctionMetadata>),
    Aggregate(ChangeEvent<AggregateMetadata>),
}

impl SchemaChangeEvent {
    pub fn kind(&self) -> ObjectKind {
        match self {
            SchemaChangeEvent::Keyspace(_) => ObjectKind::Keyspace,
            SchemaChangeEvent::Table(_) => ObjectKind::Table,
            SchemaChangeEvent::View(_) => ObjectKind::View,
            SchemaChangeEvent::Type(_) => ObjectKind::Type,
            SchemaChangeEvent::Function(_) => ObjectKind::Function,
            SchemaChangeEvent::Aggregate(_) => ObjectKind::Aggregate,
        }
    }

    pub fn change_type(&self) -> ChangeType {
        match self {
            SchemaChangeEvent::Keyspace(event) => event.change_type(),
            SchemaChangeEvent::Table(event) => event.change_type(),
            SchemaChangeEvent::View(event) => event.change_type(),
            SchemaChangeEvent::Type(event) => event.change_type(),
            SchemaChangeEvent::Function(event) => event.change_type(),
            SchemaChangeEvent::Aggregate(event) => event.change_type(),
        }
    }
}

impl fmt::Display for SchemaChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaChangeEvent::Keyspace(event) => fmt::Display::fmt(event, f),
            SchemaChangeEvent::Table(event) => fmt::Display::fmt(event, f),
            SchemaChangeEvent::View(event) => fmt::Display::fmt(event, f),
            SchemaChangeEvent::Type(event) => fmt::Display::fmt(event, f),
            SchemaChangeEvent::Function(event) => fmt::Display::fmt(event, f),
            SchemaChangeEvent::Aggregate(event) => fmt::Display::fmt(event, f),
        }
    }
}
