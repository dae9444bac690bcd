//! The immutable schema model: keyspaces and everything they contain.
//!
//! Every type here is a plain value with structural equality. Schema changes never mutate a
//! value in place; a refresh builds new values and the snapshot holding them is swapped.

use strum_macros::{AsRefStr, Display, EnumString};

mod column;
mod function;
mod keyspace;
mod snapshot;
mod table;
mod user_type;
mod view;

pub use column::ColumnMetadata;
pub use function::{AggregateMetadata, FunctionMetadata, FunctionSignature};
pub use keyspace::{KeyspaceMetadata, KeyspaceMetadataBuilder};
pub use snapshot::SchemaSnapshot;
pub use table::{ClusteringOrder, IndexKind, IndexMetadata, TableMetadata};
pub use user_type::UserTypeMetadata;
pub use view::ViewMetadata;

/// The kinds of schema objects, as named in logs, errors and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    Keyspace,
    Table,
    View,
    Type,
    Function,
    Aggregate,
    Column,
    Index,
}
