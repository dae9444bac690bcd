//! Turns grouped schema rows into [`KeyspaceMetadata`] values.
//!
//! Parsing is all-or-nothing: a single malformed row fails the whole call, since a keyspace
//! missing some of its children would later be reconciled into bogus drop events.

use std::collections::HashSet;
use std::fmt::Display;

use tracing::debug;

use crate::config::schema::DEFAULT_LOG_PREFIX;
use crate::data_types::{parse_data_type, DataType, DataTypeError};
use crate::identifier::Identifier;
use crate::metadata::{KeyspaceMetadata, ObjectKind};
use crate::rows::{AdminRow, PerKeyspace, PerParent, RowError, RowResult, SchemaRows};

mod function;
mod table;
mod user_type;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid {kind} row for {name}: {source}")]
    InvalidRow {
        kind: ObjectKind,
        name: String,
        source: RowError,
    },

    #[error("Can't group {kind} row by its owner: {source}")]
    UngroupableRow { kind: ObjectKind, source: RowError },

    #[error("Invalid data type in {kind} {name}: {source}")]
    InvalidDataType {
        kind: ObjectKind,
        name: String,
        source: DataTypeError,
    },

    #[error("User type {name} has {names} field names but {types} field types")]
    MismatchedUserTypeFields {
        name: String,
        names: usize,
        types: usize,
    },

    #[error("Function {name} has {names} argument names but {types} argument types")]
    MismatchedFunctionArguments {
        name: String,
        names: usize,
        types: usize,
    },

    #[error("Duplicate {kind} {name}")]
    DuplicateObject { kind: ObjectKind, name: String },

    #[error("Unknown {what} {value:?} in {kind} {name}")]
    UnknownKind {
        kind: ObjectKind,
        name: String,
        what: &'static str,
        value: String,
    },
}

pub type ParseResult<T, E = ParseError> = Result<T, E>;

const UNNAMED: &str = "<unnamed>";

// Attach the object being parsed to a row accessor error
pub(crate) trait RowContext<T> {
    fn context(self, kind: ObjectKind, name: impl Display) -> ParseResult<T>;
}

impl<T> RowContext<T> for RowResult<T> {
    fn context(self, kind: ObjectKind, name: impl Display) -> ParseResult<T> {
        self.map_err(|source| ParseError::InvalidRow {
            kind,
            name: name.to_string(),
            source,
        })
    }
}

fn qualified(keyspace: &Identifier, name: impl Display) -> String {
    format!("{keyspace}.{name}")
}

fn parse_type_cell(
    typ: &str,
    keyspace: &Identifier,
    kind: ObjectKind,
    name: impl Display,
) -> ParseResult<DataType> {
    parse_data_type(typ, keyspace).map_err(|source| ParseError::InvalidDataType {
        kind,
        name: name.to_string(),
        source,
    })
}

fn ensure_unique<T>(replaced: Option<T>, kind: ObjectKind, name: String) -> ParseResult<()> {
    match replaced {
        Some(_) => Err(ParseError::DuplicateObject { kind, name }),
        None => Ok(()),
    }
}

fn rows_of<'r>(group: &'r PerKeyspace<Vec<AdminRow>>, keyspace: &Identifier) -> &'r [AdminRow] {
    group.get(keyspace).map(Vec::as_slice).unwrap_or_default()
}

fn children_of<'r>(
    group: Option<&'r PerParent<Vec<AdminRow>>>,
    parent: &Identifier,
) -> &'r [AdminRow] {
    group
        .and_then(|per_parent| per_parent.get(parent))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub struct SchemaParser<'a> {
    rows: &'a SchemaRows,
    keyspace_filter: HashSet<Identifier>,
    log_prefix: &'a str,
}

impl<'a> SchemaParser<'a> {
    pub fn new(rows: &'a SchemaRows) -> Self {
        Self {
            rows,
            keyspace_filter: HashSet::new(),
            log_prefix: DEFAULT_LOG_PREFIX,
        }
    }

    pub fn with_log_prefix(mut self, log_prefix: &'a str) -> Self {
        self.log_prefix = log_prefix;
        self
    }

    /// Only parse the named keyspaces; an empty filter keeps all of them.
    pub fn with_keyspace_filter(
        mut self,
        keyspaces: impl IntoIterator<Item = Identifier>,
    ) -> Self {
        self.keyspace_filter = keyspaces.into_iter().collect();
        self
    }

    fn is_refreshed(&self, keyspace: &Identifier) -> bool {
        self.keyspace_filter.is_empty() || self.keyspace_filter.contains(keyspace)
    }

    /// Parse every keyspace row, along with all of its children.
    pub fn parse_full_schema(&self) -> ParseResult<Vec<KeyspaceMetadata>> {
        let mut seen = HashSet::new();
        let mut keyspaces = Vec::with_capacity(self.rows.keyspaces.len());

        for row in &self.rows.keyspaces {
            let name = row
                .identifier("keyspace_name")
                .context(ObjectKind::Keyspace, UNNAMED)?;
            if !self.is_refreshed(&name) {
                debug!(
                    "[{}] Skipping keyspace {name}, not in the refreshed keyspaces",
                    self.log_prefix
                );
                continue;
            }
            if !seen.insert(name.clone()) {
                return Err(ParseError::DuplicateObject {
                    kind: ObjectKind::Keyspace,
                    name: name.to_string(),
                });
            }

            keyspaces.push(self.parse_keyspace(row)?);
        }

        Ok(keyspaces)
    }

    pub fn parse_keyspace(&self, row: &AdminRow) -> ParseResult<KeyspaceMetadata> {
        let name = row
            .identifier("keyspace_name")
            .context(ObjectKind::Keyspace, UNNAMED)?;
        let durable_writes = row
            .boolean("durable_writes")
            .context(ObjectKind::Keyspace, &name)?;
        let replication = row
            .text_map("replication")
            .context(ObjectKind::Keyspace, &name)?;

        let mut builder = KeyspaceMetadata::builder(name.clone(), durable_writes, replication);

        let columns = self.rows.columns.get(&name);
        let indexes = self.rows.indexes.get(&name);

        for row in rows_of(&self.rows.tables, &name) {
            let table_name = row
                .identifier("table_name")
                .context(ObjectKind::Table, qualified(&name, UNNAMED))?;
            let table = table::parse_table(
                row,
                &name,
                &table_name,
                children_of(columns, &table_name),
                children_of(indexes, &table_name),
            )?;
            ensure_unique(
                builder.insert_table(table),
                ObjectKind::Table,
                qualified(&name, &table_name),
            )?;
        }

        for row in rows_of(&self.rows.views, &name) {
            let view_name = row
                .identifier("view_name")
                .context(ObjectKind::View, qualified(&name, UNNAMED))?;
            let view =
                table::parse_view(row, &name, &view_name, children_of(columns, &view_name))?;
            ensure_unique(
                builder.insert_view(view),
                ObjectKind::View,
                qualified(&name, &view_name),
            )?;
        }

        for row in rows_of(&self.rows.types, &name) {
            let user_type = user_type::parse_user_type(row, &name)?;
            let type_name = qualified(&name, &user_type.name);
            ensure_unique(
                builder.insert_user_type(user_type),
                ObjectKind::Type,
                type_name,
            )?;
        }

        for row in rows_of(&self.rows.functions, &name) {
            let function = function::parse_function(row, &name)?;
            let signature = qualified(&name, &function.signature);
            ensure_unique(
                builder.insert_function(function),
                ObjectKind::Function,
                signature,
            )?;
        }

        for row in rows_of(&self.rows.aggregates, &name) {
            let aggregate = function::parse_aggregate(row, &name)?;
            let signature = qualified(&name, &aggregate.signature);
            ensure_unique(
                builder.insert_aggregate(aggregate),
                ObjectKind::Aggregate,
                signature,
            )?;
        }

        let keyspace = builder.build();
        debug!(
            "[{}] Parsed keyspace {name}: {} tables, {} views, {} types, {} functions, {} aggregates",
            self.log_prefix,
            keyspace.tables().len(),
            keyspace.views().len(),
            keyspace.user_types().len(),
            keyspace.functions().len(),
            keyspace.aggregates().len(),
        );
        Ok(keyspace)
    }
}
