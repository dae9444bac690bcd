//! Raw schema rows, as returned by the cluster's administrative tables.
//!
//! Fetching the rows is up to the caller (see [`crate::manager::RowSource`]); this module only
//! models them and groups them by the object they describe.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifier::Identifier;
use crate::metadata::ObjectKind;
use crate::parser::{ParseError, ParseResult};

pub type PerKeyspace<T> = HashMap<Identifier, T>;
pub type PerParent<T> = HashMap<Identifier, T>;

/// A single typed cell of a schema row.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Uuid(Uuid),
    List(Vec<CellValue>),
    Map(BTreeMap<String, CellValue>),
}

// Doubles are compared bitwise, so that a NaN cell equals itself
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Double(a), CellValue::Double(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Uuid(a), CellValue::Uuid(b)) => a == b,
            (CellValue::List(a), CellValue::List(b)) => a == b,
            (CellValue::Map(a), CellValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl CellValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Boolean(_) => "boolean",
            CellValue::Int(_) => "int",
            CellValue::Double(_) => "double",
            CellValue::Text(_) => "text",
            CellValue::Uuid(_) => "uuid",
            CellValue::List(_) => "list",
            CellValue::Map(_) => "map",
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Double(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Uuid> for CellValue {
    fn from(value: Uuid) -> Self {
        CellValue::Uuid(value)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(values: Vec<T>) -> Self {
        CellValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CellValue {
    fn from(entries: [(&str, &str); N]) -> Self {
        CellValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), CellValue::from(v)))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for CellValue {
    fn from(entries: BTreeMap<String, String>) -> Self {
        CellValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, CellValue::Text(v)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("Missing required cell {column:?}")]
    MissingCell { column: String },

    #[error("Cell {column:?} has unexpected type: expected {expected}, found {found}")]
    UnexpectedType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type RowResult<T, E = RowError> = Result<T, E>;

/// One schema object as an ordered set of named cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminRow {
    cells: IndexMap<String, CellValue>,
}

impl AdminRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.cells.insert(column.to_string(), value.into());
        self
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The cell value, treating null cells the same as absent ones.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        match self.cells.get(column) {
            None | Some(CellValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    fn required(&self, column: &str) -> RowResult<&CellValue> {
        self.get(column).ok_or_else(|| RowError::MissingCell {
            column: column.to_string(),
        })
    }

    fn unexpected(column: &str, expected: &'static str, found: &CellValue) -> RowError {
        RowError::UnexpectedType {
            column: column.to_string(),
            expected,
            found: found.type_name(),
        }
    }

    pub fn text(&self, column: &str) -> RowResult<&str> {
        let value = self.required(column)?;
        value
            .as_text()
            .ok_or_else(|| Self::unexpected(column, "text", value))
    }

    pub fn optional_text(&self, column: &str) -> RowResult<Option<&str>> {
        match self.get(column) {
            None => Ok(None),
            Some(_) => self.text(column).map(Some),
        }
    }

    pub fn identifier(&self, column: &str) -> RowResult<Identifier> {
        self.text(column).map(Identifier::from_internal)
    }

    pub fn boolean(&self, column: &str) -> RowResult<bool> {
        match self.required(column)? {
            CellValue::Boolean(value) => Ok(*value),
            other => Err(Self::unexpected(column, "boolean", other)),
        }
    }

    pub fn int(&self, column: &str) -> RowResult<i64> {
        match self.required(column)? {
            CellValue::Int(value) => Ok(*value),
            other => Err(Self::unexpected(column, "int", other)),
        }
    }

    pub fn optional_uuid(&self, column: &str) -> RowResult<Option<Uuid>> {
        let value = match self.get(column) {
            None => return Ok(None),
            Some(value) => value,
        };

        match value {
            CellValue::Uuid(uuid) => Ok(Some(*uuid)),
            // JSON dumps can't tell a UUID from text
            CellValue::Text(text) => Uuid::parse_str(text)
                .map(Some)
                .map_err(|_| Self::unexpected(column, "uuid", value)),
            other => Err(Self::unexpected(column, "uuid", other)),
        }
    }

    pub fn text_list(&self, column: &str) -> RowResult<Vec<String>> {
        match self.required(column)? {
            CellValue::List(values) => values
                .iter()
                .map(|value| {
                    value
                        .as_text()
                        .map(str::to_string)
                        .ok_or_else(|| Self::unexpected(column, "list<text>", value))
                })
                .collect(),
            other => Err(Self::unexpected(column, "list<text>", other)),
        }
    }

    pub fn optional_text_list(&self, column: &str) -> RowResult<Vec<String>> {
        match self.get(column) {
            None => Ok(vec![]),
            Some(_) => self.text_list(column),
        }
    }

    pub fn text_map(&self, column: &str) -> RowResult<BTreeMap<String, String>> {
        match self.required(column)? {
            CellValue::Map(entries) => entries
                .iter()
                .map(|(key, value)| {
                    value
                        .as_text()
                        .map(|text| (key.clone(), text.to_string()))
                        .ok_or_else(|| Self::unexpected(column, "map<text, text>", value))
                })
                .collect(),
            other => Err(Self::unexpected(column, "map<text, text>", other)),
        }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for AdminRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Schema rows grouped by the kind of object they describe, and then by owning keyspace (and
/// owning table/view for columns and indexes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaRows {
    pub keyspaces: Vec<AdminRow>,
    pub tables: PerKeyspace<Vec<AdminRow>>,
    pub views: PerKeyspace<Vec<AdminRow>>,
    pub types: PerKeyspace<Vec<AdminRow>>,
    pub functions: PerKeyspace<Vec<AdminRow>>,
    pub aggregates: PerKeyspace<Vec<AdminRow>>,
    pub columns: PerKeyspace<PerParent<Vec<AdminRow>>>,
    pub indexes: PerKeyspace<PerParent<Vec<AdminRow>>>,
}

impl SchemaRows {
    pub fn builder() -> SchemaRowsBuilder {
        SchemaRowsBuilder::default()
    }
}

/// Flat, ungrouped schema rows, e.g. straight from the row source or from a JSON dump.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRowsBuilder {
    pub keyspaces: Vec<AdminRow>,
    pub tables: Vec<AdminRow>,
    pub views: Vec<AdminRow>,
    pub types: Vec<AdminRow>,
    pub functions: Vec<AdminRow>,
    pub aggregates: Vec<AdminRow>,
    pub columns: Vec<AdminRow>,
    pub indexes: Vec<AdminRow>,
}

impl SchemaRowsBuilder {
    pub fn with_keyspaces(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.keyspaces.extend(rows);
        self
    }

    pub fn with_tables(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.tables.extend(rows);
        self
    }

    pub fn with_views(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.views.extend(rows);
        self
    }

    pub fn with_types(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.types.extend(rows);
        self
    }

    pub fn with_functions(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.functions.extend(rows);
        self
    }

    pub fn with_aggregates(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.aggregates.extend(rows);
        self
    }

    pub fn with_columns(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.columns.extend(rows);
        self
    }

    pub fn with_indexes(mut self, rows: impl IntoIterator<Item = AdminRow>) -> Self {
        self.indexes.extend(rows);
        self
    }

    pub fn build(self) -> ParseResult<SchemaRows> {
        Ok(SchemaRows {
            keyspaces: self.keyspaces,
            tables: group_by_keyspace(self.tables, ObjectKind::Table)?,
            views: group_by_keyspace(self.views, ObjectKind::View)?,
            types: group_by_keyspace(self.types, ObjectKind::Type)?,
            functions: group_by_keyspace(self.functions, ObjectKind::Function)?,
            aggregates: group_by_keyspace(self.aggregates, ObjectKind::Aggregate)?,
            columns: group_by_parent(self.columns, ObjectKind::Column)?,
            indexes: group_by_parent(self.indexes, ObjectKind::Index)?,
        })
    }
}

fn group_by_keyspace(
    rows: Vec<AdminRow>,
    kind: ObjectKind,
) -> ParseResult<PerKeyspace<Vec<AdminRow>>> {
    let mut grouped: PerKeyspace<Vec<AdminRow>> = HashMap::new();
    for row in rows {
        let keyspace = row
            .identifier("keyspace_name")
            .map_err(|source| ParseError::UngroupableRow { kind, source })?;
        grouped.entry(keyspace).or_default().push(row);
    }
    Ok(grouped)
}

fn group_by_parent(
    rows: Vec<AdminRow>,
    kind: ObjectKind,
) -> ParseResult<PerKeyspace<PerParent<Vec<AdminRow>>>> {
    let mut grouped: PerKeyspace<PerParent<Vec<AdminRow>>> = HashMap::new();
    for row in rows {
        let (keyspace, parent) = row
            .identifier("keyspace_name")
            .and_then(|keyspace| Ok((keyspace, row.identifier("table_name")?)))
            .map_err(|source| ParseError::UngroupableRow { kind, source })?;
        grouped
            .entry(keyspace)
            .or_default()
            .entry(parent)
            .or_default()
            .push(row);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;
    use uuid::Uuid;

    use super::{AdminRow, CellValue, RowError, SchemaRows, SchemaRowsBuilder};
    use crate::identifier::Identifier;
    use crate::metadata::ObjectKind;
    use crate::parser::ParseError;

    fn row() -> AdminRow {
        AdminRow::new()
            .with("keyspace_name", "ks")
            .with("durable_writes", true)
            .with("position", 3)
            .with("comment", CellValue::Null)
            .with("field_names", vec!["street", "city"])
            .with("replication", [("class", "SimpleStrategy"), ("replication_factor", "1")])
    }

    #[rstest]
    #[case(CellValue::Double(f64::NAN), CellValue::Double(f64::NAN), true)]
    #[case(CellValue::Double(0.1), CellValue::Double(0.1), true)]
    #[case(CellValue::Double(0.1), CellValue::Double(0.2), false)]
    #[case(CellValue::Double(1.0), CellValue::Int(1), false)]
    #[case(
        CellValue::List(vec![CellValue::Double(f64::NAN)]),
        CellValue::List(vec![CellValue::Double(f64::NAN)]),
        true
    )]
    #[case(CellValue::Null, CellValue::Text(String::new()), false)]
    fn test_cell_equality(
        #[case] left: CellValue,
        #[case] right: CellValue,
        #[case] equal: bool,
    ) {
        assert_eq!(left == right, equal);
    }

    #[rstest]
    fn test_typed_accessors() {
        let row = row();
        assert_eq!(row.text("keyspace_name").unwrap(), "ks");
        assert_eq!(
            row.identifier("keyspace_name").unwrap(),
            Identifier::from_internal("ks")
        );
        assert!(row.boolean("durable_writes").unwrap());
        assert_eq!(row.int("position").unwrap(), 3);
        assert_eq!(row.text_list("field_names").unwrap(), vec!["street", "city"]);
        assert_eq!(
            row.text_map("replication").unwrap(),
            BTreeMap::from([
                ("class".to_string(), "SimpleStrategy".to_string()),
                ("replication_factor".to_string(), "1".to_string()),
            ])
        );
    }

    #[rstest]
    fn test_null_cells_count_as_missing() {
        let row = row();
        assert!(!row.contains("comment"));
        assert_eq!(row.optional_text("comment").unwrap(), None);
        assert_eq!(
            row.text("comment").unwrap_err(),
            RowError::MissingCell {
                column: "comment".to_string()
            }
        );
        assert_eq!(row.optional_text_list("flags").unwrap(), Vec::<String>::new());
    }

    #[rstest]
    fn test_unexpected_types() {
        let row = row();
        assert_eq!(
            row.boolean("keyspace_name").unwrap_err(),
            RowError::UnexpectedType {
                column: "keyspace_name".to_string(),
                expected: "boolean",
                found: "text",
            }
        );
        assert!(matches!(
            row.text_map("field_names"),
            Err(RowError::UnexpectedType { found: "list", .. })
        ));
        assert!(matches!(
            AdminRow::new().with("id", "not-a-uuid").optional_uuid("id"),
            Err(RowError::UnexpectedType { expected: "uuid", .. })
        ));
    }

    #[rstest]
    fn test_uuid_from_text_or_native() {
        let id = Uuid::from_u128(42);
        assert_eq!(
            AdminRow::new().with("id", id).optional_uuid("id").unwrap(),
            Some(id)
        );
        assert_eq!(
            AdminRow::new()
                .with("id", id.to_string())
                .optional_uuid("id")
                .unwrap(),
            Some(id)
        );
    }

    #[rstest]
    fn test_row_deserializes_from_json_in_order() {
        let row: AdminRow = serde_json::from_str(
            r#"{"keyspace_name": "ks", "durable_writes": false, "position": -1,
                "comment": null, "replication": {"class": "LocalStrategy"},
                "flags": ["compound"]}"#,
        )
        .unwrap();

        assert_eq!(
            row.cells().map(|(name, _)| name).collect::<Vec<_>>(),
            vec![
                "keyspace_name",
                "durable_writes",
                "position",
                "comment",
                "replication",
                "flags"
            ]
        );
        assert!(!row.boolean("durable_writes").unwrap());
        assert_eq!(row.int("position").unwrap(), -1);
        assert_eq!(row.text_list("flags").unwrap(), vec!["compound"]);
    }

    #[rstest]
    fn test_builder_groups_rows() {
        let rows = SchemaRows::builder()
            .with_keyspaces([AdminRow::new().with("keyspace_name", "ks")])
            .with_tables([
                AdminRow::new()
                    .with("keyspace_name", "ks")
                    .with("table_name", "t1"),
                AdminRow::new()
                    .with("keyspace_name", "ks")
                    .with("table_name", "t2"),
                AdminRow::new()
                    .with("keyspace_name", "other")
                    .with("table_name", "t1"),
            ])
            .with_columns([AdminRow::new()
                .with("keyspace_name", "ks")
                .with("table_name", "t1")
                .with("column_name", "pk")])
            .build()
            .unwrap();

        let ks = Identifier::from_internal("ks");
        assert_eq!(rows.keyspaces.len(), 1);
        assert_eq!(rows.tables[&ks].len(), 2);
        assert_eq!(rows.tables[&Identifier::from_internal("other")].len(), 1);
        assert_eq!(rows.columns[&ks][&Identifier::from_internal("t1")].len(), 1);
        assert!(rows.views.is_empty());
    }

    #[rstest]
    fn test_builder_rejects_rows_without_keyspace() {
        let error = SchemaRowsBuilder::default()
            .with_columns([AdminRow::new().with("keyspace_name", "ks")])
            .build()
            .unwrap_err();

        assert!(matches!(
            error,
            ParseError::UngroupableRow {
                kind: ObjectKind::Column,
                source: RowError::MissingCell { .. }
            }
        ));
    }
}
