use std::collections::BTreeMap;

use uuid::Uuid;

use crate::identifier::Identifier;
use crate::metadata::{ClusteringOrder, ColumnMetadata};
use crate::rows::CellValue;

/// A materialized view over one of the keyspace's tables.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewMetadata {
    pub keyspace: Identifier,
    pub name: Identifier,
    pub base_table: Identifier,
    pub include_all_columns: bool,
    pub where_clause: Option<String>,
    pub id: Option<Uuid>,
    pub partition_key: Vec<Identifier>,
    pub clustering_columns: Vec<(Identifier, ClusteringOrder)>,
    pub columns: BTreeMap<Identifier, ColumnMetadata>,
    pub options: BTreeMap<String, CellValue>,
}

impl ViewMetadata {
    pub fn column(&self, name: &Identifier) -> Option<&ColumnMetadata> {
        self.columns.get(name)
    }
}
