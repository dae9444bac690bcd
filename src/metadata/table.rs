use std::collections::BTreeMap;

use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::identifier::Identifier;
use crate::metadata::ColumnMetadata;
use crate::rows::CellValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ClusteringOrder {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum IndexKind {
    Keys,
    Custom,
    Composites,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexMetadata {
    pub keyspace: Identifier,
    pub table: Identifier,
    pub name: Identifier,
    pub kind: IndexKind,
    pub target: String,
    pub options: BTreeMap<String, String>,
}

impl IndexMetadata {
    /// Class name of a custom index implementation
    pub fn class_name(&self) -> Option<&str> {
        self.options.get("class_name").map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableMetadata {
    pub keyspace: Identifier,
    pub name: Identifier,
    pub id: Option<Uuid>,
    pub compact_storage: bool,
    pub partition_key: Vec<Identifier>,
    pub clustering_columns: Vec<(Identifier, ClusteringOrder)>,
    pub columns: BTreeMap<Identifier, ColumnMetadata>,
    pub indexes: BTreeMap<Identifier, IndexMetadata>,
    // All the table's option cells (comment, compaction, caching...), by column name
    pub options: BTreeMap<String, CellValue>,
}

impl TableMetadata {
    pub fn column(&self, name: &Identifier) -> Option<&ColumnMetadata> {
        self.columns.get(name)
    }

    /// Partition key columns followed by clustering columns.
    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.partition_key
            .iter()
            .chain(self.clustering_columns.iter().map(|(name, _)| name))
            .filter_map(|name| self.columns.get(name))
    }
}
