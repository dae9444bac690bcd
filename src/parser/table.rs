use std::collections::BTreeMap;
use std::str::FromStr;

use itertools::Itertools;
use strum_macros::EnumString;

use crate::identifier::Identifier;
use crate::metadata::{
    ClusteringOrder, ColumnMetadata, IndexKind, IndexMetadata, ObjectKind, TableMetadata,
    ViewMetadata,
};
use crate::parser::{
    ensure_unique, parse_type_cell, qualified, ParseError, ParseResult, RowContext, UNNAMED,
};
use crate::rows::{AdminRow, CellValue, RowError};

// Cells of a table/view row that aren't options
const TABLE_CELLS: &[&str] = &["keyspace_name", "table_name", "id", "flags"];
const VIEW_CELLS: &[&str] = &[
    "keyspace_name",
    "view_name",
    "base_table_name",
    "base_table_id",
    "include_all_columns",
    "where_clause",
    "id",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
enum ColumnKind {
    PartitionKey,
    Clustering,
    Regular,
    Static,
}

#[derive(Default)]
struct RelationColumns {
    partition_key: Vec<Identifier>,
    clustering_columns: Vec<(Identifier, ClusteringOrder)>,
    columns: BTreeMap<Identifier, ColumnMetadata>,
}

pub(super) fn parse_table(
    row: &AdminRow,
    keyspace: &Identifier,
    name: &Identifier,
    column_rows: &[AdminRow],
    index_rows: &[AdminRow],
) -> ParseResult<TableMetadata> {
    let table_name = qualified(keyspace, name);

    let id = row
        .optional_uuid("id")
        .context(ObjectKind::Table, &table_name)?;

    let compact_storage = if row.contains("flags") {
        let flags = row
            .text_list("flags")
            .context(ObjectKind::Table, &table_name)?;
        let has = |flag: &str| flags.iter().any(|f| f == flag);
        has("super") || has("dense") || !has("compound")
    } else {
        false
    };

    let RelationColumns {
        partition_key,
        clustering_columns,
        columns,
    } = parse_columns(keyspace, name, column_rows)?;

    let mut indexes = BTreeMap::new();
    for index_row in index_rows {
        let index = parse_index(index_row, keyspace, name)?;
        let index_name = qualified(keyspace, &index.name);
        ensure_unique(
            indexes.insert(index.name.clone(), index),
            ObjectKind::Index,
            index_name,
        )?;
    }

    Ok(TableMetadata {
        keyspace: keyspace.clone(),
        name: name.clone(),
        id,
        compact_storage,
        partition_key,
        clustering_columns,
        columns,
        indexes,
        options: collect_options(row, TABLE_CELLS),
    })
}

pub(super) fn parse_view(
    row: &AdminRow,
    keyspace: &Identifier,
    name: &Identifier,
    column_rows: &[AdminRow],
) -> ParseResult<ViewMetadata> {
    let view_name = qualified(keyspace, name);

    let base_table = row
        .identifier("base_table_name")
        .context(ObjectKind::View, &view_name)?;
    let include_all_columns = row
        .boolean("include_all_columns")
        .context(ObjectKind::View, &view_name)?;
    let where_clause = row
        .optional_text("where_clause")
        .context(ObjectKind::View, &view_name)?
        .map(str::to_string);
    let id = row
        .optional_uuid("id")
        .context(ObjectKind::View, &view_name)?;

    let RelationColumns {
        partition_key,
        clustering_columns,
        columns,
    } = parse_columns(keyspace, name, column_rows)?;

    Ok(ViewMetadata {
        keyspace: keyspace.clone(),
        name: name.clone(),
        base_table,
        include_all_columns,
        where_clause,
        id,
        partition_key,
        clustering_columns,
        columns,
        options: collect_options(row, VIEW_CELLS),
    })
}

fn parse_columns(
    keyspace: &Identifier,
    parent: &Identifier,
    rows: &[AdminRow],
) -> ParseResult<RelationColumns> {
    let mut relation = RelationColumns::default();
    let mut partition_key = vec![];
    let mut clustering_columns = vec![];

    for row in rows {
        let name = row
            .identifier("column_name")
            .context(ObjectKind::Column, qualified(keyspace, format!("{parent}.{UNNAMED}")))?;
        let column_name = qualified(keyspace, format!("{parent}.{name}"));

        let kind = row
            .text("kind")
            .context(ObjectKind::Column, &column_name)?;
        let kind = ColumnKind::from_str(kind).map_err(|_| ParseError::UnknownKind {
            kind: ObjectKind::Column,
            name: column_name.clone(),
            what: "column kind",
            value: kind.to_string(),
        })?;
        let position = row
            .int("position")
            .context(ObjectKind::Column, &column_name)?;
        let typ = row
            .text("type")
            .context(ObjectKind::Column, &column_name)?;
        let data_type = parse_type_cell(typ, keyspace, ObjectKind::Column, &column_name)?;

        match kind {
            ColumnKind::PartitionKey => partition_key.push((position, name.clone())),
            ColumnKind::Clustering => {
                let order = match row
                    .optional_text("clustering_order")
                    .context(ObjectKind::Column, &column_name)?
                {
                    None | Some("none") => ClusteringOrder::Asc,
                    Some(order) => {
                        ClusteringOrder::from_str(order).map_err(|_| ParseError::UnknownKind {
                            kind: ObjectKind::Column,
                            name: column_name.clone(),
                            what: "clustering order",
                            value: order.to_string(),
                        })?
                    }
                };
                clustering_columns.push((position, name.clone(), order));
            }
            ColumnKind::Regular | ColumnKind::Static => {}
        }

        let column = ColumnMetadata::new(
            keyspace.clone(),
            parent.clone(),
            name.clone(),
            data_type,
            kind == ColumnKind::Static,
        );
        ensure_unique(
            relation.columns.insert(name, column),
            ObjectKind::Column,
            column_name,
        )?;
    }

    relation.partition_key = partition_key
        .into_iter()
        .sorted_by_key(|(position, _)| *position)
        .map(|(_, name)| name)
        .collect();
    relation.clustering_columns = clustering_columns
        .into_iter()
        .sorted_by_key(|(position, _, _)| *position)
        .map(|(_, name, order)| (name, order))
        .collect();

    Ok(relation)
}

fn parse_index(
    row: &AdminRow,
    keyspace: &Identifier,
    table: &Identifier,
) -> ParseResult<IndexMetadata> {
    let name = row
        .identifier("index_name")
        .context(ObjectKind::Index, qualified(keyspace, UNNAMED))?;
    let index_name = qualified(keyspace, &name);

    let kind = row.text("kind").context(ObjectKind::Index, &index_name)?;
    let kind = IndexKind::from_str(kind).map_err(|_| ParseError::UnknownKind {
        kind: ObjectKind::Index,
        name: index_name.clone(),
        what: "index kind",
        value: kind.to_string(),
    })?;

    let options = row
        .text_map("options")
        .context(ObjectKind::Index, &index_name)?;
    let target = options
        .get("target")
        .cloned()
        .ok_or_else(|| RowError::MissingCell {
            column: "options.target".to_string(),
        })
        .context(ObjectKind::Index, &index_name)?;

    Ok(IndexMetadata {
        keyspace: keyspace.clone(),
        table: table.clone(),
        name,
        kind,
        target,
        options,
    })
}

fn collect_options(row: &AdminRow, structural: &[&str]) -> BTreeMap<String, CellValue> {
    row.cells()
        .filter(|(name, value)| !structural.contains(name) && **value != CellValue::Null)
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
