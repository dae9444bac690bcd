use std::sync::Arc;

use rstest::rstest;
use schema_refresh::metadata::{KeyspaceMetadata, TableMetadata};
use schema_refresh::parser::SchemaParser;
use schema_refresh::refresh::{compute_keyspace_events, ChangeEvent, SchemaChangeEvent};
use schema_refresh::rows::{AdminRow, SchemaRows};

use crate::id;

fn keyspace_rows(durable_writes: bool, tables: &[&str]) -> SchemaRows {
    SchemaRows::builder()
        .with_keyspaces([AdminRow::new()
            .with("keyspace_name", "ks1")
            .with("durable_writes", durable_writes)
            .with("replication", [("class", "SimpleStrategy"), ("replication_factor", "1")])])
        .with_tables(tables.iter().map(|table| {
            AdminRow::new()
                .with("keyspace_name", "ks1")
                .with("table_name", *table)
                .with("flags", vec!["compound"])
        }))
        .with_columns(tables.iter().map(|table| {
            AdminRow::new()
                .with("keyspace_name", "ks1")
                .with("table_name", *table)
                .with("column_name", "pk")
                .with("kind", "partition_key")
                .with("position", 0)
                .with("type", "int")
        }))
        .build()
        .unwrap()
}

fn parse(rows: &SchemaRows) -> Arc<KeyspaceMetadata> {
    Arc::new(SchemaParser::new(rows).parse_keyspace(&rows.keyspaces[0]).unwrap())
}

fn table<'a>(keyspace: &'a KeyspaceMetadata, name: &str) -> &'a Arc<TableMetadata> {
    keyspace.table(&id(name)).unwrap()
}

#[rstest]
fn test_durable_writes_flip_with_table_swap() {
    let old = parse(&keyspace_rows(true, &["t1", "t2"]));
    let new = parse(&keyspace_rows(false, &["t1", "t3"]));

    let mut events = vec![];
    compute_keyspace_events(Some(&old), &new, &mut events);

    assert_eq!(
        events,
        vec![
            SchemaChangeEvent::Keyspace(ChangeEvent::Updated {
                old: old.clone(),
                new: new.clone()
            }),
            SchemaChangeEvent::Table(ChangeEvent::Dropped(table(&old, "t2").clone())),
            SchemaChangeEvent::Table(ChangeEvent::Created(table(&new, "t3").clone())),
        ]
    );
}

#[rstest]
fn test_new_keyspace_with_tables() {
    let new = parse(&keyspace_rows(true, &["t1", "t2", "t3"]));

    let mut events = vec![];
    compute_keyspace_events(None, &new, &mut events);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].to_string(), "keyspace ks1 created");
}

#[rstest]
fn test_renamed_table_only() {
    let old = parse(&keyspace_rows(true, &["t1"]));
    let new = parse(&keyspace_rows(true, &["t1_renamed"]));

    let mut events = vec![];
    compute_keyspace_events(Some(&old), &new, &mut events);

    assert_eq!(
        events.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["table ks1.t1 dropped", "table ks1.t1_renamed created"]
    );
}
