use std::sync::Arc;

use assert_unordered::assert_eq_unordered_sort;
use rstest::rstest;
use schema_refresh::metadata::SchemaSnapshot;
use schema_refresh::refresh::{SchemaChangeEvent, SchemaRefresh};

use crate::{fixtures, id, initial_snapshot, parse_dump};

mod scenario;

fn summary(events: &[SchemaChangeEvent]) -> Vec<String> {
    events.iter().map(ToString::to_string).collect()
}

#[rstest]
fn test_freshly_parsed_copy_yields_no_events(initial_snapshot: SchemaSnapshot) {
    let result =
        SchemaRefresh::Full(parse_dump(fixtures::INITIAL_SCHEMA)).compute(&initial_snapshot);

    assert!(result.events().is_empty());
    assert_eq!(result.snapshot(), &initial_snapshot);
}

#[rstest]
fn test_row_order_and_replication_order_are_irrelevant(initial_snapshot: SchemaSnapshot) {
    let result = SchemaRefresh::Full(parse_dump(fixtures::INITIAL_SCHEMA_REORDERED))
        .compute(&initial_snapshot);

    assert_eq!(summary(result.events()), Vec::<String>::new());
}

#[rstest]
fn test_full_refresh(initial_snapshot: SchemaSnapshot) {
    let result =
        SchemaRefresh::Full(parse_dump(fixtures::UPDATED_SCHEMA)).compute(&initial_snapshot);

    assert_eq_unordered_sort!(
        summary(result.events()),
        vec![
            "keyspace analytics created".to_string(),
            "keyspace ks1 updated".to_string(),
            "table ks1.t2 dropped".to_string(),
            "table ks1.t3 created".to_string(),
            "table shop.orders updated".to_string(),
            "view shop.orders_by_customer dropped".to_string(),
            "aggregate shop.total(int) dropped".to_string(),
        ]
    );

    let snapshot = result.snapshot();
    let orders = snapshot
        .keyspace(&id("shop"))
        .and_then(|shop| shop.table(&id("orders")))
        .unwrap();
    assert_eq!(orders.columns.len(), 5);
    assert_eq!(orders.indexes.len(), 1);
}

#[rstest]
fn test_per_keyspace_event_order(initial_snapshot: SchemaSnapshot) {
    let result =
        SchemaRefresh::Full(parse_dump(fixtures::UPDATED_SCHEMA)).compute(&initial_snapshot);

    let shop_events: Vec<_> = summary(result.events())
        .into_iter()
        .filter(|event| event.contains(" shop."))
        .collect();
    assert_eq!(
        shop_events,
        vec![
            "table shop.orders updated",
            "view shop.orders_by_customer dropped",
            "aggregate shop.total(int) dropped",
        ]
    );
}

#[rstest]
fn test_targeted_refresh_and_drop(initial_snapshot: SchemaSnapshot) {
    let updated = parse_dump(fixtures::UPDATED_SCHEMA)
        .into_iter()
        .filter(|keyspace| keyspace.name() == &id("ks1"))
        .collect();

    let result = SchemaRefresh::Keyspaces(updated).compute(&initial_snapshot);
    assert_eq!(
        summary(result.events()),
        vec![
            "keyspace ks1 updated",
            "table ks1.t2 dropped",
            "table ks1.t3 created"
        ]
    );
    assert!(Arc::ptr_eq(
        result.snapshot().keyspace(&id("shop")).unwrap(),
        initial_snapshot.keyspace(&id("shop")).unwrap()
    ));

    let result = SchemaRefresh::DropKeyspace(id("shop")).compute(result.snapshot());
    assert_eq!(summary(result.events()), vec!["keyspace shop dropped"]);
    assert_eq!(result.snapshot().len(), 1);
}
