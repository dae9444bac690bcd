use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::subscriber::DefaultGuard;

use crate::data_types::{DataType, NativeType};
use crate::identifier::Identifier;
use crate::metadata::{
    AggregateMetadata, ColumnMetadata, FunctionMetadata, FunctionSignature, KeyspaceMetadata,
    KeyspaceMetadataBuilder, TableMetadata, UserTypeMetadata, ViewMetadata,
};
use crate::rows::CellValue;

pub fn id(name: &str) -> Identifier {
    Identifier::from_internal(name)
}

pub fn simple_replication(factor: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("class".to_string(), "SimpleStrategy".to_string()),
        ("replication_factor".to_string(), factor.to_string()),
    ])
}

pub fn keyspace(name: &str) -> KeyspaceMetadataBuilder {
    KeyspaceMetadata::builder(id(name), true, simple_replication("1"))
}

/// A table with a single `pk int` partition key column.
pub fn table(keyspace: &str, name: &str) -> TableMetadata {
    TableMetadata {
        keyspace: id(keyspace),
        name: id(name),
        id: None,
        compact_storage: false,
        partition_key: vec![id("pk")],
        clustering_columns: vec![],
        columns: BTreeMap::from([(
            id("pk"),
            ColumnMetadata::new(
                id(keyspace),
                id(name),
                id("pk"),
                DataType::Native(NativeType::Int),
                false,
            ),
        )]),
        indexes: BTreeMap::new(),
        options: BTreeMap::new(),
    }
}

pub fn table_with_comment(keyspace: &str, name: &str, comment: &str) -> TableMetadata {
    let mut table = table(keyspace, name);
    table
        .options
        .insert("comment".to_string(), CellValue::from(comment));
    table
}

pub fn view(keyspace: &str, name: &str, base_table: &str) -> ViewMetadata {
    let base = table(keyspace, base_table);
    ViewMetadata {
        keyspace: id(keyspace),
        name: id(name),
        base_table: id(base_table),
        include_all_columns: true,
        where_clause: Some("pk IS NOT NULL".to_string()),
        id: None,
        partition_key: base.partition_key,
        clustering_columns: vec![],
        columns: base.columns,
        options: BTreeMap::new(),
    }
}

pub fn user_type(keyspace: &str, name: &str, fields: &[(&str, NativeType)]) -> UserTypeMetadata {
    UserTypeMetadata {
        keyspace: id(keyspace),
        name: id(name),
        field_names: fields.iter().map(|(field, _)| id(field)).collect(),
        field_types: fields
            .iter()
            .map(|(_, typ)| DataType::Native(*typ))
            .collect(),
    }
}

pub fn function(keyspace: &str, name: &str, body: &str) -> FunctionMetadata {
    FunctionMetadata {
        keyspace: id(keyspace),
        signature: FunctionSignature::new(id(name), vec![DataType::Native(NativeType::Int)]),
        parameter_names: vec![id("x")],
        body: body.to_string(),
        called_on_null_input: false,
        language: "java".to_string(),
        return_type: DataType::Native(NativeType::Int),
    }
}

pub fn aggregate(keyspace: &str, name: &str, state_func: &str) -> AggregateMetadata {
    let int = DataType::Native(NativeType::Int);
    AggregateMetadata {
        keyspace: id(keyspace),
        signature: FunctionSignature::new(id(name), vec![int.clone()]),
        state_func_signature: FunctionSignature::new(id(state_func), vec![int.clone(), int.clone()]),
        final_func_signature: None,
        initial_condition: Some("0".to_string()),
        return_type: int.clone(),
        state_type: int,
    }
}

/// Records the formatted log lines of the current thread until dropped.
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    pub fn start() -> Self {
        let buffer = Arc::new(Mutex::new(vec![]));
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || CapturedWriter(writer.clone()))
            .finish();

        Self {
            buffer,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}
