use std::collections::BTreeMap;
use std::sync::Arc;

use crate::identifier::Identifier;
use crate::metadata::{
    AggregateMetadata, FunctionMetadata, FunctionSignature, TableMetadata, UserTypeMetadata,
    ViewMetadata,
};

/// A keyspace: its own attributes plus the five keyed collections of objects it contains.
///
/// Children are kept behind `Arc`s so that change events and subsequent snapshots can share
/// them. Collections are ordered by key; the order in which children were added is irrelevant.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyspaceMetadata {
    name: Identifier,
    durable_writes: bool,
    replication: BTreeMap<String, String>,
    tables: BTreeMap<Identifier, Arc<TableMetadata>>,
    views: BTreeMap<Identifier, Arc<ViewMetadata>>,
    user_types: BTreeMap<Identifier, Arc<UserTypeMetadata>>,
    functions: BTreeMap<FunctionSignature, Arc<FunctionMetadata>>,
    aggregates: BTreeMap<FunctionSignature, Arc<AggregateMetadata>>,
}

impl KeyspaceMetadata {
    pub fn builder(
        name: Identifier,
        durable_writes: bool,
        replication: BTreeMap<String, String>,
    ) -> KeyspaceMetadataBuilder {
        KeyspaceMetadataBuilder {
            name,
            durable_writes,
            replication,
            tables: BTreeMap::new(),
            views: BTreeMap::new(),
            user_types: BTreeMap::new(),
            functions: BTreeMap::new(),
            aggregates: BTreeMap::new(),
        }
    }

    /// Start a new keyspace value from this one, sharing all children.
    pub fn to_builder(&self) -> KeyspaceMetadataBuilder {
        KeyspaceMetadataBuilder {
            name: self.name.clone(),
            durable_writes: self.durable_writes,
            replication: self.replication.clone(),
            tables: self.tables.clone(),
            views: self.views.clone(),
            user_types: self.user_types.clone(),
            functions: self.functions.clone(),
            aggregates: self.aggregates.clone(),
        }
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn durable_writes(&self) -> bool {
        self.durable_writes
    }

    pub fn replication(&self) -> &BTreeMap<String, String> {
        &self.replication
    }

    pub fn tables(&self) -> &BTreeMap<Identifier, Arc<TableMetadata>> {
        &self.tables
    }

    pub fn views(&self) -> &BTreeMap<Identifier, Arc<ViewMetadata>> {
        &self.views
    }

    pub fn user_types(&self) -> &BTreeMap<Identifier, Arc<UserTypeMetadata>> {
        &self.user_types
    }

    pub fn functions(&self) -> &BTreeMap<FunctionSignature, Arc<FunctionMetadata>> {
        &self.functions
    }

    pub fn aggregates(&self) -> &BTreeMap<FunctionSignature, Arc<AggregateMetadata>> {
        &self.aggregates
    }

    pub fn table(&self, name: &Identifier) -> Option<&Arc<TableMetadata>> {
        self.tables.get(name)
    }

    pub fn view(&self, name: &Identifier) -> Option<&Arc<ViewMetadata>> {
        self.views.get(name)
    }

    pub fn user_type(&self, name: &Identifier) -> Option<&Arc<UserTypeMetadata>> {
        self.user_types.get(name)
    }

    /// Compare the keyspace's own attributes, ignoring its children.
    pub fn shallow_equals(&self, other: &KeyspaceMetadata) -> bool {
        self.name == other.name
            && self.durable_writes == other.durable_writes
            && self.replication == other.replication
    }
}

/// Mutable staging area for a [`KeyspaceMetadata`]; `build` freezes it.
#[derive(Clone, Debug)]
pub struct KeyspaceMetadataBuilder {
    name: Identifier,
    durable_writes: bool,
    replication: BTreeMap<String, String>,
    tables: BTreeMap<Identifier, Arc<TableMetadata>>,
    views: BTreeMap<Identifier, Arc<ViewMetadata>>,
    user_types: BTreeMap<Identifier, Arc<UserTypeMetadata>>,
    functions: BTreeMap<FunctionSignature, Arc<FunctionMetadata>>,
    aggregates: BTreeMap<FunctionSignature, Arc<AggregateMetadata>>,
}

// The `insert_*` methods return the child previously stored under the same key, if any.
impl KeyspaceMetadataBuilder {
    pub fn insert_table(&mut self, table: TableMetadata) -> Option<Arc<TableMetadata>> {
        self.tables.insert(table.name.clone(), Arc::new(table))
    }

    pub fn insert_view(&mut self, view: ViewMetadata) -> Option<Arc<ViewMetadata>> {
        self.views.insert(view.name.clone(), Arc::new(view))
    }

    pub fn insert_user_type(
        &mut self,
        user_type: UserTypeMetadata,
    ) -> Option<Arc<UserTypeMetadata>> {
        self.user_types
            .insert(user_type.name.clone(), Arc::new(user_type))
    }

    pub fn insert_function(
        &mut self,
        function: FunctionMetadata,
    ) -> Option<Arc<FunctionMetadata>> {
        self.functions
            .insert(function.signature.clone(), Arc::new(function))
    }

    pub fn insert_aggregate(
        &mut self,
        aggregate: AggregateMetadata,
    ) -> Option<Arc<AggregateMetadata>> {
        self.aggregates
            .insert(aggregate.signature.clone(), Arc::new(aggregate))
    }

    pub fn with_durable_writes(mut self, durable_writes: bool) -> Self {
        self.durable_writes = durable_writes;
        self
    }

    pub fn with_replication(mut self, replication: BTreeMap<String, String>) -> Self {
        self.replication = replication;
        self
    }

    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.insert_table(table);
        self
    }

    pub fn with_view(mut self, view: ViewMetadata) -> Self {
        self.insert_view(view);
        self
    }

    pub fn with_user_type(mut self, user_type: UserTypeMetadata) -> Self {
        self.insert_user_type(user_type);
        self
    }

    pub fn with_function(mut self, function: FunctionMetadata) -> Self {
        self.insert_function(function);
        self
    }

    pub fn with_aggregate(mut self, aggregate: AggregateMetadata) -> Self {
        self.insert_aggregate(aggregate);
        self
    }

    pub fn build(self) -> KeyspaceMetadata {
        KeyspaceMetadata {
            name: self.name,
            durable_writes: self.durable_writes,
            replication: self.replication,
            tables: self.tables,
            views: self.views,
            user_types: self.user_types,
            functions: self.functions,
            aggregates: self.aggregates,
        }
    }
}
