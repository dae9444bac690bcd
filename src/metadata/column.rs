use crate::data_types::DataType;
use crate::identifier::Identifier;

/// A column of a table or view.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnMetadata {
    keyspace: Identifier,
    parent: Identifier,
    name: Identifier,
    data_type: DataType,
    is_static: bool,
}

impl ColumnMetadata {
    pub fn new(
        keyspace: Identifier,
        parent: Identifier,
        name: Identifier,
        data_type: DataType,
        is_static: bool,
    ) -> Self {
        Self {
            keyspace,
            parent,
            name,
            data_type,
            is_static,
        }
    }

    pub fn keyspace(&self) -> &Identifier {
        &self.keyspace
    }

    /// The table or view declaring this column.
    pub fn parent(&self) -> &Identifier {
        &self.parent
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}
