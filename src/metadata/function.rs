use std::fmt;

use itertools::Itertools;

use crate::data_types::DataType;
use crate::identifier::Identifier;

/// Identity of a function or aggregate: functions can be overloaded, so the name alone isn't
/// enough.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionSignature {
    pub name: Identifier,
    pub parameter_types: Vec<DataType>,
}

impl FunctionSignature {
    pub fn new(name: Identifier, parameter_types: Vec<DataType>) -> Self {
        Self {
            name,
            parameter_types,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.name.as_cql(true),
            self.parameter_types.iter().join(", ")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionMetadata {
    pub keyspace: Identifier,
    pub signature: FunctionSignature,
    pub parameter_names: Vec<Identifier>,
    pub body: String,
    pub called_on_null_input: bool,
    pub language: String,
    pub return_type: DataType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateMetadata {
    pub keyspace: Identifier,
    pub signature: FunctionSignature,
    // Takes the state type followed by the aggregate's arguments
    pub state_func_signature: FunctionSignature,
    // Takes the state type only
    pub final_func_signature: Option<FunctionSignature>,
    pub initial_condition: Option<String>,
    pub return_type: DataType,
    pub state_type: DataType,
}
