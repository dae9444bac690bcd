use crate::data_types::DataType;
use crate::identifier::Identifier;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserTypeMetadata {
    pub keyspace: Identifier,
    pub name: Identifier,
    pub field_names: Vec<Identifier>,
    pub field_types: Vec<DataType>,
}

impl UserTypeMetadata {
    pub fn fields(&self) -> impl Iterator<Item = (&Identifier, &DataType)> {
        self.field_names.iter().zip(self.field_types.iter())
    }

    pub fn field_type(&self, name: &Identifier) -> Option<&DataType> {
        self.fields()
            .find(|(field, _)| *field == name)
            .map(|(_, data_type)| data_type)
    }
}
