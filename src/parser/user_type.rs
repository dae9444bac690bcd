use crate::identifier::Identifier;
use crate::metadata::{ObjectKind, UserTypeMetadata};
use crate::parser::{parse_type_cell, qualified, ParseError, ParseResult, RowContext, UNNAMED};
use crate::rows::AdminRow;

pub(super) fn parse_user_type(
    row: &AdminRow,
    keyspace: &Identifier,
) -> ParseResult<UserTypeMetadata> {
    let name = row
        .identifier("type_name")
        .context(ObjectKind::Type, qualified(keyspace, UNNAMED))?;
    let type_name = qualified(keyspace, &name);

    let field_names = row
        .text_list("field_names")
        .context(ObjectKind::Type, &type_name)?;
    let field_types = row
        .text_list("field_types")
        .context(ObjectKind::Type, &type_name)?;

    if field_names.len() != field_types.len() {
        return Err(ParseError::MismatchedUserTypeFields {
            name: type_name,
            names: field_names.len(),
            types: field_types.len(),
        });
    }

    let field_types = field_types
        .iter()
        .map(|typ| parse_type_cell(typ, keyspace, ObjectKind::Type, &type_name))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(UserTypeMetadata {
        keyspace: keyspace.clone(),
        name,
        field_names: field_names
            .into_iter()
            .map(Identifier::from_internal)
            .collect(),
        field_types,
    })
}
