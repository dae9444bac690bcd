use crate::identifier::Identifier;
use crate::metadata::{AggregateMetadata, FunctionMetadata, FunctionSignature, ObjectKind};
use crate::parser::{parse_type_cell, qualified, ParseError, ParseResult, RowContext, UNNAMED};
use crate::rows::AdminRow;

fn parse_signature(
    row: &AdminRow,
    keyspace: &Identifier,
    kind: ObjectKind,
    name_column: &str,
) -> ParseResult<FunctionSignature> {
    let name = row
        .identifier(name_column)
        .context(kind, qualified(keyspace, UNNAMED))?;
    // Functions without parameters come with null argument lists
    let argument_types = row
        .optional_text_list("argument_types")
        .context(kind, qualified(keyspace, &name))?
        .iter()
        .map(|typ| parse_type_cell(typ, keyspace, kind, qualified(keyspace, &name)))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(FunctionSignature::new(name, argument_types))
}

pub(super) fn parse_function(
    row: &AdminRow,
    keyspace: &Identifier,
) -> ParseResult<FunctionMetadata> {
    let signature = parse_signature(row, keyspace, ObjectKind::Function, "function_name")?;
    let function_name = qualified(keyspace, &signature);

    let parameter_names = row
        .optional_text_list("argument_names")
        .context(ObjectKind::Function, &function_name)?;
    if parameter_names.len() != signature.parameter_types.len() {
        return Err(ParseError::MismatchedFunctionArguments {
            name: function_name,
            names: parameter_names.len(),
            types: signature.parameter_types.len(),
        });
    }

    let body = row
        .text("body")
        .context(ObjectKind::Function, &function_name)?;
    let called_on_null_input = row
        .boolean("called_on_null_input")
        .context(ObjectKind::Function, &function_name)?;
    let language = row
        .text("language")
        .context(ObjectKind::Function, &function_name)?;
    let return_type = row
        .text("return_type")
        .context(ObjectKind::Function, &function_name)?;
    let return_type =
        parse_type_cell(return_type, keyspace, ObjectKind::Function, &function_name)?;

    Ok(FunctionMetadata {
        keyspace: keyspace.clone(),
        signature,
        parameter_names: parameter_names
            .into_iter()
            .map(Identifier::from_internal)
            .collect(),
        body: body.to_string(),
        called_on_null_input,
        language: language.to_string(),
        return_type,
    })
}

pub(super) fn parse_aggregate(
    row: &AdminRow,
    keyspace: &Identifier,
) -> ParseResult<AggregateMetadata> {
    let signature = parse_signature(row, keyspace, ObjectKind::Aggregate, "aggregate_name")?;
    let aggregate_name = qualified(keyspace, &signature);

    let state_type = row
        .text("state_type")
        .context(ObjectKind::Aggregate, &aggregate_name)?;
    let state_type =
        parse_type_cell(state_type, keyspace, ObjectKind::Aggregate, &aggregate_name)?;
    let return_type = row
        .text("return_type")
        .context(ObjectKind::Aggregate, &aggregate_name)?;
    let return_type =
        parse_type_cell(return_type, keyspace, ObjectKind::Aggregate, &aggregate_name)?;

    let state_func = row
        .identifier("state_func")
        .context(ObjectKind::Aggregate, &aggregate_name)?;
    let state_func_signature = FunctionSignature::new(
        state_func,
        std::iter::once(state_type.clone())
            .chain(signature.parameter_types.iter().cloned())
            .collect(),
    );

    let final_func_signature = row
        .optional_text("final_func")
        .context(ObjectKind::Aggregate, &aggregate_name)?
        .map(|final_func| {
            FunctionSignature::new(
                Identifier::from_internal(final_func),
                vec![state_type.clone()],
            )
        });
    let initial_condition = row
        .optional_text("initcond")
        .context(ObjectKind::Aggregate, &aggregate_name)?
        .map(str::to_string);

    Ok(AggregateMetadata {
        keyspace: keyspace.clone(),
        signature,
        state_func_signature,
        final_func_signature,
        initial_condition,
        return_type,
        state_type,
    })
}
