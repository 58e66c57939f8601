//! Parsing of compact signature tokens into structured descriptors.

use crate::error::{Error, Result};
use crate::schema::FunctionEntry;
use crate::types::{TypeExpr, TypeParser};

use super::def::{Parameter, ReturnType};

/// Parse one `[name-token, type-token]` pair into a [`Parameter`].
///
/// Modifier markers are stripped in fixed order: reference prefix `&`, then
/// optional suffix `=`, then variadic prefix `...`. A token may carry any
/// combination of the three.
fn parse_parameter(name_token: &str, type_token: &str, types: &TypeParser) -> Result<Parameter> {
    let mut name = name_token;
    let mut by_ref = false;
    let mut optional = false;
    let mut variadic = false;

    if let Some(rest) = name.strip_prefix('&') {
        name = rest;
        by_ref = true;
    }
    if let Some(rest) = name.strip_suffix('=') {
        name = rest;
        optional = true;
    }
    if let Some(rest) = name.strip_prefix("...") {
        name = rest;
        variadic = true;
    }

    if name.is_empty() {
        return Err(Error::MalformedParameter(name_token.to_string()));
    }

    let ty = if type_token.is_empty() {
        TypeExpr::Mixed
    } else {
        types.parse(type_token)?
    };

    Ok(Parameter {
        name: name.to_string(),
        by_ref,
        optional,
        variadic,
        ty,
    })
}

/// Resolve the return type from an entry's base variant.
pub(crate) fn return_type(entry: &FunctionEntry, types: &TypeParser) -> Result<ReturnType> {
    let token = &entry.base().return_type;
    if token.is_empty() {
        return Ok(ReturnType::mixed());
    }
    let ty = types.parse(token)?;
    let from_docs = ty.is_nullable();
    Ok(ReturnType { ty, from_docs })
}

/// Parse every overload variant of an entry into an ordered parameter list.
pub(crate) fn parameter_overloads(
    entry: &FunctionEntry,
    types: &TypeParser,
) -> Result<Vec<Vec<Parameter>>> {
    entry
        .variants()
        .iter()
        .map(|variant| {
            variant
                .params
                .iter()
                .map(|(name, ty)| parse_parameter(name, ty, types))
                .collect()
        })
        .collect()
}
