//! Parsing of compact type tokens into [`TypeExpr`].
//!
//! The grammar is small: unions split on `|`, a `?` prefix marks nullability,
//! and `<...>` carries generic arguments for `array`, `iterable`, `list`, and
//! named types. Everything is hand-parsed; no token in the static tables needs
//! more than one pass.

use dashmap::DashMap;

use super::expr::TypeExpr;

/// Error produced when a type token does not conform to the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeParseError {
    #[error("empty type token")]
    Empty,

    #[error("unbalanced angle brackets in `{0}`")]
    UnbalancedBrackets(String),

    #[error("malformed type token `{0}`")]
    Malformed(String),

    #[error("too many type arguments for `{name}` in `{token}`")]
    TooManyArgs { name: String, token: String },
}

/// Parse a type token into a structured expression.
///
/// The empty token is an error here: database paths translate empty tokens to
/// the mixed sentinel before ever reaching the parser, so an empty token at
/// this level is a data defect.
pub fn parse_type(token: &str) -> Result<TypeExpr, TypeParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TypeParseError::Empty);
    }
    parse_union(token)
}

fn parse_union(s: &str) -> Result<TypeExpr, TypeParseError> {
    let parts = split_top_level(s, '|')?;
    if parts.len() == 1 {
        return parse_atom(parts[0]);
    }
    let members = parts
        .into_iter()
        .map(parse_atom)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TypeExpr::Union(members))
}

fn parse_atom(s: &str) -> Result<TypeExpr, TypeParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TypeParseError::Malformed(s.to_string()));
    }

    if let Some(rest) = s.strip_prefix('?') {
        return Ok(TypeExpr::nullable(parse_atom(rest)?));
    }

    if let Some(open) = s.find('<') {
        if !s.ends_with('>') {
            return Err(TypeParseError::UnbalancedBrackets(s.to_string()));
        }
        let name = &s[..open];
        let inner = &s[open + 1..s.len() - 1];
        if name.is_empty() || inner.trim().is_empty() {
            return Err(TypeParseError::Malformed(s.to_string()));
        }
        let args = split_top_level(inner, ',')?
            .iter()
            .map(|arg| parse_union(arg.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        return match name {
            "array" if args.len() <= 2 => Ok(TypeExpr::Array(args)),
            "list" if args.len() <= 1 => Ok(TypeExpr::Array(args)),
            "iterable" if args.len() <= 2 => Ok(TypeExpr::Iterable(args)),
            "array" | "list" | "iterable" => Err(TypeParseError::TooManyArgs {
                name: name.to_string(),
                token: s.to_string(),
            }),
            _ => Ok(TypeExpr::Named {
                name: name.to_string(),
                args,
            }),
        };
    }

    Ok(match s {
        "mixed" => TypeExpr::Mixed,
        "bool" | "boolean" => TypeExpr::Bool,
        "int" | "integer" => TypeExpr::Int,
        "float" | "double" => TypeExpr::Float,
        "string" => TypeExpr::String,
        "null" => TypeExpr::Null,
        "void" => TypeExpr::Void,
        "true" => TypeExpr::True,
        "false" => TypeExpr::False,
        "callable" => TypeExpr::Callable,
        "object" => TypeExpr::Object,
        "resource" => TypeExpr::Resource,
        "array" | "list" => TypeExpr::Array(Vec::new()),
        "iterable" => TypeExpr::Iterable(Vec::new()),
        _ => TypeExpr::named(s),
    })
}

/// Split on `sep` at angle-bracket depth zero.
fn split_top_level(s: &str, sep: char) -> Result<Vec<&str>, TypeParseError> {
    let mut depth = 0i32;
    let mut parts = Vec::new();
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return Err(TypeParseError::UnbalancedBrackets(s.to_string()));
                }
            }
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(TypeParseError::UnbalancedBrackets(s.to_string()));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Memoizing wrapper around [`parse_type`].
///
/// The same handful of tokens recurs across thousands of entries, so parses
/// are cached per token string. Failed parses are not cached; they abort the
/// query anyway.
#[derive(Debug, Default)]
pub struct TypeParser {
    cache: DashMap<String, TypeExpr>,
}

impl TypeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, token: &str) -> Result<TypeExpr, TypeParseError> {
        if let Some(hit) = self.cache.get(token) {
            return Ok(hit.value().clone());
        }
        let ty = parse_type(token)?;
        self.cache.insert(token.to_string(), ty.clone());
        Ok(ty)
    }
}
