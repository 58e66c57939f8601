//! Structured type expressions for call map tokens.

use std::fmt;

/// A type expression parsed from a compact call map token.
///
/// Covers the grammar the static tables actually use: scalar atoms, literal
/// `true`/`false` members, `array`/`iterable`/`list` generics, named
/// class-like types, and unions. Nullability is represented as a union with
/// [`TypeExpr::Null`], so `?string` and `string|null` parse to the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// No declared type; accepts anything.
    Mixed,
    Bool,
    Int,
    Float,
    String,
    Null,
    Void,
    /// The `true` literal type.
    True,
    /// The `false` literal type (common in `int|false` style returns).
    False,
    Callable,
    Object,
    Resource,
    /// `array`, `array<V>`, or `array<K, V>`.
    Array(Vec<TypeExpr>),
    /// `iterable`, `iterable<V>`, or `iterable<K, V>`.
    Iterable(Vec<TypeExpr>),
    /// A class, interface, or otherwise named type with any generic arguments.
    Named { name: String, args: Vec<TypeExpr> },
    /// A union of two or more members.
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    /// A named type without generic arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Wrap a type so it also admits null.
    ///
    /// Unions gain a `null` member (once); `null` stays `null`.
    pub fn nullable(ty: TypeExpr) -> Self {
        match ty {
            TypeExpr::Null => TypeExpr::Null,
            TypeExpr::Union(mut members) => {
                if !members.contains(&TypeExpr::Null) {
                    members.push(TypeExpr::Null);
                }
                TypeExpr::Union(members)
            }
            other => TypeExpr::Union(vec![other, TypeExpr::Null]),
        }
    }

    /// Whether the expression admits null: the `null` atom itself or a union
    /// containing one.
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeExpr::Null => true,
            TypeExpr::Union(members) => members.iter().any(|m| matches!(m, TypeExpr::Null)),
            _ => false,
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, name: &str, args: &[TypeExpr]) -> fmt::Result {
    write!(f, "{}", name)?;
    if args.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ">")
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Mixed => write!(f, "mixed"),
            TypeExpr::Bool => write!(f, "bool"),
            TypeExpr::Int => write!(f, "int"),
            TypeExpr::Float => write!(f, "float"),
            TypeExpr::String => write!(f, "string"),
            TypeExpr::Null => write!(f, "null"),
            TypeExpr::Void => write!(f, "void"),
            TypeExpr::True => write!(f, "true"),
            TypeExpr::False => write!(f, "false"),
            TypeExpr::Callable => write!(f, "callable"),
            TypeExpr::Object => write!(f, "object"),
            TypeExpr::Resource => write!(f, "resource"),
            TypeExpr::Array(args) => write_args(f, "array", args),
            TypeExpr::Iterable(args) => write_args(f, "iterable", args),
            TypeExpr::Named { name, args } => write_args(f, name, args),
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}
