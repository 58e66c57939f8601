//! Structured signature descriptors.

use crate::types::TypeExpr;

/// One parsed parameter of a call map signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name with all modifier markers stripped.
    pub name: String,
    /// Passed by reference (`&` prefix in the raw token).
    pub by_ref: bool,
    /// May be omitted at the call site (`=` suffix).
    pub optional: bool,
    /// Collects trailing arguments (`...` prefix).
    pub variadic: bool,
    /// Declared type, or [`TypeExpr::Mixed`] when the token carries none.
    pub ty: TypeExpr,
}

/// A resolved return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnType {
    pub ty: TypeExpr,
    /// Set when the declared type is nullable. Nullable call map returns come
    /// from documentation-level information rather than a strict declaration,
    /// which matters to downstream strictness decisions.
    pub from_docs: bool,
}

impl ReturnType {
    /// The "no declared type" result.
    pub fn mixed() -> Self {
        Self {
            ty: TypeExpr::Mixed,
            from_docs: false,
        }
    }
}
