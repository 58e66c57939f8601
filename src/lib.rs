//! Versioned call map of builtin function signatures for static analysis.
//!
//! A call map answers two questions about a named callable from the target
//! runtime's standard library: what are its parameters (including
//! reference/optional/variadic modifiers and declared types), and what is its
//! return type. Signatures differ across runtime minor versions, so the map
//! stores one base snapshot for the newest supported version plus a chain of
//! backward deltas, and reconstructs the snapshot for whatever version the
//! embedding analyzer currently targets.
//!
//! ```
//! use callmap::{CallMap, RuntimeVersion, SchemaSource};
//!
//! let base = r#"
//!     [version]
//!     major = 7
//!     minor = 3
//!
//!     [functions.strlen]
//!     return = "int"
//!     params = [["string", "string"]]
//! "#;
//!
//! let source = SchemaSource::from_toml(base, &[]).unwrap();
//! let map = CallMap::for_version(source, RuntimeVersion::new(7, 3));
//!
//! let ret = map.return_type("strlen").unwrap();
//! assert_eq!(ret.ty.to_string(), "int");
//!
//! let overloads = map.parameter_overloads("strlen").unwrap().unwrap();
//! assert_eq!(overloads[0][0].name, "string");
//! ```

use std::sync::Arc;

mod error;
mod schema;
mod signature;
mod types;
mod version;

pub use error::{Error, Result};
pub use schema::{
    reconstruct, BaseDoc, DeltaDoc, DeltaPatch, FunctionEntry, RawEntry, Schema, SchemaCache,
    SchemaSource, MAX_OVERLOADS,
};
pub use signature::{Parameter, ReturnType};
pub use types::{parse_type, TypeExpr, TypeParseError, TypeParser};
pub use version::{ParseVersionError, RuntimeVersion, VersionProvider};

/// The versioned signature database facade.
///
/// Owns the raw schema inputs, the per-version cache, and the target version
/// provider. Every lookup consults the provider first, so a version change in
/// the embedding analyzer is picked up on the next query.
pub struct CallMap {
    source: SchemaSource,
    cache: SchemaCache,
    versions: Box<dyn VersionProvider>,
    types: TypeParser,
}

impl CallMap {
    /// Create a call map whose target version is supplied by `versions`.
    pub fn new(source: SchemaSource, versions: impl VersionProvider + 'static) -> Self {
        Self {
            source,
            cache: SchemaCache::new(),
            versions: Box::new(versions),
            types: TypeParser::new(),
        }
    }

    /// Create a call map pinned to a fixed target version.
    pub fn for_version(source: SchemaSource, version: RuntimeVersion) -> Self {
        Self::new(source, version)
    }

    /// The schema snapshot for the current target version.
    pub fn schema(&self) -> Result<Arc<Schema>> {
        self.cache.get(&self.source, self.versions.target_version())
    }

    /// Resolve a function's declared return type.
    ///
    /// Fails with [`Error::UnknownFunction`] when the identifier is absent
    /// from the current version's schema; callers are expected to only query
    /// names they have already resolved.
    pub fn return_type(&self, function: &str) -> Result<ReturnType> {
        let schema = self.schema()?;
        let entry = schema
            .function(function)
            .ok_or_else(|| Error::UnknownFunction(function.to_string()))?;
        signature::return_type(entry, &self.types)
    }

    /// Resolve every overload's parameter list for a function.
    ///
    /// Returns `Ok(None)` when the identifier is absent: unlike return-type
    /// lookup, missing parameter data is a legitimate "no information"
    /// outcome.
    pub fn parameter_overloads(&self, function: &str) -> Result<Option<Vec<Vec<Parameter>>>> {
        let schema = self.schema()?;
        let Some(entry) = schema.function(function) else {
            return Ok(None);
        };
        signature::parameter_overloads(entry, &self.types).map(Some)
    }

    /// Whether the identifier exists in the current version's schema.
    pub fn is_known(&self, function: &str) -> Result<bool> {
        Ok(self.schema()?.contains(function))
    }

    /// Drop the cached schema; the next lookup reconstructs it.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const BASE: &str = r#"
        [version]
        major = 7
        minor = 3

        [functions.strlen]
        return = "int"
        params = [["string", "string"]]

        [functions.error_get_last]
        return = "?array<string, mixed>"

        [functions.register_shutdown_function]
        params = [["callback", "callable"], ["...parameter=", "mixed"]]
    "#;

    fn map() -> CallMap {
        let source = SchemaSource::from_toml(BASE, &[]).unwrap();
        CallMap::for_version(source, RuntimeVersion::new(7, 3))
    }

    #[test]
    fn return_type_for_known_function() {
        let ret = map().return_type("strlen").unwrap();
        assert_eq!(ret.ty, TypeExpr::Int);
        assert!(!ret.from_docs);
    }

    #[test]
    fn nullable_return_is_marked_as_doc_level() {
        let ret = map().return_type("error_get_last").unwrap();
        assert!(ret.ty.is_nullable());
        assert!(ret.from_docs);
    }

    #[test]
    fn empty_return_token_is_mixed() {
        let ret = map().return_type("register_shutdown_function").unwrap();
        assert_eq!(ret, ReturnType::mixed());
    }

    #[test]
    fn unknown_function_is_a_hard_error() {
        let err = map().return_type("definitely_not_builtin").unwrap_err();
        assert!(matches!(err, Error::UnknownFunction(_)));
    }

    #[test]
    fn absent_parameter_data_is_none_not_an_error() {
        assert_eq!(map().parameter_overloads("definitely_not_builtin").unwrap(), None);
    }

    #[test]
    fn lookups_ignore_case() {
        let map = map();
        assert_eq!(
            map.return_type("STRLEN").unwrap(),
            map.return_type("strlen").unwrap()
        );
        assert!(map.is_known("StrLen").unwrap());
    }

    #[test]
    fn closure_provider_switches_versions_between_lookups() {
        let base = r#"
            [version]
            major = 7
            minor = 3

            [functions.is_countable]
            return = "bool"
            params = [["value", "mixed"]]
        "#;
        let delta = r#"
            [version]
            major = 7
            minor = 3

            [added.is_countable]
            return = "bool"
            params = [["value", "mixed"]]
        "#;
        let source = SchemaSource::from_toml(base, &[delta]).unwrap();

        let target = Arc::new(Mutex::new(RuntimeVersion::new(7, 3)));
        let view = Arc::clone(&target);
        let map = CallMap::new(source, move || *view.lock().unwrap());

        assert!(map.is_known("is_countable").unwrap());
        *target.lock().unwrap() = RuntimeVersion::new(7, 2);
        assert!(!map.is_known("is_countable").unwrap());
    }

    #[test]
    fn schema_snapshot_is_shared_until_invalidated() {
        let map = map();
        let first = map.schema().unwrap();
        let second = map.schema().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        map.invalidate();
        let third = map.schema().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
