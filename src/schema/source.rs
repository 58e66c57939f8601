//! Raw schema documents and their loading.
//!
//! The static tables arrive as TOML: one base document describing the newest
//! supported runtime version, plus one delta document per backward minor-version
//! step. This module deserializes them, lowercases every identifier key, and
//! validates that the delta chain is contiguous.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::version::RuntimeVersion;

/// One raw call map entry: a return-type token plus ordered parameter tokens.
///
/// An empty return token means "unspecified"; lookups translate it to the
/// mixed sentinel. Each parameter is a `[name-token, type-token]` pair, where
/// the name token may carry `&`, `=`, and `...` modifier markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawEntry {
    #[serde(rename = "return", default)]
    pub return_type: String,
    #[serde(default)]
    pub params: Vec<(String, String)>,
}

/// The newest-version base document as authored on disk.
#[derive(Debug, Deserialize)]
pub struct BaseDoc {
    pub version: RuntimeVersion,
    #[serde(default)]
    pub functions: HashMap<String, RawEntry>,
}

/// A backward delta document, tagged with the version it steps down FROM.
///
/// Applying the delta tagged 7.3 to a 7.3 snapshot yields the 7.2 snapshot:
/// every identifier in `added` is removed, then every identifier in
/// `reverted` is restored to its older form.
#[derive(Debug, Deserialize)]
pub struct DeltaDoc {
    pub version: RuntimeVersion,
    #[serde(default)]
    pub added: HashMap<String, RawEntry>,
    #[serde(default)]
    pub reverted: HashMap<String, RawEntry>,
}

/// A normalized delta patch with lowercase identifier keys.
#[derive(Debug, Clone)]
pub struct DeltaPatch {
    pub version: RuntimeVersion,
    pub added: HashMap<String, RawEntry>,
    pub reverted: HashMap<String, RawEntry>,
}

/// Validated schema inputs: the newest base snapshot plus the backward delta
/// chain, with all identifier keys lowercased.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    base_version: RuntimeVersion,
    base: HashMap<String, RawEntry>,
    deltas: Vec<DeltaPatch>,
}

impl SchemaSource {
    /// Build a source from parsed documents.
    ///
    /// The delta chain must start at the base version and descend by exactly
    /// one minor per step; anything else is a [`Error::DeltaChainGap`]. A
    /// chain may not step below minor zero.
    pub fn new(base: BaseDoc, deltas: Vec<DeltaDoc>) -> Result<Self> {
        let base_version = base.version;

        let mut chain = Vec::with_capacity(deltas.len());
        let mut expected = base_version;
        for doc in deltas {
            if doc.version != expected || doc.version.minor == 0 {
                return Err(Error::DeltaChainGap {
                    expected,
                    found: doc.version,
                });
            }
            chain.push(DeltaPatch {
                version: doc.version,
                added: lowercase_keys(doc.added),
                reverted: lowercase_keys(doc.reverted),
            });
            expected = RuntimeVersion::new(expected.major, expected.minor - 1);
        }

        Ok(Self {
            base_version,
            base: lowercase_keys(base.functions),
            deltas: chain,
        })
    }

    /// Parse a base document and delta documents from TOML strings.
    pub fn from_toml(base: &str, deltas: &[&str]) -> Result<Self> {
        let base: BaseDoc = toml::from_str(base)?;
        let deltas = deltas
            .iter()
            .copied()
            .map(toml::from_str)
            .collect::<std::result::Result<Vec<DeltaDoc>, _>>()?;
        Self::new(base, deltas)
    }

    /// Load a source directory: `base.toml` plus `delta_{major}_{minor}.toml`
    /// files discovered by counting down from the base version until one is
    /// missing.
    pub fn load(dir: &Path) -> Result<Self> {
        let base: BaseDoc = toml::from_str(&fs::read_to_string(dir.join("base.toml"))?)?;

        let mut deltas: Vec<DeltaDoc> = Vec::new();
        let mut version = base.version;
        while version.minor > 0 {
            let path = dir.join(format!("delta_{}_{}.toml", version.major, version.minor));
            if !path.exists() {
                break;
            }
            deltas.push(toml::from_str(&fs::read_to_string(path)?)?);
            version.minor -= 1;
        }

        debug!(
            dir = %dir.display(),
            version = %base.version,
            deltas = deltas.len(),
            "loaded call map source"
        );

        Self::new(base, deltas)
    }

    /// The newest version the base snapshot represents.
    pub fn base_version(&self) -> RuntimeVersion {
        self.base_version
    }

    /// The oldest version reachable through the delta chain.
    pub fn oldest_version(&self) -> RuntimeVersion {
        RuntimeVersion::new(
            self.base_version.major,
            self.base_version.minor - self.deltas.len() as u32,
        )
    }

    pub(crate) fn base_entries(&self) -> &HashMap<String, RawEntry> {
        &self.base
    }

    pub(crate) fn deltas(&self) -> &[DeltaPatch] {
        &self.deltas
    }
}

fn lowercase_keys(map: HashMap<String, RawEntry>) -> HashMap<String, RawEntry> {
    map.into_iter()
        .map(|(key, entry)| (key.to_lowercase(), entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
        [version]
        major = 7
        minor = 3

        [functions.StrLen]
        return = "int"
        params = [["string", "string"]]
    "#;

    #[test]
    fn keys_are_lowercased_on_load() {
        let source = SchemaSource::from_toml(BASE, &[]).unwrap();
        assert!(source.base_entries().contains_key("strlen"));
        assert!(!source.base_entries().contains_key("StrLen"));
    }

    #[test]
    fn contiguous_chain_is_accepted() {
        let delta_73 = r#"
            [version]
            major = 7
            minor = 3
        "#;
        let delta_72 = r#"
            [version]
            major = 7
            minor = 2
        "#;
        let source = SchemaSource::from_toml(BASE, &[delta_73, delta_72]).unwrap();
        assert_eq!(source.base_version(), RuntimeVersion::new(7, 3));
        assert_eq!(source.oldest_version(), RuntimeVersion::new(7, 1));
    }

    #[test]
    fn chain_gap_is_rejected() {
        let delta_72 = r#"
            [version]
            major = 7
            minor = 2
        "#;
        let err = SchemaSource::from_toml(BASE, &[delta_72]).unwrap_err();
        assert!(matches!(err, Error::DeltaChainGap { .. }));
    }

    #[test]
    fn chain_with_wrong_major_is_rejected() {
        let delta = r#"
            [version]
            major = 8
            minor = 3
        "#;
        let err = SchemaSource::from_toml(BASE, &[delta]).unwrap_err();
        assert!(matches!(err, Error::DeltaChainGap { .. }));
    }

    #[test]
    fn empty_return_and_params_default() {
        let base = r#"
            [version]
            major = 7
            minor = 3

            [functions.f]
        "#;
        let source = SchemaSource::from_toml(base, &[]).unwrap();
        let entry = &source.base_entries()["f"];
        assert_eq!(entry.return_type, "");
        assert!(entry.params.is_empty());
    }
}
