//! Backward reconstruction of versioned schemas.
//!
//! The base snapshot describes the newest supported runtime version. Older
//! snapshots are reconstructed by walking the delta chain downward: each patch
//! removes the identifiers its version introduced and restores the older form
//! of the ones it changed. Overload suffix scanning happens here too, so the
//! rest of the crate only ever sees identifiers mapped to variant lists.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::version::RuntimeVersion;

use super::source::{RawEntry, SchemaSource};

/// Maximum signature variants per identifier: the base entry plus nine
/// apostrophe-suffixed siblings.
pub const MAX_OVERLOADS: usize = 10;

/// All raw signature variants collected for one identifier, base first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    variants: Vec<RawEntry>,
}

impl FunctionEntry {
    /// The base variant. Return-type lookups consult only this one.
    pub fn base(&self) -> &RawEntry {
        &self.variants[0]
    }

    /// Every variant in suffix order.
    pub fn variants(&self) -> &[RawEntry] {
        &self.variants
    }
}

/// A reconstructed schema snapshot for one runtime version.
#[derive(Debug, Clone)]
pub struct Schema {
    version: RuntimeVersion,
    functions: HashMap<String, FunctionEntry>,
}

impl Schema {
    /// The version this snapshot represents.
    pub fn version(&self) -> RuntimeVersion {
        self.version
    }

    /// Look up an identifier, case-insensitively.
    pub fn function(&self, identifier: &str) -> Option<&FunctionEntry> {
        self.functions.get(identifier.to_lowercase().as_str())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.function(identifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterate all known identifiers, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

/// Reconstruct the schema for `requested` by rewinding the base snapshot
/// through the delta chain.
///
/// Requesting a minor version newer than the base (same major) serves the
/// base snapshot unchanged. Requesting anything outside the range the chain
/// covers is an [`Error::UnsupportedVersion`].
pub fn reconstruct(source: &SchemaSource, requested: RuntimeVersion) -> Result<Schema> {
    let newest = source.base_version();
    let oldest = source.oldest_version();
    if requested.major != newest.major || requested < oldest {
        return Err(Error::UnsupportedVersion {
            requested,
            oldest,
            newest,
        });
    }

    let mut entries = source.base_entries().clone();

    for patch in source.deltas() {
        // The patch tagged minor m rewinds m to m-1; stop before stepping
        // below the requested version.
        if patch.version.minor <= requested.minor {
            break;
        }
        for key in patch.added.keys() {
            entries.remove(key);
        }
        for (key, entry) in &patch.reverted {
            entries.insert(key.clone(), entry.clone());
        }
    }

    debug!(
        version = %requested,
        entries = entries.len(),
        "reconstructed call map schema"
    );

    Ok(Schema {
        version: requested,
        functions: group_overloads(entries),
    })
}

/// Fold apostrophe-suffixed overload siblings into their base identifier.
///
/// Overload indices are contiguous starting at 1; a gap terminates collection
/// early. Suffixed entries whose base identifier is absent are unreachable
/// and dropped.
fn group_overloads(mut entries: HashMap<String, RawEntry>) -> HashMap<String, FunctionEntry> {
    let mut functions = HashMap::with_capacity(entries.len());

    let base_names: Vec<String> = entries
        .keys()
        .filter(|key| !key.contains('\''))
        .cloned()
        .collect();

    for name in base_names {
        let Some(base) = entries.remove(&name) else {
            continue;
        };
        let mut variants = vec![base];
        for i in 1..MAX_OVERLOADS {
            match entries.remove(&format!("{name}'{i}")) {
                Some(entry) => variants.push(entry),
                None => break,
            }
        }
        functions.insert(name, FunctionEntry { variants });
    }

    functions
}
