//! Error types for the call map crate.

use crate::types::TypeParseError;
use crate::version::RuntimeVersion;

/// Top-level error enum covering schema loading and signature lookups.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Return-type lookup for an identifier absent from the current schema.
    /// Callers should never query return types for names they have not seen.
    #[error("function `{0}` was not found in the call map")]
    UnknownFunction(String),

    /// The requested version is not reachable from the base snapshot through
    /// the delta chain.
    #[error("runtime version {requested} is outside the supported range {oldest} to {newest}")]
    UnsupportedVersion {
        requested: RuntimeVersion,
        oldest: RuntimeVersion,
        newest: RuntimeVersion,
    },

    /// A parameter token reduced to an empty name after modifier stripping.
    /// This is a defect in the static tables, not a per-call condition.
    #[error("malformed parameter token `{0}`")]
    MalformedParameter(String),

    /// A delta document's version tag does not continue the backward chain.
    #[error("delta patch for {found} does not follow {expected} in the backward chain")]
    DeltaChainGap {
        expected: RuntimeVersion,
        found: RuntimeVersion,
    },

    #[error("malformed type token: {0}")]
    Type(#[from] TypeParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
