//! Target runtime versions and the provider seam.
//!
//! The embedding analyzer decides which runtime version an analysis run
//! targets. The call map never reads that decision from global state; it is
//! injected as a [`VersionProvider`] and consulted on every lookup.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A (major, minor) version pair of the target runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a version string does not match `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime version `{0}`: expected `major.minor`")]
pub struct ParseVersionError(String);

impl FromStr for RuntimeVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| ParseVersionError(s.to_string()))?;
        let major = major
            .parse()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        let minor = minor
            .parse()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        Ok(Self { major, minor })
    }
}

/// Supplies the runtime version the current analysis run targets.
///
/// Implemented for [`RuntimeVersion`] itself (a fixed target) and for any
/// `Fn() -> RuntimeVersion` closure, so an analyzer whose target can change
/// mid-process hands in a live view of it.
pub trait VersionProvider: Send + Sync {
    fn target_version(&self) -> RuntimeVersion;
}

impl VersionProvider for RuntimeVersion {
    fn target_version(&self) -> RuntimeVersion {
        *self
    }
}

impl<F> VersionProvider for F
where
    F: Fn() -> RuntimeVersion + Send + Sync,
{
    fn target_version(&self) -> RuntimeVersion {
        self()
    }
}
