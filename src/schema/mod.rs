//! Versioned schema sources, reconstruction, and caching.
//!
//! This module provides:
//! - `SchemaSource` for the base snapshot and backward delta chain
//! - `reconstruct` to rewind the base snapshot to an older minor version
//! - `SchemaCache` for per-version memoization of reconstructed snapshots

mod cache;
mod loader;
mod source;

pub use cache::SchemaCache;
pub use loader::{reconstruct, FunctionEntry, Schema, MAX_OVERLOADS};
pub use source::{BaseDoc, DeltaDoc, DeltaPatch, RawEntry, SchemaSource};
