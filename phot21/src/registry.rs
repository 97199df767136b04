//!
//! # Cell Cache
//!

// Std-Lib Imports
use std::collections::HashMap;
use std::fmt::Write as _;

// Crates.io
use serde_json::Value;
use sha2::{Digest, Sha256};

// Workspace Imports
use phot21utils::Ptr;

// Local Imports
use crate::component::Component;
use crate::error::PhotResult;

/// # Cell Cache
///
/// Component-instance cache keyed by generator name and parameters.
/// Repeated generator calls with identical parameters return the identical
/// shared cell, so a design referencing "the" 500 nm strip waveguide from
/// ten places holds one definition.
#[derive(Default)]
pub struct CellCache {
    cells: HashMap<String, Ptr<Component>>,
}
impl CellCache {
    /// Create a new and empty [CellCache]
    pub fn new() -> Self {
        Self::default()
    }
    /// Compute the cache key for generator `function` called with `params`
    pub fn key(function: &str, params: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(function.as_bytes());
        hasher.update(params.to_string().as_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(2 * digest.len());
        for byte in digest.iter() {
            let _ = write!(hex, "{:02x}", byte);
        }
        hex
    }
    /// Get the cell stored under `key`, or build, store, and return it
    pub fn get_or_build(
        &mut self,
        key: String,
        build: impl FnOnce() -> PhotResult<Component>,
    ) -> PhotResult<Ptr<Component>> {
        self.get_or_insert(key, || Ok(Ptr::new(build()?)))
    }
    /// [CellCache::get_or_build] for builders which already produce shared cells
    pub fn get_or_insert(
        &mut self,
        key: String,
        build: impl FnOnce() -> PhotResult<Ptr<Component>>,
    ) -> PhotResult<Ptr<Component>> {
        if let Some(cell) = self.cells.get(&key) {
            return Ok(cell.clone());
        }
        let cell = build()?;
        self.cells.insert(key, cell.clone());
        Ok(cell)
    }
    /// Number of cached cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    /// Boolean indication of an empty cache
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
