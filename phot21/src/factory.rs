//!
//! # The Component Factory
//!

// Std-Lib Imports
use std::path::Path;
use std::sync::Arc;

// Crates.io
use serde_json::json;

// Workspace Imports
use phot21utils::Ptr;

// Local Imports
use crate::component::Component;
use crate::components;
use crate::error::PhotResult;
use crate::gds::{self, ImportOptions};
use crate::registry::CellCache;
use crate::xsection::CrossSection;

/// # Component Factory
///
/// The library façade: cached component generators plus GDS import.
/// All generators run through the [CellCache], so identical parameters
/// yield the identical shared cell.
#[derive(Default)]
pub struct Factory {
    cache: CellCache,
}
impl Factory {
    /// Create a new [Factory] with an empty cache
    pub fn new() -> Self {
        Self::default()
    }
    /// Straight waveguide of `length` database units
    pub fn straight(&mut self, length: i64, xs: &CrossSection) -> PhotResult<Ptr<Component>> {
        let key = CellCache::key(
            "straight",
            &json!({ "length": length, "cross_section": xs }),
        );
        self.cache.get_or_build(key, || components::straight(length, xs))
    }
    /// 1x2 multimode interferometer
    pub fn mmi1x2(&mut self, xs: &CrossSection) -> PhotResult<Ptr<Component>> {
        let key = CellCache::key("mmi1x2", &json!({ "cross_section": xs }));
        self.cache.get_or_build(key, || components::mmi1x2(xs))
    }
    /// Mach-Zehnder interferometer. A `None` splitter uses the default
    /// [mmi1x2](Factory::mmi1x2).
    pub fn mzi(
        &mut self,
        splitter: Option<Ptr<Component>>,
        xs: &CrossSection,
    ) -> PhotResult<Ptr<Component>> {
        let splitter = match splitter {
            Some(s) => s,
            None => self.mmi1x2(xs)?,
        };
        let arm = self.straight(components::MZI_ARM_LENGTH, xs)?;
        // Key on the splitter's cell identity, not its name:
        // distinct cells sharing a name must yield distinct MZIs
        let splitter_id = Arc::as_ptr(&**splitter) as usize;
        let key = CellCache::key(
            "mzi",
            &json!({ "splitter": splitter_id, "cross_section": xs }),
        );
        self.cache
            .get_or_build(key, || components::mzi(&splitter, &arm, xs))
    }
    /// Import a GDSII file, registering its top cell in the cache
    pub fn import_gds(
        &mut self,
        path: impl AsRef<Path>,
        opts: &ImportOptions,
    ) -> PhotResult<Ptr<Component>> {
        let path = path.as_ref();
        let key = CellCache::key(
            "import_gds",
            &json!({
                "path": path.to_string_lossy(),
                "read_metadata": opts.read_metadata,
                "unique_names": opts.unique_names,
            }),
        );
        self.cache.get_or_insert(key, || gds::import_gds(path, opts))
    }
    /// Number of cells the factory has cached
    pub fn num_cached(&self) -> usize {
        self.cache.len()
    }
}
