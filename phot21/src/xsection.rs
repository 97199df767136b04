//!
//! # Waveguide Cross-Sections
//!

// Crates.io
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::geom::LayerSpec;

/// # Cross-Section
///
/// Waveguide profile shared by the component generators: the layer and
/// width geometry is drawn with, and the port names given to a component's
/// input and output.
///
/// Custom profiles are assembled with [CrossSectionBuilder]:
///
/// ```text
/// let wide = CrossSectionBuilder::default()
///     .name("wide")
///     .width(800)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct CrossSection {
    /// Cross-section name, folded into generated component names
    #[builder(setter(into))]
    pub name: String,
    /// Waveguide width, in database units
    #[builder(default = "500")]
    pub width: i64,
    /// Waveguide layer
    #[builder(default = "LayerSpec::new(1, 0)")]
    pub layer: LayerSpec,
    /// Input-port name
    #[builder(setter(into), default = "String::from(\"o1\")")]
    pub port_in: String,
    /// Output-port name
    #[builder(setter(into), default = "String::from(\"o2\")")]
    pub port_out: String,
}
impl CrossSection {
    /// The default strip waveguide: 500 nm wide on layer (1, 0)
    pub fn strip() -> Self {
        Self {
            name: "strip".into(),
            width: 500,
            layer: LayerSpec::new(1, 0),
            port_in: "o1".into(),
            port_out: "o2".into(),
        }
    }
}
impl Default for CrossSection {
    fn default() -> Self {
        Self::strip()
    }
}
