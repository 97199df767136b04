//!
//! # Component Ports
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local Imports
use crate::geom::{LayerSpec, Point, Transform};

/// # Port
/// A named connection point on a component: a location, a facing direction,
/// and the width of the waveguide crossing it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port Name
    pub name: String,
    /// Location of the port center
    pub center: Point,
    /// Waveguide width at the port, in database units
    pub width: i64,
    /// Facing direction, in degrees counter-clockwise from +x
    pub orientation: i16,
    /// Layer the port sits on
    pub layer: LayerSpec,
}
impl Port {
    /// Create a new [Port]
    pub fn new(
        name: impl Into<String>,
        center: Point,
        width: i64,
        orientation: i16,
        layer: LayerSpec,
    ) -> Self {
        Self {
            name: name.into(),
            center,
            width,
            orientation,
            layer,
        }
    }
    /// Map this port through placement-transform `trans`,
    /// producing the port as seen from the instance's parent
    pub fn transformed(&self, trans: &Transform) -> Port {
        Port {
            name: self.name.clone(),
            center: trans.apply(self.center),
            width: self.width,
            orientation: trans.apply_angle(self.orientation),
            layer: self.layer,
        }
    }
}
