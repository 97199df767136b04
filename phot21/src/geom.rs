//!
//! # Geometric Primitives
//!
//! All coordinates are integers in database units, fixed at one nanometer.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local Imports
use crate::error::{PhotError, PhotResult};

/// # Spatial Point
/// (x, y) coordinate pair, in database units
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}
impl Point {
    /// Create a new [Point]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
    /// Element-wise addition
    pub fn offset(&self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// # Layer Specification
/// GDSII (layer, datatype) pair
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerSpec {
    pub layer: i16,
    pub datatype: i16,
}
impl LayerSpec {
    /// Create a new [LayerSpec]
    pub fn new(layer: i16, datatype: i16) -> Self {
        Self { layer, datatype }
    }
}

/// # Polygon
/// Filled polygon on a single layer.
/// The point list is open: the closing point is *not* repeated here,
/// and is added and removed at the GDSII boundary.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub layer: LayerSpec,
    pub points: Vec<Point>,
}
impl Polygon {
    /// Create a rectangle spanning corners `(x0, y0)` and `(x1, y1)`
    pub fn rect(layer: LayerSpec, x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            layer,
            points: vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        }
    }
}

/// # Text Label
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub origin: Point,
    pub layer: LayerSpec,
}

/// # Placement Transform
///
/// Location, rotation, and reflection of an instance, following GDSII's
/// STRANS rules: reflection about the x-axis is applied first, then
/// counter-clockwise rotation, then translation to `origin`.
///
/// Rotations are restricted to multiples of 90 degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    /// Location of the instance origin
    pub origin: Point,
    /// Counter-clockwise rotation, in degrees
    pub rotation: i16,
    /// Reflection about the x-axis, applied before rotation
    pub reflect: bool,
}
impl Transform {
    /// Create a new [Transform], checking the rotation constraint
    pub fn new(origin: Point, rotation: i16, reflect: bool) -> PhotResult<Self> {
        if rotation % 90 != 0 {
            return Err(PhotError::Str(format!(
                "invalid rotation {} degrees: must be a multiple of 90",
                rotation
            )));
        }
        Ok(Self {
            origin,
            rotation: rotation.rem_euclid(360),
            reflect,
        })
    }
    /// Identity transform at `origin`
    pub fn translate(origin: Point) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }
    /// Apply to point `p`, mapping instance-local to parent coordinates
    pub fn apply(&self, p: Point) -> Point {
        let p = if self.reflect {
            Point::new(p.x, -p.y)
        } else {
            p
        };
        rotate(p, self.rotation).offset(self.origin)
    }
    /// Map an orientation angle (degrees) through this transform
    pub fn apply_angle(&self, angle: i16) -> i16 {
        let angle = if self.reflect { -angle } else { angle };
        (angle + self.rotation).rem_euclid(360)
    }
    /// Compose with `child`: the transform of a grandchild placed by
    /// `child` inside an instance placed by `self`
    pub fn compose(&self, child: &Transform) -> Transform {
        let rotation = if self.reflect {
            self.rotation - child.rotation
        } else {
            self.rotation + child.rotation
        };
        Transform {
            origin: self.apply(child.origin),
            rotation: rotation.rem_euclid(360),
            reflect: self.reflect ^ child.reflect,
        }
    }
}

/// Rotate `p` counter-clockwise about the origin.
/// `degrees` must be normalized to one of {0, 90, 180, 270};
/// [Transform] construction guarantees as much.
fn rotate(p: Point, degrees: i16) -> Point {
    match degrees {
        0 => p,
        90 => Point::new(-p.y, p.x),
        180 => Point::new(-p.x, -p.y),
        270 => Point::new(p.y, -p.x),
        _ => unreachable!("rotation invariant violated: {} degrees", degrees),
    }
}
