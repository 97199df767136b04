//!
//! # Phot21 Photonic Component Layout Library
//!
//! Programmatic layout of photonic components, with GDSII as the
//! interchange format.
//!
//! The core abstraction is the [Component]: a named cell holding polygons,
//! text labels, named [Port]s, and references to other components. Cells are
//! shared through thread-safe [Ptr]s, so a waveguide instantiated in ten
//! places is stored once. Components are produced by the generators on
//! [Factory] ([straight waveguides](Factory::straight), [1x2 MMI
//! splitters](Factory::mmi1x2), [Mach-Zehnder
//! interferometers](Factory::mzi)), parameterized by a [CrossSection], and
//! cached so that identical parameters yield the identical cell.
//!
//! Components round-trip through GDSII via [Component::write_gds] and
//! [Factory::import_gds]. Two fidelity checks ride along:
//!
//! * [Component::hash_geometry] digests the flattened polygon geometry,
//!   invariant under a GDS write/read cycle.
//! * [Component::to_dict] snapshots the cell hierarchy (settings, ports,
//!   instances); [Component::write_gds_with_metadata] stores the snapshot
//!   in a YAML sidecar next to the GDS, which import can re-attach.
//!

pub mod component;
pub mod components;
pub mod error;
pub mod factory;
pub mod gds;
pub mod geom;
pub mod port;
pub mod registry;
pub mod xsection;

pub use component::{Component, Reference, Settings};
pub use error::{PhotError, PhotResult};
pub use factory::Factory;
pub use gds::ImportOptions;
pub use geom::{Label, LayerSpec, Point, Polygon, Transform};
pub use port::Port;
pub use xsection::{CrossSection, CrossSectionBuilder};

// Re-exported for the convenience of callers holding shared cells
pub use phot21utils::Ptr;

#[cfg(test)]
mod tests;
