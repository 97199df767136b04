//!
//! # Phot21 GDSII Stream Parser & Writer
//!
//! GDSII is the IC and photonics industries' de facto standard for storing
//! and sharing layout geometry. This crate reads and writes GDSII data as
//! the interface layer for the larger Phot21 library; it stores layout data
//! on GDSII's own terms, using GDSII's idioms and naming conventions, and
//! leaves higher-level manipulation to its callers.
//!
//! Layout data takes three forms:
//!
//! * A short tree: the root [GdsLibrary] holds a set of cell definitions
//!   ([GdsStruct]s) plus library metadata; each cell holds a vector of
//!   [GdsElement]s: polygons ([GdsBoundary]), cell instances
//!   ([GdsStructRef]), instance arrays ([GdsArrayRef]), text ([GdsTextElem])
//!   and paths ([GdsPath]).
//! * For storage on disk the tree is flattened to a sequence of
//!   [GdsRecord]s, each marking the beginning, end, or content of a
//!   tree-node.
//! * Records are binary-encoded per the GDSII spec: a four-byte header
//!   (length, record-type, data-type) followed by big-endian payload data.
//!   Raw bytes are only produced and consumed on their way through [Read]
//!   and [Write] objects; they are never stored.
//!
//! The GDSII spec defines many record types this library never produces:
//! nodes, boxes, reference libraries, mask formats, and the like. Parsing
//! data which uses them yields an [GdsError::Unsupported].
//!
//! Loading a [GdsLibrary] from disk and saving one back:
//!
//! ```text
//! let lib = GdsLibrary::open("sample.gds")?;
//! lib.save("copy.gds")?;
//! ```
//!
//! Each type in the [GdsLibrary] tree is also [serde]-serializable, which
//! the test suite uses for golden comparisons.
//!

pub mod data;
pub mod read;
pub mod write;

pub use data::*;
pub use read::GdsParser;
pub use write::GdsWriter;

#[cfg(test)]
mod tests;
