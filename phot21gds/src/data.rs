//!
//! # GDSII Data Model
//!

// Std-Lib Imports
use std::error::Error;
use std::io::Write;
use std::path::Path;

// Crates.io
use chrono::{Datelike, NaiveDateTime, SubsecRound, Timelike, Utc};
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

// Workspace Imports
use phot21utils::SerdeFile;

// Local Imports
use crate::read::GdsParser;
use crate::write::GdsWriter;

///
/// # Gds Record Types
///
/// The full GDSII record-type table, in the numeric order specified by the
/// format, for automatic [FromPrimitive] conversions. Many of these are
/// never produced by this library; see [GdsRecordKind::supported].
///
#[derive(FromPrimitive, Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum GdsRecordKind {
    Header = 0x00,
    BgnLib,
    LibName,
    Units,
    EndLib,
    BgnStruct,
    StructName, // STRNAME
    EndStruct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Layer,
    DataType,
    Width,
    Xy,
    EndElement,
    StructRefName, // SNAME
    ColRow,
    TextNode, // "Not currently used"
    Node,
    TextType,
    Presentation,
    Spacing, // "Discontinued"
    String,
    Strans,
    Mag,
    Angle,
    Uinteger, // "No longer used"
    Ustring,  // "No longer used"
    RefLibs,
    Fonts,
    PathType,
    Generations,
    AttrTable,
    StypTable, // "Unreleased Feature"
    StrType,   // "Unreleased Feature"
    ElemFlags,
    ElemKey,  // "Unreleased Feature"
    LinkType, // "Unreleased Feature"
    LinkKeys, // "Unreleased Feature"
    Nodetype,
    PropAttr,
    PropValue,
    Box,
    BoxType,
    Plex,
    BeginExtn, // "Only occurs in CustomPlus"
    EndExtn,   // "Only occurs in CustomPlus"
    TapeNum,
    TapeCode,
    StrClass, // "Only for Calma internal use"
    Reserved, // "Reserved for future use"
    Format,
    Mask,
    EndMasks,
    LibDirSize,
    SrfName,
    LibSecur,
}
impl GdsRecordKind {
    /// Boolean indication of whether this record kind has decodable content.
    /// Covers the subset of the GDSII spec that photonic layout data uses;
    /// everything else errors at parse-time as [GdsError::Unsupported].
    pub fn supported(&self) -> bool {
        matches!(
            self,
            Self::Header
                | Self::BgnLib
                | Self::LibName
                | Self::Units
                | Self::EndLib
                | Self::BgnStruct
                | Self::StructName
                | Self::EndStruct
                | Self::Boundary
                | Self::Path
                | Self::StructRef
                | Self::ArrayRef
                | Self::Text
                | Self::Layer
                | Self::DataType
                | Self::Width
                | Self::Xy
                | Self::EndElement
                | Self::StructRefName
                | Self::ColRow
                | Self::TextType
                | Self::Presentation
                | Self::String
                | Self::Strans
                | Self::Mag
                | Self::Angle
                | Self::PathType
                | Self::BeginExtn
                | Self::EndExtn
                | Self::PropAttr
                | Self::PropValue
        )
    }
}

/// # Gds DataType Enumeration
/// In order as decoded from the data-type header byte
#[derive(FromPrimitive, Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum GdsDataType {
    NoData = 0,
    BitArray = 1,
    I16 = 2,
    I32 = 3,
    F32 = 4,
    F64 = 5,
    Str = 6,
}

/// # Gds Record Header
/// Decoded contents of a record's four header bytes:
/// record-kind, data-type, and content length in bytes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct GdsRecordHeader {
    pub kind: GdsRecordKind,
    pub dtype: GdsDataType,
    pub len: u16,
}

///
/// # Gds Record Enumeration
///
/// Each record is kept in relatively raw form, other than assuring correct
/// data-types and converting one-entry arrays into scalars.
/// Only [GdsRecordKind::supported] kinds appear here.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GdsRecord {
    Header { version: i16 },
    BgnLib { dates: [i16; 12] },
    LibName(String),
    Units(f64, f64),
    EndLib,
    BgnStruct { dates: [i16; 12] },
    StructName(String),    // STRNAME
    StructRefName(String), // SNAME
    EndStruct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Layer(i16),
    DataType(i16),
    Width(i32),
    Xy(Vec<i32>),
    EndElement,
    ColRow { cols: i16, rows: i16 },
    TextType(i16),
    Presentation(u8, u8),
    String(String),
    Strans(u8, u8),
    Mag(f64),
    Angle(f64),
    PathType(i16),
    BeginExtn(i32),
    EndExtn(i32),
    PropAttr(i16),
    PropValue(String),
}

/// # Gds Floating Point
///
/// GDSII predates IEEE754 and brings its own eight-byte float format:
/// a sign bit, a seven-bit excess-64 base-16 exponent, and a 56-bit
/// mantissa normalized to the range (1/16, 1).
///
/// [GdsFloat64] is a namespace for the `encode` and `decode` conversions
/// to and from IEEE double-precision.
pub struct GdsFloat64;
impl GdsFloat64 {
    /// Decode GDSII's eight-byte representation, stored as a `u64`, to `f64`
    pub fn decode(val: u64) -> f64 {
        let neg = (val & 0x8000_0000_0000_0000) != 0;
        let exp: i32 = ((val & 0x7F00_0000_0000_0000) >> 56) as i32 - 64;
        // The mantissa occupies the low seven bytes, normalized to (1/16, 1)
        let mantissa: f64 = (val & 0x00FF_FFFF_FFFF_FFFF) as f64 / 2f64.powi(56);
        let mag = mantissa * 16f64.powi(exp);
        if neg {
            -mag
        } else {
            mag
        }
    }
    /// Encode `f64` to GDSII's eight bytes, stored as `u64`
    pub fn encode(mut val: f64) -> u64 {
        if val == 0.0 {
            return 0;
        }
        let mut top: u8 = 0;
        if val < 0.0 {
            top = 0x80;
            val = -val;
        }
        // Base-16 exponent, rounded up so the mantissa lands in (1/16, 1)
        let fexp: f64 = 0.25 * val.log2();
        let mut exponent = fexp.ceil() as i32;
        if fexp == fexp.ceil() {
            exponent += 1;
        }
        let mantissa: u64 = (val * 16f64.powi(14 - exponent)).round() as u64;
        top += (64 + exponent) as u8;
        (top as u64).wrapping_shl(56) | (mantissa & 0x00FF_FFFF_FFFF_FFFF)
    }
}

/// # Gds Library Units
///
/// Two numbers, directly as stored in the UNITS record:
/// the size of a database unit in user units, and
/// the size of a database unit in meters.
/// All spatial data throughout a library is denoted in database units.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GdsUnits(pub f64, pub f64);
impl GdsUnits {
    /// Create a new [GdsUnits]
    pub fn new(num1: f64, num2: f64) -> Self {
        Self(num1, num2)
    }
    /// Get the database-unit size, in meters
    pub fn db_unit(&self) -> f64 {
        self.1
    }
    /// Get the user-unit size, in meters
    pub fn user_unit(&self) -> f64 {
        self.0 / self.1
    }
}
impl Default for GdsUnits {
    /// Default units: 1nm database unit, 1µm user unit
    fn default() -> Self {
        Self(1e-3, 1e-9)
    }
}

/// # Gds Spatial Point
/// Coordinate in (x, y) layout-space, denoted in the library's database units.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GdsPoint {
    pub x: i32,
    pub y: i32,
}
impl GdsPoint {
    /// Create a new [GdsPoint]
    pub fn new(x: i32, y: i32) -> Self {
        GdsPoint { x, y }
    }
    /// Convert from a two-element coordinate vector
    pub(crate) fn parse(from: &[i32]) -> GdsResult<Self> {
        if from.len() != 2 {
            return Err(GdsError::Str(
                "invalid length for single-point XY data".into(),
            ));
        }
        Ok(GdsPoint::new(from[0], from[1]))
    }
    /// Convert a 2n-element coordinate vector into n points
    pub(crate) fn parse_vec(from: &[i32]) -> GdsResult<Vec<GdsPoint>> {
        if from.len() % 2 != 0 {
            return Err(GdsError::Str("odd length for XY coordinate data".into()));
        }
        Ok(from
            .chunks_exact(2)
            .map(|pair| GdsPoint::new(pair[0], pair[1]))
            .collect())
    }
    /// Flatten to a two-element vector
    pub(crate) fn flatten(&self) -> Vec<i32> {
        vec![self.x, self.y]
    }
    /// Flatten n points to a 2n-element coordinate vector
    pub(crate) fn flatten_vec(src: &[GdsPoint]) -> Vec<i32> {
        let mut rv = Vec::with_capacity(src.len() * 2);
        for pt in src.iter() {
            rv.push(pt.x);
            rv.push(pt.y);
        }
        rv
    }
}

/// # Gds Translation Settings
/// Reflection, rotation, and magnification for text elements and references,
/// as configured by STRANS records.
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsStrans {
    /// Reflection about the x-axis, applied before rotation
    #[serde(default, skip_serializing_if = "is_false")]
    pub reflected: bool,
    /// Absolute magnification setting
    #[serde(default, skip_serializing_if = "is_false")]
    pub abs_mag: bool,
    /// Absolute angle setting
    #[serde(default, skip_serializing_if = "is_false")]
    pub abs_angle: bool,
    /// Magnification factor. Interpreted as unity if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag: Option<f64>,
    /// Angle in degrees counter-clockwise. Defaults to zero if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

/// # Gds Text-Presentation Flags
/// Font and justification settings, stored in raw `u8` form
#[derive(Default, Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GdsPresentation(pub u8, pub u8);

/// # Gds Property
/// A PROPATTR/PROPVALUE attribute-value pair
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsProperty {
    /// Attribute Number
    pub attr: i16,
    /// Attribute Value
    pub value: String,
}

///
/// # Gds Boundary Element
///
/// The workhorse of GDSII layout: an individual filled polygon.
/// The format dictates that the first and final points be identical,
/// "closing" the polygon; an N-sided polygon carries N+1 points.
///
/// Spec BNF:
/// ```text
/// BOUNDARY [ELFLAGS] [PLEX] LAYER DATATYPE XY
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsBoundary {
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Closed vector of x,y coordinates
    pub xy: Vec<GdsPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<GdsProperty>,
}

///
/// # Gds Path Element
///
/// Spec BNF:
/// ```text
/// PATH [ELFLAGS] [PLEX] LAYER DATATYPE [PATHTYPE] [WIDTH] XY [BGNEXTN] [ENDEXTN]
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsPath {
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Centerline x,y coordinates
    pub xy: Vec<GdsPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_type: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_extn: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_extn: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<GdsProperty>,
}

///
/// # Gds Struct Reference (Cell Instance)
///
/// An instance of another layout cell, placed at the single coordinate `xy`.
/// Rotation and reflection are configured by the optional [GdsStrans].
///
/// Spec BNF:
/// ```text
/// SREF [ELFLAGS] [PLEX] SNAME [<strans>] XY
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsStructRef {
    /// Struct (Cell) Name
    pub name: String,
    /// Location
    pub xy: GdsPoint,
    /// Translation & Reflection Options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strans: Option<GdsStrans>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<GdsProperty>,
}

///
/// # Gds Array Reference
///
/// A two-dimensional array of cell instances. The three-point `xy` holds
/// the array origin and the two outer corners spanning columns and rows.
///
/// Spec BNF:
/// ```text
/// AREF [ELFLAGS] [PLEX] SNAME [<strans>] COLROW XY
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsArrayRef {
    /// Struct (Cell) Name
    pub name: String,
    /// Origin and column/row spanning points
    pub xy: [GdsPoint; 3],
    /// Number of columns
    pub cols: i16,
    /// Number of rows
    pub rows: i16,
    /// Translation & Reflection Options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strans: Option<GdsStrans>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<GdsProperty>,
}

///
/// # Gds Text Element
///
/// Spec BNF:
/// ```text
/// TEXT [ELFLAGS] [PLEX] LAYER TEXTTYPE [PRESENTATION] [PATHTYPE] [WIDTH] [<strans>] XY STRING
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsTextElem {
    /// Text Value
    pub string: String,
    /// Layer Number
    pub layer: i16,
    /// Text-Type ID
    pub texttype: i16,
    /// Location
    pub xy: GdsPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<GdsPresentation>,
    /// Translation & Reflection Options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strans: Option<GdsStrans>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<GdsProperty>,
}

///
/// # Gds Element Enumeration
///
/// Union of the geometric elements, instances, and arrays comprising a
/// GDSII struct (cell).
///
/// Spec BNF:
/// ```text
/// {<boundary> | <path> | <SREF> | <AREF> | <text>} {<property>}* ENDEL
/// ```
///
#[derive(derive_more::From, Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum GdsElement {
    GdsBoundary(GdsBoundary),
    GdsPath(GdsPath),
    GdsStructRef(GdsStructRef),
    GdsArrayRef(GdsArrayRef),
    GdsTextElem(GdsTextElem),
}

/// # Gds Date & Time
///
/// Six two-byte integers: year, month, day, hour, minute, and second,
/// with years referenced to 1900. Values read from file are stored as-is;
/// no calendar validation is performed, so "month 30" survives a round-trip.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct GdsDateTime {
    pub year: i16, // Offset from 1900
    pub month: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub second: i16,
}
impl GdsDateTime {
    /// Get the current time, rounded to GDSII's one-second resolution
    pub fn now() -> Self {
        Utc::now().naive_utc().round_subsecs(0).into()
    }
    /// Flatten to the six-integer order prescribed by the GDSII spec
    pub fn to_sextet(&self) -> [i16; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }
}
impl Default for GdsDateTime {
    fn default() -> Self {
        Self::now()
    }
}
impl From<NaiveDateTime> for GdsDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year() as i16 - 1900,
            month: dt.month() as i16,
            day: dt.day() as i16,
            hour: dt.hour() as i16,
            minute: dt.minute() as i16,
            second: dt.second() as i16,
        }
    }
}
impl From<&[i16; 6]> for GdsDateTime {
    fn from(vals: &[i16; 6]) -> Self {
        Self {
            year: vals[0],
            month: vals[1],
            day: vals[2],
            hour: vals[3],
            minute: vals[4],
            second: vals[5],
        }
    }
}

/// # Gds Modification & Access Dates & Times
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct GdsDateTimes {
    /// Last Modification Date & Time
    pub modified: GdsDateTime,
    /// Last Access Date & Time
    pub accessed: GdsDateTime,
}
impl GdsDateTimes {
    /// Encode in GDSII's twelve-integer format
    pub fn encode(&self) -> [i16; 12] {
        let m = self.modified.to_sextet();
        let a = self.accessed.to_sextet();
        [
            m[0], m[1], m[2], m[3], m[4], m[5], a[0], a[1], a[2], a[3], a[4], a[5],
        ]
    }
}
impl From<&[i16; 12]> for GdsDateTimes {
    fn from(d: &[i16; 12]) -> Self {
        Self {
            modified: GdsDateTime::from(&[d[0], d[1], d[2], d[3], d[4], d[5]]),
            accessed: GdsDateTime::from(&[d[6], d[7], d[8], d[9], d[10], d[11]]),
        }
    }
}
impl Default for GdsDateTimes {
    /// Default: now, with a single clock-read so both fields agree
    fn default() -> Self {
        let now = GdsDateTime::now();
        Self {
            modified: now.clone(),
            accessed: now,
        }
    }
}

///
/// # Gds Struct (Cell) Definition
///
/// GDSII's hierarchical layout-definition object, which most layout systems
/// call a "cell". Principally an un-ordered vector of [GdsElement]s.
///
/// Spec BNF:
/// ```text
/// BGNSTR STRNAME {<element>}* ENDSTR
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsStruct {
    /// Struct Name
    pub name: String,
    /// Modification & Access Dates & Times
    pub dates: GdsDateTimes,
    /// Elements List
    pub elems: Vec<GdsElement>,
}
impl GdsStruct {
    /// Create a new and empty [GdsStruct]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

///
/// # Gds Library
///
/// GDSII's root object, generally corresponding one-to-one with a `.gds`
/// file: a set of cell definitions ([GdsStruct]s) plus library-level
/// metadata (name, spec version, units, dates).
///
/// Spec BNF:
/// ```text
/// HEADER BGNLIB LIBNAME UNITS {<structure>}* ENDLIB
/// ```
///
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GdsLibrary {
    /// Library Name
    pub name: String,
    /// Gds Spec Version
    pub version: i16,
    /// Modification & Access Dates & Times
    pub dates: GdsDateTimes,
    /// Spatial Units
    pub units: GdsUnits,
    /// Struct Definitions
    pub structs: Vec<GdsStruct>,
}
impl GdsLibrary {
    /// Create a new and empty [GdsLibrary]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 600,
            ..Default::default()
        }
    }
    /// Read a [GdsLibrary] from the file at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<GdsLibrary> {
        GdsParser::open(fname)?.parse_lib()
    }
    /// Read a [GdsLibrary] from byte-slice `bytes`
    pub fn from_bytes(bytes: &[u8]) -> GdsResult<GdsLibrary> {
        GdsParser::from_bytes(bytes)?.parse_lib()
    }
    /// Save to file `fname`
    pub fn save(&self, fname: impl AsRef<Path>) -> GdsResult<()> {
        let mut wr = GdsWriter::open(fname)?;
        wr.write_lib(self)
    }
    /// Write to destination `dest`
    pub fn write(&self, dest: impl Write) -> GdsResult<()> {
        let mut wr = GdsWriter::new(dest);
        wr.write_lib(self)
    }
}
// Enable serialization of the library tree to file, in each of the
// `phot21utils`-supported formats.
impl SerdeFile for GdsLibrary {}

/// # Gds Context
/// Enumeration of the contexts in which a record can be parsed,
/// primarily for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdsContext {
    Library,
    Struct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Property,
}

/// # GdsResult Type-Alias
pub type GdsResult<T> = Result<T, GdsError>;

/// # Gds Error Enumeration
/// Most errors are tied to parsing and decoding; a valid in-memory
/// [GdsLibrary] can generally always be streamed back to bytes.
#[derive(Debug)]
pub enum GdsError {
    /// Invalid binary-to-record conversion
    RecordDecode(GdsRecordKind, GdsDataType, u16),
    /// Invalid record length
    RecordLen(usize),
    /// Invalid data-type byte
    InvalidDataType(u8),
    /// Invalid record-type byte
    InvalidRecordType(u8),
    /// Spec-valid but unsupported feature
    Unsupported(Option<GdsRecordKind>, Option<GdsContext>),
    /// Parser Errors
    Parse {
        msg: String,
        record: GdsRecord,
        recordnum: usize,
        ctx: Vec<GdsContext>,
    },
    /// Boxed (External) Errors
    Boxed(Box<dyn Error + Send + Sync>),
    /// Uncategorized errors, with message
    Str(String),
}
impl std::fmt::Display for GdsError {
    /// Delegate to the (derived) [std::fmt::Debug] implementation.
    /// Perhaps more info than wanted in some cases, but certainly enough.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for GdsError {}
impl From<std::io::Error> for GdsError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<std::str::Utf8Error> for GdsError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<String> for GdsError {
    fn from(e: String) -> Self {
        GdsError::Str(e)
    }
}
impl From<&str> for GdsError {
    fn from(e: &str) -> Self {
        GdsError::Str(e.to_string())
    }
}
impl From<phot21utils::ser::Error> for GdsError {
    fn from(e: phot21utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}

/// Helper for "do not serialize default `false` booleans",
/// in the function form that `#[serde(skip_serializing_if)]` requires.
fn is_false(b: &bool) -> bool {
    !b
}

#[cfg(any(test, feature = "selftest"))]
/// Check `lib` matches across a write-read round-trip cycle
pub fn roundtrip(lib: &GdsLibrary) -> GdsResult<()> {
    use std::io::{Read, Seek, SeekFrom};
    use tempfile::tempfile;

    // Write to a temporary file
    let mut file = tempfile()?;
    lib.write(&mut file)?;

    // Rewind to the file-start, and read it back
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let lib2 = GdsLibrary::from_bytes(&bytes)?;

    // And check the two line up
    assert_eq!(*lib, lib2);
    Ok(())
}
