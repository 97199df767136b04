//!
//! # GDSII Byte-Encoding and Writing
//!

// Std-Lib Imports
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Crates.io
use byteorder::{BigEndian, WriteBytesExt};

// Local Imports
use crate::data::*;

/// # GdsWriter
/// Streams a [GdsLibrary] tree onto a [Write] destination,
/// record by record, without an intermediate record-vector.
pub struct GdsWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
}
impl<'wr> GdsWriter<'wr> {
    /// Create a new [GdsWriter] with destination file `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        let file = BufWriter::new(File::create(fname)?);
        Ok(Self::new(file))
    }
    /// Create a new [GdsWriter] to destination `dest`
    pub fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
        }
    }
    /// Write [GdsLibrary] `lib` to the destination.
    /// Fields are written in the GDS-recommended order.
    pub fn write_lib(&mut self, lib: &GdsLibrary) -> GdsResult<()> {
        self.write_record(&GdsRecord::Header {
            version: lib.version,
        })?;
        self.write_record(&GdsRecord::BgnLib {
            dates: lib.dates.encode(),
        })?;
        self.write_record(&GdsRecord::LibName(lib.name.clone()))?;
        self.write_record(&GdsRecord::Units(lib.units.0, lib.units.1))?;
        for strukt in lib.structs.iter() {
            self.write_struct(strukt)?;
        }
        self.write_record(&GdsRecord::EndLib)?;
        self.flush()
    }
    /// Write [GdsStruct] `strukt` to the destination
    pub fn write_struct(&mut self, strukt: &GdsStruct) -> GdsResult<()> {
        self.write_record(&GdsRecord::BgnStruct {
            dates: strukt.dates.encode(),
        })?;
        self.write_record(&GdsRecord::StructName(strukt.name.clone()))?;
        for elem in strukt.elems.iter() {
            self.write_element(elem)?;
        }
        self.write_record(&GdsRecord::EndStruct)
    }
    /// Write [GdsElement] `elem`, in the record order its spec BNF dictates
    fn write_element(&mut self, elem: &GdsElement) -> GdsResult<()> {
        match elem {
            GdsElement::GdsBoundary(b) => {
                self.write_record(&GdsRecord::Boundary)?;
                self.write_record(&GdsRecord::Layer(b.layer))?;
                self.write_record(&GdsRecord::DataType(b.datatype))?;
                self.write_record(&GdsRecord::Xy(GdsPoint::flatten_vec(&b.xy)))?;
                self.write_end_element(&b.properties)
            }
            GdsElement::GdsPath(p) => {
                self.write_record(&GdsRecord::Path)?;
                self.write_record(&GdsRecord::Layer(p.layer))?;
                self.write_record(&GdsRecord::DataType(p.datatype))?;
                if let Some(e) = p.path_type {
                    self.write_record(&GdsRecord::PathType(e))?;
                }
                if let Some(e) = p.width {
                    self.write_record(&GdsRecord::Width(e))?;
                }
                if let Some(e) = p.begin_extn {
                    self.write_record(&GdsRecord::BeginExtn(e))?;
                }
                if let Some(e) = p.end_extn {
                    self.write_record(&GdsRecord::EndExtn(e))?;
                }
                self.write_record(&GdsRecord::Xy(GdsPoint::flatten_vec(&p.xy)))?;
                self.write_end_element(&p.properties)
            }
            GdsElement::GdsStructRef(sref) => {
                self.write_record(&GdsRecord::StructRef)?;
                self.write_record(&GdsRecord::StructRefName(sref.name.clone()))?;
                if let Some(ref e) = sref.strans {
                    self.write_strans(e)?;
                }
                self.write_record(&GdsRecord::Xy(sref.xy.flatten()))?;
                self.write_end_element(&sref.properties)
            }
            GdsElement::GdsArrayRef(aref) => {
                self.write_record(&GdsRecord::ArrayRef)?;
                self.write_record(&GdsRecord::StructRefName(aref.name.clone()))?;
                if let Some(ref e) = aref.strans {
                    self.write_strans(e)?;
                }
                self.write_record(&GdsRecord::ColRow {
                    cols: aref.cols,
                    rows: aref.rows,
                })?;
                let mut xy = aref.xy[0].flatten();
                xy.extend(aref.xy[1].flatten());
                xy.extend(aref.xy[2].flatten());
                self.write_record(&GdsRecord::Xy(xy))?;
                self.write_end_element(&aref.properties)
            }
            GdsElement::GdsTextElem(t) => {
                self.write_record(&GdsRecord::Text)?;
                self.write_record(&GdsRecord::Layer(t.layer))?;
                self.write_record(&GdsRecord::TextType(t.texttype))?;
                if let Some(ref e) = t.presentation {
                    self.write_record(&GdsRecord::Presentation(e.0, e.1))?;
                }
                if let Some(ref e) = t.strans {
                    self.write_strans(e)?;
                }
                self.write_record(&GdsRecord::Xy(t.xy.flatten()))?;
                self.write_record(&GdsRecord::String(t.string.clone()))?;
                self.write_end_element(&t.properties)
            }
        }
    }
    /// Write a [GdsStrans] as its flag-record plus optional Mag and Angle
    fn write_strans(&mut self, strans: &GdsStrans) -> GdsResult<()> {
        self.write_record(&GdsRecord::Strans(
            (strans.reflected as u8) << 7,
            (strans.abs_mag as u8) << 2 | (strans.abs_angle as u8) << 1,
        ))?;
        if let Some(mag) = strans.mag {
            self.write_record(&GdsRecord::Mag(mag))?;
        }
        if let Some(angle) = strans.angle {
            self.write_record(&GdsRecord::Angle(angle))?;
        }
        Ok(())
    }
    /// Write the trailing properties and ENDEL terminating an element
    fn write_end_element(&mut self, props: &[GdsProperty]) -> GdsResult<()> {
        for prop in props.iter() {
            self.write_record(&GdsRecord::PropAttr(prop.attr))?;
            self.write_record(&GdsRecord::PropValue(prop.value.clone()))?;
        }
        self.write_record(&GdsRecord::EndElement)
    }
    /// Encode `record` into bytes and write onto `dest`.
    /// Split in two parts, header and data, largely to ease handling the
    /// variety of data-types.
    fn write_record(&mut self, record: &GdsRecord) -> GdsResult<()> {
        // A quick closure for GDS's "even-lengths-only allowed" strings
        let gds_strlen = |s: &str| -> usize { s.len() + s.len() % 2 };
        // First grab the header info: record-kind, data-type, and length
        use GdsDataType::{BitArray, NoData, Str, F64, I16, I32};
        let (kind, dtype, len) = match record {
            // Library-Level Records
            GdsRecord::Header { .. } => (GdsRecordKind::Header, I16, 2),
            GdsRecord::BgnLib { .. } => (GdsRecordKind::BgnLib, I16, 24),
            GdsRecord::LibName(s) => (GdsRecordKind::LibName, Str, gds_strlen(s)),
            GdsRecord::Units(..) => (GdsRecordKind::Units, F64, 16),
            GdsRecord::EndLib => (GdsRecordKind::EndLib, NoData, 0),

            // Structure (Cell) Level Records
            GdsRecord::BgnStruct { .. } => (GdsRecordKind::BgnStruct, I16, 24),
            GdsRecord::StructName(s) => (GdsRecordKind::StructName, Str, gds_strlen(s)),
            GdsRecord::StructRefName(s) => (GdsRecordKind::StructRefName, Str, gds_strlen(s)),
            GdsRecord::EndStruct => (GdsRecordKind::EndStruct, NoData, 0),

            // Element-Level Records
            GdsRecord::Boundary => (GdsRecordKind::Boundary, NoData, 0),
            GdsRecord::Path => (GdsRecordKind::Path, NoData, 0),
            GdsRecord::StructRef => (GdsRecordKind::StructRef, NoData, 0),
            GdsRecord::ArrayRef => (GdsRecordKind::ArrayRef, NoData, 0),
            GdsRecord::Text => (GdsRecordKind::Text, NoData, 0),
            GdsRecord::Layer(_) => (GdsRecordKind::Layer, I16, 2),
            GdsRecord::DataType(_) => (GdsRecordKind::DataType, I16, 2),
            GdsRecord::Width(_) => (GdsRecordKind::Width, I32, 4),
            GdsRecord::Xy(d) => (GdsRecordKind::Xy, I32, 4 * d.len()),
            GdsRecord::EndElement => (GdsRecordKind::EndElement, NoData, 0),

            // Element attributes
            GdsRecord::ColRow { .. } => (GdsRecordKind::ColRow, I16, 4),
            GdsRecord::TextType(_) => (GdsRecordKind::TextType, I16, 2),
            GdsRecord::Presentation(..) => (GdsRecordKind::Presentation, BitArray, 2),
            GdsRecord::String(s) => (GdsRecordKind::String, Str, gds_strlen(s)),
            GdsRecord::Strans(..) => (GdsRecordKind::Strans, BitArray, 2),
            GdsRecord::Mag(_) => (GdsRecordKind::Mag, F64, 8),
            GdsRecord::Angle(_) => (GdsRecordKind::Angle, F64, 8),
            GdsRecord::PathType(_) => (GdsRecordKind::PathType, I16, 2),
            GdsRecord::BeginExtn(_) => (GdsRecordKind::BeginExtn, I32, 4),
            GdsRecord::EndExtn(_) => (GdsRecordKind::EndExtn, I32, 4),
            GdsRecord::PropAttr(_) => (GdsRecordKind::PropAttr, I16, 2),
            GdsRecord::PropValue(s) => (GdsRecordKind::PropValue, Str, gds_strlen(s)),
        };
        // Send those header-bytes to the writer.
        // Include the four header bytes in total-length.
        match u16::try_from(len + 4) {
            Ok(val) => self.dest.write_u16::<BigEndian>(val)?,
            Err(_) => return Err(GdsError::RecordLen(len)),
        };
        self.dest.write_u8(kind as u8)?;
        self.dest.write_u8(dtype as u8)?;

        // Now write the data portion.
        // This section is generally organized by data-type.
        match record {
            // NoData
            GdsRecord::EndLib
            | GdsRecord::EndStruct
            | GdsRecord::Boundary
            | GdsRecord::Path
            | GdsRecord::StructRef
            | GdsRecord::ArrayRef
            | GdsRecord::Text
            | GdsRecord::EndElement => (),

            // BitArrays
            GdsRecord::Presentation(d0, d1) | GdsRecord::Strans(d0, d1) => {
                self.dest.write_u8(*d0)?;
                self.dest.write_u8(*d1)?;
            }
            // Single I16s
            GdsRecord::Header { version: d }
            | GdsRecord::Layer(d)
            | GdsRecord::DataType(d)
            | GdsRecord::TextType(d)
            | GdsRecord::PathType(d)
            | GdsRecord::PropAttr(d) => self.dest.write_i16::<BigEndian>(*d)?,

            // Single I32s
            GdsRecord::Width(d) | GdsRecord::BeginExtn(d) | GdsRecord::EndExtn(d) => {
                self.dest.write_i32::<BigEndian>(*d)?
            }
            // Single F64s
            GdsRecord::Mag(d) | GdsRecord::Angle(d) => {
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d))?
            }
            // "Structs"
            GdsRecord::Units(d0, d1) => {
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d0))?;
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d1))?;
            }
            GdsRecord::ColRow { cols, rows } => {
                self.dest.write_i16::<BigEndian>(*cols)?;
                self.dest.write_i16::<BigEndian>(*rows)?;
            }
            // Vectors
            GdsRecord::BgnLib { dates: d } | GdsRecord::BgnStruct { dates: d } => {
                for val in d.iter() {
                    self.dest.write_i16::<BigEndian>(*val)?;
                }
            }
            GdsRecord::Xy(d) => {
                for val in d.iter() {
                    self.dest.write_i32::<BigEndian>(*val)?;
                }
            }
            // Strings
            GdsRecord::LibName(s)
            | GdsRecord::StructName(s)
            | GdsRecord::StructRefName(s)
            | GdsRecord::String(s)
            | GdsRecord::PropValue(s) => {
                self.dest.write_all(s.as_bytes())?;
                if s.len() % 2 != 0 {
                    // Pad odd-length strings with a zero-valued byte
                    self.dest.write_u8(0x00)?;
                }
            }
        };
        Ok(())
    }
    /// Flush the destination
    fn flush(&mut self) -> GdsResult<()> {
        self.dest.flush()?;
        Ok(())
    }
}
