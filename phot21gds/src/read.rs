//!
//! # GDSII Reading & Parsing
//!

// Std-Lib Imports
use std::fs::File;
use std::io::{BufReader, Read};
use std::mem;
use std::path::Path;

// Crates.io
use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

// Local Imports
use crate::data::*;

/// # GdsReader
/// Decodes a binary record stream from any [Read] source,
/// one [GdsRecord] at a time.
pub struct GdsReader<R: Read> {
    /// Source being read
    src: R,
    /// Reusable read/conversion buffer
    buf: Vec<u8>,
}
impl GdsReader<BufReader<File>> {
    /// Create a [GdsReader] over the file at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        Ok(Self::new(BufReader::new(File::open(fname)?)))
    }
}
impl<R: Read> GdsReader<R> {
    /// Create a [GdsReader] over `src`
    pub fn new(src: R) -> Self {
        Self {
            src,
            buf: Vec::new(),
        }
    }
    /// Read the next record-header from our source.
    /// Returns a [GdsRecordHeader] if successful.
    fn read_record_header(&mut self) -> GdsResult<GdsRecordHeader> {
        // Read the 16-bit record-size. (In bytes, including the four header bytes.)
        let len = match self.src.read_u16::<BigEndian>() {
            Err(e) => return Err(GdsError::Boxed(Box::new(e))),
            Ok(num) if num < 4 => return Err(GdsError::RecordLen(num.into())),
            Ok(num) if num % 2 != 0 => return Err(GdsError::RecordLen(num.into())),
            Ok(num) => num,
        };
        let len = len - 4; // Strip out the four header-bytes
        // Read and decode the record-kind byte
        let kind = self.src.read_u8()?;
        let kind: GdsRecordKind =
            FromPrimitive::from_u8(kind).ok_or(GdsError::InvalidRecordType(kind))?;
        if !kind.supported() {
            return Err(GdsError::Unsupported(Some(kind), None));
        }
        // Read and decode the data-type byte
        let dtype = self.src.read_u8()?;
        let dtype = FromPrimitive::from_u8(dtype).ok_or(GdsError::InvalidDataType(dtype))?;
        Ok(GdsRecordHeader { kind, dtype, len })
    }
    /// Read the next binary-encoded [GdsRecord].
    /// Returns a [GdsError] if the source is not on a record boundary,
    /// or if binary decoding otherwise fails.
    fn read_record(&mut self) -> GdsResult<GdsRecord> {
        let header = self.read_record_header()?;
        self.read_record_content(&header)
    }
    fn read_record_content(&mut self, header: &GdsRecordHeader) -> GdsResult<GdsRecord> {
        use GdsDataType::{BitArray, NoData, Str, F64, I16, I32};
        let len = header.len;
        let record: GdsRecord = match (header.kind, header.dtype, len) {
            // Library-Level Records
            (GdsRecordKind::Header, I16, 2) => GdsRecord::Header {
                version: self.read_i16(len)?[0],
            },
            (GdsRecordKind::BgnLib, I16, 24) => GdsRecord::BgnLib {
                dates: self.read_dates(len)?,
            },
            (GdsRecordKind::LibName, Str, _) => GdsRecord::LibName(self.read_str(len)?),
            (GdsRecordKind::Units, F64, 16) => {
                let v = self.read_f64(len)?;
                GdsRecord::Units(v[0], v[1])
            }
            (GdsRecordKind::EndLib, NoData, 0) => GdsRecord::EndLib,

            // Structure (Cell) Level Records
            (GdsRecordKind::BgnStruct, I16, 24) => GdsRecord::BgnStruct {
                dates: self.read_dates(len)?,
            },
            (GdsRecordKind::StructName, Str, _) => GdsRecord::StructName(self.read_str(len)?),
            (GdsRecordKind::StructRefName, Str, _) => {
                GdsRecord::StructRefName(self.read_str(len)?)
            }
            (GdsRecordKind::EndStruct, NoData, 0) => GdsRecord::EndStruct,

            // Element-Level Records
            (GdsRecordKind::Boundary, NoData, 0) => GdsRecord::Boundary,
            (GdsRecordKind::Path, NoData, 0) => GdsRecord::Path,
            (GdsRecordKind::StructRef, NoData, 0) => GdsRecord::StructRef,
            (GdsRecordKind::ArrayRef, NoData, 0) => GdsRecord::ArrayRef,
            (GdsRecordKind::Text, NoData, 0) => GdsRecord::Text,
            (GdsRecordKind::Layer, I16, 2) => GdsRecord::Layer(self.read_i16(len)?[0]),
            (GdsRecordKind::DataType, I16, 2) => GdsRecord::DataType(self.read_i16(len)?[0]),
            (GdsRecordKind::Width, I32, 4) => GdsRecord::Width(self.read_i32(len)?[0]),
            (GdsRecordKind::Xy, I32, _) => GdsRecord::Xy(self.read_i32(len)?),
            (GdsRecordKind::EndElement, NoData, 0) => GdsRecord::EndElement,

            // Element attributes
            (GdsRecordKind::ColRow, I16, 4) => {
                let d = self.read_i16(len)?;
                GdsRecord::ColRow {
                    cols: d[0],
                    rows: d[1],
                }
            }
            (GdsRecordKind::TextType, I16, 2) => GdsRecord::TextType(self.read_i16(len)?[0]),
            (GdsRecordKind::Presentation, BitArray, 2) => {
                let bytes = self.read_bytes(len)?;
                GdsRecord::Presentation(bytes[0], bytes[1])
            }
            (GdsRecordKind::String, Str, _) => GdsRecord::String(self.read_str(len)?),
            (GdsRecordKind::Strans, BitArray, 2) => {
                let bytes = self.read_bytes(len)?;
                GdsRecord::Strans(bytes[0], bytes[1])
            }
            (GdsRecordKind::Mag, F64, 8) => GdsRecord::Mag(self.read_f64(len)?[0]),
            (GdsRecordKind::Angle, F64, 8) => GdsRecord::Angle(self.read_f64(len)?[0]),
            (GdsRecordKind::PathType, I16, 2) => GdsRecord::PathType(self.read_i16(len)?[0]),
            (GdsRecordKind::BeginExtn, I32, 4) => GdsRecord::BeginExtn(self.read_i32(len)?[0]),
            (GdsRecordKind::EndExtn, I32, 4) => GdsRecord::EndExtn(self.read_i32(len)?[0]),
            (GdsRecordKind::PropAttr, I16, 2) => GdsRecord::PropAttr(self.read_i16(len)?[0]),
            (GdsRecordKind::PropValue, Str, _) => GdsRecord::PropValue(self.read_str(len)?),

            // Failing to meet any of these clauses means this is an invalid record
            _ => return Err(GdsError::RecordDecode(header.kind, header.dtype, len)),
        };
        Ok(record)
    }
    /// Read `len` bytes and convert to `String`
    fn read_str(&mut self, len: u16) -> GdsResult<String> {
        let mut data = self.read_bytes(len)?;
        // Strip the optional padding byte appended to odd-length strings
        if let Some(0x00) = data.last() {
            data.pop();
        }
        Ok(std::str::from_utf8(&data)?.into())
    }
    /// Read `len` bytes
    fn read_bytes(&mut self, len: u16) -> Result<Vec<u8>, std::io::Error> {
        let len: usize = len.into();
        let mut rv: Vec<u8> = vec![0; len];
        self.src.read_exact(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/2` i16s from `len` bytes
    fn read_i16(&mut self, len: u16) -> Result<Vec<i16>, std::io::Error> {
        let len: usize = len.into();
        self.buf.resize(len, 0);
        self.src.read_exact(&mut self.buf)?;
        let mut rv: Vec<i16> = vec![0; len / 2];
        self.buf.as_slice().read_i16_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/4` i32s from `len` bytes
    fn read_i32(&mut self, len: u16) -> Result<Vec<i32>, std::io::Error> {
        let len: usize = len.into();
        self.buf.resize(len, 0);
        self.src.read_exact(&mut self.buf)?;
        let mut rv: Vec<i32> = vec![0; len / 4];
        self.buf.as_slice().read_i32_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/8` f64s from `len` bytes, decoding GDS's float-format along the way
    fn read_f64(&mut self, len: u16) -> GdsResult<Vec<f64>> {
        let mut u64s = vec![0; usize::from(len) / 8];
        self.src.read_u64_into::<BigEndian>(&mut u64s)?;
        Ok(u64s.into_iter().map(GdsFloat64::decode).collect())
    }
    /// Read a twelve-integer date-pair payload
    fn read_dates(&mut self, len: u16) -> GdsResult<[i16; 12]> {
        let v = self.read_i16(len)?;
        v.try_into()
            .map_err(|_| GdsError::Str("invalid length for GDS date-time data".into()))
    }
}

/// # GdsParser
/// A peekable iterator which decodes [GdsRecord]s from a source, one at a
/// time, and converts them into a tree of GDS data structures.
pub struct GdsParser<R: Read> {
    /// Source being read
    rdr: GdsReader<R>,
    /// Next record, stored for peeking
    nxt: GdsRecord,
    /// Number of records read
    numread: usize,
    /// Context Stack
    ctx_stack: Vec<GdsContext>,
}
impl GdsParser<BufReader<File>> {
    /// Create a [GdsParser] for the file at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        Self::new(GdsReader::open(fname)?)
    }
}
impl<'b> GdsParser<&'b [u8]> {
    /// Create a [GdsParser] over in-memory `bytes`
    pub fn from_bytes(bytes: &'b [u8]) -> GdsResult<Self> {
        Self::new(GdsReader::new(bytes))
    }
}
impl<R: Read> GdsParser<R> {
    /// Create a [GdsParser] over `rdr`
    pub fn new(mut rdr: GdsReader<R>) -> GdsResult<Self> {
        // Decode the first record to initialize our "peeker"
        let nxt = rdr.read_record()?;
        Ok(Self {
            rdr,
            nxt,
            numread: 1,
            ctx_stack: Vec::new(),
        })
    }
    /// Advance our iterator and return the next element
    fn next(&mut self) -> GdsResult<GdsRecord> {
        if self.nxt == GdsRecord::EndLib {
            // Once we reach [EndLib], keep returning it forever
            return Ok(GdsRecord::EndLib);
        }
        // Decode a new record and swap it with our `nxt`
        let mut rv = self.rdr.read_record()?;
        mem::swap(&mut rv, &mut self.nxt);
        self.numread += 1;
        Ok(rv)
    }
    /// Peek at our next record, without advancing
    fn peek(&self) -> &GdsRecord {
        &self.nxt
    }
    /// Parse a [GdsLibrary]. Generally the start-state when reading a GDS file.
    pub fn parse_lib(&mut self) -> GdsResult<GdsLibrary> {
        self.ctx_stack.push(GdsContext::Library);
        let mut lib = GdsLibrary::default();
        // Read the header and its version data
        match self.next()? {
            GdsRecord::Header { version } => lib.version = version,
            _ => return self.fail("Invalid library: missing GDS HEADER record"),
        };
        // Read the begin-lib dates
        match self.next()? {
            GdsRecord::BgnLib { dates } => lib.dates = GdsDateTimes::from(&dates),
            _ => return self.fail("Invalid library: missing GDS BGNLIB record"),
        };
        // Iterate over all others
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndLib => break,
                GdsRecord::LibName(name) => lib.name = name,
                GdsRecord::Units(d0, d1) => lib.units = GdsUnits(d0, d1),
                GdsRecord::BgnStruct { dates } => {
                    let strukt = self.parse_struct(&dates)?;
                    lib.structs.push(strukt);
                }
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(lib)
    }
    /// Parse a cell ([GdsStruct])
    fn parse_struct(&mut self, dates: &[i16; 12]) -> GdsResult<GdsStruct> {
        self.ctx_stack.push(GdsContext::Struct);
        let mut strukt = GdsStruct {
            dates: GdsDateTimes::from(dates),
            ..Default::default()
        };
        match self.next()? {
            GdsRecord::StructName(name) => strukt.name = name,
            _ => return self.fail("Invalid struct: missing GDS STRNAME record"),
        };
        // Parse [GdsElement] records until hitting a [GdsRecord::EndStruct]
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndStruct => break,
                GdsRecord::Boundary => strukt.elems.push(self.parse_boundary()?.into()),
                GdsRecord::Path => strukt.elems.push(self.parse_path()?.into()),
                GdsRecord::Text => strukt.elems.push(self.parse_text_elem()?.into()),
                GdsRecord::StructRef => strukt.elems.push(self.parse_struct_ref()?.into()),
                GdsRecord::ArrayRef => strukt.elems.push(self.parse_array_ref()?.into()),
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(strukt)
    }
    /// Parse a [GdsBoundary]
    fn parse_boundary(&mut self) -> GdsResult<GdsBoundary> {
        self.ctx_stack.push(GdsContext::Boundary);
        let mut b = GdsBoundary::default();
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndElement => break,
                GdsRecord::Layer(d) => b.layer = d,
                GdsRecord::DataType(d) => b.datatype = d,
                GdsRecord::Xy(d) => b.xy = GdsPoint::parse_vec(&d)?,
                GdsRecord::PropAttr(attr) => b.properties.push(self.parse_property(attr)?),
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsPath]
    fn parse_path(&mut self) -> GdsResult<GdsPath> {
        self.ctx_stack.push(GdsContext::Path);
        let mut p = GdsPath::default();
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndElement => break,
                GdsRecord::Layer(d) => p.layer = d,
                GdsRecord::DataType(d) => p.datatype = d,
                GdsRecord::Xy(d) => p.xy = GdsPoint::parse_vec(&d)?,
                GdsRecord::Width(d) => p.width = Some(d),
                GdsRecord::PathType(d) => p.path_type = Some(d),
                GdsRecord::BeginExtn(d) => p.begin_extn = Some(d),
                GdsRecord::EndExtn(d) => p.end_extn = Some(d),
                GdsRecord::PropAttr(attr) => p.properties.push(self.parse_property(attr)?),
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(p)
    }
    /// Parse a [GdsTextElem].
    /// Requires the initial `Text` record has already been consumed.
    fn parse_text_elem(&mut self) -> GdsResult<GdsTextElem> {
        self.ctx_stack.push(GdsContext::Text);
        let mut t = GdsTextElem::default();
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndElement => break,
                GdsRecord::Layer(d) => t.layer = d,
                GdsRecord::TextType(d) => t.texttype = d,
                GdsRecord::Xy(d) => t.xy = GdsPoint::parse(&d)?,
                GdsRecord::String(d) => t.string = d,
                GdsRecord::Presentation(d0, d1) => t.presentation = Some(GdsPresentation(d0, d1)),
                GdsRecord::Strans(d0, d1) => t.strans = Some(self.parse_strans(d0, d1)?),
                GdsRecord::PropAttr(attr) => t.properties.push(self.parse_property(attr)?),
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(t)
    }
    /// Parse a [GdsStructRef]
    fn parse_struct_ref(&mut self) -> GdsResult<GdsStructRef> {
        self.ctx_stack.push(GdsContext::StructRef);
        let mut sref = GdsStructRef::default();
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndElement => break,
                GdsRecord::StructRefName(d) => sref.name = d,
                GdsRecord::Xy(d) => sref.xy = GdsPoint::parse(&d)?,
                GdsRecord::Strans(d0, d1) => sref.strans = Some(self.parse_strans(d0, d1)?),
                GdsRecord::PropAttr(attr) => sref.properties.push(self.parse_property(attr)?),
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(sref)
    }
    /// Parse a [GdsArrayRef]
    fn parse_array_ref(&mut self) -> GdsResult<GdsArrayRef> {
        self.ctx_stack.push(GdsContext::ArrayRef);
        let mut aref = GdsArrayRef::default();
        loop {
            let r = self.next()?;
            match r {
                GdsRecord::EndElement => break,
                GdsRecord::StructRefName(d) => aref.name = d,
                GdsRecord::ColRow { cols, rows } => {
                    aref.cols = cols;
                    aref.rows = rows;
                }
                GdsRecord::Xy(d) => {
                    // The array-reference XY must be a three-point array:
                    // origin plus column and row spanning points.
                    let v = GdsPoint::parse_vec(&d)?;
                    aref.xy = match v.try_into() {
                        Ok(xy) => xy,
                        Err(_) => return self.fail("Invalid XY for GDS array reference"),
                    };
                }
                GdsRecord::Strans(d0, d1) => aref.strans = Some(self.parse_strans(d0, d1)?),
                GdsRecord::PropAttr(attr) => aref.properties.push(self.parse_property(attr)?),
                // Invalid
                _ => return self.invalid(r),
            };
        }
        self.ctx_stack.pop();
        Ok(aref)
    }
    /// Parse a [GdsStrans] from records. Flag bytes are passed as arguments `d0`, `d1`.
    fn parse_strans(&mut self, d0: u8, d1: u8) -> GdsResult<GdsStrans> {
        // Decode the two flag bytes
        let mut s = GdsStrans {
            reflected: d0 & 0x80 != 0,
            abs_mag: d1 & 0x04 != 0,
            abs_angle: d1 & 0x02 != 0,
            ..Default::default()
        };
        // And parse optional magnitude & angle
        loop {
            match self.peek() {
                GdsRecord::Mag(d) => {
                    s.mag = Some(*d);
                    self.next()?;
                }
                GdsRecord::Angle(d) => {
                    s.angle = Some(*d);
                    self.next()?;
                }
                _ => break,
            }
        }
        Ok(s)
    }
    /// Parse a [GdsProperty].
    /// Numeric attribute `attr` is collected beforehand, as its record is
    /// the indication to parse an (attr, value) pair.
    fn parse_property(&mut self, attr: i16) -> GdsResult<GdsProperty> {
        self.ctx_stack.push(GdsContext::Property);
        // `PropAttr` records must immediately be followed by `PropValue`
        let value = if let GdsRecord::PropValue(v) = self.next()? {
            v
        } else {
            return self.fail("GDS PROPATTR without a PROPVALUE record");
        };
        self.ctx_stack.pop();
        Ok(GdsProperty { attr, value })
    }
    /// Error helper for an invalid record
    fn invalid<T>(&mut self, record: GdsRecord) -> GdsResult<T> {
        Err(GdsError::Parse {
            msg: "Invalid GDS Record".into(),
            record,
            recordnum: self.numread,
            ctx: self.ctx_stack.clone(),
        })
    }
    /// Error helper. Create a Parse error
    fn err(&mut self, msg: impl Into<String>) -> GdsError {
        GdsError::Parse {
            msg: msg.into(),
            record: self.peek().clone(),
            recordnum: self.numread,
            ctx: self.ctx_stack.clone(),
        }
    }
    /// Return failure
    fn fail<T>(&mut self, msg: impl Into<String>) -> GdsResult<T> {
        Err(self.err(msg))
    }
}
