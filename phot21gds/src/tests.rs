// Crates.io
use chrono::NaiveDate;

// Local Imports
use crate::data::*;
use crate::read::GdsParser;

/// Specified creation date for test cases
fn test_dates() -> GdsDateTimes {
    let test_date: GdsDateTime = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 1)
        .unwrap()
        .into();
    GdsDateTimes {
        modified: test_date.clone(),
        accessed: test_date,
    }
}
/// Create an empty library with known dates
fn empty_lib() -> GdsLibrary {
    let mut lib = GdsLibrary::new("empty");
    // Set its dates to some known value, so we can check it round-trips
    lib.dates = test_dates();
    lib
}

#[test]
fn floats() -> GdsResult<()> {
    // Test conversions between normal-human and GDSII floating-point formats
    let f = GdsFloat64::encode(0.0);
    assert_eq!(f, 0);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 0.0);
    // One is the canonical worked example: 0x4110_0000_0000_0000
    let f = GdsFloat64::encode(1.0);
    assert_eq!(f, 0x4110_0000_0000_0000);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 1.0);
    let f = GdsFloat64::encode(1e-9);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 1e-9);
    let f = GdsFloat64::encode(-0.69);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, -0.69);
    let f = GdsFloat64::encode(-33.33e-33);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, -33.33e-33);
    Ok(())
}

#[test]
fn empty_lib_roundtrip() -> GdsResult<()> {
    roundtrip(&empty_lib())
}

#[test]
fn it_round_trips_elements() -> GdsResult<()> {
    // Build a library exercising each element variant, and round-trip it
    let mut lib = empty_lib();
    lib.name = "elements".into();

    let mut leaf = GdsStruct::new("leaf");
    leaf.dates = test_dates();
    leaf.elems.push(
        GdsBoundary {
            layer: 1,
            datatype: 0,
            xy: GdsPoint::parse_vec(&[0, 0, 10, 0, 10, 10, 0, 10, 0, 0])?,
            ..Default::default()
        }
        .into(),
    );
    leaf.elems.push(
        GdsPath {
            layer: 2,
            datatype: 0,
            width: Some(50),
            path_type: Some(0),
            xy: GdsPoint::parse_vec(&[0, 0, 1000, 0])?,
            ..Default::default()
        }
        .into(),
    );
    leaf.elems.push(
        GdsTextElem {
            string: "o1".into(),
            layer: 66,
            texttype: 0,
            xy: GdsPoint::new(0, 0),
            ..Default::default()
        }
        .into(),
    );
    lib.structs.push(leaf);

    let mut top = GdsStruct::new("top");
    top.dates = test_dates();
    top.elems.push(
        GdsStructRef {
            name: "leaf".into(),
            xy: GdsPoint::new(11_000, 11_000),
            strans: Some(GdsStrans {
                reflected: true,
                angle: Some(90.0),
                ..Default::default()
            }),
            ..Default::default()
        }
        .into(),
    );
    top.elems.push(
        GdsArrayRef {
            name: "leaf".into(),
            xy: [
                GdsPoint::new(0, 0),
                GdsPoint::new(40_000, 0),
                GdsPoint::new(0, 20_000),
            ],
            cols: 4,
            rows: 2,
            ..Default::default()
        }
        .into(),
    );
    lib.structs.push(top);

    roundtrip(&lib)
}

#[test]
fn it_round_trips_properties() -> GdsResult<()> {
    let mut lib = empty_lib();
    lib.name = "props".into();
    let mut cell = GdsStruct::new("cell");
    cell.dates = test_dates();
    cell.elems.push(
        GdsBoundary {
            layer: 1,
            xy: GdsPoint::parse_vec(&[0, 0, 10, 0, 10, 10, 0, 0])?,
            properties: vec![GdsProperty {
                attr: 2,
                value: "some property".into(),
            }],
            ..Default::default()
        }
        .into(),
    );
    lib.structs.push(cell);
    roundtrip(&lib)
}

#[test]
fn odd_strings_pad() -> GdsResult<()> {
    // Odd-length strings get a trailing zero-byte on disk,
    // which must be stripped back off at parse-time
    let mut lib = empty_lib();
    lib.name = "odd".into();
    let mut cell = GdsStruct::new("abc");
    cell.dates = test_dates();
    cell.elems.push(
        GdsTextElem {
            string: "xyz".into(),
            layer: 66,
            texttype: 0,
            xy: GdsPoint::new(0, 0),
            ..Default::default()
        }
        .into(),
    );
    lib.structs.push(cell);
    roundtrip(&lib)
}

#[test]
fn preserves_invalid_dates() -> GdsResult<()> {
    // Calendar-invalid date fields are stored and round-tripped as-is
    let mut lib = empty_lib();
    let weird = GdsDateTime {
        year: 0,
        month: 30,
        day: 99,
        hour: 17,
        minute: 49,
        second: 18,
    };
    lib.dates = GdsDateTimes {
        modified: weird.clone(),
        accessed: weird.clone(),
    };
    roundtrip(&lib)?;

    // And again through the byte-level API, checking field values
    let mut bytes = Vec::new();
    lib.write(&mut bytes)?;
    let lib2 = GdsLibrary::from_bytes(&bytes)?;
    assert_eq!(lib2.dates.modified, weird);
    Ok(())
}

#[test]
/// Test too-long record length (>16K) generates an error
fn record_too_long() -> GdsResult<()> {
    let mut lib = GdsLibrary::new("mylib");
    let mut newcell = GdsStruct::new("mycell");
    newcell.elems.push(
        GdsBoundary {
            xy: GdsPoint::parse_vec(&vec![0; 20_000])?,
            ..GdsBoundary::default()
        }
        .into(),
    );
    lib.structs.push(newcell);
    // This should generate [GdsError::RecordLen]
    match roundtrip(&lib) {
        Err(GdsError::RecordLen(_)) => Ok(()),
        Ok(_) | Err(_) => Err(GdsError::Str(
            "should generate a [GdsError::RecordLen] error".into(),
        )),
    }
}

#[test]
fn rejects_unsupported_records() {
    // A NODE record (kind 0x15) is spec-valid but unsupported here
    let bytes = [0x00, 0x04, 0x15, 0x00];
    match GdsParser::from_bytes(&bytes) {
        Err(GdsError::Unsupported(Some(GdsRecordKind::Node), _)) => (),
        other => panic!("expected an unsupported-record error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn rejects_truncated_libraries() {
    // Hitting end-of-file before the closing ENDLIB record is a decode error
    let mut bytes = Vec::new();
    empty_lib().write(&mut bytes).unwrap();
    // Drop the trailing four-byte ENDLIB record
    bytes.truncate(bytes.len() - 4);
    assert!(GdsLibrary::from_bytes(&bytes).is_err());
}

#[test]
fn rejects_odd_record_lengths() {
    // Record lengths must be even and at least four
    let bytes = [0x00, 0x05, 0x00, 0x02];
    match GdsParser::from_bytes(&bytes) {
        Err(GdsError::RecordLen(5)) => (),
        other => panic!("expected a record-length error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn it_serializes_to_json() -> GdsResult<()> {
    // Check the library tree JSON round-trips via [serde]
    let lib = empty_lib();
    let json = serde_json::to_string(&lib).unwrap();
    let lib2: GdsLibrary = serde_json::from_str(&json).unwrap();
    assert_eq!(lib, lib2);

    // And through the [SerdeFile] file-IO layer
    use phot21utils::{SerdeFile, SerializationFormat};
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("lib.json");
    SerdeFile::save(&lib, SerializationFormat::Json, &path)?;
    let lib3 = <GdsLibrary as SerdeFile>::open(&path, SerializationFormat::Json)?;
    assert_eq!(lib, lib3);
    Ok(())
}
