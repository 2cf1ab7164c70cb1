use std::io::{Cursor, Read, Seek};

use serde_json::{Number, Value};
use shapefile::{ShapeReader, dbase::{self, FieldValue}};
use zip::{ZipArchive, result::ZipError};

use crate::error::DecodeError;

use super::{feature::{Feature, FeatureCollection, Properties}, polygon::shape_to_geometry};

/// Largest archive member read into memory.
const MAX_ENTRY_BYTES: u64 = 512 * 1024 * 1024;

/// Cap on the up-front buffer; the declared size is only a hint.
const PREALLOCATE_BYTES: u64 = 16 * 1024 * 1024;

/// Raw files of one shapefile found inside an archive.
struct Components {
    shp: Vec<u8>,
    shx: Option<Vec<u8>>,
    dbf: Vec<u8>,
    prj: Option<String>,
}

/// Decode a zipped shapefile archive into a feature collection.
///
/// The first `.shp` in the archive (by name) is used, together with the `.dbf`,
/// `.shx` and `.prj` files sharing its stem.
pub fn decode_archive(bytes: &[u8]) -> Result<FeatureCollection, DecodeError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let components = find_components(&mut archive)?;

    let shape_reader = match components.shx {
        Some(shx) => ShapeReader::with_shx(Cursor::new(components.shp), Cursor::new(shx))?,
        None => ShapeReader::new(Cursor::new(components.shp))?,
    };
    let dbase_reader = dbase::Reader::new(Cursor::new(components.dbf))?;
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);

    let mut features = Vec::new();
    let mut skipped = 0usize;
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item?;
        match shape_to_geometry(shape)? {
            Some(geometry) => features.push(Feature::new(geometry, record_to_properties(record))),
            None => skipped += 1,
        }
    }

    tracing::debug!(features = features.len(), null_shapes = skipped, "[geometry::decode] archive decoded");
    Ok(FeatureCollection { features, projection: components.prj })
}

fn find_components<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Components, DecodeError> {
    let mut names: Vec<String> = archive.file_names()
        .filter(|name| !name.starts_with("__MACOSX"))
        .map(str::to_string)
        .collect();
    names.sort();

    let shp_name = names.iter()
        .find(|name| has_extension(name, "shp"))
        .ok_or(DecodeError::MissingComponent("shp"))?
        .clone();
    let stem = &shp_name[..shp_name.len() - ".shp".len()];

    let sibling = |ext: &str| -> Option<String> {
        names.iter()
            .find(|name| name.len() == stem.len() + 1 + ext.len()
                && name.starts_with(stem)
                && has_extension(name, ext))
            .cloned()
    };
    let dbf_name = sibling("dbf").ok_or(DecodeError::MissingComponent("dbf"))?;
    let shx_name = sibling("shx");
    let prj_name = sibling("prj");

    let shp = read_entry(archive, &shp_name)?;
    let dbf = read_entry(archive, &dbf_name)?;
    let shx = shx_name.map(|name| read_entry(archive, &name)).transpose()?;
    let prj = prj_name
        .map(|name| read_entry(archive, &name))
        .transpose()?
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string());

    Ok(Components { shp, shx, dbf, prj })
}

fn has_extension(name: &str, ext: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext))
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>, DecodeError> {
    read_entry_limited(archive, name, MAX_ENTRY_BYTES)
}

/// Read one member, refusing more than `limit` bytes whatever size the archive declares.
fn read_entry_limited<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str, limit: u64) -> Result<Vec<u8>, DecodeError> {
    let oversized = || DecodeError::Oversized { name: name.to_string(), limit };
    let file = archive.by_name(name)?;
    if file.size() > limit {
        return Err(oversized());
    }
    let mut buf = Vec::with_capacity(file.size().min(PREALLOCATE_BYTES) as usize);
    file.take(limit + 1).read_to_end(&mut buf).map_err(ZipError::from)?;
    if buf.len() as u64 > limit {
        return Err(oversized());
    }
    Ok(buf)
}

/// Flatten a dBase record into JSON properties.
fn record_to_properties(record: dbase::Record) -> Properties {
    record.into_iter()
        .map(|(field, value)| (field, field_to_json(value)))
        .collect()
}

fn field_to_json(value: FieldValue) -> Value {
    fn number(x: f64) -> Value {
        Number::from_f64(x).map_or(Value::Null, Value::Number)
    }

    fn date(d: &dbase::Date) -> Value {
        Value::String(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
    }

    match value {
        FieldValue::Character(s) => s.map(|s| Value::String(s.trim().to_string())).unwrap_or(Value::Null),
        FieldValue::Memo(s) => Value::String(s),
        FieldValue::Numeric(n) => n.map_or(Value::Null, number),
        FieldValue::Float(n) => n.map_or(Value::Null, |x| number(f64::from(x))),
        FieldValue::Double(x) | FieldValue::Currency(x) => number(x),
        FieldValue::Integer(i) => Value::from(i),
        FieldValue::Logical(b) => b.map_or(Value::Null, Value::Bool),
        FieldValue::Date(d) => d.as_ref().map_or(Value::Null, date),
        FieldValue::DateTime(dt) => date(&dt.date()),
    }
}
