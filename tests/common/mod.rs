#![allow(dead_code)]

use std::{
    fs,
    io::{Cursor, Write},
    path::Path,
};

use shapefile::{
    Point, Polygon, PolygonRing,
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
};
use zip::{ZipWriter, write::SimpleFileOptions};

/// One precinct square for a test archive.
pub struct Precinct {
    pub number: i64,
    pub name: &'static str,
    pub district: i64,
    pub population: i64,
    /// Lower-left corner (lon, lat); squares are 0.1 degrees wide.
    pub origin: (f64, f64),
}

/// Three precincts in a row plus a precinct 0 that must never reach the map.
pub fn lewis_precincts() -> Vec<Precinct> {
    vec![
        Precinct { number: 1, name: "Adna", district: 20, population: 1200, origin: (-122.9, 46.5) },
        Precinct { number: 2, name: "Bunker", district: 19, population: 800, origin: (-122.8, 46.5) },
        Precinct { number: 3, name: "Cinebar", district: 35, population: 450, origin: (-122.7, 46.5) },
        Precinct { number: 0, name: "Unassigned", district: 0, population: 0, origin: (-122.6, 46.5) },
    ]
}

fn field(name: &str) -> FieldName {
    FieldName::try_from(name).unwrap()
}

fn square((x, y): (f64, f64)) -> Polygon {
    Polygon::new(PolygonRing::Outer(vec![
        Point::new(x, y),
        Point::new(x, y + 0.1),
        Point::new(x + 0.1, y + 0.1),
        Point::new(x + 0.1, y),
        Point::new(x, y),
    ]))
}

/// Write `precincts` as a shapefile and zip it; returns the archive bytes.
pub fn archive_bytes(dir: &Path, precincts: &[Precinct]) -> Vec<u8> {
    let shp_path = dir.join("precincts.shp");
    {
        let table = TableWriterBuilder::new()
            .add_numeric_field(field("PRECINCT_N"), 10, 0)
            .add_character_field(field("PRECINCT"), 40)
            .add_numeric_field(field("LEGISLATIV"), 4, 0)
            .add_numeric_field(field("POPULATION"), 10, 0);
        let mut writer = shapefile::Writer::from_path(&shp_path, table).unwrap();
        for precinct in precincts {
            let mut record = Record::default();
            record.insert("PRECINCT_N".into(), FieldValue::Numeric(Some(precinct.number as f64)));
            record.insert("PRECINCT".into(), FieldValue::Character(Some(precinct.name.to_string())));
            record.insert("LEGISLATIV".into(), FieldValue::Numeric(Some(precinct.district as f64)));
            record.insert("POPULATION".into(), FieldValue::Numeric(Some(precinct.population as f64)));
            writer.write_shape_and_record(&square(precinct.origin), &record).unwrap();
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for ext in ["shp", "shx", "dbf"] {
        let bytes = fs::read(shp_path.with_extension(ext)).unwrap();
        zip.start_file(format!("precincts.{ext}"), SimpleFileOptions::default()).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Write `contents` under `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
