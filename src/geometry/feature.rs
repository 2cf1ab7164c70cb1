use geo::{MultiPolygon, Point};
use serde_json::{Map, Value, json};

use crate::types::{PrecinctId, count_from_value};

/// Attribute holding the precinct number.
pub const PRECINCT_NUMBER: &str = "PRECINCT_N";
/// Attribute holding the precinct name.
pub const PRECINCT_NAME: &str = "PRECINCT";
/// Attribute holding the legislative district.
pub const LEGISLATIVE_DISTRICT: &str = "LEGISLATIV";
/// Attribute holding the population count.
pub const POPULATION: &str = "POPULATION";

/// Flat attribute map of one feature.
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(MultiPolygon<f64>),
    Point(Point<f64>),
}

/// One decoded shape with its attribute record.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self { geometry, properties }
    }

    /// Canonical precinct id, `None` when the attribute is missing or empty.
    pub fn precinct_id(&self) -> Option<PrecinctId> {
        self.properties.get(PRECINCT_NUMBER).and_then(PrecinctId::from_json)
    }

    pub fn precinct_name(&self) -> Option<String> {
        self.text(PRECINCT_NAME)
    }

    /// District as text, so numeric and character attributes compare alike.
    pub fn legislative_district(&self) -> Option<String> {
        self.text(LEGISLATIVE_DISTRICT)
    }

    pub fn population(&self) -> Option<u64> {
        self.properties.get(POPULATION)
            .filter(|v| !v.is_null())
            .map(count_from_value)
    }

    fn text(&self, key: &str) -> Option<String> {
        let text = match self.properties.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.to_string(),
                // dBase numerics decode as floats; `20.0` names district 20
                (None, Some(x)) if x.fract() == 0.0 && x.abs() < 1e15 => format!("{}", x as i64),
                _ => n.to_string(),
            },
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Decoded features plus the archive's projection text, if it carried one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub projection: Option<String>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// GeoJSON `FeatureCollection` value.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self.features.iter()
            .map(|feature| json!({
                "type": "Feature",
                "geometry": geometry_to_geojson(&feature.geometry),
                "properties": Value::Object(feature.properties.clone()),
            }))
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

fn geometry_to_geojson(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": [p.x(), p.y()] }),
        Geometry::Polygon(mp) => {
            let polygons: Vec<Value> = mp.0.iter()
                .map(|polygon| {
                    let mut rings = vec![ring_coords(polygon.exterior())];
                    rings.extend(polygon.interiors().iter().map(ring_coords));
                    Value::Array(rings)
                })
                .collect();
            json!({ "type": "MultiPolygon", "coordinates": polygons })
        }
    }
}

fn ring_coords(ring: &geo::LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}
