use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use shapefile::{PolygonRing, Shape};

use crate::error::DecodeError;

use super::feature::Geometry;

/// Convert a decoded shape into a renderable geometry.
/// Null shapes yield `Ok(None)`; line and multipoint shapes are not precinct geometry.
pub(crate) fn shape_to_geometry(shape: Shape) -> Result<Option<Geometry>, DecodeError> {
    // One ring of any point flavour as (coords, is_exterior).
    macro_rules! rings {
        ($polygon:expr) => {
            $polygon.rings().iter()
                .map(|ring| {
                    let coords = ring.points().iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
                    (coords, matches!(ring, PolygonRing::Outer(_)))
                })
                .collect::<Vec<(Vec<Coord<f64>>, bool)>>()
        };
    }

    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Polygon(p) => Geometry::Polygon(rings_to_multipolygon(rings!(p))),
        Shape::PolygonM(p) => Geometry::Polygon(rings_to_multipolygon(rings!(p))),
        Shape::PolygonZ(p) => Geometry::Polygon(rings_to_multipolygon(rings!(p))),
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        other => return Err(DecodeError::UnsupportedShape(format!("{:?}", other.shapetype()))),
    };
    Ok(Some(geometry))
}

/// Group shapefile rings into polygons.
///
/// Shapefiles store each outer ring followed by its holes. A hole that appears before
/// any outer ring is promoted to an outer ring rather than dropped.
fn rings_to_multipolygon(rings: Vec<(Vec<Coord<f64>>, bool)>) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last {
                coords.push(first);
            }
        }
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for (mut coords, is_exterior) in rings {
        if coords.len() < 3 {
            continue;
        }
        ensure_closed(&mut coords);
        let ring = LineString(coords);

        if is_exterior || current_exterior.is_none() {
            // flush previous polygon
            if let Some(ext) = current_exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ring);
        } else {
            current_holes.push(ring);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Coord<f64>> {
        vec![
            Coord { x, y },
            Coord { x, y: y + size },
            Coord { x: x + size, y: y + size },
            Coord { x: x + size, y },
        ]
    }

    #[test]
    fn groups_holes_with_the_preceding_outer_ring() {
        let mp = rings_to_multipolygon(vec![
            (square(0.0, 0.0, 10.0), true),
            (square(2.0, 2.0, 2.0), false),
            (square(20.0, 0.0, 5.0), true),
        ]);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.0[1].interiors().len(), 0);
        // rings are closed
        let ext = mp.0[0].exterior();
        assert_eq!(ext.0.first(), ext.0.last());
    }

    #[test]
    fn leading_hole_becomes_an_outer_ring() {
        let mp = rings_to_multipolygon(vec![(square(0.0, 0.0, 1.0), false)]);
        assert_eq!(mp.0.len(), 1);
    }

    #[test]
    fn degenerate_rings_are_skipped() {
        let mp = rings_to_multipolygon(vec![(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }], true)]);
        assert!(mp.0.is_empty());
    }

    #[test]
    fn null_shapes_are_skipped_and_lines_rejected() {
        assert!(matches!(shape_to_geometry(Shape::NullShape), Ok(None)));
        let line = shapefile::Polyline::new(vec![shapefile::Point::new(0.0, 0.0), shapefile::Point::new(1.0, 1.0)]);
        assert!(matches!(shape_to_geometry(Shape::Polyline(line)), Err(DecodeError::UnsupportedShape(_))));
    }
}
