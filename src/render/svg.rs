//! Static SVG snapshot of a styled layer.

use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use geo::{Coord, CoordsIter, MultiPolygon, Rect};

use crate::{
    geometry::Geometry,
    layer::{FeatureLayer, LayerFeature},
    scale::WHITE,
};

/// lon/lat to pixel coordinates.
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Radius of point features, in pixels.
const POINT_RADIUS: f64 = 3.0;

impl FeatureLayer {
    /// 1200 pixels wide with a 10 pixel margin.
    pub fn to_svg(&self, path: &Path) -> Result<()> {
        self.to_svg_with_size(path, 1200, 10)
    }

    /// Write every feature with its current fill, opacity and outline.
    pub fn to_svg_with_size(&self, path: &Path, width: i32, margin: i32) -> Result<()> {
        let mut writer = File::create(path)
            .map(BufWriter::new)
            .with_context(|| format!("[render::svg] Failed to create {}", path.display()))?;
        self.write_svg(&mut writer, width, margin)?;
        writer.flush()
            .with_context(|| format!("[render::svg] Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Render to a string instead of a file.
    pub fn to_svg_string(&self, width: i32, margin: i32) -> Result<String> {
        let mut out = Vec::new();
        self.write_svg(&mut out, width, margin)?;
        String::from_utf8(out).context("[render::svg] SVG output is not valid UTF-8")
    }

    fn write_svg(&self, writer: &mut impl Write, width: i32, margin: i32) -> Result<()> {
        let bounds = self.extent()
            .ok_or_else(|| anyhow!("[render::svg] Could not determine bounds; nothing to draw."))?;

        let (width, margin) = (f64::from(width), f64::from(margin));
        // Degenerate extents (a single point) still get a drawable scale.
        let span_x = bounds.width().max(f64::EPSILON);
        let scale = (width - 2.0 * margin) / span_x;
        let height = bounds.height() * scale + 2.0 * margin;

        // equirectangular, north up
        let (left, top) = (bounds.min().x, bounds.max().y);
        let project = move |coord: &Coord<f64>| (margin + (coord.x - left) * scale, margin + (top - coord.y) * scale);

        write_svg_header(writer, width, height, self.len(), &bounds)?;
        write_svg_styles(writer)?;
        for feature in self.iter() {
            draw_feature(writer, feature, &project)?;
        }
        write_svg_footer(writer)
    }
}

fn draw_feature(writer: &mut impl Write, feature: &LayerFeature, project: &Projection) -> Result<()> {
    let style = feature.current_style();
    let paint = format!(
        r#"fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="{}""#,
        style.fill_color, style.fill_opacity, style.stroke_color, style.stroke_weight,
    );
    let title = escape(&feature.label());

    match &feature.geometry {
        Geometry::Polygon(shape) => writeln!(
            writer,
            r#"<path class="pct" data-precinct="{}" d="{}" {paint}><title>{title}</title></path>"#,
            feature.id,
            path_data(shape, project).trim_end(),
        )?,
        Geometry::Point(point) => {
            let (x, y) = project(&point.0);
            writeln!(
                writer,
                r#"<circle class="pct" data-precinct="{}" cx="{x:.3}" cy="{y:.3}" r="{POINT_RADIUS}" {paint}><title>{title}</title></circle>"#,
                feature.id,
            )?
        }
    }
    Ok(())
}

/// Path data for every ring of `shape`, outer rings and holes alike; the even-odd
/// fill rule punches the holes.
fn path_data(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut d = String::new();
    let rings = shape.iter().flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()));
    for ring in rings {
        for (i, coord) in ring.coords_iter().enumerate() {
            let (x, y) = project(&coord);
            let command = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{command}{x:.2},{y:.2} ");
        }
        if !ring.0.is_empty() {
            d.push('Z');
        }
    }
    d
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn write_svg_header(writer: &mut impl Write, width: f64, height: f64, count: usize, bounds: &Rect<f64>) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}" data-precincts="{count}" data-bbox="{},{},{},{}">"#,
        bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y,
    )?;
    writeln!(writer, r#"<rect width="100%" height="100%" fill="{}"/>"#, WHITE)?;
    Ok(())
}

fn write_svg_styles(writer: &mut impl Write) -> Result<()> {
    writeln!(
        writer,
        "<defs><style>.pct {{ fill-rule: evenodd; stroke-linejoin: round; vector-effect: non-scaling-stroke; }}</style></defs>"
    )?;
    Ok(())
}

fn write_svg_footer(writer: &mut impl Write) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};
    use serde_json::json;

    use super::*;
    use crate::{
        geometry::{Feature, FeatureCollection},
        layer::FeatureStyle,
        scale::Rgb,
    };

    fn layer() -> FeatureLayer {
        let square = |x: f64, n: i64| {
            let poly = polygon![(x: x, y: 46.0), (x: x + 0.1, y: 46.0), (x: x + 0.1, y: 46.1), (x: x, y: 46.1), (x: x, y: 46.0)];
            let props = json!({ "PRECINCT_N": n, "PRECINCT": "A & B" });
            Feature::new(Geometry::Polygon(MultiPolygon(vec![poly])), props.as_object().cloned().unwrap())
        };
        let collection = FeatureCollection {
            features: vec![square(-122.6, 1), square(-122.5, 2)],
            projection: None,
        };
        FeatureLayer::build(&collection, |f| {
            let fill = if f.id.as_str() == "1" { Rgb::new(255, 0, 0) } else { Rgb::new(0, 0, 255) };
            FeatureStyle::heat(fill)
        }, None)
    }

    #[test]
    fn every_feature_is_drawn_with_its_style() {
        let svg = layer().to_svg_string(400, 10).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="pct""#).count(), 2);
        assert!(svg.contains(r##"fill="#ff0000" fill-opacity="0.70""##));
        assert!(svg.contains("<title>#1 A &amp; B</title>"));
    }

    #[test]
    fn empty_layers_cannot_be_drawn() {
        assert!(FeatureLayer::default().to_svg_string(400, 10).is_err());
    }

    #[test]
    fn snapshots_can_be_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        layer().to_svg(&path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("data-precinct=\"2\""));
    }
}
