use geo::{BoundingRect, Coord, Intersects, Point, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::geometry::Geometry;

/// Bounding box of one layer feature, by position in the layer.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Extent of a geometry; `None` for empty multipolygons.
pub(super) fn geometry_bounds(geometry: &Geometry) -> Option<Rect<f64>> {
    match geometry {
        Geometry::Polygon(mp) => mp.bounding_rect(),
        Geometry::Point(p) => Some(p.bounding_rect()),
    }
}

/// Smallest rectangle covering both.
pub(crate) fn union_rect(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// R-tree over feature extents, refined by exact polygon tests.
#[derive(Debug, Default)]
pub(super) struct SpatialIndex {
    rtree: RTree<BoundingBox>,
}

impl SpatialIndex {
    pub(super) fn new(bounds: impl Iterator<Item = (usize, Option<Rect<f64>>)>) -> Self {
        let boxes = bounds
            .filter_map(|(idx, bbox)| bbox.map(|bbox| BoundingBox { idx, bbox }))
            .collect();
        Self { rtree: RTree::bulk_load(boxes) }
    }

    /// Lowest feature position whose polygon covers the point (boundaries included).
    pub(super) fn locate<'a>(
        &self,
        point: Point<f64>,
        geometry_at: impl Fn(usize) -> &'a Geometry,
    ) -> Option<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.idx)
            .filter(|&idx| match geometry_at(idx) {
                Geometry::Polygon(mp) => mp.intersects(&point),
                Geometry::Point(_) => false,
            })
            .min()
    }
}
