use crate::geom::{Extent, Point};
use crate::util::{FidmarkError, FidmarkResult};

/// Immutable closed polygon with at least three vertices.
///
/// The ring is closed implicitly; the last vertex connects back to the first.
/// All attributes are derived from the vertices on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from an ordered vertex list.
    pub fn new(points: Vec<Point>) -> FidmarkResult<Self> {
        if points.len() < 3 {
            return Err(FidmarkError::DegeneratePolygon {
                reason: "fewer than 3 vertices",
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(FidmarkError::InvalidInput("polygon vertex is not finite"));
        }
        Ok(Self { points })
    }

    /// Creates a polygon from `(x, y)` pairs.
    pub fn from_xy<I>(coords: I) -> FidmarkResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(coords.into_iter().map(Point::from).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a polygon holds at least three vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the closed ring's edges, including last-to-first.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Bounding extent `(min y, max y, min x, max x)`.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent {
            top: f64::INFINITY,
            bottom: f64::NEG_INFINITY,
            left: f64::INFINITY,
            right: f64::NEG_INFINITY,
        };
        for p in &self.points {
            extent.top = extent.top.min(p.y);
            extent.bottom = extent.bottom.max(p.y);
            extent.left = extent.left.min(p.x);
            extent.right = extent.right.max(p.x);
        }
        extent
    }

    pub fn width(&self) -> f64 {
        self.extent().width()
    }

    pub fn height(&self) -> f64 {
        self.extent().height()
    }

    /// Area of the axis-aligned bounding box.
    ///
    /// This is a coarse size measure used for filtering and overestimates any
    /// non-rectangular polygon; see [`Polygon::shoelace_area`] for the exact
    /// enclosed area.
    pub fn area(&self) -> f64 {
        let extent = self.extent();
        extent.width() * extent.height()
    }

    /// Absolute enclosed area by the shoelace formula.
    pub fn shoelace_area(&self) -> f64 {
        let twice: f64 = self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum();
        twice.abs() * 0.5
    }

    /// Mean of the vertex coordinates.
    pub fn centroid(&self) -> Point {
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }

    /// Bounding-box height divided by width.
    pub fn height_width_ratio(&self) -> FidmarkResult<f64> {
        let extent = self.extent();
        let width = extent.width();
        if width == 0.0 {
            return Err(FidmarkError::DegeneratePolygon {
                reason: "zero width bounding box",
            });
        }
        Ok(extent.height() / width)
    }

    /// Distance from the centroid to the nearest side of a `width x height` frame.
    pub fn edge_distance(&self, frame_width: f64, frame_height: f64) -> f64 {
        let c = self.centroid();
        c.x.min(frame_width - c.x).min(c.y).min(frame_height - c.y)
    }
}

#[cfg(test)]
mod tests {
    use super::Polygon;
    use crate::geom::Point;
    use crate::util::FidmarkError;

    fn square(x0: f64, y0: f64, side: f64) -> Polygon {
        Polygon::from_xy([
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
        ])
        .unwrap()
    }

    #[test]
    fn two_points_are_degenerate() {
        let err = Polygon::from_xy([(0.0, 0.0), (1.0, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            FidmarkError::DegeneratePolygon {
                reason: "fewer than 3 vertices"
            }
        );
    }

    #[test]
    fn triangle_area_is_bounding_box_area() {
        let tri = Polygon::from_xy([(0.0, 0.0), (10.0, 0.0), (0.0, 4.0)]).unwrap();
        assert_eq!(tri.area(), 40.0);
        assert_eq!(tri.shoelace_area(), 20.0);
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let tri = Polygon::from_xy([(0.0, 0.0), (9.0, 0.0), (0.0, 3.0)]).unwrap();
        assert_eq!(tri.centroid(), Point::new(3.0, 1.0));
    }

    #[test]
    fn edge_distance_picks_nearest_side() {
        let poly = square(10.0, 40.0, 10.0);
        // Centroid (15, 45) in a 100x50 frame: bottom is 5 away.
        assert_eq!(poly.edge_distance(100.0, 50.0), 5.0);
    }

    #[test]
    fn vertical_segment_has_no_ratio() {
        let poly = Polygon::from_xy([(3.0, 0.0), (3.0, 5.0), (3.0, 9.0)]).unwrap();
        assert!(matches!(
            poly.height_width_ratio(),
            Err(FidmarkError::DegeneratePolygon { .. })
        ));
    }
}
