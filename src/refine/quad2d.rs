//! Separable quadratic fit for sub-pixel corner positions.

use crate::geom::Point;

/// Vertex of the parabola through `(-1, left)`, `(0, center)`, `(1, right)`.
///
/// Only concave fits with the vertex inside `[-1, 1]` are accepted.
fn parabola_vertex(left: f32, center: f32, right: f32) -> Option<f64> {
    let (l, c, r) = (f64::from(left), f64::from(center), f64::from(right));
    let curvature = l - 2.0 * c + r;
    if !curvature.is_finite() || curvature > -1e-9 {
        return None;
    }
    let offset = 0.5 * (l - r) / curvature;
    (offset.abs() <= 1.0).then_some(offset)
}

/// Refines an integer response peak using one quadratic fit per axis.
///
/// `s` is the 3x3 response neighborhood centered at `s[1][1]`, indexed
/// `s[row][col]`. The horizontal offset comes from the center row and the
/// vertical offset from the center column; an axis whose fit is
/// ill-conditioned keeps the integer coordinate.
pub fn refine_peak_2d(center_x: usize, center_y: usize, s: [[f32; 3]; 3]) -> Point {
    let dx = parabola_vertex(s[1][0], s[1][1], s[1][2]).unwrap_or(0.0);
    let dy = parabola_vertex(s[0][1], s[1][1], s[2][1]).unwrap_or(0.0);
    Point::new(center_x as f64 + dx, center_y as f64 + dy)
}
