//! Outer contour extraction for connected foreground components.
//!
//! Each component is traced along the cracks between pixels, i.e. on the
//! pixel-corner lattice, rather than through pixel centers. The outline runs
//! clockwise on screen (foreground on the right with y pointing down), starts
//! at the top-left corner of the component's first pixel in raster order and
//! keeps only the vertices where the direction changes. Holes are not traced.
//! Filled with [`fill_polygon`](crate::raster::fill::fill_polygon), an outline
//! reproduces its component with any holes filled in.

use crate::geom::{Point, Polygon};
use crate::image::ImageView;
use crate::util::{FidmarkError, FidmarkResult};

/// Pixel adjacency used to group foreground pixels into components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Edge neighbors only.
    Four,
    /// Edge and diagonal neighbors.
    #[default]
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const EIGHT: [(isize, isize); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// East, south, west, north in screen coordinates.
const STEPS: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
const EAST: usize = 0;

struct Mask<'a> {
    src: ImageView<'a, u8>,
    background: u8,
}

impl Mask<'_> {
    fn is_fg(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.src
            .get(x as usize, y as usize)
            .is_some_and(|&v| v != self.background)
    }

    /// True when the lattice edge leaving `(vx, vy)` along `dir` has foreground
    /// on its right and background on its left.
    fn is_boundary(&self, vx: isize, vy: isize, dir: usize) -> bool {
        let (right, left) = match dir {
            0 => ((vx, vy), (vx, vy - 1)),
            1 => ((vx - 1, vy), (vx, vy)),
            2 => ((vx - 1, vy - 1), (vx - 1, vy)),
            _ => ((vx, vy - 1), (vx - 1, vy - 1)),
        };
        self.is_fg(right.0, right.1) && !self.is_fg(left.0, left.1)
    }

    fn trace(&self, sx: usize, sy: usize, connectivity: Connectivity) -> FidmarkResult<Polygon> {
        let start = (sx as isize, sy as isize);
        let max_steps = 4 * (self.src.width() + 1) * (self.src.height() + 1);
        let mut vertex = start;
        let mut dir = EAST;
        let mut points = vec![Point::new(sx as f64, sy as f64)];

        for _ in 0..max_steps {
            vertex = (vertex.0 + STEPS[dir].0, vertex.1 + STEPS[dir].1);
            let left = (dir + 3) % 4;
            let right = (dir + 1) % 4;
            // At a diagonal pinch the first matching candidate decides whether
            // the two pixels belong to one outline.
            let candidates = match connectivity {
                Connectivity::Eight => [left, dir, right],
                Connectivity::Four => [right, dir, left],
            };
            let next = candidates
                .into_iter()
                .find(|&d| self.is_boundary(vertex.0, vertex.1, d))
                .ok_or(FidmarkError::InvalidInput("contour trace lost the boundary"))?;
            if vertex == start && next == EAST {
                return Polygon::new(points);
            }
            if next != dir {
                points.push(Point::new(vertex.0 as f64, vertex.1 as f64));
            }
            dir = next;
        }
        Err(FidmarkError::InvalidInput("contour trace did not close"))
    }
}

/// Traces the outer outline of every connected component of pixels that
/// differ from `background`.
///
/// Outlines are returned in the raster order of each component's first pixel.
pub fn outer_contours(
    src: ImageView<'_, u8>,
    background: u8,
    connectivity: Connectivity,
) -> FidmarkResult<Vec<Polygon>> {
    let width = src.width();
    let height = src.height();
    let mask = Mask { src, background };
    let mut visited = vec![false; width * height];
    let mut stack = Vec::new();
    let mut contours = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || !mask.is_fg(x as isize, y as isize) {
                continue;
            }

            visited[y * width + x] = true;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                for &(dx, dy) in connectivity.offsets() {
                    let (nx, ny) = (cx as isize + dx, cy as isize + dy);
                    if !mask.is_fg(nx, ny) {
                        continue;
                    }
                    let idx = ny as usize * width + nx as usize;
                    if !visited[idx] {
                        visited[idx] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }

            contours.push(mask.trace(x, y, connectivity)?);
        }
    }

    Ok(contours)
}
