use crate::error::ArtError;
use crate::settings::CanvasSettings;
use crate::svg::path::{parse_path, ParsedPath, Point};
use crate::svg::MAX_SVG_LEN;

/// Rasterization result: the pixels a shape occupies and what they cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub pixels: Vec<Point>,
    pub ink: u32,
    pub closed: bool,
}

/// Rasterize a shape's path string into its pixel set.
///
/// `fill == "transparent"` yields the stroke pixels; anything else fills
/// the enclosed polygon, which requires the path to be closed. The ink
/// cost is consensus-critical: every validator must reproduce it exactly.
pub fn rasterize(svg: &str, fill: &str, canvas: &CanvasSettings) -> Result<Raster, ArtError> {
    if svg.len() > MAX_SVG_LEN {
        return Err(ArtError::ShapeSvgStringTooLong(svg.to_string()));
    }
    let path = parse_path(svg, canvas)?;
    let stroke = stroke_pixels(&path);

    if fill == "transparent" {
        let ink = stroke.len() as u32;
        return Ok(Raster {
            pixels: stroke,
            ink,
            closed: path.closed,
        });
    }

    if !path.closed {
        return Err(ArtError::InvalidShapeSvgString(svg.to_string()));
    }
    let (pixels, ink) = fill_polygon(&stroke);
    Ok(Raster {
        pixels,
        ink,
        closed: true,
    })
}

/// Enumerate the pixels of one segment.
///
/// Not Bresenham: the minor axis advances by truncating integer division.
/// Every validator on the network must reproduce these pixels exactly.
/// The final pixel is always forced to the segment's endpoint.
pub fn segment_pixels(from: Point, to: Point) -> Vec<Point> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let n = if dx != 0 && dy != 0 {
        dx.abs().max(dy.abs())
    } else {
        dx.abs() + dy.abs()
    };

    let mut pixels = Vec::with_capacity(n as usize + 1);
    for i in 0..n {
        let p = if dy.abs() > dx.abs() {
            Point::new(from.x + i * dx / dy.abs(), from.y + i * dy.signum())
        } else {
            Point::new(from.x + i * dx.signum(), from.y + i * dy / dx.abs())
        };
        pixels.push(p);
    }
    pixels.push(to);
    pixels
}

/// The ordered stroke pixel list of a whole path.
///
/// Each segment after the first skips its leading pixel -- it coincides
/// with the previous segment's endpoint. Closing segments drop their
/// trailing pixel, the duplicate start vertex. Coordinates revisited by
/// later parts of the path stay in the list and count toward ink.
fn stroke_pixels(path: &ParsedPath) -> Vec<Point> {
    let mut pixels: Vec<Point> = Vec::new();
    for seg in &path.segments {
        let mut seg_px = segment_pixels(seg.from, seg.to);
        if seg.closes {
            seg_px.pop();
        }
        let skip = usize::from(!pixels.is_empty());
        pixels.extend(seg_px.into_iter().skip(skip));
    }
    pixels
}

/// Scanline fill over the stroke pixels.
///
/// Rows with a single set cell contribute that cell alone. Rows with more
/// toggle a parity flag at every set cell and fill the cells in between;
/// parity left on at the last set cell runs to the grid edge. The ink
/// tally mirrors the scan cell for cell.
fn fill_polygon(stroke: &[Point]) -> (Vec<Point>, u32) {
    let max_x = stroke.iter().map(|p| p.x).max().unwrap_or(0) as usize;
    let max_y = stroke.iter().map(|p| p.y).max().unwrap_or(0) as usize;

    let mut grid = vec![vec![false; max_x + 1]; max_y + 1];
    for p in stroke {
        grid[p.y as usize][p.x as usize] = true;
    }

    let mut ink = 0u32;
    for row in grid.iter_mut() {
        let count = row.iter().filter(|&&c| c).count();
        if count == 1 {
            ink += 1;
        }
        if count > 1 {
            let mut include = false;
            for cell in row.iter_mut() {
                if *cell {
                    include = !include;
                    ink += 1;
                } else if include {
                    *cell = true;
                    ink += 1;
                }
            }
        }
    }

    let mut pixels = Vec::new();
    for (y, row) in grid.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            if cell {
                pixels.push(Point::new(x as i64, y as i64));
            }
        }
    }
    (pixels, ink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn canvas() -> CanvasSettings {
        CanvasSettings {
            canvas_x_max: 1024,
            canvas_y_max: 1024,
        }
    }

    fn set(pixels: &[Point]) -> HashSet<Point> {
        pixels.iter().copied().collect()
    }

    #[test]
    fn vertical_line_costs_its_length_plus_one() {
        let r = rasterize("M 0 0 L 0 5", "transparent", &canvas()).unwrap();
        assert_eq!(r.ink, 6);
        let expected: Vec<Point> = (0..=5).map(|y| Point::new(0, y)).collect();
        assert_eq!(r.pixels, expected);
        assert!(!r.closed);
    }

    #[test]
    fn horizontal_line_pixels() {
        let r = rasterize("M 2 7 H 6", "transparent", &canvas()).unwrap();
        assert_eq!(r.ink, 5);
        assert_eq!(r.pixels[0], Point::new(2, 7));
        assert_eq!(*r.pixels.last().unwrap(), Point::new(6, 7));
    }

    #[test]
    fn diagonal_segment_steps_both_axes() {
        let px = segment_pixels(Point::new(4, 0), Point::new(0, 4));
        assert_eq!(
            px,
            vec![
                Point::new(4, 0),
                Point::new(3, 1),
                Point::new(2, 2),
                Point::new(1, 3),
                Point::new(0, 4),
            ]
        );
    }

    #[test]
    fn axis_aligned_segments_are_symmetric() {
        let a = Point::new(3, 1);
        let b = Point::new(3, 9);
        assert_eq!(
            set(&segment_pixels(a, b)),
            set(&segment_pixels(b, a))
        );
        let c = Point::new(0, 4);
        let d = Point::new(8, 4);
        assert_eq!(
            set(&segment_pixels(c, d)),
            set(&segment_pixels(d, c))
        );
    }

    #[test]
    fn diagonal_segments_are_symmetric() {
        let a = Point::new(2, 2);
        let b = Point::new(7, 7);
        assert_eq!(
            set(&segment_pixels(a, b)),
            set(&segment_pixels(b, a))
        );
    }

    #[test]
    fn zero_length_segment_is_one_pixel() {
        assert_eq!(
            segment_pixels(Point::new(5, 5), Point::new(5, 5)),
            vec![Point::new(5, 5)]
        );
    }

    #[test]
    fn triangle_stroke_counts_joint_pixels_once() {
        // (4,0) -> (0,4) -> (8,4) -> (4,0); the start vertex is revisited
        // by the last segment's endpoint and counts twice.
        let r = rasterize("M 4 0 L 0 4 h 8 l -4 -4", "transparent", &canvas()).unwrap();
        assert_eq!(r.ink, 17);
        assert!(r.closed);
        assert_eq!(
            r.pixels
                .iter()
                .filter(|&&p| p == Point::new(4, 0))
                .count(),
            2
        );
    }

    #[test]
    fn triangle_fill_is_twenty_five() {
        let r = rasterize("M 4 0 L 0 4 h 8 l -4 -4", "red", &canvas()).unwrap();
        assert_eq!(r.ink, 25);
        assert_eq!(r.pixels.len(), 25);
        // interior sample
        assert!(r.pixels.contains(&Point::new(4, 2)));
    }

    #[test]
    fn square_fill_is_area() {
        // 5x5 square including its boundary.
        let r = rasterize("M 9 0 l 4 0 v 4 h -4 z", "blue", &canvas()).unwrap();
        assert_eq!(r.ink, 25);
    }

    #[test]
    fn square_stroke_is_perimeter() {
        let r = rasterize("M 9 0 l 4 0 v 4 h -4 z", "transparent", &canvas()).unwrap();
        assert_eq!(r.ink, 16);
    }

    #[test]
    fn filled_boundary_pixels_match_stroke() {
        let stroke = rasterize("M 9 0 l 4 0 v 4 h -4 z", "transparent", &canvas()).unwrap();
        let filled = rasterize("M 9 0 l 4 0 v 4 h -4 z", "blue", &canvas()).unwrap();
        let filled_set = set(&filled.pixels);
        assert!(stroke.pixels.iter().all(|p| filled_set.contains(p)));
        assert!(filled.ink >= stroke.pixels.len() as u32);
    }

    #[test]
    fn fill_requires_closed_path() {
        assert!(matches!(
            rasterize("M 0 0 L 0 5", "red", &canvas()),
            Err(ArtError::InvalidShapeSvgString(_))
        ));
    }

    #[test]
    fn too_long_path_is_rejected_before_parsing() {
        let long = format!("M 0 0 {}", "L 1 1 ".repeat(30));
        assert!(long.len() > MAX_SVG_LEN);
        assert!(matches!(
            rasterize(&long, "transparent", &canvas()),
            Err(ArtError::ShapeSvgStringTooLong(_))
        ));
    }

    #[test]
    fn out_of_bounds_propagates() {
        assert_eq!(
            rasterize("M 0 0 L 0 2000", "transparent", &canvas()),
            Err(ArtError::OutOfBounds)
        );
    }
}
