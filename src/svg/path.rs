use serde::{Deserialize, Serialize};

use crate::error::ArtError;
use crate::settings::CanvasSettings;

/// An integer pixel coordinate on the shared canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The `"x,y"` form used in overlap/ownership error messages.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

/// A straight line between two vertices of a parsed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    /// True for segments produced by `Z`/`z`; their trailing pixel (the
    /// start vertex) is dropped during rasterization.
    pub closes: bool,
}

/// A path reduced to its segments, plus whether it ended on its start point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub segments: Vec<Segment>,
    pub closed: bool,
}

/// Parse a restricted svg path: whitespace-separated tokens, commands
/// `M m L l H h V v Z z` with decimal integer arguments.
///
/// Every vertex is bounds-checked against the canvas as it is produced.
/// Any unrecognized or malformed token rejects the whole path.
pub fn parse_path(svg: &str, canvas: &CanvasSettings) -> Result<ParsedPath, ArtError> {
    let mut tokens = svg.split_whitespace();
    let mut initial = Point::new(0, 0);
    let mut current = Point::new(0, 0);
    let mut end = Point::new(0, 0);
    let mut segments = Vec::new();

    while let Some(cmd) = tokens.next() {
        match cmd {
            "M" | "m" => {
                let x = next_number(&mut tokens, svg)?;
                let y = next_number(&mut tokens, svg)?;
                if cmd == "M" {
                    initial = Point::new(x, y);
                    current = Point::new(x, y);
                } else {
                    // A relative move offsets the initial and current points
                    // by the same delta, each from its own previous value.
                    initial = Point::new(initial.x + x, initial.y + y);
                    current = Point::new(current.x + x, current.y + y);
                }
                check_bounds(current, canvas)?;
            }
            "L" | "l" => {
                let x = next_number(&mut tokens, svg)?;
                let y = next_number(&mut tokens, svg)?;
                let to = if cmd == "L" {
                    Point::new(x, y)
                } else {
                    Point::new(current.x + x, current.y + y)
                };
                check_bounds(to, canvas)?;
                segments.push(Segment { from: current, to, closes: false });
                current = to;
                end = to;
            }
            "H" | "h" => {
                let x = next_number(&mut tokens, svg)?;
                let to = if cmd == "H" {
                    Point::new(x, current.y)
                } else {
                    Point::new(current.x + x, current.y)
                };
                check_bounds(to, canvas)?;
                segments.push(Segment { from: current, to, closes: false });
                current = to;
                end = to;
            }
            "V" | "v" => {
                let y = next_number(&mut tokens, svg)?;
                let to = if cmd == "V" {
                    Point::new(current.x, y)
                } else {
                    Point::new(current.x, current.y + y)
                };
                check_bounds(to, canvas)?;
                segments.push(Segment { from: current, to, closes: false });
                current = to;
                end = to;
            }
            "Z" | "z" => {
                segments.push(Segment { from: current, to: initial, closes: true });
                current = initial;
                end = initial;
            }
            _ => return Err(ArtError::InvalidShapeSvgString(svg.to_string())),
        }
    }

    Ok(ParsedPath {
        segments,
        closed: end == initial,
    })
}

fn next_number<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    svg: &str,
) -> Result<i64, ArtError> {
    tokens
        .next()
        .and_then(|t| t.parse::<i64>().ok())
        .ok_or_else(|| ArtError::InvalidShapeSvgString(svg.to_string()))
}

fn check_bounds(p: Point, canvas: &CanvasSettings) -> Result<(), ArtError> {
    if p.x < 0 || p.y < 0 || p.x > canvas.canvas_x_max as i64 || p.y > canvas.canvas_y_max as i64 {
        return Err(ArtError::OutOfBounds);
    }
    Ok(())
}
