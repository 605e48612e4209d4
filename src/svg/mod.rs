pub mod path;
pub mod raster;

pub use path::{parse_path, ParsedPath, Point, Segment};
pub use raster::{rasterize, segment_pixels, Raster};

/// Maximum accepted length of a shape's svg path string.
pub const MAX_SVG_LEN: usize = 128;
