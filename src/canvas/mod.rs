use std::collections::HashMap;

use crate::error::ArtError;
use crate::svg::Point;

/// State of one occupied pixel: how many of the owner's shapes cover it
/// and which miner owns it. Absent entries are empty canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelState {
    pub count: u32,
    pub owner: String,
}

/// The shared canvas as a pixel-ownership map.
///
/// A pixel has at most one owning miner at a time; shapes of the same
/// owner may stack (the count tracks how many). All operations are pure
/// over a snapshot -- each block's derived state carries its own copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasState {
    pixels: HashMap<Point, PixelState>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the pixel is held by a different owner.
    pub fn check_overlap(&self, p: Point, owner: &str) -> bool {
        match self.pixels.get(&p) {
            Some(state) => state.owner != owner,
            None => false,
        }
    }

    /// Occupy a pixel. Foreign-owned pixels must have been rejected by
    /// `check_shape` before this is called.
    pub fn add_pixel(&mut self, p: Point, owner: &str) {
        match self.pixels.get_mut(&p) {
            Some(state) => state.count += 1,
            None => {
                self.pixels.insert(
                    p,
                    PixelState {
                        count: 1,
                        owner: owner.to_string(),
                    },
                );
            }
        }
    }

    /// Confirm the pixel exists and belongs to `owner`.
    pub fn have_pixel(&self, p: Point, owner: &str) -> Result<(), ArtError> {
        match self.pixels.get(&p) {
            Some(state) if state.owner == owner => Ok(()),
            _ => Err(ArtError::ShapeOwner(p.key())),
        }
    }

    /// Release one layer of a pixel, erasing the entry when none remain.
    pub fn remove_pixel(&mut self, p: Point) {
        if let Some(state) = self.pixels.get_mut(&p) {
            state.count -= 1;
            if state.count == 0 {
                self.pixels.remove(&p);
            }
        }
    }

    /// Reject the shape if any of its pixels is foreign-owned.
    pub fn check_shape(&self, pixels: &[Point], owner: &str) -> Result<(), ArtError> {
        for &p in pixels {
            if self.check_overlap(p, owner) {
                return Err(ArtError::Overlap(p.key()));
            }
        }
        Ok(())
    }

    pub fn add_shape(&mut self, pixels: &[Point], owner: &str) {
        for &p in pixels {
            self.add_pixel(p, owner);
        }
    }

    /// Remove a shape's pixels, verifying ownership of every pixel first
    /// so a failed removal leaves the canvas untouched.
    pub fn remove_shape(&mut self, pixels: &[Point], owner: &str) -> Result<(), ArtError> {
        for &p in pixels {
            self.have_pixel(p, owner)?;
        }
        for &p in pixels {
            self.remove_pixel(p);
        }
        Ok(())
    }

    pub fn get(&self, p: Point) -> Option<&PixelState> {
        self.pixels.get(&p)
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
