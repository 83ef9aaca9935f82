use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::Result;

/// Fixed-size pixel buffer a player draws into
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.pixels.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Reallocate to a new size. Returns false if the size is unchanged.
    ///
    /// Contents are cleared; the owner redraws.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.size() == (width, height) {
            return false;
        }
        self.pixels = RgbaImage::new(width, height);
        true
    }

    /// Write the surface as an image; the format follows the extension
    pub fn save(&self, path: &Path) -> Result<()> {
        self.pixels.save(path)?;
        Ok(())
    }
}
