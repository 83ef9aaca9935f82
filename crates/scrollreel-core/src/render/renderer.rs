use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use super::{CoverFit, Surface};
use crate::frames::{Frame, FrameStore};

/// Resampling used when a frame is scaled onto the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Direct lookup per surface pixel; cheap enough for every scroll tick
    #[default]
    Nearest,
    /// Resize then crop, for still exports
    Triangle,
}

/// Result of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// Frame not ready; the surface keeps its previous pixels
    FrameMissing,
    /// Surface has no area; retried on the next update
    EmptySurface,
}

/// Draws frames from a store onto a surface with a cover fit
///
/// Holds no per-draw state: the output depends only on the frame index, the
/// surface size and the store contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    sampling: Sampling,
}

impl Renderer {
    pub fn new(sampling: Sampling) -> Self {
        Self { sampling }
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn draw(&self, store: &FrameStore, index: u32, surface: &mut Surface) -> DrawOutcome {
        if surface.is_empty() {
            return DrawOutcome::EmptySurface;
        }
        match store.get(index) {
            Some(frame) => self.draw_frame(frame, surface),
            None => DrawOutcome::FrameMissing,
        }
    }

    pub fn draw_frame(&self, frame: &Frame, surface: &mut Surface) -> DrawOutcome {
        let (sw, sh) = surface.size();
        let Some(fit) = CoverFit::compute(frame.width(), frame.height(), sw, sh) else {
            return DrawOutcome::EmptySurface;
        };

        match self.sampling {
            Sampling::Nearest => draw_nearest(frame, &fit, surface),
            Sampling::Triangle => draw_resized(frame, &fit, surface),
        }
        DrawOutcome::Drawn
    }
}

fn draw_nearest(frame: &Frame, fit: &CoverFit, surface: &mut Surface) {
    let src = frame.pixels();
    let (iw, ih) = (src.width(), src.height());
    for (x, y, pixel) in surface.pixels_mut().enumerate_pixels_mut() {
        let (sx, sy) = fit.source_pixel(x, y, iw, ih);
        *pixel = *src.get_pixel(sx, sy);
    }
}

fn draw_resized(frame: &Frame, fit: &CoverFit, surface: &mut Surface) {
    let (sw, sh) = surface.size();
    let rw = (fit.scaled_width.round() as u32).max(sw);
    let rh = (fit.scaled_height.round() as u32).max(sh);
    let resized = imageops::resize(frame.pixels(), rw, rh, FilterType::Triangle);

    let left = (rw - sw) / 2;
    let top = (rh - sh) / 2;
    let window = imageops::crop_imm(&resized, left, top, sw, sh).to_image();
    imageops::replace(surface.pixels_mut(), &window, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn striped(width: u32, height: u32) -> Frame {
        // left half red, right half blue
        Frame::from_rgba(RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        }))
    }

    #[test]
    fn test_missing_frame_keeps_pixels() {
        let mut store = FrameStore::new(2);
        store.mark_ready(0, striped(4, 4));
        let renderer = Renderer::default();
        let mut surface = Surface::new(4, 4);

        assert_eq!(renderer.draw(&store, 0, &mut surface), DrawOutcome::Drawn);
        let before = surface.pixels().clone();
        assert_eq!(renderer.draw(&store, 1, &mut surface), DrawOutcome::FrameMissing);
        assert_eq!(renderer.draw(&store, 99, &mut surface), DrawOutcome::FrameMissing);
        assert_eq!(surface.pixels(), &before);
    }

    #[test]
    fn test_empty_surface_is_noop() {
        let mut store = FrameStore::new(1);
        store.mark_ready(0, striped(4, 4));
        let mut surface = Surface::new(0, 10);
        assert_eq!(Renderer::default().draw(&store, 0, &mut surface), DrawOutcome::EmptySurface);
    }

    #[test]
    fn test_cover_crops_sides_symmetrically() {
        // 8x2 frame on a 2x2 surface: scale 1, only the middle two columns show
        let frame = striped(8, 2);
        let mut surface = Surface::new(2, 2);
        Renderer::default().draw_frame(&frame, &mut surface);

        assert_eq!(surface.pixel(0, 0), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(surface.pixel(1, 1), Some(Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_draw_is_repeatable() {
        let frame = striped(16, 9);
        let renderer = Renderer::new(Sampling::Triangle);
        let mut a = Surface::new(10, 10);
        let mut b = Surface::new(10, 10);
        renderer.draw_frame(&frame, &mut a);
        renderer.draw_frame(&frame, &mut a);
        renderer.draw_frame(&frame, &mut b);
        assert_eq!(a.pixels(), b.pixels());
    }
}
