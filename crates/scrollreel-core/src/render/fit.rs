/// Cover transform: scale to fill the surface, centered, overflow cropped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    /// Left edge of the scaled image relative to the surface; zero or negative
    pub offset_x: f64,
    /// Top edge of the scaled image relative to the surface; zero or negative
    pub offset_y: f64,
    pub scaled_width: f64,
    pub scaled_height: f64,
}

impl CoverFit {
    /// `None` when either the image or the surface has no area
    pub fn compute(image_w: u32, image_h: u32, surface_w: u32, surface_h: u32) -> Option<Self> {
        if image_w == 0 || image_h == 0 || surface_w == 0 || surface_h == 0 {
            return None;
        }

        let (iw, ih) = (image_w as f64, image_h as f64);
        let (sw, sh) = (surface_w as f64, surface_h as f64);
        let scale = (sw / iw).max(sh / ih);
        let scaled_width = iw * scale;
        let scaled_height = ih * scale;

        Some(Self {
            scale,
            offset_x: (sw - scaled_width) / 2.0,
            offset_y: (sh - scaled_height) / 2.0,
            scaled_width,
            scaled_height,
        })
    }

    /// Source pixel shown at surface pixel `(x, y)`, sampled at the pixel center
    pub fn source_pixel(&self, x: u32, y: u32, image_w: u32, image_h: u32) -> (u32, u32) {
        let sx = ((x as f64 + 0.5 - self.offset_x) / self.scale).floor();
        let sy = ((y as f64 + 0.5 - self.offset_y) / self.scale).floor();
        (
            (sx.max(0.0) as u32).min(image_w - 1),
            (sy.max(0.0) as u32).min(image_h - 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_surface_crops_height() {
        // 1080x1920 portrait frame on a 1600x900 surface
        let fit = CoverFit::compute(1080, 1920, 1600, 900).unwrap();
        assert!((fit.scale - 1600.0 / 1080.0).abs() < 1e-9);
        assert!(fit.offset_x.abs() < 1e-9);
        assert!(fit.offset_y < 0.0);
        assert!((fit.scaled_height - 1920.0 * fit.scale).abs() < 1e-9);
        assert!((fit.offset_y * 2.0 + fit.scaled_height - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_tall_surface_crops_width() {
        let fit = CoverFit::compute(200, 100, 50, 100).unwrap();
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.offset_x, -75.0);
        assert_eq!(fit.offset_y, 0.0);
        assert_eq!(fit.source_pixel(0, 0, 200, 100), (75, 0));
        assert_eq!(fit.source_pixel(49, 99, 200, 100), (124, 99));
    }

    #[test]
    fn test_zero_area_has_no_fit() {
        assert!(CoverFit::compute(0, 10, 10, 10).is_none());
        assert!(CoverFit::compute(10, 10, 10, 0).is_none());
    }
}
