use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::{Error, Result};

/// A decoded frame, cheap to clone
#[derive(Clone)]
pub struct Frame {
    pixels: Arc<RgbaImage>,
}

impl Frame {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self::from_rgba(image.into_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether two handles share the same decoded pixels
    pub fn same_as(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Decode frame bytes with format detection
pub fn decode_frame_bytes(bytes: &[u8]) -> Result<Frame> {
    if bytes.is_empty() {
        return Err(Error::Other("Empty frame data".to_string()));
    }

    // Try auto-detection first
    if let Ok(img) = image::load_from_memory(bytes) {
        return Ok(Frame::from_image(img));
    }

    // Try based on magic bytes
    let format = if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(b"\xff\xd8\xff") {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::WebP)
    } else {
        None
    };

    match format {
        Some(format) => Ok(Frame::from_image(image::load_from_memory_with_format(bytes, format)?)),
        None => Err(Error::Other(format!("Unknown frame format ({}B)", bytes.len()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let frame = decode_frame_bytes(&bytes).unwrap();
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.pixels().get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_frame_bytes(&[]).is_err());
        assert!(decode_frame_bytes(b"definitely not an image").is_err());
    }
}
