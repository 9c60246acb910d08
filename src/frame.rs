//! Frame buffer types.

use crate::error::EngineError;

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 3 bytes per pixel: R, G, B
    #[default]
    Rgb,
    /// 4 bytes per pixel: R, G, B, A
    Rgba,
}

impl PixelFormat {
    /// Number of bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// A row-major frame of 8-bit RGB or RGBA pixels.
///
/// The buffer belongs to the caller. The engine reads and rewrites it in
/// place and never keeps a reference past the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
}

impl FrameBuffer {
    /// Wrap existing pixel data, checking that its length matches the dimensions.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, EngineError> {
        let frame = Self {
            data,
            width,
            height,
            format,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Allocate a black frame.
    pub fn blank(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            data: vec![0; len],
            width,
            height,
            format,
        }
    }

    /// Get the number of bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Number of bytes in one row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Byte length implied by width, height and format.
    pub fn expected_len(&self) -> usize {
        self.stride() * self.height as usize
    }

    /// Check that the buffer is non-empty and its length agrees with its dimensions.
    pub fn validate(&self) -> Result<(), EngineError> {
        let expected = self.expected_len();
        if expected == 0 || self.data.len() != expected {
            return Err(EngineError::DimensionMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// The RGB channels of the pixel at (x, y).
    ///
    /// Panics if the coordinates are outside the frame.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = y as usize * self.stride() + x as usize * self.bytes_per_pixel();
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Convert an RGBA image into a frame.
    pub fn from_rgba_image(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            format: PixelFormat::Rgba,
        }
    }

    /// Convert an RGB image into a frame.
    pub fn from_rgb_image(image: image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            format: PixelFormat::Rgb,
        }
    }

    /// Convert the frame back into an image for encoding.
    pub fn into_dynamic_image(self) -> Result<image::DynamicImage, EngineError> {
        self.validate()?;
        let expected = self.expected_len();
        let actual = self.data.len();
        let mismatch = || EngineError::DimensionMismatch { expected, actual };

        match self.format {
            PixelFormat::Rgb => image::RgbImage::from_raw(self.width, self.height, self.data)
                .map(image::DynamicImage::ImageRgb8)
                .ok_or_else(mismatch),
            PixelFormat::Rgba => image::RgbaImage::from_raw(self.width, self.height, self.data)
                .map(image::DynamicImage::ImageRgba8)
                .ok_or_else(mismatch),
        }
    }
}
