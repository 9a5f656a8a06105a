//! Borrowed grayscale raster with subpixel sampling.
//!
//! The scanner never owns pixel data; callers hand in a [`GrayView`] over
//! whatever buffer they already have (a camera frame, an `image::GrayImage`,
//! a test fixture).

/// A borrowed single-channel 8-bit raster, row-major.
#[derive(Clone, Copy, Debug)]
pub struct GrayView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

impl<'a> GrayView<'a> {
    /// Wrap a raw row-major buffer. Returns `None` on a size mismatch.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// View over an `image` crate grayscale buffer.
    pub fn from_luma8(img: &'a image::GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.as_raw(),
        }
    }

    /// Pixel value at integer coordinates, 0 outside the raster.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    /// True if `(x, y)` lands inside the raster with a 1-pixel margin,
    /// so that bilinear interpolation reads only real pixels.
    #[inline]
    pub fn contains_subpixel(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x + 1.0 < self.width as f32 && y + 1.0 < self.height as f32
    }

    /// Bilinear intensity at subpixel coordinates.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let p00 = self.get(x0, y0) as f32;
        let p10 = self.get(x0 + 1, y0) as f32;
        let p01 = self.get(x0, y0 + 1) as f32;
        let p11 = self.get(x0 + 1, y0 + 1) as f32;

        let top = p00 + fx * (p10 - p00);
        let bottom = p01 + fx * (p11 - p01);
        top + fy * (bottom - top)
    }
}
