//! Luminance sources
//!
//! The scanner never decodes image files itself. It reads 8-bit luminance
//! through [`LuminanceSource`], which is implemented for the owned [`Image`]
//! buffer, for [`image::GrayImage`] and for references to either.

use crate::{Error, Result};

/// A 2-D grid of 8-bit luminance samples
pub trait LuminanceSource {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Luminance at `(x, y)`, 0 = black, 255 = white
    ///
    /// Callers only pass coordinates inside `width() x height()`.
    fn luminance(&self, x: u32, y: u32) -> u8;
}

impl<T: LuminanceSource + ?Sized> LuminanceSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn luminance(&self, x: u32, y: u32) -> u8 {
        (**self).luminance(x, y)
    }
}

impl LuminanceSource for ::image::GrayImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    #[inline]
    fn luminance(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).0[0]
    }
}

/// An owned 8-bit grayscale image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Create an image from row-major grayscale data
    pub fn from_gray(data: &[u8], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }
        if (data.len() as u64) != (width as u64) * (height as u64) {
            return Err(Error::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data: data.to_vec(),
        })
    }

    /// Get access to the raw image data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return a copy with every sample inverted
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&p| !p).collect(),
        }
    }
}

impl LuminanceSource for Image {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn luminance(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }
}

impl From<::image::GrayImage> for Image {
    fn from(img: ::image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}
