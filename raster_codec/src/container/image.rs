use nalgebra::Vector2;

use crate::{resample::resize, Error, Result};

/// A grayscale image buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub size: Vector2<usize>,
    data: Vec<u8>,
}

impl Image {
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            size: Vector2::new(width, height),
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(Error::InvalidDimensions {
                org_width: width,
                org_height: height,
                width,
                height,
                len: data.len(),
            });
        }

        Ok(Self {
            size: Vector2::new(width, height),
            data,
        })
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        let idx = self.size.x * y + x;
        self.data[idx]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, val: u8) {
        let idx = self.size.x * y + x;
        self.data[idx] = val;
    }

    /// Returns a nearest neighbor resampled copy of this image. See
    /// [`resize`] for the sampling rules.
    pub fn resize(&self, width: usize, height: usize) -> Result<Self> {
        let data = resize(&self.data, self.size.x, self.size.y, width, height)?;
        Ok(Self {
            size: Vector2::new(width, height),
            data: data.into_owned(),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
