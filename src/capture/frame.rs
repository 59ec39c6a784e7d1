// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use image::{imageops, ImageResult, RgbImage};
use std::path::Path;

/// A single RGB camera frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build a frame from tightly packed RGB bytes
    ///
    /// Returns `None` when `data` is not exactly `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(Self::new)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Horizontally flipped copy, as a selfie preview shows it
    pub fn mirrored(&self) -> Frame {
        Frame::new(imageops::flip_horizontal(&self.image))
    }

    /// Encode to `path`; the format follows the file extension
    pub fn save(&self, path: &Path) -> ImageResult<()> {
        self.image.save(path)
    }
}
