//! tftimg - Bounded-memory BMP/PNG decoder for small RGB565 displays
//!
//! Both decoders read through a [`Source`] (a seekable byte handle) and
//! produce big-endian RGB565 pixels in natural top-down, left-to-right
//! order. [`show_bmp`] streams a bitmap to a [`DisplayBlit`] in horizontal
//! strips; [`show_png`] decodes the whole image, rotates it, then blits once.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
#[cfg(feature = "embedded")]
use embedded_graphics::prelude::Size;

mod bmp;
pub use bmp::*;

mod png;
pub use png::*;

mod display;
pub use display::*;

mod rotate;
pub use rotate::*;

mod source;
pub use source::*;

pub mod color;
pub mod filter;


/// Bytes per RGB565 pixel.
pub const BYTES_PER_PIXEL: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecodeError {
    /// Signature or magic mismatch.
    InvalidFormat,
    /// Recognized container, but depth, color mode, compression or size
    /// is outside what this decoder handles.
    UnsupportedFormat,
    /// Malformed structure found mid-parse.
    CorruptData,
    /// The underlying handle failed to read or seek.
    Io,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecodeError::InvalidFormat => "invalid format: signature mismatch",
            DecodeError::UnsupportedFormat => "unsupported format",
            DecodeError::CorruptData => "corrupt or truncated image data",
            DecodeError::Io => "read or seek failed",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of a full RGB565 frame of this image, in bytes. Saturates on
    /// overflow.
    #[inline]
    pub fn frame_len(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(BYTES_PER_PIXEL)
    }

    /// Rejects images with more than `max_pixels` pixels.
    pub fn check_pixels(&self, max_pixels: u32) -> Result<(), DecodeError> {
        if (self.width as u64) * (self.height as u64) > max_pixels as u64 {
            log::debug!(
                "{}x{} exceeds the {} pixel limit",
                self.width,
                self.height,
                max_pixels
            );
            return Err(DecodeError::UnsupportedFormat);
        }
        Ok(())
    }
}

#[cfg(feature = "embedded")]
impl From<ImageInfo> for Size {
    #[inline]
    fn from(info: ImageInfo) -> Self {
        Self::new(info.width, info.height)
    }
}

/// A row-major RGB565 frame, two big-endian bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    info: ImageInfo,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps `data`, which must hold exactly `width * height` pixels.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let info = ImageInfo::new(width, height);
        (data.len() == info.frame_len()).then_some(Self { info, data })
    }

    #[inline]
    pub fn info(&self) -> ImageInfo {
        self.info
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.info.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.info.height
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Packed RGB565 value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.info.width || y >= self.info.height {
            return None;
        }
        let index = (y as usize * self.info.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some(u16::from_be_bytes([self.data[index], self.data[index + 1]]))
    }

    /// Iterates packed RGB565 values in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = u16> + '_ {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|p| u16::from_be_bytes([p[0], p[1]]))
    }
}

/// Reserves exactly `len` bytes, reporting an image too large for the
/// heap as unsupported rather than aborting.
pub(crate) fn alloc_buffer(len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| DecodeError::UnsupportedFormat)?;
    Ok(vec)
}
