use crate::*;

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// The rotation that undoes this one.
    #[inline]
    pub const fn inverse(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    /// Whether width and height trade places.
    #[inline]
    pub const fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    #[inline]
    pub const fn output_info(self, info: ImageInfo) -> ImageInfo {
        if self.is_transposed() {
            ImageInfo::new(info.height, info.width)
        } else {
            info
        }
    }

    /// Destination of source pixel `(x, y)` in a `width` x `height` image.
    #[inline]
    const fn map(self, x: usize, y: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (height - 1 - y, x),
            Rotation::Deg180 => (width - 1 - x, height - 1 - y),
            Rotation::Deg270 => (y, width - 1 - x),
        }
    }
}

/// Copies the RGB565 frame `src` into `output` rotated by `rotation`.
/// Both slices must hold `width * height` pixels.
pub fn rotate_to_slice(
    src: &[u8],
    info: ImageInfo,
    rotation: Rotation,
    output: &mut [u8],
) -> Result<(), DecodeError> {
    let len = info.frame_len();
    if src.len() != len || output.len() != len {
        return Err(DecodeError::CorruptData);
    }
    let width = info.width as usize;
    let height = info.height as usize;
    let new_width = rotation.output_info(info).width as usize;

    for (index, px) in src.chunks_exact(BYTES_PER_PIXEL).enumerate() {
        let (dst_x, dst_y) = rotation.map(index % width, index / width, width, height);
        let base = (dst_y * new_width + dst_x) * BYTES_PER_PIXEL;
        output[base..base + BYTES_PER_PIXEL].copy_from_slice(px);
    }
    Ok(())
}

impl PixelBuffer {
    /// A new buffer holding this frame rotated; `self` is left untouched.
    pub fn rotated(&self, rotation: Rotation) -> Result<PixelBuffer, DecodeError> {
        let info = rotation.output_info(self.info());
        let mut vec = alloc_buffer(info.frame_len())?;
        vec.resize(info.frame_len(), 0);
        rotate_to_slice(self.as_bytes(), self.info(), rotation, &mut vec)?;
        PixelBuffer::from_raw(info.width, info.height, vec).ok_or(DecodeError::CorruptData)
    }
}

/// Source pixel `(x, y)` lands on `(height - 1 - y, x)`.
#[inline]
pub fn rotate_90_clockwise(buffer: &PixelBuffer) -> Result<PixelBuffer, DecodeError> {
    buffer.rotated(Rotation::Deg90)
}
