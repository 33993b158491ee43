use crate::{color::*, *};
use alloc::vec::Vec;

/// Uncompressed 24-bit device-independent bitmap, read through a [`Source`].
///
/// Rows are fetched with a seek each, so any horizontal band can be
/// decoded on its own without touching the rest of the file.
pub struct BmpDecoder<S> {
    source: S,
    header: BmpHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    /// As declared; never validated.
    pub file_size: u32,
    pub pixel_offset: u32,
    pub header_size: u32,
    pub width: u32,
    pub height: u32,
    /// Negative height in the file: rows stored top to bottom.
    pub top_down: bool,
    stride: usize,
}

impl BmpHeader {
    pub const MAGIC: [u8; 2] = *b"BM";

    pub const BIT_DEPTH: u16 = 24;

    pub const COMPRESSION_RGB: u32 = 0;

    /// Bytes of one stored row, padded to 4 bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn info(&self) -> ImageInfo {
        ImageInfo::new(self.width, self.height)
    }

    /// Storage row index of display row `y`.
    #[inline]
    fn stored_row(&self, y: u32) -> u32 {
        if self.top_down {
            y
        } else {
            self.height - 1 - y
        }
    }

    fn parse<S: Source>(source: &mut S) -> Result<Self, DecodeError> {
        let magic: [u8; 2] = source.read_array().map_err(|err| match err {
            DecodeError::CorruptData => DecodeError::InvalidFormat,
            err => err,
        })?;
        if magic != Self::MAGIC {
            return Err(DecodeError::InvalidFormat);
        }

        let file_size = source.read_u32_le()?;
        source.skip(4)?;
        let pixel_offset = source.read_u32_le()?;
        let header_size = source.read_u32_le()?;
        let width = source.read_i32_le()?;
        let height = source.read_i32_le()?;
        let _planes = source.read_u16_le()?;
        let bit_depth = source.read_u16_le()?;
        let compression = source.read_u32_le()?;

        if bit_depth != Self::BIT_DEPTH || compression != Self::COMPRESSION_RGB {
            log::debug!(
                "bmp: unsupported depth {} / compression {}",
                bit_depth,
                compression
            );
            return Err(DecodeError::UnsupportedFormat);
        }
        if width <= 0 || height == 0 {
            return Err(DecodeError::CorruptData);
        }

        let width = width as u32;
        let stride = (width as usize)
            .checked_mul(3)
            .and_then(|v| v.checked_add(3))
            .ok_or(DecodeError::UnsupportedFormat)?
            & !3;

        let header = Self {
            file_size,
            pixel_offset,
            header_size,
            width,
            height: height.unsigned_abs(),
            top_down: height < 0,
            stride,
        };
        log::debug!(
            "bmp: {}x{} offset {} stride {}{}",
            header.width,
            header.height,
            header.pixel_offset,
            header.stride,
            if header.top_down { " top-down" } else { "" }
        );
        Ok(header)
    }
}

impl<S: Source> BmpDecoder<S> {
    /// Validates the file and info headers. Nothing past the magic is read
    /// when the magic does not match.
    pub fn new(mut source: S) -> Result<Self, DecodeError> {
        let header = BmpHeader::parse(&mut source)?;
        Ok(Self { source, header })
    }

    #[inline]
    pub fn info(&self) -> ImageInfo {
        self.header.info()
    }

    #[inline]
    pub fn header(&self) -> &BmpHeader {
        &self.header
    }

    #[inline]
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Decodes display rows `top..top + rows` (clamped to the image) into
    /// `output` as RGB565, replacing its contents. On error `output` is left
    /// empty.
    pub fn decode_rows(
        &mut self,
        top: u32,
        rows: u32,
        output: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        output.clear();
        let result = self.decode_rows_inner(top, rows, output);
        if result.is_err() {
            output.clear();
        }
        result
    }

    fn decode_rows_inner(
        &mut self,
        top: u32,
        rows: u32,
        output: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        let bottom = top.saturating_add(rows).min(self.header.height);
        if top >= bottom {
            return Ok(());
        }
        let width = self.header.width as usize;
        let band_len = ImageInfo::new(self.header.width, bottom - top).frame_len();
        output
            .try_reserve_exact(band_len)
            .map_err(|_| DecodeError::UnsupportedFormat)?;

        let mut row = alloc_buffer(width * 3)?;
        row.resize(width * 3, 0);

        for y in top..bottom {
            let offset = self.header.pixel_offset as u64
                + self.header.stored_row(y) as u64 * self.header.stride as u64;
            self.source.seek(offset)?;
            self.source.read_exact(&mut row)?;
            for bgr in row.chunks_exact(3) {
                push_rgb565(output, Rgb::from_bgr([bgr[0], bgr[1], bgr[2]]));
            }
        }
        Ok(())
    }

    /// Decodes the whole image top-down.
    pub fn decode(&mut self) -> Result<PixelBuffer, DecodeError> {
        let info = self.info();
        let mut vec = alloc_buffer(info.frame_len())?;
        self.decode_rows(0, info.height, &mut vec)?;
        PixelBuffer::from_raw(info.width, info.height, vec).ok_or(DecodeError::CorruptData)
    }
}

/// Decodes a complete bitmap from `source`.
pub fn decode_bmp<S: Source>(source: S) -> Result<PixelBuffer, DecodeError> {
    BmpDecoder::new(source)?.decode()
}
