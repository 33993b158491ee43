use crate::{color::*, filter::*, *};
use alloc::vec;
use alloc::vec::Vec;
use miniz_oxide::inflate::{TINFLStatus, decompress_to_vec_zlib_with_limit};

/// Color layouts this decoder reconstructs. Everything else, palette
/// images included, is rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorMode {
    /// 8-bit R, G, B.
    Truecolor,
    /// 8-bit R, G, B, A. Alpha is dropped.
    TruecolorAlpha,
    /// 16-bit big-endian luminance. Only the high byte is kept.
    Gray16,
}

impl ColorMode {
    pub const COLOR_GRAYSCALE: u8 = 0;
    pub const COLOR_RGB: u8 = 2;
    pub const COLOR_RGBA: u8 = 6;

    pub fn from_header(color_type: u8, bit_depth: u8) -> Result<Self, DecodeError> {
        match (color_type, bit_depth) {
            (Self::COLOR_RGB, 8) => Ok(ColorMode::Truecolor),
            (Self::COLOR_RGBA, 8) => Ok(ColorMode::TruecolorAlpha),
            (Self::COLOR_GRAYSCALE, 16) => Ok(ColorMode::Gray16),
            _ => Err(DecodeError::UnsupportedFormat),
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::Truecolor => 3,
            ColorMode::TruecolorAlpha => 4,
            ColorMode::Gray16 => 2,
        }
    }

    /// `px` holds exactly [`bytes_per_pixel`](Self::bytes_per_pixel) bytes.
    #[inline]
    fn to_rgb(self, px: &[u8]) -> Rgb {
        match self {
            ColorMode::Truecolor | ColorMode::TruecolorAlpha => Rgb::new(px[0], px[1], px[2]),
            ColorMode::Gray16 => Rgb::gray(px[0]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub mode: ColorMode,
}

impl PngHeader {
    pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    pub const CHUNK_IHDR: [u8; 4] = *b"IHDR";
    pub const CHUNK_IDAT: [u8; 4] = *b"IDAT";
    pub const CHUNK_IEND: [u8; 4] = *b"IEND";

    /// Payload size of the header chunk.
    pub const IHDR_SIZE: usize = 13;

    /// Chunk lengths are limited to 2^31 - 1.
    pub const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

    #[inline]
    pub fn info(&self) -> ImageInfo {
        ImageInfo::new(self.width, self.height)
    }

    /// Bytes of one reconstructed scanline, without the filter byte.
    #[inline]
    pub fn line_bytes(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.mode.bytes_per_pixel())
    }

    fn parse(payload: &[u8; Self::IHDR_SIZE]) -> Result<Self, DecodeError> {
        let width = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let height = u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]);
        let bit_depth = payload[8];
        let color_type = payload[9];
        let interlace = payload[12];

        let mode = ColorMode::from_header(color_type, bit_depth).inspect_err(|_| {
            log::debug!(
                "png: unsupported color type {} / bit depth {}",
                color_type,
                bit_depth
            )
        })?;
        if interlace != 0 {
            log::debug!("png: interlaced images are not supported");
            return Err(DecodeError::UnsupportedFormat);
        }
        if width == 0 || height == 0 {
            return Err(DecodeError::CorruptData);
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
            mode,
        })
    }
}

/// Chunk-based compressed image.
///
/// [`PngDecoder::new`] walks the whole chunk stream up to the end marker and
/// keeps the concatenated image data; [`PngDecoder::decode`] inflates it and
/// reconstructs the rows.
pub struct PngDecoder {
    header: PngHeader,
    idat: Vec<u8>,
}

/// Image data is copied in pieces of this size, so the buffer only grows
/// by bytes that were actually read.
const IDAT_READ_BUF: usize = 4096;

impl PngDecoder {
    #[inline]
    pub fn new<S: Source>(source: S) -> Result<Self, DecodeError> {
        Self::with_max_pixels(source, u32::MAX)
    }

    /// Like [`new`](Self::new), but fails with
    /// [`DecodeError::UnsupportedFormat`] as soon as the header chunk
    /// declares more than `max_pixels` pixels.
    pub fn with_max_pixels<S: Source>(
        mut source: S,
        max_pixels: u32,
    ) -> Result<Self, DecodeError> {
        let signature: [u8; 8] = source.read_array().map_err(|err| match err {
            DecodeError::CorruptData => DecodeError::InvalidFormat,
            err => err,
        })?;
        if signature != PngHeader::SIGNATURE {
            return Err(DecodeError::InvalidFormat);
        }

        let mut header = None;
        let mut idat = Vec::new();
        loop {
            let length = source.read_u32_be()?;
            let tag: [u8; 4] = source.read_array()?;
            if length > PngHeader::MAX_CHUNK_LEN {
                return Err(DecodeError::CorruptData);
            }
            let length = length as usize;

            match tag {
                PngHeader::CHUNK_IHDR => {
                    if header.is_some() || length < PngHeader::IHDR_SIZE {
                        return Err(DecodeError::CorruptData);
                    }
                    let payload = source.read_array()?;
                    source.skip(length - PngHeader::IHDR_SIZE)?;
                    let parsed = PngHeader::parse(&payload)?;
                    parsed.info().check_pixels(max_pixels)?;
                    log::debug!(
                        "png: {}x{} {:?}",
                        parsed.width,
                        parsed.height,
                        parsed.mode
                    );
                    header = Some(parsed);
                }
                PngHeader::CHUNK_IDAT => read_payload(&mut source, length, &mut idat)?,
                PngHeader::CHUNK_IEND => {
                    // the trailing field of the last chunk may be cut off
                    match source.skip(length).and_then(|_| source.skip(4)) {
                        Ok(()) | Err(DecodeError::CorruptData) => {}
                        Err(err) => return Err(err),
                    }
                    break;
                }
                _ => {
                    log::trace!(
                        "png: skip chunk {:?} ({} bytes)",
                        core::str::from_utf8(&tag).unwrap_or("????"),
                        length
                    );
                    source.skip(length)?;
                }
            }
            // integrity field, not verified
            source.skip(4)?;
        }

        let header = header.ok_or(DecodeError::CorruptData)?;
        if idat.is_empty() {
            return Err(DecodeError::CorruptData);
        }
        log::debug!("png: {} bytes of compressed image data", idat.len());
        Ok(Self { header, idat })
    }

    #[inline]
    pub fn info(&self) -> ImageInfo {
        self.header.info()
    }

    #[inline]
    pub fn header(&self) -> &PngHeader {
        &self.header
    }

    /// Inflates and reconstructs the image top-down as RGB565.
    pub fn decode(self) -> Result<PixelBuffer, DecodeError> {
        let Self { header, idat } = self;
        let bpp = header.mode.bytes_per_pixel();
        let line = header.line_bytes().ok_or(DecodeError::UnsupportedFormat)?;
        let row_total = line + 1;
        let raw_len = row_total
            .checked_mul(header.height as usize)
            .ok_or(DecodeError::UnsupportedFormat)?;

        let raw = inflate(&idat, raw_len)?;
        drop(idat);
        if raw.len() < raw_len {
            log::debug!("png: expected {} raw bytes, got {}", raw_len, raw.len());
            return Err(DecodeError::CorruptData);
        }

        let info = header.info();
        let mut output = alloc_buffer(info.frame_len())?;
        let mut prev_row = vec![0u8; line];
        let mut curr_row = vec![0u8; line];

        for row in raw[..raw_len].chunks_exact(row_total) {
            let filter = FilterType::try_from(row[0])?;
            curr_row.copy_from_slice(&row[1..]);
            unfilter_row(filter, &mut curr_row, &prev_row, bpp);
            for px in curr_row.chunks_exact(bpp) {
                push_rgb565(&mut output, header.mode.to_rgb(px));
            }
            core::mem::swap(&mut prev_row, &mut curr_row);
        }

        PixelBuffer::from_raw(info.width, info.height, output).ok_or(DecodeError::CorruptData)
    }
}

/// Appends `length` bytes from `source` to `output`.
fn read_payload<S: Source>(
    source: &mut S,
    length: usize,
    output: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    let mut buf = [0u8; IDAT_READ_BUF];
    let mut left = length;
    while left > 0 {
        let n = left.min(IDAT_READ_BUF);
        source.read_exact(&mut buf[..n])?;
        output
            .try_reserve(n)
            .map_err(|_| DecodeError::UnsupportedFormat)?;
        output.extend_from_slice(&buf[..n]);
        left -= n;
    }
    Ok(())
}

/// Inflates a zlib stream, stopping at `limit` bytes.
fn inflate(data: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    match decompress_to_vec_zlib_with_limit(data, limit) {
        Ok(raw) => Ok(raw),
        Err(err) if err.status == TINFLStatus::HasMoreOutput => {
            log::warn!("png: ignoring image data past the last row");
            Ok(err.output)
        }
        Err(err) => {
            log::debug!("png: inflate failed: {:?}", err.status);
            Err(DecodeError::CorruptData)
        }
    }
}

/// Decodes a complete chunked image from `source`.
pub fn decode_png<S: Source>(source: S) -> Result<PixelBuffer, DecodeError> {
    PngDecoder::new(source)?.decode()
}
