use crate::*;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "embedded")]
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};

/// Destination rectangle on the panel, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Area {
    /// Largest edge coordinate any area may reach, so every corner also
    /// fits a signed panel coordinate.
    pub const MAX_COORD: u32 = i32::MAX as u32;

    #[inline]
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// `None` when the far edges pass [`MAX_COORD`](Self::MAX_COORD).
    pub fn checked(left: u32, top: u32, width: u32, height: u32) -> Option<Self> {
        let fits = |start: u32, len: u32| {
            start
                .checked_add(len)
                .is_some_and(|end| end <= Self::MAX_COORD)
        };
        (fits(left, width) && fits(top, height)).then_some(Self::new(left, top, width, height))
    }

    /// Last column, inclusive, as panel address windows expect it.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.left.saturating_add(self.width.saturating_sub(1))
    }

    /// Last row, inclusive.
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height.saturating_sub(1))
    }
}

/// The panel transport.
///
/// `pixels` is row-major, big-endian RGB565 and holds exactly
/// `area.width * area.height` pixels. The sink owns the bus for the
/// duration of one call.
pub trait DisplayBlit {
    type Error;

    fn blit(&mut self, area: Area, pixels: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowOptions {
    /// Rows per strip when streaming a bitmap. `0` decodes the whole frame
    /// before the first write.
    pub strip_rows: u32,
    /// Applied to chunked images before the single write.
    pub png_rotation: Rotation,
    /// Upper bound for any full-frame decode.
    pub max_pixels: u32,
}

impl ShowOptions {
    pub const DEFAULT_STRIP_ROWS: u32 = 20;

    pub const DEFAULT_MAX_PIXELS: u32 = 320 * 320;

}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            strip_rows: Self::DEFAULT_STRIP_ROWS,
            png_rotation: Rotation::Deg90,
            max_pixels: Self::DEFAULT_MAX_PIXELS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowError<E> {
    /// Nothing was written.
    Decode(DecodeError),
    /// Decoding failed after the first `rows_written` rows were already on
    /// the panel.
    Partial {
        rows_written: u32,
        error: DecodeError,
    },
    /// The image would not fit the panel coordinate range at the requested
    /// origin. Nothing was written.
    OutOfBounds,
    Display(E),
}

impl<E> From<DecodeError> for ShowError<E> {
    #[inline]
    fn from(err: DecodeError) -> Self {
        ShowError::Decode(err)
    }
}

impl<E: fmt::Debug> fmt::Display for ShowError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowError::Decode(err) => write!(f, "decode failed: {}", err),
            ShowError::Partial {
                rows_written,
                error,
            } => write!(
                f,
                "decode failed after {} rows were written: {}",
                rows_written, error
            ),
            ShowError::OutOfBounds => f.write_str("image placed outside the panel range"),
            ShowError::Display(err) => write!(f, "display write failed: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for ShowError<E> {}

/// Streams a bitmap to `display` with its top-left corner at `(x, y)`.
///
/// Peak memory is one strip of `options.strip_rows` rows. Strips are
/// written as they are decoded, so a failure part way leaves the strips
/// above it on the panel and is reported as [`ShowError::Partial`].
pub fn show_bmp<S, D>(
    source: S,
    x: u32,
    y: u32,
    display: &mut D,
    options: &ShowOptions,
) -> Result<ImageInfo, ShowError<D::Error>>
where
    S: Source,
    D: DisplayBlit + ?Sized,
{
    let mut decoder = BmpDecoder::new(source)?;
    let info = decoder.info();
    Area::checked(x, y, info.width, info.height).ok_or(ShowError::OutOfBounds)?;
    let strip_rows = match options.strip_rows {
        0 => {
            info.check_pixels(options.max_pixels)?;
            info.height
        }
        rows => rows.min(info.height),
    };

    let mut strip = Vec::new();
    let mut top = 0;
    while top < info.height {
        let rows = strip_rows.min(info.height - top);
        if let Err(error) = decoder.decode_rows(top, rows, &mut strip) {
            if top == 0 {
                return Err(ShowError::Decode(error));
            }
            log::warn!(
                "bmp: {} after {}/{} rows were already written",
                error,
                top,
                info.height
            );
            return Err(ShowError::Partial {
                rows_written: top,
                error,
            });
        }
        display
            .blit(Area::new(x, y + top, info.width, rows), &strip)
            .map_err(ShowError::Display)?;
        top += rows;
        log::debug!("bmp: {}/{}", top, info.height);
    }
    Ok(info)
}

/// Decodes a chunked image in full, rotates it by `options.png_rotation`
/// and writes it with one call. Returns the size as shown.
pub fn show_png<S, D>(
    source: S,
    x: u32,
    y: u32,
    display: &mut D,
    options: &ShowOptions,
) -> Result<ImageInfo, ShowError<D::Error>>
where
    S: Source,
    D: DisplayBlit + ?Sized,
{
    let decoder = PngDecoder::with_max_pixels(source, options.max_pixels)?;
    let shown = options.png_rotation.output_info(decoder.info());
    Area::checked(x, y, shown.width, shown.height).ok_or(ShowError::OutOfBounds)?;
    let image = decoder.decode()?;
    let image = match options.png_rotation {
        Rotation::Deg0 => image,
        rotation => image.rotated(rotation)?,
    };

    let info = image.info();
    display
        .blit(Area::new(x, y, info.width, info.height), image.as_bytes())
        .map_err(ShowError::Display)?;
    log::debug!("png: shown {}x{}", info.width, info.height);
    Ok(info)
}

#[cfg(feature = "std")]
fn open_file<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<IoSource<std::io::BufReader<std::fs::File>>, DecodeError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|err| {
        log::debug!("{}: {}", path.display(), err);
        DecodeError::Io
    })?;
    Ok(IoSource(std::io::BufReader::new(file)))
}

/// [`show_bmp`] on a file; the file is closed before returning.
#[cfg(feature = "std")]
pub fn show_bmp_file<P, D>(
    path: P,
    x: u32,
    y: u32,
    display: &mut D,
    options: &ShowOptions,
) -> Result<ImageInfo, ShowError<D::Error>>
where
    P: AsRef<std::path::Path>,
    D: DisplayBlit + ?Sized,
{
    show_bmp(open_file(path)?, x, y, display, options)
}

/// [`show_png`] on a file; the file is closed before the display write.
#[cfg(feature = "std")]
pub fn show_png_file<P, D>(
    path: P,
    x: u32,
    y: u32,
    display: &mut D,
    options: &ShowOptions,
) -> Result<ImageInfo, ShowError<D::Error>>
where
    P: AsRef<std::path::Path>,
    D: DisplayBlit + ?Sized,
{
    show_png(open_file(path)?, x, y, display, options)
}

/// Any embedded-graphics RGB565 target as a blit sink.
#[cfg(feature = "embedded")]
pub struct DrawTargetBlit<'a, T>(pub &'a mut T);

#[cfg(feature = "embedded")]
impl<T: DrawTarget<Color = Rgb565>> DisplayBlit for DrawTargetBlit<'_, T> {
    type Error = T::Error;

    fn blit(&mut self, area: Area, pixels: &[u8]) -> Result<(), Self::Error> {
        // areas built by `show_*` always fit; others are pushed off-panel
        let coord = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        let rect = Rectangle::new(
            Point::new(coord(area.left), coord(area.top)),
            Size::new(area.width, area.height),
        );
        self.0.fill_contiguous(
            &rect,
            pixels
                .chunks_exact(BYTES_PER_PIXEL)
                .map(|p| color::rgb565_from_be([p[0], p[1]])),
        )
    }
}
