use crate::DecodeError;

/// Seekable byte handle the decoders read from.
///
/// Running out of bytes inside a structure is [`DecodeError::CorruptData`];
/// a failure of the handle itself is [`DecodeError::Io`].
pub trait Source {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError>;

    /// Moves to an absolute byte offset.
    fn seek(&mut self, pos: u64) -> Result<(), DecodeError>;

    fn skip(&mut self, mut n: usize) -> Result<(), DecodeError> {
        let mut trash = [0u8; 64];
        while n > 0 {
            let chunk = n.min(trash.len());
            self.read_exact(&mut trash[..chunk])?;
            n -= chunk;
        }
        Ok(())
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    #[inline]
    fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_le_bytes)
    }

    #[inline]
    fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_le_bytes)
    }

    #[inline]
    fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        self.read_array().map(i32::from_le_bytes)
    }

    #[inline]
    fn read_u32_be(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_be_bytes)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn seek(&mut self, pos: u64) -> Result<(), DecodeError> {
        (**self).seek(pos)
    }

    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        (**self).skip(n)
    }
}

/// In-memory image, e.g. a blob linked into flash.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    blob: &'a [u8],
    cursor: usize,
}

impl<'a> SliceSource<'a> {
    #[inline]
    pub const fn new(blob: &'a [u8]) -> Self {
        Self { blob, cursor: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl Source for SliceSource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        let end = self
            .cursor
            .checked_add(buf.len())
            .ok_or(DecodeError::CorruptData)?;
        let src = self
            .blob
            .get(self.cursor..end)
            .ok_or(DecodeError::CorruptData)?;
        buf.copy_from_slice(src);
        self.cursor = end;
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<(), DecodeError> {
        self.cursor = usize::try_from(pos).map_err(|_| DecodeError::Io)?;
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        let end = self.cursor.saturating_add(n);
        if end > self.blob.len() {
            return Err(DecodeError::CorruptData);
        }
        self.cursor = end;
        Ok(())
    }
}

/// Adapter for anything `std::io::Read + Seek`, such as a `File`.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSource<R>(pub R);

#[cfg(feature = "std")]
impl<R> IoSource<R> {
    #[inline]
    pub fn into_inner(self) -> R {
        self.0
    }
}

#[cfg(feature = "std")]
fn map_io_error(err: std::io::Error) -> DecodeError {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof => DecodeError::CorruptData,
        _ => {
            log::debug!("io error: {}", err);
            DecodeError::Io
        }
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read + std::io::Seek> Source for IoSource<R> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.0.read_exact(buf).map_err(map_io_error)
    }

    #[inline]
    fn seek(&mut self, pos: u64) -> Result<(), DecodeError> {
        self.0
            .seek(std::io::SeekFrom::Start(pos))
            .map(|_| ())
            .map_err(map_io_error)
    }
}
