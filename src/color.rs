#[cfg(feature = "embedded")]
use embedded_graphics::pixelcolor::{Bgr565, Rgb565, raw::RawU16};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Same luminance on all three channels.
    #[inline]
    pub const fn gray(y: u8) -> Self {
        Self { r: y, g: y, b: y }
    }

    /// Bitmap files store triplets as B, G, R.
    #[inline]
    pub const fn from_bgr(bgr: [u8; 3]) -> Self {
        Self::new(bgr[2], bgr[1], bgr[0])
    }

    #[inline]
    pub const fn to_rgb565(self) -> u16 {
        pack_rgb565(self.r, self.g, self.b)
    }
}

/// Packs 8-bit channels into 5:6:5 by truncation, no rounding.
#[inline]
pub const fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Appends one pixel in the byte order the panel expects (big-endian).
#[inline]
pub(crate) fn push_rgb565(output: &mut alloc::vec::Vec<u8>, rgb: Rgb) {
    output.extend_from_slice(&rgb.to_rgb565().to_be_bytes());
}

/// expand 5bit value to 8bit
#[inline]
pub(crate) const fn u5_to_u8(val: u8) -> u8 {
    let val = val.wrapping_shl(3);
    val | val.wrapping_shr(5)
}

/// expand 6bit value to 8bit
#[inline]
pub(crate) const fn u6_to_u8(val: u8) -> u8 {
    let val = val.wrapping_shl(2);
    val | val.wrapping_shr(6)
}

impl From<u16> for Rgb {
    /// Widens a packed RGB565 value back to 8 bits per channel.
    #[inline]
    fn from(packed: u16) -> Self {
        Self::new(
            u5_to_u8((packed >> 11) as u8 & 0x1F),
            u6_to_u8((packed >> 5) as u8 & 0x3F),
            u5_to_u8(packed as u8 & 0x1F),
        )
    }
}

macro_rules! from_rgb {
    ($ident:ident, $shift_r:expr, $shift_g:expr, $shift_b:expr) => {
        #[cfg(feature = "embedded")]
        impl From<Rgb> for $ident {
            #[inline]
            fn from(rgb: Rgb) -> Self {
                Self::new(
                    rgb.r.wrapping_shr($shift_r),
                    rgb.g.wrapping_shr($shift_g),
                    rgb.b.wrapping_shr($shift_b),
                )
            }
        }
    };
}

from_rgb!(Rgb565, 3, 2, 3);
from_rgb!(Bgr565, 3, 2, 3);

/// Reinterprets a big-endian pixel pair as an embedded-graphics color.
#[cfg(feature = "embedded")]
#[inline]
pub fn rgb565_from_be(bytes: [u8; 2]) -> Rgb565 {
    Rgb565::from(RawU16::new(u16::from_be_bytes(bytes)))
}
