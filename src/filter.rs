//! Scanline filters of the chunked (PNG) container.
//!
//! Every row of the inflated stream starts with one filter byte. The rest
//! of the row is a prediction residual against already known bytes: `a` is
//! the byte one pixel to the left, `b` the byte above, `c` the byte above
//! and to the left. Missing neighbours (first pixel, first row) count as 0.

use crate::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];
}

impl TryFrom<u8> for FilterType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterType::None),
            1 => Ok(FilterType::Sub),
            2 => Ok(FilterType::Up),
            3 => Ok(FilterType::Average),
            4 => Ok(FilterType::Paeth),
            _ => Err(DecodeError::CorruptData),
        }
    }
}

/// Reconstructs `row` in place. `prev` is the previous reconstructed row
/// (all zero before the first row) and must be as long as `row`.
pub fn unfilter_row(filter: FilterType, row: &mut [u8], prev: &[u8], bpp: usize) {
    debug_assert_eq!(row.len(), prev.len());
    let len = row.len();
    match filter {
        FilterType::None => {}
        FilterType::Sub => {
            for i in bpp..len {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FilterType::Up => {
            for i in 0..len {
                row[i] = row[i].wrapping_add(prev[i]);
            }
        }
        FilterType::Average => {
            for i in 0..len {
                let a = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                let b = prev[i] as u16;
                row[i] = row[i].wrapping_add(((a + b) / 2) as u8);
            }
        }
        FilterType::Paeth => {
            for i in 0..len {
                let a = if i >= bpp { row[i - bpp] } else { 0 };
                let b = prev[i];
                let c = if i >= bpp { prev[i - bpp] } else { 0 };
                row[i] = row[i].wrapping_add(paeth(a, b, c));
            }
        }
    }
}

/// Inverse of [`unfilter_row`]: writes the residual of `raw` into `output`.
pub fn filter_row(filter: FilterType, raw: &[u8], prev: &[u8], bpp: usize, output: &mut [u8]) {
    debug_assert_eq!(raw.len(), prev.len());
    debug_assert_eq!(raw.len(), output.len());
    for i in 0..raw.len() {
        let a = if i >= bpp { raw[i - bpp] } else { 0 };
        let b = prev[i];
        let c = if i >= bpp { prev[i - bpp] } else { 0 };
        let predicted = match filter {
            FilterType::None => 0,
            FilterType::Sub => a,
            FilterType::Up => b,
            FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
            FilterType::Paeth => paeth(a, b, c),
        };
        output[i] = raw[i].wrapping_sub(predicted);
    }
}

/// Picks whichever neighbour is closest to `a + b - c`; ties go to `a`,
/// then `b`.
#[inline]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = a as i16;
    let b = b as i16;
    let c = c as i16;
    let p = a + b - c;
    let pa = (p - a).unsigned_abs();
    let pb = (p - b).unsigned_abs();
    let pc = (p - c).unsigned_abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}
