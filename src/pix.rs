//! Minimal packed raster.
//!
//! Pixels are packed MSB-first into 32-bit words and every row starts on a
//! word boundary, so a row occupies [`Pix::wpl()`] words. Supported depths
//! are 1, 2, 4 and 8 bits per pixel.

use crate::{Error, Result, error::precondition, numa::alloc_zeroed};

/// A packed raster image of depth 1, 2, 4 or 8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pix {
    width: u32,
    height: u32,
    depth: u32,
    wpl: usize,
    data: Vec<u32>,
}

impl Pix {
    /// Allocates a zeroed raster.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(precondition(format!(
                "invalid dimensions {width}x{height}"
            )));
        }
        if !matches!(depth, 1 | 2 | 4 | 8) {
            return Err(precondition(format!(
                "depth {depth} not in {{1, 2, 4, 8}}"
            )));
        }
        let wpl = (width as usize * depth as usize).div_ceil(32);
        let len = wpl
            .checked_mul(height as usize)
            .ok_or_else(|| precondition("raster too large"))?;
        Ok(Self {
            width,
            height,
            depth,
            wpl,
            data: alloc_zeroed(len)?,
        })
    }

    /// Zeroed raster with the same geometry and depth.
    pub fn create_template(&self) -> Result<Self> {
        Self::new(self.width, self.height, self.depth)
    }

    /// Builds an 8 bpp raster from row-major samples.
    pub fn from_gray_bytes(
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<Self> {
        let expected = width as usize * height as usize;
        if bytes.len() != expected {
            return Err(precondition(format!(
                "data length {} doesn't match {width}x{height} = {expected}",
                bytes.len()
            )));
        }
        let mut pix = Self::new(width, height, 8)?;
        let wpl = pix.wpl;
        for (row, line) in bytes
            .chunks_exact(width as usize)
            .zip(pix.data.chunks_exact_mut(wpl))
        {
            for (j, &val) in row.iter().enumerate() {
                set_data_byte(line, j, val);
            }
        }
        Ok(pix)
    }

    /// One sample per pixel in row-major order, unpacked to a byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.width as usize * self.height as usize);
        for line in self.data.chunks_exact(self.wpl) {
            for j in 0..self.width as usize {
                out.push(get_sample(line, j, self.depth) as u8);
            }
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Words per line.
    pub fn wpl(&self) -> usize {
        self.wpl
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Words of row `i`.
    pub fn line(&self, i: usize) -> &[u32] {
        &self.data[i * self.wpl..(i + 1) * self.wpl]
    }

    pub fn line_mut(&mut self, i: usize) -> &mut [u32] {
        &mut self.data[i * self.wpl..(i + 1) * self.wpl]
    }

    fn check_coords(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width {
            return Err(Error::Index {
                index: x as usize,
                len: self.width as usize,
            });
        }
        if y >= self.height {
            return Err(Error::Index {
                index: y as usize,
                len: self.height as usize,
            });
        }
        Ok(())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<u32> {
        self.check_coords(x, y)?;
        Ok(get_sample(self.line(y as usize), x as usize, self.depth))
    }

    /// Stores `val`, masked to the raster depth.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        self.check_coords(x, y)?;
        let depth = self.depth;
        let line = self.line_mut(y as usize);
        let j = x as usize;
        match depth {
            1 => {
                if val & 1 == 0 {
                    clear_data_bit(line, j)
                } else {
                    set_data_bit(line, j)
                }
            }
            2 => set_data_dibit(line, j, val),
            4 => set_data_qbit(line, j, val),
            _ => set_data_byte(line, j, val as u8),
        }
        Ok(())
    }

    /// Number of ON pixels in a 1 bpp raster.
    pub fn count_pixels(&self) -> Result<u64> {
        if self.depth != 1 {
            return Err(precondition("count_pixels needs a 1 bpp raster"));
        }
        let width = self.width as usize;
        let full = width / 32;
        let rem = width % 32;
        let mask = if rem == 0 { 0 } else { !0u32 << (32 - rem) };
        Ok(self
            .data
            .chunks_exact(self.wpl)
            .map(|line| {
                let body: u64 =
                    line[..full].iter().map(|w| w.count_ones() as u64).sum();
                let tail = if rem == 0 {
                    0
                } else {
                    (line[full] & mask).count_ones() as u64
                };
                body + tail
            })
            .sum())
    }
}

#[inline]
pub(crate) fn get_sample(line: &[u32], j: usize, depth: u32) -> u32 {
    match depth {
        1 => get_data_bit(line, j),
        2 => get_data_dibit(line, j),
        4 => get_data_qbit(line, j),
        _ => get_data_byte(line, j) as u32,
    }
}

#[inline]
pub(crate) fn get_data_bit(line: &[u32], j: usize) -> u32 {
    (line[j >> 5] >> (31 - (j & 31))) & 1
}

#[inline]
pub(crate) fn set_data_bit(line: &mut [u32], j: usize) {
    line[j >> 5] |= 0x8000_0000 >> (j & 31);
}

#[inline]
pub(crate) fn clear_data_bit(line: &mut [u32], j: usize) {
    line[j >> 5] &= !(0x8000_0000 >> (j & 31));
}

#[inline]
pub(crate) fn get_data_dibit(line: &[u32], j: usize) -> u32 {
    (line[j >> 4] >> (2 * (15 - (j & 15)))) & 3
}

#[inline]
pub(crate) fn set_data_dibit(line: &mut [u32], j: usize, val: u32) {
    let shift = 2 * (15 - (j & 15));
    let word = &mut line[j >> 4];
    *word = (*word & !(3 << shift)) | ((val & 3) << shift);
}

#[inline]
pub(crate) fn get_data_qbit(line: &[u32], j: usize) -> u32 {
    (line[j >> 3] >> (4 * (7 - (j & 7)))) & 0xf
}

#[inline]
pub(crate) fn set_data_qbit(line: &mut [u32], j: usize, val: u32) {
    let shift = 4 * (7 - (j & 7));
    let word = &mut line[j >> 3];
    *word = (*word & !(0xf << shift)) | ((val & 0xf) << shift);
}

#[inline]
pub(crate) fn get_data_byte(line: &[u32], j: usize) -> u8 {
    (line[j >> 2] >> (8 * (3 - (j & 3)))) as u8
}

#[inline]
pub(crate) fn set_data_byte(line: &mut [u32], j: usize, val: u8) {
    let shift = 8 * (3 - (j & 3));
    let word = &mut line[j >> 2];
    *word = (*word & !(0xff << shift)) | ((val as u32) << shift);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_word_aligned() {
        assert_eq!(Pix::new(5, 2, 8).unwrap().wpl(), 2);
        assert_eq!(Pix::new(33, 2, 1).unwrap().wpl(), 2);
        assert_eq!(Pix::new(16, 1, 2).unwrap().wpl(), 1);
        assert!(Pix::new(0, 2, 8).is_err());
        assert!(Pix::new(2, 2, 16).is_err());
    }

    #[test]
    fn samples_pack_msb_first() {
        let pix = Pix::from_gray_bytes(5, 1, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(pix.data(), &[0x0102_0304, 0x0500_0000]);
        assert_eq!(pix.to_bytes(), vec![1, 2, 3, 4, 5]);

        let mut pix = Pix::new(3, 1, 1).unwrap();
        pix.set_pixel(0, 0, 1).unwrap();
        pix.set_pixel(2, 0, 1).unwrap();
        assert_eq!(pix.data(), &[0xa000_0000]);
        pix.set_pixel(0, 0, 0).unwrap();
        assert_eq!(pix.get_pixel(0, 0).unwrap(), 0);
        assert!(pix.get_pixel(3, 0).is_err());
    }

    #[test]
    fn count_ignores_padding() {
        let mut pix = Pix::new(35, 2, 1).unwrap();
        pix.data_mut().fill(!0);
        assert_eq!(pix.count_pixels().unwrap(), 70);
    }

    #[test]
    fn dibits_and_qbits() {
        let mut pix = Pix::new(4, 1, 2).unwrap();
        for x in 0..4 {
            pix.set_pixel(x, 0, x).unwrap();
        }
        assert_eq!(pix.data()[0], 0x1b00_0000);

        let mut pix = Pix::new(2, 1, 4).unwrap();
        pix.set_pixel(1, 0, 0xa).unwrap();
        assert_eq!(pix.to_bytes(), vec![0, 0xa]);
    }
}
