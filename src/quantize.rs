//! Error diffusion from 8 bpp to 2 bpp.
//!
//! Output levels 0..=3 stand for the gray values 0, 85, 170 and 255. Unlike
//! the binary tables, the 2 bpp tables round the error shares to the
//! nearest integer.

use crate::{
    ClipParams, DitherTables, LineBuffers, LineDither, Pix, Result,
    binarize::{Diffusion, diffuse_line},
    dither,
    pix::set_data_dibit,
};
use log::{debug, trace};

impl DitherTables {
    /// Tables for four output levels.
    ///
    /// `clip.lower` and `clip.upper` play the same role as for 1 bpp: values
    /// within them of black or white do not propagate error.
    pub fn new_2bpp(clip: ClipParams) -> Self {
        trace!("building 8 -> 2 dither tables for {clip:?}");
        let black = clip.lower as i32;
        let white = 255 - clip.upper as i32;
        let mut value = [0u8; 256];
        let mut tab38 = [0i32; 256];
        let mut tab14 = [0i32; 256];

        // `up` rounds a positive excess; `down` a negative one.
        let up = |e: i32| ((3 * e + 4) / 8, (e + 2) / 4);
        let down = |e: i32| ((3 * e - 4) / 8, (e - 2) / 4);

        for i in 0..256i32 {
            let (level, (d38, d14)) = if i <= black {
                (0, (0, 0))
            } else if i < 43 {
                (0, up(i))
            } else if i < 85 {
                (1, down(i - 85))
            } else if i < 128 {
                (1, up(i - 85))
            } else if i < 170 {
                (2, down(i - 170))
            } else if i < 213 {
                (2, up(i - 170))
            } else if i < white {
                (3, down(i - 255))
            } else {
                (3, (0, 0))
            };
            value[i as usize] = level;
            tab38[i as usize] = d38;
            tab14[i as usize] = d14;
        }

        Self {
            value,
            tab38,
            tab14,
        }
    }
}

/// Table-driven error diffusion to four levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoBitDither {
    tables: DitherTables,
}

impl TwoBitDither {
    pub fn new(clip: ClipParams) -> Self {
        Self {
            tables: DitherTables::new_2bpp(clip),
        }
    }
}

impl Default for TwoBitDither {
    fn default() -> Self {
        Self::new(ClipParams::default_2bpp())
    }
}

impl LineDither for TwoBitDither {
    fn output_depth(&self) -> u32 {
        2
    }

    fn dither_line(
        &self,
        lined: &mut [u32],
        bufs: &mut LineBuffers,
        last_line: bool,
    ) {
        lined.fill(0);
        let tables = &self.tables;
        diffuse_line(
            bufs,
            last_line,
            |oval| -> Diffusion { tables.lookup(oval) },
            |j, level| set_data_dibit(lined, j, level as u32),
        );
    }
}

/// Dithers to 2 bpp with the default 2 bpp clip thresholds.
pub fn dither_to_2bpp(pix: &Pix) -> Result<Pix> {
    dither_to_2bpp_with_clip(pix, ClipParams::default_2bpp())
}

pub fn dither_to_2bpp_with_clip(pix: &Pix, clip: ClipParams) -> Result<Pix> {
    debug!("dither to 2 bpp with {clip:?}");
    dither(pix, &TwoBitDither::new(clip))
}
