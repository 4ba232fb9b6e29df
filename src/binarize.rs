//! Binarization of 8 bpp gray rasters.
//!
//! The main entry points are [`dither_to_binary()`] and friends, which use
//! Floyd-Steinberg error diffusion to produce a 1 bpp raster. Each pixel's
//! quantization error is spread over the not yet visited neighbors:
//!
//! ```text
//!          (i, j)    3/8 ->
//!   3/8 v  1/4 \>
//! ```
//!
//! i.e. 3/8 to the right, 3/8 below and 1/4 diagonally below-right. Weights
//! use truncating integer division and every neighbor is clamped to
//! `0..=255` as it is updated.
//!
//! Near-black and near-white pixels can be excluded from error propagation
//! with [`ClipParams`], which stops noise from building up in flat regions.
//!
//! Rows are processed top to bottom, left to right. The source raster is
//! never modified; the working copies live in [`LineBuffers`].

use crate::{
    Pix, Result,
    error::precondition,
    pix::{get_data_byte, get_data_qbit, set_data_bit},
};
use enum_dispatch::enum_dispatch;
use log::{debug, trace};
use once_cell::sync::Lazy;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Sources at or below this value are ON when thresholded at the midpoint.
pub const MIDPOINT: u8 = 127;

/// Clip thresholds that suppress error propagation near black and white.
///
/// A pixel binarized to ON propagates its value only if it exceeds
/// `lower`. A pixel binarized to OFF propagates its deficit `255 - value`
/// only if that exceeds `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipParams {
    pub lower: u8,
    pub upper: u8,
}

impl ClipParams {
    pub const fn new(lower: u8, upper: u8) -> Self {
        Self { lower, upper }
    }

    /// Defaults used when dithering to 2 bpp.
    pub const fn default_2bpp() -> Self {
        Self::new(5, 5)
    }
}

impl Default for ClipParams {
    /// Defaults used when dithering to 1 bpp.
    fn default() -> Self {
        Self::new(10, 10)
    }
}

/// Outcome of quantizing one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diffusion {
    /// Output sample. For 1 bpp, `1` means ON (dark).
    pub value: u8,
    /// Signed amount added to the right and lower neighbors.
    pub d38: i32,
    /// Signed amount added to the lower-right neighbor.
    pub d14: i32,
}

/// Quantizes one accumulated 8 bit value to a single bit.
///
/// Values above [`MIDPOINT`] become OFF and push their deficit to the
/// neighbors; values at or below become ON and push their excess. The
/// weights are `(3 * e) / 8` and `e / 4` with truncating division.
///
/// ```
/// # use pixdither::{ClipParams, diffuse};
/// let clip = ClipParams::new(0, 0);
/// let d = diffuse(64, clip);
/// assert_eq!((d.value, d.d38, d.d14), (1, 24, 16));
///
/// let d = diffuse(200, clip);
/// assert_eq!((d.value, d.d38, d.d14), (0, -20, -13));
/// ```
#[inline]
pub fn diffuse(oval: u8, clip: ClipParams) -> Diffusion {
    let oval = oval as i32;
    if oval > MIDPOINT as i32 {
        let eval = 255 - oval;
        if eval > clip.upper as i32 {
            Diffusion {
                value: 0,
                d38: -((3 * eval) / 8),
                d14: -(eval / 4),
            }
        } else {
            Diffusion::default()
        }
    } else if oval > clip.lower as i32 {
        Diffusion {
            value: 1,
            d38: (3 * oval) / 8,
            d14: oval / 4,
        }
    } else {
        Diffusion {
            value: 1,
            ..Diffusion::default()
        }
    }
}

#[inline(always)]
fn nudge(val: u8, delta: i32) -> u8 {
    (val as i32 + delta).clamp(0, 255) as u8
}

/// The two working rows of an error diffusion pass.
///
/// `current` holds the row being quantized, with error already received
/// from the row above and from pixels to its left. `next` holds the row
/// below, receiving error as `current` is processed.
#[derive(Debug, Clone)]
pub struct LineBuffers {
    current: Vec<u8>,
    next: Vec<u8>,
}

impl LineBuffers {
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(precondition("line buffers need width >= 1"));
        }
        Ok(Self {
            current: vec![0; width],
            next: vec![0; width],
        })
    }

    pub fn width(&self) -> usize {
        self.current.len()
    }

    pub fn current(&self) -> &[u8] {
        &self.current
    }

    pub fn next(&self) -> &[u8] {
        &self.next
    }

    /// Loads the first source row into `next`, ready for the first
    /// [`LineBuffers::rotate()`].
    pub fn prime(&mut self, first: &[u32]) {
        load_row(&mut self.next, first);
    }

    /// Moves `next` into `current` and loads the unmodified `following`
    /// source row into `next`. Pass `None` when `current` becomes the last
    /// row.
    pub fn rotate(&mut self, following: Option<&[u32]>) {
        std::mem::swap(&mut self.current, &mut self.next);
        if let Some(row) = following {
            load_row(&mut self.next, row);
        }
    }
}

fn load_row(buf: &mut [u8], line: &[u32]) {
    for (j, val) in buf.iter_mut().enumerate() {
        *val = get_data_byte(line, j);
    }
}

/// Diffuses one row held in `bufs.current`.
///
/// `rule` maps an accumulated value to its output and error shares; `write`
/// receives each column's output. On the last row only the right-hand
/// neighbor receives error, and the final pixel propagates nothing.
#[inline]
pub(crate) fn diffuse_line<F, W>(
    bufs: &mut LineBuffers,
    last_line: bool,
    rule: F,
    mut write: W,
) where
    F: Fn(u8) -> Diffusion,
    W: FnMut(usize, u8),
{
    let LineBuffers { current, next } = bufs;
    let last = current.len() - 1;

    for j in 0..last {
        let d = rule(current[j]);
        write(j, d.value);
        current[j + 1] = nudge(current[j + 1], d.d38);
        if !last_line {
            next[j] = nudge(next[j], d.d38);
            next[j + 1] = nudge(next[j + 1], d.d14);
        }
    }

    let d = rule(current[last]);
    write(last, d.value);
    if !last_line {
        next[last] = nudge(next[last], d.d38);
    }
}

/// Precomputed [`Diffusion`] for every 8 bit input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitherTables {
    pub(crate) value: [u8; 256],
    pub(crate) tab38: [i32; 256],
    pub(crate) tab14: [i32; 256],
}

static DEFAULT_1BPP_TABLES: Lazy<DitherTables> =
    Lazy::new(|| DitherTables::new_1bpp(ClipParams::default()));

impl DitherTables {
    /// Tables that reproduce [`diffuse()`] exactly.
    pub fn new_1bpp(clip: ClipParams) -> Self {
        trace!("building 8 -> 1 dither tables for {clip:?}");
        let all: [Diffusion; 256] =
            std::array::from_fn(|i| diffuse(i as u8, clip));
        Self {
            value: all.map(|d| d.value),
            tab38: all.map(|d| d.d38),
            tab14: all.map(|d| d.d14),
        }
    }

    /// Shared tables for [`ClipParams::default()`], built on first use.
    pub fn default_1bpp() -> &'static Self {
        &DEFAULT_1BPP_TABLES
    }

    #[inline(always)]
    pub fn lookup(&self, oval: u8) -> Diffusion {
        let i = oval as usize;
        Diffusion {
            value: self.value[i],
            d38: self.tab38[i],
            d14: self.tab14[i],
        }
    }
}

/// Dithers rows of a [`LineBuffers`] into a packed destination row.
#[enum_dispatch]
pub trait LineDither {
    /// Depth of the raster this method writes.
    fn output_depth(&self) -> u32;

    /// Quantizes `bufs.current` into `lined`, propagating error into the
    /// buffers. `lined` is fully overwritten.
    fn dither_line(
        &self,
        lined: &mut [u32],
        bufs: &mut LineBuffers,
        last_line: bool,
    );
}

/// Floyd-Steinberg to 1 bpp, computing every weight as it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloydSteinberg {
    clip: ClipParams,
}

impl FloydSteinberg {
    pub fn new(clip: ClipParams) -> Self {
        Self { clip }
    }
}

impl LineDither for FloydSteinberg {
    fn output_depth(&self) -> u32 {
        1
    }

    fn dither_line(
        &self,
        lined: &mut [u32],
        bufs: &mut LineBuffers,
        last_line: bool,
    ) {
        lined.fill(0);
        let clip = self.clip;
        diffuse_line(bufs, last_line, |oval| diffuse(oval, clip), |j, on| {
            if on != 0 {
                set_data_bit(lined, j);
            }
        });
    }
}

/// Floyd-Steinberg to 1 bpp driven by [`DitherTables`].
///
/// Produces the same output as [`FloydSteinberg`] for the same clips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloydSteinbergLut {
    tables: DitherTables,
}

impl FloydSteinbergLut {
    pub fn new(clip: ClipParams) -> Self {
        Self {
            tables: DitherTables::new_1bpp(clip),
        }
    }
}

impl LineDither for FloydSteinbergLut {
    fn output_depth(&self) -> u32 {
        1
    }

    fn dither_line(
        &self,
        lined: &mut [u32],
        bufs: &mut LineBuffers,
        last_line: bool,
    ) {
        lined.fill(0);
        let tables = &self.tables;
        diffuse_line(bufs, last_line, |oval| tables.lookup(oval), |j, on| {
            if on != 0 {
                set_data_bit(lined, j);
            }
        });
    }
}

/// Runtime selection of an error diffusion method.
///
/// # Example
///
/// ```rust
/// use pixdither::{ClipParams, DitherMethod, FloydSteinberg, Pix, dither};
///
/// let pix = Pix::from_gray_bytes(3, 1, &[0, 128, 255])?;
/// let method: DitherMethod =
///     FloydSteinberg::new(ClipParams::default()).into();
/// let out = dither(&pix, &method)?;
/// assert_eq!(out.depth(), 1);
/// # Ok::<(), pixdither::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[enum_dispatch(LineDither)]
pub enum DitherMethod {
    FloydSteinberg(FloydSteinberg),
    FloydSteinbergLut(FloydSteinbergLut),
    TwoBit(crate::quantize::TwoBitDither),
}

/// Error-diffuses an 8 bpp raster row by row with `method`.
///
/// Fails before writing anything if `pix` is not 8 bpp.
pub fn dither<M: LineDither>(pix: &Pix, method: &M) -> Result<Pix> {
    if pix.depth() != 8 {
        return Err(precondition(format!(
            "source depth {} is not 8 bpp",
            pix.depth()
        )));
    }
    let (w, h) = (pix.width(), pix.height());
    debug!(
        "error diffusion {w}x{h} to {} bpp",
        method.output_depth()
    );

    let mut pixd = Pix::new(w, h, method.output_depth())?;
    let mut bufs = LineBuffers::new(w as usize)?;
    let h = h as usize;

    bufs.prime(pix.line(0));
    for i in 0..h {
        let following = (i + 1 < h).then(|| pix.line(i + 1));
        bufs.rotate(following);
        method.dither_line(pixd.line_mut(i), &mut bufs, following.is_none());
    }
    Ok(pixd)
}

/// Dithers to 1 bpp with the default clip thresholds.
pub fn dither_to_binary(pix: &Pix) -> Result<Pix> {
    dither_to_binary_with_clip(pix, ClipParams::default())
}

/// Dithers to 1 bpp with explicit clip thresholds.
pub fn dither_to_binary_with_clip(pix: &Pix, clip: ClipParams) -> Result<Pix> {
    debug!("dither to binary with {clip:?}");
    dither(pix, &FloydSteinberg::new(clip))
}

/// Table-driven variant of [`dither_to_binary_with_clip()`]; same output.
pub fn dither_to_binary_lut(pix: &Pix, clip: ClipParams) -> Result<Pix> {
    debug!("dither to binary (lut) with {clip:?}");
    dither(pix, &FloydSteinbergLut::new(clip))
}

/// Fixed threshold from 4 or 8 bpp: a source value below `thresh` is ON.
pub fn threshold_to_binary(pix: &Pix, thresh: u32) -> Result<Pix> {
    let d = pix.depth();
    if d != 4 && d != 8 {
        return Err(precondition(format!("source depth {d} not 4 or 8 bpp")));
    }
    debug!("threshold {}x{} at {thresh}", pix.width(), pix.height());

    let mut pixd = Pix::new(pix.width(), pix.height(), 1)?;
    let (wpls, wpld) = (pix.wpl(), pixd.wpl());
    let width = pix.width() as usize;
    let run = |(lined, lines): (&mut [u32], &[u32])| {
        for j in 0..width {
            let val = if d == 8 {
                get_data_byte(lines, j) as u32
            } else {
                get_data_qbit(lines, j)
            };
            if val < thresh {
                set_data_bit(lined, j);
            }
        }
    };

    #[cfg(feature = "rayon")]
    pixd.data_mut()
        .par_chunks_mut(wpld)
        .zip(pix.data().par_chunks(wpls))
        .for_each(run);
    #[cfg(not(feature = "rayon"))]
    pixd.data_mut()
        .chunks_mut(wpld)
        .zip(pix.data().chunks(wpls))
        .for_each(run);

    Ok(pixd)
}
