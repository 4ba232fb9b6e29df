//! Growable numeric arrays and Floyd-Steinberg binarization of packed gray
//! rasters.
//!
//! [`Numa`] is a reference-counted, growable array of `f32` with integer
//! views, text serialization and a set of statistics and histogram helpers.
//! [`NumaArray`], [`Numa2d`] and [`NumaHash`] collect several of them.
//!
//! [`Pix`] is a word-packed raster of depth 1, 2, 4 or 8. An 8 bpp [`Pix`]
//! can be error-diffused to 1 bpp with [`dither_to_binary()`] (or the
//! table-driven [`dither_to_binary_lut()`], which gives identical output) and
//! to 2 bpp with [`dither_to_2bpp()`].
//!
//! ## Examples
//!
//! ```
//! use pixdither::*;
//!
//! let gray: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
//! let pix = Pix::from_gray_bytes(8, 8, &gray)?;
//!
//! let direct = dither_to_binary(&pix)?;
//! let lut = dither_to_binary_lut(&pix, ClipParams::default())?;
//! assert_eq!(direct, lut);
//!
//! let hist = gray_histogram(&direct, 1)?;
//! assert_eq!(hist.get_sum(), 64.0);
//! # Ok::<(), pixdither::Error>(())
//! ```
//!
//! ## Features
//!
//! * `rayon` (default): thresholding and histograms process rows in
//!   parallel. Error diffusion is inherently sequential.
//! * `serde`: derives `Serialize`/`Deserialize` on [`ClipParams`],
//!   [`FloydSteinberg`], [`SortOrder`] and [`AccessFlag`].

mod binarize;
mod error;
mod histogram;
mod numa;
mod numa2d;
mod numa_func;
mod numa_hash;
mod numaa;
mod pix;
mod quantize;

pub use binarize::{
    ClipParams, Diffusion, DitherMethod, DitherTables, FloydSteinberg,
    FloydSteinbergLut, LineBuffers, LineDither, MIDPOINT, diffuse, dither,
    dither_to_binary, dither_to_binary_lut, dither_to_binary_with_clip,
    threshold_to_binary,
};
pub use error::{Error, Result};
pub use histogram::gray_histogram;
pub use numa::{DEFAULT_CAPACITY, NUMA_VERSION, Numa, WeakNuma};
pub use numa2d::Numa2d;
pub use numa_func::SortOrder;
pub use numa_hash::NumaHash;
pub use numaa::{AccessFlag, NumaArray};
pub use pix::Pix;
pub use quantize::{TwoBitDither, dither_to_2bpp, dither_to_2bpp_with_clip};
