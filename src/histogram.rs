//! Gray-level histograms of a [`Pix`], returned as a [`Numa`].

use crate::{
    Numa, Pix, Result,
    error::precondition,
    pix::get_sample,
};
use log::debug;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Histogram with `2^depth` bins of the pixels of `pix`.
///
/// Only every `factor`-th row and column is sampled. For 1 bpp the whole
/// raster is always counted.
pub fn gray_histogram(pix: &Pix, factor: usize) -> Result<Numa> {
    if factor < 1 {
        return Err(precondition("sampling factor < 1"));
    }
    let (w, h, d) = (pix.width() as usize, pix.height() as usize, pix.depth());
    let size = 1usize << d;
    debug!("gray histogram of {w}x{h}x{d}, factor {factor}");

    let counts: Vec<u64> = if d == 1 {
        let on = pix.count_pixels()?;
        vec![(w * h) as u64 - on, on]
    } else {
        let rows: Vec<usize> = (0..h).step_by(factor).collect();
        let accumulate = |mut acc: Vec<u64>, &i: &usize| {
            let line = pix.line(i);
            for j in (0..w).step_by(factor) {
                acc[get_sample(line, j, d) as usize] += 1;
            }
            acc
        };

        #[cfg(feature = "rayon")]
        let counts = rows
            .par_iter()
            .fold(|| vec![0u64; size], accumulate)
            .reduce(
                || vec![0u64; size],
                |mut a, b| {
                    a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                    a
                },
            );
        #[cfg(not(feature = "rayon"))]
        let counts = rows.iter().fold(vec![0u64; size], accumulate);

        counts
    };

    let na = Numa::with_capacity(size)?;
    na.set_count(size)?;
    na.with_storage(|hist| {
        for (bin, count) in hist.iter_mut().zip(counts) {
            *bin = count as f32;
        }
    })?;
    Ok(na)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_sample() {
        let pix = Pix::from_gray_bytes(3, 2, &[0, 7, 7, 255, 7, 0]).unwrap();
        let hist = gray_histogram(&pix, 1).unwrap();
        assert_eq!(hist.count(), 256);
        assert_eq!(hist.get_int_value(0).unwrap(), 2);
        assert_eq!(hist.get_int_value(7).unwrap(), 3);
        assert_eq!(hist.get_int_value(255).unwrap(), 1);
        assert_eq!(hist.get_sum(), 6.0);
    }

    #[test]
    fn subsamples_rows_and_columns() {
        let pix = Pix::from_gray_bytes(3, 2, &[0, 7, 7, 255, 7, 0]).unwrap();
        let hist = gray_histogram(&pix, 2).unwrap();
        // Only (0, 0) and (2, 0) are sampled.
        assert_eq!(hist.get_int_value(0).unwrap(), 1);
        assert_eq!(hist.get_int_value(7).unwrap(), 1);
        assert!(gray_histogram(&pix, 0).is_err());
    }

    #[test]
    fn binary_histogram() {
        let mut pix = Pix::new(5, 2, 1).unwrap();
        pix.set_pixel(1, 1, 1).unwrap();
        let hist = gray_histogram(&pix, 3).unwrap();
        assert_eq!(hist.get_int_array(), vec![9, 1]);
    }
}
