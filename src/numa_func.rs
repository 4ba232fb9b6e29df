//! Statistics, sequences, sorting and histograms over [`Numa`].

use crate::{Error, Numa, Result, error::precondition, numa::round_half_up};
use log::warn;
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    #[default]
    Increasing,
    Decreasing,
}

impl SortOrder {
    #[inline]
    fn compare(self, a: &f32, b: &f32) -> Ordering {
        match self {
            SortOrder::Increasing => a.total_cmp(b),
            SortOrder::Decreasing => b.total_cmp(a),
        }
    }
}

impl Numa {
    /// Smallest value and the index of its first occurrence.
    pub fn get_min(&self) -> Option<(f32, usize)> {
        let values = self.get_float_array();
        let mut best: Option<(f32, usize)> = None;
        for (i, &val) in values.iter().enumerate() {
            if best.is_none_or(|(min, _)| val < min) {
                best = Some((val, i));
            }
        }
        best
    }

    /// Largest value and the index of its first occurrence.
    pub fn get_max(&self) -> Option<(f32, usize)> {
        let values = self.get_float_array();
        let mut best: Option<(f32, usize)> = None;
        for (i, &val) in values.iter().enumerate() {
            if best.is_none_or(|(max, _)| val > max) {
                best = Some((val, i));
            }
        }
        best
    }

    pub fn get_sum(&self) -> f32 {
        self.get_float_array().iter().sum()
    }

    /// Running sums: element `i` is the sum of elements `0..=i`.
    pub fn get_partial_sums(&self) -> Result<Numa> {
        let values = self.get_float_array();
        let nasum = Numa::with_capacity(values.len())?;
        let mut sum = 0.0;
        for val in values {
            sum += val;
            nasum.add_number(sum)?;
        }
        Ok(nasum)
    }

    /// Sum over `first..=last`, with `last` clipped to the array.
    ///
    /// An interval starting past the end sums to zero.
    pub fn get_sum_on_interval(&self, first: usize, last: usize) -> f32 {
        let values = self.get_float_array();
        if first >= values.len() || first > last {
            return 0.0;
        }
        let last = last.min(values.len() - 1);
        values[first..=last].iter().sum()
    }

    /// Every `factor`-th element, starting with the first.
    pub fn subsample(&self, factor: usize) -> Result<Numa> {
        if factor < 1 {
            return Err(precondition("subsample factor < 1"));
        }
        let nad = Numa::create(0)?;
        for val in self.get_float_array().into_iter().step_by(factor) {
            nad.add_number(val)?;
        }
        Ok(nad)
    }

    /// `size` values `start, start + increment, ...`.
    pub fn make_sequence(
        start: f32,
        increment: f32,
        size: usize,
    ) -> Result<Numa> {
        let na = Numa::with_capacity(size)?;
        for i in 0..size {
            na.add_number(start + i as f32 * increment)?;
        }
        Ok(na)
    }

    pub fn make_constant(val: f32, size: usize) -> Result<Numa> {
        Self::make_sequence(val, 0.0, size)
    }

    /// Sorted copy.
    pub fn sort(&self, order: SortOrder) -> Result<Numa> {
        let nasort = self.copy()?;
        nasort.sort_in_place(order);
        Ok(nasort)
    }

    pub fn sort_in_place(&self, order: SortOrder) {
        self.with_values(|values| values.sort_by(|a, b| order.compare(a, b)));
    }

    /// Indices that would sort the array, stored as numbers.
    ///
    /// Equal values keep their original relative order.
    pub fn get_sort_index(&self, order: SortOrder) -> Result<Numa> {
        let values = self.get_float_array();
        let mut indices: Vec<usize> = (0..values.len()).collect();
        indices.sort_by(|&a, &b| order.compare(&values[a], &values[b]));
        let naindex = Numa::with_capacity(values.len())?;
        for i in indices {
            naindex.add_number(i as f32)?;
        }
        Ok(naindex)
    }

    /// Element `n / 2` of the decreasing sort; `None` when empty.
    pub fn get_median(&self) -> Option<f32> {
        let mut values = self.get_float_array();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| SortOrder::Decreasing.compare(a, b));
        Some(values[values.len() / 2])
    }

    /// Copy with every value rounded half-up to an integer.
    pub fn convert_to_int(&self) -> Result<Numa> {
        let values = self.get_int_array();
        let nai = Numa::with_capacity(values.len())?;
        for val in values {
            nai.add_number(val)?;
        }
        Ok(nai)
    }

    /// Histogram of the rounded values in bins of `binsize`, starting at 0.
    ///
    /// Values below zero or above `maxsize` are ignored, and only as many
    /// bins as the data needs are allocated.
    pub fn make_histogram_clipped(
        &self,
        binsize: i32,
        maxsize: i32,
    ) -> Result<Numa> {
        if maxsize < 1 {
            return Err(precondition("maxsize must be >= 1"));
        }
        let mut binsize = binsize;
        if binsize < 1 {
            warn!("histogram binsize {binsize} < 1; using 1");
            binsize = 1;
        }
        if binsize > maxsize {
            warn!("histogram binsize {binsize} > maxsize; using {maxsize}");
            binsize = maxsize;
        }

        let imaxval = self.get_max().map_or(0, |(max, _)| round_half_up(max));
        let imaxsize = imaxval.min(maxsize.saturating_add(1)).max(0);
        let nbins = (1 + imaxsize / binsize) as usize;

        let nahist = Numa::with_capacity(nbins)?;
        nahist.set_count(nbins)?;
        nahist.with_storage(|hist| {
            for ival in self.get_int_array() {
                if ival < 0 {
                    continue;
                }
                let ibin = (ival / binsize) as usize;
                if ibin < nbins {
                    hist[ibin] += 1.0;
                }
            }
        })?;
        Ok(nahist)
    }

    /// Merges each run of `newsize` adjacent bins into one.
    pub fn rebin_histogram(&self, newsize: usize) -> Result<Numa> {
        if newsize <= 1 {
            return Err(precondition("newsize must be > 1"));
        }
        let counts = self.get_int_array();
        if counts.is_empty() {
            return Err(precondition("no bins in histogram"));
        }
        let nad = Numa::with_capacity(counts.len().div_ceil(newsize))?;
        for chunk in counts.chunks(newsize) {
            nad.add_number(chunk.iter().sum::<i32>())?;
        }
        Ok(nad)
    }

    /// Scales the histogram so its bins sum to `area`.
    pub fn normalize_histogram(&self, area: f32) -> Result<Numa> {
        if area <= 0.0 {
            return Err(precondition("area must be > 0.0"));
        }
        let values = self.get_float_array();
        if values.is_empty() {
            return Err(precondition("no bins in histogram"));
        }
        let sum: f32 = values.iter().sum();
        if sum == 0.0 {
            return Err(precondition("histogram sums to zero"));
        }
        let factor = area / sum;
        let nad = Numa::with_capacity(values.len())?;
        for val in values {
            nad.add_number(val * factor)?;
        }
        Ok(nad)
    }

    /// Appends `src[start..=end]` to `self`; `end == None` means the last
    /// element. `src` may alias `self`.
    pub fn join(
        &self,
        src: &Numa,
        start: usize,
        end: Option<usize>,
    ) -> Result<()> {
        let values = src.get_float_array();
        let ns = values.len();
        if start >= ns {
            return Err(Error::Index {
                index: start,
                len: ns,
            });
        }
        let end = end.unwrap_or(ns - 1);
        if end >= ns {
            return Err(Error::Index { index: end, len: ns });
        }
        if start > end {
            return Err(precondition("start > end; nothing to add"));
        }
        for &val in &values[start..=end] {
            self.add_number(val)?;
        }
        Ok(())
    }
}
