//! Fixed-size 2D grid of lazily created [`Numa`] cells.

use crate::{
    Error, Numa, Result,
    error::precondition,
    numa::{alloc_zeroed, capacity_from_hint},
};
use num_traits::AsPrimitive;

/// A `nrows x ncols` grid whose cells hold a [`Numa`] once a number has
/// been stored there, and nothing before that.
#[derive(Debug)]
pub struct Numa2d {
    nrows: usize,
    ncols: usize,
    initsize: i32,
    cells: Vec<Option<Numa>>,
}

impl Numa2d {
    /// Creates an empty grid. `initsize` is the capacity hint for each cell
    /// array when it is first created.
    pub fn create(nrows: usize, ncols: usize, initsize: i32) -> Result<Self> {
        if nrows == 0 || ncols == 0 {
            return Err(precondition("rows and cols must both be >= 1"));
        }
        let len = nrows
            .checked_mul(ncols)
            .ok_or_else(|| precondition("grid size overflows"))?;
        Ok(Self {
            nrows,
            ncols,
            initsize,
            cells: alloc_zeroed(len)?,
        })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.nrows {
            return Err(Error::Index {
                index: row,
                len: self.nrows,
            });
        }
        if col >= self.ncols {
            return Err(Error::Index {
                index: col,
                len: self.ncols,
            });
        }
        Ok(row * self.ncols + col)
    }

    /// Appends `val` to the cell, creating its array on first use.
    pub fn add_number<T: AsPrimitive<f32>>(
        &mut self,
        row: usize,
        col: usize,
        val: T,
    ) -> Result<()> {
        let offset = self.offset(row, col)?;
        if let Some(na) = &self.cells[offset] {
            return na.add_number(val);
        }
        let na = Numa::with_capacity(capacity_from_hint(self.initsize))?;
        na.add_number(val)?;
        self.cells[offset] = Some(na);
        Ok(())
    }

    /// Count of numbers in the cell; `0` if it was never written.
    pub fn get_count(&self, row: usize, col: usize) -> Result<usize> {
        let offset = self.offset(row, col)?;
        Ok(self.cells[offset].as_ref().map_or(0, Numa::count))
    }

    /// Alias of the cell's array, or `None` if the cell is empty or the
    /// coordinates are out of range.
    pub fn get_numa(&self, row: usize, col: usize) -> Option<Numa> {
        let offset = self.offset(row, col).ok()?;
        self.cells[offset].clone()
    }

    pub fn get_float_value(
        &self,
        row: usize,
        col: usize,
        index: usize,
    ) -> Result<f32> {
        self.cell(row, col)?.get_float_value(index)
    }

    pub fn get_int_value(
        &self,
        row: usize,
        col: usize,
        index: usize,
    ) -> Result<i32> {
        self.cell(row, col)?.get_int_value(index)
    }

    fn cell(&self, row: usize, col: usize) -> Result<&Numa> {
        let offset = self.offset(row, col)?;
        self.cells[offset].as_ref().ok_or_else(|| {
            precondition(format!("no numa at ({row}, {col})"))
        })
    }
}
