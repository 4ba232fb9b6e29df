//! Growable array of [`Numa`] handles.

use crate::{Error, Numa, Result, numa::capacity_from_hint};
use num_traits::AsPrimitive;

/// How a [`Numa`] is handed out of, or stored into, a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessFlag {
    /// Independent deep copy.
    Copy,
    /// Alias sharing the same storage.
    Clone,
}

impl AccessFlag {
    pub(crate) fn apply(self, na: &Numa) -> Result<Numa> {
        match self {
            AccessFlag::Copy => na.copy(),
            AccessFlag::Clone => Ok(na.clone()),
        }
    }
}

/// Array of [`Numa`] handles with the same doubling growth as [`Numa`].
#[derive(Debug)]
pub struct NumaArray {
    numa: Vec<Numa>,
    nalloc: usize,
}

impl NumaArray {
    /// Creates an empty array with room for `capacity_hint` handles; zero or
    /// less selects the default capacity.
    pub fn create(capacity_hint: i32) -> Result<Self> {
        let nalloc = capacity_from_hint(capacity_hint);
        let mut numa = Vec::new();
        numa.try_reserve_exact(nalloc)?;
        Ok(Self { numa, nalloc })
    }

    /// Stores `na`, taking ownership of the handle.
    pub fn push(&mut self, na: Numa) -> Result<()> {
        if self.numa.len() >= self.nalloc {
            self.extend_array()?;
        }
        self.numa.push(na);
        Ok(())
    }

    /// Stores a copy or a clone of `na`.
    pub fn add_numa(&mut self, na: &Numa, flag: AccessFlag) -> Result<()> {
        self.push(flag.apply(na)?)
    }

    /// Doubles the capacity of the handle array.
    pub fn extend_array(&mut self) -> Result<()> {
        let nalloc = 2 * self.nalloc;
        self.numa.try_reserve_exact(nalloc - self.numa.len())?;
        self.nalloc = nalloc;
        Ok(())
    }

    /// Number of stored handles.
    pub fn get_count(&self) -> usize {
        self.numa.len()
    }

    pub fn capacity(&self) -> usize {
        self.nalloc
    }

    /// Total count of numbers over all stored arrays.
    pub fn get_number_count(&self) -> usize {
        self.numa.iter().map(Numa::count).sum()
    }

    pub fn get_numa(&self, index: usize, flag: AccessFlag) -> Result<Numa> {
        flag.apply(self.slot(index)?)
    }

    /// Replaces the handle at `index`, releasing the old one.
    pub fn replace_numa(&mut self, index: usize, na: Numa) -> Result<()> {
        let len = self.numa.len();
        let slot = self.numa.get_mut(index).ok_or(Error::Index { index, len })?;
        *slot = na;
        Ok(())
    }

    /// Appends `val` to the existing array at `index`.
    pub fn add_number<T: AsPrimitive<f32>>(
        &self,
        index: usize,
        val: T,
    ) -> Result<()> {
        self.slot(index)?.add_number(val)
    }

    fn slot(&self, index: usize) -> Result<&Numa> {
        self.numa.get(index).ok_or(Error::Index {
            index,
            len: self.numa.len(),
        })
    }
}
