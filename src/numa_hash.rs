//! [`Numa`] buckets addressed by `key % nbuckets`.

use crate::{
    Numa, Result,
    error::precondition,
    numa::{alloc_zeroed, capacity_from_hint},
};
use num_traits::AsPrimitive;

/// Hash table of [`Numa`] buckets. A bucket's array is created by the
/// first [`NumaHash::add()`] that lands in it.
#[derive(Debug)]
pub struct NumaHash {
    initsize: i32,
    buckets: Vec<Option<Numa>>,
}

impl NumaHash {
    /// `nbuckets` should preferably be prime.
    pub fn create(nbuckets: usize, initsize: i32) -> Result<Self> {
        if nbuckets == 0 {
            return Err(precondition("nbuckets must be >= 1"));
        }
        Ok(Self {
            initsize,
            buckets: alloc_zeroed(nbuckets)?,
        })
    }

    pub fn nbuckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, key: u32) -> usize {
        key as usize % self.buckets.len()
    }

    /// Alias of the bucket's array, if it exists.
    pub fn get_numa(&self, key: u32) -> Option<Numa> {
        self.buckets[self.bucket(key)].clone()
    }

    /// Appends `val` to the bucket for `key`.
    pub fn add<T: AsPrimitive<f32>>(&mut self, key: u32, val: T) -> Result<()> {
        let bucket = self.bucket(key);
        if let Some(na) = &self.buckets[bucket] {
            return na.add_number(val);
        }
        let na = Numa::with_capacity(capacity_from_hint(self.initsize))?;
        na.add_number(val)?;
        self.buckets[bucket] = Some(na);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_share_buckets_modulo() {
        let mut hash = NumaHash::create(5, 0).unwrap();
        assert!(hash.get_numa(3).is_none());

        hash.add(3, 1).unwrap();
        hash.add(8, 2).unwrap();
        hash.add(4, 3).unwrap();

        let na = hash.get_numa(13).unwrap();
        assert_eq!(na.get_int_array(), vec![1, 2]);
        assert_eq!(hash.get_numa(4).unwrap().count(), 1);
    }
}
