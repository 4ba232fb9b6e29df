//! Reference-counted, growable arrays of `f32`.
//!
//! A [`Numa`] is a handle to shared storage. Cloning the handle (via
//! [`Clone`]) produces an *alias*: both handles see every mutation. Use
//! [`Numa::copy()`] for an independent deep copy.
//!
//! The array stores everything as `f32`. Integer values can be added and
//! read back; [`Numa::get_int_value()`] rounds half-up by adding `0.5` and
//! truncating toward zero.
//!
//! # Threading
//!
//! The reference count is not atomic. A [`Numa`] is neither [`Send`] nor
//! [`Sync`], so sharing one handle across threads is rejected at compile
//! time. Move the contents instead, e.g. through
//! [`Numa::get_float_array()`].

use crate::{Error, Result, error::precondition};
use log::debug;
use num_traits::AsPrimitive;
use std::{
    cell::RefCell,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    rc::{Rc, Weak},
};

/// Version tag written into, and required from, the text format.
pub const NUMA_VERSION: i32 = 1;

/// Capacity used when a caller asks for zero or a negative capacity.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug)]
pub(crate) struct NumaData {
    // `array.len()` is the allocated capacity; only `..n` is in use.
    array: Vec<f32>,
    n: usize,
}

pub(crate) fn alloc_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, T::default());
    Ok(v)
}

/// Resolves a caller supplied capacity hint.
pub(crate) fn capacity_from_hint(hint: i32) -> usize {
    if hint <= 0 {
        DEFAULT_CAPACITY
    } else {
        hint as usize
    }
}

/// Capacity for an array created to hold `len` numbers.
fn capacity_for_len(len: usize) -> usize {
    if len == 0 { DEFAULT_CAPACITY } else { len }
}

impl NumaData {
    fn with_capacity(nalloc: usize) -> Result<Self> {
        Ok(Self {
            array: alloc_zeroed(nalloc.max(1))?,
            n: 0,
        })
    }

    /// Doubles the allocated capacity.
    fn extend(&mut self) -> Result<()> {
        let nalloc = self.array.len();
        self.grow_to(2 * nalloc)
    }

    fn grow_to(&mut self, nalloc: usize) -> Result<()> {
        let old = self.array.len();
        if nalloc <= old {
            return Ok(());
        }
        self.array.try_reserve_exact(nalloc - old)?;
        self.array.resize(nalloc, 0.0);
        Ok(())
    }

    fn push(&mut self, val: f32) -> Result<()> {
        if self.n >= self.array.len() {
            self.extend()?;
        }
        self.array[self.n] = val;
        self.n += 1;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.n {
            return Err(Error::Index { index, len: self.n });
        }
        Ok(())
    }
}

/// Shared handle to a growable array of `f32`.
///
/// `Clone` increments the reference count and returns an alias of the same
/// storage; it never copies the numbers.
#[derive(Debug, Clone)]
pub struct Numa(Rc<RefCell<NumaData>>);

/// Non-owning handle that observes whether a [`Numa`]'s storage is alive.
#[derive(Debug, Clone)]
pub struct WeakNuma(Weak<RefCell<NumaData>>);

impl WeakNuma {
    /// Returns a new alias if any owning handle is still alive.
    pub fn upgrade(&self) -> Option<Numa> {
        self.0.upgrade().map(Numa)
    }

    /// `true` while at least one owning handle exists.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl Numa {
    /// Creates an empty array with room for `capacity_hint` numbers.
    ///
    /// A hint of zero or less selects [`DEFAULT_CAPACITY`].
    ///
    /// ```
    /// # use pixdither::Numa;
    /// let na = Numa::create(0)?;
    /// assert_eq!(na.capacity(), 50);
    /// assert_eq!(na.count(), 0);
    /// # Ok::<(), pixdither::Error>(())
    /// ```
    pub fn create(capacity_hint: i32) -> Result<Self> {
        Self::with_capacity(capacity_from_hint(capacity_hint))
    }

    pub(crate) fn with_capacity(nalloc: usize) -> Result<Self> {
        Ok(Self(Rc::new(RefCell::new(NumaData::with_capacity(nalloc)?))))
    }

    /// Creates an array holding a copy of `values`.
    pub fn create_from_int_array(values: &[i32]) -> Result<Self> {
        let na = Self::with_capacity(capacity_for_len(values.len()))?;
        for &v in values {
            na.add_number(v)?;
        }
        Ok(na)
    }

    /// Creates an array holding a copy of `values`.
    pub fn create_from_float_array(values: &[f32]) -> Result<Self> {
        let na = Self::with_capacity(capacity_for_len(values.len()))?;
        {
            let mut data = na.0.borrow_mut();
            data.array[..values.len()].copy_from_slice(values);
            data.n = values.len();
        }
        Ok(na)
    }

    /// Allocates an independent array with the same capacity and contents.
    pub fn copy(&self) -> Result<Self> {
        let data = self.0.borrow();
        let cna = Self::with_capacity(data.array.len())?;
        {
            let mut cdata = cna.0.borrow_mut();
            cdata.array[..data.n].copy_from_slice(&data.array[..data.n]);
            cdata.n = data.n;
        }
        Ok(cna)
    }

    /// Releases the caller's handle and clears the slot.
    ///
    /// The storage itself is freed only when the last handle goes away.
    /// An empty slot is left untouched.
    pub fn destroy(slot: &mut Option<Numa>) {
        drop(slot.take());
    }

    /// Number of live handles sharing this storage.
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn downgrade(&self) -> WeakNuma {
        WeakNuma(Rc::downgrade(&self.0))
    }

    /// `true` if both handles refer to the same storage.
    pub fn ptr_eq(&self, other: &Numa) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Sets the count to zero without touching the allocation.
    pub fn empty(&self) {
        self.0.borrow_mut().n = 0;
    }

    /// Appends a number, doubling the capacity first when full.
    pub fn add_number<T: AsPrimitive<f32>>(&self, val: T) -> Result<()> {
        self.0.borrow_mut().push(val.as_())
    }

    /// Doubles the allocated capacity.
    pub fn extend_array(&self) -> Result<()> {
        self.0.borrow_mut().extend()
    }

    /// Inserts `val` at `index`, shifting later elements up by one.
    ///
    /// `index` may equal the current count (append). This is O(n).
    pub fn insert_number<T: AsPrimitive<f32>>(
        &self,
        index: usize,
        val: T,
    ) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let n = data.n;
        if index > n {
            return Err(Error::Index { index, len: n });
        }
        if n >= data.array.len() {
            data.extend()?;
        }
        data.array.copy_within(index..n, index + 1);
        data.array[index] = val.as_();
        data.n += 1;
        Ok(())
    }

    /// Removes the element at `index`, shifting later elements down.
    pub fn remove_number(&self, index: usize) -> Result<()> {
        let mut data = self.0.borrow_mut();
        data.check_index(index)?;
        let n = data.n;
        data.array.copy_within(index + 1..n, index);
        data.n -= 1;
        Ok(())
    }

    /// Number of elements in use.
    pub fn count(&self) -> usize {
        self.0.borrow().n
    }

    /// Number of allocated slots; always `>= count()`.
    pub fn capacity(&self) -> usize {
        self.0.borrow().array.len()
    }

    /// Sets the number of elements in use.
    ///
    /// Grows the allocation if needed. Slots that become visible read as
    /// `0.0`.
    pub fn set_count(&self, n: usize) -> Result<()> {
        let mut data = self.0.borrow_mut();
        data.grow_to(n)?;
        let old = data.n;
        if n > old {
            data.array[old..n].fill(0.0);
        }
        data.n = n;
        Ok(())
    }

    pub fn get_float_value(&self, index: usize) -> Result<f32> {
        let data = self.0.borrow();
        data.check_index(index)?;
        Ok(data.array[index])
    }

    /// Reads a value rounded half-up to an integer.
    pub fn get_int_value(&self, index: usize) -> Result<i32> {
        self.get_float_value(index).map(round_half_up)
    }

    pub fn set_value<T: AsPrimitive<f32>>(
        &self,
        index: usize,
        val: T,
    ) -> Result<()> {
        let mut data = self.0.borrow_mut();
        data.check_index(index)?;
        data.array[index] = val.as_();
        Ok(())
    }

    /// Rounded copy of the logical contents.
    pub fn get_int_array(&self) -> Vec<i32> {
        let data = self.0.borrow();
        data.array[..data.n].iter().copied().map(round_half_up).collect()
    }

    /// Copy of the logical contents.
    pub fn get_float_array(&self) -> Vec<f32> {
        let data = self.0.borrow();
        data.array[..data.n].to_vec()
    }

    /// Runs `f` on the full backing storage.
    ///
    /// Only permitted when every allocated slot is in use
    /// (`count() == capacity()`), so writes through the slice are always
    /// visible through the accessors. Use [`Numa::set_count()`] first to
    /// claim the whole allocation.
    ///
    /// `f` works on a copy that replaces the storage when it returns, so
    /// this handle and its aliases stay usable inside `f` and read the
    /// previous values there. Fails without committing if the array was
    /// resized while `f` ran.
    pub fn with_storage<R>(
        &self,
        f: impl FnOnce(&mut [f32]) -> R,
    ) -> Result<R> {
        let mut storage = {
            let data = self.0.borrow();
            let nalloc = data.array.len();
            if data.n != nalloc {
                return Err(precondition(format!(
                    "count {} differs from capacity {nalloc}",
                    data.n
                )));
            }
            let mut storage = Vec::new();
            storage.try_reserve_exact(nalloc)?;
            storage.extend_from_slice(&data.array);
            storage
        };

        let out = f(&mut storage);

        let mut data = self.0.borrow_mut();
        if data.n != storage.len() || data.array.len() != storage.len() {
            return Err(precondition("array resized while storage was lent"));
        }
        data.array = storage;
        Ok(out)
    }

    /// Runs `f` on the elements in use.
    pub(crate) fn with_values<R>(&self, f: impl FnOnce(&mut [f32]) -> R) -> R {
        let mut data = self.0.borrow_mut();
        let n = data.n;
        f(&mut data.array[..n])
    }

    /// Writes the text serialization to `writer`.
    pub fn write_stream<W: Write>(&self, writer: &mut W) -> Result<()> {
        let data = self.0.borrow();
        write!(writer, "\nNuma Version {NUMA_VERSION}\n")?;
        writeln!(writer, "Number of numbers = {}", data.n)?;
        for (i, val) in data.array[..data.n].iter().enumerate() {
            writeln!(writer, "  [{i}] = {val:.6}")?;
        }
        writeln!(writer)?;
        Ok(())
    }

    /// Parses the text serialization from `reader`.
    pub fn read_stream<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let mut next_line = || -> Result<Option<String>> {
            for line in lines.by_ref() {
                let line = line?;
                if !line.trim().is_empty() {
                    return Ok(Some(line));
                }
            }
            Ok(None)
        };

        let header = next_line()?
            .ok_or_else(|| Error::Format("not a numa file".into()))?;
        let version: i32 = header
            .trim()
            .strip_prefix("Numa Version")
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| Error::Format("not a numa file".into()))?;
        if version != NUMA_VERSION {
            return Err(Error::Format(format!(
                "invalid numa version {version}"
            )));
        }

        let n: usize = next_line()?
            .as_deref()
            .and_then(|s| s.trim().strip_prefix("Number of numbers"))
            .and_then(|s| s.trim_start().strip_prefix('='))
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| Error::Format("bad number count".into()))?;

        let na = Self::with_capacity(capacity_for_len(n))?;
        for i in 0..n {
            let line = next_line()?.ok_or_else(|| {
                Error::Format(format!("expected {n} numbers, found {i}"))
            })?;
            let val = parse_entry(&line).ok_or_else(|| {
                Error::Format(format!("bad input data: {line:?}"))
            })?;
            na.add_number(val)?;
        }
        Ok(na)
    }

    /// Reads a numa from the file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let na = Self::read_stream(BufReader::new(File::open(path)?))?;
        debug!("read {} numbers from {}", na.count(), path.display());
        Ok(na)
    }

    /// Writes the numa to the file at `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_stream(&mut writer)?;
        writer.flush()?;
        debug!("wrote {} numbers to {}", self.count(), path.display());
        Ok(())
    }
}

#[inline]
pub(crate) fn round_half_up(val: f32) -> i32 {
    (val + 0.5) as i32
}

/// Parses `[index] = value`.
fn parse_entry(line: &str) -> Option<f32> {
    let (lhs, rhs) = line.trim().split_once('=')?;
    lhs.trim()
        .strip_prefix('[')?
        .strip_suffix(']')?
        .trim()
        .parse::<i64>()
        .ok()?;
    rhs.trim().parse().ok()
}
