//! Residency tracking for backend-resident buffers.
//!
//! Every backend owns a [`DataStore`] answering "does this backend hold the
//! data behind a handle right now". A miss is resolved by asking the
//! runtime's [`DataMover`] to migrate the data from whichever backend
//! currently owns it.
//!
//! The store only keeps a weak reference to each [`DataId`]. Once every
//! clone of a handle is dropped its entry becomes unreachable, and the next
//! [`DataStore::reclaim`] sweep (run on every insertion) frees the buffer
//! without an explicit disposal call.
//!
//! The live counter reported by [`DataStore::num_data_ids`] is driven only
//! by explicit [`DataStore::set`] and [`DataStore::delete`] calls. Reclaimed
//! entries are not subtracted, so the counter can overstate what
//! [`DataStore::len`] actually retains.

use core::{
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicU64, Ordering},
};
use std::{
    borrow::Cow,
    collections::HashMap,
    rc::{Rc, Weak},
};

use log::{debug, trace};

use crate::error::{Error, Result};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct Token {
    serial: u64,
}

/// Opaque identity of a tensor's data.
///
/// A `DataId` carries no values, only identity: two handles are equal when
/// they are clones of the same original. Clones are strong owners; stores
/// only observe them weakly.
#[derive(Debug, Clone)]
pub struct DataId(Rc<Token>);

impl DataId {
    /// Creates a fresh handle, distinct from every other handle.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(Token {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
        }))
    }

    /// Process-unique serial number of this handle.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.0.serial
    }

    fn downgrade(&self) -> Weak<Token> {
        Rc::downgrade(&self.0)
    }
}

impl Default for DataId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DataId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DataId {}

impl Hash for DataId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial().hash(state);
    }
}

/// Identity of a backend instance, e.g. `"cpu"` or `"webgpu:0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendId(Cow<'static, str>);

impl BackendId {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability that relocates a handle's data into a requesting backend.
///
/// Implemented by the surrounding runtime, which knows every registered
/// backend. The mover finds the current owner of `id`, takes its buffer
/// (the owner stops being authoritative) and converts it into the record
/// type `R` of the `target` backend.
pub trait DataMover<R> {
    /// Migrates the data behind `id` into `target` and returns the record
    /// `target` should store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataNotFound`] if no backend owns `id`, or any error
    /// raised by the owning backend while handing the data over.
    fn move_data(&self, target: &BackendId, id: &DataId) -> Result<R>;
}

struct Entry<R> {
    handle: Weak<Token>,
    record: R,
}

/// Per-backend cache mapping handles to backend-resident records.
pub struct DataStore<R> {
    backend: BackendId,
    mover: Rc<dyn DataMover<R>>,
    data: HashMap<u64, Entry<R>>,
    data_ids_count: usize,
}

impl<R> DataStore<R> {
    /// Creates an empty store owned by `backend`.
    #[inline]
    #[must_use]
    pub fn new(backend: BackendId, mover: Rc<dyn DataMover<R>>) -> Self {
        Self {
            backend,
            mover,
            data: HashMap::new(),
            data_ids_count: 0,
        }
    }

    /// Identity of the owning backend.
    #[inline]
    #[must_use]
    pub const fn backend(&self) -> &BackendId {
        &self.backend
    }

    /// Returns the record for `id`, migrating it into this backend first if
    /// it is not resident.
    ///
    /// On a miss the mover is invoked exactly once; its failure is returned
    /// as is.
    ///
    /// # Errors
    ///
    /// Returns the mover's error, or [`Error::DataNotFound`] if the mover
    /// reported success without making the data resident.
    pub fn get(&mut self, id: &DataId) -> Result<&R> {
        if !self.has(id) {
            debug!(
                "data {} is not resident on `{}`, moving it",
                id.serial(),
                self.backend
            );
            let record = self.mover.move_data(&self.backend, id)?;
            let _previous = self.set(id, record);
        }

        self.data
            .get(&id.serial())
            .map(|entry| &entry.record)
            .ok_or_else(|| Error::DataNotFound {
                backend: self.backend.clone(),
            })
    }

    /// Inserts or overwrites the record for `id`, returning the previous
    /// one. Only a fresh insertion counts as a new live handle.
    pub fn set(&mut self, id: &DataId, record: R) -> Option<R> {
        let _reclaimed = self.reclaim();

        let entry = Entry {
            handle: id.downgrade(),
            record,
        };
        let previous = self.data.insert(id.serial(), entry);
        if previous.is_none() {
            self.data_ids_count += 1;
        }
        trace!(
            "stored data {} on `{}` ({} live)",
            id.serial(),
            self.backend,
            self.data_ids_count
        );

        previous.map(|entry| entry.record)
    }

    /// Returns the record for `id` if it is resident, without migrating.
    #[inline]
    #[must_use]
    pub fn peek(&self, id: &DataId) -> Option<&R> {
        self.data.get(&id.serial()).map(|entry| &entry.record)
    }

    #[inline]
    #[must_use]
    pub fn has(&self, id: &DataId) -> bool {
        self.data.contains_key(&id.serial())
    }

    /// Removes and returns the record for `id` without consulting the mover.
    pub fn take(&mut self, id: &DataId) -> Option<R> {
        let entry = self.data.remove(&id.serial())?;
        self.data_ids_count = self.data_ids_count.saturating_sub(1);
        trace!(
            "removed data {} from `{}` ({} live)",
            id.serial(),
            self.backend,
            self.data_ids_count
        );

        Some(entry.record)
    }

    /// Removes the record for `id`. Returns whether anything was removed.
    #[inline]
    pub fn delete(&mut self, id: &DataId) -> bool {
        self.take(id).is_some()
    }

    /// Removes every record, as if each one had been deleted.
    pub fn clear(&mut self) -> usize {
        let removed = self.data.len();
        self.data.clear();
        self.data_ids_count = self.data_ids_count.saturating_sub(removed);

        removed
    }

    /// Live-handle counter, maintained by `set` and `delete` only.
    #[inline]
    #[must_use]
    pub const fn num_data_ids(&self) -> usize {
        self.data_ids_count
    }

    /// Number of records whose handle is still reachable. Entries awaiting
    /// [`reclaim`](Self::reclaim) are not counted.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.live().count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live().next().is_none()
    }

    /// Iterates over the reachable records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.live().map(|entry| &entry.record)
    }

    fn live(&self) -> impl Iterator<Item = &Entry<R>> {
        self.data
            .values()
            .filter(|entry| entry.handle.strong_count() > 0)
    }

    /// Drops every record whose handle is no longer referenced anywhere and
    /// returns how many were dropped. The live counter is left untouched.
    pub fn reclaim(&mut self) -> usize {
        let before = self.data.len();
        self.data.retain(|_, entry| entry.handle.strong_count() > 0);
        let reclaimed = before - self.data.len();

        if reclaimed > 0 {
            debug!(
                "reclaimed {reclaimed} unreachable buffers on `{}` ({} live, \
                 {} retained)",
                self.backend,
                self.data_ids_count,
                self.data.len()
            );
        }

        reclaimed
    }
}

impl<R> fmt::Debug for DataStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("backend", &self.backend)
            .field("retained", &self.data.len())
            .field("data_ids_count", &self.data_ids_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};
    use std::{collections::HashMap, rc::Rc};

    use crate::{
        error::{Error, Result},
        storage::{BackendId, DataId, DataMover, DataStore},
    };

    /// Hands out records from a fake remote owner and counts the requests.
    #[derive(Default)]
    struct RemoteMover {
        calls: Cell<usize>,
        remote: RefCell<HashMap<u64, u32>>,
    }

    impl RemoteMover {
        fn with_remote(id: &DataId, record: u32) -> Self {
            let mover = Self::default();
            let _previous = mover.remote.borrow_mut().insert(id.serial(), record);
            mover
        }
    }

    impl DataMover<u32> for RemoteMover {
        fn move_data(&self, target: &BackendId, id: &DataId) -> Result<u32> {
            self.calls.set(self.calls.get() + 1);
            self.remote
                .borrow_mut()
                .remove(&id.serial())
                .ok_or_else(|| Error::DataNotFound {
                    backend: target.clone(),
                })
        }
    }

    fn store_with(mover: &Rc<RemoteMover>) -> DataStore<u32> {
        let mover: Rc<dyn DataMover<u32>> = Rc::<RemoteMover>::clone(mover);
        DataStore::new(BackendId::new("test"), mover)
    }

    #[test]
    fn data_ids_are_unique_and_clones_are_equal() {
        let a = DataId::new();
        let b = DataId::new();

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.serial(), b.serial());
    }

    #[test]
    fn set_then_get_does_not_move() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let id = DataId::new();

        let _previous = store.set(&id, 7);

        assert_eq!(*store.get(&id).unwrap(), 7);
        assert_eq!(mover.calls.get(), 0);
    }

    #[test]
    fn get_on_miss_moves_exactly_once() {
        let id = DataId::new();
        let mover = Rc::new(RemoteMover::with_remote(&id, 42));
        let mut store = store_with(&mover);

        assert_eq!(*store.get(&id).unwrap(), 42);
        assert_eq!(*store.get(&id).unwrap(), 42);
        assert_eq!(mover.calls.get(), 1);
        assert!(store.has(&id));
        assert_eq!(store.num_data_ids(), 1);
    }

    #[test]
    fn peek_never_moves() {
        let id = DataId::new();
        let mover = Rc::new(RemoteMover::with_remote(&id, 3));
        let store = store_with(&mover);

        assert_eq!(store.peek(&id), None);
        assert_eq!(mover.calls.get(), 0);
    }

    #[test]
    fn get_fails_when_no_backend_owns_the_data() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let id = DataId::new();

        let result = store.get(&id);

        assert!(matches!(result, Err(Error::DataNotFound { .. })));
        assert_eq!(mover.calls.get(), 1);
        assert!(!store.has(&id));
    }

    #[test]
    fn overwrite_does_not_count_twice() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let id = DataId::new();

        assert_eq!(store.set(&id, 1), None);
        assert_eq!(store.set(&id, 2), Some(1));

        assert_eq!(store.num_data_ids(), 1);
        assert_eq!(*store.get(&id).unwrap(), 2);
    }

    #[test]
    fn delete_removes_and_decrements() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let a = DataId::new();
        let b = DataId::new();
        let _previous = store.set(&a, 1);
        let _previous = store.set(&b, 2);

        assert!(store.delete(&a));

        assert!(!store.has(&a));
        assert_eq!(store.num_data_ids(), 1);
    }

    #[test]
    fn delete_of_absent_handle_is_a_no_op() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);

        assert!(!store.delete(&DataId::new()));
        assert_eq!(store.num_data_ids(), 0);
    }

    #[test]
    fn dropped_handles_are_reclaimed_but_still_counted() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let kept = DataId::new();
        let dropped = DataId::new();
        let _previous = store.set(&kept, 1);
        let _previous = store.set(&dropped, 2);

        drop(dropped);

        assert_eq!(store.reclaim(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has(&kept));
        assert_eq!(store.num_data_ids(), 2);
    }

    #[test]
    fn dropped_handles_leave_len_before_reclaim() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let dropped = DataId::new();
        let _previous = store.set(&dropped, 7);

        drop(dropped);

        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.records().count(), 0);
        assert_eq!(store.num_data_ids(), 1);
    }

    #[test]
    fn insertion_sweeps_unreachable_entries() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let _previous = store.set(&DataId::new(), 1);

        let id = DataId::new();
        let _previous = store.set(&id, 2);

        assert_eq!(store.len(), 1);
        assert_eq!(store.records().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn take_hands_over_the_record() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let id = DataId::new();
        let _previous = store.set(&id, 9);

        assert_eq!(store.take(&id), Some(9));
        assert_eq!(store.take(&id), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_the_store() {
        let mover = Rc::new(RemoteMover::default());
        let mut store = store_with(&mover);
        let a = DataId::new();
        let b = DataId::new();
        let _previous = store.set(&a, 1);
        let _previous = store.set(&b, 2);

        assert_eq!(store.clear(), 2);
        assert_eq!(store.num_data_ids(), 0);
        assert!(store.is_empty());
    }
}
