//! Metadata arena for the `Reflex` runtime.
//!
//! Runtime metadata (type descriptors and anything they own) is created once
//! and then only ever read. [`MetaArena`] stores such records in chunks that
//! are never reallocated, so a reference handed out by [`MetaArena::alloc`]
//! stays valid for as long as the arena lives. Process-wide arenas live in a
//! `static`, which makes their references `'static`.
//!
//! - **Stable references**: a chunk is filled up to its capacity and then
//!   frozen; new records go to a fresh chunk
//! - **Geometric growth**: chunk capacity doubles up to [`MAX_CHUNK_ITEMS`]
//! - **Thread-safe**: allocation takes a short `parking_lot` mutex; reads
//!   never lock
//!
//! # Examples
//!
//! ```
//! use reflex_mem::MetaArena;
//!
//! let arena = MetaArena::with_chunk_size(2);
//!
//! let first = arena.alloc(String::from("System.Exception"));
//! let second = arena.alloc(String::from("System.SystemException"));
//! let third = arena.alloc(String::from("System.TimeoutException"));
//!
//! // References stay valid across chunk growth
//! assert_eq!(first, "System.Exception");
//! assert_eq!(second, "System.SystemException");
//! assert_eq!(third, "System.TimeoutException");
//! assert_eq!(arena.stats().chunk_count, 2);
//! ```

use parking_lot::Mutex;
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of records in the first chunk.
pub const DEFAULT_CHUNK_ITEMS: usize = 64;

/// Upper bound for the capacity of a single chunk.
pub const MAX_CHUNK_ITEMS: usize = 16 * 1024;

/// Arena allocation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of records allocated across all chunks.
    pub allocated: usize,
    /// Number of chunks in the arena.
    pub chunk_count: usize,
    /// Total record capacity of all chunks.
    pub capacity: usize,
}

/// Append-only typed arena with stable references.
///
/// Records are never moved and never dropped before the arena itself. The
/// arena is meant for metadata that is written once during initialization and
/// read for the rest of the program.
///
/// # Thread Safety
///
/// `MetaArena<T>` is `Sync` when `T: Send + Sync`: allocation is serialized by
/// a mutex, and the shared references it returns may be read from any thread.
pub struct MetaArena<T> {
    /// Filled chunks followed by the current one. A chunk never grows past
    /// its initial capacity, so its buffer never moves.
    chunks: Mutex<Vec<Vec<T>>>,
    /// Capacity of the first chunk.
    chunk_size: usize,
    /// Records allocated so far (readable without the lock).
    allocated: AtomicUsize,
    /// Opts out of the auto `Sync` impl; see the manual impl below.
    _not_sync: PhantomData<Cell<()>>,
}

// SAFETY: MetaArena hands out `&T` to whoever holds `&MetaArena`. Sharing the
// arena across threads therefore shares `&T`, which requires `T: Sync`, and
// records may be dropped on whichever thread drops the arena, which requires
// `T: Send`. The chunk list itself is only touched under the mutex.
unsafe impl<T: Send + Sync> Sync for MetaArena<T> {}

impl<T> MetaArena<T> {
    /// Creates an empty arena with [`DEFAULT_CHUNK_ITEMS`] records in its
    /// first chunk.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_ITEMS)
    }

    /// Creates an empty arena whose first chunk holds `chunk_size` records.
    ///
    /// A `chunk_size` of zero is treated as one. No memory is reserved until
    /// the first allocation.
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        MetaArena {
            chunks: Mutex::new(Vec::new()),
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_ITEMS),
            allocated: AtomicUsize::new(0),
            _not_sync: PhantomData,
        }
    }

    /// Moves `value` into the arena and returns a shared reference to it.
    ///
    /// The reference is valid for the lifetime of the arena. Records are
    /// immutable once allocated.
    pub fn alloc(&self, value: T) -> &T {
        let mut chunks = self.chunks.lock();

        let full = chunks.last().is_none_or(|chunk| chunk.len() == chunk.capacity());
        if full {
            let capacity = self.next_capacity(chunks.last().map(Vec::capacity));
            chunks.push(Vec::with_capacity(capacity));
        }

        let chunk = match chunks.last_mut() {
            Some(chunk) => chunk,
            None => unreachable!("a chunk was pushed above"),
        };
        let index = chunk.len();
        chunk.push(value);
        self.allocated.fetch_add(1, Ordering::Relaxed);

        // SAFETY: `index` is in bounds (we just pushed it). The chunk was
        // created with enough capacity for this push, so its buffer was not
        // reallocated, and no later push can exceed that capacity either: a
        // full chunk is replaced by a new one above. Growing the outer Vec
        // moves the inner Vec headers, not their heap buffers. Records are
        // never removed while the arena is alive and are only handed out as
        // shared references, so the returned borrow cannot be invalidated
        // before `self` is.
        unsafe { &*chunk.as_ptr().add(index) }
    }

    /// Capacity of the first chunk, after clamping.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of records allocated in this arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Returns `true` if nothing has been allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns allocation statistics for this arena.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let chunks = self.chunks.lock();
        ArenaStats {
            allocated: chunks.iter().map(Vec::len).sum(),
            chunk_count: chunks.len(),
            capacity: chunks.iter().map(Vec::capacity).sum(),
        }
    }

    /// Capacity of the next chunk: the first chunk gets `chunk_size`, every
    /// following chunk doubles the previous one.
    fn next_capacity(&self, previous: Option<usize>) -> usize {
        match previous {
            None => self.chunk_size,
            Some(prev) => prev.saturating_mul(2).min(MAX_CHUNK_ITEMS).max(self.chunk_size),
        }
    }
}

impl<T> Default for MetaArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for MetaArena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaArena")
            .field("chunk_size", &self.chunk_size)
            .field("stats", &self.stats())
            .finish()
    }
}
