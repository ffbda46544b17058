//! Payload buffer pooling.
//!
//! Message volume is high and payloads are short-lived, so buffers are
//! recycled instead of allocated per message. The engine never decides how
//! buffers are reused: it hands every payload it stops holding to a
//! [`PayloadPool`], and the pool decides whether to keep the allocation.

use bytes::{Bytes, BytesMut};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// A source and sink of payload buffers.
///
/// Implementations must be shareable across scenes, each driven from its own
/// worker.
pub trait PayloadPool: Send + Sync + fmt::Debug {
    /// Returns an empty buffer with at least `len` bytes of capacity.
    fn rent(&self, len: usize) -> BytesMut;

    /// Takes back a payload the caller no longer needs.
    fn release(&self, data: Bytes);

    /// Copies `src` into a rented buffer.
    fn copy_from(&self, src: &[u8]) -> Bytes {
        let mut buf = self.rent(src.len());
        buf.extend_from_slice(src);
        buf.freeze()
    }
}

/// A pool that allocates on every rent and frees on every release.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapPool;

impl PayloadPool for HeapPool {
    fn rent(&self, len: usize) -> BytesMut {
        BytesMut::with_capacity(len)
    }

    fn release(&self, _data: Bytes) {}
}

const MIN_CLASS_SHIFT: u32 = 4;
const CLASS_COUNT: usize = 17;
const DEFAULT_MAX_PER_CLASS: usize = 64;

/// A pool of power-of-two size classes from 16 bytes to 1 MiB.
///
/// Released payloads are kept only if nothing else still references their
/// allocation; a payload that is a slice of a larger decoded batch is simply
/// dropped. Requests above the largest class bypass the pool.
pub struct SizeClassPool {
    classes: Mutex<Vec<Vec<BytesMut>>>,
    max_per_class: usize,
    reused: AtomicUsize,
}

impl SizeClassPool {
    /// Creates a pool keeping up to 64 free buffers per size class.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_per_class(DEFAULT_MAX_PER_CLASS)
    }

    /// Creates a pool keeping up to `max_per_class` free buffers per class.
    #[must_use]
    pub fn with_max_per_class(max_per_class: usize) -> Self {
        Self {
            classes: Mutex::new(vec![Vec::new(); CLASS_COUNT]),
            max_per_class,
            reused: AtomicUsize::new(0),
        }
    }

    /// Returns the number of free buffers currently held.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.lock().iter().map(Vec::len).sum()
    }

    /// Returns how many rents were served from a recycled buffer.
    #[must_use]
    pub fn reused(&self) -> usize {
        self.reused.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<BytesMut>>> {
        // Free lists stay consistent even if a holder panicked.
        self.classes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Smallest class whose buffers hold `len` bytes.
    fn class_for_len(len: usize) -> Option<usize> {
        let size = len.max(1 << MIN_CLASS_SHIFT).checked_next_power_of_two()?;
        let index = (size.trailing_zeros() - MIN_CLASS_SHIFT) as usize;
        (index < CLASS_COUNT).then_some(index)
    }

    /// Largest class a buffer of `capacity` bytes can serve.
    fn class_for_capacity(capacity: usize) -> Option<usize> {
        if capacity < 1 << MIN_CLASS_SHIFT {
            return None;
        }
        let floor_shift = usize::BITS - 1 - capacity.leading_zeros();
        let index = (floor_shift - MIN_CLASS_SHIFT) as usize;
        (index < CLASS_COUNT).then_some(index)
    }
}

impl Default for SizeClassPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SizeClassPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeClassPool")
            .field("retained", &self.retained())
            .field("max_per_class", &self.max_per_class)
            .field("reused", &self.reused())
            .finish()
    }
}

impl PayloadPool for SizeClassPool {
    fn rent(&self, len: usize) -> BytesMut {
        let Some(class) = Self::class_for_len(len) else {
            return BytesMut::with_capacity(len);
        };

        if let Some(mut buf) = self.lock()[class].pop() {
            self.reused.fetch_add(1, Ordering::Relaxed);
            buf.clear();
            return buf;
        }

        BytesMut::with_capacity(1 << (class as u32 + MIN_CLASS_SHIFT))
    }

    fn release(&self, data: Bytes) {
        let Ok(buf) = data.try_into_mut() else {
            return;
        };
        let Some(class) = Self::class_for_capacity(buf.capacity()) else {
            return;
        };

        let mut classes = self.lock();
        if classes[class].len() < self.max_per_class {
            classes[class].push(buf);
        }
    }
}
