//! Numeric buffer pool
//!
//! The dynamics engine evaluates the Lagrangian hundreds of times per time
//! step, and every evaluation needs scratch Jacobians, kinetic matrices and
//! position triples. [`ResourceManager`] recycles these buffers instead of
//! reallocating them.
//!
//! # Design
//!
//! Each buffer kind has its own arena of slots, keyed by shape and guarded by a
//! mutex. A request scans for a free slot with the right shape; on a miss a new
//! slot is appended. The caller receives a [`Resource`] handle that owns the
//! buffer while in scope and puts it back into its slot on drop, on every exit
//! path. Slots are addressed by index, so growing the arena never invalidates
//! outstanding handles.
//!
//! # Example
//!
//! ```rust
//! use lagrange_rs::resources::ResourceManager;
//!
//! let manager = ResourceManager::new();
//!
//! let first_id = {
//!     let mut v = manager.request_vector(10);
//!     v[0] = 1.0;
//!     v.id()
//! }; // released here
//!
//! let v = manager.request_vector(10);
//! assert_eq!(v.id(), first_id);
//! assert_eq!(v[0], 0.0); // handed out zeroed
//! ```

use crate::physics::Positions;
use nalgebra::{DMatrix, DVector};
use log::debug;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::ops::{Deref, DerefMut};

// =================================================================================================
// Poolable buffers
// =================================================================================================

/// A buffer type the pool knows how to allocate and recycle
pub trait Poolable: Send + Sized {
    /// Shape key used to match requests with free slots
    type Shape: Copy + Eq + Debug + Send;

    /// Allocate a zeroed buffer of the given shape
    fn allocate(shape: Self::Shape) -> Self;

    /// Zero-sized placeholder (no heap allocation)
    fn placeholder() -> Self;

    /// Current shape of the buffer
    fn shape(&self) -> Self::Shape;

    /// Reset contents to zero
    fn zero(&mut self);
}

impl Poolable for DVector<f64> {
    type Shape = usize;

    fn allocate(n: usize) -> Self {
        DVector::zeros(n)
    }

    fn placeholder() -> Self {
        DVector::zeros(0)
    }

    fn shape(&self) -> usize {
        self.len()
    }

    fn zero(&mut self) {
        self.fill(0.0);
    }
}

impl Poolable for DMatrix<f64> {
    type Shape = (usize, usize);

    fn allocate((rows, cols): (usize, usize)) -> Self {
        DMatrix::zeros(rows, cols)
    }

    fn placeholder() -> Self {
        DMatrix::zeros(0, 0)
    }

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn zero(&mut self) {
        self.fill(0.0);
    }
}

impl Poolable for Positions {
    type Shape = usize;

    fn allocate(n: usize) -> Self {
        Positions::zeros(n)
    }

    fn placeholder() -> Self {
        Positions::zeros(0)
    }

    fn shape(&self) -> usize {
        self.len()
    }

    fn zero(&mut self) {
        self.fill_zero();
    }
}

// =================================================================================================
// Pool (arena of slots)
// =================================================================================================

/// Index of a slot inside one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(usize);

impl ResourceId {
    /// Raw slot index
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Slot<T: Poolable> {
    shape: T::Shape,
    /// `None` while checked out
    buffer: Option<T>,
}

/// Usage counters of one pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots currently allocated
    pub allocated: usize,
    /// Slots currently checked out
    pub in_use: usize,
    /// Requests served from a free slot
    pub hits: u64,
    /// Requests that needed a fresh allocation
    pub misses: u64,
}

#[derive(Debug)]
struct Pool<T: Poolable> {
    slots: Vec<Option<Slot<T>>>,
    hits: u64,
    misses: u64,
}

impl<T: Poolable> Pool<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Check out a buffer of `shape`, allocating a slot on a miss
    fn checkout(&mut self, shape: T::Shape, kind: &str) -> (ResourceId, T) {
        let free = self.slots.iter_mut().enumerate().find_map(|(i, slot)| match slot {
            Some(s) if s.shape == shape && s.buffer.is_some() => s.buffer.take().map(|b| (i, b)),
            _ => None,
        });

        if let Some((index, mut buffer)) = free {
            self.hits += 1;
            buffer.zero();
            return (ResourceId(index), buffer);
        }

        self.misses += 1;
        debug!("{} of shape {:?} not available, allocating a new one", kind, shape);

        let slot = Slot { shape, buffer: None };
        let index = match self.slots.iter().position(Option::is_none) {
            Some(vacant) => {
                self.slots[vacant] = Some(slot);
                vacant
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };

        (ResourceId(index), T::allocate(shape))
    }

    /// Put a buffer back; a buffer resized by its holder vacates the slot
    fn release(&mut self, id: ResourceId, buffer: T) {
        let Some(Some(slot)) = self.slots.get_mut(id.0) else {
            return;
        };

        if slot.shape == buffer.shape() {
            slot.buffer = Some(buffer);
        } else {
            debug!(
                "buffer of slot {} resized from {:?} to {:?}, dropping it",
                id.0,
                slot.shape,
                buffer.shape()
            );
            self.slots[id.0] = None;
        }
    }

    /// Drop every free slot; checked-out slots keep their index
    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(s) if s.buffer.is_some()) {
                *slot = None;
            }
        }
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }

    fn stats(&self) -> PoolStats {
        let allocated = self.slots.iter().flatten().count();
        let in_use = self
            .slots
            .iter()
            .flatten()
            .filter(|s| s.buffer.is_none())
            .count();

        PoolStats {
            allocated,
            in_use,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

// =================================================================================================
// Scoped handle
// =================================================================================================

/// Scope-bound handle to a pooled buffer
///
/// Dereferences to the buffer. While the handle lives, no other caller can
/// obtain the same slot; dropping it returns the buffer to the pool.
pub struct Resource<'a, T: Poolable> {
    pool: &'a Mutex<Pool<T>>,
    id: ResourceId,
    buffer: T,
}

impl<'a, T: Poolable> Resource<'a, T> {
    /// Slot identity of this buffer
    pub fn id(&self) -> ResourceId {
        self.id
    }
}

impl<T: Poolable> Deref for Resource<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.buffer
    }
}

impl<T: Poolable> DerefMut for Resource<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.buffer
    }
}

impl<T: Poolable> Drop for Resource<'_, T> {
    fn drop(&mut self) {
        let buffer = std::mem::replace(&mut self.buffer, T::placeholder());
        self.pool.lock().release(self.id, buffer);
    }
}

impl<T: Poolable + Debug> Debug for Resource<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("buffer", &self.buffer)
            .finish()
    }
}

// =================================================================================================
// Resource manager
// =================================================================================================

/// Pool statistics for every buffer kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub vectors: PoolStats,
    pub matrices: PoolStats,
    pub positions: PoolStats,
}

/// Thread-safe recycler of vectors, matrices and position triples
///
/// Share it between solvers with `Arc<ResourceManager>`.
#[derive(Debug)]
pub struct ResourceManager {
    vectors: Mutex<Pool<DVector<f64>>>,
    matrices: Mutex<Pool<DMatrix<f64>>>,
    positions: Mutex<Pool<Positions>>,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            vectors: Mutex::new(Pool::new()),
            matrices: Mutex::new(Pool::new()),
            positions: Mutex::new(Pool::new()),
        }
    }

    /// Zeroed vector of length `n`
    pub fn request_vector(&self, n: usize) -> Resource<'_, DVector<f64>> {
        let (id, buffer) = self.vectors.lock().checkout(n, "Vector");
        Resource { pool: &self.vectors, id, buffer }
    }

    /// Zeroed `rows × cols` matrix
    pub fn request_matrix(&self, rows: usize, cols: usize) -> Resource<'_, DMatrix<f64>> {
        let (id, buffer) = self.matrices.lock().checkout((rows, cols), "Matrix");
        Resource { pool: &self.matrices, id, buffer }
    }

    /// `n` positions at the origin
    pub fn request_positions(&self, n: usize) -> Resource<'_, Positions> {
        let (id, buffer) = self.positions.lock().checkout(n, "Positions");
        Resource { pool: &self.positions, id, buffer }
    }

    /// Free every buffer not currently checked out
    pub fn clear(&self) {
        self.vectors.lock().clear();
        self.matrices.lock().clear();
        self.positions.lock().clear();
    }

    /// Snapshot of pool usage
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            vectors: self.vectors.lock().stats(),
            matrices: self.matrices.lock().stats(),
            positions: self.positions.lock().stats(),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
