//! Reusable BGRA conversion buffers.
//!
//! A [`BufferPool`] holds frames of one fixed size. [`PoolSlot`] owns the
//! lazily created pool for a converter: the first frame decides the size and
//! later frames reuse it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ffmpeg_next::format::Pixel;

use crate::error::ConvertError;
use crate::frame::PixelBuffer;

const MIN_BUFFER_COUNT: usize = 3;

/// Sizing for the conversion pool.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    min_buffer_count: usize,
    max_buffer_count: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_buffer_count: MIN_BUFFER_COUNT,
            max_buffer_count: 6,
        }
    }
}

impl PoolConfig {
    /// Buffers allocated up front. Never below 3.
    pub fn with_min_buffer_count(mut self, count: usize) -> Self {
        self.min_buffer_count = count.max(MIN_BUFFER_COUNT);
        self.max_buffer_count = self.max_buffer_count.max(self.min_buffer_count);
        self
    }

    /// Upper bound on buffers in flight. Never below the minimum.
    pub fn with_max_buffer_count(mut self, count: usize) -> Self {
        self.max_buffer_count = count.max(self.min_buffer_count);
        self
    }

    pub fn min_buffer_count(&self) -> usize {
        self.min_buffer_count
    }

    pub fn max_buffer_count(&self) -> usize {
        self.max_buffer_count
    }
}

pub(crate) struct Shared {
    free: Mutex<Vec<ffmpeg_next::frame::Video>>,
    allocated: AtomicUsize,
}

impl Shared {
    fn free(&self) -> MutexGuard<'_, Vec<ffmpeg_next::frame::Video>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn recycle(&self, frame: ffmpeg_next::frame::Video) {
        self.free().push(frame);
    }
}

/// Fixed-size set of BGRA frames. Handing out a buffer is atomic: a frame is
/// removed from the free list under the lock before the caller sees it.
pub struct BufferPool {
    width: u32,
    height: u32,
    max_buffers: usize,
    shared: Arc<Shared>,
}

impl BufferPool {
    pub fn new(width: u32, height: u32, config: &PoolConfig) -> Result<Self, ConvertError> {
        if width == 0 || height == 0 {
            return Err(ConvertError::PoolCreation {
                width,
                height,
                reason: "zero dimension".to_string(),
            });
        }
        let mut free = Vec::with_capacity(config.max_buffer_count());
        for _ in 0..config.min_buffer_count() {
            free.push(allocate(width, height)?);
        }
        let allocated = free.len();
        Ok(Self {
            width,
            height,
            max_buffers: config.max_buffer_count(),
            shared: Arc::new(Shared {
                free: Mutex::new(free),
                allocated: AtomicUsize::new(allocated),
            }),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn capacity(&self) -> usize {
        self.max_buffers
    }

    /// Frames allocated so far, in use or idle.
    pub fn allocated(&self) -> usize {
        self.shared.allocated.load(Ordering::Acquire)
    }

    /// Idle frames ready to be handed out.
    pub fn available(&self) -> usize {
        self.shared.free().len()
    }

    /// Takes an idle frame, growing the pool up to its capacity. Fails fast
    /// when every frame is in use.
    pub fn acquire(&self) -> Result<PixelBuffer, ConvertError> {
        let mut free = self.shared.free();
        let frame = match free.pop() {
            Some(frame) => frame,
            None => {
                if self.allocated() >= self.max_buffers {
                    return Err(ConvertError::BufferAcquisition {
                        capacity: self.max_buffers,
                    });
                }
                let frame = allocate(self.width, self.height)?;
                self.shared.allocated.fetch_add(1, Ordering::AcqRel);
                log::debug!(
                    "conversion pool grew to {} buffers ({}x{})",
                    self.allocated(),
                    self.width,
                    self.height
                );
                frame
            }
        };
        drop(free);
        Ok(PixelBuffer::pooled(frame, Arc::downgrade(&self.shared)))
    }
}

fn allocate(width: u32, height: u32) -> Result<ffmpeg_next::frame::Video, ConvertError> {
    let frame = ffmpeg_next::frame::Video::new(Pixel::BGRA, width, height);
    if frame.planes() == 0 {
        return Err(ConvertError::PoolCreation {
            width,
            height,
            reason: "frame buffer allocation failed".to_string(),
        });
    }
    Ok(frame)
}

/// Lazily created, process-lifetime conversion pool.
///
/// Creation happens under the slot lock, so concurrent first callers build
/// the pool once. A failed creation leaves the slot empty and the next call
/// tries again.
pub struct PoolSlot {
    config: PoolConfig,
    pool: Mutex<Option<Arc<BufferPool>>>,
    creations: AtomicUsize,
}

impl PoolSlot {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
            creations: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The pool, if one has been created.
    pub fn pool(&self) -> Option<Arc<BufferPool>> {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_created(&self) -> bool {
        self.pool().is_some()
    }

    pub fn creation_count(&self) -> usize {
        self.creations.load(Ordering::Acquire)
    }

    pub fn get_or_create(&self, width: u32, height: u32) -> Result<Arc<BufferPool>, ConvertError> {
        let mut slot = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }
        let pool = Arc::new(BufferPool::new(width, height, &self.config)?);
        self.creations.fetch_add(1, Ordering::AcqRel);
        log::info!(
            "created BGRA conversion pool {}x{} ({} buffers, max {})",
            width,
            height,
            pool.allocated(),
            pool.capacity()
        );
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Draws a buffer of the given size, creating the pool on first use.
    /// The pool never resizes; a frame of another size is rejected.
    pub fn acquire(&self, width: u32, height: u32) -> Result<PixelBuffer, ConvertError> {
        let pool = self.get_or_create(width, height)?;
        if pool.width() != width || pool.height() != height {
            return Err(ConvertError::DimensionMismatch {
                pool_width: pool.width(),
                pool_height: pool.height(),
                width,
                height,
            });
        }
        pool.acquire()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Barrier;

    use super::*;

    #[test]
    fn test_config_clamps() {
        let config = PoolConfig::default();
        assert_eq!(config.min_buffer_count(), 3);
        let config = PoolConfig::default()
            .with_min_buffer_count(1)
            .with_max_buffer_count(2);
        assert_eq!(config.min_buffer_count(), 3);
        assert_eq!(config.max_buffer_count(), 3);
        let config = PoolConfig::default().with_min_buffer_count(8);
        assert_eq!(config.max_buffer_count(), 8);
    }

    #[test]
    fn test_preallocates_minimum() {
        let pool = BufferPool::new(64, 48, &PoolConfig::default()).unwrap();
        assert_eq!(pool.allocated(), 3);
        assert_eq!(pool.available(), 3);
        let buffer = pool.acquire().unwrap();
        assert_eq!(buffer.width(), 64);
        assert_eq!(buffer.height(), 48);
        assert_eq!(buffer.pixel(), Pixel::BGRA);
        assert!(buffer.is_pooled());
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_buffer_returns_on_drop() {
        let pool = BufferPool::new(64, 48, &PoolConfig::default()).unwrap();
        let first = pool.acquire().unwrap();
        let ptr = first.as_video().data(0).as_ptr();
        drop(first);
        assert_eq!(pool.available(), 3);
        let again = pool.acquire().unwrap();
        assert_eq!(again.as_video().data(0).as_ptr(), ptr);
        assert_eq!(pool.allocated(), 3);
    }

    #[test]
    fn test_exhaustion_fails_fast() {
        let config = PoolConfig::default().with_max_buffer_count(4);
        let pool = BufferPool::new(32, 32, &config).unwrap();
        let held: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(pool.allocated(), 4);
        match pool.acquire() {
            Err(ConvertError::BufferAcquisition { capacity }) => assert_eq!(capacity, 4),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        drop(held);
        assert!(pool.acquire().is_ok());
        assert_eq!(pool.allocated(), 4);
    }

    #[test]
    fn test_buffer_outliving_pool_is_freed() {
        let pool = BufferPool::new(16, 16, &PoolConfig::default()).unwrap();
        let buffer = pool.acquire().unwrap();
        drop(pool);
        drop(buffer);
    }

    #[test]
    fn test_slot_creation_failure_is_retried() {
        let slot = PoolSlot::new(PoolConfig::default());
        assert!(matches!(
            slot.acquire(0, 48),
            Err(ConvertError::PoolCreation { .. })
        ));
        assert!(!slot.is_created());
        assert_eq!(slot.creation_count(), 0);

        let buffer = slot.acquire(64, 48).unwrap();
        assert_eq!(buffer.width(), 64);
        assert!(slot.is_created());
        assert_eq!(slot.creation_count(), 1);
    }

    #[test]
    fn test_slot_rejects_other_dimensions() {
        let slot = PoolSlot::new(PoolConfig::default());
        slot.acquire(64, 48).unwrap();
        match slot.acquire(32, 32) {
            Err(ConvertError::DimensionMismatch {
                pool_width,
                pool_height,
                ..
            }) => {
                assert_eq!((pool_width, pool_height), (64, 48));
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
        // the pool is untouched by the rejected frame
        assert!(slot.acquire(64, 48).is_ok());
        assert_eq!(slot.creation_count(), 1);
    }

    #[test]
    fn test_concurrent_first_use_creates_once() {
        const THREADS: usize = 8;
        let slot = PoolSlot::new(PoolConfig::default().with_max_buffer_count(THREADS));
        let barrier = Barrier::new(THREADS);

        let buffers: Vec<PixelBuffer> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        slot.acquire(64, 48).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(slot.creation_count(), 1);
        let distinct: HashSet<usize> = buffers
            .iter()
            .map(|b| b.as_video().data(0).as_ptr() as usize)
            .collect();
        assert_eq!(distinct.len(), THREADS);
        assert_eq!(slot.pool().unwrap().allocated(), THREADS);
    }
}
