use parking_lot::{Condvar, Mutex};

/// Counting limiter for concurrent widget generation.
///
/// `0 <= available <= capacity` holds at every observation point.
#[derive(Debug)]
pub struct ConcurrencyPool {
    capacity: usize,
    available: Mutex<usize>,
    freed: Condvar,
}

impl ConcurrencyPool {
    /// Pool with `capacity` slots; zero is coerced to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            available: Mutex::new(capacity),
            freed: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        *self.available.lock()
    }

    /// Take a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<PoolPermit<'_>> {
        let mut available = self.available.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(PoolPermit { pool: self })
    }

    /// Block until a slot is free, then take it.
    pub fn acquire(&self) -> PoolPermit<'_> {
        let mut available = self.available.lock();
        while *available == 0 {
            self.freed.wait(&mut available);
        }
        *available -= 1;
        PoolPermit { pool: self }
    }

    fn release(&self) {
        let mut available = self.available.lock();
        debug_assert!(*available < self.capacity, "pool released more than acquired");
        *available = (*available + 1).min(self.capacity);
        drop(available);
        self.freed.notify_one();
    }
}

/// One occupied pool slot, returned on drop.
#[derive(Debug)]
pub struct PoolPermit<'a> {
    pool: &'a ConcurrencyPool,
}

impl PoolPermit<'_> {
    pub fn release(self) {}
}

impl Drop for PoolPermit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pool.rs"]
mod tests;
