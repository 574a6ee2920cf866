use parking_lot::{Condvar, Mutex};

/// Ordering gate: position `n` may pass only after positions `0..n` have.
#[derive(Debug, Default)]
pub struct Turnstile {
    next: Mutex<usize>,
    turned: Condvar,
}

impl Turnstile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until it is `position`'s turn. The turn passes on when the guard drops.
    pub fn wait_for(&self, position: usize) -> TurnGuard<'_> {
        let mut next = self.next.lock();
        while *next != position {
            self.turned.wait(&mut next);
        }
        TurnGuard {
            turnstile: self,
            position,
        }
    }

    fn advance(&self, from: usize) {
        let mut next = self.next.lock();
        debug_assert_eq!(*next, from, "turnstile advanced out of order");
        *next = from + 1;
        drop(next);
        self.turned.notify_all();
    }
}

/// Exclusive hold on one turn.
#[derive(Debug)]
pub struct TurnGuard<'a> {
    turnstile: &'a Turnstile,
    position: usize,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.turnstile.advance(self.position);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/turnstile.rs"]
mod tests;
