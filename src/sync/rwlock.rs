use std::cell::UnsafeCell;
use std::fmt;
use std::hint;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};

// State word layout: | write-done (8) | write-claim (8) | read count (16) |
const READ_MASK: u32 = 0xFFFF;
const CLAIM_SHIFT: u32 = 16;
const DONE_SHIFT: u32 = 24;
const COUNTER_MAX: u32 = 0xFF;

#[inline]
fn unpack(state: u32) -> (u32, u32, u32) {
    (
        state & READ_MASK,
        (state >> CLAIM_SHIFT) & COUNTER_MAX,
        (state >> DONE_SHIFT) & COUNTER_MAX,
    )
}

#[inline]
fn pack(reads: u32, claim: u32, done: u32) -> u32 {
    (reads & READ_MASK) | ((claim & COUNTER_MAX) << CLAIM_SHIFT) | ((done & COUNTER_MAX) << DONE_SHIFT)
}

/// Spinning reader-writer lock packed in one atomic word.
///
/// Readers enter while no writer holds or waits for the lock. A writer
/// first takes a ticket (bumps the claim counter), which stops new
/// readers, then waits until the readers are gone and every earlier ticket
/// is done. Writers are therefore admitted one at a time in claim order.
///
/// Nothing here blocks in the OS: both sides busy-wait, and there is no
/// timeout. A guard that is never dropped stalls every other user.
pub struct RwLockable<T: ?Sized> {
    state: AtomicU32,
    data: UnsafeCell<T>,
}

// SAFETY: the state word grants either shared access to any number of
// readers or exclusive access to one writer, like `std::sync::RwLock`.
unsafe impl<T: ?Sized + Send> Send for RwLockable<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for RwLockable<T> {}

impl<T> RwLockable<T> {
    pub const fn new(value: T) -> Self {
        Self {
            state: AtomicU32::new(0),
            data: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> RwLockable<T> {
    /// Acquire shared access, spinning while a writer holds or waits for the lock
    pub fn read(&self) -> RwReadGuard<'_, T> {
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let (reads, claim, done) = unpack(current);
            if claim != done || reads == READ_MASK {
                hint::spin_loop();
                current = self.state.load(Ordering::Relaxed);
                continue;
            }
            match self.state.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return RwReadGuard { lock: self },
                Err(actual) => current = actual,
            }
        }
    }

    /// Acquire exclusive access, waiting for readers and earlier writers
    pub fn write(&self) -> RwWriteGuard<'_, T> {
        let mut current = self.state.load(Ordering::Relaxed);
        let ticket = loop {
            let (reads, claim, done) = unpack(current);
            if claim == COUNTER_MAX {
                // every ticket is taken until the counters wrap
                hint::spin_loop();
                current = self.state.load(Ordering::Relaxed);
                continue;
            }
            match self.state.compare_exchange_weak(
                current,
                pack(reads, claim + 1, done),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break claim,
                Err(actual) => current = actual,
            }
        };
        loop {
            let (reads, _, done) = unpack(self.state.load(Ordering::Acquire));
            if reads == 0 && done == ticket {
                return RwWriteGuard { lock: self };
            }
            hint::spin_loop();
        }
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    fn release_read(&self) {
        self.state.fetch_sub(1, Ordering::Release);
    }

    fn release_write(&self) {
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let (reads, claim, done) = unpack(current);
            let done = done + 1;
            // the last ticket is done only when claim is also at its max
            let next = if done >= COUNTER_MAX {
                pack(reads, 0, 0)
            } else {
                pack(reads, claim, done)
            };
            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

impl<T: Default> Default for RwLockable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> fmt::Debug for RwLockable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (reads, claim, done) = unpack(self.state.load(Ordering::Relaxed));
        f.debug_struct("RwLockable")
            .field("reads", &reads)
            .field("write_claim", &claim)
            .field("write_done", &done)
            .finish_non_exhaustive()
    }
}

/// Shared access to the data of a [`RwLockable`], released on drop
pub struct RwReadGuard<'a, T: ?Sized> {
    lock: &'a RwLockable<T>,
}

impl<T: ?Sized> Deref for RwReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the read count is held, no writer can be active
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for RwReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Exclusive access to the data of a [`RwLockable`], released on drop
pub struct RwWriteGuard<'a, T: ?Sized> {
    lock: &'a RwLockable<T>,
}

impl<T: ?Sized> Deref for RwWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard owns the current write ticket
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for RwWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this guard owns the current write ticket
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for RwWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
