use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

use crate::error::{Error, ErrorKind, Result};

struct State {
    readers: usize,
    writers: usize,
    owner: Option<ThreadId>,
}

/// A multi-reader / single-writer lock with writer reentrancy, built as
/// a monitor over a plain `Mutex` + `Condvar` rather than reached for
/// from a ready-made crate: the protocol needs owner-thread tracking and
/// symmetric acquire/release counting that a generic `RwLock` doesn't
/// expose.
pub struct RwLock {
    state: Mutex<State>,
    cond: Condvar,
}

impl RwLock {
    pub fn new() -> Self {
        RwLock {
            state: Mutex::new(State {
                readers: 0,
                writers: 0,
                owner: None,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn acquire_read(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        while state.writers > 0 && state.owner != Some(me) {
            state = self.cond.wait(state).unwrap();
        }
        state.readers += 1;
    }

    pub fn release_read(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.readers == 0 {
            return Err(Error::new(ErrorKind::InvalidState, "releaseRead with no active reader"));
        }
        state.readers -= 1;
        if state.readers == 0 {
            self.cond.notify_all();
        }
        Ok(())
    }

    pub fn acquire_write(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        while (state.writers > 0 || state.readers > 0) && state.owner != Some(me) {
            state = self.cond.wait(state).unwrap();
        }
        state.writers += 1;
        state.owner = Some(me);
    }

    pub fn release_write(&self) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        if state.owner != Some(me) {
            return Err(Error::new(ErrorKind::WrongOwner, "releaseWrite by non-owner thread"));
        }
        if state.writers == 0 {
            return Err(Error::new(ErrorKind::InvalidState, "releaseWrite with no active writer"));
        }
        state.writers -= 1;
        if state.writers == 0 {
            state.owner = None;
            self.cond.notify_all();
        }
        Ok(())
    }

    /// RAII read guard: `release_read` cannot fail on a guard obtained
    /// through `read()`, since the guard's existence proves the reader
    /// count is non-zero.
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard { lock: self }
    }

    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { lock: self }
    }
}

impl Default for RwLock {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ReadGuard<'a> {
    lock: &'a RwLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read().expect("release_read on live ReadGuard");
    }
}

pub struct WriteGuard<'a> {
    lock: &'a RwLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write().expect("release_write on live WriteGuard");
    }
}

/// Pairs the monitor above with the data it protects, the way
/// `std::sync::RwLock<T>` does, so callers reach for `.read()`/`.write()`
/// guards instead of juggling raw pointers themselves.
pub struct Guarded<T> {
    lock: RwLock,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for Guarded<T> {}
unsafe impl<T: Send> Sync for Guarded<T> {}

impl<T> Guarded<T> {
    pub fn new(data: T) -> Self {
        Guarded {
            lock: RwLock::new(),
            data: UnsafeCell::new(data),
        }
    }

    pub fn read(&self) -> GuardedRead<'_, T> {
        GuardedRead {
            _guard: self.lock.read(),
            data: &self.data,
        }
    }

    pub fn write(&self) -> GuardedWrite<'_, T> {
        GuardedWrite {
            _guard: self.lock.write(),
            data: &self.data,
        }
    }
}

pub struct GuardedRead<'a, T> {
    _guard: ReadGuard<'a>,
    data: &'a UnsafeCell<T>,
}

impl<T> Deref for GuardedRead<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.data.get() }
    }
}

pub struct GuardedWrite<'a, T> {
    _guard: WriteGuard<'a>,
    data: &'a UnsafeCell<T>,
}

impl<T> Deref for GuardedWrite<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.data.get() }
    }
}

impl<T> DerefMut for GuardedWrite<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.data.get() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn release_without_acquire_is_illegal_state() {
        let lock = RwLock::new();
        assert!(matches!(lock.release_read().unwrap_err().kind, ErrorKind::InvalidState));
        assert!(matches!(lock.release_write().unwrap_err().kind, ErrorKind::WrongOwner));
    }

    #[test]
    fn writer_is_reentrant_for_read_and_write() {
        let lock = RwLock::new();
        lock.acquire_write();
        lock.acquire_read();
        lock.acquire_write();
        lock.release_write().unwrap();
        lock.release_read().unwrap();
        lock.release_write().unwrap();
    }

    #[test]
    fn release_write_from_other_thread_is_wrong_owner() {
        let lock = Arc::new(RwLock::new());
        lock.acquire_write();
        let other = Arc::clone(&lock);
        let result = thread::spawn(move || other.release_write()).join().unwrap();
        assert!(matches!(result.unwrap_err().kind, ErrorKind::WrongOwner));
        lock.release_write().unwrap();
    }

    #[test]
    fn many_readers_run_concurrently() {
        let lock = Arc::new(RwLock::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                let _guard = lock.read();
                thread::sleep(Duration::from_millis(5));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn writer_excludes_readers() {
        let lock = Arc::new(RwLock::new());
        let lock2 = Arc::clone(&lock);
        let writer = thread::spawn(move || {
            let _guard = lock2.write();
            thread::sleep(Duration::from_millis(20));
        });
        thread::sleep(Duration::from_millis(5));
        let _guard = lock.read();
        writer.join().unwrap();
    }
}
