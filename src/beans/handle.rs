use std::cmp;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use parking_lot::{Condvar, Mutex, RwLock};

use super::{BeanError, WaitPolicy};
use crate::context::Container;

/// Late-bound slot for the application container.
///
/// Starts empty and becomes ready exactly once, on [`bind`](Self::bind).
/// Waiters park on a condvar that is signalled after every bind or
/// registration, and wake at least once per poll interval to re-check.
pub struct ContainerHandle {
    slot: RwLock<Option<Arc<dyn Container>>>,
    ready: AtomicBool,
    signal: Mutex<()>,
    changed: Condvar,
}

impl ContainerHandle {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            ready: AtomicBool::new(false),
            signal: Mutex::new(()),
            changed: Condvar::new(),
        }
    }

    pub fn bind(&self, container: Arc<dyn Container>) -> Result<(), BeanError> {
        {
            let mut slot = self.slot.write();
            if slot.is_some() {
                return Err(BeanError::AlreadyBound);
            }
            *slot = Some(container);
            self.ready.store(true, Ordering::Release);
        }
        debug!("container bound");
        self.notify();
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn current(&self) -> Option<Arc<dyn Container>> {
        self.slot.read().clone()
    }

    /// Runs `f` against the bound container while holding the read lock.
    pub fn with_container<R>(&self, f: impl FnOnce(&dyn Container) -> R) -> Option<R> {
        let slot = self.slot.read();
        slot.as_deref().map(f)
    }

    /// Wakes every thread blocked in [`wait_for`](Self::wait_for).
    pub fn notify(&self) {
        let _signal = self.signal.lock();
        self.changed.notify_all();
    }

    /// Polls `check` until it yields a value or `policy.window()` has
    /// elapsed. `None` is only returned once the deadline has passed.
    pub fn wait_for<T>(&self, policy: WaitPolicy, mut check: impl FnMut() -> Option<T>) -> Option<T> {
        let deadline = Instant::now() + policy.window();
        let mut signal = self.signal.lock();
        loop {
            if let Some(found) = check() {
                return Some(found);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let step = cmp::min(now + policy.interval(), deadline);
            self.changed.wait_until(&mut signal, step);
        }
    }
}

impl Default for ContainerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}
