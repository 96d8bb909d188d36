//! The one lock around game state, and the shutdown flag both loops poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::state::{BlinkOutcome, Cell, ClickOutcome, GameSnapshot, GameState};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Shared handle to the game state.
///
/// Every read and every compound read-modify-write goes through one mutex so
/// target, score, streak and the flags are never observed half-updated.
/// Critical sections only touch fields; drawing and tracking happen outside.
#[derive(Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<GameState>>,
}

impl SharedGame {
    pub fn new(state: GameState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn on_blink(&self) -> BlinkOutcome {
        self.inner.lock().apply_blink()
    }

    pub fn on_click(&self, cell: Cell) -> ClickOutcome {
        self.inner.lock().apply_click(cell)
    }

    pub fn take_redraw(&self) -> Option<GameSnapshot> {
        self.inner.lock().take_redraw()
    }

    pub fn mark_dirty(&self) {
        self.inner.lock().mark_dirty();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.inner.lock().snapshot()
    }

    /// Runs `f` against the state under the lock. Keep `f` short.
    pub fn inspect<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.inner.lock())
    }
}

#[derive(Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Joins `handle` if it finishes within `timeout`. On expiry the thread is
/// left detached and `None` is returned.
pub fn join_with_timeout<T>(handle: JoinHandle<T>, timeout: Duration) -> Option<thread::Result<T>> {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(JOIN_POLL_INTERVAL);
    }
    Some(handle.join())
}
