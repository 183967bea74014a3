// Shared session state - guarded snapshot, active slot, signal flags

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::trace;

use super::history::History;
use crate::ai::{lock_tactic, ActionState, SharedTactic};
use crate::arena::{ArenaSnapshot, TickContext};

/// Level-triggered boolean signals shared by the workers and the host
/// simulation. A read returns the last-set value until explicitly cleared.
pub struct SessionFlags {
    satisfied: AtomicBool,
    success: AtomicBool,
    failure: AtomicBool,
    search_end: AtomicBool,
    search_timeout: AtomicBool,
    shutdown: AtomicBool,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self {
            satisfied: AtomicBool::new(false),
            success: AtomicBool::new(false),
            failure: AtomicBool::new(false),
            search_end: AtomicBool::new(false),
            search_timeout: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        }
    }

    /// The active tactic has reported its goal reached.
    pub fn satisfied(&self) -> bool {
        self.satisfied.load(Ordering::Relaxed)
    }

    pub fn set_satisfied(&self, value: bool) {
        self.satisfied.store(value, Ordering::Relaxed);
    }

    pub fn signal_success(&self) {
        self.success.store(true, Ordering::Relaxed);
    }

    pub fn signal_failure(&self) {
        self.failure.store(true, Ordering::Relaxed);
    }

    /// Read-then-clear: each outcome event is consumed exactly once.
    pub fn take_success(&self) -> bool {
        self.success.swap(false, Ordering::Relaxed)
    }

    pub fn take_failure(&self) -> bool {
        self.failure.swap(false, Ordering::Relaxed)
    }

    pub fn timed_out(&self) -> bool {
        self.search_timeout.load(Ordering::Relaxed)
    }

    pub fn set_timeout(&self) {
        self.search_timeout.store(true, Ordering::Relaxed);
    }

    pub fn clear_timeout(&self) {
        self.search_timeout.store(false, Ordering::Relaxed);
    }

    pub fn search_ended(&self) -> bool {
        self.search_end.load(Ordering::Relaxed)
    }

    pub fn set_search_end(&self, value: bool) {
        self.search_end.store(value, Ordering::Relaxed);
    }

    pub fn shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn clear_all(&self) {
        self.satisfied.store(false, Ordering::Relaxed);
        self.success.store(false, Ordering::Relaxed);
        self.failure.store(false, Ordering::Relaxed);
        self.search_end.store(false, Ordering::Relaxed);
        self.search_timeout.store(false, Ordering::Relaxed);
    }
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// A chosen tactic together with the state bucket it was drawn from.
#[derive(Clone)]
pub struct Decision {
    pub tactic: SharedTactic,
    pub state: Arc<ActionState>,
}

/// Per-game shared state the workers and the host tick loop cooperate
/// over. Constructed once per session and torn down explicitly.
pub struct Session {
    snapshot: Mutex<Option<ArenaSnapshot>>,
    active: Mutex<Option<Decision>>,
    search_started: Mutex<Option<Instant>>,
    history: Mutex<History>,
    pub flags: Arc<SessionFlags>,
}

impl Session {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            snapshot: Mutex::new(None),
            active: Mutex::new(None),
            search_started: Mutex::new(None),
            history: Mutex::new(History::new(history_capacity)),
            flags: Arc::new(SessionFlags::new()),
        }
    }

    /// Publish the tick's snapshot. Non-blocking: a contended lock means
    /// this tick's state is simply skipped - only the latest matters.
    pub fn submit_snapshot(&self, snapshot: ArenaSnapshot) {
        match self.snapshot.try_lock() {
            Ok(mut guard) => *guard = Some(snapshot),
            Err(_) => trace!("snapshot lock contended; dropping tick state"),
        }
    }

    /// Copy of the latest snapshot, waiting up to `max_wait` for the lock.
    /// Returns None if the lock stayed contended or no snapshot has been
    /// published yet; the caller skips its cycle and retries later.
    pub fn latest_snapshot(&self, max_wait: Duration) -> Option<ArenaSnapshot> {
        let deadline = Instant::now() + max_wait;
        loop {
            if let Ok(guard) = self.snapshot.try_lock() {
                return guard.clone();
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Run the active tactic for one tick. Execution and replacement hold
    /// the same lock, so a tactic is never executed and swapped
    /// concurrently. Returns true when the tactic reports its goal reached.
    pub fn execute_active(&self, tick: &mut TickContext) -> bool {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let Some(decision) = active.as_ref() else {
            return false;
        };
        let completed = lock_tactic(&decision.tactic).apply(tick);
        if completed {
            self.flags.set_satisfied(true);
        }
        completed
    }

    /// Install a new active tactic unless the same one is already active
    /// (identity, not equivalence). Clears the satisfied flag on a swap.
    pub fn replace_active_if_new(&self, decision: Decision) -> bool {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let same = active
            .as_ref()
            .map(|current| Arc::ptr_eq(&current.tactic, &decision.tactic))
            .unwrap_or(false);
        if same {
            return false;
        }
        *active = Some(decision);
        self.flags.set_satisfied(false);
        true
    }

    /// Mark the start of a search invocation for the watchdog. Clears the
    /// timeout flag from any previous abort.
    pub fn begin_search(&self) {
        self.flags.clear_timeout();
        self.flags.set_search_end(false);
        *self
            .search_started
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    pub fn end_search(&self) {
        self.flags.set_search_end(true);
        *self
            .search_started
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// True when a search has been running past `budget` without signaling
    /// completion.
    pub fn search_overdue(&self, budget: Duration) -> bool {
        if self.flags.search_ended() {
            return false;
        }
        let started = self
            .search_started
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        started.map(|at| at.elapsed() >= budget).unwrap_or(false)
    }

    pub fn push_history(&self, decision: Decision) -> bool {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(decision)
    }

    /// Apply one outcome's feedback across every buffered decision.
    pub fn adapt_history(&self, feedback: f64) {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        for decision in history.entries() {
            decision.state.adapt_probabilities(&decision.tactic, feedback);
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Teardown: return every guarded field to its default.
    pub fn reset(&self) {
        if let Ok(mut guard) = self.snapshot.try_lock() {
            *guard = None;
        }
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self
            .search_started
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.flags.clear_all();
    }
}
