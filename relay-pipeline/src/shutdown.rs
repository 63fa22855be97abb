//! A cloneable shutdown signal the worker loops poll between iterations.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

type Hook = Box<dyn FnOnce() + Send>;

struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

struct State {
    triggered: bool,
    hooks: Vec<Hook>,
}

/// Shared cancellation token.
///
/// Cloning is cheap; every clone observes the same signal. Triggering wakes
/// any thread inside [`sleep`](Shutdown::sleep) and runs the registered
/// hooks once, which is how a blocked `put`/`take` gets released: the
/// pipeline registers a hook that closes its queue.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    /// Creates an untriggered signal.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    triggered: false,
                    hooks: Vec::new(),
                }),
                cond: Condvar::new(),
            }),
        }
    }

    /// Triggers the signal. Returns `true` for the call that actually
    /// triggered it; later calls are no-ops returning `false`.
    pub fn trigger(&self) -> bool {
        let hooks = {
            let mut state = self.inner.state.lock();
            if state.triggered {
                return false;
            }
            state.triggered = true;
            self.inner.cond.notify_all();
            std::mem::take(&mut state.hooks)
        };

        // Hooks run unlocked; they may take other locks (a queue's, say)
        for hook in hooks {
            hook();
        }
        true
    }

    /// Returns `true` once [`trigger`](Self::trigger) has been called.
    pub fn is_triggered(&self) -> bool {
        self.inner.state.lock().triggered
    }

    /// Registers `hook` to run when the signal triggers. If it already has,
    /// `hook` runs immediately on the calling thread.
    pub fn on_trigger(&self, hook: impl FnOnce() + Send + 'static) {
        let mut state = self.inner.state.lock();
        if state.triggered {
            drop(state);
            hook();
        } else {
            state.hooks.push(Box::new(hook));
        }
    }

    /// Sleeps for `duration` unless the signal triggers first.
    ///
    /// Returns `true` if the signal is triggered (on entry or during the
    /// sleep), `false` if the full duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let mut state = self.inner.state.lock();
        let Some(deadline) = Instant::now().checked_add(duration) else {
            while !state.triggered {
                self.inner.cond.wait(&mut state);
            }
            return true;
        };

        while !state.triggered {
            if self.inner.cond.wait_until(&mut state, deadline).timed_out() {
                return state.triggered;
            }
        }
        true
    }

    /// Blocks until the signal triggers.
    pub fn wait(&self) {
        let mut state = self.inner.state.lock();
        while !state.triggered {
            self.inner.cond.wait(&mut state);
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shutdown")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
