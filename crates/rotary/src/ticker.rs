use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Tick period of the return animation, about 60 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Handle to a running periodic task. Dropping it stops the task.
pub trait TickGuard: Sized {
    fn cancel(self) {
        drop(self);
    }
}

/// Something able to call back periodically on the UI thread.
pub trait TickSource {
    type Guard: TickGuard;

    fn start(&mut self, interval: Duration) -> Self::Guard;
}

/// Tick source for headless drivers: nothing fires on its own, the owner calls
/// `Dial::tick` with its own clock and inspects the handle to see whether a task is live.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    active: Rc<Cell<usize>>,
    started: Rc<Cell<usize>>,
    interval: Rc<Cell<Option<Duration>>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.get() > 0
    }

    /// Number of tasks ever started.
    pub fn started(&self) -> usize {
        self.started.get()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval.get()
    }
}

impl TickSource for ManualTicks {
    type Guard = ManualGuard;

    fn start(&mut self, interval: Duration) -> ManualGuard {
        self.active.set(self.active.get() + 1);
        self.started.set(self.started.get() + 1);
        self.interval.set(Some(interval));
        ManualGuard {
            active: self.active.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ManualGuard {
    active: Rc<Cell<usize>>,
}

impl TickGuard for ManualGuard {}

impl Drop for ManualGuard {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
    }
}
