use std::time::Duration;

/// Time elapsed since the widget started. Every deadline in the crate is
/// expressed against this clock, so hosts may drive it from a wall clock or
/// step it manually.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) -> Duration {
        self.elapsed += delta;
        self.elapsed
    }

    /// Moves the clock forward to `now`. Earlier instants are ignored.
    pub fn set(&mut self, now: Duration) {
        self.elapsed = self.elapsed.max(now);
    }
}

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    at: Duration,
    task: T,
}

/// Deferred callbacks on a single event queue.
///
/// Nothing runs on its own: the owner drains due tasks from its tick.
/// Tasks due at the same instant come out in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    tasks: Vec<ScheduledTask<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask { handle, at, task });
        handle
    }

    /// Drops a pending task. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|scheduled| scheduled.handle != handle);
        before != self.tasks.len()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|scheduled| scheduled.handle == handle)
    }

    /// Removes and returns every task due at or before `now`.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|scheduled| scheduled.at <= now);
        self.tasks = pending;
        due.sort_by_key(|scheduled| (scheduled.at, scheduled.handle));
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.iter().map(|scheduled| scheduled.at).min()
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn count_matching(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        self.tasks
            .iter()
            .filter(|scheduled| predicate(&scheduled.task))
            .count()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
