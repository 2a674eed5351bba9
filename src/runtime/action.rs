//! Timed actions: units of work that become runnable at a fixed instant.
//!
//! An action records when it was created and how long it must wait. Its ready
//! time (`created + delay`) is computed once and never changes, which is what
//! lets the ready queue order actions without ever re-keying them.

use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

/// The effect carried by a timed action. It receives the time that actually
/// elapsed between scheduling and running.
pub(crate) type Effect = Box<dyn FnOnce(Duration) + Send + 'static>;

// Instant has no maximum; delays past it are clamped to about a century.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A schedulable unit of work with a creation timestamp and a delay.
///
/// Actions are totally ordered by ready time; ties are broken by the sequence
/// number handed out by the queue, so two actions due at the same instant run
/// in scheduling order.
pub(crate) struct TimedAction {
    created: Instant,
    delay: Duration,
    ready_at: Instant,
    seq: u64,
    effect: Effect,
}

impl TimedAction {
    /// Creates a new action that becomes ready `delay` after now.
    ///
    /// # Arguments
    /// * `delay` - How long to wait before the action may run
    /// * `seq` - Tie-breaker for actions sharing a ready time
    /// * `effect` - The work to perform once ready
    pub(crate) fn new(delay: Duration, seq: u64, effect: Effect) -> Self {
        let created = Instant::now();

        Self {
            created,
            delay,
            ready_at: created
                .checked_add(delay)
                .unwrap_or_else(|| created + FAR_FUTURE),
            seq,
            effect,
        }
    }

    /// Returns the instant at which this action becomes runnable.
    pub(crate) fn ready_at(&self) -> Instant {
        self.ready_at
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }

    /// Checks whether the action is due at `now`.
    pub(crate) fn is_ready(&self, now: Instant) -> bool {
        self.ready_at <= now
    }

    /// Runs the effect if the action is due, consuming it.
    ///
    /// # Returns
    /// `Ok(elapsed)` with the time since creation if the action ran, or the
    /// untouched action back as `Err` if it is not ready yet.
    pub(crate) fn try_run(self) -> Result<Duration, Self> {
        let now = Instant::now();
        if !self.is_ready(now) {
            return Err(self);
        }

        let elapsed = now.duration_since(self.created);
        (self.effect)(elapsed);

        Ok(elapsed)
    }
}

impl fmt::Debug for TimedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedAction")
            .field("delay", &self.delay)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TimedAction {
    fn eq(&self, other: &Self) -> bool {
        self.ready_at == other.ready_at && self.seq == other.seq
    }
}

impl Eq for TimedAction {}

impl PartialOrd for TimedAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap; reversing turns it into a min-heap on ready time.
impl Ord for TimedAction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ready_at
            .cmp(&other.ready_at)
            .then_with(|| self.seq.cmp(&other.seq))
            .reverse()
    }
}
