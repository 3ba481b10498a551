//! Single-shot countdown timers used to synthesize playback completion.
//!
//! The audio output never says when a clip has finished, so the player arms
//! a [`CompletionTimer`] for the clip's known duration instead. Ticks are
//! delivered on the context that armed the timer.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::error::SoundError;

/// Interval a timer starts with, before the player configures a clip duration.
pub const DEFAULT_COMPLETION_INTERVAL: Duration = Duration::from_secs(1);

/// Callback run when a timer fires.
pub type TickHandler = Box<dyn FnOnce()>;

/// A single-shot timer with a configurable interval.
pub trait CompletionTimer {
    fn set_interval(&mut self, interval: Duration);

    fn interval(&self) -> Duration;

    /// Arms the timer to call `on_tick` once the interval has elapsed.
    ///
    /// Re-arming replaces any pending tick.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::TimerUnavailable` if the timer cannot be scheduled.
    fn start(&mut self, on_tick: TickHandler) -> Result<(), SoundError>;

    /// Cancels the pending tick, if any.
    fn stop(&mut self);

    fn is_armed(&self) -> bool;
}

// ============================================================================
// TokioCompletionTimer
// ============================================================================

/// Timer backed by a tokio local task.
///
/// Must be started from within a [`tokio::task::LocalSet`]; the tick runs
/// on that same local set. Starting it anywhere else fails with
/// `SoundError::TimerUnavailable`.
#[derive(Debug)]
pub struct TokioCompletionTimer {
    interval: Duration,
    armed: Rc<Cell<bool>>,
    task: Option<JoinHandle<()>>,
}

impl TokioCompletionTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_COMPLETION_INTERVAL,
            armed: Rc::new(Cell::new(false)),
            task: None,
        }
    }
}

impl Default for TokioCompletionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionTimer for TokioCompletionTimer {
    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn start(&mut self, on_tick: TickHandler) -> Result<(), SoundError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| SoundError::TimerUnavailable(e.to_string()))?;

        self.stop();

        let interval = self.interval;
        let armed = Rc::clone(&self.armed);
        let tick = async move {
            tokio::time::sleep(interval).await;
            armed.set(false);
            on_tick();
        };

        // spawn_local panics outside a LocalSet, and tokio offers no way to
        // ask beforehand.
        let task = panic::catch_unwind(AssertUnwindSafe(|| tokio::task::spawn_local(tick)))
            .map_err(|_| {
                SoundError::TimerUnavailable("not running inside a LocalSet".to_string())
            })?;

        self.armed.set(true);
        self.task = Some(task);

        debug!("Completion timer armed for {:?}", interval);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.armed.replace(false) {
            debug!("Completion timer cancelled");
        }
    }

    fn is_armed(&self) -> bool {
        self.armed.get()
    }
}

impl Drop for TokioCompletionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// ManualTimer
// ============================================================================

#[derive(Default)]
struct ManualState {
    interval: Cell<Duration>,
    pending: RefCell<Option<TickHandler>>,
    starts: Cell<usize>,
}

/// Deterministic timer for testing; ticks only when [`ManualTimer::fire`]
/// is called.
///
/// Clones share their state, so a test can keep one clone while the player
/// owns another.
#[derive(Clone)]
pub struct ManualTimer {
    state: Rc<ManualState>,
}

impl ManualTimer {
    #[must_use]
    pub fn new() -> Self {
        let state = ManualState::default();
        state.interval.set(DEFAULT_COMPLETION_INTERVAL);
        Self {
            state: Rc::new(state),
        }
    }

    /// Fires the pending tick as if the interval had elapsed.
    ///
    /// The timer is disarmed before the callback runs. Returns false if the
    /// timer was not armed.
    pub fn fire(&self) -> bool {
        let pending = self.state.pending.borrow_mut().take();
        match pending {
            Some(on_tick) => {
                on_tick();
                true
            }
            None => false,
        }
    }

    /// Number of times the timer has been armed.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.state.starts.get()
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimer")
            .field("interval", &self.state.interval.get())
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl CompletionTimer for ManualTimer {
    fn set_interval(&mut self, interval: Duration) {
        self.state.interval.set(interval);
    }

    fn interval(&self) -> Duration {
        self.state.interval.get()
    }

    fn start(&mut self, on_tick: TickHandler) -> Result<(), SoundError> {
        self.state.pending.replace(Some(on_tick));
        self.state.starts.set(self.state.starts.get() + 1);
        Ok(())
    }

    fn stop(&mut self) {
        self.state.pending.replace(None);
    }

    fn is_armed(&self) -> bool {
        self.state.pending.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::LocalSet;

    fn counter() -> (Rc<Cell<u32>>, TickHandler) {
        let count = Rc::new(Cell::new(0));
        let tick_count = Rc::clone(&count);
        (count, Box::new(move || tick_count.set(tick_count.get() + 1)))
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(TokioCompletionTimer::new().interval(), Duration::from_secs(1));
        assert_eq!(ManualTimer::new().interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_tokio_timer_requires_runtime() {
        let mut timer = TokioCompletionTimer::new();
        let (_, on_tick) = counter();
        assert!(matches!(
            timer.start(on_tick),
            Err(SoundError::TimerUnavailable(_))
        ));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_requires_local_set() {
        let mut timer = TokioCompletionTimer::new();
        let (count, on_tick) = counter();
        assert!(matches!(
            timer.start(on_tick),
            Err(SoundError::TimerUnavailable(_))
        ));
        assert!(!timer.is_armed());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_fires_once_after_interval() {
        LocalSet::new()
            .run_until(async {
                let mut timer = TokioCompletionTimer::new();
                timer.set_interval(Duration::from_secs(5));
                let (count, on_tick) = counter();
                timer.start(on_tick).unwrap();
                assert!(timer.is_armed());

                tokio::time::sleep(Duration::from_millis(4900)).await;
                assert_eq!(count.get(), 0);

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert_eq!(count.get(), 1);
                assert!(!timer.is_armed());

                tokio::time::sleep(Duration::from_secs(10)).await;
                assert_eq!(count.get(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_stop_cancels_tick() {
        LocalSet::new()
            .run_until(async {
                let mut timer = TokioCompletionTimer::new();
                timer.set_interval(Duration::from_secs(2));
                let (count, on_tick) = counter();
                timer.start(on_tick).unwrap();

                tokio::time::sleep(Duration::from_secs(1)).await;
                timer.stop();
                assert!(!timer.is_armed());

                tokio::time::sleep(Duration::from_secs(5)).await;
                assert_eq!(count.get(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_restart_replaces_pending_tick() {
        LocalSet::new()
            .run_until(async {
                let mut timer = TokioCompletionTimer::new();
                let (first, first_tick) = counter();
                let (second, second_tick) = counter();

                timer.set_interval(Duration::from_secs(1));
                timer.start(first_tick).unwrap();
                timer.set_interval(Duration::from_secs(3));
                timer.start(second_tick).unwrap();

                tokio::time::sleep(Duration::from_secs(4)).await;
                assert_eq!(first.get(), 0);
                assert_eq!(second.get(), 1);
            })
            .await;
    }

    #[test]
    fn test_manual_timer_fire() {
        let timer = ManualTimer::new();
        let mut owned = timer.clone();
        let (count, on_tick) = counter();

        assert!(!timer.fire());
        owned.start(on_tick).unwrap();
        assert!(timer.is_armed());
        assert_eq!(timer.start_count(), 1);

        assert!(timer.fire());
        assert!(!timer.is_armed());
        assert!(!timer.fire());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_manual_timer_stop() {
        let mut timer = ManualTimer::new();
        let (count, on_tick) = counter();
        timer.set_interval(Duration::from_millis(400));
        timer.start(on_tick).unwrap();
        timer.stop();

        assert!(!timer.fire());
        assert_eq!(count.get(), 0);
        assert_eq!(timer.interval(), Duration::from_millis(400));
    }

    #[test]
    fn test_manual_timer_is_disarmed_during_tick() {
        let timer = ManualTimer::new();
        let observer = timer.clone();
        let seen_armed = Rc::new(Cell::new(true));
        let seen = Rc::clone(&seen_armed);

        timer
            .clone()
            .start(Box::new(move || seen.set(observer.is_armed())))
            .unwrap();
        timer.fire();
        assert!(!seen_armed.get());
    }
}
