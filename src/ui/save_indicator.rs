use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// Default time the indicator stays up after a save
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// When a shown indicator hides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hide {
    /// Not shown
    Idle,
    At(Instant),
    /// Shown with a delay too large to put a deadline on
    Never,
}

impl Hide {
    fn after(now: Instant, delay: Duration) -> Hide {
        now.checked_add(delay).map_or(Hide::Never, Hide::At)
    }
}

/// Transient "saved" acknowledgment.
///
/// Showing it schedules a hide at `now + delay`; the hide is just a deadline
/// owned by the indicator, polled by whoever renders it. Dropping the
/// indicator drops the deadline with it.
#[derive(Debug)]
pub struct SaveIndicator {
    hide_at: Rc<Cell<Hide>>,
    delay: Duration,
}

/// Handle that shows a [`SaveIndicator`] from a save callback.
/// Does nothing once the indicator is gone.
#[derive(Debug, Clone)]
pub struct SaveNotifier {
    hide_at: Weak<Cell<Hide>>,
    delay: Duration,
}

impl SaveIndicator {
    pub fn new(delay: Duration) -> Self {
        SaveIndicator {
            hide_at: Rc::new(Cell::new(Hide::Idle)),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn notifier(&self) -> SaveNotifier {
        SaveNotifier {
            hide_at: Rc::downgrade(&self.hide_at),
            delay: self.delay,
        }
    }

    /// Show (or re-show) the indicator, restarting the countdown
    pub fn show_at(&self, now: Instant) {
        self.hide_at.set(Hide::after(now, self.delay));
    }

    pub fn show(&self) {
        self.show_at(Instant::now());
    }

    /// Visible strictly before the deadline. An expired deadline is cleared.
    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self.hide_at.get() {
            Hide::At(deadline) if now < deadline => true,
            Hide::At(_) => {
                self.hide_at.set(Hide::Idle);
                false
            }
            Hide::Never => true,
            Hide::Idle => false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }

    /// Whether a hide is still scheduled
    pub fn is_pending(&self) -> bool {
        self.hide_at.get() != Hide::Idle
    }

    /// Hide immediately and drop the scheduled hide
    pub fn cancel(&self) {
        self.hide_at.set(Hide::Idle);
    }
}

impl Default for SaveIndicator {
    fn default() -> Self {
        SaveIndicator::new(DEFAULT_DELAY)
    }
}

impl Drop for SaveIndicator {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl SaveNotifier {
    pub fn notify_at(&self, now: Instant) {
        if let Some(hide_at) = self.hide_at.upgrade() {
            hide_at.set(Hide::after(now, self.delay));
        }
    }

    pub fn notify(&self) {
        self.notify_at(Instant::now());
    }

    /// Whether the indicator this notifier drives still exists
    pub fn is_attached(&self) -> bool {
        self.hide_at.strong_count() > 0
    }
}
