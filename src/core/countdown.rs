use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Timer capability injected into the session engine.
///
/// The engine starts and cancels it; whoever owns the real clock reports
/// elapsed periods through [`Ticker::drain`] or calls the engine's tick
/// handler directly.
pub trait Ticker {
    fn start(&mut self, period: Duration);

    fn cancel(&mut self);

    fn is_running(&self) -> bool;

    /// Number of whole periods elapsed since the previous drain.
    fn drain(&mut self) -> u32;
}

/// Wall-clock ticker for presentation layers that poll between prompts.
#[derive(Debug, Default)]
pub struct IntervalTicker {
    period: Duration,
    started_at: Option<Instant>,
    delivered: u128,
}

impl IntervalTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self, period: Duration) {
        self.period = period;
        self.started_at = Some(Instant::now());
        self.delivered = 0;
    }

    fn cancel(&mut self) {
        self.started_at = None;
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn drain(&mut self) -> u32 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let period_ms = self.period.as_millis().max(1);
        let total = started_at.elapsed().as_millis() / period_ms;
        let due = total.saturating_sub(self.delivered);
        self.delivered = total;
        u32::try_from(due).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Default)]
struct ManualState {
    running: bool,
    period: Option<Duration>,
    pending: u32,
    starts: u32,
    cancels: u32,
}

/// Ticker driven by hand. Clones share state, so a test can keep one clone
/// and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `periods` ticks; ignored while stopped.
    pub fn advance(&self, periods: u32) {
        let mut state = self.state.borrow_mut();
        if state.running {
            state.pending += periods;
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.state.borrow().period
    }

    pub fn start_count(&self) -> u32 {
        self.state.borrow().starts
    }

    pub fn cancel_count(&self) -> u32 {
        self.state.borrow().cancels
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, period: Duration) {
        let mut state = self.state.borrow_mut();
        state.running = true;
        state.period = Some(period);
        state.pending = 0;
        state.starts += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.state.borrow_mut();
        state.running = false;
        state.pending = 0;
        state.cancels += 1;
    }

    fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    fn drain(&mut self) -> u32 {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_ticker_lifecycle() {
        let handle = ManualTicker::new();
        let mut ticker = handle.clone();

        handle.advance(3);
        assert_eq!(ticker.drain(), 0);

        ticker.start(TICK_PERIOD);
        assert!(handle.is_running());
        assert_eq!(handle.period(), Some(TICK_PERIOD));

        handle.advance(2);
        handle.advance(1);
        assert_eq!(ticker.drain(), 3);
        assert_eq!(ticker.drain(), 0);

        ticker.cancel();
        assert!(!handle.is_running());
        assert_eq!(handle.start_count(), 1);
        assert_eq!(handle.cancel_count(), 1);
    }

    #[test]
    fn test_interval_ticker_counts_elapsed_periods() {
        let mut ticker = IntervalTicker::new();
        assert_eq!(ticker.drain(), 0);

        ticker.start(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(35));
        let first = ticker.drain();
        assert!(first >= 3, "expected at least 3 ticks, got {}", first);

        ticker.cancel();
        assert!(!ticker.is_running());
        assert_eq!(ticker.drain(), 0);
    }
}
