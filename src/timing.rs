// ⏱️ Timers driven by the event loop
//
// Nothing here spawns threads or sleeps. The caller passes `now` in and
// polls; that keeps every transition synchronous and testable.

use std::time::{Duration, Instant};

// ============================================================================
// DEBOUNCER
// ============================================================================

/// Trailing-edge debounce: fires once, `delay` after the last call.
/// Each call replaces the pending value and restarts the wait.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Take the pending value if it is due
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, due)) if now >= due => self.cancel(),
            _ => None,
        }
    }

    /// Run `callback` with the pending value if it is due.
    /// Returns whether it ran.
    pub fn fire<F>(&mut self, now: Instant, callback: F) -> bool
    where
        F: FnOnce(T),
    {
        match self.poll(now) {
            Some(value) => {
                callback(value);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// SEARCH GATE
// ============================================================================

/// Busy flag for the simulated search latency.
/// While busy, new submissions are refused.
#[derive(Debug, Clone)]
pub struct SearchGate {
    latency: Duration,
    busy_until: Option<Instant>,
}

impl SearchGate {
    pub fn new(latency: Duration) -> Self {
        SearchGate {
            latency,
            busy_until: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy_until.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.busy_until
    }

    /// Start a search. Returns false if one is already running.
    pub fn submit(&mut self, now: Instant) -> bool {
        if self.is_busy() {
            return false;
        }
        self.busy_until = Some(now + self.latency);
        true
    }

    /// Returns true exactly once, when the running search completes
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.busy_until {
            Some(due) if now >= due => {
                self.busy_until = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_fires_once_after_last_call() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.call("3", start);
        debouncer.call("30", start + Duration::from_millis(200));
        debouncer.call("300", start + Duration::from_millis(400));

        // 500ms after the first call, but only 100ms after the last
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(900))
        );

        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), Some("300"));
        assert_eq!(debouncer.poll(start + Duration::from_millis(2000)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debounce_fire_runs_callback() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let mut fired = Vec::new();

        debouncer.call(120u16, start);
        assert!(!debouncer.fire(start, |width| fired.push(width)));
        assert!(debouncer.fire(start + Duration::from_millis(250), |width| fired.push(width)));
        assert_eq!(fired, vec![120]);
    }

    #[test]
    fn test_debounce_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        debouncer.call((), start);
        assert_eq!(debouncer.cancel(), Some(()));
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_search_gate_refuses_duplicates() {
        let start = Instant::now();
        let mut gate = SearchGate::new(Duration::from_secs(1));

        assert!(gate.submit(start));
        assert!(gate.is_busy());
        assert!(!gate.submit(start + Duration::from_millis(300)));

        assert!(!gate.poll(start + Duration::from_millis(999)));
        assert!(gate.poll(start + Duration::from_secs(1)));
        assert!(!gate.poll(start + Duration::from_secs(2)));

        assert!(gate.submit(start + Duration::from_secs(2)));
    }
}
