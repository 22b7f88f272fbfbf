use std::time::{Duration, Instant};

/// Quiet period before a search filter is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses bursts of input into one action.
///
/// Each `schedule` replaces the pending deadline; `fire` reports true once,
/// when the latest deadline has passed.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
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
    fn test_fires_once_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule(start);

        assert!(!debouncer.fire(start + Duration::from_millis(299)));
        assert!(debouncer.fire(start + Duration::from_millis(300)));
        assert!(!debouncer.fire(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));

        assert!(!debouncer.fire(start + Duration::from_millis(350)));
        assert!(debouncer.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule(start);
        debouncer.cancel();

        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire(start + Duration::from_secs(1)));
    }
}
