/// Identifies one request among those issued by a [`RequestSequence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Monotonic request numbering for one kind of view-affecting request.
///
/// Each new request supersedes the previous ones, so a response is applied
/// only if its token is still the latest.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// The latest token, without superseding it. A request tagged with it
    /// is applied only if nothing newer was issued in the meantime.
    pub fn current(&self) -> RequestToken {
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Make every outstanding token stale
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_is_current() {
        let mut seq = RequestSequence::new();
        let first = seq.next();
        assert!(seq.is_current(first));

        let second = seq.next();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_current_does_not_supersede() {
        let mut seq = RequestSequence::new();
        let issued = seq.next();
        let shared = seq.current();
        assert_eq!(shared, issued);
        assert!(seq.is_current(issued));

        seq.next();
        assert!(!seq.is_current(shared));
    }

    #[test]
    fn test_invalidate() {
        let mut seq = RequestSequence::new();
        let token = seq.next();
        seq.invalidate();
        assert!(!seq.is_current(token));
    }
}
