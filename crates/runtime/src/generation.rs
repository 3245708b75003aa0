/// Identifies one in-flight request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// Tracks which request is the latest so superseded responses can be dropped.
///
/// Every `begin` makes all earlier tokens stale. There is no cancellation:
/// the stale response still arrives and the owner ignores it.
#[derive(Debug, Default, Clone)]
pub struct RequestGenerations {
    current: u64,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestToken {
        self.current = self.current.wrapping_add(1);
        RequestToken(self.current)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.current
    }

    /// Makes every outstanding token stale without starting a request.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }
}
