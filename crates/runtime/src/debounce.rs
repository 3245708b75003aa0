use foundation::time::Time;

/// Keeps only the latest value and releases it once the input has been quiet
/// for `delay_s`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_s: f64,
    pending: Option<(Time, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_s: f64) -> Self {
        Self {
            delay_s,
            pending: None,
        }
    }

    pub fn delay_s(&self) -> f64 {
        self.delay_s
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, now: Time, value: T) {
        self.pending = Some((now.after(self.delay_s), value));
    }

    pub fn poll(&mut self, now: Time) -> Option<T> {
        let ready = matches!(&self.pending, Some((deadline, _)) if deadline.0 <= now.0);
        if !ready {
            return None;
        }
        self.pending.take().map(|(_, v)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
