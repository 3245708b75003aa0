use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    deadline: Time,
    payload: T,
}

/// One-shot timers on a host-driven clock.
///
/// The queue never looks at the wall clock: the owner passes `now` when
/// scheduling and when draining. Firing order is deterministic:
/// `(deadline, schedule_order)`.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, now: Time, delay_s: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            id,
            deadline: now.after(delay_s),
            payload,
        });
        id
    }

    /// Cancels a pending timer.
    ///
    /// Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn next_deadline(&self) -> Option<Time> {
        self.pending
            .iter()
            .map(|p| p.deadline)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Removes and returns every timer whose deadline is at or before `now`.
    pub fn due(&mut self, now: Time) -> Vec<(TimerId, T)> {
        let (mut fired, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.deadline.0 <= now.0);
        self.pending = keep;

        fired.sort_by(|a, b| {
            a.deadline
                .0
                .total_cmp(&b.deadline.0)
                .then_with(|| a.id.cmp(&b.id))
        });
        fired.into_iter().map(|p| (p.id, p.payload)).collect()
    }
}
