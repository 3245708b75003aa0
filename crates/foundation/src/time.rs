/// Host-supplied clock reading in seconds.
///
/// Nothing in the workspace reads the wall clock directly; the browser frame
/// loop, the CLI and tests all pass time in, which keeps timers replayable.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn after(self, delay_s: f64) -> Self {
        Time(self.0 + delay_s.max(0.0))
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}
