pub mod debounce;
pub mod generation;
pub mod metrics;
pub mod timers;

pub use debounce::*;
pub use generation::*;
pub use metrics::*;
pub use timers::*;
