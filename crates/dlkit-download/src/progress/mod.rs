//! Progress tracking and throttling.
//!
//! The tracker turns raw transport progress into the monotone values
//! observers see; the throttle rate-limits the resulting sink events.

mod throttle;
mod tracker;

pub use throttle::ProgressThrottle;
pub use tracker::{ProgressTracker, UNKNOWN_TOTAL_DISPLAY_CEILING};
