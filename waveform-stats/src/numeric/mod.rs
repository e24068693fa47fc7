//! Waveform-agnostic numeric primitives: the closed-form linear fit, the
//! interpolated threshold-crossing searches, and the hysteresis period
//! estimator. Nothing here knows about slots, catalogs or problem counts;
//! outcomes that do not exist are `None`.

pub mod crossing;
pub mod fit;
pub mod period;

pub use crossing::{find_falling, find_rising};
pub use fit::{linear_fit, LinearFit};
pub use period::{estimate_period, PeriodEstimate};
