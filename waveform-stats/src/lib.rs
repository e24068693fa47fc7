//! This crate provides the statistics engine behind the booster power-supply
//! waveform monitor: given one digitized waveform and an equal-length
//! reference waveform captured earlier in the session, it computes a
//! configurable subset of thirty named statistics describing shape, timing
//! and fit quality.
//!
//! A waveform takes the form of a slice of scalar samples at a fixed sample
//! interval. Typical usage looks like:
//! ```rust
//! use waveform_stats::{resolve_slots, SignalConfig, WaveformAnalyzer, CATALOG};
//!
//! let waveform: Vec<f64> = (0..100).map(|index| (index as f64 / 10.0).sin()).collect();
//! let reference = waveform.clone();
//!
//! let signal = SignalConfig {
//!     name: "B:PS1".into(),
//!     units: Some("A".into()),
//!     selection: Some("<all> -Period".into()),
//! };
//! // once, at configuration time
//! let mut slots = resolve_slots(&CATALOG, &signal, "s");
//! // once per acquisition cycle
//! let analyzer = WaveformAnalyzer::new(Default::default(), Default::default(), 1e-3);
//! let problems = analyzer.analyse(&waveform, &reference, &mut slots);
//! assert_eq!(problems, 0);
//! ```
//!
//! The engine is synchronous and pure: it owns no I/O, no connections and no
//! state shared across signals, so distinct signals may be analysed
//! concurrently without synchronization.

pub mod analysis;
pub mod catalog;
pub mod lister;
pub mod numeric;
pub mod selection;

pub use analysis::{MeanRegion, ShapeParameters, WaveformAnalyzer};
pub use catalog::{Catalog, StatId, StatisticDef, UnitClass, CATALOG};
pub use selection::{resolve_slots, SignalConfig, StatSlot};

pub type Real = f64;

/// Reported in place of any statistic that could not be computed from the
/// data: an absent threshold crossing, a zero-slope fit with no zero
/// crossing, too few trigger crossings for a period. Every such result also
/// increments the problem count returned by the analyzer.
pub const UNMEASURABLE: Real = 1.0e300;
