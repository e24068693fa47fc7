//! The fixed, ordered registry of statistic definitions.
//!
//! The catalog is constructed exactly once (see [`CATALOG`]); every
//! definition's match token is precomputed inside the constructor, so no
//! shared state is ever mutated after initialization.

use lazy_static::lazy_static;
use strum::IntoEnumIterator;

/// Identifies one statistic. The discriminant is the catalog index, and the
/// declaration order is the catalog order.
///
/// The five statistic groups occupy fixed contiguous index ranges, exposed
/// as the typed block constants below rather than as base-plus-offset
/// arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumCount, strum::EnumIter,
)]
pub enum StatId {
    Baseline,
    Min,
    Max,
    Amplitude,
    Mean,
    Slope,
    Intercept,
    ChiSquared,
    ZeroCrossing,
    MeanExpRate,
    MaxExpRate,
    RefChiSquared,
    RefRise25,
    RefRise50,
    RefRise75,
    Fall25,
    Fall50,
    Fall75,
    Rise25,
    Rise50,
    Rise75,
    Period,
    Slope1,
    Slope2,
    Slope3,
    Slope4,
    Mean1,
    Mean2,
    Mean3,
    Mean4,
}

impl StatId {
    /// Catalog index of this statistic.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The statistics derived from the global linear fit. The first of the
    /// exponential-rate pair follows the fit proper in the catalog.
    pub const FIT_GROUP: [StatId; 6] = [
        StatId::Slope,
        StatId::Intercept,
        StatId::ChiSquared,
        StatId::ZeroCrossing,
        StatId::MeanExpRate,
        StatId::MaxExpRate,
    ];

    /// Times at which the waveform first rises through a fraction of the
    /// reference waveform's final sample.
    pub const REFERENCE_RISE_TIMES: [StatId; 3] =
        [StatId::RefRise25, StatId::RefRise50, StatId::RefRise75];

    /// Times at which the waveform first falls through a fraction of its
    /// maximum, searched from the maximum onwards.
    pub const FALL_TIMES: [StatId; 3] = [StatId::Fall25, StatId::Fall50, StatId::Fall75];

    /// Times at which the waveform first rises through a fraction of its
    /// maximum, searched from the start.
    pub const RISE_TIMES: [StatId; 3] = [StatId::Rise25, StatId::Rise50, StatId::Rise75];

    /// Independent slopes over the four equal sub-windows of the tail of
    /// the waveform.
    pub const QUARTER_SLOPES: [StatId; 4] =
        [StatId::Slope1, StatId::Slope2, StatId::Slope3, StatId::Slope4];

    /// Bulk means over the four configured mean regions.
    pub const REGION_MEANS: [StatId; 4] =
        [StatId::Mean1, StatId::Mean2, StatId::Mean3, StatId::Mean4];
}

/// The level fractions shared by the three crossing-time triples.
pub const CROSSING_FRACTIONS: [crate::Real; 3] = [0.25, 0.5, 0.75];

/// How a statistic's output units are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    /// The signal's own physical units, when it has any.
    Signal,
    /// The caller-supplied time unit.
    Time,
    /// Signal units over time units.
    SignalPerTime,
    /// No units.
    Dimensionless,
}

/// One immutable catalog entry.
#[derive(Debug, Clone)]
pub struct StatisticDef {
    pub id: StatId,
    pub name: String,
    pub unit_class: UnitClass,
    template: &'static str,
    match_token: String,
}

impl StatisticDef {
    /// The description with the given subject substituted into its one slot.
    pub fn describe(&self, subject: &str) -> String {
        self.template.replacen("{}", subject, 1)
    }

    /// Name plus delimiter, searched for verbatim in selection expressions.
    /// The delimiter stops one name matching inside another when it is a
    /// prefix of it (`Mean` in `MeanExpRate`, `Slope` in `Slope1`).
    pub(crate) fn match_token(&self) -> &str {
        &self.match_token
    }
}

fn unit_class_and_template(id: StatId) -> (UnitClass, &'static str) {
    match id {
        StatId::Baseline => (UnitClass::Signal, "baseline level of {}"),
        StatId::Min => (UnitClass::Signal, "minimum of {}"),
        StatId::Max => (UnitClass::Signal, "maximum of {}"),
        StatId::Amplitude => (UnitClass::Signal, "peak amplitude of {} above baseline"),
        StatId::Mean => (UnitClass::Signal, "mean of {}"),
        StatId::Slope => (UnitClass::SignalPerTime, "fitted slope of {}"),
        StatId::Intercept => (UnitClass::Signal, "fitted intercept of {}"),
        StatId::ChiSquared => (
            UnitClass::Dimensionless,
            "reduced chi-squared of the linear fit to {}",
        ),
        StatId::ZeroCrossing => (UnitClass::Time, "time at which the linear fit to {} crosses zero"),
        StatId::MeanExpRate => (
            UnitClass::Time,
            "mean exponential time constant of the fit residuals of {}",
        ),
        StatId::MaxExpRate => (
            UnitClass::Time,
            "largest exponential time constant of the fit residuals of {}",
        ),
        StatId::RefChiSquared => (
            UnitClass::Dimensionless,
            "mean squared deviation of {} from its reference",
        ),
        StatId::RefRise25 => (
            UnitClass::Time,
            "time for {} to rise to 25% of the reference endpoint",
        ),
        StatId::RefRise50 => (
            UnitClass::Time,
            "time for {} to rise to 50% of the reference endpoint",
        ),
        StatId::RefRise75 => (
            UnitClass::Time,
            "time for {} to rise to 75% of the reference endpoint",
        ),
        StatId::Fall25 => (UnitClass::Time, "time for {} to fall to 25% of its maximum"),
        StatId::Fall50 => (UnitClass::Time, "time for {} to fall to 50% of its maximum"),
        StatId::Fall75 => (UnitClass::Time, "time for {} to fall to 75% of its maximum"),
        StatId::Rise25 => (UnitClass::Time, "time for {} to rise to 25% of its maximum"),
        StatId::Rise50 => (UnitClass::Time, "time for {} to rise to 50% of its maximum"),
        StatId::Rise75 => (UnitClass::Time, "time for {} to rise to 75% of its maximum"),
        StatId::Period => (UnitClass::Time, "average period of {}"),
        StatId::Slope1 => (UnitClass::SignalPerTime, "slope of {} over quarter window 1"),
        StatId::Slope2 => (UnitClass::SignalPerTime, "slope of {} over quarter window 2"),
        StatId::Slope3 => (UnitClass::SignalPerTime, "slope of {} over quarter window 3"),
        StatId::Slope4 => (UnitClass::SignalPerTime, "slope of {} over quarter window 4"),
        StatId::Mean1 => (UnitClass::Signal, "mean of {} over region 1"),
        StatId::Mean2 => (UnitClass::Signal, "mean of {} over region 2"),
        StatId::Mean3 => (UnitClass::Signal, "mean of {} over region 3"),
        StatId::Mean4 => (UnitClass::Signal, "mean of {} over region 4"),
    }
}

/// The ordered statistic registry.
#[derive(Debug, Clone)]
pub struct Catalog {
    defs: Vec<StatisticDef>,
}

impl Catalog {
    pub fn new() -> Self {
        let defs = StatId::iter()
            .map(|id| {
                let (unit_class, template) = unit_class_and_template(id);
                let name = id.to_string();
                let match_token = format!("{name} ");
                StatisticDef {
                    id,
                    name,
                    unit_class,
                    template,
                    match_token,
                }
            })
            .collect();
        Self { defs }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn lookup(&self, id: StatId) -> &StatisticDef {
        &self.defs[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatisticDef> {
        self.defs.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// The catalog, constructed once with every match token precomputed.
    pub static ref CATALOG: Catalog = Catalog::new();
}
