use super::crossing::find_rising;
use crate::Real;

/// Multi-cycle period estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodEstimate {
    pub period: Real,
    /// Number of rising trigger crossings the estimate averages over.
    pub crossings: usize,
}

/// Hysteresis period estimator. The trigger sits midway between the
/// waveform extremes; after each rising trigger crossing the scan is held
/// off until the signal has reached 90% of range, so noise around the
/// trigger level cannot re-trigger. The period is the span from first to
/// last crossing divided by the crossing count less one, making the
/// estimate a multi-cycle average robust to single-cycle jitter.
///
/// `None` when fewer than two crossings exist (including every flat or
/// empty waveform).
pub fn estimate_period(samples: &[Real], dt: Real) -> Option<PeriodEstimate> {
    let mut minimum = Real::INFINITY;
    let mut maximum = Real::NEG_INFINITY;
    for &sample in samples {
        minimum = minimum.min(sample);
        maximum = maximum.max(sample);
    }
    if !(minimum < maximum) {
        return None;
    }
    let trigger = 0.5 * (minimum + maximum);
    let rearm = minimum + 0.9 * (maximum - minimum);

    let mut crossings = 0usize;
    let mut first = 0.0;
    let mut last = 0.0;
    let mut from = 0usize;
    while let Some(crossing) = find_rising(samples, from, trigger) {
        if crossings == 0 {
            first = crossing;
        }
        last = crossing;
        crossings += 1;

        // hold off until the signal first reaches the re-arm level
        let mut next = crossing as usize + 1;
        while next < samples.len() && samples.get(next).is_some_and(|&s| s < rearm) {
            next += 1;
        }
        if next >= samples.len() {
            break;
        }
        from = next;
    }

    (crossings >= 2).then(|| PeriodEstimate {
        period: (last - first) * dt / (crossings - 1) as Real,
        crossings,
    })
}
