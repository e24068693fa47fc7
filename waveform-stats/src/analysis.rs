//! Computes every desired statistic for one waveform and its reference.
//!
//! The analyzer is constructed once per run and is stateless across calls:
//! each call is a deterministic function of the waveform pair and the slot
//! array it mutates. Degenerate data never raises an error; every statistic
//! that cannot be computed stores [`UNMEASURABLE`](crate::UNMEASURABLE) (the
//! fit group collapses to zeros) and adds one to the returned problem count.

use crate::{
    catalog::{StatId, CROSSING_FRACTIONS},
    numeric::{estimate_period, find_falling, find_rising, linear_fit},
    selection::StatSlot,
    Real, UNMEASURABLE,
};
use tracing::debug;

/// Fractional sub-window over which a bulk mean is taken. The caller
/// guarantees 0 ≤ start, 0 < length, start + length ≤ 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanRegion {
    pub start_fraction: Real,
    pub length_fraction: Real,
}

/// Fractional shape parameters controlling where on the waveform each
/// statistic group looks. Each lies strictly between 0 and 1, with
/// `head_fraction < tail_fraction`; validation is the caller's job and the
/// analyzer's behaviour on unvalidated fractions is unspecified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParameters {
    /// Leading fraction of the waveform averaged into the baseline.
    pub baseline_fraction: Real,
    /// Start of the global fit range.
    pub head_fraction: Real,
    /// End of the global fit range.
    pub tail_fraction: Real,
    /// Residual lag for the exponential rates, as a fraction of the fit.
    pub exp_interval_fraction: Real,
    /// Start of the four quarter-slope windows, which span from here to the
    /// end of the waveform.
    pub slopes_start_fraction: Real,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self {
            baseline_fraction: 0.1,
            head_fraction: 0.1,
            tail_fraction: 0.9,
            exp_interval_fraction: 0.1,
            slopes_start_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaveformAnalyzer {
    shape: ShapeParameters,
    regions: [MeanRegion; 4],
    sample_interval: Real,
}

impl WaveformAnalyzer {
    pub fn new(
        shape: ShapeParameters,
        regions: [MeanRegion; 4],
        sample_interval: Real,
    ) -> Self {
        Self {
            shape,
            regions,
            sample_interval,
        }
    }

    /// Analyses one acquisition: overwrites the result of every desired
    /// slot and returns the number of statistics that could not be
    /// meaningfully computed. The waveform and reference must have equal
    /// length (caller precondition) and the slot array must be the
    /// catalog-ordered output of the selection resolver.
    pub fn analyse(&self, waveform: &[Real], reference: &[Real], slots: &mut [StatSlot]) -> usize {
        let len = waveform.len();
        let dt = self.sample_interval;
        let mut problems = 0usize;
        let mut residuals = vec![0.0; len];

        let baseline = self.baseline(waveform);
        let (minimum, maximum, argmax) = extremes(waveform);

        store(slots, StatId::Baseline, baseline);
        store(slots, StatId::Min, minimum);
        store(slots, StatId::Max, maximum);

        if desired(slots, StatId::Amplitude) {
            if len < 2 {
                debug!("amplitude needs at least two samples");
                store(slots, StatId::Amplitude, UNMEASURABLE);
                problems += 1;
            } else {
                let amplitude = waveform
                    .iter()
                    .map(|sample| sample - baseline)
                    .fold(Real::NEG_INFINITY, Real::max);
                store(slots, StatId::Amplitude, amplitude);
            }
        }

        store(slots, StatId::Mean, mean(waveform));

        if StatId::FIT_GROUP.iter().any(|&id| desired(slots, id)) {
            problems += self.fit_group(waveform, baseline, slots, &mut residuals);
        }

        if desired(slots, StatId::RefChiSquared) {
            if len < 2 {
                debug!("reference comparison needs at least two samples");
                store(slots, StatId::RefChiSquared, UNMEASURABLE);
                problems += 1;
            } else {
                let chi = waveform
                    .iter()
                    .zip(reference)
                    .map(|(sample, refsample)| (sample - refsample) * (sample - refsample))
                    .sum::<Real>()
                    / len as Real;
                store(slots, StatId::RefChiSquared, chi);
            }
        }

        let reference_top = reference.last().copied().unwrap_or_default();
        for (&id, fraction) in StatId::REFERENCE_RISE_TIMES.iter().zip(CROSSING_FRACTIONS) {
            if desired(slots, id) {
                let crossing = find_rising(waveform, 0, fraction * reference_top);
                problems += store_crossing(slots, id, crossing, dt);
            }
        }
        for (&id, fraction) in StatId::FALL_TIMES.iter().zip(CROSSING_FRACTIONS) {
            if desired(slots, id) {
                let crossing = find_falling(waveform, argmax, fraction * maximum);
                problems += store_crossing(slots, id, crossing, dt);
            }
        }
        for (&id, fraction) in StatId::RISE_TIMES.iter().zip(CROSSING_FRACTIONS) {
            if desired(slots, id) {
                let crossing = find_rising(waveform, 0, fraction * maximum);
                problems += store_crossing(slots, id, crossing, dt);
            }
        }

        if desired(slots, StatId::Period) {
            match estimate_period(waveform, dt) {
                Some(estimate) => store(slots, StatId::Period, estimate.period),
                None => {
                    debug!("too few trigger crossings for a period");
                    store(slots, StatId::Period, UNMEASURABLE);
                    problems += 1;
                }
            }
        }

        problems += self.quarter_slopes(waveform, baseline, slots, &mut residuals);

        for (&id, region) in StatId::REGION_MEANS.iter().zip(self.regions) {
            if desired(slots, id) {
                store(slots, id, region_mean(waveform, region));
            }
        }

        problems
    }

    /// Mean of the leading `baseline_fraction` of the waveform, at least
    /// one sample.
    fn baseline(&self, waveform: &[Real]) -> Real {
        let count = ((waveform.len() as Real * self.shape.baseline_fraction).round() as usize)
            .max(1)
            .min(waveform.len());
        mean(&waveform[..count])
    }

    /// The global fit and everything derived from it. Returns the problems
    /// it recorded.
    fn fit_group(
        &self,
        waveform: &[Real],
        baseline: Real,
        slots: &mut [StatSlot],
        residuals: &mut [Real],
    ) -> usize {
        let len = waveform.len();
        let dt = self.sample_interval;
        let head = (len as Real * self.shape.head_fraction).round() as usize;
        let tail = ((len as Real * self.shape.tail_fraction).round() as usize).min(len);

        let Some(fit) = linear_fit(waveform, baseline, dt, head, tail, residuals) else {
            debug!("linear fit over [{head}, {tail}) is degenerate");
            for id in [
                StatId::Slope,
                StatId::Intercept,
                StatId::ChiSquared,
                StatId::MeanExpRate,
                StatId::MaxExpRate,
            ] {
                store(slots, id, 0.0);
            }
            store(slots, StatId::ZeroCrossing, UNMEASURABLE);
            return 1;
        };

        let mut problems = 0;
        store(slots, StatId::Slope, fit.slope);
        store(slots, StatId::Intercept, fit.intercept);
        store(slots, StatId::ChiSquared, fit.reduced_chi_squared);

        if desired(slots, StatId::ZeroCrossing) {
            if fit.slope == 0.0 {
                debug!("flat fit has no zero crossing");
                store(slots, StatId::ZeroCrossing, UNMEASURABLE);
                problems += 1;
            } else {
                store(slots, StatId::ZeroCrossing, -fit.intercept / fit.slope);
            }
        }

        if desired(slots, StatId::MeanExpRate) || desired(slots, StatId::MaxExpRate) {
            let points = tail.saturating_sub(head);
            let (mean_rate, max_rate) =
                exponential_rates(&residuals[..points], self.shape.exp_interval_fraction, dt);
            store(slots, StatId::MeanExpRate, mean_rate);
            store(slots, StatId::MaxExpRate, max_rate);
        }

        problems
    }

    /// Independent slope fits over the four equal sub-windows spanning
    /// `[slopes_start_fraction, 1]`. Returns the problems it recorded.
    fn quarter_slopes(
        &self,
        waveform: &[Real],
        baseline: Real,
        slots: &mut [StatSlot],
        residuals: &mut [Real],
    ) -> usize {
        let len = waveform.len() as Real;
        let dt = self.sample_interval;
        let start = self.shape.slopes_start_fraction;
        let width = (1.0 - start) / 4.0;

        let mut problems = 0;
        for (window, &id) in StatId::QUARTER_SLOPES.iter().enumerate() {
            if !desired(slots, id) {
                continue;
            }
            let from = ((start + window as Real * width) * len).round() as usize;
            let to = ((start + (window + 1) as Real * width) * len).round() as usize;
            match linear_fit(waveform, baseline, dt, from, to, residuals) {
                Some(fit) => store(slots, id, fit.slope),
                None => {
                    debug!("quarter-window fit over [{from}, {to}) is degenerate");
                    store(slots, id, 0.0);
                    problems += 1;
                }
            }
        }
        problems
    }
}

fn desired(slots: &[StatSlot], id: StatId) -> bool {
    slots.get(id.index()).is_some_and(|slot| slot.desired)
}

/// Writes `value` into the slot when it is desired; non-desired slots are
/// left untouched.
fn store(slots: &mut [StatSlot], id: StatId, value: Real) {
    if let Some(slot) = slots.get_mut(id.index()) {
        if slot.desired {
            slot.result = value;
        }
    }
}

fn store_crossing(slots: &mut [StatSlot], id: StatId, crossing: Option<Real>, dt: Real) -> usize {
    match crossing {
        Some(index) => {
            store(slots, id, index * dt);
            0
        }
        None => {
            debug!("no {id} crossing found");
            store(slots, id, UNMEASURABLE);
            1
        }
    }
}

fn mean(samples: &[Real]) -> Real {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<Real>() / samples.len() as Real
    }
}

/// Minimum, maximum and the index of the first maximum, in one scan.
fn extremes(waveform: &[Real]) -> (Real, Real, usize) {
    let mut minimum = Real::default();
    let mut maximum = Real::default();
    let mut argmax = 0usize;
    for (index, &sample) in waveform.iter().enumerate() {
        if index == 0 {
            minimum = sample;
            maximum = sample;
        } else {
            minimum = minimum.min(sample);
            if sample > maximum {
                maximum = sample;
                argmax = index;
            }
        }
    }
    (minimum, maximum, argmax)
}

/// Local exponential time constants of the fit residuals at a lag of
/// `interval_fraction` of the fit length:
/// `rate[i] = residual[i] · lag / (residual[i+lag] − residual[i]) · dt`.
/// Reports the mean rate and the largest magnitude. A fit too short for
/// even one lagged pair reports zeros.
fn exponential_rates(residuals: &[Real], interval_fraction: Real, dt: Real) -> (Real, Real) {
    let lag = ((residuals.len() as Real * interval_fraction).round() as usize).max(1);
    if residuals.len() <= lag {
        return (0.0, 0.0);
    }
    let count = residuals.len() - lag;
    let mut sum = 0.0;
    let mut max_magnitude: Real = 0.0;
    for i in 0..count {
        let rate = residuals[i] * lag as Real / (residuals[i + lag] - residuals[i]) * dt;
        sum += rate;
        max_magnitude = max_magnitude.max(rate.abs());
    }
    (sum / count as Real, max_magnitude)
}

/// Mean over the region's fractional sub-window, inclusive of both rounded
/// endpoints and silently clipped to the waveform.
fn region_mean(waveform: &[Real], region: MeanRegion) -> Real {
    if waveform.is_empty() {
        return 0.0;
    }
    let len = waveform.len();
    let from = ((region.start_fraction * len as Real).round() as usize).min(len - 1);
    let to = (((region.start_fraction + region.length_fraction) * len as Real).round() as usize)
        .min(len - 1)
        .max(from);
    mean(&waveform[from..=to])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::CATALOG,
        selection::{resolve_slots, SignalConfig},
    };
    use assert_approx_eq::assert_approx_eq;

    fn all_slots() -> Vec<StatSlot> {
        let signal = SignalConfig {
            name: "B:PS1".into(),
            units: Some("A".into()),
            selection: None,
        };
        resolve_slots(&CATALOG, &signal, "s")
    }

    fn analyzer(shape: ShapeParameters, dt: Real) -> WaveformAnalyzer {
        WaveformAnalyzer::new(shape, [MeanRegion::default(); 4], dt)
    }

    fn result(slots: &[StatSlot], id: StatId) -> Real {
        slots[id.index()].result
    }

    #[test]
    fn ramp_fit_matches_hand_computation() {
        // eleven samples 0..=10, one baseline sample, fit over [1, 10)
        let waveform: Vec<Real> = (0..=10).map(|i| i as Real).collect();
        let reference = waveform.clone();
        let mut slots = all_slots();
        let problems = analyzer(ShapeParameters::default(), 1.0).analyse(
            &waveform,
            &reference,
            &mut slots,
        );

        assert_eq!(result(&slots, StatId::Baseline), 0.0);
        assert_approx_eq!(result(&slots, StatId::Slope), 1.0, 1e-9);
        assert_approx_eq!(result(&slots, StatId::Intercept), 0.0, 1e-9);
        assert_approx_eq!(result(&slots, StatId::ChiSquared), 0.0, 1e-12);
        assert_eq!(result(&slots, StatId::Min), 0.0);
        assert_eq!(result(&slots, StatId::Max), 10.0);
        assert_approx_eq!(result(&slots, StatId::Amplitude), 10.0, 1e-12);
        assert_approx_eq!(result(&slots, StatId::Mean), 5.0, 1e-12);
        // a pure ramp has no period and no falling crossings
        assert_eq!(result(&slots, StatId::Period), UNMEASURABLE);
        assert_eq!(result(&slots, StatId::Fall50), UNMEASURABLE);
        assert!(problems >= 4);
    }

    #[test]
    fn identical_reference_gives_exactly_zero_chi_squared() {
        let waveform: Vec<Real> = (0..64)
            .map(|i| (i as Real * 0.3).sin() * 5.0 + 2.0)
            .collect();
        let reference = waveform.clone();
        let mut slots = all_slots();
        analyzer(ShapeParameters::default(), 0.01).analyse(&waveform, &reference, &mut slots);
        assert_eq!(result(&slots, StatId::RefChiSquared), 0.0);
    }

    #[test]
    fn whole_waveform_region_mean_is_the_plain_mean() {
        let waveform = [3.0, -1.0, 4.0, -1.0, 5.0, -9.0, 2.0];
        let region = MeanRegion {
            start_fraction: 0.0,
            length_fraction: 1.0,
        };
        assert_eq!(region_mean(&waveform, region), mean(&waveform));
    }

    #[test]
    fn analyse_is_idempotent() {
        let waveform: Vec<Real> = (0..128)
            .map(|i| ((i as Real / 16.0).sin() + 0.01 * i as Real) * 3.0)
            .collect();
        let reference: Vec<Real> = waveform.iter().map(|s| s * 0.9).collect();
        let analyzer = analyzer(ShapeParameters::default(), 2e-3);

        let mut first = all_slots();
        let problems_first = analyzer.analyse(&waveform, &reference, &mut first);
        let mut second = first.clone();
        let problems_second = analyzer.analyse(&waveform, &reference, &mut second);

        assert_eq!(problems_first, problems_second);
        assert_eq!(first, second);
    }

    #[test]
    fn single_sample_waveform_records_the_documented_problems() {
        let mut slots = all_slots();
        let problems = analyzer(ShapeParameters::default(), 1.0).analyse(&[7.5], &[7.5], &mut slots);

        assert_eq!(result(&slots, StatId::Amplitude), UNMEASURABLE);
        assert_eq!(result(&slots, StatId::RefChiSquared), UNMEASURABLE);
        assert_eq!(result(&slots, StatId::Baseline), 7.5);
        assert_eq!(result(&slots, StatId::Mean), 7.5);
        // 1 amplitude + 1 reference + 1 fit + 9 crossings + 1 period +
        // 4 quarter windows
        assert_eq!(problems, 17);
    }

    #[test]
    fn empty_waveform_does_not_crash() {
        let mut slots = all_slots();
        let problems =
            analyzer(ShapeParameters::default(), 1.0).analyse(&[], &[], &mut slots);
        assert_eq!(result(&slots, StatId::Amplitude), UNMEASURABLE);
        assert_eq!(result(&slots, StatId::RefChiSquared), UNMEASURABLE);
        assert_eq!(problems, 17);
    }

    #[test]
    fn crossing_times_scale_with_the_sample_interval() {
        // rises linearly to 10 then falls back; max at index 10
        let mut waveform: Vec<Real> = (0..=10).map(|i| i as Real).collect();
        waveform.extend((0..10).map(|i| 9.0 - i as Real));
        let reference = waveform.clone();
        let dt = 0.5;
        let mut slots = all_slots();
        analyzer(ShapeParameters::default(), dt).analyse(&waveform, &reference, &mut slots);

        // rising crossing of half the maximum is at sample 5
        assert_approx_eq!(result(&slots, StatId::Rise50), 5.0 * dt, 1e-9);
        // falling crossing of half the maximum is at sample 15
        assert_approx_eq!(result(&slots, StatId::Fall50), 15.0 * dt, 1e-9);
    }

    #[test]
    fn zero_slope_fit_has_no_zero_crossing() {
        let waveform = [1.0; 32];
        let reference = [1.0; 32];
        let mut slots = all_slots();
        let problems = analyzer(ShapeParameters::default(), 1.0).analyse(
            &waveform,
            &reference,
            &mut slots,
        );
        assert_eq!(result(&slots, StatId::Slope), 0.0);
        assert_eq!(result(&slots, StatId::ZeroCrossing), UNMEASURABLE);
        // flat waveform: no crossings of any kind, no period
        assert!(problems >= 11);
    }

    #[test]
    fn configured_regions_average_the_right_samples() {
        let waveform: Vec<Real> = (0..10).map(|i| i as Real).collect();
        let regions = [
            MeanRegion {
                start_fraction: 0.0,
                length_fraction: 0.5,
            },
            MeanRegion {
                start_fraction: 0.5,
                length_fraction: 0.5,
            },
            MeanRegion {
                start_fraction: 0.0,
                length_fraction: 1.0,
            },
            MeanRegion {
                start_fraction: 0.8,
                length_fraction: 0.2,
            },
        ];
        let analyzer = WaveformAnalyzer::new(ShapeParameters::default(), regions, 1.0);
        let mut slots = all_slots();
        analyzer.analyse(&waveform, &waveform.clone(), &mut slots);

        // [0, 5] inclusive
        assert_approx_eq!(result(&slots, StatId::Mean1), 2.5, 1e-12);
        // [5, 9] inclusive, clipped to the last sample
        assert_approx_eq!(result(&slots, StatId::Mean2), 7.0, 1e-12);
        assert_approx_eq!(result(&slots, StatId::Mean3), 4.5, 1e-12);
        // [8, 9] inclusive
        assert_approx_eq!(result(&slots, StatId::Mean4), 8.5, 1e-12);
    }

    #[test]
    fn undesired_slots_are_never_touched() {
        let signal = SignalConfig {
            name: "B:PS1".into(),
            units: None,
            selection: Some("<none> Mean".into()),
        };
        let mut slots = resolve_slots(&CATALOG, &signal, "s");
        for slot in slots.iter_mut() {
            slot.result = -123.0;
        }
        let waveform: Vec<Real> = (0..10).map(|i| i as Real).collect();
        let problems =
            analyzer(ShapeParameters::default(), 1.0).analyse(&waveform, &waveform.clone(), &mut slots);

        assert_eq!(problems, 0);
        assert_approx_eq!(result(&slots, StatId::Mean), 4.5, 1e-12);
        for slot in slots.iter().filter(|slot| !slot.desired) {
            assert_eq!(slot.result, -123.0);
        }
    }

    #[test]
    fn quarter_slopes_follow_their_windows() {
        // slope 1 up to the midpoint, slope -2 beyond it
        let waveform: Vec<Real> = (0..100)
            .map(|i| {
                if i < 50 {
                    i as Real
                } else {
                    50.0 - 2.0 * (i - 50) as Real
                }
            })
            .collect();
        let shape = ShapeParameters {
            slopes_start_fraction: 0.5,
            ..Default::default()
        };
        let mut slots = all_slots();
        analyzer(shape, 1.0).analyse(&waveform, &waveform.clone(), &mut slots);

        for id in StatId::QUARTER_SLOPES {
            assert_approx_eq!(result(&slots, id), -2.0, 1e-9);
        }
    }
}
