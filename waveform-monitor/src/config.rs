//! The monitor configuration: everything supplied once, before the first
//! acquisition. The engine assumes validated shape parameters, so every
//! range check lives here.

use crate::error::{MonitorError, MonitorResult};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};
use waveform_stats::{MeanRegion, ShapeParameters, SignalConfig};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ShapeConfig {
    pub(crate) baseline_fraction: f64,
    pub(crate) head_fraction: f64,
    pub(crate) tail_fraction: f64,
    pub(crate) exp_interval_fraction: f64,
    pub(crate) slopes_start_fraction: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RegionConfig {
    pub(crate) start_fraction: f64,
    pub(crate) length_fraction: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct SignalEntry {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) units: Option<String>,
    #[serde(default)]
    pub(crate) selection: Option<String>,
}

impl SignalEntry {
    pub(crate) fn to_signal_config(&self) -> SignalConfig {
        SignalConfig {
            name: self.name.clone(),
            units: self.units.clone(),
            selection: self.selection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct MonitorConfig {
    /// Sample interval of the captures, before any decimation.
    pub(crate) sample_interval: f64,
    pub(crate) time_units: String,
    /// Block-average decimation factor applied to every capture.
    #[serde(default)]
    pub(crate) decimation: Option<usize>,
    pub(crate) shape: ShapeConfig,
    pub(crate) mean_regions: [RegionConfig; 4],
    pub(crate) signals: Vec<SignalEntry>,
}

impl MonitorConfig {
    pub(crate) fn load(path: &Path) -> MonitorResult<Self> {
        let config: MonitorConfig = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> MonitorResult<()> {
        if self.sample_interval <= 0.0 {
            return Err(MonitorError::BadSampleInterval(self.sample_interval));
        }
        if self.decimation == Some(0) {
            return Err(MonitorError::BadDecimation);
        }
        for (name, value) in [
            ("baseline-fraction", self.shape.baseline_fraction),
            ("head-fraction", self.shape.head_fraction),
            ("tail-fraction", self.shape.tail_fraction),
            ("exp-interval-fraction", self.shape.exp_interval_fraction),
            ("slopes-start-fraction", self.shape.slopes_start_fraction),
        ] {
            if value <= 0.0 || value >= 1.0 {
                return Err(MonitorError::FractionOutOfRange { name, value });
            }
        }
        if self.shape.head_fraction >= self.shape.tail_fraction {
            return Err(MonitorError::InvertedFitRange {
                head: self.shape.head_fraction,
                tail: self.shape.tail_fraction,
            });
        }
        for (index, region) in self.mean_regions.iter().enumerate() {
            let valid = region.start_fraction >= 0.0
                && region.length_fraction > 0.0
                && region.start_fraction + region.length_fraction <= 1.0;
            if !valid {
                return Err(MonitorError::BadMeanRegion {
                    index,
                    start: region.start_fraction,
                    length: region.length_fraction,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn shape_parameters(&self) -> ShapeParameters {
        ShapeParameters {
            baseline_fraction: self.shape.baseline_fraction,
            head_fraction: self.shape.head_fraction,
            tail_fraction: self.shape.tail_fraction,
            exp_interval_fraction: self.shape.exp_interval_fraction,
            slopes_start_fraction: self.shape.slopes_start_fraction,
        }
    }

    pub(crate) fn regions(&self) -> [MeanRegion; 4] {
        self.mean_regions.each_ref().map(|region| MeanRegion {
            start_fraction: region.start_fraction,
            length_fraction: region.length_fraction,
        })
    }

    /// Block averaging widens the effective sample interval.
    pub(crate) fn effective_sample_interval(&self) -> f64 {
        self.sample_interval * self.decimation.unwrap_or(1) as f64
    }
}
