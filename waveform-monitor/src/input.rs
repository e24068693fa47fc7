//! Capture files: one JSON document holding, per signal, the freshly
//! acquired waveform and the session-long reference waveform.

use crate::error::{MonitorError, MonitorResult};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct SignalCapture {
    pub(crate) name: String,
    pub(crate) samples: Vec<f64>,
    pub(crate) reference: Vec<f64>,
}

impl SignalCapture {
    /// The engine requires equal-length waveform and reference; everything
    /// else about the data is its own problem to absorb.
    pub(crate) fn validate(&self) -> MonitorResult<()> {
        if self.samples.len() != self.reference.len() {
            return Err(MonitorError::LengthMismatch {
                name: self.name.clone(),
                samples: self.samples.len(),
                reference: self.reference.len(),
            });
        }
        Ok(())
    }

    /// Waveform and reference, block-averaged by `factor`.
    pub(crate) fn decimated(&self, factor: usize) -> (Vec<f64>, Vec<f64>) {
        (
            decimate(&self.samples, factor),
            decimate(&self.reference, factor),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CaptureSet {
    pub(crate) signals: Vec<SignalCapture>,
}

impl CaptureSet {
    pub(crate) fn load(path: &Path) -> MonitorResult<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    pub(crate) fn find(&self, name: &str) -> MonitorResult<&SignalCapture> {
        self.signals
            .iter()
            .find(|capture| capture.name == name)
            .ok_or_else(|| MonitorError::MissingCapture(name.to_owned()))
    }
}

/// Block average by `factor`; a trailing partial block is averaged over the
/// samples it holds.
pub(crate) fn decimate(samples: &[f64], factor: usize) -> Vec<f64> {
    if factor <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(factor)
        .map(|block| block.iter().sum::<f64>() / block.len() as f64)
        .collect()
}
