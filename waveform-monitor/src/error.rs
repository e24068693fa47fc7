use thiserror::Error;

pub(crate) type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub(crate) enum MonitorError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sample-interval {0} must be positive")]
    BadSampleInterval(f64),
    #[error("{name} = {value} must lie strictly between 0 and 1")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[error("head-fraction {head} must be less than tail-fraction {tail}")]
    InvertedFitRange { head: f64, tail: f64 },
    #[error(
        "mean region {index}: start {start} and length {length} must satisfy \
         0 <= start, 0 < length, start + length <= 1"
    )]
    BadMeanRegion {
        index: usize,
        start: f64,
        length: f64,
    },
    #[error("decimation factor must be at least 1")]
    BadDecimation,
    #[error("no capture for configured signal {0}")]
    MissingCapture(String),
    #[error("signal {name}: waveform has {samples} samples but reference has {reference}")]
    LengthMismatch {
        name: String,
        samples: usize,
        reference: usize,
    },
}
