//! Time-series records.
//!
//! A record accumulates timestamped samples for any number of keys before
//! they are pushed to the management side in one batch. Keys are relative
//! resource paths ("floatValue", "sensors.temp"); each key holds a single
//! value type until the record is taken.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::error::{AvDataError, Result};
use crate::model::{ResourceValue, ValueType};
use crate::path::ResourcePath;

/// Default number of samples a record holds before it must be pushed.
pub const DEFAULT_MAX_RECORD_SAMPLES: usize = 256;

/// One timestamped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch, as given by the recorder.
    pub timestamp: u64,
    pub value: ResourceValue,
}

#[derive(Debug, Clone)]
struct Series {
    value_type: ValueType,
    samples: Vec<Sample>,
}

/// Accumulates samples until taken as a [`RecordBatch`].
#[derive(Debug, Clone)]
pub struct TimeSeriesRecord {
    series: BTreeMap<String, Series>,
    sample_count: usize,
    max_samples: usize,
    max_string_bytes: usize,
}

impl TimeSeriesRecord {
    /// Create an empty record bounded by the service limits.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            series: BTreeMap::new(),
            sample_count: 0,
            max_samples: config.max_record_samples,
            max_string_bytes: config.max_string_bytes,
        }
    }

    /// Append a sample under `key`.
    ///
    /// A key keeps the type of its first sample; recording another type
    /// fails with `TypeMismatch` and leaves the record unchanged.
    pub fn record(&mut self, key: &str, value: ResourceValue, timestamp: u64) -> Result<()> {
        let path = ResourcePath::parse(key)?;
        let canonical = path.canonical();

        let Some(value_type) = value.value_type() else {
            return Err(AvDataError::EmptyValue(canonical));
        };
        if let ResourceValue::Str(s) = &value {
            if s.len() > self.max_string_bytes {
                return Err(AvDataError::Overflow {
                    len: s.len(),
                    capacity: self.max_string_bytes,
                });
            }
        }
        if self.sample_count >= self.max_samples {
            return Err(AvDataError::Overflow {
                len: self.sample_count + 1,
                capacity: self.max_samples,
            });
        }

        match self.series.get_mut(&canonical) {
            Some(series) if series.value_type != value_type => {
                return Err(AvDataError::TypeMismatch {
                    path: canonical,
                    expected: series.value_type,
                    found: value_type,
                });
            }
            Some(series) => series.samples.push(Sample { timestamp, value }),
            None => {
                self.series.insert(
                    canonical,
                    Series {
                        value_type,
                        samples: vec![Sample { timestamp, value }],
                    },
                );
            }
        }
        self.sample_count += 1;
        Ok(())
    }

    pub fn record_int(&mut self, key: &str, value: i64, timestamp: u64) -> Result<()> {
        self.record(key, ResourceValue::Int(value), timestamp)
    }

    pub fn record_float(&mut self, key: &str, value: f64, timestamp: u64) -> Result<()> {
        self.record(key, ResourceValue::Float(value), timestamp)
    }

    pub fn record_bool(&mut self, key: &str, value: bool, timestamp: u64) -> Result<()> {
        self.record(key, ResourceValue::Bool(value), timestamp)
    }

    pub fn record_string(&mut self, key: &str, value: &str, timestamp: u64) -> Result<()> {
        self.record(key, ResourceValue::Str(value.to_string()), timestamp)
    }

    /// Total number of samples held.
    pub fn len(&self) -> usize {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Move every sample out, leaving the record empty and every key free
    /// to take a new type.
    pub fn take(&mut self) -> RecordBatch {
        self.sample_count = 0;
        let series = std::mem::take(&mut self.series)
            .into_iter()
            .map(|(key, series)| (key, series.samples))
            .collect();
        RecordBatch { series }
    }
}

impl Default for TimeSeriesRecord {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}

/// Samples taken from a record, keyed by canonical path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBatch {
    pub series: BTreeMap<String, Vec<Sample>>,
}

impl RecordBatch {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of samples in the batch.
    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// JSON form: `{"/key": [{"timestamp": .., "value": ..}, ..]}`.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .series
            .iter()
            .map(|(key, samples)| {
                let samples = samples
                    .iter()
                    .map(|s| serde_json::json!({"timestamp": s.timestamp, "value": s.value.to_json()}))
                    .collect();
                (key.clone(), serde_json::Value::Array(samples))
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
