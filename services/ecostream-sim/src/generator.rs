//! Random press telemetry: mostly normal operation with occasional spikes

use chrono::NaiveDateTime;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

pub const STATUS_NORMAL: &str = "NORMAL";
pub const STATUS_CRITICAL: &str = "CRITICAL";

/// A reading as produced by the sensor and accepted by `POST /ingest`.
/// Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub machine_id: String,
    /// Local wall-clock time without offset, e.g. `2024-05-01T10:00:01.123456`
    pub timestamp: String,
    pub temperature: f64,
    pub pressure: f64,
    pub vibration: f64,
    pub status: String,
}

/// Produces readings for one machine
#[derive(Debug, Clone)]
pub struct Generator {
    machine_id: String,
    anomaly_chance: f64,
    temperature: Normal<f64>,
    pressure: Normal<f64>,
    vibration: Normal<f64>,
}

impl Generator {
    pub fn new(machine_id: impl Into<String>, anomaly_chance: f64) -> crate::Result<Self> {
        Ok(Self {
            machine_id: machine_id.into(),
            anomaly_chance,
            temperature: normal(50.0, 2.0)?,
            pressure: normal(100.0, 10.0)?,
            vibration: normal(10.0, 2.0)?,
        })
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: NaiveDateTime) -> SensorReading {
        let is_anomaly = rng.gen::<f64>() < self.anomaly_chance;

        let (temperature, pressure, vibration, status) = if is_anomaly {
            (
                rng.gen_range(80.0..120.0),
                rng.gen_range(200.0..300.0),
                rng.gen_range(50.0..100.0),
                STATUS_CRITICAL,
            )
        } else {
            (
                self.temperature.sample(rng),
                self.pressure.sample(rng),
                self.vibration.sample(rng),
                STATUS_NORMAL,
            )
        };

        SensorReading {
            machine_id: self.machine_id.clone(),
            timestamp: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            temperature: round2(temperature),
            pressure: round2(pressure),
            vibration: round2(vibration),
            status: status.to_string(),
        }
    }
}

fn normal(mean: f64, std_dev: f64) -> crate::Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| crate::SimError::Config(e.to_string()))
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
