//! Simulator settings

/// How readings are generated and where they are served
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub machine_id: String,
    pub interval_ms: u64,
    /// Number of readings kept and served by `GET /readings`
    pub window: usize,
    /// Probability that a generated reading is an anomaly
    pub anomaly_chance: f64,
    pub bind_address: String,
    pub port: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            machine_id: "press_001".to_string(),
            interval_ms: 1000,
            window: 50,
            anomaly_chance: 0.05,
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.interval_ms == 0 {
            return Err(crate::SimError::Config(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.window == 0 {
            return Err(crate::SimError::Config(
                "window must hold at least one reading".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.anomaly_chance) {
            return Err(crate::SimError::Config(format!(
                "anomaly_chance must be between 0 and 1, got {}",
                self.anomaly_chance
            )));
        }
        Ok(())
    }
}
