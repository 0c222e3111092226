use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the benchmark harness.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub dataset: Dataset,
    pub benchmark: Benchmark,
}

/// Controls how much synthetic data is seeded before the benchmark runs.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    /// Number of customer rows to seed. Default: 100.
    pub customers: u32,
    /// Number of order rows to seed. Default: 1000.
    pub orders: u32,
}

/// Controls the measured query and the generator.
#[derive(Debug, Clone, Deserialize)]
pub struct Benchmark {
    /// How many orders each strategy fetches. Default: 10.
    pub page_size: usize,
    /// Seed for the deterministic generator, so amounts and customer
    /// assignments are identical across runs. Default: 42.
    pub seed: u64,
}

impl Settings {
    /// Rejects settings that would make the benchmark meaningless before any
    /// store work happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.benchmark.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "benchmark.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
