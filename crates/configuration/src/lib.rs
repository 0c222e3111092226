use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Benchmark, Dataset, Settings};

/// Loads the harness configuration.
///
/// Built-in defaults (100 customers, 1000 orders, page size 10, seed 42) are
/// applied first, then an optional `querybench.toml` in the working directory
/// may override them. Command-line flags layered on top by the binary win
/// over both.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("dataset.customers", 100_i64)?
        .set_default("dataset.orders", 1000_i64)?
        .set_default("benchmark.page_size", 10_i64)?
        .set_default("benchmark.seed", 42_i64)?
        // Tells the builder to look for a file named `querybench.toml`.
        // The file is optional; the defaults above stand on their own.
        .add_source(config::File::with_name("querybench").required(false))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct.
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = load_config().expect("defaults must always load");
        assert_eq!(settings.dataset.customers, 100);
        assert_eq!(settings.dataset.orders, 1000);
        assert_eq!(settings.benchmark.page_size, 10);
        assert_eq!(settings.benchmark.seed, 42);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut settings = load_config().expect("defaults must always load");
        settings.benchmark.page_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn default_settings_pass_validation() {
        let settings = load_config().expect("defaults must always load");
        assert!(settings.validate().is_ok());
    }
}
