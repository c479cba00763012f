use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, RosterError};

/// Runtime configuration, loaded from `config.toml` at the working directory.
/// Falls back to compiled defaults when the file is absent so that demo runs
/// and tests work without any setup.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// Business-rule filters applied by the normalizer and the revenue gate.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Revenue floor in rubles. Records with known revenue below this are dropped.
    #[serde(default = "default_min_revenue")]
    pub min_revenue: f64,
    /// Reporting years considered current for revenue figures.
    #[serde(default = "default_revenue_years")]
    pub revenue_years: Vec<i32>,
}

/// Fuzzy-matching thresholds used by the entity resolver.
///
/// The values are empirical constants carried over from production runs.
/// They are configuration, not derived quantities; tune with care.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Minimum character-level sequence-similarity ratio to call two names equal.
    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: f64,
    /// Minimum token-set Jaccard similarity to call two names equal.
    #[serde(default = "default_jaccard_threshold")]
    pub jaccard_threshold: f64,
    /// Both names must be longer than this before substring containment counts.
    #[serde(default = "default_containment_min_len")]
    pub containment_min_len: usize,
}

fn default_min_revenue() -> f64 {
    200_000_000.0
}

fn default_revenue_years() -> Vec<i32> {
    vec![2022, 2023, 2024]
}

fn default_ratio_threshold() -> f64 {
    0.8
}

fn default_jaccard_threshold() -> f64 {
    0.6
}

fn default_containment_min_len() -> usize {
    5
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_revenue: default_min_revenue(),
            revenue_years: default_revenue_years(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: default_ratio_threshold(),
            jaccard_threshold: default_jaccard_threshold(),
            containment_min_len: default_containment_min_len(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }
        Self::load_from(config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            RosterError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.filters.min_revenue, 200_000_000.0);
        assert_eq!(config.matching.ratio_threshold, 0.8);
        assert_eq!(config.matching.jaccard_threshold, 0.6);
        assert_eq!(config.matching.containment_min_len, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[filters]\nmin_revenue = 100000000.0\n\n[matching]\nratio_threshold = 0.9"
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.filters.min_revenue, 100_000_000.0);
        assert_eq!(config.matching.ratio_threshold, 0.9);
        // Omitted keys keep their defaults
        assert_eq!(config.matching.jaccard_threshold, 0.6);
        assert_eq!(config.filters.revenue_years, vec![2022, 2023, 2024]);
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let result = Config::load_from("does-not-exist.toml");
        assert!(matches!(result, Err(RosterError::Config(_))));
    }
}
