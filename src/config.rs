//! Comparison configuration
//!
//! Defaults match `numpy.allclose`. Values can be read from a YAML file:
//!
//! ```yaml
//! rtol: 1.0e-3
//! atol: 1.0e-6
//! max_listed: 20
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::compare::Tolerance;

/// Default relative tolerance
pub const DEFAULT_RTOL: f64 = 1e-5;

/// Default absolute tolerance
pub const DEFAULT_ATOL: f64 = 1e-8;

/// Settings for a comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Maximum unique names listed per file in the report (0 = all)
    pub max_listed: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            max_listed: 0,
        }
    }
}

impl CompareConfig {
    /// Load from a YAML file; missing keys keep their defaults
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite tolerances
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("rtol", self.rtol), ("atol", self.atol)] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a finite, non-negative number, got {}", name, value);
            }
        }
        Ok(())
    }

    /// Tolerance pair used by the comparator
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            rtol: self.rtol,
            atol: self.atol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompareConfig::default();
        assert_eq!(config.rtol, 1e-5);
        assert_eq!(config.atol, 1e-8);
        assert_eq!(config.max_listed, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config: CompareConfig = serde_yaml::from_str("rtol: 0.001\n").unwrap();
        assert_eq!(config.rtol, 1e-3);
        assert_eq!(config.atol, DEFAULT_ATOL);
    }

    #[test]
    fn test_validate_rejects_bad_tolerances() {
        let config = CompareConfig {
            atol: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompareConfig {
            rtol: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.yaml");
        std::fs::write(&path, "atol: 0.5\nmax_listed: 3\n").unwrap();

        let config = CompareConfig::from_yaml(&path).unwrap();
        assert_eq!(config.atol, 0.5);
        assert_eq!(config.max_listed, 3);
        assert_eq!(config.rtol, DEFAULT_RTOL);
    }
}
