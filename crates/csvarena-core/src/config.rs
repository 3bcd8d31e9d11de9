use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::arena::REGION_DEFAULT_CAPACITY;
use crate::error::{CsvError, Result};

/// What to do with a data row whose field count differs from the header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaggedRowPolicy {
    /// Pad short rows with empty cells and drop surplus fields, with a warning
    #[default]
    Pad,
    /// Abort the parse
    Reject,
}

/// Parser options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    /// Ragged row handling (default: pad)
    #[serde(default)]
    pub ragged_rows: RaggedRowPolicy,

    /// Minimum size of each arena region in bytes (default: 8192)
    #[serde(default = "default_region_capacity")]
    pub region_capacity: usize,
}

fn default_region_capacity() -> usize {
    REGION_DEFAULT_CAPACITY
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ragged_rows: RaggedRowPolicy::Pad,
            region_capacity: REGION_DEFAULT_CAPACITY,
        }
    }
}

/// Values given on the command line, applied over a file configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ragged_rows: Option<RaggedRowPolicy>,
    pub region_capacity: Option<usize>,
}

impl ParserConfig {
    /// Load configuration from a YAML or JSON file (chosen by extension)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| CsvError::Config(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| CsvError::Config(e.to_string()))?
        };
        Ok(config)
    }

    /// Write the default configuration as YAML
    pub fn init_file(path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(&ParserConfig::default())
            .map_err(|e| CsvError::Config(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(policy) = overrides.ragged_rows {
            self.ragged_rows = policy;
        }
        if let Some(capacity) = overrides.region_capacity {
            self.region_capacity = capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.ragged_rows, RaggedRowPolicy::Pad);
        assert_eq!(config.region_capacity, 8192);
    }

    #[test]
    fn test_serialize_config() {
        let json = serde_json::to_string(&ParserConfig::default()).unwrap();
        assert!(json.contains("raggedRows"));
        assert!(json.contains("\"pad\""));
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let config: ParserConfig = serde_yaml::from_str("raggedRows: reject\n").unwrap();
        assert_eq!(config.ragged_rows, RaggedRowPolicy::Reject);
        assert_eq!(config.region_capacity, REGION_DEFAULT_CAPACITY);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"regionCapacity": 1024}}"#).unwrap();
        file.flush().unwrap();

        let config = ParserConfig::from_file(file.path()).unwrap();
        assert_eq!(config.region_capacity, 1024);
        assert_eq!(config.ragged_rows, RaggedRowPolicy::Pad);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(file, "raggedRows: sometimes").unwrap();
        file.flush().unwrap();

        let err = ParserConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CsvError::Config(_)));
    }

    #[test]
    fn test_init_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csvarena.yaml");
        ParserConfig::init_file(&path).unwrap();
        assert_eq!(ParserConfig::from_file(&path).unwrap(), ParserConfig::default());
    }

    #[test]
    fn test_merge_overrides() {
        let mut config = ParserConfig::default();
        config.merge(&ConfigOverrides {
            ragged_rows: Some(RaggedRowPolicy::Reject),
            region_capacity: None,
        });
        assert_eq!(config.ragged_rows, RaggedRowPolicy::Reject);
        assert_eq!(config.region_capacity, REGION_DEFAULT_CAPACITY);
    }
}
