//! Calculator configuration, usually `calculator.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEFINITION_FILE: &str = "definition.json";
pub const DEFAULT_FUNCTION_FILE: &str = "function.toml";
pub const DEFAULT_TEST_FILE: &str = "tests.json";

/// Calculator configuration (TOML).
///
/// Missing fields default to the conventional catalog layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Directory holding one subdirectory per algorithm.
    pub catalog_root: PathBuf,

    /// File name of each plugin's definition source.
    pub definition_file: String,

    /// File name of each plugin's function manifest.
    pub function_file: String,

    /// File name of each plugin's self-test fixtures.
    pub test_file: String,

    /// Per-call wall-clock budget in milliseconds.
    pub execute_timeout_ms: u64,

    /// Truncate worker stdout/stderr beyond this many bytes.
    pub worker_output_limit_bytes: usize,

    /// Executable serving worker jobs. Defaults to the running executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_program: Option<PathBuf>,

    /// Per-algorithm budget overrides in milliseconds, keyed by definition name.
    pub timeouts: BTreeMap<String, u64>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from("catalog"),
            definition_file: DEFAULT_DEFINITION_FILE.to_string(),
            function_file: DEFAULT_FUNCTION_FILE.to_string(),
            test_file: DEFAULT_TEST_FILE.to_string(),
            execute_timeout_ms: 10_000,
            worker_output_limit_bytes: 1_000_000,
            worker_program: None,
            timeouts: BTreeMap::new(),
        }
    }
}

impl CalculatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.execute_timeout_ms == 0 {
            return Err(anyhow!("execute_timeout_ms must be > 0"));
        }
        if self.worker_output_limit_bytes == 0 {
            return Err(anyhow!("worker_output_limit_bytes must be > 0"));
        }
        if let Some((name, _)) = self.timeouts.iter().find(|(_, ms)| **ms == 0) {
            return Err(anyhow!("timeouts.{name} must be > 0"));
        }
        let files = [
            ("definition_file", &self.definition_file),
            ("function_file", &self.function_file),
            ("test_file", &self.test_file),
        ];
        for (field, value) in files {
            if value.trim().is_empty() {
                return Err(anyhow!("{field} must be a non-empty file name"));
            }
        }
        if self.definition_file == self.function_file
            || self.definition_file == self.test_file
            || self.function_file == self.test_file
        {
            return Err(anyhow!(
                "definition_file, function_file and test_file must be distinct"
            ));
        }
        Ok(())
    }

    /// Budget for the algorithm declared as `name`.
    pub fn timeout_for(&self, name: &str) -> Duration {
        let ms = self
            .timeouts
            .get(name)
            .copied()
            .unwrap_or(self.execute_timeout_ms);
        Duration::from_millis(ms)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CalculatorConfig::default()`.
pub fn load_config(path: &Path) -> Result<CalculatorConfig> {
    if !path.exists() {
        let cfg = CalculatorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CalculatorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, CalculatorConfig::default());
    }

    #[test]
    fn load_reads_overrides() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("calculator.toml");
        fs::write(
            &path,
            "catalog_root = \"algorithms\"\nexecute_timeout_ms = 500\n\n[timeouts]\nprime_count = 2000\n",
        )
        .expect("write config");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.catalog_root, PathBuf::from("algorithms"));
        assert_eq!(cfg.definition_file, DEFAULT_DEFINITION_FILE);
        assert_eq!(cfg.timeout_for("prime_count"), Duration::from_secs(2));
        assert_eq!(cfg.timeout_for("matrix_sub"), Duration::from_millis(500));
    }

    #[test]
    fn serialized_default_loads_back() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("calculator.toml");
        let mut cfg = CalculatorConfig::default();
        cfg.timeouts.insert("prime_count".to_string(), 250);
        fs::write(&path, toml::to_string_pretty(&cfg).expect("serialize")).expect("write");
        assert_eq!(load_config(&path).expect("load"), cfg);
    }

    #[test]
    fn rejects_zero_timeouts() {
        let cfg = CalculatorConfig {
            execute_timeout_ms: 0,
            ..CalculatorConfig::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = CalculatorConfig::default();
        cfg.timeouts.insert("slow".to_string(), 0);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts.slow"));
    }

    #[test]
    fn rejects_colliding_file_names() {
        let cfg = CalculatorConfig {
            test_file: DEFAULT_DEFINITION_FILE.to_string(),
            ..CalculatorConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must be distinct"));
    }
}
