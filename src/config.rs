//! Configuration for parsing and running machines.
//!
//! A [`Config`] can be built in code or loaded from JSON. Missing fields take their defaults:
//!
//! ```json
//! { "mode": "implicit-reject", "max_steps": 500, "snapshots": false }
//! ```

use crate::types::{Mode, TuringMachineError, MAX_EXECUTION_STEPS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Optional caps on the size of a machine. `None` means unbounded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_states: Option<usize>,
    /// Maximum number of outgoing transitions per state.
    pub max_transitions: Option<usize>,
}

/// Options for a single run of a machine. The default runs until a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Abort with `StepLimitExceeded` after this many steps. `None` runs until a verdict.
    pub max_steps: Option<usize>,
    /// Whether snapshots are handed to the observer after each non-terminal step.
    pub snapshots: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            snapshots: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub max_steps: Option<usize>,
    pub snapshots: bool,
    pub max_states: Option<usize>,
    pub max_transitions: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            max_steps: Some(MAX_EXECUTION_STEPS),
            snapshots: true,
            max_states: None,
            max_transitions: None,
        }
    }
}

impl Config {
    pub fn from_json_str(content: &str) -> Result<Self, TuringMachineError> {
        serde_json::from_str(content)
            .map_err(|e| TuringMachineError::FileError(format!("Invalid configuration: {}", e)))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&content)
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            max_steps: self.max_steps,
            snapshots: self.snapshots,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_states: self.max_states,
            max_transitions: self.max_transitions,
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
        let config = Config::default();

        assert_eq!(config.mode, Mode::Strict);
        assert_eq!(config.max_steps, Some(MAX_EXECUTION_STEPS));
        assert!(config.snapshots);
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn test_default_run_config_is_unbounded() {
        let run = RunConfig::default();

        assert_eq!(run.max_steps, None);
        assert!(run.snapshots);
        assert_eq!(
            Config::default().run_config().max_steps,
            Some(MAX_EXECUTION_STEPS)
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{ "mode": "implicit-reject", "max_steps": 50 }"#)
            .unwrap();

        assert_eq!(config.mode, Mode::ImplicitReject);
        assert_eq!(config.run_config().max_steps, Some(50));
        assert!(config.run_config().snapshots);
    }

    #[test]
    fn test_null_max_steps_disables_guard() {
        let config = Config::from_json_str(r#"{ "max_steps": null, "max_states": 3 }"#).unwrap();

        assert_eq!(config.max_steps, None);
        assert_eq!(config.limits().max_states, Some(3));
        assert_eq!(config.limits().max_transitions, None);
    }

    #[test]
    fn test_invalid_json() {
        let error = Config::from_json_str(r#"{ "mode": "lenient" }"#).unwrap_err();
        assert!(matches!(error, TuringMachineError::FileError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{ "snapshots": false }"#).unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert!(!config.snapshots);
        assert_eq!(config.mode, Mode::Strict);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_json_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }
}
