//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! descriptions from various sources, including files, strings and directories.

use crate::config::Limits;
use crate::machine::Machine;
use crate::parser::{parse, parse_machine_with_limits};
use crate::types::TuringMachineError;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The file extension of machine descriptions.
pub const DESCRIPTION_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine descriptions.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single machine from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be opened or read.
    /// * `Err(TuringMachineError::ParseError)` if the content is not a valid description.
    pub fn load_program(path: &Path) -> Result<Machine, TuringMachineError> {
        Self::load_program_with_limits(path, Limits::default())
    }

    /// Loads a single machine from a file, refusing to grow beyond `limits`.
    pub fn load_program_with_limits(
        path: &Path,
        limits: Limits,
    ) -> Result<Machine, TuringMachineError> {
        let file = File::open(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse_machine_with_limits(BufReader::new(file), limits)
    }

    /// Loads a single machine from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Machine, TuringMachineError> {
        parse(content)
    }

    /// Loads all machine descriptions (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// is either the path and its machine, or the error that occurred while loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Machine), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and files without the description extension
                if path.is_dir()
                    || path
                        .extension()
                        .is_none_or(|ext| ext != DESCRIPTION_EXTENSION)
                {
                    return None;
                }

                let result = Self::load_program(&path);
                if let Err(e) = &result {
                    warn!(path = %path.display(), error = %e, "failed to load description");
                }
                Some(result.map(|machine| (path, machine)))
            })
            .collect();

        // Directory order is platform dependent
        results.sort_by_key(|result| result.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}
