//! Built-in machine descriptions embedded in the crate.

use crate::machine::Machine;
use crate::parser::parse;
use crate::types::TuringMachineError;
use tracing::warn;

/// A built-in description together with a tape it can be run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: &'static str,
    pub source: &'static str,
    /// A sample input. `_` stands for a blank cell.
    pub sample_tape: &'static str,
}

impl Program {
    pub fn machine(&self) -> Result<Machine, TuringMachineError> {
        parse(self.source)
    }
}

/// Summary information about a built-in program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: String,
    pub sample_tape: String,
    pub state_count: usize,
    pub transition_count: usize,
}

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str, &str); 3] = [
    (
        "power-of-two",
        include_str!("../machines/power-of-two.tm"),
        "0000__",
    ),
    ("even-zeros", include_str!("../machines/even-zeros.tm"), "0000__"),
    ("flip-bits", include_str!("../machines/flip-bits.tm"), "0110__"),
];

lazy_static::lazy_static! {
    /// The built-in programs whose descriptions parse successfully.
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, source, sample_tape)| match parse(source) {
            Ok(_) => Some(Program { name, source, sample_tape }),
            Err(e) => {
                warn!(program = name, error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static Program, TuringMachineError> {
        PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<&'static Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!(
                    "Program '{}' not found, available: {}",
                    name,
                    Self::list_program_names().join(", ")
                ))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;
        let machine = program.machine()?;

        Ok(ProgramInfo {
            name: program.name.to_string(),
            sample_tape: program.sample_tape.to_string(),
            state_count: machine.states().len(),
            transition_count: machine.transition_count(),
        })
    }
}
