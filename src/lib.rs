//! This crate provides the core logic for a single-tape deterministic Turing Machine simulator.
//! It includes modules for parsing machine descriptions, executing machines against a tape,
//! analyzing machines for configuration errors, and a few built-in example machines.

pub mod analyzer;
pub mod config;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the configuration types.
pub use config::{Config, Limits, RunConfig};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the parsing entry points from the parser module.
pub use parser::{parse, parse_machine, DescriptionParser};
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the machine model, execution results and error types from the types module.
pub use types::{
    tape_from_str, tape_to_string, Direction, Mode, Outcome, ParseReason, Snapshot, State,
    StateId, StateKind, Transition, TuringMachineError,
};
