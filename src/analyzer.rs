//! This module provides functions for analyzing machines to detect common configuration
//! errors before execution: a missing start state, conflicting transitions, machines that
//! can never reach a verdict and states that can never be entered.

use crate::machine::Machine;
use crate::types::{StateId, TuringMachineError};
use std::collections::HashSet;

/// Represents various errors that can be found during the analysis of a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The machine has no start state.
    MissingStartState,
    /// A state has more than one transition for the same input symbol. Only the first one
    /// can ever fire.
    ConflictingTransitions { state: String, symbols: Vec<char> },
    /// No state is accepting or rejecting, so no run can end with a verdict.
    NoTerminalStates,
    /// States that cannot be reached from the start state.
    UnreachableStates(Vec<String>),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::MissingStartState => {
                TuringMachineError::ValidationError("Machine has no start state".to_string())
            }
            AnalysisError::ConflictingTransitions { state, symbols } => {
                TuringMachineError::ValidationError(format!(
                    "State {} has conflicting transitions for inputs {:?}",
                    state, symbols
                ))
            }
            AnalysisError::NoTerminalStates => TuringMachineError::ValidationError(
                "Machine has no accepting or rejecting state".to_string(),
            ),
            AnalysisError::UnreachableStates(states) => TuringMachineError::ValidationError(
                format!("Unreachable states detected: {:?}", states),
            ),
        }
    }
}

/// Analyzes a machine for structural and logical errors.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` describing the first failed check.
pub fn analyze(machine: &Machine) -> Result<(), TuringMachineError> {
    [
        check_start_state,
        check_conflicting_transitions,
        check_terminal_states,
        check_unreachable_states,
    ]
    .iter()
    .find_map(|check| check(machine).err())
    .map_or(Ok(()), |error| Err(error.into()))
}

fn check_start_state(machine: &Machine) -> Result<(), AnalysisError> {
    machine
        .start()
        .map(|_| ())
        .ok_or(AnalysisError::MissingStartState)
}

/// Checks that no state declares two transitions on the same input symbol.
fn check_conflicting_transitions(machine: &Machine) -> Result<(), AnalysisError> {
    for state in machine.states() {
        let mut seen = HashSet::new();
        let mut conflicts: Vec<char> = state
            .transitions()
            .iter()
            .filter(|t| !seen.insert(t.input))
            .map(|t| t.input)
            .collect();

        if !conflicts.is_empty() {
            conflicts.sort();
            conflicts.dedup();
            return Err(AnalysisError::ConflictingTransitions {
                state: state.name().to_string(),
                symbols: conflicts,
            });
        }
    }

    Ok(())
}

fn check_terminal_states(machine: &Machine) -> Result<(), AnalysisError> {
    if machine.states().iter().any(|state| state.is_terminal()) {
        Ok(())
    } else {
        Err(AnalysisError::NoTerminalStates)
    }
}

/// Checks for unreachable states with a depth-first traversal from the start state.
fn check_unreachable_states(machine: &Machine) -> Result<(), AnalysisError> {
    let Some(start) = machine.start() else {
        return Ok(());
    };

    let mut visited = HashSet::new();
    let mut queue = vec![start];

    while let Some(id) = queue.pop() {
        if !visited.insert(id) {
            continue;
        }

        if let Some(state) = machine.state(id) {
            queue.extend(
                state
                    .transitions()
                    .iter()
                    .map(|t| t.target)
                    .filter(|target| !visited.contains(target)),
            );
        }
    }

    let unreachable: Vec<String> = machine
        .states()
        .iter()
        .enumerate()
        .filter(|(i, _)| !visited.contains(&StateId(*i)))
        .map(|(_, state)| state.name().to_string())
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}
