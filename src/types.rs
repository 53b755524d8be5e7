//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including states, transitions, execution results, snapshots and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The blank symbol stored in tape cells.
pub const DEFAULT_BLANK_SYMBOL: char = ' ';
/// A special symbol used in descriptions and tape inputs to represent the blank symbol,
/// since whitespace delimits fields in a description.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The reserved write symbol meaning "leave the tape cell unchanged". It is never a tape
/// symbol: no transition reads or writes it, so a tape cell holding it blocks the machine.
pub const NO_WRITE_SYMBOL: char = '\\';
/// The maximum number of visible characters in a state name. Longer names are truncated.
pub const MAX_STATE_NAME_LEN: usize = 14;
/// The default maximum number of steps a run may take before it is aborted.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Identifies a state within its machine. The id is the state's insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents the possible directions the tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left (clamped at the first cell).
    Left,
    /// Move the head one position to the right.
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// Whether a state ends a run, and with which verdict.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    #[default]
    Normal,
    Accept,
    Reject,
}

/// The policy applied when the current state has no transition for the symbol under the head.
///
/// - `Strict` (default): the run fails with [`TuringMachineError::Blocked`].
/// - `ImplicitReject`: the machine enters the first declared rejecting state instead.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Strict,
    ImplicitReject,
}

/// A single transition rule, owned by its source state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state that owns this transition. Only used for diagnostics.
    pub source: StateId,
    /// The symbol that must be under the head for this transition to fire.
    pub input: char,
    /// The symbol written to the tape, or `None` to leave the cell unchanged.
    pub write: Option<char>,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine enters.
    pub target: StateId,
}

/// A named node of the machine together with its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    name: String,
    kind: StateKind,
    transitions: Vec<Transition>,
}

impl State {
    /// Creates a state without transitions. The name is truncated to [`MAX_STATE_NAME_LEN`]
    /// characters.
    pub fn new(name: &str, kind: StateKind) -> Self {
        Self {
            name: truncate_name(name),
            kind,
            transitions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn is_accepting(&self) -> bool {
        self.kind == StateKind::Accept
    }

    pub fn is_rejecting(&self) -> bool {
        self.kind == StateKind::Reject
    }

    /// Returns `true` if entering this state ends a run.
    pub fn is_terminal(&self) -> bool {
        self.kind != StateKind::Normal
    }

    /// The outgoing transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Finds the first transition reading `symbol`.
    pub fn transition_for(&self, symbol: char) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.input == symbol)
    }

    pub(crate) fn push_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }
}

/// Truncates a state name to [`MAX_STATE_NAME_LEN`] characters.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_STATE_NAME_LEN).collect()
}

/// The verdict of a finished run, carrying the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Accepted(StateId),
    Rejected(StateId),
}

impl Outcome {
    pub fn state(&self) -> StateId {
        match self {
            Outcome::Accepted(id) | Outcome::Rejected(id) => *id,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }
}

/// A view of the tape, the head and the current state taken between two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tape: String,
    pub head: usize,
    pub state: String,
    pub step: usize,
}

impl fmt::Display for Snapshot {
    /// Prints the cells before the head, the current state name, then the remaining cells.
    ///
    /// ```text
    ///  x q3 0
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let split = self
            .tape
            .char_indices()
            .nth(self.head)
            .map_or(self.tape.len(), |(i, _)| i);
        let (before, after) = self.tape.split_at(split);

        write!(f, "{} {} {}", before, self.state, after)
    }
}

/// Builds a tape from an input string. `INPUT_BLANK_SYMBOL`s become blanks and the tape
/// is truncated or padded with blanks to `length` cells. Other characters are copied
/// as-is, so callers reject `NO_WRITE_SYMBOL` themselves.
pub fn tape_from_str(input: &str, length: usize) -> Vec<char> {
    let mut tape: Vec<char> = input
        .chars()
        .map(|c| {
            if c == INPUT_BLANK_SYMBOL {
                DEFAULT_BLANK_SYMBOL
            } else {
                c
            }
        })
        .take(length)
        .collect();

    tape.resize(length, DEFAULT_BLANK_SYMBOL);
    tape
}

pub fn tape_to_string(tape: &[char]) -> String {
    tape.iter().collect()
}

/// The reason a description line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseReason {
    #[error("expected a state count")]
    StateCount,
    #[error("invalid state syntax, expected `<name> [A|R]`")]
    StateSyntax,
    #[error("expected {expected} states, found {found}")]
    MissingStates { expected: usize, found: usize },
    #[error("duplicate state name '{0}'")]
    DuplicateStateName(String),
    #[error("invalid transition syntax, expected `<state> <input> -> <state> <write> <L|R>`")]
    TransitionSyntax,
    #[error("unknown state name '{0}'")]
    UnknownStateName(String),
    #[error("bad direction '{0}', expected L or R")]
    BadDirection(String),
}

/// The kind of limit reported by [`TuringMachineError::CapacityExceeded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    States,
    Transitions,
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::States => write!(f, "states"),
            Capacity::Transitions => write!(f, "transitions per state"),
        }
    }
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a malformed machine description.
    #[error("Parse error on line {line}: {reason}")]
    ParseError { line: usize, reason: ParseReason },
    /// Indicates that a configured state or transition limit was hit.
    #[error("Capacity exceeded: at most {limit} {kind} allowed")]
    CapacityExceeded { kind: Capacity, limit: usize },
    /// Indicates that no transition matches the symbol under the head.
    #[error("Machine blocked: state {state} has no transition for input {symbol:?}")]
    Blocked { state: String, symbol: char },
    /// Indicates that the head would move past the right edge of the tape.
    #[error("Machine walked off the tape on the right side (head {head}, tape length {len})")]
    OutOfTape { head: usize, len: usize },
    /// Indicates that the machine has no states or no start state was set.
    #[error("Machine has no start state")]
    NoStartState,
    /// Indicates that a run took the maximum number of steps without reaching a verdict.
    #[error("No verdict after {0} steps")]
    StepLimitExceeded(usize),
    /// Indicates a reference to a state id that does not belong to the machine.
    #[error("Invalid state: {0}")]
    InvalidState(usize),
    /// Indicates an error during the validation of a machine's structure.
    #[error("Machine validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations or configuration files.
    #[error("File error: {0}")]
    FileError(String),
}

impl TuringMachineError {
    pub(crate) fn parse(line: usize, reason: ParseReason) -> Self {
        TuringMachineError::ParseError { line, reason }
    }
}
