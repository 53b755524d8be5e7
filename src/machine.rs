//! This module defines the `Machine` struct, which simulates a single-tape deterministic
//! Turing Machine. It owns the states and their transitions, tracks the current state and
//! the head position, and executes steps against a caller-provided tape.

use crate::config::{Limits, RunConfig};
use crate::types::{
    tape_to_string, Capacity, Direction, Mode, Outcome, Snapshot, State, StateId, Transition,
    TuringMachineError, NO_WRITE_SYMBOL,
};
use tracing::{debug, info};

/// Represents a single-tape Turing Machine.
///
/// The tape itself is not owned by the machine: `step` and `run` operate on a mutable
/// slice so the caller decides its length and keeps it after the run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Machine {
    states: Vec<State>,
    start: Option<StateId>,
    current: Option<StateId>,
    head: usize,
    step_count: usize,
    mode: Mode,
    limits: Limits,
}

impl Machine {
    /// Creates an empty machine without size limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty machine that refuses to grow beyond `limits`.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Appends a state and returns its id.
    ///
    /// # Returns
    ///
    /// * `Ok(StateId)` - the insertion index of the new state.
    /// * `Err(TuringMachineError::CapacityExceeded)` if the state limit is reached.
    pub fn add_state(&mut self, state: State) -> Result<StateId, TuringMachineError> {
        if let Some(limit) = self.limits.max_states {
            if self.states.len() >= limit {
                return Err(TuringMachineError::CapacityExceeded {
                    kind: Capacity::States,
                    limit,
                });
            }
        }

        self.states.push(state);
        Ok(StateId(self.states.len() - 1))
    }

    /// Attaches a new transition to the `source` state.
    ///
    /// `write` of `None` leaves the tape cell unchanged when the transition fires.
    pub fn add_transition(
        &mut self,
        source: StateId,
        input: char,
        write: Option<char>,
        direction: Direction,
        target: StateId,
    ) -> Result<Transition, TuringMachineError> {
        if input == NO_WRITE_SYMBOL || write == Some(NO_WRITE_SYMBOL) {
            return Err(TuringMachineError::ValidationError(format!(
                "{:?} is reserved for transitions that do not write",
                NO_WRITE_SYMBOL
            )));
        }
        self.check_id(target)?;
        let limit = self.limits.max_transitions;
        let state = self
            .states
            .get_mut(source.index())
            .ok_or(TuringMachineError::InvalidState(source.index()))?;

        if let Some(limit) = limit {
            if state.transitions().len() >= limit {
                return Err(TuringMachineError::CapacityExceeded {
                    kind: Capacity::Transitions,
                    limit,
                });
            }
        }

        let transition = Transition {
            source,
            input,
            write,
            direction,
            target,
        };
        state.push_transition(transition);

        Ok(transition)
    }

    /// Marks `id` as the start state and makes it the current state.
    pub fn set_start(&mut self, id: StateId) -> Result<(), TuringMachineError> {
        self.check_id(id)?;
        self.start = Some(id);
        self.current = Some(id);
        Ok(())
    }

    /// Executes a single step against `tape`.
    ///
    /// The symbol under the head selects the first matching transition of the current state.
    /// Its write symbol (if any) is stored, the head moves and the target becomes the current
    /// state. A failed step leaves the tape, the head and the current state untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(StateId)` - the state the machine entered.
    /// * `Err(TuringMachineError::Blocked)` if no transition matches (in `Mode::Strict`).
    /// * `Err(TuringMachineError::OutOfTape)` if the head would leave the tape on the right.
    /// * `Err(TuringMachineError::NoStartState)` if no current state is set.
    pub fn step(&mut self, tape: &mut [char]) -> Result<StateId, TuringMachineError> {
        let current = self.current.ok_or(TuringMachineError::NoStartState)?;
        let symbol = *tape.get(self.head).ok_or(TuringMachineError::OutOfTape {
            head: self.head,
            len: tape.len(),
        })?;

        let Some(transition) = self.states[current.index()]
            .transition_for(symbol)
            .copied()
        else {
            return self.block(current, symbol);
        };

        let head = match transition.direction {
            Direction::Left => self.head.saturating_sub(1),
            Direction::Right if self.head + 1 >= tape.len() => {
                return Err(TuringMachineError::OutOfTape {
                    head: self.head,
                    len: tape.len(),
                })
            }
            Direction::Right => self.head + 1,
        };

        debug!(
            state = self.states[current.index()].name(),
            symbol = ?symbol,
            write = ?transition.write,
            direction = %transition.direction,
            next = self.states[transition.target.index()].name(),
            "step"
        );

        if let Some(write) = transition.write {
            tape[self.head] = write;
        }

        self.head = head;
        self.current = Some(transition.target);
        self.step_count += 1;

        Ok(transition.target)
    }

    /// Runs the machine until it reaches a verdict, without observing snapshots.
    pub fn run(&mut self, tape: &mut [char]) -> Result<Outcome, TuringMachineError> {
        self.run_with(tape, &RunConfig::default(), |_| {})
    }

    /// Runs the machine until it enters an accepting or rejecting state.
    ///
    /// After every non-terminal step `observer` receives a snapshot of the tape, unless
    /// `config.snapshots` is off. The run fails with `StepLimitExceeded` once
    /// `config.max_steps` steps were taken without a verdict.
    pub fn run_with<F>(
        &mut self,
        tape: &mut [char],
        config: &RunConfig,
        mut observer: F,
    ) -> Result<Outcome, TuringMachineError>
    where
        F: FnMut(&Snapshot),
    {
        if self.current.is_none() {
            return Err(TuringMachineError::NoStartState);
        }

        let mut steps = 0;
        loop {
            if config.max_steps.is_some_and(|max| steps >= max) {
                return Err(TuringMachineError::StepLimitExceeded(steps));
            }

            let id = self.step(tape)?;
            steps += 1;

            let state = &self.states[id.index()];
            if state.is_accepting() {
                info!(state = state.name(), steps, "input accepted");
                return Ok(Outcome::Accepted(id));
            }
            if state.is_rejecting() {
                info!(state = state.name(), steps, "input rejected");
                return Ok(Outcome::Rejected(id));
            }

            if config.snapshots {
                observer(&self.snapshot(tape));
            }
        }
    }

    /// Resets the machine to its start state with the head on the first cell.
    pub fn reset(&mut self) {
        self.current = self.start;
        self.head = 0;
        self.step_count = 0;
    }

    /// Captures the tape, head position and current state name.
    pub fn snapshot(&self, tape: &[char]) -> Snapshot {
        Snapshot {
            tape: tape_to_string(tape),
            head: self.head,
            state: self
                .current()
                .map(|state| state.name().to_string())
                .unwrap_or_default(),
            step: self.step_count,
        }
    }

    /// Returns the states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    /// Looks up a state by name. The first declared state with that name wins.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|state| state.name() == name)
            .map(StateId)
    }

    pub fn current(&self) -> Option<&State> {
        self.current.and_then(|id| self.state(id))
    }

    pub fn current_id(&self) -> Option<StateId> {
        self.current
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the total number of steps executed since creation or the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Returns the total number of transitions over all states.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions().len()).sum()
    }

    fn check_id(&self, id: StateId) -> Result<(), TuringMachineError> {
        if id.index() < self.states.len() {
            Ok(())
        } else {
            Err(TuringMachineError::InvalidState(id.index()))
        }
    }

    /// Handles a missing transition according to the machine's mode.
    fn block(&mut self, current: StateId, symbol: char) -> Result<StateId, TuringMachineError> {
        let blocked = || TuringMachineError::Blocked {
            state: self.states[current.index()].name().to_string(),
            symbol,
        };

        match self.mode {
            Mode::Strict => Err(blocked()),
            Mode::ImplicitReject => {
                let reject = self
                    .states
                    .iter()
                    .position(State::is_rejecting)
                    .map(StateId)
                    .ok_or_else(blocked)?;

                debug!(symbol = ?symbol, "no transition, rejecting implicitly");
                self.current = Some(reject);
                self.step_count += 1;
                Ok(reject)
            }
        }
    }
}
