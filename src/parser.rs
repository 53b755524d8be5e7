//! This module provides the parser for machine descriptions, utilizing the `pest` crate.
//!
//! A description is line oriented: a state count, that many state declarations, then
//! transition declarations until the end of input. Each line is matched against the
//! grammar in `grammar.pest` and the transitions are resolved by name against the states
//! declared before them.

use crate::{
    config::Limits,
    machine::Machine,
    types::{
        truncate_name, Direction, ParseReason, State, StateId, StateKind, Transition,
        TuringMachineError, DEFAULT_BLANK_SYMBOL, INPUT_BLANK_SYMBOL, NO_WRITE_SYMBOL,
    },
};
use pest::{iterators::Pairs, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::io::BufRead;
use tracing::{debug, info};

/// Derives a `PestParser` for the description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given description string into a `Machine`.
///
/// Leading and trailing whitespace of the whole input is ignored.
pub fn parse(input: &str) -> Result<Machine, TuringMachineError> {
    parse_machine(input.trim().as_bytes())
}

/// Like [`parse`], but the machine refuses to grow beyond `limits`.
pub fn parse_with_limits(input: &str, limits: Limits) -> Result<Machine, TuringMachineError> {
    parse_machine_with_limits(input.trim().as_bytes(), limits)
}

/// Reads a description from `reader` and builds a fully linked `Machine`.
///
/// # Returns
///
/// * `Ok(Machine)` with its first declared state as start and current state.
/// * `Err(TuringMachineError::ParseError)` if any line is malformed.
/// * `Err(TuringMachineError::NoStartState)` if the description declares no states.
/// * `Err(TuringMachineError::CapacityExceeded)` if the machine has limits and exceeds them.
pub fn parse_machine<R: BufRead>(reader: R) -> Result<Machine, TuringMachineError> {
    parse_machine_with_limits(reader, Limits::default())
}

pub fn parse_machine_with_limits<R: BufRead>(
    reader: R,
    limits: Limits,
) -> Result<Machine, TuringMachineError> {
    let mut parser = DescriptionParser::new(reader);
    let mut machine = Machine::with_limits(limits);

    let expected = parser.parse_state_count()?;
    for found in 0..expected {
        let (line, state) = parser.parse_state()?.ok_or(TuringMachineError::ParseError {
            line: parser.line(),
            reason: ParseReason::MissingStates { expected, found },
        })?;

        if machine.find_state(state.name()).is_some() {
            return Err(TuringMachineError::parse(
                line,
                ParseReason::DuplicateStateName(state.name().to_string()),
            ));
        }

        machine.add_state(state)?;
    }

    while parser.parse_transition(&mut machine)?.is_some() {}

    if machine.states().is_empty() {
        return Err(TuringMachineError::NoStartState);
    }
    machine.set_start(StateId(0))?;

    info!(
        states = machine.states().len(),
        transitions = machine.transition_count(),
        "parsed machine"
    );

    Ok(machine)
}

/// Reads a description line by line, keeping track of the line number for errors.
pub struct DescriptionParser<R> {
    reader: R,
    line: usize,
    buffer: String,
}

impl<R: BufRead> DescriptionParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
        }
    }

    /// The number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Parses the first line, the number of states that follow.
    pub fn parse_state_count(&mut self) -> Result<usize, TuringMachineError> {
        let (line, text) = self
            .next_line()?
            .ok_or(TuringMachineError::parse(1, ParseReason::StateCount))?;

        parse_state_count(text).map_err(|reason| TuringMachineError::parse(line, reason))
    }

    /// Parses the next line as a state declaration.
    ///
    /// Returns `Ok(None)` at the end of input, otherwise the parsed state with its line number.
    pub fn parse_state(&mut self) -> Result<Option<(usize, State)>, TuringMachineError> {
        match self.next_line()? {
            Some((line, text)) => parse_state(text)
                .map(|state| Some((line, state)))
                .map_err(|reason| TuringMachineError::parse(line, reason)),
            None => Ok(None),
        }
    }

    /// Parses the next non-blank line as a transition and attaches it to its source state.
    ///
    /// Returns `Ok(None)` once the input is exhausted. A failed line leaves `machine`
    /// unchanged.
    pub fn parse_transition(
        &mut self,
        machine: &mut Machine,
    ) -> Result<Option<Transition>, TuringMachineError> {
        loop {
            let Some((line, text)) = self.next_line()? else {
                return Ok(None);
            };

            if text.trim().is_empty() {
                continue;
            }

            let parsed = parse_transition(text, machine)
                .map_err(|reason| TuringMachineError::parse(line, reason))?;

            let transition = machine.add_transition(
                parsed.source,
                parsed.input,
                parsed.write,
                parsed.direction,
                parsed.target,
            )?;

            return Ok(Some(transition));
        }
    }

    /// Reads the next line without its line terminator.
    fn next_line(&mut self) -> Result<Option<(usize, &str)>, TuringMachineError> {
        self.buffer.clear();

        let read = self.reader.read_line(&mut self.buffer).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read line {}: {}", self.line + 1, e))
        })?;

        if read == 0 {
            return Ok(None);
        }

        self.line += 1;
        Ok(Some((self.line, self.buffer.trim_end_matches(['\r', '\n']))))
    }
}

/// A transition line with both state names resolved, ready to be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTransition {
    pub source: StateId,
    pub input: char,
    pub write: Option<char>,
    pub direction: Direction,
    pub target: StateId,
}

/// Parses a state count line such as `7`.
pub fn parse_state_count(line: &str) -> Result<usize, ParseReason> {
    let mut pairs = parse_line(Rule::state_count, line, ParseReason::StateCount)?;

    next_str(&mut pairs, ParseReason::StateCount)?
        .parse()
        .map_err(|_| ParseReason::StateCount)
}

/// Parses a state declaration such as `qaccept A`.
///
/// The name is truncated to `MAX_STATE_NAME_LEN` characters. The first character of the
/// optional mode selects the kind: `A` accepts, `R` rejects, anything else is a normal state.
pub fn parse_state(line: &str) -> Result<State, ParseReason> {
    let mut pairs = parse_line(Rule::state_decl, line, ParseReason::StateSyntax)?;
    let name = next_str(&mut pairs, ParseReason::StateSyntax)?;

    let kind = match pairs.next() {
        Some(mode) if mode.as_rule() == Rule::mode => match mode.as_str().chars().next() {
            Some('A') => StateKind::Accept,
            Some('R') => StateKind::Reject,
            _ => StateKind::Normal,
        },
        _ => StateKind::Normal,
    };

    Ok(State::new(name, kind))
}

/// Parses a transition declaration such as `q1 0 -> q2 x R` against the states of `machine`.
///
/// Nothing is attached to the machine; see [`DescriptionParser::parse_transition`].
pub fn parse_transition(line: &str, machine: &Machine) -> Result<ParsedTransition, ParseReason> {
    let mut pairs = parse_line(Rule::transition_decl, line, ParseReason::TransitionSyntax)?;

    let source = next_str(&mut pairs, ParseReason::TransitionSyntax)?;
    let input = parse_input(next_str(&mut pairs, ParseReason::TransitionSyntax)?)?;
    let target = next_str(&mut pairs, ParseReason::TransitionSyntax)?;
    let write = parse_write(next_str(&mut pairs, ParseReason::TransitionSyntax)?);
    let direction = next_str(&mut pairs, ParseReason::TransitionSyntax)?;

    let source = resolve_state(machine, source)?;
    let target = resolve_state(machine, target)?;
    let direction = parse_direction(direction)?;

    Ok(ParsedTransition {
        source,
        input,
        write,
        direction,
        target,
    })
}

/// Matches a whole line against `rule` and returns the rule's inner pairs.
fn parse_line(rule: Rule, line: &str, reason: ParseReason) -> Result<Pairs<'_, Rule>, ParseReason> {
    let mut pairs = TuringMachineParser::parse(rule, line).map_err(|e| {
        debug!(line, error = %e, "line does not match {:?}", rule);
        reason.clone()
    })?;

    pairs.next().map(|pair| pair.into_inner()).ok_or(reason)
}

/// Extracts the string content of the next pair.
fn next_str<'i>(pairs: &mut Pairs<'i, Rule>, reason: ParseReason) -> Result<&'i str, ParseReason> {
    pairs.next().map(|pair| pair.as_str()).ok_or(reason)
}

/// Looks up a declared state by its (truncated) name.
fn resolve_state(machine: &Machine, name: &str) -> Result<StateId, ParseReason> {
    machine
        .find_state(&truncate_name(name))
        .ok_or_else(|| ParseReason::UnknownStateName(name.to_string()))
}

/// Parses a single symbol, mapping `INPUT_BLANK_SYMBOL` to the blank tape cell.
fn parse_symbol(input: &str) -> char {
    match input.chars().next() {
        Some(INPUT_BLANK_SYMBOL) | None => DEFAULT_BLANK_SYMBOL,
        Some(c) => c,
    }
}

/// Parses the symbol a transition reads. `NO_WRITE_SYMBOL` is not a tape symbol.
fn parse_input(input: &str) -> Result<char, ParseReason> {
    match parse_symbol(input) {
        NO_WRITE_SYMBOL => Err(ParseReason::TransitionSyntax),
        symbol => Ok(symbol),
    }
}

/// Parses a write symbol. `NO_WRITE_SYMBOL` means the cell is left unchanged.
fn parse_write(input: &str) -> Option<char> {
    match input.chars().next() {
        Some(NO_WRITE_SYMBOL) => None,
        _ => Some(parse_symbol(input)),
    }
}

/// Parses a head move. Only `L` and `R` are supported.
fn parse_direction(input: &str) -> Result<Direction, ParseReason> {
    match input {
        "L" => Ok(Direction::Left),
        "R" => Ok(Direction::Right),
        _ => Err(ParseReason::BadDirection(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    const POWER_OF_TWO: &str = include_str!("../machines/power-of-two.tm");

    #[test]
    fn test_parse_simple_machine() {
        let input = r#"
3
start
done A
fail R
start 0 -> done x R
start 1 -> fail \ L
"#;

        let result = parse(input);
        assert!(result.is_ok());

        let machine = result.unwrap();
        assert_eq!(machine.states().len(), 3);
        assert_eq!(machine.current().unwrap().name(), "start");
        assert!(machine.states()[1].is_accepting());
        assert!(machine.states()[2].is_rejecting());

        let transitions = machine.states()[0].transitions();
        assert_eq!(
            transitions[0],
            Transition {
                source: StateId(0),
                input: '0',
                write: Some('x'),
                direction: Direction::Right,
                target: StateId(1),
            }
        );
        assert_eq!(transitions[1].write, None);
        assert_eq!(transitions[1].direction, Direction::Left);
    }

    #[test]
    fn test_parse_reference_machine() {
        let machine = parse(POWER_OF_TWO).unwrap();

        let names: Vec<&str> = machine.states().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["q1", "q2", "q3", "q4", "q5", "qaccept", "qreject"]
        );
        assert_eq!(machine.transition_count(), 15);
        assert_eq!(machine.states()[0].transitions().len(), 3);
    }

    #[test]
    fn test_transitions_attach_to_their_source() {
        let machine = parse("2\na\nb A\nb 0 -> a \\ L\n").unwrap();

        assert!(machine.states()[0].transitions().is_empty());
        assert_eq!(machine.states()[1].transitions()[0].source, StateId(1));
        assert_eq!(machine.states()[1].transitions()[0].target, StateId(0));
    }

    #[test]
    fn test_blank_symbol_in_description() {
        let machine = parse("2\nq\nh A\nq _ -> h _ R\n").unwrap();
        let transition = machine.states()[0].transitions()[0];

        assert_eq!(transition.input, DEFAULT_BLANK_SYMBOL);
        assert_eq!(transition.write, Some(DEFAULT_BLANK_SYMBOL));
    }

    #[test]
    fn test_parse_zero_states() {
        assert_eq!(parse("0"), Err(TuringMachineError::NoStartState));
        assert_eq!(parse("0\n\n"), Err(TuringMachineError::NoStartState));
    }

    #[test]
    fn test_parse_missing_state_count() {
        let error = parse("states\nq1\n").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ParseError {
                line: 1,
                reason: ParseReason::StateCount
            }
        );
        assert_eq!(
            parse(""),
            Err(TuringMachineError::ParseError {
                line: 1,
                reason: ParseReason::StateCount
            })
        );
        assert!(matches!(
            parse("-1"),
            Err(TuringMachineError::ParseError {
                reason: ParseReason::StateCount,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_missing_states() {
        let error = parse("3\nq1\nq2").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ParseError {
                line: 3,
                reason: ParseReason::MissingStates {
                    expected: 3,
                    found: 2
                }
            }
        );
    }

    #[test]
    fn test_parse_blank_state_line() {
        let error = parse("2\nq1\n\nq1 0 -> q1 \\ R").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ParseError {
                line: 3,
                reason: ParseReason::StateSyntax
            }
        );
    }

    #[test]
    fn test_parse_duplicate_state_name() {
        let error = parse("2\nq1\nq1 A\n").unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError { .. }));
        assert!(error.to_string().contains("duplicate state name 'q1'"));
    }

    #[test]
    fn test_duplicate_after_truncation() {
        let error = parse("2\nabcdefghijklmnX\nabcdefghijklmnY\n").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ParseError {
                line: 3,
                reason: ParseReason::DuplicateStateName("abcdefghijklmn".to_string())
            }
        );
    }

    #[test]
    fn test_long_names_resolve_after_truncation() {
        let machine =
            parse("2\nabcdefghijklmnopq\nend A\nabcdefghijklmnopq 0 -> end \\ R\n").unwrap();

        assert_eq!(machine.states()[0].name(), "abcdefghijklmn");
        assert_eq!(machine.states()[0].transitions().len(), 1);
    }

    #[test]
    fn test_parse_unknown_state_name() {
        let error = parse("2\nq1\nq9 A\nq1 0 -> q2 x R\n").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ParseError {
                line: 4,
                reason: ParseReason::UnknownStateName("q2".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_state_name_leaves_transitions_unchanged() {
        let mut machine = parse("2\nq1\nq9 A\nq1 1 -> q9 \\ R\n").unwrap();
        let mut parser = DescriptionParser::new("q1 0 -> q2 x R\n".as_bytes());

        let result = parser.parse_transition(&mut machine);

        assert!(matches!(
            result,
            Err(TuringMachineError::ParseError {
                line: 1,
                reason: ParseReason::UnknownStateName(_)
            })
        ));
        assert_eq!(machine.states()[0].transitions().len(), 1);
    }

    #[test]
    fn test_parse_bad_direction() {
        let error = parse("1\nq\nq 0 -> q x X\n").unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ParseError {
                line: 3,
                reason: ParseReason::BadDirection("X".to_string())
            }
        );
    }

    #[test]
    fn test_parse_transition_syntax() {
        for line in ["q 0 q x R", "q 00 -> q x R", "q 0 -> q x", "q 0 -> q x R extra"] {
            let input = format!("1\nq\n{line}\n");
            assert_eq!(
                parse(&input),
                Err(TuringMachineError::ParseError {
                    line: 3,
                    reason: ParseReason::TransitionSyntax
                }),
                "line {line:?} should not parse"
            );
        }
    }

    #[test]
    fn test_no_write_symbol_is_not_an_input() {
        assert_eq!(
            parse("1\nq A\nq \\ -> q 0 R\n"),
            Err(TuringMachineError::ParseError {
                line: 3,
                reason: ParseReason::TransitionSyntax
            })
        );
    }

    #[test]
    fn test_blank_lines_between_transitions_are_skipped() {
        let machine = parse("1\nq A\nq 0 -> q \\ R\n\n   \nq 1 -> q \\ L\n").unwrap();
        assert_eq!(machine.transition_count(), 2);
    }

    #[test]
    fn test_state_modes() {
        assert_eq!(parse_state("q").unwrap().kind(), StateKind::Normal);
        assert_eq!(parse_state("q A").unwrap().kind(), StateKind::Accept);
        assert_eq!(parse_state("q Accept").unwrap().kind(), StateKind::Accept);
        assert_eq!(parse_state("  q\tR ").unwrap().kind(), StateKind::Reject);
        assert_eq!(parse_state("q x").unwrap().kind(), StateKind::Normal);
        assert_eq!(parse_state(""), Err(ParseReason::StateSyntax));
        assert_eq!(parse_state("q A extra"), Err(ParseReason::StateSyntax));
    }

    #[test]
    fn test_state_count_line() {
        assert_eq!(parse_state_count(" 12 "), Ok(12));
        assert_eq!(parse_state_count("1 2"), Err(ParseReason::StateCount));
        assert_eq!(
            parse_state_count("99999999999999999999999999"),
            Err(ParseReason::StateCount)
        );
    }

    #[test]
    fn test_windows_line_endings() {
        let machine = parse("2\r\nq1\r\nq2 A\r\nq1 0 -> q2 \\ R\r\n").unwrap();
        assert_eq!(machine.states()[1].name(), "q2");
        assert!(machine.states()[1].is_accepting());
    }

    #[test]
    fn test_parse_with_limits() {
        let limits = Limits {
            max_states: Some(2),
            max_transitions: None,
        };
        let error = parse_with_limits("3\na\nb\nc\n", limits).unwrap_err();
        assert!(matches!(
            error,
            TuringMachineError::CapacityExceeded { limit: 2, .. }
        ));

        let limits = Limits {
            max_states: None,
            max_transitions: Some(1),
        };
        let error = parse_with_limits("1\na\na 0 -> a \\ R\na 1 -> a \\ R\n", limits).unwrap_err();
        assert!(matches!(
            error,
            TuringMachineError::CapacityExceeded { limit: 1, .. }
        ));
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse(POWER_OF_TWO).unwrap(), parse(POWER_OF_TWO).unwrap());
    }

    #[test]
    fn test_parsed_machine_runs() {
        let mut machine = parse(POWER_OF_TWO).unwrap();
        let mut tape = crate::types::tape_from_str("00__", 4);

        let outcome = machine.run(&mut tape).unwrap();
        assert!(matches!(outcome, Outcome::Accepted(_)));
    }
}
