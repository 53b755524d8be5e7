mod cli;

use clap::Parser;
use cli::{Cli, Format};
use serde_json::json;
use std::error::Error;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use turing::{
    analyze, parser::parse_machine_with_limits, parser::parse_with_limits, tape_from_str,
    tape_to_string, types::NO_WRITE_SYMBOL, Config, Machine, Outcome, ProgramLoader,
    ProgramManager, Snapshot,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with snapshots on stdout
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let result = if cli.list {
        list_programs().map(|()| None)
    } else {
        run(&cli).map(Some)
    };

    match result {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(Outcome::Accepted(_))) => ExitCode::SUCCESS,
        Ok(Some(Outcome::Rejected(_))) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Prints one line per built-in machine.
fn list_programs() -> Result<(), Box<dyn Error>> {
    for index in 0..ProgramManager::get_program_count() {
        let info = ProgramManager::get_program_info(index)?;
        println!(
            "{:<14} {} states, {} transitions, sample tape {:?}",
            info.name, info.state_count, info.transition_count, info.sample_tape
        );
    }
    Ok(())
}

/// Loads the machine and its tape, then runs it to a verdict while printing snapshots.
fn run(cli: &Cli) -> Result<Outcome, Box<dyn Error>> {
    let config = cli.config()?;
    let (mut machine, sample_tape) = load_machine(cli, &config)?;
    machine.set_mode(config.mode);

    match analyze(&machine) {
        Ok(()) => {}
        Err(e) if cli.check => return Err(e.into()),
        Err(e) => tracing::warn!("{}", e),
    }

    let input = cli
        .input
        .as_deref()
        .or(sample_tape)
        .ok_or("No input tape given, use --input")?;
    if input.contains(NO_WRITE_SYMBOL) {
        return Err(format!("{:?} is not a tape symbol", NO_WRITE_SYMBOL).into());
    }
    let length = cli.length.unwrap_or_else(|| input.chars().count());
    let mut tape = tape_from_str(input, length);

    if cli.format == Format::Text {
        println!("> Starting simulation...\n");
    }
    if config.snapshots {
        print_snapshot(cli.format, &machine.snapshot(&tape))?;
    }

    let mut printed = Ok(());
    let outcome = machine.run_with(&mut tape, &config.run_config(), |snapshot| {
        if printed.is_ok() {
            printed = print_snapshot(cli.format, snapshot);
        }
    })?;
    printed?;

    print_outcome(cli.format, &machine, &outcome, &tape)?;
    Ok(outcome)
}

/// Loads the machine from a file, a built-in program or stdin, in that order.
///
/// Built-in programs also provide a sample tape.
fn load_machine(
    cli: &Cli,
    config: &Config,
) -> Result<(Machine, Option<&'static str>), Box<dyn Error>> {
    let limits = config.limits();

    if let Some(path) = &cli.program {
        if cli.format == Format::Text {
            println!("> Parsing file {} ...\n", path.display());
        }
        Ok((ProgramLoader::load_program_with_limits(path, limits)?, None))
    } else if let Some(name) = &cli.builtin {
        let program = ProgramManager::get_program_by_name(name)?;
        let machine = parse_with_limits(program.source, limits)?;
        Ok((machine, Some(program.sample_tape)))
    } else if atty::isnt(atty::Stream::Stdin) {
        let machine = parse_machine_with_limits(io::stdin().lock(), limits)?;
        Ok((machine, None))
    } else {
        Err("No machine given, use --program, --builtin or pipe a description to stdin".into())
    }
}

fn print_snapshot(format: Format, snapshot: &Snapshot) -> Result<(), serde_json::Error> {
    match format {
        Format::Text => println!("{}", snapshot),
        Format::Json => println!("{}", serde_json::to_string(snapshot)?),
    }
    Ok(())
}

fn print_outcome(
    format: Format,
    machine: &Machine,
    outcome: &Outcome,
    tape: &[char],
) -> Result<(), serde_json::Error> {
    let state = machine
        .state(outcome.state())
        .map(|state| state.name())
        .unwrap_or_default();
    let verdict = if outcome.is_accepted() {
        "accepted"
    } else {
        "rejected"
    };

    match format {
        Format::Text => {
            println!("\n> Done!\n\n> Input {} in state: {}", verdict, state);
            println!("> Final tape: {}", tape_to_string(tape));
        }
        Format::Json => {
            let value = json!({
                "outcome": verdict,
                "state": state,
                "tape": tape_to_string(tape),
                "steps": machine.step_count(),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
