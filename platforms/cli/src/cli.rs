//! Command-line argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use turing::{Config, Mode, TuringMachineError};

/// Output format for snapshots and the final verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Runs a single-tape Turing machine described in a text file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
  turing-cli -p machines/power-of-two.tm -i 0000__
  turing-cli -b even-zeros -i 00 -n 4 --silent
  cat machines/flip-bits.tm | turing-cli -i 0110__")]
pub struct Cli {
    /// The machine description file to execute.
    /// If neither a file nor a built-in is given, the description is read from stdin.
    #[arg(short, long, conflicts_with = "builtin")]
    pub program: Option<PathBuf>,

    /// Run a built-in machine (see --list)
    #[arg(short, long)]
    pub builtin: Option<String>,

    /// The initial tape contents, '_' marks a blank cell
    #[arg(short, long)]
    pub input: Option<String>,

    /// Tape length; the input is padded with blanks or truncated to fit
    #[arg(short = 'n', long)]
    pub length: Option<usize>,

    /// Do not print the tape after each step
    #[arg(short, long)]
    pub silent: bool,

    /// Abort after this many steps without a verdict (0 disables the limit)
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Enter the first rejecting state when no transition matches, instead of failing
    #[arg(long)]
    pub implicit_reject: bool,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Analyze the machine before running it and fail on any finding
    #[arg(long)]
    pub check: bool,

    /// List the built-in machines and exit
    #[arg(long)]
    pub list: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Builds the effective configuration: the config file (if any), then flag overrides.
    pub fn config(&self) -> Result<Config, TuringMachineError> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(max_steps) = self.max_steps {
            config.max_steps = (max_steps > 0).then_some(max_steps);
        }
        if self.implicit_reject {
            config.mode = Mode::ImplicitReject;
        }
        if self.silent {
            config.snapshots = false;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use turing::types::MAX_EXECUTION_STEPS;

    #[test]
    fn test_default_values() {
        let cli = Cli::parse_from(["turing-cli", "-p", "machine.tm", "-i", "00__"]);

        assert_eq!(cli.program, Some(PathBuf::from("machine.tm")));
        assert_eq!(cli.input.as_deref(), Some("00__"));
        assert_eq!(cli.format, Format::Text);
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.silent);

        let config = cli.config().unwrap();
        assert_eq!(config.max_steps, Some(MAX_EXECUTION_STEPS));
        assert_eq!(config.mode, Mode::Strict);
        assert!(config.snapshots);
    }

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::parse_from([
            "turing-cli",
            "-b",
            "flip-bits",
            "-s",
            "--max-steps",
            "0",
            "--implicit-reject",
            "--format",
            "json",
        ]);

        let config = cli.config().unwrap();
        assert_eq!(config.max_steps, None);
        assert_eq!(config.mode, Mode::ImplicitReject);
        assert!(!config.snapshots);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn test_program_conflicts_with_builtin() {
        let result = Cli::try_parse_from(["turing-cli", "-p", "a.tm", "-b", "flip-bits"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "max_steps": 20, "max_states": 4 }"#)
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["turing-cli", "--config", &path, "--max-steps", "30"]);
        let config = cli.config().unwrap();

        assert_eq!(config.max_steps, Some(30));
        assert_eq!(config.max_states, Some(4));
    }
}
