//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::StoreBackend;
use crate::dates::Clock;
use crate::models::{Metrics, ViewMode};
use chrono::Datelike;

/// Largest count accepted for a single metric.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// Salesboard - sales team targets and performance reports
///
/// Admins record daily flags, deals and nights per agent against monthly
/// targets; supervisors compare every team for a month.
///
/// Examples:
///   salesboard -u adminA team set --year 2025 --month 3 --name Mavericks --flags 500 --deals 150 --nights 800
///   salesboard -u adminA agent add --year 2025 --month 3 --name "Sam" --flags 100 --deals 30 --nights 150
///   salesboard -u adminA day add --year 2025 --month 3 --agent agent-1736000000000 --date 2025-03-04 --flags 5
///   salesboard -u adminA report --year 2025 --month 3 --format json
///   salesboard -u super overview --year 2025 --month 3
///   salesboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salesboard.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Account to sign in as
    #[arg(short, long, env = "SALESBOARD_USER", global = true)]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, env = "SALESBOARD_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Record store to use (overrides config)
    #[arg(long, value_name = "BACKEND", global = true)]
    pub backend: Option<BackendArg>,

    /// Directory of the file store (overrides config)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the targets API (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Generate a default .salesboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Weekly, daily and cumulative totals for your team's month
    Report(ReportArgs),

    /// Cross-team performance for a month (supervisors)
    Overview {
        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show or set your team's monthly targets
    #[command(subcommand)]
    Team(TeamCommand),

    /// Manage agents and their targets
    #[command(subcommand)]
    Agent(AgentCommand),

    /// Record or delete a day of activity
    #[command(subcommand)]
    Day(DayCommand),

    /// List the months that can be selected
    Months {
        /// First year (defaults to the calendar config)
        #[arg(long)]
        start: Option<i32>,

        /// Last year (defaults to the calendar config)
        #[arg(long)]
        end: Option<i32>,

        /// List the selectable years around the current one instead
        #[arg(long, conflicts_with_all = ["start", "end"])]
        years: bool,
    },

    /// Delete every stored period (supervisors)
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TeamCommand {
    /// Show targets, actuals and agents
    Show {
        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Set the team name and monthly targets
    Set {
        #[command(flatten)]
        period: PeriodArgs,

        /// Team display name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        targets: TargetArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AgentCommand {
    /// Add an agent with monthly targets
    Add {
        #[command(flatten)]
        period: PeriodArgs,

        /// Agent name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Change an agent's name or targets
    Edit {
        #[command(flatten)]
        period: PeriodArgs,

        /// Agent id
        #[arg(long)]
        id: String,

        /// New name (keeps the current one if omitted)
        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_COUNT))]
        flags: Option<u64>,

        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_COUNT))]
        deals: Option<u64>,

        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_COUNT))]
        nights: Option<u64>,
    },

    /// Delete an agent and all of its records
    Remove {
        #[command(flatten)]
        period: PeriodArgs,

        /// Agent id
        #[arg(long)]
        id: String,
    },

    /// Totals, remaining and day-of-week breakdown for one agent
    Card {
        #[command(flatten)]
        period: PeriodArgs,

        /// Agent id
        #[arg(long)]
        id: String,

        /// Which records to include
        #[arg(long, default_value = "all")]
        view: ViewArg,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DayCommand {
    /// Record a day of activity for an agent
    Add {
        #[command(flatten)]
        period: PeriodArgs,

        /// Agent id
        #[arg(long)]
        agent: String,

        /// Day in YYYY-MM-DD (defaults to today in the current month,
        /// otherwise the 1st of the selected month)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        metrics: TargetArgs,
    },

    /// Delete a recorded day
    Remove {
        #[command(flatten)]
        period: PeriodArgs,

        /// Agent id
        #[arg(long)]
        agent: String,

        /// Record id
        #[arg(long)]
        record: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Agent id to report on, or "all"
    #[arg(long, default_value = "all")]
    pub agent: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Year and month selection. Defaults to the current month.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Year, e.g. 2025
    #[arg(long)]
    pub year: Option<i32>,

    /// Month number, 1-12
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

impl PeriodArgs {
    /// `(year, 0-based month)`, filling gaps from the clock.
    pub fn resolve(&self, clock: &impl Clock) -> (i32, u32) {
        let today = clock.today();
        let year = self.year.unwrap_or_else(|| today.year());
        let month = self.month.map(|m| m - 1).unwrap_or_else(|| today.month0());
        (year, month)
    }
}

/// Flags, deals and nights given on the command line.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(..=MAX_COUNT))]
    pub flags: u64,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(..=MAX_COUNT))]
    pub deals: u64,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(..=MAX_COUNT))]
    pub nights: u64,
}

impl From<&TargetArgs> for Metrics {
    fn from(args: &TargetArgs) -> Self {
        Metrics::new(args.flags, args.deals, args.nights)
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendArg {
    File,
    Http,
}

impl From<BackendArg> for StoreBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::File => StoreBackend::File,
            BackendArg::Http => StoreBackend::Http,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewArg {
    Weekly,
    Monthly,
    All,
}

impl From<ViewArg> for ViewMode {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Weekly => ViewMode::Weekly,
            ViewArg::Monthly => ViewMode::Monthly,
            ViewArg::All => ViewMode::All,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        let Some(ref command) = self.command else {
            return Err("A command is required (see --help)".to_string());
        };

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Command::Months {
            start: Some(start),
            end: Some(end),
            ..
        } = command
        {
            if start > end {
                return Err(format!(
                    "Start year {} is after end year {}",
                    start, end
                ));
            }
        }

        if let Command::Reset { yes: false } = command {
            return Err("Refusing to delete stored periods without --yes".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::FixedClock;
    use chrono::NaiveDate;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_report() {
        let args = parse(&[
            "salesboard", "-u", "adminA", "report", "--month", "3", "--agent", "agent-1",
            "--format", "json",
        ]);
        match args.command {
            Some(Command::Report(report)) => {
                assert_eq!(report.period.month, Some(3));
                assert_eq!(report.agent, "agent-1");
                assert_eq!(report.output.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.user.as_deref(), Some("adminA"));
    }

    #[test]
    fn test_dated_entry_pins_its_year() {
        let args = parse(&[
            "salesboard", "-u", "adminA", "day", "add", "--year", "2025", "--month", "3",
            "--agent", "agent-1736000000000", "--date", "2025-03-04", "--flags", "5",
        ]);
        let Some(Command::Day(DayCommand::Add { period, date, .. })) = args.command else {
            panic!("unexpected command");
        };

        let clock = FixedClock(NaiveDate::from_ymd_opt(2027, 9, 1).unwrap());
        let (year, month) = period.resolve(&clock);
        let day = crate::dates::parse_date(date.as_deref()).unwrap();
        assert!(crate::models::Period::new(year, month, "team-alpha").contains(day));
    }

    #[test]
    fn test_month_out_of_range_is_rejected() {
        assert!(Args::try_parse_from(["salesboard", "report", "--month", "13"]).is_err());
        assert!(Args::try_parse_from(["salesboard", "report", "--month", "0"]).is_err());
    }

    #[test]
    fn test_counts_above_limit_are_rejected() {
        let too_big = (MAX_COUNT + 1).to_string();
        assert!(Args::try_parse_from([
            "salesboard", "day", "add", "--agent", "a", "--flags", too_big.as_str(),
        ])
        .is_err());
        assert!(Args::try_parse_from([
            "salesboard", "agent", "edit", "--id", "a", "--deals", too_big.as_str(),
        ])
        .is_err());

        let max = MAX_COUNT.to_string();
        let args = parse(&["salesboard", "team", "set", "--name", "X", "--nights", max.as_str()]);
        match args.command {
            Some(Command::Team(TeamCommand::Set { targets, .. })) => {
                assert_eq!(targets.nights, MAX_COUNT);
                assert_eq!(targets.flags, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_period_resolution() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 7, 20).unwrap());
        assert_eq!(PeriodArgs::default().resolve(&clock), (2025, 6));

        let explicit = PeriodArgs {
            year: Some(2024),
            month: Some(1),
        };
        assert_eq!(explicit.resolve(&clock), (2024, 0));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = parse(&["salesboard", "months"]);
        assert!(args.validate().is_ok());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_requires_command() {
        assert!(parse(&["salesboard"]).validate().is_err());
        assert!(parse(&["salesboard", "--init-config"]).validate().is_ok());
    }

    #[test]
    fn test_validation_reset_needs_confirmation() {
        assert!(parse(&["salesboard", "reset"]).validate().is_err());
        assert!(parse(&["salesboard", "reset", "--yes"]).validate().is_ok());
    }

    #[test]
    fn test_validation_months_range() {
        let args = parse(&["salesboard", "months", "--start", "2030", "--end", "2024"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&["salesboard", "months"]);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
