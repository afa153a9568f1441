//! Command handlers.
//!
//! Each handler checks the session's access, loads the period it needs from
//! the record store, runs the pure analysis or editing step and prints the
//! result. Handlers return the process exit code.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::build_overview;
use crate::cli::{
    AgentCommand, Command, DayCommand, OutputArgs, OutputFormat, PeriodArgs, ReportArgs,
    TeamCommand,
};
use crate::config::Config;
use crate::dates::{enumerate_months, year_options, Clock};
use crate::models::{Metrics, Period, TeamTargets};
use crate::report;
use crate::session::{authorize, managed_team, Page, Session};
use crate::store::{load_or_init, RecordStore};
use crate::targets::{self, DayEntry, EditError};

/// Exit code for a rejected form.
pub const EXIT_VALIDATION: i32 = 2;

/// Everything a command needs: configuration, store, clock and the
/// signed-in session, if any.
pub struct App<S, C> {
    pub config: Config,
    pub store: S,
    pub clock: C,
    pub session: Option<Session>,
}

/// Render a value as JSON or with the given Markdown generator.
fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    markdown: impl FnOnce(&T) -> String,
) -> Result<String> {
    match format {
        OutputFormat::Json => report::generate_json(value),
        OutputFormat::Markdown => Ok(markdown(value)),
    }
}

/// Print to stdout or write to the requested file.
fn emit(output: &OutputArgs, content: &str) -> Result<()> {
    match output.output {
        Some(ref path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

impl<S: RecordStore, C: Clock> App<S, C> {
    pub async fn run(&self, command: &Command) -> Result<i32> {
        match command {
            Command::Report(args) => self.report(args).await,
            Command::Overview { period, output } => self.overview(period, output).await,
            Command::Team(cmd) => self.team(cmd).await,
            Command::Agent(cmd) => self.agent(cmd).await,
            Command::Day(cmd) => self.day(cmd).await,
            Command::Months { start, end, years } => self.months(*start, *end, *years),
            Command::Reset { .. } => self.reset().await,
        }
    }

    /// The admin's own team for the selected month.
    fn admin_period(&self, page: Page, args: &PeriodArgs) -> Result<Period> {
        let session = authorize(self.session.as_ref(), page)?;
        let team_id = managed_team(session)?;
        let (year, month) = args.resolve(&self.clock);
        Ok(Period::new(year, month, team_id))
    }

    async fn load(&self, period: &Period) -> Result<TeamTargets> {
        let team_name = self.config.team_name(&period.team_id);
        load_or_init(&self.store, period, &team_name, Utc::now())
            .await
            .with_context(|| format!("Failed to load data for {}", period))
    }

    /// Load a period for display. A failed load is reported and the view
    /// renders over an empty month.
    async fn load_for_view(&self, period: &Period) -> TeamTargets {
        let empty = || TeamTargets::new(period, self.config.team_name(&period.team_id), Utc::now());

        match self.store.load(period).await {
            Ok(Some(team)) => team,
            Ok(None) => {
                info!("No data for {}", period);
                empty()
            }
            Err(e) => {
                warn!("Failed to load report data for {}: {}", period, e);
                eprintln!("⚠️  Failed to load report data");
                empty()
            }
        }
    }

    /// Load a period, apply one edit and save it. A rejected edit prints
    /// its field errors and leaves the store untouched.
    async fn edit<F>(&self, args: &PeriodArgs, apply: F) -> Result<i32>
    where
        F: FnOnce(&mut TeamTargets, DateTime<Utc>) -> Result<String, EditError>,
    {
        let period = self.admin_period(Page::Targets, args)?;
        let mut team = self.load(&period).await?;

        let message = match apply(&mut team, Utc::now()) {
            Ok(message) => message,
            Err(e) if e.is_validation() => {
                warn!("Rejected edit for {}: {}", period, e);
                for (field, msg) in e.field_errors() {
                    eprintln!("   ❌ {}: {}", field, msg);
                }
                return Ok(EXIT_VALIDATION);
            }
            Err(e) => return Err(e.into()),
        };

        self.store
            .save(&team)
            .await
            .with_context(|| format!("Failed to save data for {}", period))?;

        println!("✅ {}", message);
        Ok(0)
    }

    async fn report(&self, args: &ReportArgs) -> Result<i32> {
        let period = self.admin_period(Page::Reports, &args.period)?;

        let team = self.load_for_view(&period).await;

        let agent = if args.agent == crate::analysis::ALL_AGENTS {
            None
        } else {
            match team.agent(&args.agent) {
                Some(agent) => Some(agent),
                None => bail!("Agent not found: {}", args.agent),
            }
        };

        let summary = report::build_period_report(&team, agent);
        debug!(
            "Report for {}: {} weekly, {} daily buckets",
            period,
            summary.aggregation.weekly.len(),
            summary.aggregation.daily.len()
        );

        let content = render(args.output.format, &summary, report::generate_period_markdown)?;
        emit(&args.output, &content)?;
        Ok(0)
    }

    async fn overview(&self, args: &PeriodArgs, output: &OutputArgs) -> Result<i32> {
        authorize(self.session.as_ref(), Page::Supervisor)?;
        let (year, month) = args.resolve(&self.clock);

        let teams = match self.store.load_all(year, month).await {
            Ok(teams) => teams,
            Err(e) => {
                warn!("Failed to load supervisor data: {}", e);
                eprintln!("⚠️  Failed to load team data");
                Vec::new()
            }
        };
        info!("Loaded {} team(s) for {}-{:02}", teams.len(), year, month + 1);

        let overview = build_overview(&teams);
        let title = format!("{} {}", Period::new(year, month, "").month_name(), year);

        let content = render(output.format, &overview, |o| {
            report::generate_overview_markdown(o, &title)
        })?;
        emit(output, &content)?;
        Ok(0)
    }

    async fn team(&self, cmd: &TeamCommand) -> Result<i32> {
        match cmd {
            TeamCommand::Show { period, output } => {
                let period = self.admin_period(Page::Targets, period)?;
                let team = self.load_for_view(&period).await;
                let content = render(output.format, &team, report::generate_team_markdown)?;
                emit(output, &content)?;
                Ok(0)
            }
            TeamCommand::Set {
                period,
                name,
                targets: budget,
            } => {
                let budget = Metrics::from(budget);
                self.edit(period, |team, now| {
                    targets::set_team_targets(team, name, budget, now)?;
                    Ok("Targets updated".to_string())
                })
                .await
            }
        }
    }

    async fn agent(&self, cmd: &AgentCommand) -> Result<i32> {
        match cmd {
            AgentCommand::Add {
                period,
                name,
                targets: budget,
            } => {
                let budget = Metrics::from(budget);
                self.edit(period, |team, now| {
                    let id = targets::add_agent(team, name, budget, now)?;
                    Ok(format!("Agent added: {}", id))
                })
                .await
            }
            AgentCommand::Edit {
                period,
                id,
                name,
                flags,
                deals,
                nights,
            } => {
                self.edit(period, |team, now| {
                    let current = team
                        .agent(id)
                        .ok_or_else(|| EditError::AgentNotFound(id.clone()))?;
                    let name = name.clone().unwrap_or_else(|| current.agent_name.clone());
                    let budget = Metrics::new(
                        flags.unwrap_or(current.target_flags),
                        deals.unwrap_or(current.target_deals),
                        nights.unwrap_or(current.target_nights),
                    );
                    targets::edit_agent(team, id, &name, budget, now)?;
                    Ok("Agent updated".to_string())
                })
                .await
            }
            AgentCommand::Remove { period, id } => {
                self.edit(period, |team, now| {
                    let removed = targets::remove_agent(team, id, now)?;
                    Ok(format!("Agent deleted: {}", removed.agent_name))
                })
                .await
            }
            AgentCommand::Card {
                period,
                id,
                view,
                output,
            } => {
                let period = self.admin_period(Page::Targets, period)?;
                let team = self.load_for_view(&period).await;
                let Some(agent) = team.agent(id) else {
                    bail!("Agent not found: {}", id);
                };

                let card = report::build_agent_card(agent, (*view).into(), &self.clock);
                let content = render(output.format, &card, report::generate_agent_card_markdown)?;
                emit(output, &content)?;
                Ok(0)
            }
        }
    }

    async fn day(&self, cmd: &DayCommand) -> Result<i32> {
        match cmd {
            DayCommand::Add {
                period,
                agent,
                date,
                metrics,
            } => {
                let (year, month) = period.resolve(&self.clock);
                let date = date.clone().or_else(|| {
                    Period::new(year, month, "")
                        .default_entry_date(self.clock.today())
                        .map(|d| d.format("%Y-%m-%d").to_string())
                });
                let entry = DayEntry {
                    date,
                    metrics: Metrics::from(metrics),
                };

                self.edit(period, |team, now| {
                    let id = targets::add_daily_record(team, agent, &entry, now)?;
                    Ok(format!("Record added: {}", id))
                })
                .await
            }
            DayCommand::Remove {
                period,
                agent,
                record,
            } => {
                self.edit(period, |team, now| {
                    targets::remove_daily_record(team, agent, record, now)?;
                    Ok(format!("Record deleted: {}", record))
                })
                .await
            }
        }
    }

    fn months(&self, start: Option<i32>, end: Option<i32>, years: bool) -> Result<i32> {
        if years {
            for year in year_options(&self.clock) {
                println!("{}", year);
            }
            return Ok(0);
        }

        let start = start.unwrap_or(self.config.calendar.start_year);
        let end = end.unwrap_or(self.config.calendar.end_year);

        for option in enumerate_months(start, end) {
            println!("{}  {}", option.value, option.label);
        }
        Ok(0)
    }

    async fn reset(&self) -> Result<i32> {
        let session = authorize(self.session.as_ref(), Page::Supervisor)?;
        info!("{} is resetting the record store", session.username);

        self.store
            .reset()
            .await
            .context("Failed to reset the record store")?;

        println!("✅ All stored periods removed.");
        Ok(0)
    }
}
