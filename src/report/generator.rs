//! Markdown and JSON report generation.
//!
//! Reports are built from a period document and the aggregation and
//! reconciliation results derived from it.

use crate::analysis::{
    aggregate, filter_by_view, reconcile, team_totals, totals, weekday_rollup, Overview,
    Reconciliation, ALL_AGENTS,
};
use crate::dates::Clock;
use crate::models::{
    AgentTarget, Aggregation, DailyRecord, Metric, TeamTargets, ViewMode, WeekdayBucket,
};
use anyhow::Result;
use serde::Serialize;

/// Weekly, daily and cumulative figures for one team's month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub team_id: String,
    pub team_name: String,
    pub year: i32,
    pub month: String,
    /// Agent the figures are limited to, or `all`.
    pub agent: String,
    pub summary: Reconciliation,
    #[serde(flatten)]
    pub aggregation: Aggregation,
}

/// Build a period report for every agent or for one.
pub fn build_period_report(team: &TeamTargets, agent: Option<&AgentTarget>) -> PeriodReport {
    let (agent_label, summary) = match agent {
        Some(agent) => (agent.agent_name.clone(), reconcile(agent.totals(), agent.targets())),
        None => (
            ALL_AGENTS.to_string(),
            reconcile(team_totals(team), team.targets()),
        ),
    };

    let period = team.period();
    PeriodReport {
        team_id: team.team_id.clone(),
        team_name: team.display_name().to_string(),
        year: team.year,
        month: period.month_name().to_string(),
        agent: agent_label,
        summary,
        aggregation: aggregate(&team.agents, agent.map(|a| a.id.as_str())),
    }
}

/// One agent's totals and breakdown under a view mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub agent_id: String,
    pub agent_name: String,
    pub view: ViewMode,
    /// Actuals are measured against the monthly targets in every view.
    pub summary: Reconciliation,
    pub records: Vec<DailyRecord>,
    pub weekdays: Vec<WeekdayBucket>,
}

pub fn build_agent_card(agent: &AgentTarget, view: ViewMode, clock: &impl Clock) -> AgentCard {
    let visible = filter_by_view(&agent.daily_records, view, clock);

    AgentCard {
        agent_id: agent.id.clone(),
        agent_name: agent.agent_name.clone(),
        view,
        summary: reconcile(totals(&visible), agent.targets()),
        weekdays: weekday_rollup(&visible),
        records: visible.into_iter().cloned().collect(),
    }
}

/// Format a signed remaining figure, marking overage.
fn format_remaining(value: i64) -> String {
    if value < 0 {
        format!("+{} over", -value)
    } else {
        value.to_string()
    }
}

fn summary_table(summary: &Reconciliation) -> String {
    let mut table = String::new();

    table.push_str("| Metric | Actual | Target | Remaining | Progress |\n");
    table.push_str("|:---|---:|---:|---:|---:|\n");

    for metric in Metric::ALL {
        let progress = summary.progress.get(metric);
        let marker = if progress.exceeded() { " 🏆" } else { "" };
        table.push_str(&format!(
            "| {} | {} | {} | {} | {:.0}%{} |\n",
            metric,
            summary.actual.get(metric),
            summary.target.get(metric),
            format_remaining(summary.remaining.get(metric)),
            progress.clamped,
            marker
        ));
    }
    table.push('\n');

    let over = summary.remaining.overage();
    if !over.is_empty() {
        let names: Vec<String> = over.iter().map(|m| m.to_string()).collect();
        table.push_str(&format!("**Over target:** {}\n\n", names.join(", ")));
    }

    table
}

/// Generate the Markdown period report.
pub fn generate_period_markdown(report: &PeriodReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Performance Report: {} {}\n\n",
        report.month, report.year
    ));
    output.push_str(&format!(
        "- **Team:** {} (`{}`)\n",
        report.team_name, report.team_id
    ));
    output.push_str(&format!("- **Agent View:** {}\n\n", report.agent));

    output.push_str("## Monthly Accumulation vs Target\n\n");
    output.push_str(&summary_table(&report.summary));

    if report.aggregation.daily.is_empty() {
        output.push_str("No records for this period yet.\n");
        return output;
    }

    output.push_str("## Weekly Summary\n\n");
    output.push_str("| Period | Flags | Deals | Nights |\n");
    output.push_str("|:---|---:|---:|---:|\n");
    for week in &report.aggregation.weekly {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            week.label, week.totals.flags, week.totals.deals, week.totals.nights
        ));
    }
    output.push('\n');

    output.push_str("## Daily Performance\n\n");
    output.push_str("| Day | Flags | Deals | Nights | Flags to date | Deals to date | Nights to date |\n");
    output.push_str("|:---|---:|---:|---:|---:|---:|---:|\n");
    for (day, running) in report
        .aggregation
        .daily
        .iter()
        .zip(&report.aggregation.cumulative)
    {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            day.label,
            day.totals.flags,
            day.totals.deals,
            day.totals.nights,
            running.totals.flags,
            running.totals.deals,
            running.totals.nights
        ));
    }
    output.push('\n');

    output
}

/// Generate the Markdown team sheet: targets plus one row per agent.
pub fn generate_team_markdown(team: &TeamTargets) -> String {
    let mut output = String::new();
    let period = team.period();

    output.push_str(&format!(
        "# {}: {} {}\n\n",
        team.display_name(),
        period.month_name(),
        team.year
    ));
    output.push_str(&summary_table(&reconcile(team_totals(team), team.targets())));

    output.push_str("## Agents\n\n");
    if team.agents.is_empty() {
        output.push_str("No agents yet.\n");
        return output;
    }

    output.push_str("| Id | Agent | Flags | Deals | Nights | Days |\n");
    output.push_str("|:---|:---|---:|---:|---:|---:|\n");
    for agent in &team.agents {
        let actual = agent.totals();
        output.push_str(&format!(
            "| `{}` | {} | {}/{} | {}/{} | {}/{} | {} |\n",
            agent.id,
            agent.agent_name,
            actual.flags,
            agent.target_flags,
            actual.deals,
            agent.target_deals,
            actual.nights,
            agent.target_nights,
            agent.daily_records.len()
        ));
    }
    output.push('\n');

    output
}

pub fn generate_agent_card_markdown(card: &AgentCard) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {} ({} view)\n\n", card.agent_name, card.view));
    output.push_str(&summary_table(&card.summary));

    if card.records.is_empty() {
        output.push_str("No records in this view.\n");
        return output;
    }

    output.push_str("## By Day of Week\n\n");
    output.push_str("| Day | Flags | Deals | Nights |\n");
    output.push_str("|:---|---:|---:|---:|\n");
    for day in &card.weekdays {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            day.label, day.totals.flags, day.totals.deals, day.totals.nights
        ));
    }
    output.push('\n');

    output.push_str("## Records\n\n");
    output.push_str("| Id | Date | Flags | Deals | Nights |\n");
    output.push_str("|:---|:---|---:|---:|---:|\n");
    for record in &card.records {
        output.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            record.id, record.date, record.flags, record.deals, record.nights
        ));
    }
    output.push('\n');

    output
}

/// Generate the Markdown supervisor overview.
pub fn generate_overview_markdown(overview: &Overview, title: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Executive Overview: {}\n\n", title));
    output.push_str(&format!("- **Teams:** {}\n", overview.teams.len()));
    output.push_str(&format!("- **Active Agents:** {}\n", overview.total_agents));
    if let Some(top) = overview.top_team() {
        output.push_str(&format!(
            "- **Top Team:** {} ({} deals)\n",
            top.name, top.actuals.deals
        ));
    }
    output.push('\n');

    output.push_str("## Grand Totals\n\n");
    output.push_str("| Metric | Actual | Target | Progress |\n");
    output.push_str("|:---|---:|---:|---:|\n");
    for metric in Metric::ALL {
        output.push_str(&format!(
            "| {} | {} | {} | {:.0}% |\n",
            metric,
            overview.grand_actuals.get(metric),
            overview.grand_targets.get(metric),
            overview.grand_progress.get(metric).clamped
        ));
    }
    output.push('\n');

    if overview.teams.is_empty() {
        output.push_str("No team has data for this month.\n");
        return output;
    }

    output.push_str("## Teams\n\n");
    output.push_str("| Team | Agents | Flags | Deals | Nights | Deals Progress | Deals/Agent | Share |\n");
    output.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|\n");
    for team in &overview.teams {
        output.push_str(&format!(
            "| {} | {} | {}/{} | {}/{} | {}/{} | {:.0}% | {:.1} | {:.1}% |\n",
            team.name,
            team.agents_count,
            team.actuals.flags,
            team.targets.flags,
            team.actuals.deals,
            team.targets.deals,
            team.actuals.nights,
            team.targets.nights,
            team.progress.deals.clamped,
            team.efficiency,
            team.contribution
        ));
    }
    output.push('\n');

    output
}

/// Serialize any report as pretty JSON.
pub fn generate_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
