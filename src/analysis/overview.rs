//! Cross-team performance for supervisors.

use crate::analysis::aggregator::aggregate;
use crate::analysis::reconcile::{progress, team_totals, MetricProgress};
use crate::models::{Metrics, TeamTargets, WeeklyBucket};
use serde::Serialize;

/// One team's line in the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformance {
    pub team_id: String,
    pub name: String,
    pub agents_count: usize,
    pub actuals: Metrics,
    pub targets: Metrics,
    pub progress: MetricProgress,
    /// Deals per agent, rounded to one decimal.
    pub efficiency: f64,
    /// Share of all teams' deals, in percent.
    pub contribution: f64,
    pub weekly: Vec<WeeklyBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub grand_actuals: Metrics,
    pub grand_targets: Metrics,
    pub grand_progress: MetricProgress,
    pub total_agents: usize,
    pub teams: Vec<TeamPerformance>,
}

impl Overview {
    /// Team with the most deals, if any team has deals at all.
    pub fn top_team(&self) -> Option<&TeamPerformance> {
        self.teams
            .iter()
            .filter(|t| t.actuals.deals > 0)
            .max_by_key(|t| t.actuals.deals)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn build_overview(teams: &[TeamTargets]) -> Overview {
    let mut overview = Overview::default();

    for team in teams {
        let actuals = team_totals(team);
        let targets = team.targets();
        let agents_count = team.agents.len();

        overview.grand_actuals += actuals;
        overview.grand_targets += targets;
        overview.total_agents += agents_count;

        let efficiency = if agents_count > 0 {
            round_one_decimal(actuals.deals as f64 / agents_count as f64)
        } else {
            0.0
        };

        overview.teams.push(TeamPerformance {
            team_id: team.team_id.clone(),
            name: team.display_name().to_string(),
            agents_count,
            actuals,
            targets,
            progress: progress(actuals, targets),
            efficiency,
            contribution: 0.0,
            weekly: aggregate(&team.agents, None).weekly,
        });
    }

    let grand_deals = overview.grand_actuals.deals;
    if grand_deals > 0 {
        for team in &mut overview.teams {
            team.contribution = team.actuals.deals as f64 / grand_deals as f64 * 100.0;
        }
    }

    overview.grand_progress = progress(overview.grand_actuals, overview.grand_targets);
    overview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentTarget, DailyRecord, Period};
    use chrono::{NaiveDate, Utc};

    fn team(id: &str, name: &str, targets: Metrics, agent_deals: &[u64]) -> TeamTargets {
        let now = Utc::now();
        let mut team = TeamTargets::new(&Period::new(2025, 0, id), name, now);
        team.set_targets(targets);
        team.agents = agent_deals
            .iter()
            .enumerate()
            .map(|(i, deals)| AgentTarget {
                id: format!("{}-agent-{}", id, i),
                agent_name: format!("Agent {}", i),
                target_flags: 0,
                target_deals: 0,
                target_nights: 0,
                daily_records: vec![DailyRecord {
                    id: format!("{}-rec-{}", id, i),
                    date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
                    weekday_index: 4,
                    flags: 1,
                    deals: *deals,
                    nights: 2,
                }],
                created_at: now,
                updated_at: now,
            })
            .collect();
        team
    }

    #[test]
    fn test_build_overview() {
        let teams = vec![
            team("team-alpha", "Mavericks", Metrics::new(10, 20, 30), &[3, 4]),
            team("team-beta", "", Metrics::new(5, 5, 5), &[1]),
        ];

        let overview = build_overview(&teams);

        assert_eq!(overview.total_agents, 3);
        assert_eq!(overview.grand_actuals, Metrics::new(3, 8, 6));
        assert_eq!(overview.grand_targets, Metrics::new(15, 25, 35));
        assert_eq!(overview.teams[0].efficiency, 3.5);
        assert_eq!(overview.teams[0].contribution, 87.5);
        assert_eq!(overview.teams[1].name, "team-beta");
        assert_eq!(overview.teams[1].progress.deals.raw, 20.0);
        assert_eq!(overview.teams[0].weekly.len(), 1);
        assert_eq!(overview.teams[0].weekly[0].week_number, 2);
        assert_eq!(overview.top_team().map(|t| t.team_id.as_str()), Some("team-alpha"));
    }

    #[test]
    fn test_empty_overview() {
        let overview = build_overview(&[]);
        assert_eq!(overview.total_agents, 0);
        assert!(overview.teams.is_empty());
        assert!(overview.top_team().is_none());

        let idle = build_overview(&[team("team-alpha", "Mavericks", Metrics::default(), &[])]);
        assert_eq!(idle.teams[0].efficiency, 0.0);
        assert_eq!(idle.teams[0].contribution, 0.0);
    }
}
