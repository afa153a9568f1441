//! Comparing actual totals against monthly targets.

use crate::models::{Metric, Metrics, TeamTargets};
use serde::Serialize;

/// Inline message for an allocation that overruns the team budget.
pub const EXCEEDS_TEAM_LIMIT: &str = "Exceeds Team Limit";

/// Sum over every agent's every record. A `TeamTargets` is already one
/// month, so no period filter applies.
pub fn team_totals(team: &TeamTargets) -> Metrics {
    team.agents.iter().map(|a| a.totals()).sum()
}

/// Target minus actual per metric. Negative values are overage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub flags: i64,
    pub deals: i64,
    pub nights: i64,
}

impl Remaining {
    pub fn get(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Flags => self.flags,
            Metric::Deals => self.deals,
            Metric::Nights => self.nights,
        }
    }

    /// Metrics whose actual has gone past the target.
    pub fn overage(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.get(*m) < 0)
            .collect()
    }
}

pub fn remaining(actual: Metrics, target: Metrics) -> Remaining {
    let diff = |m: Metric| {
        let diff = i128::from(target.get(m)) - i128::from(actual.get(m));
        diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    };
    Remaining {
        flags: diff(Metric::Flags),
        deals: diff(Metric::Deals),
        nights: diff(Metric::Nights),
    }
}

/// Completion of one metric as a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    /// Unbounded ratio; above 100 once the goal is beaten.
    pub raw: f64,
    /// `raw` limited to 0..=100 for progress bars.
    pub clamped: f64,
}

impl Progress {
    pub fn exceeded(&self) -> bool {
        self.raw > 100.0
    }
}

/// `actual / target * 100`, or 0 when there is no target.
pub fn percent_complete(actual: u64, target: u64) -> Progress {
    let raw = if target > 0 {
        actual as f64 / target as f64 * 100.0
    } else {
        0.0
    };

    Progress {
        raw,
        clamped: raw.clamp(0.0, 100.0),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricProgress {
    pub flags: Progress,
    pub deals: Progress,
    pub nights: Progress,
}

impl MetricProgress {
    pub fn get(&self, metric: Metric) -> Progress {
        match metric {
            Metric::Flags => self.flags,
            Metric::Deals => self.deals,
            Metric::Nights => self.nights,
        }
    }
}

pub fn progress(actual: Metrics, target: Metrics) -> MetricProgress {
    MetricProgress {
        flags: percent_complete(actual.flags, target.flags),
        deals: percent_complete(actual.deals, target.deals),
        nights: percent_complete(actual.nights, target.nights),
    }
}

/// Actual, target, remaining and progress for one scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reconciliation {
    pub actual: Metrics,
    pub target: Metrics,
    pub remaining: Remaining,
    pub progress: MetricProgress,
}

pub fn reconcile(actual: Metrics, target: Metrics) -> Reconciliation {
    Reconciliation {
        actual,
        target,
        remaining: remaining(actual, target),
        progress: progress(actual, target),
    }
}

/// Outcome of checking an agent allocation against the team budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationCheck {
    /// Metrics whose budget would be overrun.
    pub exceeded: Vec<Metric>,
}

impl AllocationCheck {
    pub fn is_valid(&self) -> bool {
        self.exceeded.is_empty()
    }

    /// `(field, message)` pairs for inline display.
    pub fn field_errors(&self) -> Vec<(&'static str, &'static str)> {
        self.exceeded
            .iter()
            .map(|m| (m.target_field(), EXCEEDS_TEAM_LIMIT))
            .collect()
    }
}

/// Targets already handed out to agents other than `editing_agent_id`.
pub fn allocated_to_others(team: &TeamTargets, editing_agent_id: Option<&str>) -> Metrics {
    team.agents
        .iter()
        .filter(|a| editing_agent_id != Some(a.id.as_str()))
        .map(|a| a.targets())
        .sum()
}

/// Check a proposed agent allocation. Each metric has its own budget, and
/// the agent being edited does not count against itself.
pub fn validate_allocation(
    team: &TeamTargets,
    editing_agent_id: Option<&str>,
    proposed: Metrics,
) -> AllocationCheck {
    let used = allocated_to_others(team, editing_agent_id);
    let budget = team.targets();

    let exceeded = Metric::ALL
        .into_iter()
        .filter(|m| used.get(*m).saturating_add(proposed.get(*m)) > budget.get(*m))
        .collect();

    AllocationCheck { exceeded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentTarget, DailyRecord, Period};
    use chrono::{NaiveDate, Utc};

    fn agent(id: &str, targets: Metrics, days: &[(u64, u64, u64)]) -> AgentTarget {
        let now = Utc::now();
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut agent = AgentTarget {
            id: id.to_string(),
            agent_name: id.to_string(),
            target_flags: 0,
            target_deals: 0,
            target_nights: 0,
            daily_records: days
                .iter()
                .enumerate()
                .map(|(i, (f, d, n))| DailyRecord {
                    id: format!("{}-rec-{}", id, i),
                    date,
                    weekday_index: 1,
                    flags: *f,
                    deals: *d,
                    nights: *n,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        agent.set_targets(targets);
        agent
    }

    fn team(targets: Metrics, agents: Vec<AgentTarget>) -> TeamTargets {
        let mut team = TeamTargets::new(&Period::new(2025, 0, "team-alpha"), "Mavericks", Utc::now());
        team.set_targets(targets);
        team.agents = agents;
        team
    }

    #[test]
    fn test_team_totals() {
        let team = team(
            Metrics::new(100, 50, 200),
            vec![
                agent("a", Metrics::default(), &[(1, 2, 3), (4, 5, 6)]),
                agent("b", Metrics::default(), &[(10, 0, 1)]),
            ],
        );
        assert_eq!(team_totals(&team), Metrics::new(15, 7, 10));
    }

    #[test]
    fn test_remaining_can_go_negative() {
        let r = remaining(Metrics::new(12, 3, 0), Metrics::new(10, 5, 0));
        assert_eq!(r.flags, -2);
        assert_eq!(r.deals, 2);
        assert_eq!(r.nights, 0);
        assert_eq!(r.overage(), vec![Metric::Flags]);
    }

    #[test]
    fn test_remaining_clamps_huge_counts() {
        let r = remaining(Metrics::new(0, u64::MAX, 5), Metrics::new(u64::MAX, 0, 5));
        assert_eq!(r.flags, i64::MAX);
        assert_eq!(r.deals, i64::MIN);
        assert_eq!(r.nights, 0);
        assert_eq!(r.overage(), vec![Metric::Deals]);
    }

    #[test]
    fn test_team_totals_do_not_overflow() {
        let team = team(
            Metrics::default(),
            vec![
                agent("a", Metrics::default(), &[(u64::MAX, 0, 0), (u64::MAX, 0, 0)]),
                agent("b", Metrics::default(), &[(1, 0, 0)]),
            ],
        );
        assert_eq!(team_totals(&team).flags, u64::MAX);
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(percent_complete(5, 0).raw, 0.0);
        assert_eq!(percent_complete(25, 100).clamped, 25.0);

        let over = percent_complete(150, 100);
        assert_eq!(over.raw, 150.0);
        assert_eq!(over.clamped, 100.0);
        assert!(over.exceeded());
        assert!(!percent_complete(100, 100).exceeded());
    }

    #[test]
    fn test_edit_excludes_own_allocation() {
        let team = team(
            Metrics::new(100, 0, 0),
            vec![agent("a", Metrics::new(60, 0, 0), &[])],
        );

        let check = validate_allocation(&team, Some("a"), Metrics::new(100, 0, 0));
        assert!(check.is_valid());

        let check = validate_allocation(&team, None, Metrics::new(41, 0, 0));
        assert!(!check.is_valid());
        assert_eq!(check.exceeded, vec![Metric::Flags]);
        assert_eq!(
            check.field_errors(),
            vec![("targetFlags", EXCEEDS_TEAM_LIMIT)]
        );

        assert!(validate_allocation(&team, None, Metrics::new(40, 0, 0)).is_valid());
    }

    #[test]
    fn test_metrics_have_independent_budgets() {
        let team = team(
            Metrics::new(100, 10, 50),
            vec![agent("a", Metrics::new(50, 5, 50), &[])],
        );

        let check = validate_allocation(&team, None, Metrics::new(50, 6, 1));
        assert_eq!(check.exceeded, vec![Metric::Deals, Metric::Nights]);
    }

    #[test]
    fn test_reconcile() {
        let result = reconcile(Metrics::new(50, 10, 0), Metrics::new(100, 5, 0));
        assert_eq!(result.remaining.flags, 50);
        assert_eq!(result.remaining.deals, -5);
        assert_eq!(result.progress.flags.clamped, 50.0);
        assert!(result.progress.get(Metric::Deals).exceeded());
        assert_eq!(result.progress.nights.raw, 0.0);
    }
}
