//! Editing operations on a period's targets, agents and daily records.
//!
//! Each operation validates its input first and leaves the document
//! untouched when validation fails. Successful edits bump `updated_at`.

use crate::analysis::reconcile::{validate_allocation, AllocationCheck};
use crate::dates::{self, DateError};
use crate::models::{AgentTarget, DailyRecord, Metrics, TeamTargets};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("{field}: Required")]
    Required { field: &'static str },

    #[error("agent targets exceed the team limit for {}", describe(.0))]
    ExceedsTeamLimit(AllocationCheck),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error("date {date} is outside {month}")]
    OutsidePeriod { date: NaiveDate, month: String },

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("record not found: {0}")]
    RecordNotFound(String),
}

fn describe(check: &AllocationCheck) -> String {
    check
        .exceeded
        .iter()
        .map(|m| m.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

impl EditError {
    /// Whether this is a rejected form rather than a missing entity.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EditError::Required { .. }
                | EditError::ExceedsTeamLimit(_)
                | EditError::Date(_)
                | EditError::OutsidePeriod { .. }
        )
    }

    /// `(field, message)` pairs for inline display.
    pub fn field_errors(&self) -> Vec<(&'static str, String)> {
        match self {
            EditError::Required { field } => vec![(*field, "Required".to_string())],
            EditError::ExceedsTeamLimit(check) => check
                .field_errors()
                .into_iter()
                .map(|(field, msg)| (field, msg.to_string()))
                .collect(),
            EditError::Date(e) => vec![("date", e.to_string())],
            EditError::OutsidePeriod { .. } => vec![("date", self.to_string())],
            _ => Vec::new(),
        }
    }
}

/// A day of activity as typed by an admin, before validation.
#[derive(Debug, Clone, Default)]
pub struct DayEntry {
    pub date: Option<String>,
    pub metrics: Metrics,
}

fn require(field: &'static str, value: &str) -> Result<(), EditError> {
    if value.trim().is_empty() {
        return Err(EditError::Required { field });
    }
    Ok(())
}

/// `<prefix>-<millis>`, bumped until it does not collide.
fn next_id(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = now.timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, stamp);
        if !taken(&id) {
            return id;
        }
        stamp += 1;
    }
}

/// Rename the team and replace its monthly targets.
pub fn set_team_targets(
    team: &mut TeamTargets,
    team_name: &str,
    targets: Metrics,
    now: DateTime<Utc>,
) -> Result<(), EditError> {
    require("teamName", team_name)?;

    team.team_name = team_name.trim().to_string();
    team.set_targets(targets);
    team.updated_at = now;
    Ok(())
}

/// Add a new agent. Returns the generated id.
pub fn add_agent(
    team: &mut TeamTargets,
    agent_name: &str,
    targets: Metrics,
    now: DateTime<Utc>,
) -> Result<String, EditError> {
    require("agentName", agent_name)?;

    let check = validate_allocation(team, None, targets);
    if !check.is_valid() {
        return Err(EditError::ExceedsTeamLimit(check));
    }

    let id = next_id("agent", now, |id| team.agent(id).is_some());
    debug!("Adding agent {} ({})", agent_name, id);

    let mut agent = AgentTarget {
        id: id.clone(),
        agent_name: agent_name.trim().to_string(),
        target_flags: 0,
        target_deals: 0,
        target_nights: 0,
        daily_records: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    agent.set_targets(targets);

    team.agents.push(agent);
    team.updated_at = now;
    Ok(id)
}

/// Rename an agent and replace its targets.
pub fn edit_agent(
    team: &mut TeamTargets,
    agent_id: &str,
    agent_name: &str,
    targets: Metrics,
    now: DateTime<Utc>,
) -> Result<(), EditError> {
    require("agentName", agent_name)?;

    if team.agent(agent_id).is_none() {
        return Err(EditError::AgentNotFound(agent_id.to_string()));
    }

    let check = validate_allocation(team, Some(agent_id), targets);
    if !check.is_valid() {
        return Err(EditError::ExceedsTeamLimit(check));
    }

    let agent = team
        .agent_mut(agent_id)
        .ok_or_else(|| EditError::AgentNotFound(agent_id.to_string()))?;
    agent.agent_name = agent_name.trim().to_string();
    agent.set_targets(targets);
    agent.updated_at = now;

    team.updated_at = now;
    Ok(())
}

/// Remove an agent together with its records.
pub fn remove_agent(
    team: &mut TeamTargets,
    agent_id: &str,
    now: DateTime<Utc>,
) -> Result<AgentTarget, EditError> {
    let index = team
        .agents
        .iter()
        .position(|a| a.id == agent_id)
        .ok_or_else(|| EditError::AgentNotFound(agent_id.to_string()))?;

    team.updated_at = now;
    Ok(team.agents.remove(index))
}

/// Append a day of activity to an agent. The date must fall inside the
/// team's month. Returns the new record's id.
pub fn add_daily_record(
    team: &mut TeamTargets,
    agent_id: &str,
    entry: &DayEntry,
    now: DateTime<Utc>,
) -> Result<String, EditError> {
    let date = dates::parse_date(entry.date.as_deref())?;

    let period = team.period();
    if !period.contains(date) {
        return Err(EditError::OutsidePeriod {
            date,
            month: format!("{} {}", period.month_name(), period.year),
        });
    }

    let agent = team
        .agent_mut(agent_id)
        .ok_or_else(|| EditError::AgentNotFound(agent_id.to_string()))?;

    let id = next_id("rec", now, |id| agent.daily_records.iter().any(|r| r.id == id));
    agent.daily_records.push(DailyRecord {
        id: id.clone(),
        date,
        weekday_index: dates::weekday_index(date),
        flags: entry.metrics.flags,
        deals: entry.metrics.deals,
        nights: entry.metrics.nights,
    });
    agent.updated_at = now;

    team.updated_at = now;
    Ok(id)
}

pub fn remove_daily_record(
    team: &mut TeamTargets,
    agent_id: &str,
    record_id: &str,
    now: DateTime<Utc>,
) -> Result<DailyRecord, EditError> {
    let agent = team
        .agent_mut(agent_id)
        .ok_or_else(|| EditError::AgentNotFound(agent_id.to_string()))?;

    let index = agent
        .daily_records
        .iter()
        .position(|r| r.id == record_id)
        .ok_or_else(|| EditError::RecordNotFound(record_id.to_string()))?;

    let removed = agent.daily_records.remove(index);
    agent.updated_at = now;
    team.updated_at = now;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Metric, Period};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_736_000_000 + secs, 0).unwrap()
    }

    fn team() -> TeamTargets {
        let mut team = TeamTargets::new(&Period::new(2025, 0, "team-alpha"), "Mavericks", at(0));
        team.set_targets(Metrics::new(100, 50, 200));
        team
    }

    fn entry(date: Option<&str>, flags: u64) -> DayEntry {
        DayEntry {
            date: date.map(String::from),
            metrics: Metrics::new(flags, 0, 0),
        }
    }

    #[test]
    fn test_set_team_targets() {
        let mut team = team();
        set_team_targets(&mut team, " Little ATMs ", Metrics::new(1, 2, 3), at(5)).unwrap();
        assert_eq!(team.team_name, "Little ATMs");
        assert_eq!(team.targets(), Metrics::new(1, 2, 3));
        assert_eq!(team.updated_at, at(5));

        let err = set_team_targets(&mut team, "", Metrics::default(), at(6)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field_errors()[0].0, "teamName");
        assert_eq!(team.updated_at, at(5));
    }

    #[test]
    fn test_add_agent_generates_unique_ids() {
        let mut team = team();
        let a = add_agent(&mut team, "Sam", Metrics::new(10, 5, 20), at(1)).unwrap();
        let b = add_agent(&mut team, "Alex", Metrics::new(10, 5, 20), at(1)).unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("agent-"));
        assert_eq!(team.agents.len(), 2);
        assert!(team.agents[0].daily_records.is_empty());
    }

    #[test]
    fn test_add_agent_rejects_overrun() {
        let mut team = team();
        add_agent(&mut team, "Sam", Metrics::new(60, 0, 0), at(1)).unwrap();

        let err = add_agent(&mut team, "Alex", Metrics::new(41, 0, 0), at(2)).unwrap_err();
        match &err {
            EditError::ExceedsTeamLimit(check) => assert_eq!(check.exceeded, vec![Metric::Flags]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.field_errors(),
            vec![("targetFlags", "Exceeds Team Limit".to_string())]
        );
        assert_eq!(team.agents.len(), 1);

        let err = add_agent(&mut team, "  ", Metrics::default(), at(3)).unwrap_err();
        assert!(matches!(err, EditError::Required { field: "agentName" }));
    }

    #[test]
    fn test_edit_agent_with_self_exclusion() {
        let mut team = team();
        let id = add_agent(&mut team, "Sam", Metrics::new(60, 0, 0), at(1)).unwrap();

        edit_agent(&mut team, &id, "Samantha", Metrics::new(100, 0, 0), at(2)).unwrap();
        let agent = team.agent(&id).unwrap();
        assert_eq!(agent.agent_name, "Samantha");
        assert_eq!(agent.target_flags, 100);
        assert_eq!(agent.updated_at, at(2));

        let err = edit_agent(&mut team, "ghost", "X", Metrics::default(), at(3)).unwrap_err();
        assert!(!err.is_validation());
    }

    #[test]
    fn test_add_daily_record() {
        let mut team = team();
        let agent = add_agent(&mut team, "Sam", Metrics::default(), at(1)).unwrap();

        let id = add_daily_record(&mut team, &agent, &entry(Some("2025-01-05"), 4), at(2)).unwrap();
        let record = &team.agent(&agent).unwrap().daily_records[0];
        assert_eq!(record.id, id);
        assert_eq!(record.weekday_index, 7);
        assert_eq!(record.flags, 4);

        // Same timestamp still yields a distinct id.
        let second = add_daily_record(&mut team, &agent, &entry(Some("2025-01-05"), 1), at(2)).unwrap();
        assert_ne!(id, second);
    }

    #[test]
    fn test_add_daily_record_validates_date() {
        let mut team = team();
        let agent = add_agent(&mut team, "Sam", Metrics::default(), at(1)).unwrap();

        let err = add_daily_record(&mut team, &agent, &entry(None, 1), at(2)).unwrap_err();
        assert!(matches!(err, EditError::Date(DateError::Missing)));

        let err = add_daily_record(&mut team, &agent, &entry(Some("05/01/2025"), 1), at(2)).unwrap_err();
        assert!(matches!(err, EditError::Date(DateError::Invalid(_))));

        let err = add_daily_record(&mut team, &agent, &entry(Some("2025-02-01"), 1), at(2)).unwrap_err();
        assert!(matches!(err, EditError::OutsidePeriod { .. }));
        assert_eq!(err.field_errors()[0].0, "date");

        assert!(team.agent(&agent).unwrap().daily_records.is_empty());
    }

    #[test]
    fn test_remove_agent_and_record() {
        let mut team = team();
        let agent = add_agent(&mut team, "Sam", Metrics::default(), at(1)).unwrap();
        let rec = add_daily_record(&mut team, &agent, &entry(Some("2025-01-10"), 2), at(2)).unwrap();

        let removed = remove_daily_record(&mut team, &agent, &rec, at(3)).unwrap();
        assert_eq!(removed.flags, 2);
        assert!(matches!(
            remove_daily_record(&mut team, &agent, &rec, at(4)),
            Err(EditError::RecordNotFound(_))
        ));

        let removed = remove_agent(&mut team, &agent, at(5)).unwrap();
        assert_eq!(removed.agent_name, "Sam");
        assert!(team.agents.is_empty());
        assert_eq!(team.updated_at, at(5));
    }
}
