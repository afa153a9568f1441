//! Data models for the sales tracker.
//!
//! This module contains the persisted period documents (`TeamTargets`,
//! `AgentTarget`, `DailyRecord`) and the derived buckets produced by the
//! aggregation engine. Field names serialize in camelCase, which is the
//! layout the record store exchanges.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::dates::MONTH_NAMES;

/// One of the three tracked business metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Flags,
    Deals,
    Nights,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 3] = [Metric::Flags, Metric::Deals, Metric::Nights];

    /// Name of the target field this metric is edited through.
    pub fn target_field(&self) -> &'static str {
        match self {
            Metric::Flags => "targetFlags",
            Metric::Deals => "targetDeals",
            Metric::Nights => "targetNights",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Flags => write!(f, "Flags"),
            Metric::Deals => write!(f, "Deals"),
            Metric::Nights => write!(f, "Nights"),
        }
    }
}

/// Flags, deals and nights counted together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub flags: u64,
    pub deals: u64,
    pub nights: u64,
}

impl Metrics {
    pub fn new(flags: u64, deals: u64, nights: u64) -> Self {
        Self {
            flags,
            deals,
            nights,
        }
    }

    /// Value of a single metric.
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Flags => self.flags,
            Metric::Deals => self.deals,
            Metric::Nights => self.nights,
        }
    }

    /// Sum of all three metrics.
    pub fn sum(&self) -> u64 {
        self.flags
            .saturating_add(self.deals)
            .saturating_add(self.nights)
    }

    pub fn is_zero(&self) -> bool {
        self.sum() == 0
    }
}

/// Component-wise addition, saturating at `u64::MAX`.
impl Add for Metrics {
    type Output = Metrics;

    fn add(self, rhs: Metrics) -> Metrics {
        Metrics {
            flags: self.flags.saturating_add(rhs.flags),
            deals: self.deals.saturating_add(rhs.deals),
            nights: self.nights.saturating_add(rhs.nights),
        }
    }
}

impl AddAssign for Metrics {
    fn add_assign(&mut self, rhs: Metrics) {
        *self = *self + rhs;
    }
}

impl Sum for Metrics {
    fn sum<I: Iterator<Item = Metrics>>(iter: I) -> Self {
        iter.fold(Metrics::default(), Add::add)
    }
}

/// A single day of activity entered for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub id: String,
    /// Calendar day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// 1 = Monday through 7 = Sunday.
    pub weekday_index: u8,
    pub flags: u64,
    pub deals: u64,
    pub nights: u64,
}

impl DailyRecord {
    pub fn metrics(&self) -> Metrics {
        Metrics::new(self.flags, self.deals, self.nights)
    }
}

/// An agent's monthly goals and the days recorded against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTarget {
    pub id: String,
    pub agent_name: String,
    pub target_flags: u64,
    pub target_deals: u64,
    pub target_nights: u64,
    /// Records in insertion order.
    #[serde(default)]
    pub daily_records: Vec<DailyRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentTarget {
    pub fn targets(&self) -> Metrics {
        Metrics::new(self.target_flags, self.target_deals, self.target_nights)
    }

    pub fn set_targets(&mut self, targets: Metrics) {
        self.target_flags = targets.flags;
        self.target_deals = targets.deals;
        self.target_nights = targets.nights;
    }

    /// Sum of every recorded day.
    pub fn totals(&self) -> Metrics {
        self.daily_records.iter().map(DailyRecord::metrics).sum()
    }
}

/// One team's targets and agents for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamTargets {
    pub team_id: String,
    pub team_name: String,
    /// 0-based month (January = 0).
    pub month: u32,
    pub year: i32,
    pub target_flags: u64,
    pub target_deals: u64,
    pub target_nights: u64,
    #[serde(default)]
    pub agents: Vec<AgentTarget>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamTargets {
    /// Creates an empty period with zero targets.
    pub fn new(period: &Period, team_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            team_id: period.team_id.clone(),
            team_name: team_name.into(),
            month: period.month,
            year: period.year,
            target_flags: 0,
            target_deals: 0,
            target_nights: 0,
            agents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn period(&self) -> Period {
        Period::new(self.year, self.month, self.team_id.clone())
    }

    pub fn targets(&self) -> Metrics {
        Metrics::new(self.target_flags, self.target_deals, self.target_nights)
    }

    pub fn set_targets(&mut self, targets: Metrics) {
        self.target_flags = targets.flags;
        self.target_deals = targets.deals;
        self.target_nights = targets.nights;
    }

    pub fn agent(&self, id: &str) -> Option<&AgentTarget> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: &str) -> Option<&mut AgentTarget> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// Name to show for this team, falling back to its id.
    pub fn display_name(&self) -> &str {
        if self.team_name.trim().is_empty() {
            &self.team_id
        } else {
            &self.team_name
        }
    }
}

/// The natural key of a `TeamTargets` document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub year: i32,
    /// 0-based month (January = 0).
    pub month: u32,
    pub team_id: String,
}

impl Period {
    pub fn new(year: i32, month: u32, team_id: impl Into<String>) -> Self {
        Self {
            year,
            month,
            team_id: team_id.into(),
        }
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES.get(self.month as usize).copied().unwrap_or("Unknown")
    }

    /// First and last calendar day of the period's month.
    pub fn date_limits(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?;
        let next = if self.month >= 11 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 2, 1)?
        };
        Some((first, next.pred_opt()?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month
    }

    /// Date a new entry starts from: today inside the current month,
    /// otherwise the first of the period's month.
    pub fn default_entry_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        if self.contains(today) {
            Some(today)
        } else {
            self.date_limits().map(|(first, _)| first)
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.month_name(), self.year, self.team_id)
    }
}

/// Which slice of an agent's records a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Monday through Sunday of the current week.
    Weekly,
    /// The current calendar month.
    Monthly,
    /// Every record.
    #[default]
    All,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Weekly => write!(f, "weekly"),
            ViewMode::Monthly => write!(f, "monthly"),
            ViewMode::All => write!(f, "all"),
        }
    }
}

/// Totals for one month-relative week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    pub week_number: u8,
    pub label: String,
    #[serde(flatten)]
    pub totals: Metrics,
}

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Short label such as `Jan 1`.
    pub label: String,
    #[serde(flatten)]
    pub totals: Metrics,
}

/// Running totals up to and including `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: Metrics,
}

/// Totals for one day of the week across a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayBucket {
    pub weekday_index: u8,
    pub label: String,
    #[serde(flatten)]
    pub totals: Metrics,
}

/// The three views the aggregation engine derives from one record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub weekly: Vec<WeeklyBucket>,
    pub daily: Vec<DailyBucket>,
    pub cumulative: Vec<CumulativePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_metrics_arithmetic() {
        let a = Metrics::new(1, 2, 3);
        let b = Metrics::new(4, 5, 6);
        assert_eq!(a + b, Metrics::new(5, 7, 9));

        let total: Metrics = vec![a, b, a].into_iter().sum();
        assert_eq!(total, Metrics::new(6, 9, 12));
        assert_eq!(total.sum(), 27);
        assert_eq!(total.get(Metric::Deals), 9);
        assert!(Metrics::default().is_zero());
    }

    #[test]
    fn test_metrics_saturate_at_max() {
        let big = Metrics::new(u64::MAX, 1, 0);
        assert_eq!(big + big, Metrics::new(u64::MAX, 2, 0));

        let total: Metrics = vec![big, big, big].into_iter().sum();
        assert_eq!(total.flags, u64::MAX);
        assert_eq!(total.sum(), u64::MAX);
    }

    #[test]
    fn test_period_date_limits() {
        let feb = Period::new(2024, 1, "team-alpha");
        assert_eq!(
            feb.date_limits(),
            Some((date("2024-02-01"), date("2024-02-29")))
        );

        let dec = Period::new(2025, 11, "team-alpha");
        assert_eq!(
            dec.date_limits(),
            Some((date("2025-12-01"), date("2025-12-31")))
        );

        assert_eq!(Period::new(2025, 12, "bad").date_limits(), None);
    }

    #[test]
    fn test_default_entry_date() {
        let period = Period::new(2025, 0, "team-alpha");
        assert_eq!(
            period.default_entry_date(date("2025-01-17")),
            Some(date("2025-01-17"))
        );
        assert_eq!(
            period.default_entry_date(date("2025-03-05")),
            Some(date("2025-01-01"))
        );
    }

    #[test]
    fn test_team_targets_camel_case_layout() {
        let now = Utc::now();
        let mut team = TeamTargets::new(&Period::new(2025, 0, "team-alpha"), "Mavericks", now);
        team.agents.push(AgentTarget {
            id: "agent-1".to_string(),
            agent_name: "Sam".to_string(),
            target_flags: 10,
            target_deals: 5,
            target_nights: 20,
            daily_records: vec![DailyRecord {
                id: "rec-1".to_string(),
                date: date("2025-01-06"),
                weekday_index: 1,
                flags: 2,
                deals: 1,
                nights: 3,
            }],
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(&team).unwrap();
        assert_eq!(json["teamId"], "team-alpha");
        assert_eq!(json["targetFlags"], 0);
        assert_eq!(json["agents"][0]["agentName"], "Sam");
        assert_eq!(json["agents"][0]["dailyRecords"][0]["date"], "2025-01-06");
        assert_eq!(json["agents"][0]["dailyRecords"][0]["weekdayIndex"], 1);

        let back: TeamTargets = serde_json::from_value(json).unwrap();
        assert_eq!(back, team);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let json = r#"{
            "teamId": "team-beta",
            "teamName": "",
            "month": 4,
            "year": 2025,
            "targetFlags": 1,
            "targetDeals": 2,
            "targetNights": 3,
            "createdAt": "2025-05-01T00:00:00Z",
            "updatedAt": "2025-05-01T00:00:00Z"
        }"#;
        let team: TeamTargets = serde_json::from_str(json).unwrap();
        assert!(team.agents.is_empty());
        assert_eq!(team.display_name(), "team-beta");
        assert_eq!(team.targets(), Metrics::new(1, 2, 3));
    }

    #[test]
    fn test_bucket_serializes_flat() {
        let bucket = WeeklyBucket {
            week_number: 2,
            label: "Week 2".to_string(),
            totals: Metrics::new(3, 0, 1),
        };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["weekNumber"], 2);
        assert_eq!(json["flags"], 3);
        assert_eq!(json["nights"], 1);
    }
}
