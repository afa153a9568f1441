//! Record aggregation into weekly, daily and cumulative totals.
//!
//! The pipeline is split into small steps (select, sort, fold, prefix sum)
//! so each one can be checked on its own. [`aggregate`] wires them together.

use crate::dates::{self, Clock};
use crate::models::{
    AgentTarget, Aggregation, CumulativePoint, DailyBucket, DailyRecord, Metrics, ViewMode,
    WeekdayBucket, WeeklyBucket,
};
use std::collections::BTreeMap;

/// Agent filter value meaning "every agent combined".
pub const ALL_AGENTS: &str = "all";

/// Number of weekly buckets seeded before folding.
const WEEK_BUCKETS: usize = 5;

/// Collect the records of the selected agent, or of every agent.
///
/// Records sharing a date are all kept.
pub fn select_records<'a>(
    agents: &'a [AgentTarget],
    filter_agent_id: Option<&str>,
) -> Vec<&'a DailyRecord> {
    let filter = filter_agent_id.filter(|id| *id != ALL_AGENTS);

    agents
        .iter()
        .filter(|agent| filter.map_or(true, |id| agent.id == id))
        .flat_map(|agent| agent.daily_records.iter())
        .collect()
}

/// Sort records ascending by date. Same-day records keep their order.
pub fn sort_by_date(records: &mut [&DailyRecord]) {
    records.sort_by_key(|r| r.date);
}

/// Sum records into month-relative weeks, dropping weeks with no activity.
pub fn weekly_buckets(records: &[&DailyRecord]) -> Vec<WeeklyBucket> {
    let mut weeks = [Metrics::default(); WEEK_BUCKETS];

    for record in records {
        let week = dates::month_week_number(record.date) as usize;
        if let Some(slot) = weeks.get_mut(week - 1) {
            *slot += record.metrics();
        }
    }

    weeks
        .into_iter()
        .enumerate()
        .filter(|(_, totals)| !totals.is_zero())
        .map(|(i, totals)| WeeklyBucket {
            week_number: (i + 1) as u8,
            label: format!("Week {}", i + 1),
            totals,
        })
        .collect()
}

/// Sum records per calendar day, ordered by date.
pub fn daily_buckets(records: &[&DailyRecord]) -> Vec<DailyBucket> {
    let mut days: BTreeMap<_, Metrics> = BTreeMap::new();

    for record in records {
        *days.entry(record.date).or_default() += record.metrics();
    }

    days.into_iter()
        .map(|(date, totals)| DailyBucket {
            date,
            label: dates::day_label(date),
            totals,
        })
        .collect()
}

/// Running totals over date-ordered daily buckets.
pub fn cumulative(daily: &[DailyBucket]) -> Vec<CumulativePoint> {
    daily
        .iter()
        .scan(Metrics::default(), |running, day| {
            *running += day.totals;
            Some(CumulativePoint {
                date: day.date,
                totals: *running,
            })
        })
        .collect()
}

/// Weekly, daily and cumulative views over one agent's records, or all
/// agents' when `filter_agent_id` is `None` or [`ALL_AGENTS`].
pub fn aggregate(agents: &[AgentTarget], filter_agent_id: Option<&str>) -> Aggregation {
    let mut records = select_records(agents, filter_agent_id);
    sort_by_date(&mut records);

    let weekly = weekly_buckets(&records);
    let daily = daily_buckets(&records);
    let cumulative = cumulative(&daily);

    Aggregation {
        weekly,
        daily,
        cumulative,
    }
}

/// Records visible in a view mode, sorted by date.
pub fn filter_by_view<'a>(
    records: &'a [DailyRecord],
    view: ViewMode,
    clock: &impl Clock,
) -> Vec<&'a DailyRecord> {
    let mut visible: Vec<&DailyRecord> = records
        .iter()
        .filter(|r| match view {
            ViewMode::Weekly => dates::is_in_current_week(r.date, clock),
            ViewMode::Monthly => dates::is_in_current_month(r.date, clock),
            ViewMode::All => true,
        })
        .collect();

    sort_by_date(&mut visible);
    visible
}

/// Sum records per day of the week, Monday first.
pub fn weekday_rollup(records: &[&DailyRecord]) -> Vec<WeekdayBucket> {
    let mut weekdays: BTreeMap<u8, Metrics> = BTreeMap::new();

    for record in records {
        *weekdays.entry(record.weekday_index).or_default() += record.metrics();
    }

    weekdays
        .into_iter()
        .map(|(weekday_index, totals)| WeekdayBucket {
            weekday_index,
            label: format!("Day {}", weekday_index),
            totals,
        })
        .collect()
}

/// Sum of a record set.
pub fn totals(records: &[&DailyRecord]) -> Metrics {
    records.iter().map(|r| r.metrics()).sum()
}
