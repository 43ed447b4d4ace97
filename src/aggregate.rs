use crate::models::{DailyAggregate, Entry, EntryKind};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Groups entries by calendar date in a single pass.
///
/// Steps and calories are summed. Workouts are counted by occurrence and
/// their minutes are not part of the aggregate.
pub fn aggregate(entries: &[Entry]) -> BTreeMap<NaiveDate, DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
    for entry in entries {
        let bucket = by_date.entry(entry.date).or_default();
        match entry.kind {
            EntryKind::Steps => bucket.steps += sanitize(entry.value),
            EntryKind::Calories => bucket.calories += sanitize(entry.value),
            EntryKind::Workout => bucket.workouts = bucket.workouts.saturating_add(1),
        }
    }
    by_date
}

/// Aggregate for a single date, zeroed when nothing was logged.
pub fn aggregate_on(entries: &[Entry], date: NaiveDate) -> DailyAggregate {
    aggregate(entries).get(&date).copied().unwrap_or_default()
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
