//! Command interface over the entry repository and goals.
//!
//! Every command runs to completion and writes through to storage before
//! returning. The presentation layer only talks to this type.

use crate::aggregate::{aggregate, aggregate_on};
use crate::errors::TrackerError;
use crate::goals::evaluate;
use crate::models::{DashboardResponse, Entry, EntryInput, ExportFile, Goals, GoalsInput};
use crate::repository::EntryRepository;
use crate::storage::Storage;
use crate::trend::{self, ChartFrame, ChartLayout, TrendSeries, TrendTotals, TREND_DAYS};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

pub const NOTHING_TODAY_MESSAGE: &str = "No entries found for today.";
pub const IMPORT_OK_MESSAGE: &str = "Import successful!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendView {
    pub dates: Vec<NaiveDate>,
    pub series: TrendSeries,
    pub totals: TrendTotals,
    pub chart: ChartLayout,
}

/// Result of "clear today"; zero removals is informational, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Removed(usize),
    NothingToday,
}

#[derive(Debug)]
pub struct Tracker {
    storage: Storage,
    entries: EntryRepository,
    goals: Goals,
}

impl Tracker {
    /// Loads both blobs, creating the data directory when needed.
    pub async fn open(storage: Storage) -> Result<Self, TrackerError> {
        storage.ensure_dir().await?;
        let goals = storage.load_goals().await;
        let entries = EntryRepository::open(storage.clone()).await;
        info!(
            dir = %storage.dir().display(),
            entries = entries.len(),
            "tracker state loaded"
        );
        Ok(Self {
            storage,
            entries,
            goals,
        })
    }

    pub fn goals(&self) -> Goals {
        self.goals
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.sorted_for_display()
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub async fn add_entry(&mut self, input: &EntryInput, today: NaiveDate) -> Result<Entry, TrackerError> {
        let draft = input.validate(today)?;
        let entry = self.entries.add(draft).await?;
        info!(id = %entry.id, date = %entry.date, kind = %entry.kind, "entry added");
        Ok(entry)
    }

    pub async fn update_entry(
        &mut self,
        id: &str,
        input: &EntryInput,
        today: NaiveDate,
    ) -> Result<Entry, TrackerError> {
        let draft = input.validate(today)?;
        let entry = self.entries.update(id, draft).await?;
        info!(id = %entry.id, "entry updated");
        Ok(entry)
    }

    pub async fn delete_entry(&mut self, id: &str) -> Result<bool, TrackerError> {
        let removed = self.entries.remove(id).await?;
        info!(id, removed, "entry delete requested");
        Ok(removed)
    }

    pub async fn clear_all(&mut self) -> Result<(), TrackerError> {
        let count = self.entries.len();
        self.entries.clear().await?;
        info!(count, "all entries cleared");
        Ok(())
    }

    pub async fn clear_today(&mut self, today: NaiveDate) -> Result<ClearOutcome, TrackerError> {
        let removed = self.entries.remove_by_date(today).await?;
        if removed == 0 {
            info!(%today, "{NOTHING_TODAY_MESSAGE}");
            return Ok(ClearOutcome::NothingToday);
        }
        info!(%today, removed, "today's entries cleared");
        Ok(ClearOutcome::Removed(removed))
    }

    pub async fn save_goals(&mut self, input: &GoalsInput) -> Result<Goals, TrackerError> {
        let goals = Goals::from_input(input);
        self.storage.save_goals(&goals).await?;
        self.goals = goals;
        info!(
            steps = goals.steps,
            calories = goals.calories,
            workouts = goals.workouts,
            "goals saved"
        );
        Ok(goals)
    }

    pub fn export_data(&self) -> ExportFile {
        ExportFile {
            entries: self.entries.list().to_vec(),
            goals: self.goals,
            exported_at: Utc::now().to_rfc3339(),
        }
    }

    /// All-or-nothing import: the file is fully validated before any state
    /// or storage changes.
    pub async fn import_data(&mut self, raw: &str) -> Result<(), TrackerError> {
        let (entries, goals) = self.parse_import(raw)?;

        self.storage.save_goals(&goals).await?;
        self.entries.replace_all(entries).await?;
        self.goals = goals;
        info!(entries = self.entries.len(), "import applied");
        Ok(())
    }

    fn parse_import(&self, raw: &str) -> Result<(Vec<Entry>, Goals), TrackerError> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|err| TrackerError::InvalidImport(format!("not valid JSON ({err})")))?;

        let Some(records) = document.get("entries").and_then(Value::as_array) else {
            return Err(TrackerError::InvalidImport("`entries` must be an array".into()));
        };

        let mut seen = HashSet::with_capacity(records.len());
        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let entry: Entry = serde_json::from_value(record.clone())
                .map_err(|err| TrackerError::InvalidImport(format!("entry {index}: {err}")))?;
            entry
                .validate()
                .map_err(|err| TrackerError::InvalidImport(format!("entry {index}: {err}")))?;
            if !seen.insert(entry.id.clone()) {
                return Err(TrackerError::InvalidImport(format!(
                    "entry {index}: duplicate id '{}'",
                    entry.id
                )));
            }
            entries.push(entry);
        }

        let goals = match document.get("goals") {
            None | Some(Value::Null) => self.goals,
            Some(overrides) => self.goals.merged_with(overrides)?,
        };

        Ok((entries, goals))
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardResponse {
        let day = aggregate_on(self.entries.list(), today);
        let progress = evaluate(&day, &self.goals);
        DashboardResponse {
            date: today,
            today: day,
            goals: self.goals,
            progress,
            percent: progress.percent(),
        }
    }

    pub fn trend(&self, today: NaiveDate, frame: ChartFrame) -> TrendView {
        let dates = trend::window_dates(today, TREND_DAYS);
        let series = trend::project(&dates, &aggregate(self.entries.list()));
        let chart = trend::layout(&dates, &series, frame);
        TrendView {
            totals: series.totals(),
            dates,
            series,
            chart,
        }
    }

    /// Final write of both blobs, used on shutdown.
    pub async fn flush(&self) -> Result<(), TrackerError> {
        self.entries.flush().await?;
        self.storage.save_goals(&self.goals).await?;
        info!("tracker state flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use crate::storage::tests::temp_storage;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn input(kind: &str, value: Value) -> EntryInput {
        EntryInput {
            kind: kind.into(),
            value,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn dashboard_reflects_today_against_goals() {
        let mut tracker = Tracker::open(temp_storage("tracker_dash").await).await.unwrap();
        tracker.add_entry(&input("steps", json!(5000)), today()).await.unwrap();
        tracker.add_entry(&input("steps", json!(3000)), today()).await.unwrap();
        tracker.add_entry(&input("workout", json!(30)), today()).await.unwrap();

        let dashboard = tracker.dashboard(today());
        assert_eq!(dashboard.today.steps, 8000.0);
        assert_eq!(dashboard.today.calories, 0.0);
        assert_eq!(dashboard.today.workouts, 1);
        assert_eq!(dashboard.progress.steps, 1.0);
        assert_eq!(dashboard.progress.workouts, 1.0);
        assert_eq!(dashboard.progress.calories, 0.0);
    }

    #[tokio::test]
    async fn invalid_input_changes_nothing() {
        let storage = temp_storage("tracker_invalid").await;
        let mut tracker = Tracker::open(storage.clone()).await.unwrap();

        let err = tracker.add_entry(&input("steps", json!(-3)), today()).await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert!(tracker.entries().is_empty());
        assert!(!storage.key_path(crate::storage::ENTRIES_KEY).exists());
    }

    #[tokio::test]
    async fn clear_today_reports_nothing_when_empty() {
        let mut tracker = Tracker::open(temp_storage("tracker_clear").await).await.unwrap();
        assert_eq!(tracker.clear_today(today()).await.unwrap(), ClearOutcome::NothingToday);

        tracker.add_entry(&input("calories", json!(120)), today()).await.unwrap();
        let mut other_day = input("calories", json!(80));
        other_day.date = Some("2023-12-31".into());
        tracker.add_entry(&other_day, today()).await.unwrap();

        assert_eq!(tracker.clear_today(today()).await.unwrap(), ClearOutcome::Removed(1));
        assert_eq!(tracker.entries().len(), 1);
    }

    #[tokio::test]
    async fn save_goals_persists_and_coerces() {
        let storage = temp_storage("tracker_goals").await;
        let mut tracker = Tracker::open(storage.clone()).await.unwrap();
        let saved = tracker
            .save_goals(&GoalsInput {
                steps: json!(10000),
                calories: json!("n/a"),
                workouts: json!("2"),
            })
            .await
            .unwrap();

        assert_eq!(saved.calories, 0.0);
        let reopened = Tracker::open(storage).await.unwrap();
        assert_eq!(reopened.goals(), saved);
    }

    #[tokio::test]
    async fn export_then_import_reproduces_state() {
        let mut tracker = Tracker::open(temp_storage("tracker_export").await).await.unwrap();
        tracker.add_entry(&input("steps", json!(4321)), today()).await.unwrap();
        tracker.add_entry(&input("workout", json!(25)), today()).await.unwrap();
        tracker
            .save_goals(&GoalsInput {
                steps: json!(9000),
                calories: json!(600),
                workouts: json!(2),
            })
            .await
            .unwrap();
        let exported = tracker.export_data();
        let text = serde_json::to_string_pretty(&exported).unwrap();
        assert!(text.contains("exportedAt"));

        let storage = temp_storage("tracker_import").await;
        let mut fresh = Tracker::open(storage.clone()).await.unwrap();
        fresh.import_data(&text).await.unwrap();
        fresh.import_data(&text).await.unwrap();

        let reopened = Tracker::open(storage).await.unwrap();
        assert_eq!(reopened.export_data().entries, exported.entries);
        assert_eq!(reopened.goals(), exported.goals);
    }

    #[tokio::test]
    async fn import_without_entries_is_rejected_and_state_unchanged() {
        let storage = temp_storage("tracker_import_bad").await;
        let mut tracker = Tracker::open(storage.clone()).await.unwrap();
        tracker.add_entry(&input("steps", json!(10)), today()).await.unwrap();
        let before = tracker.export_data();

        for raw in [
            r#"{ "goals": { "steps": 1 } }"#,
            r#"{ "entries": {} }"#,
            "not json",
            r#"{ "entries": [ { "id": "a", "date": "2024-01-01", "type": "steps", "value": -1 } ] }"#,
            r#"{ "entries": [ { "id": "a", "date": "2024-01-01", "type": "nap", "value": 1 } ] }"#,
        ] {
            let err = tracker.import_data(raw).await.unwrap_err();
            assert!(matches!(err, TrackerError::InvalidImport(_)), "{raw}");
        }

        let reopened = Tracker::open(storage).await.unwrap();
        assert_eq!(reopened.export_data().entries, before.entries);
        assert_eq!(reopened.goals(), before.goals);
    }

    #[tokio::test]
    async fn import_merges_goals_over_current() {
        let mut tracker = Tracker::open(temp_storage("tracker_merge").await).await.unwrap();
        let raw = json!({
            "entries": [
                { "id": "x1", "date": "2024-01-01", "type": "calories", "value": 300 }
            ],
            "goals": { "calories": 750 }
        })
        .to_string();

        tracker.import_data(&raw).await.unwrap();
        assert_eq!(tracker.goals().calories, 750.0);
        assert_eq!(tracker.goals().steps, Goals::default().steps);
        assert_eq!(tracker.entry("x1").map(|e| e.kind), Some(EntryKind::Calories));
    }

    #[tokio::test]
    async fn trend_view_covers_window() {
        let mut tracker = Tracker::open(temp_storage("tracker_trend").await).await.unwrap();
        tracker.add_entry(&input("steps", json!(700)), today()).await.unwrap();

        let view = tracker.trend(today(), ChartFrame::default());
        assert_eq!(view.dates.len(), TREND_DAYS);
        assert_eq!(*view.dates.last().unwrap(), today());
        assert_eq!(view.series.steps[TREND_DAYS - 1], 700.0);
        assert_eq!(view.totals.steps, 700.0);
        assert_eq!(view.chart.max_y, 700.0);
    }
}
