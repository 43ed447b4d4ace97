use crate::errors::TrackerError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STEPS_GOAL: f64 = 8000.0;
pub const DEFAULT_CALORIES_GOAL: f64 = 500.0;
pub const DEFAULT_WORKOUTS_GOAL: f64 = 1.0;

const INVALID_VALUE_MESSAGE: &str = "Please enter a valid non-negative number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Steps,
    Calories,
    Workout,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Steps => "steps",
            Self::Calories => "calories",
            Self::Workout => "workout",
        }
    }

    /// Suffix shown after the value in the log table.
    pub fn unit_suffix(self) -> &'static str {
        match self {
            Self::Steps => "",
            Self::Calories => " kcal",
            Self::Workout => " min",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "steps" => Ok(Self::Steps),
            "calories" => Ok(Self::Calories),
            "workout" => Ok(Self::Workout),
            other => Err(TrackerError::InvalidInput(format!(
                "type must be 'steps', 'calories' or 'workout', got '{other}'"
            ))),
        }
    }
}

/// One logged activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub value: f64,
    #[serde(default)]
    pub notes: String,
}

impl Entry {
    pub fn from_draft(id: String, draft: EntryDraft) -> Self {
        Self {
            id,
            date: draft.date,
            kind: draft.kind,
            value: draft.value,
            notes: draft.notes,
        }
    }

    /// Checks the record invariants that typed deserialization cannot express.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.id.trim().is_empty() {
            return Err(TrackerError::InvalidInput("entry id must not be empty".into()));
        }
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(TrackerError::InvalidInput(INVALID_VALUE_MESSAGE.into()));
        }
        Ok(())
    }
}

/// Validated fields of an entry, minus its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub value: f64,
    pub notes: String,
}

/// Raw entry form payload as submitted by the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntryInput {
    pub fn validate(&self, today: NaiveDate) -> Result<EntryDraft, TrackerError> {
        let value = coerce_number(&self.value)
            .filter(|value| *value >= 0.0)
            .ok_or_else(|| TrackerError::InvalidInput(INVALID_VALUE_MESSAGE.into()))?;

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                TrackerError::InvalidInput(format!("date must be YYYY-MM-DD, got '{raw}'"))
            })?,
        };

        let kind = self.kind.parse()?;
        let notes = self.notes.as_deref().unwrap_or_default().trim().to_string();

        Ok(EntryDraft {
            date,
            kind,
            value,
            notes,
        })
    }
}

/// Per-metric daily targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    pub steps: f64,
    pub calories: f64,
    pub workouts: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS_GOAL,
            calories: DEFAULT_CALORIES_GOAL,
            workouts: DEFAULT_WORKOUTS_GOAL,
        }
    }
}

impl Goals {
    /// Settings-form semantics: anything non-numeric becomes 0.
    pub fn from_input(input: &GoalsInput) -> Self {
        Self {
            steps: coerce_number(&input.steps).unwrap_or(0.0),
            calories: coerce_number(&input.calories).unwrap_or(0.0),
            workouts: coerce_number(&input.workouts).unwrap_or(0.0),
        }
    }

    /// Overlays the numeric fields of an imported `goals` object.
    pub fn merged_with(&self, overrides: &Value) -> Result<Self, TrackerError> {
        let Some(map) = overrides.as_object() else {
            return Err(TrackerError::InvalidImport("goals must be an object".into()));
        };

        let mut merged = *self;
        for (key, slot) in [
            ("steps", &mut merged.steps),
            ("calories", &mut merged.calories),
            ("workouts", &mut merged.workouts),
        ] {
            if let Some(raw) = map.get(key) {
                *slot = coerce_number(raw).ok_or_else(|| {
                    TrackerError::InvalidImport(format!("goals.{key} must be a number"))
                })?;
            }
        }
        Ok(merged)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalsInput {
    #[serde(default)]
    pub steps: Value,
    #[serde(default)]
    pub calories: Value,
    #[serde(default)]
    pub workouts: Value,
}

/// Per-date summary derived from the entry list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub steps: f64,
    pub calories: f64,
    pub workouts: u64,
}

/// Ratios in `[0, 1]` for today's progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalProgress {
    pub steps: f64,
    pub calories: f64,
    pub workouts: f64,
}

impl GoalProgress {
    pub fn percent(&self) -> GoalProgress {
        GoalProgress {
            steps: self.steps * 100.0,
            calories: self.calories * 100.0,
            workouts: self.workouts * 100.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub today: DailyAggregate,
    pub goals: Goals,
    pub progress: GoalProgress,
    pub percent: GoalProgress,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub entries: Vec<Entry>,
    pub goals: Goals,
    pub exported_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearTodayResponse {
    pub removed: usize,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Reads a JSON number or numeric string; everything else is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            text.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn entry_input_defaults_date_to_today() {
        let input = EntryInput {
            kind: "steps".into(),
            value: json!("1200"),
            notes: Some("  morning walk ".into()),
            ..Default::default()
        };

        let draft = input.validate(today()).unwrap();
        assert_eq!(draft.date, today());
        assert_eq!(draft.kind, EntryKind::Steps);
        assert_eq!(draft.value, 1200.0);
        assert_eq!(draft.notes, "morning walk");
    }

    #[test]
    fn entry_input_rejects_negative_and_non_numeric_values() {
        for value in [json!(-1), json!("abc"), json!(""), Value::Null, json!(true)] {
            let input = EntryInput {
                kind: "calories".into(),
                value,
                ..Default::default()
            };
            let err = input.validate(today()).unwrap_err();
            assert!(matches!(err, TrackerError::InvalidInput(_)));
        }
    }

    #[test]
    fn entry_input_rejects_unknown_type_and_bad_date() {
        let input = EntryInput {
            kind: "swimming".into(),
            value: json!(10),
            ..Default::default()
        };
        assert!(input.validate(today()).is_err());

        let input = EntryInput {
            date: Some("2024-02-30".into()),
            kind: "workout".into(),
            value: json!(10),
            ..Default::default()
        };
        assert!(input.validate(today()).is_err());
    }

    #[test]
    fn entry_json_uses_type_field_and_optional_notes() {
        let entry: Entry = serde_json::from_value(json!({
            "id": "a",
            "date": "2024-01-01",
            "type": "workout",
            "value": 30
        }))
        .unwrap();
        assert_eq!(entry.kind, EntryKind::Workout);
        assert_eq!(entry.notes, "");

        let encoded = serde_json::to_value(&entry).unwrap();
        assert_eq!(encoded["type"], "workout");
        assert_eq!(encoded["date"], "2024-01-01");
    }

    #[test]
    fn goals_missing_fields_fall_back_to_defaults() {
        let goals: Goals = serde_json::from_value(json!({ "steps": 10000 })).unwrap();
        assert_eq!(goals.steps, 10000.0);
        assert_eq!(goals.calories, DEFAULT_CALORIES_GOAL);
        assert_eq!(goals.workouts, DEFAULT_WORKOUTS_GOAL);
    }

    #[test]
    fn goals_from_input_uses_zero_for_non_numeric() {
        let input = GoalsInput {
            steps: json!("9000"),
            calories: json!("lots"),
            workouts: Value::Null,
        };
        let goals = Goals::from_input(&input);
        assert_eq!(goals.steps, 9000.0);
        assert_eq!(goals.calories, 0.0);
        assert_eq!(goals.workouts, 0.0);
    }

    #[test]
    fn goals_merge_overrides_only_present_fields() {
        let current = Goals {
            steps: 6000.0,
            calories: 400.0,
            workouts: 2.0,
        };
        let merged = current.merged_with(&json!({ "calories": 700 })).unwrap();
        assert_eq!(merged.steps, 6000.0);
        assert_eq!(merged.calories, 700.0);
        assert_eq!(merged.workouts, 2.0);

        assert!(current.merged_with(&json!({ "steps": "many" })).is_err());
        assert!(current.merged_with(&json!([1, 2])).is_err());
    }

    #[test]
    fn entry_validate_rejects_negative_value() {
        let entry = Entry {
            id: "x".into(),
            date: today(),
            kind: EntryKind::Steps,
            value: -5.0,
            notes: String::new(),
        };
        assert!(entry.validate().is_err());
    }
}
