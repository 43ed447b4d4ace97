use crate::models::{DailyAggregate, GoalProgress, Goals};

/// Progress toward a goal, clamped to `[0, 1]`.
///
/// A goal that is zero, negative or not finite reads as complete.
pub fn progress_ratio(achieved: f64, goal: f64) -> f64 {
    let achieved = if achieved.is_finite() { achieved.max(0.0) } else { 0.0 };
    if !goal.is_finite() || goal <= 0.0 {
        return 1.0;
    }
    (achieved / goal).min(1.0)
}

pub fn evaluate(day: &DailyAggregate, goals: &Goals) -> GoalProgress {
    GoalProgress {
        steps: progress_ratio(day.steps, goals.steps),
        calories: progress_ratio(day.calories, goals.calories),
        workouts: progress_ratio(day.workouts as f64, goals.workouts),
    }
}
