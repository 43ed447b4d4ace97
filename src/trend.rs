use crate::models::DailyAggregate;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TREND_DAYS: usize = 7;
const MIN_MAX_Y: f64 = 100.0;

/// Trailing window of `n` dates ending at `reference`, oldest first.
pub fn window_dates(reference: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .map(|offset| reference - Duration::days(offset as i64))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSeries {
    pub steps: Vec<f64>,
    pub calories: Vec<f64>,
    pub workouts: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendTotals {
    pub steps: f64,
    pub calories: f64,
    pub workouts: f64,
}

impl TrendSeries {
    pub fn totals(&self) -> TrendTotals {
        TrendTotals {
            steps: self.steps.iter().sum(),
            calories: self.calories.iter().sum(),
            workouts: self.workouts.iter().sum(),
        }
    }

    fn named(&self) -> [(Metric, &[f64]); 3] {
        [
            (Metric::Steps, self.steps.as_slice()),
            (Metric::Calories, self.calories.as_slice()),
            (Metric::Workouts, self.workouts.as_slice()),
        ]
    }
}

/// Values per date for each tracked measure; missing days are 0.
pub fn project(dates: &[NaiveDate], aggregates: &BTreeMap<NaiveDate, DailyAggregate>) -> TrendSeries {
    let mut series = TrendSeries {
        steps: Vec::with_capacity(dates.len()),
        calories: Vec::with_capacity(dates.len()),
        workouts: Vec::with_capacity(dates.len()),
    };
    for date in dates {
        let day = aggregates.get(date).copied().unwrap_or_default();
        series.steps.push(day.steps);
        series.calories.push(day.calories);
        series.workouts.push(day.workouts as f64);
    }
    series
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Steps,
    Calories,
    Workouts,
}

/// Canvas geometry the chart is projected into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 260.0,
            padding: 40.0,
        }
    }
}

impl ChartFrame {
    pub fn plot_width(&self) -> f64 {
        self.width - self.padding * 1.5
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.padding * 1.5
    }

    /// Baseline y coordinate where a value of zero sits.
    pub fn baseline(&self) -> f64 {
        self.height - self.padding
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPath {
    pub metric: Metric,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub text: String,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub frame: ChartFrame,
    pub origin: Point,
    pub max_y: f64,
    pub y_scale: f64,
    pub dx: f64,
    pub series: Vec<SeriesPath>,
    pub labels: Vec<AxisLabel>,
}

/// Maps the series onto plot coordinates with one vertical scale shared by
/// all three measures, so their relative magnitudes stay comparable.
pub fn layout(dates: &[NaiveDate], series: &TrendSeries, frame: ChartFrame) -> ChartLayout {
    let max_y = series
        .named()
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .filter(|value| value.is_finite())
        .fold(MIN_MAX_Y, f64::max);
    let y_scale = frame.plot_height() / max_y;
    let dx = frame.plot_width() / spacing_divisor(dates.len());

    let x_at = |index: usize| frame.padding + index as f64 * dx;

    let paths = series
        .named()
        .into_iter()
        .map(|(metric, values)| SeriesPath {
            metric,
            points: values
                .iter()
                .enumerate()
                .map(|(index, value)| Point {
                    x: x_at(index),
                    y: frame.baseline() - value * y_scale,
                })
                .collect(),
        })
        .collect();

    let labels = dates
        .iter()
        .enumerate()
        .map(|(index, date)| AxisLabel {
            text: date.format("%m-%d").to_string(),
            x: x_at(index),
        })
        .collect();

    ChartLayout {
        frame,
        origin: Point {
            x: frame.padding,
            y: frame.baseline(),
        },
        max_y,
        y_scale,
        dx,
        series: paths,
        labels,
    }
}

fn spacing_divisor(len: usize) -> f64 {
    if len > 1 { (len - 1) as f64 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    #[test]
    fn window_has_seven_consecutive_days_ending_at_reference() {
        let dates = window_dates(date("2024-03-02"), TREND_DAYS);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], date("2024-02-25"));
        assert_eq!(dates[6], date("2024-03-02"));
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn window_crosses_year_boundary() {
        let dates = window_dates(date("2024-01-02"), 3);
        assert_eq!(dates, vec![date("2023-12-31"), date("2024-01-01"), date("2024-01-02")]);
    }

    #[test]
    fn project_aligns_with_dates_and_fills_gaps() {
        let dates = window_dates(date("2024-01-03"), 3);
        let mut aggregates = BTreeMap::new();
        aggregates.insert(
            date("2024-01-02"),
            DailyAggregate {
                steps: 4000.0,
                calories: 250.0,
                workouts: 2,
            },
        );

        let series = project(&dates, &aggregates);
        assert_eq!(series.steps, vec![0.0, 4000.0, 0.0]);
        assert_eq!(series.calories, vec![0.0, 250.0, 0.0]);
        assert_eq!(series.workouts, vec![0.0, 2.0, 0.0]);
        assert_eq!(series.totals().steps, 4000.0);
        assert_eq!(series.totals().workouts, 2.0);
    }

    #[test]
    fn small_values_use_axis_floor() {
        let dates = window_dates(date("2024-01-07"), TREND_DAYS);
        let series = project(&dates, &BTreeMap::new());
        let frame = ChartFrame::default();
        let chart = layout(&dates, &series, frame);

        assert_eq!(chart.max_y, 100.0);
        assert_eq!(chart.y_scale, frame.plot_height() / 100.0);
        assert_eq!(chart.series.len(), 3);
        for path in &chart.series {
            assert!(path.points.iter().all(|point| point.y == frame.baseline()));
        }
    }

    #[test]
    fn scale_is_shared_across_series() {
        let dates = window_dates(date("2024-01-02"), 2);
        let series = TrendSeries {
            steps: vec![1000.0, 500.0],
            calories: vec![250.0, 0.0],
            workouts: vec![1.0, 0.0],
        };
        let frame = ChartFrame {
            width: 160.0,
            height: 140.0,
            padding: 40.0,
        };
        let chart = layout(&dates, &series, frame);

        assert_eq!(chart.max_y, 1000.0);
        assert_eq!(chart.dx, 100.0);
        assert_eq!(chart.y_scale, 0.08);

        let steps = &chart.series[0];
        assert_eq!(steps.metric, Metric::Steps);
        assert_eq!(steps.points[0], Point { x: 40.0, y: 20.0 });
        assert_eq!(steps.points[1], Point { x: 140.0, y: 60.0 });

        let calories = &chart.series[1];
        assert_eq!(calories.points[0].y, 80.0);
        assert_eq!(chart.labels[0].text, "01-01");
        assert_eq!(chart.labels[1].x, 140.0);
    }

    #[test]
    fn single_day_window_does_not_divide_by_zero() {
        let dates = window_dates(date("2024-01-01"), 1);
        let series = project(&dates, &BTreeMap::new());
        let frame = ChartFrame::default();
        let chart = layout(&dates, &series, frame);
        assert_eq!(chart.dx, frame.plot_width());
        assert!(chart.series[0].points[0].x.is_finite());
    }
}
