use crate::errors::AppError;
use crate::models::{
    ClearTodayResponse, DashboardResponse, DeleteResponse, Entry, EntryInput, ExportFile, Goals,
    GoalsInput, MessageResponse,
};
use crate::state::AppState;
use crate::tracker::{ClearOutcome, TrendView, IMPORT_OK_MESSAGE, NOTHING_TODAY_MESSAGE};
use crate::trend::ChartFrame;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

const EXPORT_DISPOSITION: &str = "attachment; filename=\"fitness-tracker-export.json\"";

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ChartQuery {
    fn frame(&self) -> ChartFrame {
        let defaults = ChartFrame::default();
        ChartFrame {
            width: self.width.filter(|w| *w > defaults.padding * 2.0).unwrap_or(defaults.width),
            height: self.height.filter(|h| *h > defaults.padding * 2.0).unwrap_or(defaults.height),
            ..defaults
        }
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();
    let tracker = state.tracker.lock().await;
    let dashboard = tracker.dashboard(today);
    let trend = tracker.trend(today, ChartFrame::default());
    Html(render_index(&dashboard, &trend, &tracker.entries()))
}

pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<Entry>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.entries())
}

pub async fn add_entry(
    State(state): State<AppState>,
    Json(input): Json<EntryInput>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let mut tracker = state.tracker.lock().await;
    let entry = tracker.add_entry(&input, today()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EntryInput>,
) -> Result<Json<Entry>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let entry = tracker.update_entry(&id, &input, today()).await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let removed = tracker.delete_entry(&id).await?;
    Ok(Json(DeleteResponse { removed }))
}

pub async fn clear_all(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_today(State(state): State<AppState>) -> Result<Json<ClearTodayResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let response = match tracker.clear_today(today()).await? {
        ClearOutcome::Removed(removed) => ClearTodayResponse {
            removed,
            message: format!("Removed {removed} entries for today."),
        },
        ClearOutcome::NothingToday => ClearTodayResponse {
            removed: 0,
            message: NOTHING_TODAY_MESSAGE.to_string(),
        },
    };
    Ok(Json(response))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let tracker = state.tracker.lock().await;
    Json(tracker.dashboard(today()))
}

pub async fn get_trend(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Json<TrendView> {
    let tracker = state.tracker.lock().await;
    Json(tracker.trend(today(), query.frame()))
}

pub async fn get_goals(State(state): State<AppState>) -> Json<Goals> {
    let tracker = state.tracker.lock().await;
    Json(tracker.goals())
}

pub async fn save_goals(
    State(state): State<AppState>,
    Json(input): Json<GoalsInput>,
) -> Result<Json<Goals>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let goals = tracker.save_goals(&input).await?;
    Ok(Json(goals))
}

pub async fn export_data(State(state): State<AppState>) -> impl IntoResponse {
    let tracker = state.tracker.lock().await;
    let file: ExportFile = tracker.export_data();
    ([(header::CONTENT_DISPOSITION, EXPORT_DISPOSITION)], Json(file))
}

pub async fn import_data(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.import_data(&body).await?;
    Ok(Json(MessageResponse {
        message: IMPORT_OK_MESSAGE.to_string(),
    }))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
