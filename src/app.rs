use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/entries",
            get(handlers::list_entries)
                .post(handlers::add_entry)
                .delete(handlers::clear_all),
        )
        .route(
            "/api/entries/:id",
            put(handlers::update_entry).delete(handlers::delete_entry),
        )
        .route("/api/entries/clear-today", post(handlers::clear_today))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/trend", get(handlers::get_trend))
        .route("/api/goals", get(handlers::get_goals).put(handlers::save_goals))
        .route("/api/export", get(handlers::export_data))
        .route("/api/import", post(handlers::import_data))
        .with_state(state)
}
