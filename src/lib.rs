pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod goals;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod state;
pub mod storage;
pub mod tracker;
pub mod trend;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::Storage;
pub use tracker::Tracker;
