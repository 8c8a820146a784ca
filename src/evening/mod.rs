// Public API - what other modules can use
pub use handlers::{
    change_evening_status, create_evening, get_evening, recalculate_evening, update_evening_games,
};
pub use models::{Evening, EveningStats, EveningStatus, PlayedGame, Score};
pub use repository::{EveningRepository, InMemoryEveningRepository, PostgresEveningRepository};
pub use service::EveningService;
pub use types::{CreateEveningRequest, StatusChangeResponse};

// Internal modules
pub mod calculator;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod types;
