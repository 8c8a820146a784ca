// Library crate for the game night statistics service
// This file exposes the public API for integration tests

pub mod app;
pub mod config;
pub mod evening;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::AppConfig;
pub use evening::{
    Evening, EveningRepository, EveningService, EveningStats, EveningStatus,
    InMemoryEveningRepository, PlayedGame, Score,
};
pub use shared::{AppError, AppState};
pub use stats::{InMemoryUserStatRepository, StatsService, UserStatRepository};
