// Public API - what other modules can use
pub use errors::StatsError;
pub use handlers::{
    get_evening_summary, get_game_stats, get_leaderboard, get_user_stats,
    get_user_stats_all_years,
};
pub use models::*;
pub use repository::{InMemoryUserStatRepository, PostgresUserStatRepository, UserStatRepository};
pub use service::StatsService;

// Internal modules
mod errors;
mod handlers;
pub mod models;
pub mod rebuilder;
pub mod repository;
pub mod service;
mod types;
