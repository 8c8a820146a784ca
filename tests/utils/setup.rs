use std::sync::Arc;

use gamenight::{
    build_router, AppState, EveningService, InMemoryEveningRepository,
    InMemoryUserStatRepository, StatsService,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub evening_repository: Arc<InMemoryEveningRepository>,
    pub user_stat_repository: Arc<InMemoryUserStatRepository>,
    pub stats_service: Arc<StatsService>,
    pub evening_service: EveningService,
    pub members: Vec<String>,
    pub year: i32,
}

impl TestSetup {
    /// Router wired to the same in-memory stores as the services
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            self.evening_repository.clone(),
            self.stats_service.clone(),
        ))
    }
}

pub struct TestSetupBuilder {
    members: Vec<String>,
    year: i32,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            members: vec![],
            year: 2025,
        }
    }

    pub fn with_members(mut self, members: Vec<&str>) -> Self {
        self.members = members.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_members(self) -> Self {
        self.with_members(vec!["alice", "bob", "carol"])
    }

    #[allow(dead_code)]
    pub fn in_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn build(self) -> TestSetup {
        let evening_repository = Arc::new(InMemoryEveningRepository::new());
        let user_stat_repository = Arc::new(InMemoryUserStatRepository::new());
        let stats_service = Arc::new(StatsService::new(
            evening_repository.clone(),
            user_stat_repository.clone(),
        ));
        let evening_service =
            EveningService::new(evening_repository.clone(), stats_service.clone());

        TestSetup {
            evening_repository,
            user_stat_repository,
            stats_service,
            evening_service,
            members: self.members,
            year: self.year,
        }
    }
}
