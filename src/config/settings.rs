#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
    pub max_attempts: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "outing_ledger.db".to_string()),
            pool_size: 8,
            busy_timeout_ms: 5_000,
            max_attempts: 5,
        }
    }
}

impl DatabaseSettings {
    pub fn at_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RivalrySettings {
    /// Shared rounds a pair needs before a rivalry record is created
    pub min_shared_rounds: u32,
    /// Length of the recent-results ring buffer
    pub recent_results_cap: usize,
    /// Number of most recent results that decide the belt
    pub belt_window: usize,
    /// Pairs processed per event; the rest are skipped
    pub max_pairs_per_event: usize,
    pub streak_broken_min: u32,
    pub streak_extended_min: u32,
    pub milestone_every: u32,
}

impl Default for RivalrySettings {
    fn default() -> Self {
        Self {
            min_shared_rounds: 3,
            recent_results_cap: 10,
            belt_window: 5,
            max_pairs_per_event: 100,
            streak_broken_min: 3,
            streak_extended_min: 4,
            milestone_every: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub max_cards_per_user: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_cards_per_user: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub rivalry: RivalrySettings,
    pub feed: FeedSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            database: DatabaseSettings::default(),
            rivalry: RivalrySettings::default(),
            feed: FeedSettings::default(),
        }
    }

    pub fn with_database(database: DatabaseSettings) -> Self {
        Self {
            database,
            ..Self::new()
        }
    }
}
