#[derive(Debug, Clone)]
pub struct RankingSettings {
    pub max_counted_events: usize,
    pub max_discounted_events: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            max_counted_events: 6,
            max_discounted_events: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
}

impl DatabaseSettings {
    fn from_env() -> Self {
        Self {
            path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "table_tennis_ranking.db".to_string()),
        }
    }
}

/// Bearer tokens for the two privilege tiers. A tier without a token
/// cannot be authenticated at all.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub admin_token: Option<String>,
    pub superadmin_token: Option<String>,
}

impl AuthSettings {
    fn from_env() -> Self {
        Self {
            admin_token: non_empty_var("ADMIN_TOKEN"),
            superadmin_token: non_empty_var("SUPERADMIN_TOKEN"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ranking: RankingSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            ranking: RankingSettings::default(),
            database: DatabaseSettings::from_env(),
            auth: AuthSettings::from_env(),
        }
    }

    /// Configuration that ignores the environment
    pub fn with_parts(database_path: &str, auth: AuthSettings) -> Self {
        Self {
            ranking: RankingSettings::default(),
            database: DatabaseSettings {
                path: database_path.to_string(),
            },
            auth,
        }
    }
}
