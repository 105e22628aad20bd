use tracing::info;

/// Server configuration, loaded from the environment with sensible local
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        let config = Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            db_path: std::env::var("STYLESYNC_DB_PATH").ok(),
        };
        info!("Config loaded (port {})", config.port);
        config
    }
}
