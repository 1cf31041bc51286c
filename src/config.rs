use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SEED_TABLES: u32 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub csrf_token: String,
    pub seed_tables: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let seed_tables = env::var("BOARD_SEED_TABLES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(DEFAULT_SEED_TABLES);

        let csrf_token = csrf_token_or_generate(env::var("BOARD_CSRF_TOKEN").ok());

        Self {
            port,
            data_path: resolve_data_path(),
            csrf_token,
            seed_tables,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

pub fn resolve_data_path() -> PathBuf {
    match env::var("APP_DATA_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("data/tables.json"),
    }
}

/// Surrounding whitespace never survives an HTTP header, so it is trimmed
/// here too.
fn csrf_token_or_generate(configured: Option<String>) -> String {
    configured
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(generate_csrf_token)
}

pub fn generate_csrf_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
