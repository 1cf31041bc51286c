use crate::errors::AppError;
use crate::models::BoardData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> BoardData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                BoardData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BoardData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            BoardData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &BoardData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Fills an empty board with free tables numbered `1..=count`. Returns
/// whether anything was added.
pub fn seed_if_empty(data: &mut BoardData, count: u32) -> bool {
    if !data.tables.is_empty() || count == 0 {
        return false;
    }
    for _ in 0..count {
        data.add_table();
    }
    info!(tables = count, "seeded empty board");
    true
}
