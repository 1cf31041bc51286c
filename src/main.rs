use table_board::{router, storage, AppState, Config};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut data = storage::load_data(&config.data_path).await;
    if storage::seed_if_empty(&mut data, config.seed_tables) {
        storage::persist_data(&config.data_path, &data)
            .await
            .map_err(|err| err.message)?;
    }

    let addr = config.addr();
    let state = AppState::new(config.data_path, config.csrf_token, data);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
