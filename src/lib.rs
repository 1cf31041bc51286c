pub mod app;
pub mod card;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod toggle;
pub mod ui;

pub use app::router;
pub use card::{Occupancy, TableCard};
pub use client::{HttpTransport, ToggleTransport};
pub use config::Config;
pub use state::AppState;
pub use toggle::{Registration, TableToggleHandler, ToggleOptions};
