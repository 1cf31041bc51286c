use crate::card::Occupancy;
use crate::errors::ToggleError;
use crate::models::ToggleResponse;
use reqwest::{header::CONTENT_TYPE, Client};
use std::future::Future;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Sends one occupancy toggle for a table and reports the state the server
/// settled on.
pub trait ToggleTransport: Send + Sync + 'static {
    fn toggle(
        &self,
        table_id: &str,
        csrf_token: &str,
    ) -> impl Future<Output = Result<Occupancy, ToggleError>> + Send;
}

pub fn toggle_path(table_id: &str) -> String {
    format!("/toggle/{table_id}/")
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn toggle_url(&self, table_id: &str) -> String {
        format!("{}{}", self.base_url, toggle_path(table_id))
    }
}

impl ToggleTransport for HttpTransport {
    async fn toggle(&self, table_id: &str, csrf_token: &str) -> Result<Occupancy, ToggleError> {
        let response = self
            .client
            .post(self.toggle_url(table_id))
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, csrf_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ToggleError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        parse_toggle_response(&body)
    }
}

/// Validates a toggle answer; a body without `is_occupied` is rejected
/// rather than read as free.
pub fn parse_toggle_response(body: &[u8]) -> Result<Occupancy, ToggleError> {
    let parsed: ToggleResponse = serde_json::from_slice(body)?;
    parsed
        .is_occupied
        .map(Occupancy::from_occupied)
        .ok_or(ToggleError::MalformedResponse)
}
