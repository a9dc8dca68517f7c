//! HTTP client for the OmniLuck luck-calculation endpoint.
//!
//! Wraps `POST /api/luck/calculate` using [`reqwest`] and extracts the
//! `personal_powerball` / `daily_powerballs` members of the response.

use std::time::Duration;

use async_trait::async_trait;
use omniluck_core::combination::LotteryNumbers;

use crate::source::{CombinationSource, LuckRequest, SourceError};

/// Path of the luck calculation endpoint, relative to the base URL.
pub const CALCULATE_PATH: &str = "/api/luck/calculate";

/// HTTP client for the remote luck service.
pub struct LuckApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl LuckApiClient {
    /// Create a client with a per-request timeout.
    ///
    /// * `base_url` - e.g. `https://omniluck-backend.onrender.com`. A
    ///   trailing slash is ignored.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn calculate_url(&self) -> String {
        format!("{}{CALCULATE_PATH}", self.base_url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or return a
    /// [`SourceError::Api`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SourceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Pull the lottery numbers out of a full luck-calculation response body.
///
/// A missing or `null` `personal_powerball` is [`SourceError::MissingNumbers`];
/// any shape violation is [`SourceError::InvalidPayload`].
pub fn extract_numbers(body: serde_json::Value) -> Result<LotteryNumbers, SourceError> {
    match body.get("personal_powerball") {
        None | Some(serde_json::Value::Null) => return Err(SourceError::MissingNumbers),
        Some(_) => {}
    }
    serde_json::from_value(body).map_err(SourceError::InvalidPayload)
}

#[async_trait]
impl CombinationSource for LuckApiClient {
    async fn fetch(&self, request: &LuckRequest) -> Result<LotteryNumbers, SourceError> {
        let response = self
            .client
            .post(self.calculate_url())
            .json(request)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body: serde_json::Value = response.json().await?;
        extract_numbers(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn combo(white: [u8; 5], pb: u8) -> serde_json::Value {
        json!({ "white_balls": white, "powerball": pb, "type": "daily" })
    }

    #[test]
    fn extracts_numbers_from_full_response() {
        let body = json!({
            "luck_score": 72,
            "explanation": "The stars are aligned.",
            "personal_powerball": combo([5, 12, 33, 41, 60], 9),
            "daily_powerballs": [combo([1, 2, 3, 4, 5], 6), combo([7, 8, 9, 10, 11], 12)]
        });
        let numbers = extract_numbers(body).unwrap();
        assert_eq!(numbers.personal_powerball.powerball(), 9);
        assert_eq!(numbers.daily_powerballs.len(), 2);
    }

    #[test]
    fn missing_personal_combination_is_reported() {
        assert_matches!(
            extract_numbers(json!({ "luck_score": 50 })),
            Err(SourceError::MissingNumbers)
        );
        assert_matches!(
            extract_numbers(json!({ "personal_powerball": null })),
            Err(SourceError::MissingNumbers)
        );
    }

    #[test]
    fn malformed_combination_is_invalid_payload() {
        let body = json!({ "personal_powerball": combo([1, 1, 2, 3, 4], 9) });
        assert_matches!(extract_numbers(body), Err(SourceError::InvalidPayload(_)));
    }

    #[test]
    fn calculate_url_ignores_trailing_slash() {
        let client = LuckApiClient::with_client(reqwest::Client::new(), "http://localhost:8000/");
        assert_eq!(client.calculate_url(), "http://localhost:8000/api/luck/calculate");
    }
}
