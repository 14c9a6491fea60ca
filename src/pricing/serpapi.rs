use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ServiceError;
use crate::pricing::{PriceSource, ShoppingResult};

pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    shopping_results: Vec<Value>,
}

/// Convert each listing on its own; a listing with unexpected field types is skipped
fn shopping_results(raw: Vec<Value>) -> Vec<ShoppingResult> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<ShoppingResult>(item) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!("Skipping shopping result {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// SerpApi Google Shopping search
pub struct SerpApiSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SerpApiSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl PriceSource for SerpApiSource {
    async fn search(&self, query: &str) -> Result<Vec<ShoppingResult>, ServiceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google_shopping"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let body: SearchResponse = response.json().await?;
        Ok(shopping_results(body.shopping_results))
    }

    fn name(&self) -> &str {
        "SerpApi"
    }
}
