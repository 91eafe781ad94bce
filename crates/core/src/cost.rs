use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{KartochkiError, Result};
use crate::types::Chunk;

/// Advisory billable-unit counting. Results only ever feed log lines and
/// never influence what the service returns.
#[async_trait]
pub trait CostEstimator: Send + Sync {
    async fn billable_units(&self, text: &str) -> Result<u64>;
}

/// Counts tokens through the Gemini `countTokens` endpoint.
pub struct GeminiCostEstimator {
    client: reqwest::Client,
    model: String,
}

impl GeminiCostEstimator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
        }
    }
}

impl Default for GeminiCostEstimator {
    fn default() -> Self {
        Self::new("gemini-3-pro")
    }
}

#[async_trait]
impl CostEstimator for GeminiCostEstimator {
    async fn billable_units(&self, text: &str) -> Result<u64> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            KartochkiError::MissingApiKey {
                env_var: "GEMINI_API_KEY".to_string(),
            }
        })?;

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:countTokens?key={}",
            self.model, api_key,
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&json!({
                "contents": [{"parts": [{"text": text}]}],
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        response["totalTokens"]
            .as_u64()
            .ok_or_else(|| KartochkiError::ModelResponse {
                reason: format!("no totalTokens in countTokens response: {:?}", response),
            })
    }
}

/// Totals billable units across all chunks and logs the count.
///
/// Estimation is advisory: any failure is logged at warn level and swallowed
/// so the analysis pipeline carries on regardless.
pub async fn total_billable_units(
    chunks: &[Chunk],
    estimator: &dyn CostEstimator,
) -> Option<u64> {
    info!(chunks = chunks.len(), "counting total billable units");

    let mut total = 0;
    for chunk in chunks {
        match estimator.billable_units(&chunk.content).await {
            Ok(units) => total += units,
            Err(err) => {
                warn!(position = chunk.position, error = %err, "billable unit count failed");
                return None;
            }
        }
    }

    info!(total_billable_units = total, "billable unit count complete");
    Some(total)
}
