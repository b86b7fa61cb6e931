use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::error::InferenceError;
use super::types::{
    CropInfoInput, GenerateResponse, MonitoringInput, PredictResponse, PredictionInput,
};

pub struct InferenceClient {
    http_client: Client,
    base_url: String,
}

impl InferenceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build inference client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the recommended crop name.
    pub async fn predict(&self, input: &PredictionInput) -> Result<String, InferenceError> {
        let response: PredictResponse = self.post_json("predict", input).await?;
        Ok(response.predicted_crop)
    }

    /// Returns the crop health report, usually markdown.
    pub async fn analyze_health(&self, input: &MonitoringInput) -> Result<String, InferenceError> {
        let bytes = self.post("health", input).await?;
        Ok(match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::String(report)) => report,
            Ok(other) => other.to_string(),
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    pub async fn generate_info(&self, input: &CropInfoInput) -> Result<String, InferenceError> {
        let payload = json!({ "predicted_crop": input.predicted_crop });
        let response: GenerateResponse = self.post_json("generate", &payload).await?;
        Ok(response.crop_info)
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, InferenceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.post(endpoint, body).await?;
        serde_json::from_slice(&bytes).map_err(|err| InferenceError::Decode(err.to_string()))
    }

    async fn post<B>(&self, endpoint: &str, body: &B) -> Result<Bytes, InferenceError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "calling inference service");

        let response = self.http_client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?)
    }
}
