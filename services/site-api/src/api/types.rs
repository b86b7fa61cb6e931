use serde::{Deserialize, Serialize};

/// Envelope shared by the quota routes and every failure the predictor
/// routes report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chances: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub prediction: String,
    pub chances: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReportResponse {
    pub success: bool,
    pub report: String,
    pub chances: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropInfoResponse {
    pub success: bool,
    pub crop_info: String,
    pub chances: u32,
}
