use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    http::StatusCode,
    Json,
};
use tracing::{error, warn};

use crate::gate::{GateError, QuotaDecision};
use crate::predictor::{
    CropInfoInput, InferenceError, MonitoringInput, PredictionInput, RequiredFields,
};

use super::extract::ApiJson;
use super::identity::client_identity;
use super::types::{
    CropInfoResponse, GateResponse, HealthReportResponse, PredictionResponse, SendEmailRequest,
    SendEmailResponse,
};
use super::{ApiState, GateEndpoint};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<GateResponse>)>;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub async fn customer_status(State(state): State<Arc<ApiState>>) -> ApiResult<GateResponse> {
    gate_status(&state.customers)
}

pub async fn customer_consume(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<GateResponse> {
    gate_consume(&state.customers, &headers)
}

pub async fn user_status(State(state): State<Arc<ApiState>>) -> ApiResult<GateResponse> {
    gate_status(&state.users)
}

pub async fn user_consume(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> ApiResult<GateResponse> {
    gate_consume(&state.users, &headers)
}

pub async fn send_email(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> (StatusCode, Json<SendEmailResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            error!(detail = %rejection.body_text(), "unreadable send-email body");
            return send_email_failure(&state);
        }
    };

    match state
        .notifier
        .notify(&request.name, &request.email, &request.message)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(SendEmailResponse {
                success: true,
                url: None,
            }),
        ),
        Err(_) => send_email_failure(&state),
    }
}

fn send_email_failure(state: &ApiState) -> (StatusCode, Json<SendEmailResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SendEmailResponse {
            success: false,
            url: Some(state.notifier.admin_address().to_string()),
        }),
    )
}

pub async fn predict_crop(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<PredictionInput>,
) -> ApiResult<PredictionResponse> {
    let decision = admit(&state.customers, &headers, &input)?;
    let prediction = state
        .inference
        .predict(&input)
        .await
        .map_err(|err| inference_failure(err, &decision))?;

    Ok(Json(PredictionResponse {
        success: true,
        prediction,
        chances: decision.remaining,
    }))
}

pub async fn monitor_crop(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<MonitoringInput>,
) -> ApiResult<HealthReportResponse> {
    let decision = admit(&state.customers, &headers, &input)?;
    let report = state
        .inference
        .analyze_health(&input)
        .await
        .map_err(|err| inference_failure(err, &decision))?;

    Ok(Json(HealthReportResponse {
        success: true,
        report,
        chances: decision.remaining,
    }))
}

pub async fn crop_info(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<CropInfoInput>,
) -> ApiResult<CropInfoResponse> {
    let decision = admit(&state.customers, &headers, &input)?;
    let crop_info = state
        .inference
        .generate_info(&input)
        .await
        .map_err(|err| inference_failure(err, &decision))?;

    Ok(Json(CropInfoResponse {
        success: true,
        crop_info,
        chances: decision.remaining,
    }))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "site-api"
    }))
}

fn gate_status(endpoint: &GateEndpoint) -> ApiResult<GateResponse> {
    endpoint
        .gate
        .status()
        .map_err(|err| gate_failure(endpoint, err))?;

    Ok(Json(GateResponse {
        success: true,
        message: format!("{} port is working", endpoint.gate.collection().label()),
        chances: None,
    }))
}

fn gate_consume(endpoint: &GateEndpoint, headers: &HeaderMap) -> ApiResult<GateResponse> {
    let decision = consume(endpoint, headers)?;
    Ok(Json(GateResponse {
        success: true,
        message: decision.message,
        chances: Some(decision.remaining),
    }))
}

fn consume(
    endpoint: &GateEndpoint,
    headers: &HeaderMap,
) -> Result<QuotaDecision, (StatusCode, Json<GateResponse>)> {
    let identity = client_identity(headers);
    endpoint
        .gate
        .check_and_consume(identity.as_deref())
        .map_err(|err| gate_failure(endpoint, err))
}

/// Validates the form before spending any allowance, then charges the caller.
fn admit<I: RequiredFields>(
    endpoint: &GateEndpoint,
    headers: &HeaderMap,
    input: &I,
) -> Result<QuotaDecision, (StatusCode, Json<GateResponse>)> {
    let missing = input.missing_fields();
    if !missing.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(GateResponse {
                success: false,
                message: format!("Please provide all values: missing {}", missing.join(", ")),
                chances: None,
            }),
        ));
    }

    consume(endpoint, headers)
}

fn gate_failure(endpoint: &GateEndpoint, err: GateError) -> (StatusCode, Json<GateResponse>) {
    match err {
        GateError::MissingIdentity => (
            StatusCode::BAD_REQUEST,
            Json(GateResponse {
                success: false,
                message: err.to_string(),
                chances: Some(0),
            }),
        ),
        GateError::QuotaExhausted { .. } => (
            endpoint.exhausted_status,
            Json(GateResponse {
                success: false,
                message: err.to_string(),
                chances: Some(0),
            }),
        ),
        GateError::StoreUnavailable(_) => internal_error(err),
    }
}

fn inference_failure(
    err: InferenceError,
    decision: &QuotaDecision,
) -> (StatusCode, Json<GateResponse>) {
    warn!(error = %err, "inference service call failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(GateResponse {
            success: false,
            message: "Failed to connect to the inference service".to_string(),
            chances: Some(decision.remaining),
        }),
    )
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<GateResponse>) {
    error!(error = %err, "site API internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(GateResponse {
            success: false,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            chances: None,
        }),
    )
}
