use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::types::GateResponse;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// JSON body extractor whose rejection is the regular failure envelope
/// instead of axum's plain-text response.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<GateResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(body_rejection(rejection)),
        }
    }
}

fn body_rejection(rejection: JsonRejection) -> (StatusCode, Json<GateResponse>) {
    warn!(
        status = %rejection.status(),
        detail = %rejection.body_text(),
        "rejected request body"
    );
    (
        rejection.status(),
        Json(GateResponse {
            success: false,
            message: INVALID_BODY_MESSAGE.to_string(),
            chances: None,
        }),
    )
}
