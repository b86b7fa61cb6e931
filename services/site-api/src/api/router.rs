use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use super::handlers;
use super::ApiState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn create_router(state: Arc<ApiState>) -> Router {
    // request id stays outermost so timeout responses carry it too
    let layers = ServiceBuilder::new()
        .layer(middleware::from_fn(set_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )));

    Router::new()
        .route(
            "/api/customer",
            get(handlers::customer_status).post(handlers::customer_consume),
        )
        .route(
            "/api/user",
            get(handlers::user_status).post(handlers::user_consume),
        )
        .route("/api/send-email", post(handlers::send_email))
        .route("/api/predict", post(handlers::predict_crop))
        .route("/api/monitor", post(handlers::monitor_crop))
        .route("/api/crop-info", post(handlers::crop_info))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(layers)
}

async fn set_request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
