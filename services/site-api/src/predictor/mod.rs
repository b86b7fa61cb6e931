pub mod client;
pub mod error;
pub mod types;

pub use client::InferenceClient;
pub use error::InferenceError;
pub use types::{CropInfoInput, MonitoringInput, PredictionInput, RequiredFields};
