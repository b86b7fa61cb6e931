use serde::{Deserialize, Deserializer, Serialize};

/// Form payloads whose fields must all be present and non-blank before they
/// are forwarded to the inference service.
pub trait RequiredFields {
    fn fields(&self) -> Vec<(&'static str, &str)>;

    fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Soil and climate readings for crop prediction. Values stay textual, the
/// way the form submits them; numeric JSON is accepted and stringified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionInput {
    #[serde(default, deserialize_with = "string_or_number")]
    pub nitrogen: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phosphorus: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub potassium: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ph: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub temperature: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub humidity: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rainfall: String,
}

impl RequiredFields for PredictionInput {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("nitrogen", self.nitrogen.as_str()),
            ("phosphorus", self.phosphorus.as_str()),
            ("potassium", self.potassium.as_str()),
            ("ph", self.ph.as_str()),
            ("temperature", self.temperature.as_str()),
            ("humidity", self.humidity.as_str()),
            ("rainfall", self.rainfall.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringInput {
    #[serde(default, deserialize_with = "string_or_number")]
    pub nitrogen: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phosphorus: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub potassium: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ph: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub temperature: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub humidity: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub conductivity: String,
    #[serde(default, alias = "cropGrown")]
    pub crop: String,
}

impl RequiredFields for MonitoringInput {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("nitrogen", self.nitrogen.as_str()),
            ("phosphorus", self.phosphorus.as_str()),
            ("potassium", self.potassium.as_str()),
            ("ph", self.ph.as_str()),
            ("temperature", self.temperature.as_str()),
            ("humidity", self.humidity.as_str()),
            ("conductivity", self.conductivity.as_str()),
            ("crop", self.crop.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropInfoInput {
    #[serde(default)]
    pub predicted_crop: String,
}

impl RequiredFields for CropInfoInput {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![("predicted_crop", self.predicted_crop.as_str())]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PredictResponse {
    #[serde(rename = "Predicted Crop")]
    pub predicted_crop: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    pub crop_info: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    // null counts as blank so it is reported as a missing field
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
