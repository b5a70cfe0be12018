//! Plain stop record for callers that hand over JSON.
//!
//! Numeric columns are coerced: numbers and numeric strings are accepted,
//! anything else (absent, null, text) becomes `None`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::traits::Stop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub revenue: Option<f64>,
    pub vehicle_key: String,
}

impl StopRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        revenue: f64,
        vehicle_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            revenue: Some(revenue),
            vehicle_key: vehicle_key.into(),
        }
    }

    /// Parse a JSON array of stop records.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Stop for StopRecord {
    type Id = String;
    type VehicleKey = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    fn revenue(&self) -> f64 {
        self.revenue.filter(|value| value.is_finite()).unwrap_or(0.0)
    }

    fn vehicle_key(&self) -> &Self::VehicleKey {
        &self.vehicle_key
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(match value {
        Some(LenientNumber::Number(number)) => Some(number),
        Some(LenientNumber::Text(text)) => text.trim().parse::<f64>().ok(),
        Some(LenientNumber::Other(_)) | None => None,
    }
    .filter(|number| number.is_finite()))
}
