use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::errors::ApiError;

/// The fixed field set a place result is normalized to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub position: Option<u32>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub category: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub cid: Option<String>,
}

/// Places search. Results are normalized to the `Place` field set;
/// entries that do not fit the shape are skipped.
pub async fn search_places(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    location: &str,
) -> Result<Value, ApiError> {
    let url = format!("{}/places", base_url.trim_end_matches('/'));
    let response = client
        .post(url)
        .header("X-API-KEY", api_key)
        .json(&json!({ "q": query, "location": location }))
        .send()
        .await
        .map_err(ApiError::upstream)?;

    if !response.status().is_success() {
        return Err(ApiError::Upstream(format!(
            "places search failed: {}",
            response.status()
        )));
    }

    let payload: Value = response.json().await.map_err(ApiError::upstream)?;
    let places: Vec<Place> = payload
        .get("places")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    Ok(json!({ "type": "places", "places": places }))
}

/// Shopping search. A non-success response is fatal for this call; the
/// router converts it into its error payload.
pub async fn go_shopping(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Value, ApiError> {
    let url = format!("{}/shopping", base_url.trim_end_matches('/'));
    let response = client
        .post(url)
        .header("X-API-KEY", api_key)
        .json(&json!({ "q": query }))
        .send()
        .await
        .map_err(ApiError::upstream)?;

    if !response.status().is_success() {
        return Err(ApiError::Upstream(format!(
            "shopping search failed: {}",
            response.status()
        )));
    }

    let payload: Value = response.json().await.map_err(ApiError::upstream)?;
    let shopping = payload.get("shopping").cloned().unwrap_or(Value::Null);

    Ok(json!({ "type": "shopping", "shopping": shopping }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_normalization_keeps_the_fixed_field_set() {
        let raw = json!({
            "position": 1,
            "title": "Sample Cafe",
            "address": "1 Main St",
            "latitude": 42.35,
            "longitude": -71.06,
            "rating": 4.6,
            "ratingCount": 120,
            "category": "Coffee shop",
            "phoneNumber": "+1 555 0100",
            "website": "https://sample.example",
            "cid": "123",
            "unrelated_extra": "dropped on reserialization"
        });

        let place: Place = serde_json::from_value(raw).expect("should deserialize");
        let out = serde_json::to_value(&place).expect("should serialize");
        assert_eq!(out["title"], "Sample Cafe");
        assert_eq!(out["ratingCount"], 120);
        assert!(out.get("unrelated_extra").is_none());
    }

    #[test]
    fn partial_place_entries_still_normalize() {
        let raw = json!({ "title": "Minimal", "address": "Nowhere 5" });
        let place: Place = serde_json::from_value(raw).expect("should deserialize");
        assert_eq!(place.title.as_deref(), Some("Minimal"));
        assert!(place.rating.is_none());
    }
}
