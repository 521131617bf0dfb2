//! Place search against a Nominatim server.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::GeocoderConfig;
use crate::search::geocoder::{Geocoder, SearchCandidate, SearchError, parse_degrees};

pub struct NominatimGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Full request URL for a (non-blank) query
    pub fn request_url(&self, query: &str) -> Result<reqwest::Url, SearchError> {
        let endpoint = format!("{}/search", self.config.endpoint.trim_end_matches('/'));
        let q = biased_query(query, &self.config.locality);
        let limit = self.config.limit.to_string();

        reqwest::Url::parse_with_params(
            &endpoint,
            &[
                ("q", q.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ],
        )
        .map_err(|e| SearchError::Endpoint(format!("{endpoint}: {e}")))
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchCandidate>, SearchError> {
        let url = self.request_url(query)?;
        tracing::debug!("searching {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        let body = response.bytes().await?;
        parse_response(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchCandidate>, SearchError>> + Send + 'a>> {
        Box::pin(async move {
            let query = query.trim();
            if query.is_empty() {
                return Ok(Vec::new());
            }
            self.fetch(query).await
        })
    }
}

fn biased_query(query: &str, locality: &str) -> String {
    let locality = locality.trim();
    if locality.is_empty() {
        query.to_string()
    } else {
        format!("{query}, {locality}")
    }
}

/// Turn a Nominatim JSON array into candidates.
///
/// Entries without a name are skipped; entries with unusable coordinates are
/// kept but cannot be selected.
pub fn parse_response(body: &[u8]) -> Result<Vec<SearchCandidate>, SearchError> {
    let places: Vec<Value> = serde_json::from_slice(body)?;

    Ok(places
        .iter()
        .enumerate()
        .filter_map(|(index, place)| {
            let Some(display_name) = place.get("display_name").and_then(Value::as_str) else {
                tracing::warn!("skipping search result {index} without a display name");
                return None;
            };

            let place_id = match place.get("place_id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => format!("result-{index}"),
            };

            let location = match (
                parse_degrees(place.get("lat")),
                parse_degrees(place.get("lon")),
            ) {
                (Some(lat), Some(lng)) => Some(metro_transit::Coordinate::new(lat, lng)),
                _ => {
                    tracing::warn!("search result {place_id} has unusable coordinates");
                    None
                }
            };

            Some(SearchCandidate {
                place_id: place_id.into(),
                display_name: display_name.into(),
                location,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metro_transit::Coordinate;

    #[test]
    fn test_parse_response() {
        let body = br#"[
            { "place_id": 123, "display_name": "Kankaria Lake, Ahmedabad", "lat": "23.0063", "lon": "72.6014" },
            { "place_id": "456", "display_name": "Broken Place", "lat": "", "lon": "72.6" },
            { "place_id": 789, "lat": "23.0", "lon": "72.6" },
            { "display_name": "Law Garden", "lat": "23.0265", "lon": "72.5581" }
        ]"#;

        let candidates = parse_response(body).unwrap();
        assert_eq!(candidates.len(), 3);

        assert_eq!(candidates[0].place_id.as_ref(), "123");
        assert_eq!(candidates[0].location, Some(Coordinate::new(23.0063, 72.6014)));

        assert_eq!(candidates[1].place_id.as_ref(), "456");
        assert!(!candidates[1].is_selectable());

        assert_eq!(candidates[2].display_name.as_ref(), "Law Garden");
        assert_eq!(candidates[2].place_id.as_ref(), "result-3");
    }

    #[test]
    fn test_parse_response_rejects_non_array() {
        assert!(matches!(
            parse_response(br#"{ "error": "rate limited" }"#),
            Err(SearchError::Decode(_))
        ));
        assert!(parse_response(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_request_url() {
        let geocoder = NominatimGeocoder::new(GeocoderConfig::default()).unwrap();
        let url = geocoder.request_url("Kankaria Lake").unwrap();

        assert_eq!(url.host_str(), Some("nominatim.openstreetmap.org"));
        assert_eq!(url.path(), "/search");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("q".into(), "Kankaria Lake, Ahmedabad, Gujarat, India".into())));
        assert!(pairs.contains(&("format".into(), "json".into())));
        assert!(pairs.contains(&("limit".into(), "5".into())));
        assert!(pairs.contains(&("addressdetails".into(), "1".into())));
    }

    #[test]
    fn test_biased_query_without_locality() {
        assert_eq!(biased_query("Paldi", "  "), "Paldi");
        assert_eq!(biased_query("Paldi", "Ahmedabad"), "Paldi, Ahmedabad");
    }

    #[tokio::test]
    async fn test_blank_query_skips_network() {
        // unroutable endpoint: any request would fail
        let geocoder = NominatimGeocoder::new(GeocoderConfig {
            endpoint: "http://127.0.0.1:9".into(),
            ..GeocoderConfig::default()
        })
        .unwrap();

        assert!(geocoder.search("   ").await.unwrap().is_empty());
    }
}
