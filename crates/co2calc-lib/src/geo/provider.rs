use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::GeocoderConfig;
use crate::coordinate::{Coordinate, PlaceKey};
use crate::error::{Error, Result};

/// External service that turns a place into a coordinate.
///
/// Implementations return [`Error::NotFound`] when the service answered but
/// had no match, and [`Error::Upstream`] (or [`Error::Http`]) for anything that
/// might succeed on a later attempt.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn geocode(&self, place: &PlaceKey) -> Result<Coordinate>;

    /// Short label used in logs.
    fn name(&self) -> &'static str {
        "geocoder"
    }
}

/// Nominatim (OpenStreetMap) search API client.
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    client: Client,
    base_url: String,
    country: String,
}

impl NominatimProvider {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl GeocodingProvider for NominatimProvider {
    async fn geocode(&self, place: &PlaceKey) -> Result<Coordinate> {
        let query = place.query(&self.country);
        debug!(query = %query, "querying nominatim");

        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(format!(
                "geocoding provider returned HTTP {status}"
            )));
        }

        let body = response.text().await?;
        parse_search_response(&query, &body)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Parse a Nominatim `/search` JSON body into the first hit's coordinate.
pub fn parse_search_response(query: &str, body: &str) -> Result<Coordinate> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)
        .map_err(|err| Error::upstream(format!("malformed geocoding response: {err}")))?;

    let first = hits.into_iter().next().ok_or_else(|| Error::NotFound {
        query: query.to_string(),
    })?;

    let latitude = parse_degrees(&first.lat, "lat")?;
    let longitude = parse_degrees(&first.lon, "lon")?;
    Coordinate::new(latitude, longitude).map_err(|_| {
        Error::upstream(format!(
            "geocoding provider returned out-of-range coordinate ({latitude}, {longitude})"
        ))
    })
}

fn parse_degrees(raw: &str, field: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::upstream(format!("geocoding provider returned invalid {field} '{raw}'")))
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(Error::Http)
}
