//! Address geocoding for job sites.
//!
//! Jobs can be created with an address only; we resolve it to
//! coordinates through a `Geocoder` so the GPS compliance report has a
//! site location to measure against. Resolution failure is never fatal:
//! the job saves with null coordinates and its sessions classify as
//! unknown until coordinates arrive.

use rocket::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coord;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding response malformed: {0}")]
    Malformed(String),
}

/// Seam for address resolution. Managed as Rocket state so tests swap
/// in a fixed resolver and never touch the network.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the service answered but found no match.
    async fn geocode(&self, address: &str) -> Result<Option<Coord>, GeocodeError>;
}

/// OpenStreetMap Nominatim search API.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self::with_base_url("https://nominatim.openstreetmap.org".to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        NominatimGeocoder {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coord>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let hits: Vec<NominatimHit> = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            // Nominatim's usage policy requires an identifying agent.
            .header(reqwest::header::USER_AGENT, "crewtime/1.0")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let latitude: f64 = hit
            .lat
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("bad latitude: {}", hit.lat)))?;
        let longitude: f64 = hit
            .lon
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("bad longitude: {}", hit.lon)))?;

        Ok(Some(Coord::new(latitude, longitude)))
    }
}

/// Deterministic resolver for tests and offline development: returns
/// the same coordinate for every address.
pub struct FixedGeocoder {
    pub coord: Option<Coord>,
}

impl FixedGeocoder {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        FixedGeocoder {
            coord: Some(Coord::new(latitude, longitude)),
        }
    }

    pub fn unresolvable() -> Self {
        FixedGeocoder { coord: None }
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coord>, GeocodeError> {
        Ok(self.coord)
    }
}
