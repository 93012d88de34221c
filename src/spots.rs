//! Spot resolution
//!
//! Maps spot identifiers (names from the static spot table, explicit
//! coordinates, or free-text addresses) to [`SurfSpot`]s. Table lookups never
//! touch the network; only address lookups go through a [`Geocoder`].

use std::sync::Arc;

use tracing::debug;

use crate::error::SurfError;
use crate::models::{Coordinates, SurfSpot};
use crate::weather::Geocoder;
use crate::Result;

/// Built-in spots as (name, latitude, longitude), in display order
const BUILTIN_SPOTS: [(&str, f64, f64); 7] = [
    ("Bells Beach, Australia", -38.3667, 144.2833),
    ("Pipeline, Hawaii", 21.6641, -158.0533),
    ("Jeffreys Bay, South Africa", -34.0546, 24.9096),
    ("Teahupo'o, Tahiti", -17.8744, -149.2661),
    ("Mavericks, California", 37.4936, -122.4967),
    ("Cloudbreak, Fiji", -17.7542, 177.0954),
    ("Uluwatu, Bali", -8.8293, 115.0846),
];

/// Immutable table of named spots
#[derive(Debug, Clone)]
pub struct SpotTable {
    spots: Vec<SurfSpot>,
}

impl SpotTable {
    #[must_use]
    pub fn new(spots: Vec<SurfSpot>) -> Self {
        Self { spots }
    }

    /// The well-known spots offered by the UI
    pub fn builtin() -> Result<Self> {
        let spots = BUILTIN_SPOTS
            .iter()
            .map(|&(name, lat, lon)| Ok(SurfSpot::catalog(name, Coordinates::new(lat, lon)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(spots))
    }

    /// Exact match first, then case-insensitive on the trimmed name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SurfSpot> {
        self.spots.iter().find(|s| s.name == name).or_else(|| {
            let wanted = name.trim();
            self.spots
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(wanted))
        })
    }

    #[must_use]
    pub fn spots(&self) -> &[SurfSpot] {
        &self.spots
    }

    /// First entry; the UI's default selection
    #[must_use]
    pub fn default_spot(&self) -> Option<&SurfSpot> {
        self.spots.first()
    }
}

/// What the caller asked for
#[derive(Debug, Clone, PartialEq)]
pub enum SpotIdentifier {
    /// Name from the spot table
    Named(String),
    /// Explicit coordinates; always carries both values
    Custom(Coordinates),
    /// Free-text place, resolved through the geocoder
    Address(String),
}

impl SpotIdentifier {
    /// Explicit coordinates take precedence over the name
    #[must_use]
    pub fn new(name: &str, coordinates: Option<Coordinates>) -> Self {
        match coordinates {
            Some(coordinates) => Self::Custom(coordinates),
            None => Self::Named(name.to_string()),
        }
    }

    /// Build from raw latitude/longitude values, ignoring a lone value
    pub fn from_parts(name: &str, latitude: Option<f64>, longitude: Option<f64>) -> Result<Self> {
        let coordinates = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
            _ => None,
        };
        Ok(Self::new(name, coordinates))
    }

    /// Build from UI form text boxes, where empty means absent
    pub fn from_form(name: &str, latitude: Option<&str>, longitude: Option<&str>) -> Result<Self> {
        Self::from_parts(
            name,
            parse_form_number("latitude", latitude)?,
            parse_form_number("longitude", longitude)?,
        )
    }
}

fn parse_form_number(field: &str, text: Option<&str>) -> Result<Option<f64>> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| SurfError::invalid_input(format!("{field} must be a number, got: {value}"))),
    }
}

/// Service for resolving spot identifiers
#[derive(Clone)]
pub struct CoordinateResolver {
    table: Arc<SpotTable>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl CoordinateResolver {
    #[must_use]
    pub fn new(table: Arc<SpotTable>) -> Self {
        Self {
            table,
            geocoder: None,
        }
    }

    /// Enable address lookups
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    #[must_use]
    pub fn table(&self) -> &SpotTable {
        &self.table
    }

    /// Resolve a named or custom spot without any I/O
    pub fn resolve(&self, identifier: &SpotIdentifier) -> Result<SurfSpot> {
        debug!("Resolving spot identifier: {:?}", identifier);
        match identifier {
            SpotIdentifier::Custom(coordinates) => Ok(SurfSpot::custom(*coordinates)),
            SpotIdentifier::Named(name) => self
                .table
                .get(name)
                .cloned()
                .ok_or_else(|| SurfError::spot_not_found(name.clone())),
            SpotIdentifier::Address(address) => Err(SurfError::invalid_input(format!(
                "address '{address}' needs a geocoding lookup"
            ))),
        }
    }

    /// Resolve any identifier, geocoding addresses when needed
    pub async fn locate(&self, identifier: &SpotIdentifier) -> Result<SurfSpot> {
        match identifier {
            SpotIdentifier::Address(address) => self.resolve_address(address).await,
            other => self.resolve(other),
        }
    }

    /// Geocode a free-text address and use the best match
    pub async fn resolve_address(&self, address: &str) -> Result<SurfSpot> {
        let geocoder = self
            .geocoder
            .as_ref()
            .ok_or_else(|| SurfError::config("No geocoder configured for address lookups"))?;

        debug!("Geocoding address: {}", address);
        let candidate = geocoder
            .search(address, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SurfError::spot_not_found(address))?;

        let coordinates = Coordinates::new(candidate.latitude, candidate.longitude)?;
        debug!(
            "Found location: {} ({})",
            candidate.name,
            coordinates.format_coordinates()
        );
        Ok(SurfSpot::geocoded(candidate.display_name(), coordinates))
    }
}
