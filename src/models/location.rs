//! Coordinates and surf spot models

use crate::error::SurfError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated latitude/longitude pair
///
/// Fields are private so a value can only be built through [`Coordinates::new`],
/// which enforces the valid ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct UncheckedCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<UncheckedCoordinates> for Coordinates {
    type Error = SurfError;

    fn try_from(value: UncheckedCoordinates) -> Result<Self, Self::Error> {
        Self::new(value.latitude, value.longitude)
    }
}

impl Coordinates {
    /// Create coordinates, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SurfError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SurfError::invalid_coordinates(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SurfError::invalid_coordinates(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°, {}°", self.latitude, self.longitude)
    }
}

/// Where a spot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotKind {
    /// Entry of the static spot table
    Catalog,
    /// Built from caller-supplied coordinates
    Custom,
    /// Found through the geocoding service
    Geocoded,
}

/// A named surf spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfSpot {
    pub name: String,
    pub coordinates: Coordinates,
    pub kind: SpotKind,
}

impl SurfSpot {
    #[must_use]
    pub fn catalog(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
            kind: SpotKind::Catalog,
        }
    }

    /// A spot synthesized from explicit coordinates
    #[must_use]
    pub fn custom(coordinates: Coordinates) -> Self {
        Self {
            name: "Custom Location".to_string(),
            coordinates,
            kind: SpotKind::Custom,
        }
    }

    #[must_use]
    pub fn geocoded(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
            kind: SpotKind::Geocoded,
        }
    }

    /// Human-readable label used in reports
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            SpotKind::Custom => format!("{}: {}", self.name, self.coordinates),
            SpotKind::Catalog | SpotKind::Geocoded => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-90.5, 0.0)]
    #[case(0.0, 180.1)]
    #[case(0.0, -181.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn test_out_of_range_coordinates_rejected(#[case] lat: f64, #[case] lon: f64) {
        let result = Coordinates::new(lat, lon);
        assert!(matches!(result, Err(SurfError::InvalidCoordinates { .. })));
    }

    #[test]
    fn test_boundaries_accepted() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinates =
            serde_json::from_str(r#"{"latitude": -38.3667, "longitude": 144.2833}"#).unwrap();
        assert_eq!(ok.latitude(), -38.3667);

        let bad = serde_json::from_str::<Coordinates>(r#"{"latitude": 120.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_custom_spot_label() {
        let spot = SurfSpot::custom(Coordinates::new(-38.3667, 144.2833).unwrap());
        assert_eq!(spot.label(), "Custom Location: -38.3667°, 144.2833°");
        assert_eq!(spot.kind, SpotKind::Custom);
    }

    #[test]
    fn test_format_coordinates() {
        let coordinates = Coordinates::new(21.664_123, -158.053_349).unwrap();
        assert_eq!(coordinates.format_coordinates(), "21.6641, -158.0533");
    }
}
