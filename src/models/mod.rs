//! Data models for the surf report pipeline
//!
//! - Location: validated coordinates and surf spots
//! - Forecast: the normalized marine + wind forecast document

pub mod forecast;
pub mod location;

pub use forecast::{
    CurrentConditions, HourlyConditions, NormalizedForecast, SourceFailure, compass_point,
};
pub use location::{Coordinates, SpotKind, SurfSpot};
