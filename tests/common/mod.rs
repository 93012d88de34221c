//! In-process fakes shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use surfreport::error::{Upstream, UpstreamError, UpstreamFailure};
use surfreport::report::ReportGenerator;
use surfreport::weather::{ForecastSource, GeocodingCandidate, Geocoder, RawMarinePayload, RawWindPayload};
use surfreport::{Coordinates, ForecastAggregator, Services, SurfError};

type Respond<P> = Box<dyn Fn(Coordinates) -> Result<P, UpstreamError> + Send + Sync>;

/// Forecast source answering each fetch from a closure over the coordinates
pub struct FakeSource<P> {
    service: Upstream,
    respond: Respond<P>,
    calls: AtomicUsize,
}

impl<P: Clone + Send + Sync + 'static> FakeSource<P> {
    /// Same canned result for every location
    pub fn new(service: Upstream, result: Result<P, UpstreamError>) -> Arc<Self> {
        Self::with(service, Box::new(move |_| result.clone()))
    }

    pub fn with(service: Upstream, respond: Respond<P>) -> Arc<Self> {
        Arc::new(Self {
            service,
            respond,
            calls: AtomicUsize::new(0),
        })
    }
}

impl<P> FakeSource<P> {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: Send + Sync + 'static> ForecastSource for FakeSource<P> {
    type Payload = P;

    fn upstream(&self) -> Upstream {
        self.service
    }

    async fn fetch(&self, coordinates: Coordinates) -> Result<P, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(coordinates)
    }
}

pub struct FakeGeocoder {
    result: Result<Vec<GeocodingCandidate>, UpstreamError>,
    queries: Mutex<Vec<(String, u8)>>,
}

impl FakeGeocoder {
    pub fn new(result: Result<Vec<GeocodingCandidate>, UpstreamError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(Ok(Vec::new()))
    }

    pub fn queries(&self) -> Vec<(String, u8)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, query: &str, count: u8) -> Result<Vec<GeocodingCandidate>, UpstreamError> {
        self.queries.lock().unwrap().push((query.to_string(), count));
        self.result.clone()
    }
}

/// Narrator recording every prompt it sees
pub struct FakeNarrator {
    result: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeNarrator {
    pub fn new(result: Result<&str, &str>) -> Arc<Self> {
        Arc::new(Self {
            result: result.map(str::to_string).map_err(str::to_string),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportGenerator for FakeNarrator {
    async fn generate(&self, prompt: &str) -> surfreport::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone().map_err(SurfError::report_generation)
    }
}

pub fn hour(i: usize) -> String {
    format!("2024-06-{:02}T{:02}:00", 1 + i / 24, i % 24)
}

pub fn marine_payload(hours: usize) -> RawMarinePayload {
    serde_json::from_value(json!({
        "latitude": -38.375,
        "longitude": 144.25,
        "current": {"time": hour(0), "wave_height": 1.8, "wave_direction": 225.0, "wave_period": 12.5},
        "hourly": {
            "time": (0..hours).map(hour).collect::<Vec<_>>(),
            "wave_height": (0..hours).map(|i| 1.0 + i as f64 / 10.0).collect::<Vec<_>>(),
            "swell_wave_height": (0..hours).map(|_| 1.2).collect::<Vec<_>>(),
        },
        "daily": {"time": ["2024-06-01"], "wave_height_max": [2.4]},
    }))
    .unwrap()
}

pub fn wind_payload(hours: usize) -> RawWindPayload {
    serde_json::from_value(json!({
        "current": {"time": hour(0), "wind_speed_10m": 14.0, "wind_direction_10m": 315.0},
        "hourly": {
            "time": (0..hours).map(hour).collect::<Vec<_>>(),
            "wind_speed_10m": (0..hours).map(|i| 10.0 + i as f64).collect::<Vec<_>>(),
            "wind_direction_10m": (0..hours).map(|_| 300.0).collect::<Vec<_>>(),
        },
    }))
    .unwrap()
}

/// Marine payload whose current wave height is the requested latitude
pub fn marine_payload_at(coordinates: Coordinates) -> RawMarinePayload {
    let mut payload = marine_payload(3);
    if let Some(current) = payload.current.as_mut() {
        current.wave_height = Some(coordinates.latitude());
    }
    payload
}

/// Wind payload whose current wind speed is the requested longitude
pub fn wind_payload_at(coordinates: Coordinates) -> RawWindPayload {
    let mut payload = wind_payload(3);
    if let Some(current) = payload.current.as_mut() {
        current.wind_speed = Some(coordinates.longitude());
    }
    payload
}

pub fn upstream_failure(service: Upstream, status: u16) -> UpstreamError {
    UpstreamError::new(service, UpstreamFailure::Status(status))
}

pub fn candidate(name: &str, latitude: f64, longitude: f64) -> GeocodingCandidate {
    GeocodingCandidate {
        name: name.to_string(),
        latitude,
        longitude,
        country: Some("Australia".to_string()),
        admin1: Some("Victoria".to_string()),
    }
}

/// Handles to the fakes behind a [`Services`] instance
pub struct Harness {
    pub services: Services,
    pub marine: Arc<FakeSource<RawMarinePayload>>,
    pub wind: Arc<FakeSource<RawWindPayload>>,
    pub geocoder: Arc<FakeGeocoder>,
}

pub struct HarnessBuilder {
    marine: Respond<RawMarinePayload>,
    wind: Respond<RawWindPayload>,
    geocoder: Arc<FakeGeocoder>,
    narrator: Option<Arc<FakeNarrator>>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            marine: Box::new(|_| Ok(marine_payload(30))),
            wind: Box::new(|_| Ok(wind_payload(30))),
            geocoder: FakeGeocoder::empty(),
            narrator: None,
        }
    }

    pub fn marine(mut self, result: Result<RawMarinePayload, UpstreamError>) -> Self {
        self.marine = Box::new(move |_| result.clone());
        self
    }

    pub fn wind(mut self, result: Result<RawWindPayload, UpstreamError>) -> Self {
        self.wind = Box::new(move |_| result.clone());
        self
    }

    /// Answer from the requested coordinates
    pub fn location_aware(mut self) -> Self {
        self.marine = Box::new(|coordinates| Ok(marine_payload_at(coordinates)));
        self.wind = Box::new(|coordinates| Ok(wind_payload_at(coordinates)));
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<FakeGeocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn narrator(mut self, narrator: Arc<FakeNarrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn build(self) -> Harness {
        let marine = FakeSource::with(Upstream::Marine, self.marine);
        let wind = FakeSource::with(Upstream::Wind, self.wind);
        let aggregator = ForecastAggregator::new(marine.clone(), wind.clone());
        let narrator = self.narrator.map(|n| n as Arc<dyn ReportGenerator>);
        let services = Services::assemble(aggregator, self.geocoder.clone(), narrator).unwrap();
        Harness {
            services,
            marine,
            wind,
            geocoder: self.geocoder,
        }
    }
}
