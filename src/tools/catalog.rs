use super::{ArgumentSpec, ArgumentType, ToolDescriptor};

/// The closed set of tools the dispatcher can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    WeatherForecast,
    SpotInfo,
    SpotCoordinates,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::WeatherForecast,
        ToolKind::SpotInfo,
        ToolKind::SpotCoordinates,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::WeatherForecast => "get_weather_forecast",
            ToolKind::SpotInfo => "search_surf_spot_info",
            ToolKind::SpotCoordinates => "get_spot_coordinates",
        }
    }

    fn descriptor(self) -> ToolDescriptor {
        let (description, argument_schema) = match self {
            ToolKind::WeatherForecast => (
                "Get marine weather forecast including swell, wind, and tide data for coordinates",
                vec![
                    ("latitude", number("Latitude of the surf spot")),
                    ("longitude", number("Longitude of the surf spot")),
                ],
            ),
            ToolKind::SpotInfo => (
                "Search for information about a surf spot including optimal conditions",
                vec![
                    ("spot_name", string("Name of the surf spot", true)),
                    ("location", string("General location/region of the spot", false)),
                ],
            ),
            ToolKind::SpotCoordinates => (
                "Get GPS coordinates for a surf spot",
                vec![
                    ("spot_name", string("Name of the surf spot", true)),
                    ("location", string("Location or region", false)),
                ],
            ),
        };
        ToolDescriptor {
            name: self.name(),
            description,
            argument_schema,
            kind: self,
        }
    }
}

fn number(description: &'static str) -> ArgumentSpec {
    ArgumentSpec {
        kind: ArgumentType::Number,
        required: true,
        description,
    }
}

fn string(description: &'static str, required: bool) -> ArgumentSpec {
    ArgumentSpec {
        kind: ArgumentType::String,
        required,
        description,
    }
}

/// Immutable list of tool descriptors, built once at startup
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// All tools in advertised order
    #[must_use]
    pub fn standard() -> Self {
        Self {
            descriptors: ToolKind::ALL.iter().map(|kind| kind.descriptor()).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    #[must_use]
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }
}
