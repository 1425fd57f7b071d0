use schemars::JsonSchema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::constants::NOT_AVAILABLE;

// ============================================================================
// Weather Element Vocabulary
// ============================================================================

/// The weather elements the provider publishes that get their own display column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    WeatherDescription,
    MaxTemperature,
    MinTemperature,
    PoP12h,
}

/// Provider element name to element kind
const ELEMENT_NAMES: [(&str, ElementKind); 4] = [
    ("天氣預報綜合描述", ElementKind::WeatherDescription),
    ("最高溫度", ElementKind::MaxTemperature),
    ("最低溫度", ElementKind::MinTemperature),
    ("12小時降雨機率", ElementKind::PoP12h),
];

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::WeatherDescription,
        ElementKind::MaxTemperature,
        ElementKind::MinTemperature,
        ElementKind::PoP12h,
    ];

    pub fn from_element_name(name: &str) -> Option<Self> {
        ELEMENT_NAMES
            .iter()
            .find(|(element_name, _)| *element_name == name)
            .map(|(_, kind)| *kind)
    }

    /// Column label used in normalized records
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::WeatherDescription => "WeatherDescription",
            ElementKind::MaxTemperature => "MaxTemperature",
            ElementKind::MinTemperature => "MinTemperature",
            ElementKind::PoP12h => "PoP12h",
        }
    }

    /// Key holding the value inside an `ElementValue` entry
    pub fn value_key(self) -> &'static str {
        match self {
            ElementKind::WeatherDescription => "WeatherDescription",
            ElementKind::MaxTemperature => "MaxTemperature",
            ElementKind::MinTemperature => "MinTemperature",
            ElementKind::PoP12h => "ProbabilityOfPrecipitation",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            ElementKind::WeatherDescription => None,
            ElementKind::MaxTemperature | ElementKind::MinTemperature => Some("\u{00b0}C"),
            ElementKind::PoP12h => Some("%"),
        }
    }
}

/// Translates a provider element name to its display label.
/// Names outside the known vocabulary pass through unchanged.
pub fn display_label(element_name: &str) -> &str {
    match ElementKind::from_element_name(element_name) {
        Some(kind) => kind.label(),
        None => element_name,
    }
}

// ============================================================================
// Normalization Options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSelector {
    /// Location entry whose name matches exactly
    Exact(String),
    /// First location entry in traversal order
    First,
}

impl LocationSelector {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(name) => LocationSelector::Exact(name.to_string()),
            None => LocationSelector::First,
        }
    }

    pub fn requested(&self) -> Option<&str> {
        match self {
            LocationSelector::Exact(name) => Some(name),
            LocationSelector::First => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueFormat {
    /// Provider text as published
    Raw,
    /// Numeric values carry their unit suffix
    #[default]
    WithUnits,
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub selector: LocationSelector,
    pub value_format: ValueFormat,
    /// Display columns every record carries, in output order
    pub columns: Vec<String>,
}

impl NormalizeOptions {
    pub fn new(selector: LocationSelector) -> Self {
        Self {
            selector,
            value_format: ValueFormat::default(),
            columns: default_columns(),
        }
    }

    pub fn with_value_format(mut self, value_format: ValueFormat) -> Self {
        self.value_format = value_format;
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

pub fn default_columns() -> Vec<String> {
    ElementKind::ALL
        .iter()
        .map(|kind| kind.label().to_string())
        .collect()
}

// ============================================================================
// Normalized Output
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub column: String,
    pub value: String,
}

/// One forecast interval, flattened for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRecord {
    pub start_time: String,
    pub end_time: String,
    /// `MM/DD HH:MM - HH:MM`
    pub time_span: String,
    pub fields: Vec<Field>,
}

impl ForecastRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.column == column)
            .map(|field| field.value.as_str())
    }

    /// Value for the column, or the not-available marker
    pub fn value_or_na(&self, column: &str) -> &str {
        self.get(column).unwrap_or(NOT_AVAILABLE)
    }
}

/// Serializes as one flat object: `StartTime`, `EndTime`, `TimeSpan`, then each column
impl Serialize for ForecastRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.fields.len()))?;
        map.serialize_entry("StartTime", &self.start_time)?;
        map.serialize_entry("EndTime", &self.end_time)?;
        map.serialize_entry("TimeSpan", &self.time_span)?;
        for field in &self.fields {
            map.serialize_entry(&field.column, &field.value)?;
        }
        map.end()
    }
}

/// Records for the location entry the selector chose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedForecast {
    /// `LocationName` of the selected entry
    pub location: String,
    pub records: Vec<ForecastRecord>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Table,
    Csv,
    Json,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetForecastRequest {
    /// Exact location name as published by the provider, e.g. 雲林縣
    pub location: Option<String>,
    pub format: Option<OutputFormat>,
    /// Publish values as the provider wrote them, without unit suffixes
    pub raw: Option<bool>,
    /// Columns to include; element names outside the default four are accepted
    pub columns: Option<Vec<String>>,
}
