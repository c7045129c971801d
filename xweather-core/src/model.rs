use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Named section of a [`Snapshot`], one per API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Conditions,
    AirQuality,
    ForecastHourly,
    ForecastDaily,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Conditions => "conditions",
            Section::AirQuality => "airquality",
            Section::ForecastHourly => "forecast_hourly",
            Section::ForecastDaily => "forecast_daily",
        }
    }

    pub const fn all() -> &'static [Section] {
        &[
            Section::Conditions,
            Section::AirQuality,
            Section::ForecastHourly,
            Section::ForecastDaily,
        ]
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped reading within a section.
///
/// Fields are sparse: the API omits keys it has no data for, and a key may
/// also be present with an explicit `null`. [`Period::get`] preserves that
/// distinction; the typed accessors treat both as "no value".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Period {
    /// Pollutant rows; only air-quality periods carry them.
    #[serde(default)]
    pub pollutants: Vec<Pollutant>,

    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Period {
    /// Raw field lookup. `None` means the key is absent; `Some(Value::Null)`
    /// means it is present with an explicit `null`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Day/night flag; periods without one count as day.
    pub fn is_day(&self) -> bool {
        self.flag("isDay").unwrap_or(true)
    }

    /// Timestamp of the reading, parsed from `dateTimeISO`.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.text("dateTimeISO")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

/// One endpoint payload: the first element of the API's `response` array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PayloadRecord {
    #[serde(default)]
    pub periods: Vec<Period>,

    /// Envelope fields other than `periods` (profile, location, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row within an air-quality period's pollutant list.
///
/// The raw `type`/`name` identifiers vary in case and punctuation across
/// payloads (`"PM2.5"`, `"pm25"`, `"pm 2.5"`); [`crate::pollutant::normalize`]
/// attaches the canonical key without touching the original fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Pollutant {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,

    #[serde(rename = "valueUGM3")]
    pub value_ugm3: Option<f64>,
    #[serde(rename = "concentrationUGM3")]
    pub concentration_ugm3: Option<f64>,
    pub value: Option<f64>,

    /// Canonical lowercase key; empty until normalization has run, or when
    /// the record carries no usable identifier.
    #[serde(skip)]
    pub canonical_key: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Immutable aggregate of the four endpoint payloads from one successful
/// refresh cycle.
///
/// A snapshot is either fully populated or never produced: a failed cycle
/// leaves the previously published snapshot in place. Shared as
/// `Arc<Snapshot>` and superseded by the next successful cycle, never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub conditions: PayloadRecord,
    pub airquality: PayloadRecord,
    pub forecast_hourly: PayloadRecord,
    pub forecast_daily: PayloadRecord,
}

impl Snapshot {
    pub fn section(&self, section: Section) -> &PayloadRecord {
        match section {
            Section::Conditions => &self.conditions,
            Section::AirQuality => &self.airquality,
            Section::ForecastHourly => &self.forecast_hourly,
            Section::ForecastDaily => &self.forecast_daily,
        }
    }
}
