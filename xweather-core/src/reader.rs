//! Point queries against published snapshots.
//!
//! Every query degrades the same way: a missing section, an empty or short
//! period list, or an absent field reads as `None` ("unavailable"), never as
//! an error. Unit-dependent fields are resolved at query time by selecting
//! between the metric-named and imperial-named key; nothing is converted.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tokio::sync::watch;

use crate::condition;
use crate::coordinator::Published;
use crate::model::{Period, Section, Snapshot};
use crate::pollutant;
use crate::units::{self, Units};

/// One standard reading: which section and field pair serve it, and how it
/// is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Stable identifier, used in entity naming.
    pub key: &'static str,
    /// Human-readable label.
    pub name: &'static str,
    pub section: Section,
    pub metric_key: &'static str,
    pub imperial_key: &'static str,
    pub metric_unit: &'static str,
    pub imperial_unit: &'static str,
}

impl FieldSpec {
    pub fn field_key(&self, units: Units) -> &'static str {
        units.select(self.metric_key, self.imperial_key)
    }

    pub fn unit(&self, units: Units) -> &'static str {
        units.select(self.metric_unit, self.imperial_unit)
    }
}

macro_rules! field {
    ($key:literal, $name:literal, $section:expr, $metric:literal / $imperial:literal, $munit:literal / $iunit:literal) => {
        FieldSpec {
            key: $key,
            name: $name,
            section: $section,
            metric_key: $metric,
            imperial_key: $imperial,
            metric_unit: $munit,
            imperial_unit: $iunit,
        }
    };
}

/// Readings served from `conditions.periods[0]`.
pub const CURRENT_FIELDS: &[FieldSpec] = &[
    field!("temp", "Temperature", Section::Conditions, "tempC" / "tempF", "°C" / "°F"),
    field!("feelslike", "Feels Like", Section::Conditions, "feelslikeC" / "feelslikeF", "°C" / "°F"),
    field!("dewpoint", "Dewpoint", Section::Conditions, "dewpointC" / "dewpointF", "°C" / "°F"),
    field!("humidity", "Humidity", Section::Conditions, "humidity" / "humidity", "%" / "%"),
    field!("pressure", "Pressure", Section::Conditions, "pressureMB" / "pressureIN", "hPa" / "inHg"),
    field!("wind_speed", "Wind Speed", Section::Conditions, "windSpeedMPS" / "windSpeedMPH", "m/s" / "mph"),
    field!("wind_gust", "Wind Gust Speed", Section::Conditions, "windGustMPS" / "windGustMPH", "m/s" / "mph"),
    field!("wind_dir", "Wind Direction", Section::Conditions, "windDirDEG" / "windDirDEG", "°" / "°"),
    field!("uvi", "UV Index", Section::Conditions, "uvi" / "uvi", "" / ""),
    field!("visibility", "Visibility", Section::Conditions, "visibilityKM" / "visibilityMI", "km" / "mi"),
    field!("precip", "Precipitation", Section::Conditions, "precipMM" / "precipIN", "mm" / "in"),
    field!("solrad", "Solar Radiation", Section::Conditions, "solradWM2" / "solradWM2", "W/m²" / "W/m²"),
];

/// Readings served from `forecast_daily.periods[offset]`.
pub const DAILY_FIELDS: &[FieldSpec] = &[
    field!("high_temp", "High Temperature", Section::ForecastDaily, "maxTempC" / "maxTempF", "°C" / "°F"),
    field!("low_temp", "Low Temperature", Section::ForecastDaily, "minTempC" / "minTempF", "°C" / "°F"),
    field!("avg_temp", "Average Temperature", Section::ForecastDaily, "avgTempC" / "avgTempF", "°C" / "°F"),
    field!("precip", "Precipitation", Section::ForecastDaily, "precipMM" / "precipIN", "mm" / "in"),
    field!("pop", "Precipitation Probability", Section::ForecastDaily, "pop" / "pop", "%" / "%"),
    field!("wind_speed", "Wind Speed", Section::ForecastDaily, "windSpeedKPH" / "windSpeedMPH", "km/h" / "mph"),
    field!("humidity", "Humidity", Section::ForecastDaily, "humidity" / "humidity", "%" / "%"),
    field!("snow", "Snowfall", Section::ForecastDaily, "snowCM" / "snowIN", "cm" / "in"),
    field!("sky", "Cloud Cover", Section::ForecastDaily, "sky" / "sky", "%" / "%"),
];

/// Look a standard field up by its stable key.
pub fn field_spec(section: Section, key: &str) -> Option<&'static FieldSpec> {
    let table = match section {
        Section::Conditions => CURRENT_FIELDS,
        Section::ForecastDaily => DAILY_FIELDS,
        _ => return None,
    };
    table.iter().find(|spec| spec.key == key)
}

/// Stable entity identifier: `xweather_<entry_id>_<field>`. Must not change
/// across restarts; downstream identity hangs off it.
pub fn unique_id(entry_id: &str, field: &str) -> String {
    format!("{}_{entry_id}_{field}", crate::DOMAIN)
}

/// Read half of a coordinator subscription.
///
/// Holds a watch receiver, so it always queries the latest published
/// snapshot; many readers can query concurrently, the snapshot itself is
/// immutable.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Published>,
}

impl SnapshotReader {
    pub fn new(rx: watch::Receiver<Published>) -> Self {
        Self { rx }
    }

    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.rx.borrow().snapshot.clone()
    }

    /// Whether any refresh cycle has published a snapshot yet.
    pub fn has_data(&self) -> bool {
        self.rx.borrow().snapshot.is_some()
    }

    /// Read one standard field of period `offset` in its section. Current
    /// conditions are offset 0 of [`CURRENT_FIELDS`] specs.
    pub fn value(&self, spec: &FieldSpec, offset: usize, units: Units) -> Option<f64> {
        let snapshot = self.snapshot()?;
        let period = snapshot.section(spec.section).periods.get(offset)?;
        period.number(spec.field_key(units))
    }

    /// Whether either of the spec's fields is populated for period `offset`.
    pub fn is_available(&self, spec: &FieldSpec, offset: usize) -> bool {
        self.value(spec, offset, Units::Metric).is_some()
            || self.value(spec, offset, Units::Imperial).is_some()
    }

    /// Read an ad-hoc field by its metric key, deriving the imperial key by
    /// suffix convention (`tempC` -> `tempF`).
    pub fn field_value(
        &self,
        section: Section,
        metric_key: &str,
        offset: usize,
        units: Units,
    ) -> Option<f64> {
        let snapshot = self.snapshot()?;
        let period = snapshot.section(section).periods.get(offset)?;
        match units {
            Units::Metric => period.number(metric_key),
            Units::Imperial => period.number(&units::imperial_field_key(metric_key)),
        }
    }

    /// Concentration of a pollutant in the current air-quality period. The
    /// query key is canonicalized, so `"PM2.5"`, `"pm 2.5"` and `"pm25"` are
    /// the same query.
    pub fn pollutant_concentration(&self, key: &str) -> Option<f64> {
        let snapshot = self.snapshot()?;
        let wanted = pollutant::canonical_key(key);
        snapshot
            .airquality
            .periods
            .first()?
            .pollutants
            .iter()
            .find(|p| !p.canonical_key.is_empty() && p.canonical_key == wanted)
            .and_then(pollutant::concentration)
    }

    pub fn aqi(&self) -> Option<f64> {
        let snapshot = self.snapshot()?;
        snapshot.airquality.periods.first()?.number("aqi")
    }

    pub fn aqi_category(&self) -> Option<String> {
        let snapshot = self.snapshot()?;
        let category = snapshot.airquality.periods.first()?.text("category")?;
        Some(category.to_string())
    }

    pub fn dominant_pollutant(&self) -> Option<String> {
        let snapshot = self.snapshot()?;
        let dominant = snapshot.airquality.periods.first()?.text("dominant")?;
        Some(dominant.to_string())
    }

    /// Decoded condition of the current conditions period.
    pub fn current_condition(&self) -> Option<&'static str> {
        self.condition_at(Section::Conditions, 0)
    }

    pub fn hourly_condition(&self, offset: usize) -> Option<&'static str> {
        self.condition_at(Section::ForecastHourly, offset)
    }

    pub fn daily_condition(&self, offset: usize) -> Option<&'static str> {
        self.condition_at(Section::ForecastDaily, offset)
    }

    fn condition_at(&self, section: Section, offset: usize) -> Option<&'static str> {
        let snapshot = self.snapshot()?;
        let period = snapshot.section(section).periods.get(offset)?;
        Some(period_condition(period))
    }

    /// Timestamp of a period, for labelling forecast entries.
    pub fn timestamp(&self, section: Section, offset: usize) -> Option<DateTime<FixedOffset>> {
        let snapshot = self.snapshot()?;
        snapshot.section(section).periods.get(offset)?.timestamp()
    }
}

fn period_condition(period: &Period) -> &'static str {
    let coded = period.text("weatherPrimaryCoded").unwrap_or("::CL");
    condition::condition_from_coded(coded, period.is_day())
}
