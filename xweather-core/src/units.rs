//! Metric/imperial field selection.
//!
//! The API returns unit-dependent readings twice, under a metric-named and an
//! imperial-named key (`tempC`/`tempF`, `precipMM`/`precipIN`). Nothing here
//! converts values: the preference only selects which of the two
//! independently fetched fields a query reads, so one snapshot serves both
//! kinds of consumers.

use serde::{Deserialize, Serialize};

/// Host-wide measurement system preference, consulted at query time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Pick between a metric and an imperial alternative.
    pub fn select<T>(self, metric: T, imperial: T) -> T {
        match self {
            Units::Metric => metric,
            Units::Imperial => imperial,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown measurement system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Imperial counterpart of a metric field key, by suffix convention:
/// `tempC` -> `tempF`, `windSpeedMPS` -> `windSpeedMPH`,
/// `visibilityKM` -> `visibilityMI`, `precipMM` -> `precipIN`. Keys without
/// a metric suffix (`humidity`, `pop`, `windDirDEG`) come back unchanged.
pub fn imperial_field_key(key: &str) -> String {
    if key.contains('C') {
        key.replace('C', "F")
    } else if key.contains("MPS") {
        key.replace("MPS", "MPH")
    } else if key.contains("KM") {
        key.replace("KM", "MI")
    } else if key.contains("MM") {
        key.replace("MM", "IN")
    } else {
        key.to_string()
    }
}

/// Imperial counterpart of a metric unit label.
pub fn imperial_unit_label(unit: &str) -> &str {
    match unit {
        "°C" => "°F",
        "hPa" => "inHg",
        "m/s" => "mph",
        "km/h" => "mph",
        "mm" => "in",
        "cm" => "in",
        "km" => "mi",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imperial_field_key_maps_each_suffix() {
        assert_eq!(imperial_field_key("tempC"), "tempF");
        assert_eq!(imperial_field_key("feelslikeC"), "feelslikeF");
        assert_eq!(imperial_field_key("dewpointC"), "dewpointF");
        assert_eq!(imperial_field_key("windSpeedMPS"), "windSpeedMPH");
        assert_eq!(imperial_field_key("windGustMPS"), "windGustMPH");
        assert_eq!(imperial_field_key("visibilityKM"), "visibilityMI");
        assert_eq!(imperial_field_key("precipMM"), "precipIN");
    }

    #[test]
    fn imperial_field_key_leaves_unitless_keys_alone() {
        assert_eq!(imperial_field_key("humidity"), "humidity");
        assert_eq!(imperial_field_key("pop"), "pop");
        assert_eq!(imperial_field_key("windDirDEG"), "windDirDEG");
        assert_eq!(imperial_field_key("uvi"), "uvi");
        assert_eq!(imperial_field_key("solradWM2"), "solradWM2");
    }

    #[test]
    fn imperial_unit_label_pairs() {
        assert_eq!(imperial_unit_label("°C"), "°F");
        assert_eq!(imperial_unit_label("hPa"), "inHg");
        assert_eq!(imperial_unit_label("m/s"), "mph");
        assert_eq!(imperial_unit_label("km/h"), "mph");
        assert_eq!(imperial_unit_label("mm"), "in");
        assert_eq!(imperial_unit_label("cm"), "in");
        assert_eq!(imperial_unit_label("km"), "mi");
        assert_eq!(imperial_unit_label("%"), "%");
        assert_eq!(imperial_unit_label("W/m²"), "W/m²");
    }

    #[test]
    fn select_picks_by_preference() {
        assert_eq!(Units::Metric.select(1.0, 2.0), 1.0);
        assert_eq!(Units::Imperial.select(1.0, 2.0), 2.0);
    }

    #[test]
    fn parse_roundtrip() {
        for units in [Units::Metric, Units::Imperial] {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(units, parsed);
        }

        assert!(Units::try_from("nautical").is_err());
    }

    #[test]
    fn default_is_metric() {
        assert_eq!(Units::default(), Units::Metric);
    }
}
