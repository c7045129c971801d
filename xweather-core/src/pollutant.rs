//! Pollutant key canonicalization and record normalization.

use crate::model::{PayloadRecord, Pollutant};

/// Alias table for the six pollutants the API reports, keyed by the
/// punctuation-stripped lowercase form.
const POLLUTANT_ALIASES: &[(&str, &str)] = &[
    ("o3", "o3"),
    ("pm25", "pm25"),
    ("pm10", "pm10"),
    ("co", "co"),
    ("no2", "no2"),
    ("so2", "so2"),
];

/// Canonical form of a pollutant identifier: `.` and spaces stripped,
/// lowercased, then mapped through the alias table. `"PM2.5"`, `"pm 2.5"`
/// and `"PM25"` all canonicalize to `"pm25"`; unrecognized identifiers pass
/// through stripped and lowercased.
pub fn canonical_key(raw: &str) -> String {
    let stripped = raw.replace(['.', ' '], "").to_lowercase();
    match POLLUTANT_ALIASES.iter().find(|(alias, _)| *alias == stripped) {
        Some((_, canonical)) => (*canonical).to_string(),
        None => stripped,
    }
}

/// Raw identifier of a pollutant record: a non-empty `type` field as-is,
/// else the lowercased `name`, else an empty string.
pub fn raw_key(record: &Pollutant) -> String {
    match record.kind.as_deref() {
        Some(kind) if !kind.is_empty() => kind.to_string(),
        _ => record.name.as_deref().unwrap_or_default().to_lowercase(),
    }
}

/// Attach canonical keys to a pollutant list; pure and order-preserving.
///
/// Records with no usable identifier keep an empty key and stay in the list,
/// so availability checks can skip them without renumbering.
pub fn normalize(records: Vec<Pollutant>) -> Vec<Pollutant> {
    records
        .into_iter()
        .map(|mut record| {
            record.canonical_key = canonical_key(&raw_key(&record));
            record
        })
        .collect()
}

/// Run [`normalize`] over every period of an air-quality payload.
pub fn normalize_payload(payload: &mut PayloadRecord) {
    for period in &mut payload.periods {
        period.pollutants = normalize(std::mem::take(&mut period.pollutants));
    }
}

/// Resolved concentration of a pollutant record.
///
/// Candidate fields are tried in order: `valueUGM3`, `concentrationUGM3`,
/// `value`. The first one that is present and not exactly zero wins; a
/// record whose candidates are all absent or zero resolves to `None`.
pub fn concentration(record: &Pollutant) -> Option<f64> {
    [record.value_ugm3, record.concentration_ugm3, record.value]
        .into_iter()
        .flatten()
        .find(|v| *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pollutant(value: serde_json::Value) -> Pollutant {
        serde_json::from_value(value).expect("pollutant should deserialize")
    }

    #[test]
    fn canonical_key_is_case_and_punctuation_insensitive() {
        assert_eq!(canonical_key("PM2.5"), "pm25");
        assert_eq!(canonical_key("pm 2.5"), "pm25");
        assert_eq!(canonical_key("PM25"), "pm25");
        assert_eq!(canonical_key("pm25"), "pm25");
        assert_eq!(canonical_key("O3"), "o3");
        assert_eq!(canonical_key("no2"), "no2");
    }

    #[test]
    fn canonical_key_is_idempotent() {
        for raw in ["PM2.5", "pm 10", "CO", "so2", "radon"] {
            let once = canonical_key(raw);
            assert_eq!(canonical_key(&once), once);
        }
    }

    #[test]
    fn unrecognized_keys_pass_through_canonicalized() {
        assert_eq!(canonical_key("Radon 222"), "radon222");
        assert_eq!(canonical_key(""), "");
    }

    #[test]
    fn raw_key_prefers_nonempty_type_then_name() {
        assert_eq!(
            raw_key(&pollutant(json!({ "type": "PM2.5", "name": "fine dust" }))),
            "PM2.5"
        );
        assert_eq!(raw_key(&pollutant(json!({ "type": "", "name": "OZONE" }))), "ozone");
        assert_eq!(raw_key(&pollutant(json!({ "name": "OZONE" }))), "ozone");
        assert_eq!(raw_key(&pollutant(json!({ "value": 1.0 }))), "");
    }

    #[test]
    fn normalize_attaches_keys_and_preserves_order() {
        let records = vec![
            pollutant(json!({ "type": "PM2.5", "valueUGM3": 12.3 })),
            pollutant(json!({ "name": "O3", "value": 48.0 })),
            pollutant(json!({ "value": 1.0 })),
        ];

        let normalized = normalize(records);

        let keys: Vec<&str> = normalized.iter().map(|p| p.canonical_key.as_str()).collect();
        assert_eq!(keys, ["pm25", "o3", ""]);
        // Original fields survive normalization.
        assert_eq!(normalized[0].kind.as_deref(), Some("PM2.5"));
        assert_eq!(normalized[0].value_ugm3, Some(12.3));
    }

    #[test]
    fn normalize_payload_covers_every_period() {
        let mut payload: PayloadRecord = serde_json::from_value(json!({
            "periods": [
                { "pollutants": [{ "type": "PM2.5", "valueUGM3": 12.3 }] },
                { "pollutants": [{ "type": "SO2", "valueUGM3": 3.0 }] }
            ]
        }))
        .expect("payload should deserialize");

        normalize_payload(&mut payload);

        assert_eq!(payload.periods[0].pollutants[0].canonical_key, "pm25");
        assert_eq!(payload.periods[1].pollutants[0].canonical_key, "so2");
    }

    #[test]
    fn concentration_prefers_micrograms_field() {
        let pol = pollutant(json!({
            "type": "PM2.5",
            "valueUGM3": 12.3,
            "concentrationUGM3": 99.0,
            "value": 7.0
        }));
        assert_eq!(concentration(&pol), Some(12.3));
    }

    #[test]
    fn concentration_falls_back_in_order() {
        let pol = pollutant(json!({ "type": "O3", "concentrationUGM3": 48.0, "value": 7.0 }));
        assert_eq!(concentration(&pol), Some(48.0));

        let pol = pollutant(json!({ "type": "O3", "value": 7.0 }));
        assert_eq!(concentration(&pol), Some(7.0));
    }

    #[test]
    fn zero_falls_through_to_the_next_candidate() {
        let pol = pollutant(json!({ "type": "CO", "valueUGM3": 0.0, "value": 0.4 }));
        assert_eq!(concentration(&pol), Some(0.4));
    }

    #[test]
    fn all_absent_or_zero_resolves_unavailable() {
        assert_eq!(concentration(&pollutant(json!({ "type": "CO" }))), None);
        assert_eq!(
            concentration(&pollutant(json!({
                "type": "CO",
                "valueUGM3": 0.0,
                "concentrationUGM3": 0.0,
                "value": 0.0
            }))),
            None
        );
        assert_eq!(
            concentration(&pollutant(json!({ "type": "CO", "valueUGM3": null }))),
            None
        );
    }
}
