//! Condition strings derived from the API's coded weather values.

/// Decode a `category:subcategory:code` weather string into a condition
/// name.
///
/// Only the final segment selects from the code table; clear (`CL`) and
/// scattered-cloud (`SC`) codes switch to a night variant when the period's
/// day flag is off. Unknown codes read as `"cloudy"`.
pub fn condition_from_coded(coded: &str, is_day: bool) -> &'static str {
    let code = coded.rsplit(':').next().unwrap_or("CL");
    let key = match (code, is_day) {
        ("CL", false) => "CL-N",
        ("SC", false) => "SC-N",
        _ => code,
    };
    condition_for_code(key).unwrap_or("cloudy")
}

fn condition_for_code(code: &str) -> Option<&'static str> {
    let condition = match code {
        // Cloud cover
        "CL" => "sunny",
        "CL-N" => "clear-night",
        "FW" => "partlycloudy",
        "SC" => "partlycloudy",
        "SC-N" => "partlycloudy-night",
        "BK" => "cloudy",
        "OV" => "cloudy",

        // Rain
        "R" => "rainy",
        "RW" => "rainy",
        "LD" => "rainy", // drizzle
        "ZR" => "pouring", // freezing rain
        "ZL" => "pouring", // freezing drizzle

        // Snow and mixes
        "S" => "snowy",
        "SW" => "snowy",
        "SS" => "snowy", // snow/sleet mix
        "IC" => "snowy", // ice crystals
        "RS" => "snowy-rainy",
        "SI" => "snowy-rainy",
        "WM" => "snowy-rainy",
        "IP" => "snowy-rainy", // ice pellets

        // Convective
        "T" => "lightning-rainy",
        "AH" => "hail",

        // Obscurations
        "ZF" => "fog",
        "F" => "fog",
        "FR" => "fog", // frost
        "IF" => "fog", // ice fog
        "BR" => "fog", // mist
        "H" => "fog", // haze
        "K" => "fog", // smoke

        // Blowing phenomena
        "BS" => "windy-variant", // blowing snow
        "BD" => "windy-variant", // blowing dust
        "BN" => "windy-variant", // blowing sand
        "BY" => "windy-variant", // blowing spray

        // Severe and unclassifiable
        "TOT" => "exceptional", // tornado
        "FC" => "exceptional", // funnel cloud
        "WP" => "exceptional", // waterspout
        "VA" => "exceptional", // volcanic ash
        "UP" => "exceptional", // unknown precipitation
        "ZY" => "exceptional", // freezing spray

        _ => return None,
    };
    Some(condition)
}
