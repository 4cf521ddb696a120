//! Weather-domain text heuristics shared by the optimizer.

use std::sync::LazyLock;

use regex::Regex;

static WEATHER_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)weather|temperature|forecast|climate|rain|sunny|cloudy").expect("valid regex")
});

/// Whether a query should take the weather extraction path. Pure
/// function of the query string.
pub fn is_weather_query(query: &str) -> bool {
    WEATHER_QUERY_RE.is_match(query)
}

static TEMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+°[CF]?|temperature[^\d]*\d+[^\d]*°?[CF]?|\d+[^\d]*degrees?")
        .expect("valid regex")
});
static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)sunny|cloudy|rainy|stormy|clear|overcast|partly cloudy|thunderstorm|snow|fog|mist|drizzle|hot|warm|cool|cold|humid|dry|pleasant|moderate|extreme")
        .expect("valid regex")
});
static HUMIDITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)humidity[^\d]*\d+%|\d+%[^\w]*humidity").expect("valid regex")
});
static WIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)wind[^\d]*\d+[^\d]*(mph|kmh|km/h|kph)").expect("valid regex")
});
static FEELS_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)feels like[^\d]*\d+°?[CF]?").expect("valid regex"));
static VISIBILITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)visibility[^\d]*\d+[^\d]*(km|miles?)").expect("valid regex")
});
static UV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)uv index[^\d]*\d+|uv[^\d]*\d+").expect("valid regex"));
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

static WEATHER_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)temperature|weather|forecast|climate|°|degrees|celsius|fahrenheit|sunny|cloudy|rain|wind|humidity")
        .expect("valid regex")
});
static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)weather\s+(?:in|of|for)\s+([^\s,]+(?:\s+[^\s,]+)*)",
        r"(?i)([^\s,]+(?:\s+[^\s,]+)*)\s+weather",
        r"(?i)(meerut|delhi|mumbai|bangalore|chennai|kolkata|hyderabad|pune|ahmedabad|jaipur|lucknow|kanpur|nagpur|indore|bhopal|visakhapatnam|patna|vadodara|ghaziabad|ludhiana|agra|nashik|faridabad|rajkot)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Location named in a weather query, if one can be spotted.
pub fn extract_location_from_query(query: &str) -> Option<String> {
    for pattern in LOCATION_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(query) {
            if let Some(location) = captures.get(1) {
                let trimmed = location.as_str().trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Pull structured weather fields out of free text.
///
/// Falls back to weather-flavoured sentences, then to a flat
/// truncation, so the result is never empty for non-empty input.
pub fn extract_weather_info(content: &str, query: &str) -> String {
    let mut info = Vec::new();

    if let Some(found) = TEMP_RE.find(content) {
        let temp: String = found
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '°' | 'C' | 'F'))
            .collect();
        info.push(format!("Temperature: {}", temp));
    }

    if let Some(found) = CONDITION_RE.find(content) {
        info.push(format!("Condition: {}", found.as_str()));
    }

    if let Some(found) = HUMIDITY_RE.find(content) {
        if let Some(digits) = DIGITS_RE.find(found.as_str()) {
            info.push(format!("Humidity: {}%", digits.as_str()));
        }
    }

    if let Some(found) = WIND_RE.find(content) {
        info.push(format!("Wind: {}", found.as_str()));
    }

    if let Some(found) = FEELS_LIKE_RE.find(content) {
        info.push(format!("Feels like: {}", found.as_str()));
    }

    if let Some(found) = VISIBILITY_RE.find(content) {
        info.push(format!("Visibility: {}", found.as_str()));
    }

    if let Some(found) = UV_RE.find(content) {
        info.push(format!("UV Index: {}", found.as_str()));
    }

    if !info.is_empty() {
        if let Some(location) = extract_location_from_query(query) {
            info.insert(0, format!("Weather in {}:", location));
        }
        return info.join(". ");
    }

    let sentences: Vec<&str> = SENTENCE_SPLIT_RE
        .split(content)
        .map(|sentence| sentence.trim())
        .filter(|sentence| sentence.chars().count() > 10 && WEATHER_KEYWORD_RE.is_match(sentence))
        .take(3)
        .collect();

    if !sentences.is_empty() {
        return format!("{}.", sentences.join(". "));
    }

    if content.chars().count() > 500 {
        let truncated: String = content.chars().take(500).collect();
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_is_stable_per_query() {
        assert!(is_weather_query("weather in Delhi"));
        assert!(is_weather_query("will it RAIN tomorrow"));
        assert!(!is_weather_query("best rust web framework"));
        // Same query, same branch, every time
        for _ in 0..3 {
            assert!(is_weather_query("forecast for pune"));
            assert!(!is_weather_query("tokio vs async-std"));
        }
    }

    #[test]
    fn location_comes_from_in_of_for_phrases() {
        assert_eq!(
            extract_location_from_query("weather in Delhi").as_deref(),
            Some("Delhi")
        );
        assert_eq!(
            extract_location_from_query("Mumbai weather").as_deref(),
            Some("Mumbai")
        );
        assert_eq!(extract_location_from_query("what is rust"), None);
    }

    #[test]
    fn structured_fields_are_pulled_from_content() {
        let content = "Temperature: 32°C, Humidity: 60%, sunny skies, wind 10 km/h";
        let info = extract_weather_info(content, "weather in Delhi");

        assert!(info.contains("Weather in Delhi"));
        assert!(info.contains("Temperature: 32"));
        assert!(info.contains("Humidity: 60%"));
        assert!(info.contains("Condition:"));
        assert!(info.contains("Wind: wind 10 km/h"));
    }

    #[test]
    fn sentence_fallback_kicks_in_without_structured_fields() {
        let content = "The monsoon brought heavy rain over the city all afternoon. Traffic was light.";
        let info = extract_weather_info(content, "weather update");
        assert!(info.contains("rain"));
        assert!(!info.contains("Traffic"));
    }
}
