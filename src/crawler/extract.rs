//! Heuristic HTML content extraction.
//!
//! Raw pages go through a fixed cascade of strategies: weather-aware
//! pattern scanning first, then structural selectors for article-style
//! markup, then a general boilerplate strip. The first strategy that
//! produces a non-trivial amount of text wins.

use std::sync::LazyLock;

use regex::Regex;

const MIN_CONTENT_LEN: usize = 100;
const MAX_CONTENT_LEN: usize = 3000;
const MAX_WEATHER_FRAGMENTS: usize = 10;
const MAX_WEATHER_SENTENCES: usize = 5;
const MAX_WEATHER_LEN: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub content: String,
}

/// Extraction heuristics, tried in `PRIORITY` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Weather,
    Structural,
    General,
}

impl ExtractionStrategy {
    pub const PRIORITY: [ExtractionStrategy; 3] = [
        ExtractionStrategy::Weather,
        ExtractionStrategy::Structural,
        ExtractionStrategy::General,
    ];

    pub fn apply(self, html: &str) -> String {
        match self {
            ExtractionStrategy::Weather => extract_weather_content(html),
            ExtractionStrategy::Structural => extract_structural_content(html),
            ExtractionStrategy::General => extract_general_content(html),
        }
    }
}

pub fn extract(html: &str) -> Extracted {
    let title = extract_title(html);

    let mut content = String::new();
    for strategy in ExtractionStrategy::PRIORITY {
        content = strategy.apply(html);
        if content.chars().count() >= MIN_CONTENT_LEN {
            break;
        }
    }

    let mut content = clean_content(&content);
    if content.chars().count() > MAX_CONTENT_LEN {
        content = content.chars().take(MAX_CONTENT_LEN).collect::<String>() + "...";
    }

    Extracted { title, content }
}

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").expect("valid regex"));

fn extract_title(html: &str) -> String {
    let Some(captures) = TITLE_RE.captures(html) else {
        return String::new();
    };
    let raw = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    collapse_whitespace(&strip_entities(raw)).trim().to_string()
}

static WEATHER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Temperature readings in various notations
        r"(?i)temperature[^\d]*\d+°?[CF]?",
        r"\d+°[CF]?",
        r"(?i)temp[^\d]*\d+",
        r"(?i)\d+\s*degrees?",
        r"(?i)feels like[^\d]*\d+°?[CF]?",
        // Condition keywords
        r"(?i)(sunny|cloudy|rainy|stormy|clear|overcast|partly cloudy|thunderstorm|snow|fog|mist|drizzle|hot|warm|cool|cold|humid|dry|pleasant|moderate|extreme|hazy|dusty)",
        // Humidity and wind
        r"(?i)humidity[^\d]*\d+%",
        r"(?i)\d+%[^\w]*humidity",
        r"(?i)wind[^\d]*\d+[^\d]*(mph|kmh|km/h|kph)",
        // Forecast fragments
        r"(?i)(today|tomorrow|tonight)[^.]*?\d+°?[CF]?",
        r"(?i)(high|low)[^\d]*\d+°?[CF]?",
        r"(?i)(morning|afternoon|evening|night)[^.]*?\d+°?[CF]?",
        // Subcontinental weather vocabulary and air quality
        r"(?i)(monsoon|pre-monsoon|post-monsoon)",
        r"(?i)air quality[^\d]*\d+",
        r"(?i)aqi[^\d]*\d+",
        r"(?i)visibility[^\d]*\d+[^\d]*(km|miles?)",
        r"(?i)uv index[^\d]*\d+|uv[^\d]*\d+",
        // Major Indian cities mentioned next to a temperature
        r"(?i)(meerut|delhi|mumbai|bangalore|chennai|kolkata|hyderabad|pune|ahmedabad|jaipur|lucknow|kanpur|nagpur|indore|bhopal)[^.]*?\d+°?[CF]?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

static DEGREE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+°[CF]?").expect("valid regex"));

fn extract_weather_content(html: &str) -> String {
    let mut fragments = Vec::new();
    for pattern in WEATHER_PATTERNS.iter() {
        for found in pattern.find_iter(html) {
            fragments.push(found.as_str().to_string());
            if fragments.len() >= MAX_WEATHER_FRAGMENTS {
                break;
            }
        }
        if fragments.len() >= MAX_WEATHER_FRAGMENTS {
            break;
        }
    }

    let sentences: Vec<&str> = SENTENCE_SPLIT_RE
        .split(html)
        .filter(|sentence| {
            let trimmed = sentence.trim();
            let len = trimmed.chars().count();
            if len <= 15 || len >= 200 {
                return false;
            }
            let lower = trimmed.to_lowercase();
            lower.contains("temperature")
                || lower.contains("weather")
                || lower.contains('°')
                || lower.contains("degrees")
                || lower.contains("humidity")
                || lower.contains("wind")
                || DEGREE_RE.is_match(trimmed)
        })
        .take(MAX_WEATHER_SENTENCES)
        .collect();

    if fragments.is_empty() && sentences.is_empty() {
        return String::new();
    }

    let mut combined = fragments;
    combined.extend(sentences.iter().map(|s| s.trim().to_string()));
    let joined = combined.join(" ");
    joined.chars().take(MAX_WEATHER_LEN).collect()
}

static STRUCTURAL_SELECTORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<article[^>]*>(.*?)</article>",
        r"(?is)<main[^>]*>(.*?)</main>",
        r#"(?is)<div[^>]*class="[^"]*content[^"]*"[^>]*>(.*?)</div>"#,
        r#"(?is)<div[^>]*class="[^"]*article[^"]*"[^>]*>(.*?)</div>"#,
        r#"(?is)<div[^>]*class="[^"]*post[^"]*"[^>]*>(.*?)</div>"#,
        r#"(?is)<section[^>]*class="[^"]*content[^"]*"[^>]*>(.*?)</section>"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

fn extract_structural_content(html: &str) -> String {
    for selector in STRUCTURAL_SELECTORS.iter() {
        let inner: Vec<&str> = selector
            .captures_iter(html)
            .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
            .collect();
        if !inner.is_empty() {
            return collapse_whitespace(&strip_tags(&inner.join(" ")))
                .trim()
                .to_string();
        }
    }

    String::new()
}

static BOILERPLATE_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<style[^>]*>.*?</style>",
        r"(?is)<noscript[^>]*>.*?</noscript>",
        r"(?is)<iframe[^>]*>.*?</iframe>",
        r"(?is)<nav[^>]*>.*?</nav>",
        r"(?is)<header[^>]*>.*?</header>",
        r"(?is)<footer[^>]*>.*?</footer>",
        r"(?is)<aside[^>]*>.*?</aside>",
        r"(?s)<!--.*?-->",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static BOILERPLATE_ATTRS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)class="[^"]*DaybreakLargeScreen[^"]*""#,
        r#"(?i)class="[^"]*Card--[^"]*""#,
        r#"(?i)class="[^"]*region[^"]*""#,
        r#"(?i)data-testid="[^"]*""#,
        r#"(?i)aria-label="[^"]*""#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

fn extract_general_content(html: &str) -> String {
    let mut content = html.to_string();
    for block in BOILERPLATE_BLOCKS.iter() {
        content = block.replace_all(&content, "").into_owned();
    }
    for attr in BOILERPLATE_ATTRS.iter() {
        content = attr.replace_all(&content, "").into_owned();
    }
    collapse_whitespace(&strip_tags(&content)).trim().to_string()
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").expect("valid regex"));
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,!?;:()\[\]{}"'-]"#).expect("valid regex"));

fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, " ").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    ENTITY_RE.replace_all(&decoded, " ").into_owned()
}

fn strip_entities(text: &str) -> String {
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    ENTITY_RE.replace_all(&decoded, "").into_owned()
}

/// Final scrub: decode entities, drop characters outside the printable
/// allow-list, and normalise whitespace.
fn clean_content(content: &str) -> String {
    let decoded = decode_entities(content);
    let filtered = DISALLOWED_RE.replace_all(&decoded, " ");
    collapse_whitespace(&filtered).trim().to_string()
}
