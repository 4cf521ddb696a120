//! Prompt templates, selected per query domain.

use std::sync::LazyLock;

use regex::Regex;

use crate::tools::search::Source;

static WEATHER_PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)weather|temperature|forecast|climate|rain|sunny|cloudy|humid|wind|°|degrees")
        .expect("valid regex")
});

/// Broader weather detection used only for prompt selection.
pub fn wants_weather_template(query: &str) -> bool {
    WEATHER_PROMPT_RE.is_match(query)
}

pub const WEATHER_SYSTEM_PROMPT: &str = "You are Verixa AI, a weather information specialist. Provide clear, structured weather information:\n\n\
• **Location First**: Always start with the location name\n\
• **Current Conditions**: Provide current temperature and weather conditions\n\
• **Structured Format**: Use consistent formatting for weather data\n\
• **Complete Information**: Include temperature, conditions, humidity, wind when available\n\
• **Brief & Clear**: Keep responses concise but informative\n\n\
**Format Example:**\n\
**Weather in [Location]**\n\
• **Temperature**: [Current temp] (Feels like [feels like temp])\n\
• **Conditions**: [Weather description]\n\
• **Details**: Humidity [%], Wind [speed], Visibility [distance]\n\
• **Forecast**: [Brief upcoming weather if available]";

pub const GENERAL_SYSTEM_PROMPT: &str = "You are Verixa AI, an expert AI assistant that provides concise, accurate responses. Follow these guidelines:\n\n\
• **Direct Answer First**: Start with a clear, direct answer\n\
• **Factually Accurate**: Base information strictly on provided context\n\
• **Well-Structured**: Use bullet points and clear formatting\n\
• **Concise**: Keep responses focused and relevant\n\
• **Professional**: Maintain an informative yet accessible tone";

pub fn system_prompt(query: &str) -> &'static str {
    if wants_weather_template(query) {
        WEATHER_SYSTEM_PROMPT
    } else {
        GENERAL_SYSTEM_PROMPT
    }
}

pub fn user_prompt(query: &str, context: &str, sources: &[Source]) -> String {
    let source_list = sources
        .iter()
        .map(|source| format!("{} ({})", source.title, source.url))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Context: {}\n\nQuestion: {}\n\nSources: {}",
        context, query, source_list
    )
}

/// Single combined prompt for providers without a system/user split.
pub fn combined_prompt(query: &str, context: &str) -> String {
    if wants_weather_template(query) {
        format!(
            "You are Verixa AI, a weather information specialist. Provide clear, structured weather information.\n\n\
**STRUCTURE YOUR RESPONSE:**\n\
- **Location**: Weather in [City Name]\n\
- **Temperature**: Current temperature and feels-like temperature\n\
- **Conditions**: Current weather conditions\n\
- **Details**: Humidity, wind speed, visibility, UV index\n\
- **Forecast**: Brief upcoming weather if available\n\n\
**Weather Query:** {}\n\
**Weather Data:** {}\n\n\
**Instructions:** Extract and present weather information in a clear, structured format. If specific data is missing, mention what information is not available. Focus on providing actionable weather information.",
            query, context
        )
    } else {
        format!(
            "You are Verixa AI, an expert AI assistant that provides concise, accurate, and well-structured responses.\n\n\
**RESPONSE REQUIREMENTS:**\n\
1. **Direct & Concise**: Start with a clear, direct answer (1-2 sentences)\n\
2. **Factually Accurate**: Base all information strictly on the provided context\n\
3. **Well-Structured**: Use bullet points and clear formatting for readability\n\
4. **Relevant Only**: Include only information directly related to the question\n\
5. **Professional**: Maintain an informative yet accessible tone\n\n\
**User Question:** {}\n\
**Context:** {}\n\n\
**Instructions:** Provide a direct, concise answer based strictly on the context. Focus on answering the specific question asked without adding unnecessary background information or lengthy explanations.",
            query, context
        )
    }
}
