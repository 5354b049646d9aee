//! Best-effort extraction of a [`GenerationRequest`] from free-form chat text.
//!
//! Every rule falls back to a default, so parsing never fails. Rules are
//! evaluated in this order:
//!
//! 1. duration: first two-digit number followed by a seconds unit, kept only in `[10, 90]`
//! 2. tone: keyword clusters in [`TONE_RULES`] order, first match wins
//! 3. topic: `tema:`/`topic:` marker, then `sobre|about <topic> para|pra|for`, then the
//!    first 80 characters of the input with whitespace collapsed
//! 4. persona: `para|for <persona>` up to `,` `.` `;`, then `p/ <persona>`, then
//!    [`DEFAULT_PERSONA`]

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{
    DEFAULT_DURATION_SECONDS, GenerationRequest, MAX_DURATION_SECONDS, MIN_DURATION_SECONDS, Tone,
};

pub const DEFAULT_PERSONA: &str = "general audience";
const TOPIC_FALLBACK_CHARS: usize = 80;

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{2})\s*(?:segundos?|seg|seconds?|secs?|s)\b")
        .expect("duration regex is valid")
});

/// Priority-ordered tone keyword clusters.
static TONE_RULES: LazyLock<Vec<(Tone, Regex)>> = LazyLock::new(|| {
    [
        (Tone::Humor, r"(?i)humor|engra[cç]ad[oa]|funny|comedy|com[eé]dia"),
        (
            Tone::Authority,
            r"(?i)autoridade|profissional|especialista|authority|professional|expert",
        ),
        (
            Tone::Emotional,
            r"(?i)emocional|inspirador|motivacional|emotional|inspiring|motivational",
        ),
        (
            Tone::Educational,
            r"(?i)educativo|explicativo|tutorial|educational|explanatory",
        ),
    ]
    .into_iter()
    .map(|(tone, pattern)| (tone, Regex::new(pattern).expect("tone regex is valid")))
    .collect()
});

static TOPIC_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tema|topic)\s*:\s*(.+)$").expect("topic marker regex is valid")
});

static TOPIC_ABOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:sobre|about)\s+(.+?)(?:\s+(?:para|pra|for)\b|$)")
        .expect("topic about regex is valid")
});

static PERSONA_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:para|for)\s+(.+?)(?:[,.;]|$)").expect("persona regex is valid")
});

static PERSONA_SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bp/\s*(.+?)(?:[,.;]|$)").expect("persona shorthand regex is valid")
});

static WANTS_VARIATIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b3\s*(?:varia[cç][oõ]es|variations?)\b|\b(?:varia[cç][oõ]es|variations?)\s*3\b",
    )
    .expect("variations regex is valid")
});

/// Maps chat text to a fully populated request.
pub fn parse_chat(input: &str) -> GenerationRequest {
    let request = GenerationRequest {
        topic: extract_topic(input).unwrap_or_else(|| fallback_topic(input)),
        duration_seconds: extract_duration(input).unwrap_or(DEFAULT_DURATION_SECONDS),
        tone: extract_tone(input).unwrap_or_default(),
        persona: extract_persona(input).unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
    };
    tracing::debug!(?request, "Parsed chat input");
    request
}

/// True when the text asks for three variations instead of a single script.
pub fn wants_variations(input: &str) -> bool {
    WANTS_VARIATIONS.is_match(input)
}

fn extract_duration(input: &str) -> Option<u32> {
    let caps = DURATION.captures(input)?;
    let seconds: u32 = caps.get(1)?.as_str().parse().ok()?;
    (MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS)
        .contains(&seconds)
        .then_some(seconds)
}

fn extract_tone(input: &str) -> Option<Tone> {
    TONE_RULES
        .iter()
        .find(|(_, re)| re.is_match(input))
        .map(|(tone, _)| *tone)
}

fn extract_topic(input: &str) -> Option<String> {
    first_capture(&TOPIC_MARKER, input).or_else(|| first_capture(&TOPIC_ABOUT, input))
}

fn extract_persona(input: &str) -> Option<String> {
    first_capture(&PERSONA_FOR, input).or_else(|| first_capture(&PERSONA_SHORTHAND, input))
}

fn first_capture(re: &Regex, input: &str) -> Option<String> {
    let text = re.captures(input)?.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn fallback_topic(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(TOPIC_FALLBACK_CHARS)
        .collect()
}
