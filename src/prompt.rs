use crate::models::GenerationRequest;

const SCRIPT_TEMPLATE: &str = r#"You are a screenwriter specialised in short-form vertical video (TikTok/Reels) focused on retention.
Deliver a script in this format:

- HOOK (1 strong sentence)
- CONTEXT (1-2 lines)
- DEVELOPMENT (bullet points per scene, 4-6 items)
- CTA (1 sentence)

Rules:
- Write in Brazilian Portuguese (PT-BR), direct, no filler.
- Target length: {{DURATION}} seconds.
- Tone: {{TONE}}.
- Persona: {{PERSONA}}.
- Simple language and fast pacing."#;

const TITLES_TEMPLATE: &str = r#"Generate 5 short titles and 15 hashtags in Brazilian Portuguese (PT-BR) for the script below, without explanations.
Format:
- TITLES:
1) ...
2) ...
3) ...
4) ...
5) ...

- HASHTAGS:
#...
#...
(one per line)

SCRIPT:
"#;

/// Full prompt for a script: the filled template plus the request footer.
pub fn render_script_prompt(request: &GenerationRequest) -> String {
    let head = SCRIPT_TEMPLATE
        .replace("{{DURATION}}", &request.duration_seconds.to_string())
        .replace("{{TONE}}", request.tone.as_str())
        .replace("{{PERSONA}}", &request.persona);

    format!(
        "{head}\n\n---\nTOPIC: {}\nDURATION: {}s\nTONE: {}\nPERSONA: {}\n",
        request.topic, request.duration_seconds, request.tone, request.persona
    )
}

/// Topic text for the n-th (1-based) variation.
pub fn variation_topic(topic: &str, index: usize) -> String {
    format!("{topic} (variation {index})")
}

/// Instruction that replaces the topic when asking for titles and hashtags.
pub fn titles_and_hashtags_topic(script: &str) -> String {
    format!("{TITLES_TEMPLATE}{script}")
}
