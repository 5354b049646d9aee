use anyhow::{Result, bail};
use colored::*;

use reel_scripts::build_state;
use reel_scripts::chat::{parse_chat, wants_variations};
use reel_scripts::config::Config;
use reel_scripts::models::{HistoryEntry, ItemKind};
use reel_scripts::variations::generate_variations;

/// One-shot chat generation: `chat_script [--tags] <message...>`
#[tokio::main]
async fn main() -> Result<()> {
    // Minimal stderr tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let mut with_tags = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--tags" {
            with_tags = true;
        } else {
            words.push(arg);
        }
    }
    let text = words.join(" ");
    if text.trim().is_empty() {
        bail!("usage: chat_script [--tags] <message>");
    }

    let config = Config::load();
    let state = build_state(&config)?;

    let request = parse_chat(&text);
    println!(
        "{} {} | {}s | {} | {}",
        "▶".cyan(),
        request.topic.bold(),
        request.duration_seconds,
        request.tone.to_string().yellow(),
        request.persona
    );

    if wants_variations(&text) {
        let variations = generate_variations(&state.proxy, &request).await?;
        for v in &variations {
            println!("\n{}\n{}", format!("── variation {} ──", v.index).green().bold(), v.result.text);
        }
        state
            .history
            .record_many(
                variations
                    .into_iter()
                    .map(|v| HistoryEntry::new(ItemKind::Variation, v.request, v.result.text))
                    .collect(),
            )
            .await?;
        return Ok(());
    }

    let result = state.proxy.generate(&request).await?;
    println!("\n{}\n{}", "── script ──".green().bold(), result.text);

    if with_tags {
        let tags = state
            .proxy
            .generate_titles_and_hashtags(&request, &result.text)
            .await?;
        println!("\n{}\n{}", "── titles & hashtags ──".magenta().bold(), tags.text);
    }

    state
        .history
        .record(HistoryEntry::new(ItemKind::Normal, request, result.text))
        .await?;
    Ok(())
}
