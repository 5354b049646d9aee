use futures::future::join_all;

use crate::error::{Result, ScriptError};
use crate::models::{GenerationRequest, GenerationResult};
use crate::prompt::variation_topic;
use crate::proxy::GenerationProxy;

pub const VARIATION_COUNT: usize = 3;

/// A successful variation together with the request that produced it.
#[derive(Debug, Clone)]
pub struct Variation {
    /// 1-based position in the batch.
    pub index: usize,
    pub request: GenerationRequest,
    pub result: GenerationResult,
}

/// Runs three concurrent generations that differ only by a topic suffix.
///
/// Successful variations come back in request order. The batch fails only
/// when every call fails.
pub async fn generate_variations(
    proxy: &GenerationProxy,
    base: &GenerationRequest,
) -> Result<Vec<Variation>> {
    let requests: Vec<GenerationRequest> = (1..=VARIATION_COUNT)
        .map(|i| base.with_topic(variation_topic(&base.topic, i)))
        .collect();

    let outcomes = join_all(requests.iter().map(|r| proxy.generate(r))).await;

    let mut variations = Vec::with_capacity(VARIATION_COUNT);
    let mut failures = Vec::new();
    for (i, (request, outcome)) in requests.into_iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(result) => variations.push(Variation {
                index: i + 1,
                request,
                result,
            }),
            Err(e) => {
                tracing::warn!("Variation {} failed: {}", i + 1, e);
                failures.push(format!("variation {}: {e}", i + 1));
            }
        }
    }

    if variations.is_empty() {
        return Err(ScriptError::Upstream(format!(
            "Failed to generate variations. {}",
            failures.join(" | ")
        )));
    }

    tracing::info!(
        succeeded = variations.len(),
        failed = failures.len(),
        "Variation batch finished"
    );
    Ok(variations)
}
