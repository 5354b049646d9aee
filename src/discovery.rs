use crate::error::{Result, ScriptError};
use crate::models::{ApiVersion, ModelListing};
use crate::transport::Transport;

/// Lists models from both API namespaces concurrently.
///
/// Either namespace may fail on its own; the call fails only if both do.
pub async fn discover_models(tx: &dyn Transport) -> Result<Vec<ModelListing>> {
    let (v1, v1beta) = tokio::join!(
        tx.list_models(ApiVersion::V1),
        tx.list_models(ApiVersion::V1Beta)
    );

    let mut listings = Vec::with_capacity(2);
    let mut errors = Vec::new();
    for (version, outcome) in [(ApiVersion::V1, v1), (ApiVersion::V1Beta, v1beta)] {
        match outcome {
            Ok(models) => listings.push(ModelListing { version, models }),
            Err(e) => {
                tracing::warn!("Model listing for {} failed: {}", version, e);
                errors.push(format!("{version}: {e}"));
            }
        }
    }

    if listings.is_empty() {
        return Err(ScriptError::Upstream(format!(
            "Failed to list models. {}",
            errors.join(" | ")
        )));
    }
    Ok(listings)
}
