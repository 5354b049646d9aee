pub mod chat;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod history;
pub mod models;
pub mod prompt;
pub mod proxy;
pub mod transport;
pub mod validation;
pub mod variations;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::handlers::AppState;
use crate::history::History;
use crate::proxy::GenerationProxy;
use crate::transport::{GeminiTransport, Transport};

/// Wires the Gemini transport, proxy and history store from configuration.
///
/// Fails before any network call when the API key is missing.
pub fn build_state(cfg: &Config) -> Result<AppState> {
    let transport = Arc::new(GeminiTransport::new(&cfg.gemini)?);
    let proxy = Arc::new(GenerationProxy::new(
        transport as Arc<dyn Transport>,
        &cfg.gemini,
    ));
    let history = Arc::new(History::from_config(&cfg.history));
    Ok(AppState::new(proxy, history))
}
