use std::sync::Arc;

use anyhow::Result;

use crate::api::{HttpRecordsApi, RecordsApi};
use crate::config::ClientConfig;

/// Shared handles the command layer works with.
pub struct AppState<A: RecordsApi = HttpRecordsApi> {
    pub api: Arc<A>,
    pub config: ClientConfig,
}

impl AppState<HttpRecordsApi> {
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let api = HttpRecordsApi::new(&config)?;
        tracing::info!(api_url = %config.api_url, "records service configured");
        Ok(AppState {
            api: Arc::new(api),
            config,
        })
    }
}

impl<A: RecordsApi> AppState<A> {
    pub fn with_api(api: Arc<A>, config: ClientConfig) -> Self {
        AppState { api, config }
    }
}
