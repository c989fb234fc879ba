use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiClient;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub api: ApiClient,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = ApiClient::new(config.server_url()?, config.request_timeout())?;
        Ok(Self {
            config: Arc::new(config),
            api,
        })
    }
}
