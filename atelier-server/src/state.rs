//! Shared application state
//!
//! Built once from [`Config`] at startup. Provider clients are only
//! present when their credentials are configured; handlers report the
//! missing credential instead of calling out.

use std::sync::Arc;

use atelier_client::fal::FalClient;
use atelier_client::nanobanana::NanoBananaClient;
use atelier_client::{AsyncJobProvider, FalStorage, JobPoller, Uploader, eachlabs};
use reqwest::Client;

use crate::config::{Config, TryOnProvider};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub poller: JobPoller,
    pub fal: Option<FalClient>,
    pub storage: Option<Arc<dyn Uploader>>,
    pub eachlabs: Option<AsyncJobProvider>,
    pub nanobanana: Option<NanoBananaClient>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        // One connection pool for every provider.
        let http = Client::new();

        let fal = config
            .fal_key()
            .map(|key| FalClient::with_client(&config.fal_api_base, key, http.clone()));

        let storage = config.fal_key().map(|key| {
            Arc::new(FalStorage::with_client(
                &config.fal_storage_base,
                key,
                http.clone(),
            )) as Arc<dyn Uploader>
        });

        let eachlabs = config
            .eachlabs_key()
            .map(|key| eachlabs::prediction_provider(&config.eachlabs_api_base, key));

        let nanobanana = config
            .nanobanana_api_key()
            .filter(|_| !config.nanobanana_api_url.trim().is_empty())
            .map(|key| NanoBananaClient::with_client(&config.nanobanana_api_url, key, http.clone()));

        Self {
            poller: JobPoller::with_client(http, config.poll_config()),
            config: Arc::new(config),
            fal,
            storage,
            eachlabs,
            nanobanana,
        }
    }

    pub fn tryon_provider(&self) -> TryOnProvider {
        self.config.tryon_provider
    }
}
