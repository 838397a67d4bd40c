//! HTTP client for the Minuta drafting backend.
//!
//! [`BackendClient`] implements every collaborator trait of
//! `minuta-core` against one backend:
//! - [`MovementSource`] and [`PieceContentSource`] (`/api/buscar_*`)
//! - [`GenerationService`] (`/generate_minuta`, `/adjust_minuta`)
//! - [`GenerationCatalog`] (`/api/available_models`, `/api/default_model`,
//!   `/api/prompts/<objective>`)
//!
//! Fetch endpoints are bounded by the configured fetch timeout. Generation
//! calls carry no client-side limit; the drafting session bounds them.
//!
//! [`MovementSource`]: minuta_core::MovementSource
//! [`PieceContentSource`]: minuta_core::PieceContentSource
//! [`GenerationService`]: minuta_core::GenerationService
//! [`GenerationCatalog`]: minuta_core::GenerationCatalog

pub mod eproc;
pub mod generation;
mod wire;

use minuta_config::AppConfig;
use std::time::Duration;

/// Client for the drafting backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    fetch_timeout: Duration,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("minuta/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetch_timeout,
            client,
        })
    }

    /// Create a client from the service section of the configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.service.base_url, config.service.fetch_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
