//! Plex server integration.
//!
//! After an approval the matching library section is looked up by title and
//! told to rescan, so the new file shows up without waiting for Plex's own
//! schedule. Plex answers in JSON when asked via the Accept header.

use std::time::Duration;

use reelgate_core::{AppError, Config, MediaType};
use serde::Deserialize;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<Directory>,
}

#[derive(Debug, Deserialize)]
struct Directory {
    key: String,
    title: String,
}

/// Triggers library rescans on a Plex server. A no-op when PLEX_URL or
/// PLEX_TOKEN is not configured.
#[derive(Clone)]
pub struct PlexClient {
    client: reqwest::Client,
    server: Option<PlexServer>,
    movies_library: String,
    tv_library: String,
}

#[derive(Clone)]
struct PlexServer {
    base_url: String,
    token: String,
}

impl PlexClient {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let server = match (&config.plex_url, &config.plex_token) {
            (Some(url), Some(token)) => {
                tracing::info!(url = %url, "Plex integration enabled");
                Some(PlexServer {
                    base_url: url.trim_end_matches('/').to_string(),
                    token: token.clone(),
                })
            }
            _ => {
                tracing::info!("Plex integration not configured, rescans will be skipped");
                None
            }
        };

        Ok(Self {
            client,
            server,
            movies_library: config.plex_movies_library.clone(),
            tv_library: config.plex_tv_library.clone(),
        })
    }

    /// A client with no server configured; every rescan is a no-op.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            server: None,
            movies_library: String::new(),
            tv_library: String::new(),
        }
    }

    /// Ask Plex to rescan the library holding this media type.
    pub async fn rescan(&self, media_type: MediaType) -> Result<(), AppError> {
        let Some(server) = &self.server else {
            tracing::debug!("Plex not configured, skipping rescan");
            return Ok(());
        };

        let library = match media_type {
            MediaType::Movie => &self.movies_library,
            MediaType::Series => &self.tv_library,
        };

        let section_key = self.find_section_key(server, library).await?;

        let url = format!(
            "{}/library/sections/{}/refresh",
            server.base_url, section_key
        );
        let response = self
            .client
            .get(&url)
            .header("X-Plex-Token", &server.token)
            .send()
            .await
            .map_err(|e| AppError::Integration(format!("Plex refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Integration(format!(
                "Plex refresh returned {}",
                response.status()
            )));
        }

        tracing::info!(library = %library, section = %section_key, "Plex library rescan triggered");
        Ok(())
    }

    async fn find_section_key(
        &self,
        server: &PlexServer,
        library: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/library/sections", server.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Plex-Token", &server.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::Integration(format!("Plex section lookup failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Integration(format!(
                "Plex section lookup returned {}",
                response.status()
            )));
        }

        let sections: SectionsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Integration(format!("Invalid Plex response: {}", e)))?;

        sections
            .media_container
            .directories
            .into_iter()
            .find(|d| d.title == library)
            .map(|d| d.key)
            .ok_or_else(|| {
                AppError::Integration(format!("Plex library '{}' not found", library))
            })
    }
}
