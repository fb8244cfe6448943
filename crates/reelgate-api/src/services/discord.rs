//! Discord webhook notifications.

use std::time::Duration;

use reelgate_core::{AppError, Config};
use serde::Serialize;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    embeds: Vec<&'a Embed>,
}

/// Posts embeds to a Discord webhook. `None` when no webhook is configured.
#[derive(Clone)]
pub struct DiscordService {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordService {
    pub fn from_config(config: &Config) -> Option<Self> {
        let webhook_url = config.discord_webhook_url.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .ok()?;
        tracing::info!("Discord notifications enabled");
        Some(Self {
            client,
            webhook_url,
        })
    }

    pub async fn send(&self, embed: &Embed) -> Result<(), AppError> {
        let payload = WebhookPayload {
            content: "",
            embeds: vec![embed],
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Integration(format!("Discord webhook failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Integration(format!(
                "Discord webhook returned {}",
                response.status()
            )));
        }

        tracing::debug!(title = %embed.title, "Discord notification sent");
        Ok(())
    }
}
