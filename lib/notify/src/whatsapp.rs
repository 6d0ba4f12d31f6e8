//! WhatsApp Cloud API notifier.

use crate::Notifier;
use crate::error::NotifyError;
use async_trait::async_trait;
use concierge_core::Result;
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument};

/// Default Graph API base URL.
pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Credentials and endpoint for the WhatsApp Cloud API.
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    pub access_token: String,
    pub phone_number_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl WhatsAppConfig {
    #[must_use]
    pub fn new(access_token: impl Into<String>, phone_number_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            phone_number_id: phone_number_id.into(),
            api_base: default_api_base(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

impl<'a> TextMessage<'a> {
    fn new(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        }
    }
}

/// Sends text messages from one business phone number.
#[derive(Clone)]
pub struct WhatsAppNotifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl WhatsAppNotifier {
    /// Builds the HTTP client with the bearer token installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value, the API
    /// base is not a usable URL, or the client cannot be built.
    pub fn new(config: WhatsAppConfig) -> Result<Self, NotifyError> {
        let mut endpoint = Url::parse(&config.api_base).map_err(|e| NotifyError::InvalidConfig {
            reason: format!("invalid api base '{}': {e}", config.api_base),
        })?;
        endpoint
            .path_segments_mut()
            .map_err(|()| NotifyError::InvalidConfig {
                reason: format!("api base '{}' cannot carry a path", config.api_base),
            })?
            .pop_if_empty()
            .extend([config.phone_number_id.as_str(), "messages"]);

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token)).map_err(
            |e| NotifyError::InvalidConfig {
                reason: format!("invalid access token: {e}"),
            },
        )?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::InvalidConfig {
                reason: format!("HTTP client error: {e}"),
            })?;

        Ok(Self { client, endpoint })
    }

    async fn deliver(&self, address: &str, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&TextMessage::new(address, text))
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    #[instrument(skip_all, fields(to = %address, endpoint = %self.endpoint))]
    async fn send(&self, address: &str, text: &str) -> bool {
        info!("Sending WhatsApp message to {address}: {text}");
        match self.deliver(address, text).await {
            Ok(()) => {
                info!("Message sent to {address}: {text}");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to send WhatsApp message to {address}");
                false
            }
        }
    }
}
