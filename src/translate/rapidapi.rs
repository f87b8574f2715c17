use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::interface::{TranslateError, TranslationRequest, TranslationService};
use crate::config::TranslatorConfig;

/// Client for the RapidAPI text-translator endpoint
#[derive(Debug, Clone)]
pub struct RapidApiTranslator {
    client: Client,
    endpoint: String,
    api_host: String,
    api_key: String,
}

impl RapidApiTranslator {
    pub fn new(endpoint: String, api_host: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_host,
            api_key,
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        let api_key = config.resolved_api_key().unwrap_or_else(|| {
            warn!("No translation API key configured; requests will be rejected by the service");
            String::new()
        });
        Self::new(config.endpoint.clone(), config.api_host.clone(), api_key)
    }
}

/// Pull the translated text out of a service response.
///
/// Falls back to the whole body serialized as JSON when `data.translatedText`
/// is missing.
pub fn extract_translation(json: &Value) -> String {
    match json.pointer("/data/translatedText") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => json.to_string(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl TranslationService for RapidApiTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let form = [
            ("source_language", request.source_language),
            ("target_language", request.target_language.code()),
            ("text", request.text.as_str()),
        ];

        debug!(
            "Sending translation request: target={}, chars={}",
            request.target_language.code(),
            request.text.chars().count()
        );

        // .form() sets content-type: application/x-www-form-urlencoded
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!("Translation API returned error: {}", status);
            return Err(TranslateError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;
        Ok(extract_translation(&json))
    }
}
