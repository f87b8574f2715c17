use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Source language is fixed; the translator only accepts English input.
pub const SOURCE_LANGUAGE: &str = "en";

/// Target languages offered by the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    Es,
    Hi,
    Fr,
    De,
    Zh,
    Ar,
    Ja,
    Ru,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 8] = [
        TargetLanguage::Es,
        TargetLanguage::Hi,
        TargetLanguage::Fr,
        TargetLanguage::De,
        TargetLanguage::Zh,
        TargetLanguage::Ar,
        TargetLanguage::Ja,
        TargetLanguage::Ru,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            TargetLanguage::Es => "es",
            TargetLanguage::Hi => "hi",
            TargetLanguage::Fr => "fr",
            TargetLanguage::De => "de",
            TargetLanguage::Zh => "zh",
            TargetLanguage::Ar => "ar",
            TargetLanguage::Ja => "ja",
            TargetLanguage::Ru => "ru",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetLanguage::Es => "Spanish",
            TargetLanguage::Hi => "Hindi",
            TargetLanguage::Fr => "French",
            TargetLanguage::De => "German",
            TargetLanguage::Zh => "Chinese",
            TargetLanguage::Ar => "Arabic",
            TargetLanguage::Ja => "Japanese",
            TargetLanguage::Ru => "Russian",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl FromStr for TargetLanguage {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        TargetLanguage::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| TranslateError::UnsupportedLanguage(s.to_string()))
    }
}

/// A single translation job. Built once per attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: &'static str,
    pub target_language: TargetLanguage,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_language: TargetLanguage) -> Self {
        Self {
            text: text.into(),
            source_language: SOURCE_LANGUAGE,
            target_language,
        }
    }
}

/// Failures surfaced to the user. Cancellation and empty input are not errors
/// and never reach this type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("API error: {status} {body}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Transport(err.to_string())
    }
}

/// Remote translation backend
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate the request text, returning the text to display.
    ///
    /// Dropping the returned future must abandon the underlying call.
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError>;
}
