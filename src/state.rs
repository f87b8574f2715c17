use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::translate::{ControllerHandle, RapidApiTranslator, TranslationController, TranslationService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub translator: Arc<dyn TranslationService>,
    /// Live translator views, keyed by client uid
    pub sessions: Arc<DashMap<String, ControllerHandle>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let translator = Arc::new(RapidApiTranslator::from_config(&config.translator_config));
        Self::with_translator(config, translator)
    }

    pub fn with_translator(config: Config, translator: Arc<dyn TranslationService>) -> Self {
        Self {
            config,
            translator,
            sessions: Arc::new(DashMap::new()),
            started_at: Utc::now(),
        }
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Spawn a controller for a new view and register it.
    pub fn open_session(&self, client_uid: &str) -> ControllerHandle {
        let handle = TranslationController::spawn(
            Arc::clone(&self.translator),
            self.config.translator_config.controller_settings(),
        );
        self.sessions.insert(client_uid.to_string(), handle.clone());
        handle
    }

    /// Tear down and forget a view's controller.
    pub fn close_session(&self, client_uid: &str) {
        if let Some((_, handle)) = self.sessions.remove(client_uid) {
            handle.teardown();
        }
    }
}
