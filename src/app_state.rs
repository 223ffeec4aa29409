use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    services::{
        document_extractor::{DocumentExtractor, HttpDocumentExtractor},
        messenger::{GraphApiSender, MessageSender},
        quiz_engine::{EngineSettings, QuizEngine},
        quiz_generator::{OpenRouterGenerator, QuizGenerator},
        session_store::{InMemorySessionStore, SessionStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QuizEngine>,
    pub sender: Arc<dyn MessageSender>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let generator: Arc<dyn QuizGenerator> = Arc::new(OpenRouterGenerator::new(&config)?);
        let extractor: Arc<dyn DocumentExtractor> = Arc::new(HttpDocumentExtractor::new(&config)?);
        let sender: Arc<dyn MessageSender> = Arc::new(GraphApiSender::new(&config)?);

        Ok(Self::with_parts(config, store, generator, extractor, sender))
    }

    /// Assembles state from explicit collaborators; tests use this to swap
    /// in doubles for the network-facing pieces.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn QuizGenerator>,
        extractor: Arc<dyn DocumentExtractor>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        let settings = EngineSettings::from_config(&config);
        let engine = Arc::new(QuizEngine::new(store, generator, extractor, settings));

        Self {
            engine,
            sender,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
