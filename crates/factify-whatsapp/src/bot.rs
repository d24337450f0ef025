//! WhatsApp bot wrapper

use std::net::SocketAddr;
use std::sync::Arc;

use factify_core::{
    CheckMode, Config, FactChecker, GeminiClient, Generator, Searcher, SerperClient,
};
use tracing::info;

use crate::error::Result;
use crate::webhook::WebhookServer;

/// WhatsApp bot wrapper
pub struct WhatsAppBot {
    checker: Arc<FactChecker>,
    port: u16,
}

impl WhatsAppBot {
    /// Create a bot around an existing fact checker
    pub fn new(checker: Arc<FactChecker>, port: u16) -> Self {
        Self { checker, port }
    }

    /// Build the upstream clients for the configured mode
    ///
    /// Clients are created once here and shared by every request.
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator: Arc<dyn Generator> = Arc::new(GeminiClient::new(config)?);

        let searcher: Option<Arc<dyn Searcher>> = match config.mode {
            CheckMode::Search => Some(Arc::new(SerperClient::new(config)?)),
            CheckMode::Grounded => None,
        };

        let checker = FactChecker::from_config(config, generator, searcher)?;
        info!("Fact-check mode: {}", checker.mode());

        Ok(Self::new(Arc::new(checker), config.port))
    }

    /// Start the bot (webhook server)
    pub async fn start(self) -> Result<()> {
        self.start_until(std::future::pending()).await
    }

    /// Start the bot and stop gracefully once `shutdown` resolves
    pub async fn start_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        let server = WebhookServer::new(addr, self.checker);

        server.start_until(shutdown).await
    }

    /// Get the fact checker for direct use
    pub fn checker(&self) -> Arc<FactChecker> {
        Arc::clone(&self.checker)
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
