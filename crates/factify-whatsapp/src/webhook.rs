//! Webhook server for receiving WhatsApp messages from Twilio

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Form, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use factify_core::FactChecker;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::{Result, WhatsAppError};
use crate::twiml::{self, MessagingResponse};

/// Liveness text for `GET /`
pub const LIVENESS: &str = "Factify Bot is Alive!";

/// Incoming WhatsApp message from the Twilio webhook
///
/// Twilio posts many more fields; only the sender and text are read.
#[derive(Debug, Default, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Webhook server state
#[derive(Clone)]
pub struct WebhookState {
    pub checker: Arc<FactChecker>,
}

/// Webhook server
pub struct WebhookServer {
    addr: SocketAddr,
    state: WebhookState,
}

impl WebhookServer {
    /// Create a new webhook server
    pub fn new(addr: SocketAddr, checker: Arc<FactChecker>) -> Self {
        Self {
            addr,
            state: WebhookState { checker },
        }
    }

    /// Build the router without binding a socket
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Start the webhook server and run until the listener fails
    pub async fn start(self) -> Result<()> {
        self.start_until(std::future::pending()).await
    }

    /// Start the webhook server and stop gracefully once `shutdown` resolves
    ///
    /// Fails immediately if the address cannot be bound.
    pub async fn start_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("WhatsApp webhook server listening on {}", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| WhatsAppError::Http(e.to_string()))?;

        Ok(())
    }
}

/// Create the webhook router
pub fn create_router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/webhook", post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Liveness check
async fn liveness() -> &'static str {
    LIVENESS
}

/// Handle incoming WhatsApp webhook
///
/// Always answers 200 with TwiML, whatever happened upstream.
async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    form: std::result::Result<Form<IncomingMessage>, FormRejection>,
) -> impl IntoResponse {
    let msg = match form {
        Ok(Form(msg)) => msg,
        Err(rejection) => {
            warn!("Unreadable webhook payload, treating as empty: {}", rejection);
            IncomingMessage::default()
        }
    };

    info!("Message from {}: {}", msg.from, msg.body.trim());

    let reply = state.checker.reply_to(&msg.body).await;
    let twiml = MessagingResponse::new()
        .message(reply)
        .to_xml()
        .unwrap_or_else(|e| {
            error!("Failed to render TwiML reply: {}", e);
            twiml::EMPTY_RESPONSE.to_string()
        });

    (StatusCode::OK, [(header::CONTENT_TYPE, twiml::CONTENT_TYPE)], twiml)
}
