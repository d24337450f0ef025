//! factify-whatsapp: WhatsApp front end for factify via Twilio
//!
//! Receives Twilio's inbound-message webhook, runs the fact check, and
//! answers synchronously with a TwiML reply.

pub mod bot;
pub mod error;
pub mod twiml;
pub mod webhook;

pub use bot::WhatsAppBot;
pub use error::{Result, WhatsAppError};
pub use twiml::MessagingResponse;
pub use webhook::{IncomingMessage, WebhookServer};
