//! factify-core: Fact-check core library
//!
//! Configuration, the Gemini and Serper clients, and the fact-check
//! pipeline that turns a WhatsApp rumor into a verdict.

pub mod checker;
pub mod config;
pub mod error;
pub mod llm;
pub mod search;

pub use checker::{FactChecker, PROMPT_FOR_INPUT};
pub use config::{CheckMode, Config, GeminiConfig, SearchConfig, TwilioConfig};
pub use error::{Error, Result};
pub use llm::{GeminiClient, Generator};
pub use search::{EvidenceSnippet, Searcher, SerperClient};
