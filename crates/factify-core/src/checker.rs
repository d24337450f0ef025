//! Fact-check pipeline
//!
//! Turns the text of an inbound message into the reply text: a canned prompt
//! for empty messages, a verdict from the generation service, or a fixed
//! degraded-service message when an upstream call fails. Upstream failures
//! never escape [`FactChecker::reply_to`].

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{CheckMode, Config};
use crate::error::{Error, Result};
use crate::llm::Generator;
use crate::search::{EvidenceSnippet, Searcher, format_evidence};

/// Reply for an empty or whitespace-only message
pub const PROMPT_FOR_INPUT: &str = "Please send a text to fact-check.";

/// Reply when the generation service fails
pub const GENERATION_FAILURE: &str =
    "⚠️ I couldn't verify this right now. Please try again later.";

/// Reply when the search service fails or finds nothing
pub const SEARCH_FAILURE: &str = "⚠️ Search service is unavailable right now, so I couldn't gather evidence. Please try again later.";

/// Number of organic results fed into the prompt
pub const MAX_EVIDENCE: usize = 3;

/// Why a fact check produced no verdict
#[derive(Debug)]
pub enum CheckFailure {
    /// The generation call failed or returned no text
    Generation(Error),
    /// The search call failed
    Search(Error),
    /// The search call succeeded with zero results
    NoEvidence,
}

impl CheckFailure {
    /// Fixed reply text for this failure class
    pub fn reply_text(&self) -> &'static str {
        match self {
            CheckFailure::Generation(_) => GENERATION_FAILURE,
            CheckFailure::Search(_) | CheckFailure::NoEvidence => SEARCH_FAILURE,
        }
    }
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckFailure::Generation(e) => write!(f, "generation failed: {}", e),
            CheckFailure::Search(e) => write!(f, "search failed: {}", e),
            CheckFailure::NoEvidence => f.write_str("search returned no results"),
        }
    }
}

/// Fact-check pipeline with injected collaborators
#[derive(Clone)]
pub struct FactChecker {
    generator: Arc<dyn Generator>,
    searcher: Option<Arc<dyn Searcher>>,
}

impl FactChecker {
    /// Grounded mode: the generator searches by itself
    pub fn grounded(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            searcher: None,
        }
    }

    /// Search mode: evidence is retrieved first and injected into the prompt
    pub fn with_search(generator: Arc<dyn Generator>, searcher: Arc<dyn Searcher>) -> Self {
        Self {
            generator,
            searcher: Some(searcher),
        }
    }

    /// Build the pipeline for the configured mode
    pub fn from_config(
        config: &Config,
        generator: Arc<dyn Generator>,
        searcher: Option<Arc<dyn Searcher>>,
    ) -> Result<Self> {
        match (config.mode, searcher) {
            (CheckMode::Grounded, _) => Ok(Self::grounded(generator)),
            (CheckMode::Search, Some(searcher)) => Ok(Self::with_search(generator, searcher)),
            (CheckMode::Search, None) => Err(Error::Config(
                "search mode requires a search client".to_string(),
            )),
        }
    }

    /// Active mode
    pub fn mode(&self) -> CheckMode {
        if self.searcher.is_some() {
            CheckMode::Search
        } else {
            CheckMode::Grounded
        }
    }

    /// Reply text for an inbound message body
    pub async fn reply_to(&self, message: &str) -> String {
        let claim = message.trim();
        if claim.is_empty() {
            return PROMPT_FOR_INPUT.to_string();
        }

        match self.check(claim).await {
            Ok(verdict) => verdict,
            Err(failure) => {
                error!(claim = %claim, "Fact check failed: {}", failure);
                failure.reply_text().to_string()
            }
        }
    }

    /// Run the pipeline for a non-empty claim
    pub async fn check(&self, claim: &str) -> std::result::Result<String, CheckFailure> {
        match &self.searcher {
            None => {
                info!("Fact checking with grounded generation");
                self.generator
                    .generate(&grounded_prompt(claim), true)
                    .await
                    .map_err(CheckFailure::Generation)
            }
            Some(searcher) => {
                info!("Fact checking with explicit search");
                let evidence = searcher
                    .search(claim, MAX_EVIDENCE)
                    .await
                    .map_err(CheckFailure::Search)?;

                if evidence.is_empty() {
                    warn!(claim = %claim, "Search returned no results");
                    return Err(CheckFailure::NoEvidence);
                }

                debug!("Collected {} evidence snippets", evidence.len());

                self.generator
                    .generate(&evidence_prompt(claim, &evidence), false)
                    .await
                    .map_err(CheckFailure::Generation)
            }
        }
    }
}

/// Prompt for grounded mode
pub fn grounded_prompt(claim: &str) -> String {
    format!(
        "Fact check this WhatsApp rumor: '{}'. \
         Search Google. Reply with one emoji: ✅ (True), ❌ (False), or ⚠️ (Unverified). \
         Then give a 2-sentence explanation with a source link.",
        claim
    )
}

/// Prompt for search mode, restricted to the supplied evidence
pub fn evidence_prompt(claim: &str, evidence: &[EvidenceSnippet]) -> String {
    format!(
        "Fact check this WhatsApp rumor: '{}'.\n\n\
         Evidence from a web search:\n{}\n\n\
         Using only the evidence above, reply with one emoji: ✅ (True), ❌ (False), or ⚠️ (Unverified). \
         Then give a 2-sentence explanation and cite one source link from the evidence.",
        claim,
        format_evidence(evidence)
    )
}
