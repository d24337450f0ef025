//! Web search for evidence retrieval

mod serper;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use serper::SerperClient;

/// One organic search result handed to the prompt builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl EvidenceSnippet {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            link: link.into(),
        }
    }
}

/// A web search backend returning at most `limit` results in rank order
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<EvidenceSnippet>>;
}

/// Format evidence as a numbered list for the prompt
pub fn format_evidence(evidence: &[EvidenceSnippet]) -> String {
    let mut output = String::new();

    for (i, item) in evidence.iter().enumerate() {
        output.push_str(&format!("[{}] {}\n", i + 1, item.title));
        output.push_str(&format!("{}\n", item.snippet));
        output.push_str(&format!("Source: {}\n\n", item.link));
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_evidence() {
        let evidence = vec![
            EvidenceSnippet::new("Moon landing", "Apollo 11 landed in 1969.", "https://nasa.gov/a11"),
            EvidenceSnippet::new("Fact check", "Claims of a hoax are false.", "https://snopes.com/x"),
        ];

        let output = format_evidence(&evidence);
        assert_eq!(
            output,
            "[1] Moon landing\nApollo 11 landed in 1969.\nSource: https://nasa.gov/a11\n\n\
             [2] Fact check\nClaims of a hoax are false.\nSource: https://snopes.com/x"
        );
    }

    #[test]
    fn test_format_empty_evidence() {
        assert_eq!(format_evidence(&[]), "");
    }
}
