//! Response bodies of the remote analysis service.
//!
//! The service is not strict about types, so the similarity score in particular
//! is accepted in any JSON form and normalised here.
//! Nothing in this module leaks past `HttpAnalysisClient`.

use serde::Deserialize;
use tracing::warn;

use crate::models::results::{KeywordReport, Similarity, SimilarityScore};

#[derive(Debug, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Similarity score as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScoreWire {
    Text(String),
    Number(f64),
    Other(serde_json::Value),
}

impl ScoreWire {
    pub fn normalize(self) -> SimilarityScore {
        match self {
            ScoreWire::Text(text) => SimilarityScore::from_text(&text),
            ScoreWire::Number(n) => SimilarityScore::from_number(n),
            ScoreWire::Other(value) => {
                warn!("similarityScore has unexpected shape {value}; using 0%");
                SimilarityScore::zero()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResponse {
    #[serde(default)]
    pub similarity_score: Option<ScoreWire>,
    #[serde(default)]
    pub similarity_explanation: String,
}

impl From<SimilarityResponse> for Similarity {
    fn from(response: SimilarityResponse) -> Self {
        let score = match response.similarity_score {
            Some(wire) => wire.normalize(),
            None => {
                warn!("similarityScore missing from response; using 0%");
                SimilarityScore::zero()
            }
        };
        Similarity {
            score,
            explanation: response.similarity_explanation,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsResponse {
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub optimization_suggestions: String,
}

impl From<KeywordsResponse> for KeywordReport {
    fn from(response: KeywordsResponse) -> Self {
        KeywordReport {
            missing: response.missing_keywords,
            suggestions: response.optimization_suggestions,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub content: String,
}

/// Error body of the service. `detail` is a string for handled errors and a
/// list of objects for request validation failures.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
