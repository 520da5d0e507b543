//! Analysis artifacts and the per-session result set.

use std::fmt;

use serde::Serialize;

/// Which result-set field a task populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Summary,
    Similarity,
    Keywords,
    CoverLetter,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Summary => "summary",
            ArtifactKind::Similarity => "similarity",
            ArtifactKind::Keywords => "keywords",
            ArtifactKind::CoverLetter => "cover_letter",
        }
    }

    /// User-facing failure message for this artifact.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ArtifactKind::Summary => "Failed to generate resume summary. Please try again.",
            ArtifactKind::Similarity => "Failed to generate similarity score. Please try again.",
            ArtifactKind::Keywords => "Failed to analyze keywords. Please try again.",
            ArtifactKind::CoverLetter => "Failed to generate cover letter. Please try again.",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative band for a similarity percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Strong,
    Good,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            80..=u8::MAX => ScoreBand::Strong,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::Weak,
        }
    }
}

/// Normalised similarity score: a 0–100 value plus the string shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityScore {
    pub percent: u8,
    pub display: String,
}

impl SimilarityScore {
    /// Parses a percentage-like string such as `"82%"`. Digits are collected and
    /// parsed; no digits becomes 0 while keeping the original text. Values above
    /// 100, however long, saturate to 100.
    pub fn from_text(raw: &str) -> Self {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        let percent = if digits.is_empty() {
            0
        } else {
            // Only overflow can fail here.
            digits.parse::<u32>().map_or(100, |n| n.min(100) as u8)
        };
        let display = if raw.trim().is_empty() {
            format!("{percent}%")
        } else {
            raw.trim().to_string()
        };
        Self { percent, display }
    }

    pub fn from_number(value: f64) -> Self {
        let percent = if value.is_finite() {
            value.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            percent,
            display: format!("{percent}%"),
        }
    }

    pub fn zero() -> Self {
        Self::from_number(0.0)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percent(self.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Similarity {
    pub score: SimilarityScore,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordReport {
    pub missing: Vec<String>,
    pub suggestions: String,
}

/// A successfully produced artifact, ready to merge into the result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Summary(String),
    Similarity(Similarity),
    Keywords(KeywordReport),
    CoverLetter(String),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Summary(_) => ArtifactKind::Summary,
            Artifact::Similarity(_) => ArtifactKind::Similarity,
            Artifact::Keywords(_) => ArtifactKind::Keywords,
            Artifact::CoverLetter(_) => ArtifactKind::CoverLetter,
        }
    }
}

/// Accumulated outputs for the current session.
///
/// A field is present iff its task succeeded since the last restart. Merges are
/// applied per batch, never per task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    summary: Option<String>,
    similarity: Option<Similarity>,
    keywords: Option<KeywordReport>,
    cover_letter: Option<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn similarity(&self) -> Option<&Similarity> {
        self.similarity.as_ref()
    }

    pub fn keywords(&self) -> Option<&KeywordReport> {
        self.keywords.as_ref()
    }

    pub fn cover_letter(&self) -> Option<&str> {
        self.cover_letter.as_deref()
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Summary => self.summary.is_some(),
            ArtifactKind::Similarity => self.similarity.is_some(),
            ArtifactKind::Keywords => self.keywords.is_some(),
            ArtifactKind::CoverLetter => self.cover_letter.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every artifact of one settled batch. Later artifacts of the same
    /// kind replace earlier ones; fields not named by the batch are untouched.
    pub fn merge<I>(&mut self, artifacts: I)
    where
        I: IntoIterator<Item = Artifact>,
    {
        for artifact in artifacts {
            match artifact {
                Artifact::Summary(s) => self.summary = Some(s),
                Artifact::Similarity(s) => self.similarity = Some(s),
                Artifact::Keywords(k) => self.keywords = Some(k),
                Artifact::CoverLetter(c) => self.cover_letter = Some(c),
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
