// Spamscan Data Models
// Verdicts and batch reports produced by the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Classification ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "SPAM",
            Label::Ham => "HAM",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified message.
///
/// `raw_score` is the model's spam probability in [0,1]; `confidence` is the
/// percentage distance from the 0.5 threshold toward the chosen label, so it
/// always falls in [50,100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub raw_score: f64,
}

impl Verdict {
    pub fn is_spam(&self) -> bool {
        self.label == Label::Spam
    }
}

// ============ Batch Reports ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemReport {
    pub index: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub spam: usize,
    pub ham: usize,
    pub failed: usize,
}
