// Analysis Pipeline
// Orchestrates normalize -> encode -> score -> decide for one message, with
// per-call typed errors so the caller can react to each rejection reason.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{BatchSummary, Verdict};
use crate::services::decision::decide;
use crate::services::model::{ScoreError, SpamModel};
use crate::services::normalizer::normalize;
use crate::services::vocabulary::Vocabulary;

/// Recoverable per-call failures. All of these are returned, never thrown
/// across the analysis boundary; the messages stay distinguishable so a UI
/// or batch caller can react differently to each.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("please enter a message")]
    EmptyMessage,
    #[error("message could not be analyzed: no recognizable words")]
    NoKnownVocabulary,
    #[error("analysis failed: model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("analysis failed: {0}")]
    Inference(String),
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("configured max length {configured} does not match the model's trained length {trained}")]
    MaxLenMismatch { configured: usize, trained: usize },
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzerOptions {
    /// Run the text normalizer before encoding (lowercase, strip non-letters,
    /// stop words, lemmas). Off by default.
    pub normalize: bool,
    /// Expected sequence length, cross-checked against the model artifact's
    /// trained length at construction.
    pub max_len: Option<usize>,
}

/// Pipeline facade over explicitly injected artifacts. Construct once at
/// startup and share; the vocabulary and model are read-only, so concurrent
/// callers need no locking.
pub struct Analyzer {
    vocabulary: Arc<Vocabulary>,
    model: Arc<dyn SpamModel>,
    normalize_input: bool,
    max_len: usize,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("vocabulary", &self.vocabulary)
            .field("normalize_input", &self.normalize_input)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        model: Arc<dyn SpamModel>,
        options: AnalyzerOptions,
    ) -> Result<Self, AnalyzerError> {
        let trained = model.max_len();
        if let Some(configured) = options.max_len {
            if configured != trained {
                return Err(AnalyzerError::MaxLenMismatch {
                    configured,
                    trained,
                });
            }
        }

        Ok(Self {
            vocabulary,
            model,
            normalize_input: options.normalize,
            max_len: trained,
        })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Analyze one message. Blank input and input with no recognizable
    /// vocabulary are rejected before the model is invoked.
    pub fn analyze(&self, raw: &str) -> Result<Verdict, AnalysisError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::EmptyMessage);
        }

        let prepared = if self.normalize_input {
            normalize(trimmed)
        } else {
            trimmed.to_string()
        };

        let sequence = self
            .vocabulary
            .encode(&prepared, self.max_len)
            .ok_or(AnalysisError::NoKnownVocabulary)?;

        let score = self.model.score(&sequence).map_err(|err| match err {
            ScoreError::Unavailable(message) => {
                warn!(model = self.model.name(), %message, "model.unavailable");
                AnalysisError::ModelUnavailable(message)
            }
            other => {
                warn!(model = self.model.name(), error = %other, "inference.failed");
                AnalysisError::Inference(other.to_string())
            }
        })?;

        debug!(model = self.model.name(), score, "message.scored");
        Ok(decide(f64::from(score)))
    }

    /// Analyze each message independently, preserving input order. One
    /// unanalyzable message never aborts the rest of the batch.
    pub fn analyze_batch(&self, messages: &[&str]) -> Vec<Result<Verdict, AnalysisError>> {
        messages.iter().map(|message| self.analyze(message)).collect()
    }

    pub fn summarize_batch(results: &[Result<Verdict, AnalysisError>]) -> BatchSummary {
        let mut summary = BatchSummary {
            total: results.len(),
            ..BatchSummary::default()
        };
        for result in results {
            match result {
                Ok(verdict) if verdict.is_spam() => summary.spam += 1,
                Ok(_) => summary.ham += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}
