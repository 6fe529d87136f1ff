// Vocabulary Encoder Service
// Frozen token->id mapping exported from the trained tokenizer, plus the
// fixed-length integer encoding used as model input.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Id 0 is reserved for padding; no token may claim it.
pub const PAD_ID: u32 = 0;

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse vocabulary file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("vocabulary assigns reserved id 0 to token {token:?}")]
    ReservedId { token: String },
    #[error("vocabulary contains no tokens")]
    Empty,
}

/// On-disk artifact layout: the tokenizer's word index, optionally capped to
/// the vocabulary size the model was trained with.
#[derive(Debug, Deserialize)]
struct VocabularyArtifact {
    word_index: HashMap<String, u32>,
    #[serde(default)]
    num_words: Option<u32>,
}

/// Immutable token->id mapping. Built externally during training, loaded once
/// at startup, never mutated.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_index: HashMap<String, u32>,
    num_words: Option<u32>,
}

impl Vocabulary {
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let content = fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let artifact: VocabularyArtifact =
            serde_json::from_str(&content).map_err(|source| VocabularyError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let vocabulary = Self::from_entries(artifact.word_index, artifact.num_words)?;
        info!(
            path = %path.display(),
            tokens = vocabulary.len(),
            num_words = vocabulary.num_words,
            "vocabulary.loaded"
        );
        Ok(vocabulary)
    }

    /// Build a vocabulary from in-memory entries. Validates the reserved-id
    /// invariant; intended for loaders and test fixtures.
    pub fn from_entries(
        word_index: HashMap<String, u32>,
        num_words: Option<u32>,
    ) -> Result<Self, VocabularyError> {
        if word_index.is_empty() {
            return Err(VocabularyError::Empty);
        }
        if let Some((token, _)) = word_index.iter().find(|(_, &id)| id == PAD_ID) {
            return Err(VocabularyError::ReservedId {
                token: token.clone(),
            });
        }
        Ok(Self {
            word_index,
            num_words,
        })
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    /// Look up a token's id. Tokens outside the trained vocabulary cap count
    /// as unknown, same as tokens absent from the index.
    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.word_index
            .get(token)
            .copied()
            .filter(|&id| self.num_words.map_or(true, |cap| id < cap))
    }

    /// Map raw strings to id sequences, whitespace-tokenized. Unknown tokens
    /// are dropped, not substituted; no padding or truncation happens here.
    pub fn texts_to_sequences(&self, texts: &[&str]) -> Vec<Vec<u32>> {
        texts
            .iter()
            .map(|text| {
                text.split_whitespace()
                    .filter_map(|token| self.id_of(token))
                    .collect()
            })
            .collect()
    }

    /// Encode one message into exactly `max_len` ids: unknown tokens dropped,
    /// the first `max_len` ids kept when over-length, zero-padded at the end
    /// when shorter.
    ///
    /// Returns `None` when no token is recognized, so callers can refuse to
    /// feed an all-padding vector to the model.
    pub fn encode(&self, text: &str, max_len: usize) -> Option<Vec<u32>> {
        let mut ids: Vec<u32> = text
            .split_whitespace()
            .filter_map(|token| self.id_of(token))
            .collect();

        if ids.is_empty() {
            return None;
        }

        ids.truncate(max_len);
        while ids.len() < max_len {
            ids.push(PAD_ID);
        }

        Some(ids)
    }
}
