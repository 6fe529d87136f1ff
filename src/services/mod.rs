// Services Module
// The spam analysis pipeline, one service per stage:
// - normalizer: optional text cleanup before encoding
// - vocabulary: frozen token->id map and fixed-length encoding
// - model: scoring contract over the trained recurrent classifier
// - decision: probability -> labeled verdict mapping
// - analyzer: the facade tying the stages together
// - config_store: engine settings from JSON

pub mod analyzer;
pub mod config_store;
pub mod decision;
pub mod model;
pub mod normalizer;
pub mod vocabulary;

// Re-export commonly used items
pub use analyzer::{AnalysisError, Analyzer, AnalyzerError, AnalyzerOptions};
pub use config_store::{ConfigError, ConfigStore, EngineConfig};
pub use decision::decide;
pub use model::{ModelError, RecurrentModel, ScoreError, SpamModel};
pub use normalizer::normalize;
pub use vocabulary::{Vocabulary, VocabularyError, PAD_ID};
