// Inference Adapter Service
// Wraps the trained spam classifier behind a stable scoring contract and
// evaluates the exported recurrent network (embedding -> LSTM/SimpleRNN ->
// sigmoid unit) directly.

use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported architecture {0:?}, expected \"lstm\" or \"simple_rnn\"")]
    Architecture(String),
    #[error("{tensor} has {actual} {unit}, expected {expected}")]
    Shape {
        tensor: &'static str,
        unit: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Call-time scoring failures. Distinct from load failures: these surface at
/// the analysis boundary instead of aborting startup.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("model is unavailable: {0}")]
    Unavailable(String),
    #[error("sequence length {actual} does not match the trained length {expected}")]
    Length { expected: usize, actual: usize },
    #[error("token id {id} is outside the embedding table ({rows} rows)")]
    TokenId { id: u32, rows: usize },
}

/// Capability contract for the trained classifier: a pure function from a
/// fixed-length id vector to a spam probability in [0,1]. Implementations
/// must be safe for concurrent read-only calls.
pub trait SpamModel: Send + Sync {
    fn score(&self, sequence: &[u32]) -> Result<f32, ScoreError>;

    /// The sequence length the artifact was trained with.
    fn max_len(&self) -> usize;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Lstm,
    SimpleRnn,
}

impl Architecture {
    fn parse(value: &str) -> Result<Self, ModelError> {
        match value {
            "lstm" => Ok(Self::Lstm),
            "simple_rnn" => Ok(Self::SimpleRnn),
            other => Err(ModelError::Architecture(other.to_string())),
        }
    }

    /// Gate blocks per recurrent step: LSTM stacks i/f/g/o, SimpleRNN has one.
    fn gates(&self) -> usize {
        match self {
            Self::Lstm => 4,
            Self::SimpleRnn => 1,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Lstm => "lstm",
            Self::SimpleRnn => "simple_rnn",
        }
    }
}

/// On-disk weight export. Row-major matrices in the trained layout:
/// `kernel` maps the embedded input to the gate block, `recurrent_kernel`
/// maps the previous hidden state, gates ordered i, f, g, o for LSTM.
#[derive(Debug, Deserialize)]
pub struct ModelArtifact {
    pub architecture: String,
    pub max_len: usize,
    pub embedding: Vec<Vec<f32>>,
    pub kernel: Vec<Vec<f32>>,
    pub recurrent_kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub dense_kernel: Vec<f32>,
    pub dense_bias: f32,
}

/// The loaded classifier. Immutable after construction; the forward pass
/// allocates its own state per call, so shared references score concurrently
/// without locking.
#[derive(Debug)]
pub struct RecurrentModel {
    arch: Architecture,
    max_len: usize,
    units: usize,
    embedding: Array2<f32>,
    kernel: Array2<f32>,
    recurrent_kernel: Array2<f32>,
    bias: Array1<f32>,
    dense_kernel: Array1<f32>,
    dense_bias: f32,
}

impl RecurrentModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|source| ModelError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let model = Self::from_artifact(artifact)?;
        info!(
            path = %path.display(),
            architecture = model.arch.as_str(),
            units = model.units,
            vocab_size = model.embedding.nrows(),
            max_len = model.max_len,
            "model.loaded"
        );
        Ok(model)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let arch = Architecture::parse(&artifact.architecture)?;

        let units = artifact.recurrent_kernel.len();
        if units == 0 {
            return Err(ModelError::Shape {
                tensor: "recurrent_kernel",
                unit: "rows",
                expected: 1,
                actual: 0,
            });
        }
        let gate_cols = units * arch.gates();

        let embedding = to_matrix("embedding", &artifact.embedding, None)?;
        let embed_dim = embedding.ncols();

        let kernel = to_matrix("kernel", &artifact.kernel, Some(gate_cols))?;
        if kernel.nrows() != embed_dim {
            return Err(ModelError::Shape {
                tensor: "kernel",
                unit: "rows",
                expected: embed_dim,
                actual: kernel.nrows(),
            });
        }

        let recurrent_kernel =
            to_matrix("recurrent_kernel", &artifact.recurrent_kernel, Some(gate_cols))?;

        if artifact.bias.len() != gate_cols {
            return Err(ModelError::Shape {
                tensor: "bias",
                unit: "entries",
                expected: gate_cols,
                actual: artifact.bias.len(),
            });
        }
        if artifact.dense_kernel.len() != units {
            return Err(ModelError::Shape {
                tensor: "dense_kernel",
                unit: "entries",
                expected: units,
                actual: artifact.dense_kernel.len(),
            });
        }

        Ok(Self {
            arch,
            max_len: artifact.max_len,
            units,
            embedding,
            kernel,
            recurrent_kernel,
            bias: Array1::from_vec(artifact.bias),
            dense_kernel: Array1::from_vec(artifact.dense_kernel),
            dense_bias: artifact.dense_bias,
        })
    }

    pub fn architecture(&self) -> Architecture {
        self.arch
    }
}

impl SpamModel for RecurrentModel {
    fn score(&self, sequence: &[u32]) -> Result<f32, ScoreError> {
        if sequence.len() != self.max_len {
            return Err(ScoreError::Length {
                expected: self.max_len,
                actual: sequence.len(),
            });
        }

        let units = self.units;
        let mut hidden = Array1::<f32>::zeros(units);
        let mut cell = Array1::<f32>::zeros(units);

        for &id in sequence {
            let row = id as usize;
            if row >= self.embedding.nrows() {
                return Err(ScoreError::TokenId {
                    id,
                    rows: self.embedding.nrows(),
                });
            }
            let x = self.embedding.row(row);

            let z = x.dot(&self.kernel) + hidden.dot(&self.recurrent_kernel) + &self.bias;

            match self.arch {
                Architecture::SimpleRnn => {
                    for j in 0..units {
                        hidden[j] = z[j].tanh();
                    }
                }
                Architecture::Lstm => {
                    for j in 0..units {
                        let input_gate = sigmoid(z[j]);
                        let forget_gate = sigmoid(z[units + j]);
                        let candidate = z[2 * units + j].tanh();
                        let output_gate = sigmoid(z[3 * units + j]);
                        cell[j] = forget_gate * cell[j] + input_gate * candidate;
                        hidden[j] = output_gate * cell[j].tanh();
                    }
                }
            }
        }

        let logit = hidden.dot(&self.dense_kernel) + self.dense_bias;
        Ok(sigmoid(logit))
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn name(&self) -> &str {
        self.arch.as_str()
    }
}

fn to_matrix(
    tensor: &'static str,
    rows: &[Vec<f32>],
    expected_cols: Option<usize>,
) -> Result<Array2<f32>, ModelError> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |row| row.len());
    let cols = expected_cols.unwrap_or(ncols);

    if nrows == 0 || cols == 0 {
        return Err(ModelError::Shape {
            tensor,
            unit: "entries",
            expected: 1,
            actual: 0,
        });
    }

    let mut matrix = Array2::<f32>::zeros((nrows, cols));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(ModelError::Shape {
                tensor,
                unit: "columns",
                expected: cols,
                actual: row.len(),
            });
        }
        for (j, &value) in row.iter().enumerate() {
            matrix[(i, j)] = value;
        }
    }
    Ok(matrix)
}

pub(crate) fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rnn_artifact() -> ModelArtifact {
        // One unit, scalar embeddings: id 1 pushes the score up, id 2 down.
        ModelArtifact {
            architecture: "simple_rnn".to_string(),
            max_len: 1,
            embedding: vec![vec![0.0], vec![1.0], vec![-1.0]],
            kernel: vec![vec![5.0]],
            recurrent_kernel: vec![vec![0.5]],
            bias: vec![0.0],
            dense_kernel: vec![10.0],
            dense_bias: 0.0,
        }
    }

    fn lstm_artifact(units: usize, max_len: usize) -> ModelArtifact {
        ModelArtifact {
            architecture: "lstm".to_string(),
            max_len,
            embedding: vec![vec![0.0, 0.0], vec![0.3, -0.2], vec![-0.1, 0.4]],
            kernel: vec![vec![0.1; 4 * units], vec![-0.1; 4 * units]],
            recurrent_kernel: vec![vec![0.05; 4 * units]; units],
            bias: vec![0.0; 4 * units],
            dense_kernel: vec![1.0; units],
            dense_bias: 0.0,
        }
    }

    #[test]
    fn test_sigmoid_midpoint_and_bounds() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }

    #[test]
    fn test_rnn_scores_separate_classes() {
        let model = RecurrentModel::from_artifact(rnn_artifact()).unwrap();
        let spammy = model.score(&[1]).unwrap();
        let hammy = model.score(&[2]).unwrap();
        assert!(spammy > 0.99, "got {spammy}");
        assert!(hammy < 0.01, "got {hammy}");
    }

    #[test]
    fn test_zero_weights_score_exactly_half() {
        // All-zero gates leave the hidden state at zero, so the output is
        // sigmoid(dense_bias).
        let artifact = ModelArtifact {
            architecture: "lstm".to_string(),
            max_len: 4,
            embedding: vec![vec![0.0, 0.0]; 3],
            kernel: vec![vec![0.0; 8], vec![0.0; 8]],
            recurrent_kernel: vec![vec![0.0; 8]; 2],
            bias: vec![0.0; 8],
            dense_kernel: vec![0.0; 2],
            dense_bias: 0.0,
        };
        let model = RecurrentModel::from_artifact(artifact).unwrap();
        assert_eq!(model.score(&[1, 2, 0, 0]).unwrap(), 0.5);
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let model = RecurrentModel::from_artifact(lstm_artifact(1, 3)).unwrap();
        let first = model.score(&[1, 2, 0]).unwrap();
        let second = model.score(&[1, 2, 0]).unwrap();
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let model = RecurrentModel::from_artifact(lstm_artifact(1, 3)).unwrap();
        let err = model.score(&[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::Length {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_out_of_table_token_id_is_rejected() {
        let model = RecurrentModel::from_artifact(rnn_artifact()).unwrap();
        let err = model.score(&[99]).unwrap_err();
        assert!(matches!(err, ScoreError::TokenId { id: 99, .. }));
    }

    #[test]
    fn test_shape_validation_rejects_bad_bias() {
        let mut artifact = lstm_artifact(1, 3);
        artifact.bias = vec![0.0; 3];
        let err = RecurrentModel::from_artifact(artifact).unwrap_err();
        assert!(matches!(err, ModelError::Shape { tensor: "bias", .. }));
    }

    #[test]
    fn test_unknown_architecture_is_rejected() {
        let mut artifact = rnn_artifact();
        artifact.architecture = "gru".to_string();
        let err = RecurrentModel::from_artifact(artifact).unwrap_err();
        assert!(matches!(err, ModelError::Architecture(_)));
    }

    #[test]
    fn test_load_round_trip() {
        let artifact = serde_json::json!({
            "architecture": "simple_rnn",
            "max_len": 2,
            "embedding": [[0.0], [1.0]],
            "kernel": [[2.0]],
            "recurrent_kernel": [[0.0]],
            "bias": [0.0],
            "dense_kernel": [1.0],
            "dense_bias": 0.0
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{artifact}").unwrap();

        let model = RecurrentModel::load(file.path()).unwrap();
        assert_eq!(model.max_len(), 2);
        assert_eq!(model.name(), "simple_rnn");
        assert_eq!(model.architecture(), Architecture::SimpleRnn);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = RecurrentModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
