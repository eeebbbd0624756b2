use std::io;

/// Errors that abort a training run.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    /// No episode met the acceptance threshold, or there is nothing to train on.
    #[display("dataset is empty: no rollout episode was accepted")]
    EmptyDataset,
    /// A weight vector or observation has the wrong number of components.
    #[display("dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[display("invalid population config: {_0}")]
    InvalidPopulationConfig(#[error(not(source))] String),
    #[display("environment failed")]
    #[from]
    Environment(io::Error),
}

impl TrainingError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidPopulationConfig(reason.into())
    }

    pub(crate) fn check_dim(expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { expected, actual })
        }
    }
}
