use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration '{key}': {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("Mass quantile has no valid branch for alpha={alpha} on [{min}, {max}]")]
    QuantileInversion { alpha: f64, min: f64, max: f64 },

    #[error("Mass {mass} outside lookup range [{min}, {max}]")]
    LookupOutOfRange { mass: f64, min: f64, max: f64 },

    #[error("Live population index {index} out of range (len {len})")]
    PopulationIndex { index: usize, len: usize },

    #[error("Black hole {id} not found")]
    UnknownHole { id: usize },

    #[error("Snapshot for run '{run_id}' not found")]
    SnapshotNotFound { run_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
