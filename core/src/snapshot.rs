//! Snapshot serialization: the final state of a run to/from JSON.
//!
//! A snapshot captures everything needed to analyse a run afterwards:
//! the resolved configuration, the seed, and the whole cluster including
//! every ancestor of every surviving hole.

use crate::{cluster::GlobularCluster, config::SimConfig, error::SimResult, types::RunId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: RunId,
    pub seed: u64,
    pub config: SimConfig,
    pub cluster: GlobularCluster,
}

impl RunSnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
