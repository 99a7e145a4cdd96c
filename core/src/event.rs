//! The merger event log.
//!
//! RULE: every state change the engine makes is recorded here, in order.
//! Two runs with the same seed and configuration must produce identical logs.

use crate::types::{HoleId, RunId, SimTime, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunInitialized {
        seed: u64,
        target_count: usize,
        /// km/s.
        escape_velocity: f64,
    },
    HolesMerged {
        time: SimTime,
        /// Earlier of the two by time order.
        first: HoleId,
        second: HoleId,
        remnant: HoleId,
        mass_ratio: f64,
        /// Spins fed to the fit, heavier hole first.
        spin1: Vec3,
        spin2: Vec3,
        remnant_mass: f64,
        /// km/s.
        kick_speed: f64,
        ejected: bool,
    },
    RunFinished {
        mergers: u64,
        live: usize,
        ejected: usize,
        final_time: SimTime,
        reason: StopReason,
    },
}

impl SimEvent {
    /// Stable name, used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. } => "run_initialized",
            SimEvent::HolesMerged { .. }    => "holes_merged",
            SimEvent::RunFinished { .. }    => "run_finished",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// One or zero holes left.
    Exhausted,
    /// The next merger would happen at or after the stop time.
    StopTime,
}

/// A persisted event log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub seq: u64,
    pub event_type: String,
    pub payload: String,
}
