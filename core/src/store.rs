//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never executes SQL; callers persist a finished run through
//! these methods.

use crate::{
    cluster::GlobularCluster,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    snapshot::RunSnapshot,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        started_at: &str,
        config: &SimConfig,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, seed as i64, version, started_at, serde_json::to_string(config)?],
        )?;
        Ok(())
    }

    pub fn run_seed(&self, run_id: &str) -> SimResult<Option<u64>> {
        let seed = self
            .conn
            .query_row(
                "SELECT seed FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    pub fn run_count(&self) -> SimResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Black holes ────────────────────────────────────────────

    /// Persist every hole in the cluster's arena, tagged live, ejected or merged.
    pub fn save_cluster(&self, run_id: &str, cluster: &GlobularCluster) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO black_hole (
                    run_id, hole_id, label, mass, spin_magnitude, speed, initial_speed,
                    time, parent_a, parent_b, mass_ratio, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            let mut status = vec!["merged"; cluster.holes().len()];
            for &id in cluster.live() {
                status[id] = "live";
            }
            for &id in cluster.ejected() {
                status[id] = "ejected";
            }
            for hole in cluster.holes() {
                let (parent_a, parent_b) = match hole.parents {
                    Some((a, b)) => (Some(a as i64), Some(b as i64)),
                    None => (None, None),
                };
                stmt.execute(params![
                    run_id,
                    hole.id as i64,
                    hole.label,
                    hole.mass,
                    hole.spin_magnitude,
                    hole.speed(),
                    hole.initial_speed,
                    hole.time,
                    parent_a,
                    parent_b,
                    hole.mass_ratio,
                    status[hole.id],
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn hole_count(&self, run_id: &str, status: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM black_hole WHERE run_id = ?1 AND status = ?2",
            params![run_id, status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Masses of the holes with `status`, heaviest first.
    pub fn hole_masses(&self, run_id: &str, status: &str) -> SimResult<Vec<f64>> {
        let mut stmt = self.conn.prepare(
            "SELECT mass FROM black_hole WHERE run_id = ?1 AND status = ?2
             ORDER BY mass DESC",
        )?;
        let masses = stmt
            .query_map(params![run_id, status], |row| row.get(0))?
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(masses)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_events(&self, run_id: &str, events: &[SimEvent]) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_log (run_id, seq, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (seq, event) in events.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    seq as i64,
                    event.type_name(),
                    serde_json::to_string(event)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn events_for_run(&self, run_id: &str) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    seq: row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, snapshot: &RunSnapshot) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, state_json) VALUES (?1, ?2)",
            params![snapshot.run_id, snapshot.to_json()?],
        )?;
        Ok(())
    }

    pub fn load_snapshot(&self, run_id: &str) -> SimResult<RunSnapshot> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM snapshot WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => RunSnapshot::from_json(&json),
            None => Err(SimError::SnapshotNotFound {
                run_id: run_id.to_string(),
            }),
        }
    }

    /// Persist a finished run: holes, event log and snapshot.
    pub fn save_run(&self, snapshot: &RunSnapshot, events: &[SimEvent]) -> SimResult<()> {
        self.save_cluster(&snapshot.run_id, &snapshot.cluster)?;
        self.append_events(&snapshot.run_id, events)?;
        self.save_snapshot(snapshot)?;
        log::debug!("Run {} persisted ({} events)", snapshot.run_id, events.len());
        Ok(())
    }
}
