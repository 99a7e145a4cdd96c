//! The merger engine: the heart of the kick simulation.
//!
//! EXECUTION ORDER per merger (fixed, documented, never reordered):
//!   1. Sort the live population by time (stable).
//!   2. Stop if the second-earliest hole is at or past the stop time.
//!   3. Remove the two earliest holes. The merger happens at the later time.
//!   4. Draw a fresh spin direction for the heavier hole, then the lighter.
//!   5. q >= 6 only: collapse each spin onto +z or -z, heavier hole first.
//!   6. Query the fit, scale to absolute mass and kick.
//!   7. Insert the remnant through the escape gate.
//!   8. Retained remnants decay to the threshold speed.
//!
//! RULES:
//!   - All randomness flows through the engine's single SimRng.
//!   - Spin magnitude survives a merger; spin direction never does.
//!   - Every merger is recorded in the event log.

use crate::{
    black_hole::{NewHole, Velocity},
    cluster::GlobularCluster,
    config::{SimConfig, SpinDistribution, MAX_PRIMORDIAL_SPIN},
    error::SimResult,
    event::{SimEvent, StopReason},
    mass_sampler::MassSampler,
    remnant::{FitRegime, PhenomFit, RemnantFit, SPEED_OF_LIGHT_KM_S},
    rng::SimRng,
    snapshot::RunSnapshot,
    types::{norm, scale, HoleId, RunId, SimTime},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Constant deceleration standing in for dynamical friction, km/s per s.
pub const DECELERATION: f64 = -1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Running,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub initial_count: usize,
    pub mergers: u64,
    pub live: usize,
    pub ejected: usize,
    /// Time of the last merger, 0 if none happened.
    pub final_time: SimTime,
    pub reason: StopReason,
}

pub struct MergerEngine {
    config: SimConfig,
    rng: SimRng,
    sampler: MassSampler,
    cluster: GlobularCluster,
    primary_fit: Box<dyn RemnantFit>,
    high_q_fit: Box<dyn RemnantFit>,
    state: EngineState,
    initial_count: usize,
    mergers: u64,
    last_merger_time: SimTime,
    mass_ratios: Vec<f64>,
    events: Vec<SimEvent>,
}

impl MergerEngine {
    /// Engine with the built-in fits and the IMF-derived population size.
    pub fn new(config: SimConfig, seed: u64) -> SimResult<Self> {
        Self::with_fits(
            config,
            seed,
            Box::new(PhenomFit::precessing()),
            Box::new(PhenomFit::aligned_spin()),
        )
    }

    pub fn with_fits(
        mut config: SimConfig,
        seed: u64,
        primary_fit: Box<dyn RemnantFit>,
        high_q_fit: Box<dyn RemnantFit>,
    ) -> SimResult<Self> {
        config.apply_lookup_override();
        let count = GlobularCluster::from_config(&config).target_count();
        Self::with_population(config, seed, primary_fit, high_q_fit, count)
    }

    /// Seed exactly `count` primordial holes instead of the IMF target.
    /// The lookup override and all configuration checks run before
    /// anything is drawn.
    pub fn with_population(
        mut config: SimConfig,
        seed: u64,
        primary_fit: Box<dyn RemnantFit>,
        high_q_fit: Box<dyn RemnantFit>,
        count: usize,
    ) -> SimResult<Self> {
        config.apply_lookup_override();
        config.validate()?;
        let sampler = MassSampler::from_config(&config)?;
        let cluster = GlobularCluster::from_config(&config);

        let mut engine = Self {
            rng: SimRng::new(seed),
            sampler,
            cluster,
            primary_fit,
            high_q_fit,
            state: EngineState::Running,
            initial_count: 0,
            mergers: 0,
            last_merger_time: 0.0,
            mass_ratios: Vec::new(),
            events: Vec::new(),
            config,
        };

        for i in 0..count {
            engine.add_random_hole(i.to_string())?;
        }
        engine.initial_count = engine.cluster.live().len();
        engine.events.push(SimEvent::RunInitialized {
            seed,
            target_count: count,
            escape_velocity: engine.cluster.escape_velocity(),
        });

        log::info!(
            "Setup complete, cluster now has {} black holes (v_esc={:.2} km/s)",
            engine.initial_count,
            engine.cluster.escape_velocity()
        );
        Ok(engine)
    }

    /// Primordial hole at rest at t=0. Draw order: mass, spin magnitude
    /// (uniform only), spin direction.
    fn add_random_hole(&mut self, label: String) -> SimResult<HoleId> {
        let mass = self.sampler.draw(&mut self.rng)?;
        let magnitude = match self.config.rand_spin_type {
            SpinDistribution::Uniform => self.rng.next_f64() * MAX_PRIMORDIAL_SPIN,
            SpinDistribution::Zero => 0.0,
        };
        let spin = scale(&self.rng.unit_vector(), magnitude);
        let (id, _) = self.cluster.insert(NewHole::primordial(label, mass, spin));
        Ok(id)
    }

    /// Run until one hole is left or the next merger would reach `stop_time`.
    pub fn run(
        &mut self,
        stop_time: Option<SimTime>,
        sort_by_mass_first: bool,
    ) -> SimResult<RunSummary> {
        let started = Instant::now();
        let stop_time = stop_time.unwrap_or_else(|| {
            log::info!("No stop time specified, running until 1 or 0 black holes remain");
            f64::INFINITY
        });

        // Heavy holes form first; a one-off scheduling hint.
        if sort_by_mass_first {
            self.cluster.sort_live_by_mass();
        }

        while self.state == EngineState::Running {
            if self.mergers % self.config.progress_interval == 0 {
                log::info!(
                    "{}/{} remaining",
                    self.cluster.live().len(),
                    self.initial_count
                );
            }
            self.step(stop_time)?;
        }

        let summary = self.summary();
        log::info!(
            "Finished. Total simulation time: {:.4e} s, mergers: {}, CPU time: {:.3} s",
            summary.final_time,
            summary.mergers,
            started.elapsed().as_secs_f64()
        );
        Ok(summary)
    }

    /// Perform at most one merger.
    pub fn step(&mut self, stop_time: SimTime) -> SimResult<EngineState> {
        if self.state == EngineState::Done {
            return Ok(EngineState::Done);
        }
        if self.cluster.live().len() <= 1 {
            self.finish(StopReason::Exhausted);
            return Ok(self.state);
        }

        self.cluster.sort_live_by_time();
        let next_time = self.cluster.live_at(1).map(|h| h.time).unwrap_or(f64::INFINITY);
        if next_time >= stop_time {
            self.finish(StopReason::StopTime);
            return Ok(self.state);
        }

        let first = self.cluster.remove_at(0)?;
        let second = self.cluster.remove_at(0)?;
        self.merge(first, second)?;
        Ok(self.state)
    }

    fn merge(&mut self, first: HoleId, second: HoleId) -> SimResult<HoleId> {
        let a = self.cluster.hole(first)?.clone();
        let b = self.cluster.hole(second)?.clone();

        let time = a.time.max(b.time);
        let total_mass = a.mass + b.mass;
        let (heavy, light) = if a.mass >= b.mass { (&a, &b) } else { (&b, &a) };
        let q = heavy.mass / light.mass;

        let mut spin1 = scale(&self.rng.unit_vector(), heavy.spin_magnitude);
        let mut spin2 = scale(&self.rng.unit_vector(), light.spin_magnitude);

        let estimate = match FitRegime::for_mass_ratio(q) {
            FitRegime::Precessing => self.primary_fit.fit(q, &spin1, &spin2),
            FitRegime::AlignedSpin => {
                spin1 = [0.0, 0.0, norm(&spin1) * self.rng.sign()];
                spin2 = [0.0, 0.0, norm(&spin2) * self.rng.sign()];
                self.high_q_fit.fit(q, &spin1, &spin2)
            }
        };

        let remnant_mass = estimate.mass_fraction * total_mass;
        let kick = scale(&estimate.kick_fraction, SPEED_OF_LIGHT_KM_S);
        let kick_speed = norm(&kick);

        let (remnant, ejected) = self.cluster.insert(NewHole {
            label: format!("{}+{}", a.label, b.label),
            mass: remnant_mass,
            spin: estimate.spin,
            velocity: Velocity::Vector(kick),
            time,
            parents: Some((first, second)),
            mass_ratio: Some(q),
        });
        if !ejected {
            self.time_evolve(remnant)?;
        }

        log::debug!(
            "merge {} + {} -> {remnant}: q={q:.3} m={remnant_mass:.2} kick={kick_speed:.1} km/s ejected={ejected}",
            a.label,
            b.label
        );

        self.mergers += 1;
        self.last_merger_time = time;
        self.mass_ratios.push(q);
        self.events.push(SimEvent::HolesMerged {
            time,
            first,
            second,
            remnant,
            mass_ratio: q,
            spin1,
            spin2,
            remnant_mass,
            kick_speed,
            ejected,
        });
        Ok(remnant)
    }

    /// Decelerate a hole to the threshold speed, advancing its clock.
    ///
    /// The stored velocity becomes the scalar threshold, not a shortened
    /// vector. Holes already at or below the threshold are left alone.
    pub fn time_evolve(&mut self, id: HoleId) -> SimResult<()> {
        let threshold = self.config.vel_thresh;
        let hole = self.cluster.hole_mut(id)?;
        let speed = hole.speed();
        if threshold < speed {
            hole.time += (threshold - speed) / DECELERATION;
            hole.velocity = Velocity::Speed(threshold);
        }
        Ok(())
    }

    fn finish(&mut self, reason: StopReason) {
        self.state = EngineState::Done;
        if reason == StopReason::StopTime {
            log::warn!(
                "Stop time reached with {} black holes still live",
                self.cluster.live().len()
            );
        }
        self.events.push(SimEvent::RunFinished {
            mergers: self.mergers,
            live: self.cluster.live().len(),
            ejected: self.cluster.ejected().len(),
            final_time: self.last_merger_time,
            reason,
        });
    }

    pub fn summary(&self) -> RunSummary {
        let reason = self
            .events
            .iter()
            .rev()
            .find_map(|e| match e {
                SimEvent::RunFinished { reason, .. } => Some(*reason),
                _ => None,
            })
            .unwrap_or(StopReason::Exhausted);
        RunSummary {
            seed: self.rng.seed(),
            initial_count: self.initial_count,
            mergers: self.mergers,
            live: self.cluster.live().len(),
            ejected: self.cluster.ejected().len(),
            final_time: self.last_merger_time,
            reason,
        }
    }

    pub fn snapshot(&self, run_id: RunId) -> RunSnapshot {
        RunSnapshot {
            run_id,
            seed: self.rng.seed(),
            config: self.config.clone(),
            cluster: self.cluster.clone(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cluster(&self) -> &GlobularCluster {
        &self.cluster
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn mergers(&self) -> u64 {
        self.mergers
    }

    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    /// Mass ratio of every merger, in merger order.
    pub fn mass_ratios(&self) -> &[f64] {
        &self.mass_ratios
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }
}
