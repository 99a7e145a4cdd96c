//! Hierarchical black-hole merger simulation in a dense star cluster.
//!
//! A population drawn from the IMF merges pairwise in time order; each
//! remnant receives a recoil kick and either stays bound to the cluster or
//! is ejected. The engine is fully deterministic for a given seed.

pub mod ancestry;
pub mod black_hole;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod imf;
pub mod mass_sampler;
pub mod remnant;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
