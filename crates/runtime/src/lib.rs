//! Reference host for behavior trees.
//!
//! Supplies what the engine leaves to its host: a target entity
//! ([`Pawn`]), a set of behavior units ([`units`]), a frame clock
//! ([`Agent`] over a [`TaskQueue`](behavior_tree::TaskQueue)), and a
//! fixed-rate loop ([`Simulation`]).
//!
//! Modules are organized by responsibility:
//! - [`pawn`] is the target entity units act on
//! - [`units`] holds the shipped behavior units and their registry
//! - [`agent`] pairs a tree with its pawn and task queue
//! - [`simulation`] runs an agent on a tokio interval
//! - [`bootstrap`] and [`config`] load everything named by the environment
pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod pawn;
pub mod simulation;
pub mod units;

pub use agent::Agent;
pub use bootstrap::load_agent;
pub use config::SimConfig;
pub use error::{Result, RuntimeError};
pub use pawn::Pawn;
pub use simulation::{SimOutcome, Simulation, StateEvent, StopReason};
pub use units::{register_standard, standard_units};
