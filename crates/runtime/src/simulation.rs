//! Fixed-rate simulation loop.
//!
//! Drives one [`Agent`] from a [`tokio::time::interval`] and streams every
//! node transition to the caller as a [`StateEvent`]. The tree is not
//! `Send`, so the loop runs on the calling task; nothing here is spawned.

use std::time::Duration;

use behavior_tree::{NodeKind, NodeState, StateChange};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::error::{Result, RuntimeError};
use crate::pawn::Pawn;

/// A node transition observed during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEvent {
    pub key: String,
    pub kind: NodeKind,
    pub state: NodeState,
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The root delivered a terminal state.
    Finished(NodeState),
    /// The frame limit was reached.
    FrameLimit,
    /// The shutdown signal fired or its sender was dropped.
    Shutdown,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub reason: StopReason,
    pub frames: u64,
    pub pawn: Pawn,
}

/// Runs an agent at a fixed frame rate.
pub struct Simulation {
    agent: Agent,
    frame_period: Duration,
    max_frames: Option<u64>,
    shutdown: Option<oneshot::Receiver<()>>,
}

impl Simulation {
    pub fn new(agent: Agent, frame_period: Duration) -> Result<Self> {
        if frame_period.is_zero() {
            return Err(RuntimeError::InvalidFrameRate(0));
        }
        Ok(Self {
            agent,
            frame_period,
            max_frames: None,
            shutdown: None,
        })
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Ends the run early when `signal` fires.
    pub fn with_shutdown(mut self, signal: oneshot::Receiver<()>) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Streams transitions to `events` while running. Send errors are
    /// ignored; a dropped receiver does not stop the run.
    pub fn observe(mut self, events: mpsc::UnboundedSender<StateEvent>) -> Self {
        self.agent
            .tree_mut()
            .set_observer(move |change: &StateChange<'_>| {
                let _ = events.send(StateEvent {
                    key: change.key.to_owned(),
                    kind: change.kind,
                    state: change.state,
                });
            });
        self
    }

    /// Main loop.
    ///
    /// Each frame advances the virtual clock by exactly one frame period, so
    /// a run is reproducible regardless of wall-clock jitter.
    pub async fn run(mut self) -> SimOutcome {
        let mut interval = time::interval(self.frame_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;

        info!(
            period_ms = self.frame_period.as_millis() as u64,
            max_frames = ?self.max_frames,
            "simulation started"
        );
        self.agent.start();

        let mut frames = 0u64;
        let reason = loop {
            if let Some(state) = self.agent.outcome() {
                break StopReason::Finished(state);
            }
            if self.max_frames.is_some_and(|max| frames >= max) {
                break StopReason::FrameLimit;
            }

            match self.shutdown.as_mut() {
                Some(signal) => {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = signal => break StopReason::Shutdown,
                    }
                }
                None => {
                    interval.tick().await;
                }
            }

            self.agent.frame(self.frame_period);
            frames += 1;
            debug!(frame = frames, "frame complete");
        };

        self.agent.shutdown();
        info!(?reason, frames, "simulation ended");

        SimOutcome {
            reason,
            frames,
            pawn: self.agent.pawn().clone(),
        }
    }
}
