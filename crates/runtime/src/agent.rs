//! A pawn driven by a behavior tree.

use std::time::Duration;

use behavior_tree::{BehaviorTree, NodeState, Report, TaskQueue};
use tracing::{debug, info};

use crate::Pawn;

/// Owns a tree, the pawn it drives, and the task queue standing in for the
/// host clock.
///
/// Lifecycle: [`start`](Self::start) once, [`frame`](Self::frame) per host
/// frame, [`shutdown`](Self::shutdown) on teardown. The outcome is the
/// first terminal state the root delivers.
#[derive(Debug)]
pub struct Agent {
    tree: BehaviorTree<Pawn>,
    pawn: Pawn,
    queue: TaskQueue,
    outcome: Option<NodeState>,
}

impl Agent {
    pub fn new(tree: BehaviorTree<Pawn>, pawn: Pawn) -> Self {
        Self {
            tree,
            pawn,
            queue: TaskQueue::new(),
            outcome: None,
        }
    }

    /// Evaluates the root. Units that start here see a zero frame delta.
    pub fn start(&mut self) -> Report {
        info!(pawn = self.pawn.name(), nodes = self.tree.node_count(), "agent started");
        let report = self.tree.evaluate(&mut self.pawn, &mut self.queue);
        self.record(&report);
        report
    }

    /// Runs one host frame of length `dt`.
    pub fn frame(&mut self, dt: Duration) -> Report {
        self.pawn.begin_frame(dt);
        let report = self.tree.tick(&mut self.queue, &mut self.pawn, dt);
        self.record(&report);
        report
    }

    /// Stops every running node and drops pending tasks.
    pub fn shutdown(&mut self) {
        if self.tree.is_running() {
            debug!(pawn = self.pawn.name(), "stopping running tree");
        }
        self.tree.stop(&mut self.pawn, &mut self.queue);
        info!(
            pawn = self.pawn.name(),
            frames = self.pawn.frame(),
            pending = self.queue.pending(),
            "agent shut down"
        );
    }

    /// First terminal state delivered by the root, if any.
    pub fn outcome(&self) -> Option<NodeState> {
        self.outcome
    }

    pub fn is_running(&self) -> bool {
        self.tree.is_running()
    }

    pub fn pawn(&self) -> &Pawn {
        &self.pawn
    }

    pub fn tree(&self) -> &BehaviorTree<Pawn> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BehaviorTree<Pawn> {
        &mut self.tree
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    fn record(&mut self, report: &Report) {
        if self.outcome.is_none() {
            if let Some(state) = report.terminal() {
                info!(pawn = self.pawn.name(), frame = self.pawn.frame(), %state, "tree finished");
                self.outcome = Some(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::standard_units;
    use behavior_tree::{Argument, NodeDescriptor, TreeBuilder, TreeGraph};

    const FRAME: Duration = Duration::from_millis(100);

    fn graph(nodes: Vec<NodeDescriptor>) -> TreeGraph {
        nodes.into_iter().fold(TreeGraph::new(), TreeGraph::with_node)
    }

    fn agent(graph: &TreeGraph) -> Agent {
        let registry = standard_units();
        let tree = TreeBuilder::new(&registry).build(graph).unwrap();
        Agent::new(tree, Pawn::seeded("scout", 3))
    }

    #[test]
    fn sequence_of_moves_finishes_true() {
        let graph = graph(vec![
            NodeDescriptor::new("RootNode", "root").with_children(["seq"]),
            NodeDescriptor::new("Sequencer", "seq").with_children(["wait", "move"]),
            NodeDescriptor::new("ActionNode", "wait").with_unit("WaitOneFrame"),
            NodeDescriptor::new("ActionNode", "move")
                .with_unit("MoveAction")
                .with_input(Argument::literal("1"))
                .with_input(Argument::literal("0"))
                .with_input(Argument::literal("0.2")),
        ]);
        let mut agent = agent(&graph);

        assert!(agent.start().is_empty());
        let mut frames = 0;
        while agent.outcome().is_none() && frames < 20 {
            agent.frame(FRAME);
            frames += 1;
        }

        assert_eq!(agent.outcome(), Some(NodeState::True));
        assert!(!agent.is_running());
        assert!(agent.pawn().position()[0] > 0.15);
        assert_eq!(agent.queue().pending(), 0);
    }

    #[test]
    fn failing_condition_finishes_on_start() {
        let graph = graph(vec![
            NodeDescriptor::new("RootNode", "root").with_children(["check"]),
            NodeDescriptor::new("ConditionNode", "check")
                .with_unit("IsSmaller")
                .with_input(Argument::literal("2"))
                .with_input(Argument::literal("1")),
        ]);
        let mut agent = agent(&graph);

        assert_eq!(agent.start().terminal(), Some(NodeState::False));
        assert_eq!(agent.outcome(), Some(NodeState::False));
    }

    #[test]
    fn shutdown_cancels_pending_tasks() {
        let graph = graph(vec![
            NodeDescriptor::new("RootNode", "root").with_children(["turn"]),
            NodeDescriptor::new("ActionNode", "turn")
                .with_unit("RotateAction")
                .with_input(Argument::literal("45"))
                .with_input(Argument::literal("60")),
        ]);
        let mut agent = agent(&graph);

        agent.start();
        agent.frame(FRAME);
        assert!(agent.is_running());
        assert!(agent.queue().pending() > 0);

        agent.shutdown();
        assert!(!agent.is_running());
        assert_eq!(agent.queue().pending(), 0);
        assert_eq!(agent.outcome(), None);
    }
}
