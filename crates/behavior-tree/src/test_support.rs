//! Scripted nodes and a host harness for unit tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::blackboard::Blackboard;
use crate::host::{NodeId, TaskId, TaskQueue, Wake};
use crate::node::{Cx, Node, NodeCore, NodeKind, Report, StateChange};
use crate::random::ScriptedSampler;
use crate::status::NodeState;

thread_local! {
    static RESUME_SCRIPT: RefCell<Vec<NodeState>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug, Default)]
pub(crate) struct StubLog {
    pub evaluated: usize,
    pub resumed: usize,
    pub stopped: usize,
}

/// Leaf that reports a fixed script on evaluate, and whatever the harness
/// passes to [`Harness::resume`] when woken.
pub(crate) struct Stub {
    core: NodeCore,
    script: Vec<NodeState>,
    log: Rc<RefCell<StubLog>>,
}

impl Stub {
    pub fn new<T: 'static>(id: u32, script: &[NodeState]) -> (Box<dyn Node<T>>, Rc<RefCell<StubLog>>) {
        let log = Rc::new(RefCell::new(StubLog::default()));
        let stub = Stub {
            core: NodeCore::new(NodeId(id), NodeKind::ActionNode, format!("n{id}")),
            script: script.to_vec(),
            log: Rc::clone(&log),
        };
        (Box::new(stub), log)
    }
}

impl<T> Node<T> for Stub {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.log.borrow_mut().evaluated += 1;
        self.core.change_state(NodeState::Running, cx);
        for &state in &self.script {
            self.core.emit(state, cx, report);
        }
    }

    fn resume(&mut self, _wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        self.log.borrow_mut().resumed += 1;
        let script = RESUME_SCRIPT.with(|s| std::mem::take(&mut *s.borrow_mut()));
        for state in script {
            self.core.emit(state, cx, report);
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.log.borrow_mut().stopped += 1;
        self.core.reset(cx);
    }
}

/// Owns everything a node needs to run outside of a tree.
pub(crate) struct Harness<T> {
    pub target: T,
    pub blackboard: Blackboard,
    pub queue: TaskQueue,
    pub sampler: ScriptedSampler,
    pub changes: Vec<(String, NodeState)>,
}

impl Harness<()> {
    pub fn new() -> Self {
        Self::with_target(())
    }

    pub fn with_samples(samples: Vec<f32>) -> Self {
        let mut harness = Self::new();
        harness.sampler = ScriptedSampler::new(samples);
        harness
    }
}

impl<T> Harness<T> {
    pub fn with_target(target: T) -> Self {
        Self {
            target,
            blackboard: Blackboard::new(),
            queue: TaskQueue::new(),
            sampler: ScriptedSampler::new(vec![0.0]),
            changes: Vec::new(),
        }
    }

    fn with_cx<R>(&mut self, f: impl FnOnce(&mut Cx<'_, T>) -> R) -> R {
        let Self {
            target,
            blackboard,
            queue,
            sampler,
            changes,
        } = self;
        let mut record =
            |change: &StateChange<'_>| changes.push((change.key.to_owned(), change.state));
        let mut cx = Cx::new(target, blackboard, queue, sampler).with_observer(&mut record);
        f(&mut cx)
    }

    pub fn evaluate<N: Node<T> + ?Sized>(&mut self, node: &mut N) -> Report {
        self.with_cx(|cx| {
            let mut report = Report::new();
            node.evaluate(cx, &mut report);
            report
        })
    }

    /// Wakes the stub `stub` and makes it report `script`.
    pub fn resume<N: Node<T> + ?Sized>(
        &mut self,
        node: &mut N,
        stub: NodeId,
        script: &[NodeState],
    ) -> Report {
        RESUME_SCRIPT.with(|s| *s.borrow_mut() = script.to_vec());
        self.with_cx(|cx| {
            let mut report = Report::new();
            node.resume(
                Wake {
                    node: stub,
                    task: TaskId(u64::MAX),
                },
                cx,
                &mut report,
            );
            report
        })
    }

    /// Advances the clock and dispatches every due wake to `node`.
    pub fn tick<N: Node<T> + ?Sized>(&mut self, node: &mut N, dt: Duration) -> Report {
        let wakes = self.queue.advance(dt);
        self.with_cx(|cx| {
            let mut report = Report::new();
            for wake in wakes {
                node.resume(wake, cx, &mut report);
            }
            report
        })
    }

    pub fn stop<N: Node<T> + ?Sized>(&mut self, node: &mut N) {
        self.with_cx(|cx| node.stop(cx));
    }

    /// States observed for the node with descriptor key `key`.
    pub fn states_of(&self, key: &str) -> Vec<NodeState> {
        self.changes
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, state)| *state)
            .collect()
    }
}
