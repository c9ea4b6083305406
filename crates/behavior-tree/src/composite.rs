//! Composite behavior nodes.
//!
//! Composite nodes control the execution flow of several children:
//! [`Selector`] (priority OR), [`Sequencer`] (AND), [`WeightedRandomSelector`]
//! (random pick) and [`SimpleParallel`] (main task plus background task).
//!
//! Composites keep the index of the child they are waiting on implicitly: a
//! wake-up is routed to the child that owns it, and the composite reacts to
//! that child's report exactly as it would have when the child was first
//! evaluated.

use crate::error::WeightError;
use crate::host::Wake;
use crate::node::{
    Cx, Node, NodeCore, Report, evaluate_child, resume_child, route, stop_all,
};
use crate::status::NodeState;

/// Tries children in order until one does not fail.
///
/// # Semantics
///
/// - `False`: try the next child
/// - `True`: stop every later sibling and succeed
/// - `Running`: stop every later sibling and report `Running`; this is how
///   a higher-priority child interrupts a lower one
/// - all children failed: `False`
pub struct Selector<T> {
    core: NodeCore,
    children: Vec<Box<dyn Node<T>>>,
}

impl<T> Selector<T> {
    pub fn new(core: NodeCore, children: Vec<Box<dyn Node<T>>>) -> Self {
        Self {
            core: core.spanning(&children),
            children,
        }
    }

    fn run_from(&mut self, mut index: usize, cx: &mut Cx<'_, T>, report: &mut Report) {
        loop {
            let Some(child) = self.children.get_mut(index) else {
                self.core.emit(NodeState::False, cx, report);
                return;
            };
            let child_report = evaluate_child(child.as_mut(), cx);
            match self.on_child(index, child_report, cx, report) {
                Some(next) => index = next,
                None => return,
            }
        }
    }

    /// Reacts to child `index`. Returns the next child to try, if any.
    fn on_child(
        &mut self,
        index: usize,
        child_report: Report,
        cx: &mut Cx<'_, T>,
        report: &mut Report,
    ) -> Option<usize> {
        for state in child_report {
            match state {
                NodeState::True => {
                    stop_all(&mut self.children[index + 1..], cx);
                    self.core.emit(NodeState::True, cx, report);
                    return None;
                }
                NodeState::Running => {
                    stop_all(&mut self.children[index + 1..], cx);
                    self.core.emit(NodeState::Running, cx, report);
                }
                NodeState::False => return Some(index + 1),
                _ => {}
            }
        }
        None
    }
}

impl<T> Node<T> for Selector<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);
        self.run_from(0, cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        let Some(index) = route(&self.children, wake.node) else {
            return;
        };
        let child_report = resume_child(self.children[index].as_mut(), wake, cx);
        if let Some(next) = self.on_child(index, child_report, cx, report) {
            self.run_from(next, cx, report);
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        stop_all(&mut self.children, cx);
        self.core.reset(cx);
    }
}

/// Runs children in order until one fails.
///
/// # Semantics
///
/// - `True`: report `Running` and advance to the next child
/// - `Running`: report `Running` without advancing
/// - `False`: stop every later sibling and fail
/// - all children succeeded: `True`
pub struct Sequencer<T> {
    core: NodeCore,
    children: Vec<Box<dyn Node<T>>>,
}

impl<T> Sequencer<T> {
    pub fn new(core: NodeCore, children: Vec<Box<dyn Node<T>>>) -> Self {
        Self {
            core: core.spanning(&children),
            children,
        }
    }

    fn run_from(&mut self, mut index: usize, cx: &mut Cx<'_, T>, report: &mut Report) {
        loop {
            let Some(child) = self.children.get_mut(index) else {
                self.core.emit(NodeState::True, cx, report);
                return;
            };
            let child_report = evaluate_child(child.as_mut(), cx);
            match self.on_child(index, child_report, cx, report) {
                Some(next) => index = next,
                None => return,
            }
        }
    }

    /// Reacts to child `index`. Returns the next child to run, if any.
    fn on_child(
        &mut self,
        index: usize,
        child_report: Report,
        cx: &mut Cx<'_, T>,
        report: &mut Report,
    ) -> Option<usize> {
        for state in child_report {
            match state {
                NodeState::True => {
                    self.core.emit(NodeState::Running, cx, report);
                    return Some(index + 1);
                }
                NodeState::Running => {
                    self.core.emit(NodeState::Running, cx, report);
                }
                NodeState::False => {
                    stop_all(&mut self.children[index + 1..], cx);
                    self.core.emit(NodeState::False, cx, report);
                    return None;
                }
                _ => {}
            }
        }
        None
    }
}

impl<T> Node<T> for Sequencer<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);
        self.run_from(0, cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        let Some(index) = route(&self.children, wake.node) else {
            return;
        };
        let child_report = resume_child(self.children[index].as_mut(), wake, cx);
        if let Some(next) = self.on_child(index, child_report, cx, report) {
            self.run_from(next, cx, report);
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        stop_all(&mut self.children, cx);
        self.core.reset(cx);
    }
}

/// Picks one child at random, in proportion to its weight.
///
/// Weights are normalized at construction and turned into a cumulative
/// distribution. Each activation draws one sample `s` in `[0, 1)` and runs
/// the first child whose cumulative bound is strictly greater than `s`.
pub struct WeightedRandomSelector<T> {
    core: NodeCore,
    children: Vec<Box<dyn Node<T>>>,
    bounds: Vec<f32>,
    selected: Option<usize>,
}

impl<T> WeightedRandomSelector<T> {
    pub fn new(
        core: NodeCore,
        children: Vec<Box<dyn Node<T>>>,
        weights: &[f32],
    ) -> Result<Self, WeightError> {
        let bounds = cumulative_bounds(weights, children.len())?;
        Ok(Self {
            core: core.spanning(&children),
            children,
            bounds,
            selected: None,
        })
    }

    /// Cumulative upper bound of each child.
    pub fn bounds(&self) -> &[f32] {
        &self.bounds
    }

    /// Index of the child selected by `sample`.
    pub fn pick(&self, sample: f32) -> usize {
        self.bounds
            .iter()
            .position(|&bound| sample < bound)
            .unwrap_or(self.bounds.len().saturating_sub(1))
    }

    fn forward(&mut self, child_report: Report, cx: &mut Cx<'_, T>, report: &mut Report) {
        for state in child_report {
            if state.is_terminal() || state.is_running() {
                self.core.emit(state, cx, report);
            }
        }
    }
}

/// Normalizes `weights` and accumulates them. The last bound is pinned to 1.
fn cumulative_bounds(weights: &[f32], children: usize) -> Result<Vec<f32>, WeightError> {
    if weights.len() != children {
        return Err(WeightError::LengthMismatch {
            weights: weights.len(),
            children,
        });
    }
    if let Some((index, &value)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(WeightError::InvalidWeight { index, value });
    }

    let sum: f32 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(WeightError::ZeroSum);
    }

    let mut acc = 0.0;
    let mut bounds: Vec<f32> = weights
        .iter()
        .map(|w| {
            acc += w / sum;
            acc
        })
        .collect();
    if let Some(last) = bounds.last_mut() {
        *last = 1.0;
    }
    Ok(bounds)
}

impl<T> Node<T> for WeightedRandomSelector<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);

        let sample = cx.sampler().sample();
        let index = self.pick(sample);
        tracing::debug!(node = %self.core.key(), sample, index, "weighted pick");

        self.selected = Some(index);
        let child_report = evaluate_child(self.children[index].as_mut(), cx);
        self.forward(child_report, cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        let Some(index) = route(&self.children, wake.node) else {
            return;
        };
        let child_report = resume_child(self.children[index].as_mut(), wake, cx);
        if self.selected == Some(index) {
            self.forward(child_report, cx, report);
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        stop_all(&mut self.children, cx);
        self.selected = None;
        self.core.reset(cx);
    }
}

/// Runs a main child and a background sub child side by side.
///
/// # Semantics
///
/// - The result is governed by the main child alone
/// - When main terminates, sub is stopped
/// - While main reports `Running`, sub is activated again if it is idle
/// - Sub results are discarded; sub never terminates the parallel
pub struct SimpleParallel<T> {
    core: NodeCore,
    children: Vec<Box<dyn Node<T>>>,
}

const MAIN: usize = 0;
const SUB: usize = 1;

impl<T> SimpleParallel<T> {
    pub fn new(core: NodeCore, main: Box<dyn Node<T>>, sub: Box<dyn Node<T>>) -> Self {
        let children = vec![main, sub];
        Self {
            core: core.spanning(&children),
            children,
        }
    }

    fn activate_sub(&mut self, cx: &mut Cx<'_, T>) {
        let discarded = evaluate_child(self.children[SUB].as_mut(), cx);
        tracing::trace!(node = %self.core.key(), ?discarded, "sub child activated");
    }

    fn on_main(&mut self, main_report: Report, cx: &mut Cx<'_, T>, report: &mut Report) {
        for state in main_report {
            match state {
                NodeState::True | NodeState::False => {
                    self.children[SUB].stop(cx);
                    self.core.emit(state, cx, report);
                }
                NodeState::Running => {
                    if !self.children[SUB].core().is_running() {
                        self.activate_sub(cx);
                    }
                    self.core.emit(NodeState::Running, cx, report);
                }
                _ => {}
            }
        }
    }
}

impl<T> Node<T> for SimpleParallel<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);

        let main_report = evaluate_child(self.children[MAIN].as_mut(), cx);
        self.on_main(main_report, cx, report);

        if self.core.is_running() && !self.children[SUB].core().is_running() {
            self.activate_sub(cx);
        }
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        match route(&self.children, wake.node) {
            Some(MAIN) => {
                let main_report = resume_child(self.children[MAIN].as_mut(), wake, cx);
                self.on_main(main_report, cx, report);
            }
            Some(_) => {
                let discarded = resume_child(self.children[SUB].as_mut(), wake, cx);
                tracing::trace!(node = %self.core.key(), ?discarded, "sub child resumed");
            }
            None => {}
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        stop_all(&mut self.children, cx);
        self.core.reset(cx);
    }
}
