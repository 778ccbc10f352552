//! Running a built chain: one step showing at a time, advancing on the next turn.

use crate::anchor::{AnchorRegistry, HostWindow};
use crate::callout::{Callout, SurfaceFactory};
use crate::chain::{ChainNode, TourChain, build_chain};
use crate::step::{Completion, Step, StepState};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::rc::Rc;
use tracing::{error, info, warn};
use waypoint_core::{TourError, TourKey, TourProgress};
use waypoint_events::telemetry::{self, StepLifecycle};
use waypoint_events::{EventBus, Signal, Subscription};
use waypoint_geometry::Metrics;
use waypoint_storage::ProgressStore;

/// The collaborators a tour needs from the host application.
#[derive(Clone)]
pub struct TourHost {
    pub bus: EventBus,
    pub anchors: Rc<dyn AnchorRegistry>,
    pub window: Rc<dyn HostWindow>,
    pub surfaces: Rc<dyn SurfaceFactory>,
    pub store: Rc<dyn ProgressStore>,
    pub metrics: Metrics,
}

/// How a tour run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourOutcome {
    Completed,
    /// Stopped while the step with this sequence index was showing.
    Cancelled { at: u32 },
}

#[derive(Debug, Clone, Copy)]
enum TourMessage {
    Start(usize),
    PredicateMatched(usize),
    CalloutAdvanced(usize),
    CalloutClosed(usize),
}

/// The showing step and every listener it registered.
struct ActiveStep {
    node: usize,
    callout: Option<Callout>,
    subscriptions: Vec<Subscription>,
}

pub struct Tour {
    chain: TourChain,
    host: TourHost,
    run_id: String,
    tx: Sender<TourMessage>,
    rx: Receiver<TourMessage>,
    states: Vec<StepState>,
    active: Option<ActiveStep>,
    started: bool,
    outcome: Option<TourOutcome>,
    finished: Signal<TourOutcome>,
}

impl Tour {
    pub fn new(tour_key: TourKey, steps: &[Rc<Step>], host: TourHost) -> Result<Self, TourError> {
        let chain = build_chain(tour_key, steps, &host.metrics)?;
        Ok(Self::from_chain(chain, host))
    }

    pub fn from_chain(chain: TourChain, host: TourHost) -> Self {
        let (tx, rx) = unbounded();
        Self {
            states: vec![StepState::Pending; chain.nodes().len()],
            chain,
            host,
            run_id: telemetry::new_run_id(),
            tx,
            rx,
            active: None,
            started: false,
            outcome: None,
            finished: Signal::new(),
        }
    }

    pub fn key(&self) -> &TourKey {
        self.chain.tour_key()
    }

    pub fn chain(&self) -> &TourChain {
        &self.chain
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn state(&self, node: usize) -> Option<StepState> {
        self.states.get(node).copied()
    }

    pub fn outcome(&self) -> Option<TourOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The node whose step is showing right now.
    pub fn current(&self) -> Option<&ChainNode> {
        self.active
            .as_ref()
            .and_then(|active| self.chain.node(active.node))
    }

    pub fn current_callout(&self) -> Option<Callout> {
        self.active.as_ref().and_then(|active| active.callout.clone())
    }

    /// Called exactly once when the run completes or is cancelled. Dropping a
    /// started tour before it finishes cancels it.
    pub fn on_finished(&self, callback: impl Fn(TourOutcome) + 'static) -> Subscription {
        self.finished.connect(move |outcome| callback(*outcome))
    }

    pub fn progress(&self) -> Option<TourProgress> {
        match self.host.store.progress(self.key()) {
            Ok(progress) => Some(progress),
            Err(e) => {
                error!(tour = %self.key(), "Failed to read tour progress: {}", e);
                None
            }
        }
    }

    /// Start the head of the chain. A tour runs at most once.
    pub fn start(&mut self) -> Result<(), TourError> {
        if self.started {
            return Err(TourError::AlreadyStarted(self.key().to_string()));
        }
        self.started = true;
        info!(tour = %self.key(), run_id = %self.run_id, steps = self.chain.total_length(), "Starting tour");
        self.start_node(0);
        Ok(())
    }

    /// Handle the messages queued before this call. Anything they schedule runs
    /// on the next call.
    pub fn pump(&mut self) -> usize {
        let queued = self.rx.len();
        let mut handled = 0;
        for _ in 0..queued {
            let Ok(message) = self.rx.try_recv() else {
                break;
            };
            handled += 1;
            if self.outcome.is_some() {
                continue;
            }
            match message {
                TourMessage::Start(node) => self.start_node(node),
                TourMessage::PredicateMatched(node) | TourMessage::CalloutAdvanced(node) => {
                    if self.is_showing(node) {
                        self.complete(node);
                    }
                }
                TourMessage::CalloutClosed(node) => {
                    if self.is_showing(node) {
                        self.cancel_at(node, true);
                    }
                }
            }
        }
        handled
    }

    /// One event-loop turn: deliver application events, then handle tour messages.
    pub fn turn(&mut self) -> usize {
        self.host.bus.dispatch_pending() + self.pump()
    }

    /// Turn until nothing is queued anymore or `max_turns` is reached.
    pub fn run_until_idle(&mut self, max_turns: usize) -> usize {
        let mut turns = 0;
        while turns < max_turns && (self.host.bus.pending() > 0 || !self.rx.is_empty()) {
            self.turn();
            turns += 1;
        }
        turns
    }

    /// Stop the run from the outside, e.g. when the application shuts down.
    pub fn cancel(&mut self) {
        if !self.started || self.outcome.is_some() {
            return;
        }
        match self.active.as_ref().map(|active| active.node) {
            Some(node) => self.cancel_at(node, false),
            None => {
                warn!(tour = %self.key(), "Cancelling tour between steps");
                let at = self
                    .states
                    .iter()
                    .rposition(|state| *state != StepState::Pending)
                    .map_or(0, |node| self.chain.nodes()[node].sequence_index);
                self.finish(TourOutcome::Cancelled { at });
            }
        }
    }

    fn is_showing(&self, node: usize) -> bool {
        self.active.as_ref().is_some_and(|active| active.node == node)
            && self.states[node] == StepState::Showing
    }

    fn emit_telemetry(&self, lifecycle: StepLifecycle, node: &ChainNode) {
        telemetry::step_event(
            lifecycle,
            &self.run_id,
            self.chain.tour_key().as_str(),
            node.name(),
            node.sequence_index,
        );
    }

    fn persist(&self, node: &ChainNode, completed: bool) {
        let progress = TourProgress::untouched(self.key().clone()).reached(
            node.sequence_index,
            node.total_length,
            completed,
        );
        if let Err(e) = self.host.store.set_progress(&progress) {
            error!(tour = %self.key(), step = node.name(), "Failed to persist tour progress: {}", e);
        }
    }

    fn start_node(&mut self, mut index: usize) {
        loop {
            let Some(node) = self.chain.node(index).cloned() else {
                warn!(tour = %self.key(), index, "Chain has no such node");
                return;
            };

            let Some(step) = node.step.clone() else {
                self.states[index] = StepState::Advanced;
                self.persist(&node, true);
                self.finish(TourOutcome::Completed);
                return;
            };

            self.emit_telemetry(StepLifecycle::Started, &node);
            if step.is_satisfied() {
                self.states[index] = StepState::Skipped;
                self.emit_telemetry(StepLifecycle::Skipped, &node);
                self.persist(&node, false);
                match node.next {
                    Some(next) => {
                        index = next;
                        continue;
                    }
                    None => return,
                }
            }

            self.show(index, &step);
            self.emit_telemetry(StepLifecycle::Shown, &node);
            return;
        }
    }

    fn show(&mut self, node: usize, step: &Step) {
        let mut subscriptions = Vec::new();

        if let Completion::Event { kind, predicate } = step.completion() {
            let tx = self.tx.clone();
            let predicate = predicate.clone();
            subscriptions.push(self.host.bus.subscribe(*kind, move |event| {
                if predicate(event) {
                    let _ = tx.send(TourMessage::PredicateMatched(node));
                }
            }));
        }

        let callout = step.callout().map(|spec| {
            Callout::new(
                spec.clone(),
                self.host.metrics,
                self.host.anchors.clone(),
                self.host.window.clone(),
                self.host.surfaces.clone(),
            )
        });
        if let Some(callout) = &callout {
            let tx = self.tx.clone();
            subscriptions.push(callout.on_advanced(move || {
                let _ = tx.send(TourMessage::CalloutAdvanced(node));
            }));
            let tx = self.tx.clone();
            subscriptions.push(callout.on_closed(move || {
                let _ = tx.send(TourMessage::CalloutClosed(node));
            }));
        }

        self.states[node] = StepState::Showing;
        self.active = Some(ActiveStep {
            node,
            callout: callout.clone(),
            subscriptions,
        });
        if let Some(callout) = callout {
            callout.show();
        }
    }

    /// Drop every listener of the showing step and hand back its callout.
    fn release_active(&mut self) -> Option<Callout> {
        let active = self.active.take()?;
        drop(active.subscriptions);
        active.callout
    }

    fn complete(&mut self, index: usize) {
        let node = self.chain.nodes()[index].clone();
        if let Some(callout) = self.release_active() {
            callout.trigger_advance();
        }
        self.states[index] = StepState::Advanced;
        self.emit_telemetry(StepLifecycle::Advanced, &node);
        self.persist(&node, false);
        if let Some(next) = node.next {
            let _ = self.tx.send(TourMessage::Start(next));
        }
    }

    fn cancel_at(&mut self, index: usize, by_user: bool) {
        let node = self.chain.nodes()[index].clone();
        if let Some(callout) = self.release_active() {
            callout.dispose();
        }
        self.states[index] = StepState::Cancelled;
        self.emit_telemetry(StepLifecycle::Cancelled, &node);
        info!(tour = %self.key(), step = node.name(), by_user, "Tour cancelled");
        self.persist(&node, false);
        self.finish(TourOutcome::Cancelled {
            at: node.sequence_index,
        });
    }

    fn finish(&mut self, outcome: TourOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        if outcome == TourOutcome::Completed {
            let terminal = self.chain.nodes()[self.chain.nodes().len() - 1].clone();
            self.emit_telemetry(StepLifecycle::Finished, &terminal);
        }
        info!(tour = %self.key(), run_id = %self.run_id, ?outcome, "Tour finished");
        self.finished.emit(&outcome);
    }
}

impl Drop for Tour {
    fn drop(&mut self) {
        self.cancel();
    }
}
