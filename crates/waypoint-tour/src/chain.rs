//! Linearizing author-defined steps into one numbered chain.

use crate::step::{Completion, Step};
use std::rc::Rc;
use tracing::debug;
use waypoint_core::{TourError, TourKey};
use waypoint_geometry::Metrics;

/// One node of a built chain. `step` is `None` only for the terminal node.
#[derive(Debug, Clone)]
pub struct ChainNode {
    pub step: Option<Rc<Step>>,
    pub sequence_index: u32,
    pub total_length: u32,
    pub is_terminal: bool,
    /// Index of the following node in [`TourChain::nodes`].
    pub next: Option<usize>,
}

impl ChainNode {
    pub fn name(&self) -> &str {
        self.step.as_ref().map_or("tour-finished", |step| step.name())
    }
}

/// Immutable, fully numbered sequence of steps ending in a terminal node.
#[derive(Debug, Clone)]
pub struct TourChain {
    tour_key: TourKey,
    nodes: Vec<ChainNode>,
}

impl TourChain {
    pub fn tour_key(&self) -> &TourKey {
        &self.tour_key
    }

    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&ChainNode> {
        self.nodes.get(index)
    }

    pub fn head(&self) -> &ChainNode {
        &self.nodes[0]
    }

    /// Number of nodes, terminal included.
    pub fn total_length(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(ChainNode::name).collect()
    }
}

fn validate(step: &Step, metrics: &Metrics) -> Result<(), TourError> {
    match step.callout() {
        Some(spec) => spec.validate(step.name(), metrics),
        None if matches!(step.completion(), Completion::Acknowledge) => Err(TourError::invalid_step(
            step.name(),
            "a step without a callout cannot wait for an acknowledgement",
        )),
        None => Ok(()),
    }
}

/// Preconditions in run order: a precondition's own preconditions come first.
fn flatten_preconditions(step: &Step, out: &mut Vec<Rc<Step>>) {
    for precondition in step.preconditions() {
        flatten_preconditions(precondition, out);
        out.push(precondition.clone());
    }
}

/// Build the chain for `steps`.
///
/// Every step is preceded by its flattened preconditions, except those the
/// previous step already pulled in (compared by reference). A terminal node is
/// appended last. Sequence indices start at 1.
pub fn build_chain(
    tour_key: TourKey,
    steps: &[Rc<Step>],
    metrics: &Metrics,
) -> Result<TourChain, TourError> {
    if steps.is_empty() {
        return Err(TourError::EmptyTour(tour_key.to_string()));
    }

    let mut order: Vec<Rc<Step>> = Vec::new();
    let mut previous_preconditions: Vec<Rc<Step>> = Vec::new();
    for step in steps {
        let mut preconditions = Vec::new();
        flatten_preconditions(step, &mut preconditions);
        for precondition in &preconditions {
            if previous_preconditions
                .iter()
                .any(|seen| Rc::ptr_eq(seen, precondition))
            {
                continue;
            }
            validate(precondition, metrics)?;
            order.push(precondition.clone());
        }
        validate(step, metrics)?;
        order.push(step.clone());
        previous_preconditions = preconditions;
    }

    let total_length = order.len() as u32 + 1;
    let mut nodes: Vec<ChainNode> = order
        .into_iter()
        .enumerate()
        .map(|(position, step)| ChainNode {
            step: Some(step),
            sequence_index: position as u32 + 1,
            total_length,
            is_terminal: false,
            next: Some(position + 1),
        })
        .collect();
    nodes.push(ChainNode {
        step: None,
        sequence_index: total_length,
        total_length,
        is_terminal: true,
        next: None,
    });

    debug!(tour = %tour_key, total_length, "tour chain built");
    Ok(TourChain { tour_key, nodes })
}
