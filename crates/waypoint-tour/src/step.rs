use crate::callout::CalloutSpec;
use std::fmt;
use std::rc::Rc;
use waypoint_events::{AppEvent, EventKind};

/// What makes a step done.
#[derive(Clone)]
pub enum Completion {
    /// An application event of `kind` for which `predicate` holds.
    Event {
        kind: EventKind,
        predicate: Rc<dyn Fn(&AppEvent) -> bool>,
    },
    /// The user presses the callout's own "next" control.
    Acknowledge,
}

impl Completion {
    pub fn on(kind: EventKind, predicate: impl Fn(&AppEvent) -> bool + 'static) -> Self {
        Completion::Event {
            kind,
            predicate: Rc::new(predicate),
        }
    }

    /// Any event of `kind` completes the step.
    pub fn on_any(kind: EventKind) -> Self {
        Self::on(kind, |_| true)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Event { kind, .. } => f.debug_struct("Event").field("kind", kind).finish(),
            Completion::Acknowledge => write!(f, "Acknowledge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Showing,
    /// Already satisfied when started; no callout was shown.
    Skipped,
    Advanced,
    Cancelled,
}

/// An author-defined step of a tour. Immutable once built and shared by
/// reference, so the same precondition can be attached to several steps.
pub struct Step {
    name: String,
    callout: Option<CalloutSpec>,
    completion: Completion,
    skip_when: Option<Rc<dyn Fn() -> bool>>,
    preconditions: Vec<Rc<Step>>,
}

impl Step {
    pub fn builder(name: impl Into<String>) -> StepBuilder {
        StepBuilder {
            step: Step {
                name: name.into(),
                callout: None,
                completion: Completion::Acknowledge,
                skip_when: None,
                preconditions: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callout(&self) -> Option<&CalloutSpec> {
        self.callout.as_ref()
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    pub fn preconditions(&self) -> &[Rc<Step>] {
        &self.preconditions
    }

    /// Whether the step can be skipped because its goal is already met.
    pub fn is_satisfied(&self) -> bool {
        self.skip_when.as_ref().is_some_and(|check| check())
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("callout", &self.callout.as_ref().map(|c| &c.anchor))
            .field("completion", &self.completion)
            .field("preconditions", &self.preconditions.len())
            .finish()
    }
}

pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn callout(mut self, spec: CalloutSpec) -> Self {
        self.step.callout = Some(spec);
        self
    }

    pub fn completion(mut self, completion: Completion) -> Self {
        self.step.completion = completion;
        self
    }

    pub fn completes_on(self, kind: EventKind, predicate: impl Fn(&AppEvent) -> bool + 'static) -> Self {
        self.completion(Completion::on(kind, predicate))
    }

    pub fn skip_when(mut self, check: impl Fn() -> bool + 'static) -> Self {
        self.step.skip_when = Some(Rc::new(check));
        self
    }

    /// A step that has to run to completion before this one shows.
    pub fn precondition(mut self, step: Rc<Step>) -> Self {
        self.step.preconditions.push(step);
        self
    }

    pub fn build(self) -> Rc<Step> {
        Rc::new(self.step)
    }
}
