//! Guided tours: a chain of steps, each showing a callout next to a live UI
//! element and advancing when the user does what the callout asks.
//!
//! The host application supplies the anchors, the window, the callout surfaces
//! and a progress store through [`TourHost`], and drives the tour by calling
//! [`Tour::turn`] from its event loop.

pub mod anchor;
pub mod callout;
pub mod chain;
pub mod step;
pub mod tour;

pub use anchor::{Anchor, AnchorMap, AnchorRegistry, HostWindow, ManualAnchor, ManualWindow};
pub use callout::{
    Callout, CalloutFrame, CalloutPhase, CalloutSpec, CalloutSurface, FrameChange,
    SurfaceFactory,
};
pub use chain::{ChainNode, TourChain, build_chain};
pub use step::{Completion, Step, StepBuilder, StepState};
pub use tour::{Tour, TourHost, TourOutcome};
