//! Callout geometry: where a callout goes, where exactly it is placed, and the
//! speech-bubble outline drawn for it. Everything here is pure.

pub mod alignment;
pub mod engine;
pub mod metrics;
pub mod outline;
pub mod position;

pub use alignment::{
    Alignment, Corner, Edge, Pointer, PreferredSide, Side, SpaceRatios, compute_alignment,
};
pub use engine::{AlignmentEngine, Placement};
pub use kurbo;
pub use metrics::Metrics;
pub use outline::build_outline;
pub use position::{pointer_tip, target_position};
