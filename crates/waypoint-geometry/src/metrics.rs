use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Fixed measurements of the callout shape, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Extra room a side needs beyond the callout extent before it counts as open.
    pub margin: f64,
    pub corner_radius: f64,
    /// Distance from the near corner of the callout to the pointer tip.
    pub pointer_offset: f64,
    /// Half of the pointer's base width.
    pub pointer_half_width: f64,
    /// How far the pointer sticks out of the body.
    pub pointer_depth: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            margin: 10.0,
            corner_radius: 10.0,
            pointer_offset: 30.0,
            pointer_half_width: 10.0,
            pointer_depth: 15.0,
        }
    }
}

impl Metrics {
    /// Smallest callout that still fits a pointer at either corner of an edge.
    pub fn min_callout_size(&self) -> Size {
        let side = (2.0 * self.pointer_offset).max(self.pointer_depth + 2.0 * self.corner_radius);
        Size::new(side, side)
    }
}
