use crate::Metrics;
use crate::alignment::{self, Alignment, PreferredSide};
use crate::outline;
use crate::position;
use kurbo::{BezPath, Point, Rect, Size};

/// A fully resolved callout placement in container coordinates.
#[derive(Debug, Clone)]
pub struct Placement {
    pub alignment: Alignment,
    pub origin: Point,
    pub size: Size,
    /// Outline in callout-local coordinates.
    pub outline: BezPath,
}

impl Placement {
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Pointer tip in container coordinates.
    pub fn pointer_tip(&self, metrics: &Metrics) -> Option<Point> {
        position::pointer_tip(self.alignment, self.size, metrics).map(|tip| self.origin + tip.to_vec2())
    }
}

/// Geometry for callouts, bound to one set of [`Metrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentEngine {
    metrics: Metrics,
}

impl AlignmentEngine {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn compute_alignment(
        &self,
        anchor: Rect,
        container: Rect,
        callout: Size,
        previous: Option<Alignment>,
        preferred: PreferredSide,
    ) -> Alignment {
        alignment::compute_alignment(anchor, container, callout, previous, preferred, &self.metrics)
    }

    pub fn build_outline(&self, alignment: Alignment, callout: Size) -> BezPath {
        outline::build_outline(alignment, callout, &self.metrics)
    }

    pub fn target_position(
        &self,
        alignment: Alignment,
        anchor: Rect,
        container: Rect,
        callout: Size,
    ) -> Point {
        position::target_position(alignment, anchor, container, callout, &self.metrics)
    }

    /// Alignment, position and outline in one pass.
    pub fn layout(
        &self,
        anchor: Rect,
        container: Rect,
        callout: Size,
        previous: Option<Alignment>,
        preferred: PreferredSide,
    ) -> Placement {
        let alignment = self.compute_alignment(anchor, container, callout, previous, preferred);
        Placement {
            alignment,
            origin: self.target_position(alignment, anchor, container, callout),
            size: callout,
            outline: self.build_outline(alignment, callout),
        }
    }
}
