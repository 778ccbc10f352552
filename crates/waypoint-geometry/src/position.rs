use crate::Metrics;
use crate::alignment::{Alignment, Corner, Edge, Side};
use kurbo::{Point, Rect, Size};

/// Pointer tip in callout-local coordinates (origin at the callout's top-left).
pub fn pointer_tip(alignment: Alignment, callout: Size, metrics: &Metrics) -> Option<Point> {
    let pointer = alignment.pointer()?;
    let along = |extent: f64| match pointer.corner {
        Corner::Near => metrics.pointer_offset,
        Corner::Far => extent - metrics.pointer_offset,
    };
    let tip = match pointer.edge {
        Edge::Top => Point::new(along(callout.width), 0.0),
        Edge::Bottom => Point::new(along(callout.width), callout.height),
        Edge::Left => Point::new(0.0, along(callout.height)),
        Edge::Right => Point::new(callout.width, along(callout.height)),
    };
    Some(tip)
}

/// Midpoint of the anchor edge that faces `side`.
fn attach_point(side: Side, anchor: Rect) -> Point {
    let center = anchor.center();
    match side {
        Side::Top => Point::new(center.x, anchor.y0),
        Side::Bottom => Point::new(center.x, anchor.y1),
        Side::Left => Point::new(anchor.x0, center.y),
        Side::Right => Point::new(anchor.x1, center.y),
    }
}

/// Top-left corner at which to place the callout.
///
/// Exterior alignments put the pointer tip on the midpoint of the anchor's facing
/// edge. `Middle` centers the callout in the container. Inner variants sit against
/// the anchor's horizontal center and are clamped into the container.
pub fn target_position(
    alignment: Alignment,
    anchor: Rect,
    container: Rect,
    callout: Size,
    metrics: &Metrics,
) -> Point {
    if let (Some(side), Some(tip)) = (alignment.side(), pointer_tip(alignment, callout, metrics)) {
        return attach_point(side, anchor) - tip.to_vec2();
    }

    let center = anchor.center();
    let origin = match alignment {
        Alignment::Middle => {
            let middle = container.center();
            return Point::new(
                middle.x - callout.width / 2.0,
                middle.y - callout.height / 2.0,
            );
        }
        Alignment::InnerLeft => Point::new(center.x - callout.width, center.y - callout.height / 2.0),
        _ => Point::new(center.x, center.y - callout.height / 2.0),
    };
    clamp_into(origin, callout, container)
}

fn clamp_into(origin: Point, callout: Size, container: Rect) -> Point {
    let x = origin
        .x
        .min(container.x1 - callout.width)
        .max(container.x0);
    let y = origin
        .y
        .min(container.y1 - callout.height)
        .max(container.y0);
    Point::new(x, y)
}
