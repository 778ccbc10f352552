//! Speech-bubble outline: a rounded body plus, for exterior alignments, a
//! triangular pointer whose tip touches the callout's bounding edge.

use crate::Metrics;
use crate::alignment::{Alignment, Edge};
use crate::position::pointer_tip;
use kurbo::{Arc, BezPath, Point, Rect, Size, Vec2};
use std::f64::consts::{FRAC_PI_2, PI};

const ARC_TOLERANCE: f64 = 0.1;

/// Clockwise edge order used to walk the body.
const CLOCKWISE: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

/// The rounded body of the callout: the full size minus the pointer band.
pub fn body_rect(alignment: Alignment, callout: Size, metrics: &Metrics) -> Rect {
    let full = Rect::from_origin_size(Point::ORIGIN, callout);
    let depth = metrics.pointer_depth;
    match alignment.pointer().map(|pointer| pointer.edge) {
        Some(Edge::Top) => Rect::new(full.x0, full.y0 + depth, full.x1, full.y1),
        Some(Edge::Bottom) => Rect::new(full.x0, full.y0, full.x1, full.y1 - depth),
        Some(Edge::Left) => Rect::new(full.x0 + depth, full.y0, full.x1, full.y1),
        Some(Edge::Right) => Rect::new(full.x0, full.y0, full.x1 - depth, full.y1),
        None => full,
    }
}

/// Build the closed outline of a callout of `callout` size, in local coordinates.
pub fn build_outline(alignment: Alignment, callout: Size, metrics: &Metrics) -> BezPath {
    let body = body_rect(alignment, callout, metrics);
    let radius = metrics
        .corner_radius
        .min(body.width() / 2.0)
        .min(body.height() / 2.0)
        .max(0.0);
    let pointer_edge = alignment.pointer().map(|pointer| pointer.edge);
    let tip = pointer_tip(alignment, callout, metrics);

    let mut path = BezPath::new();
    path.move_to((body.x0 + radius, body.y0));

    for edge in CLOCKWISE {
        if let (Some(tip), true) = (tip, pointer_edge == Some(edge)) {
            push_pointer(&mut path, edge, body, tip, metrics.pointer_half_width);
        }

        // Straight run to the next corner, then a quarter turn around it.
        let (corner_start, center, start_angle) = match edge {
            Edge::Top => (
                Point::new(body.x1 - radius, body.y0),
                Point::new(body.x1 - radius, body.y0 + radius),
                -FRAC_PI_2,
            ),
            Edge::Right => (
                Point::new(body.x1, body.y1 - radius),
                Point::new(body.x1 - radius, body.y1 - radius),
                0.0,
            ),
            Edge::Bottom => (
                Point::new(body.x0 + radius, body.y1),
                Point::new(body.x0 + radius, body.y1 - radius),
                FRAC_PI_2,
            ),
            Edge::Left => (
                Point::new(body.x0, body.y0 + radius),
                Point::new(body.x0 + radius, body.y0 + radius),
                PI,
            ),
        };
        path.line_to(corner_start);
        if radius > 0.0 {
            let arc = Arc {
                center,
                radii: Vec2::new(radius, radius),
                start_angle,
                sweep_angle: FRAC_PI_2,
                x_rotation: 0.0,
            };
            path.extend(arc.append_iter(ARC_TOLERANCE));
        }
    }

    path.close_path();
    path
}

fn push_pointer(path: &mut BezPath, edge: Edge, body: Rect, tip: Point, half_width: f64) {
    let (base, direction) = match edge {
        Edge::Top => (Point::new(tip.x, body.y0), Vec2::new(1.0, 0.0)),
        Edge::Right => (Point::new(body.x1, tip.y), Vec2::new(0.0, 1.0)),
        Edge::Bottom => (Point::new(tip.x, body.y1), Vec2::new(-1.0, 0.0)),
        Edge::Left => (Point::new(body.x0, tip.y), Vec2::new(0.0, -1.0)),
    };
    path.line_to(base - direction * half_width);
    path.line_to(tip);
    path.line_to(base + direction * half_width);
}
