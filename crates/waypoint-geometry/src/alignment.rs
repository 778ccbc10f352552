//! Choosing where a callout goes relative to its anchor.
//!
//! Alignment variants are named after the callout edge and corner that carry the
//! pointer. `TopLeft` puts the pointer on the callout's top edge near its left
//! corner, so the callout hangs *below* the anchor and points up at it.

use crate::Metrics;
use crate::position::target_position;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
    /// Overlaps the left half of the anchor; no pointer.
    InnerLeft,
    /// Overlaps the right half of the anchor; no pointer.
    InnerRight,
    /// Centered in the container; no anchor applies.
    Middle,
}

/// Side of the anchor on which the callout body is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Edge of the callout that carries the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Which end of its edge the pointer sits nearer to. `Near` is the left end of a
/// horizontal edge and the top end of a vertical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    Near,
    Far,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub edge: Edge,
    pub corner: Corner,
}

/// Where the step author would like the callout, relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PreferredSide {
    Top,
    Right,
    #[default]
    Bottom,
    Left,
    Centered,
}

impl PreferredSide {
    pub fn side(self) -> Option<Side> {
        match self {
            PreferredSide::Top => Some(Side::Top),
            PreferredSide::Right => Some(Side::Right),
            PreferredSide::Bottom => Some(Side::Bottom),
            PreferredSide::Left => Some(Side::Left),
            PreferredSide::Centered => None,
        }
    }
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Order used to leave an inner alignment once room opens up again.
    pub const RECOVERY_ORDER: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// Order used when neither the preferred nor the previous side is open.
    pub const DEFAULT_ORDER: [Side; 4] = [Side::Right, Side::Bottom, Side::Top, Side::Left];

    /// Whether the callout sits above or below the anchor.
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn alignment(self, corner: Corner) -> Alignment {
        match (self, corner) {
            (Side::Bottom, Corner::Near) => Alignment::TopLeft,
            (Side::Bottom, Corner::Far) => Alignment::TopRight,
            (Side::Top, Corner::Near) => Alignment::BottomLeft,
            (Side::Top, Corner::Far) => Alignment::BottomRight,
            (Side::Right, Corner::Near) => Alignment::LeftTop,
            (Side::Right, Corner::Far) => Alignment::LeftBottom,
            (Side::Left, Corner::Near) => Alignment::RightTop,
            (Side::Left, Corner::Far) => Alignment::RightBottom,
        }
    }
}

impl Alignment {
    pub const ALL: [Alignment; 11] = [
        Alignment::TopLeft,
        Alignment::TopRight,
        Alignment::BottomLeft,
        Alignment::BottomRight,
        Alignment::LeftTop,
        Alignment::LeftBottom,
        Alignment::RightTop,
        Alignment::RightBottom,
        Alignment::InnerLeft,
        Alignment::InnerRight,
        Alignment::Middle,
    ];

    pub fn is_inner(self) -> bool {
        matches!(self, Alignment::InnerLeft | Alignment::InnerRight)
    }

    /// Side of the anchor the callout occupies, for exterior alignments.
    pub fn side(self) -> Option<Side> {
        self.pointer().map(|pointer| match pointer.edge {
            Edge::Top => Side::Bottom,
            Edge::Bottom => Side::Top,
            Edge::Left => Side::Right,
            Edge::Right => Side::Left,
        })
    }

    pub fn pointer(self) -> Option<Pointer> {
        let (edge, corner) = match self {
            Alignment::TopLeft => (Edge::Top, Corner::Near),
            Alignment::TopRight => (Edge::Top, Corner::Far),
            Alignment::BottomLeft => (Edge::Bottom, Corner::Near),
            Alignment::BottomRight => (Edge::Bottom, Corner::Far),
            Alignment::LeftTop => (Edge::Left, Corner::Near),
            Alignment::LeftBottom => (Edge::Left, Corner::Far),
            Alignment::RightTop => (Edge::Right, Corner::Near),
            Alignment::RightBottom => (Edge::Right, Corner::Far),
            Alignment::InnerLeft | Alignment::InnerRight | Alignment::Middle => return None,
        };
        Some(Pointer { edge, corner })
    }
}

/// How many times the callout fits into the free space on each side of the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceRatios {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl SpaceRatios {
    pub fn compute(anchor: Rect, container: Rect, callout: Size, margin: f64) -> Self {
        let needed_height = callout.height + margin;
        let needed_width = callout.width + margin;
        Self {
            top: (anchor.y0 - container.y0) / needed_height,
            right: (container.x1 - anchor.x1) / needed_width,
            bottom: (container.y1 - anchor.y1) / needed_height,
            left: (anchor.x0 - container.x0) / needed_width,
        }
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

/// Pick the pointer corner for `side`: an anchor past the container's midpoint gets
/// the pointer near the far corner so the body extends back toward the middle.
pub fn fine_tune(side: Side, anchor: Rect, container: Rect) -> Alignment {
    let past_midpoint = if side.is_vertical() {
        anchor.center().x > container.center().x
    } else {
        anchor.center().y > container.center().y
    };
    side.alignment(if past_midpoint { Corner::Far } else { Corner::Near })
}

/// The alignment for `side`, or `None` if the callout does not fit there.
///
/// A side fits when its space ratio exceeds one and the fine-tuned callout lies
/// entirely inside the container. An anchor partly or fully outside the container
/// can leave a ratio above one while the placed callout would still escape.
pub fn fitting_alignment(
    side: Side,
    anchor: Rect,
    container: Rect,
    callout: Size,
    metrics: &Metrics,
) -> Option<Alignment> {
    let ratios = SpaceRatios::compute(anchor, container, callout, metrics.margin);
    if ratios.get(side) <= 1.0 || ratios.get(side).is_nan() {
        return None;
    }
    let alignment = fine_tune(side, anchor, container);
    let origin = target_position(alignment, anchor, container, callout, metrics);
    let placed = Rect::from_origin_size(origin, callout);
    let inside = placed.x0 >= container.x0
        && placed.y0 >= container.y0
        && placed.x1 <= container.x1
        && placed.y1 <= container.y1;
    inside.then_some(alignment)
}

/// Inner variant used when no exterior side fits: lean toward the half of the
/// container that has more room next to the anchor.
pub fn inner_fallback(anchor: Rect, container: Rect) -> Alignment {
    let left_room = anchor.x0 - container.x0;
    let right_room = container.x1 - anchor.x1;
    if right_room >= left_room {
        Alignment::InnerRight
    } else {
        Alignment::InnerLeft
    }
}

/// Decide the alignment of a callout of size `callout` pointing at `anchor`
/// inside `container`. Pure; never fails.
pub fn compute_alignment(
    anchor: Rect,
    container: Rect,
    callout: Size,
    previous: Option<Alignment>,
    preferred: PreferredSide,
    metrics: &Metrics,
) -> Alignment {
    let Some(preferred_side) = preferred.side() else {
        return Alignment::Middle;
    };
    let fits = |side: Side| fitting_alignment(side, anchor, container, callout, metrics);

    if let Some(alignment) = fits(preferred_side) {
        return alignment;
    }

    match previous {
        Some(previous) if previous.is_inner() => {
            return Side::RECOVERY_ORDER
                .into_iter()
                .find_map(fits)
                .unwrap_or(previous);
        }
        Some(previous) => {
            if let Some(alignment) = previous.side().and_then(fits) {
                return alignment;
            }
        }
        None => {}
    }

    Side::DEFAULT_ORDER
        .into_iter()
        .find_map(fits)
        .unwrap_or_else(|| inner_fallback(anchor, container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn size() -> Size {
        Size::new(200.0, 120.0)
    }

    #[test]
    fn centered_is_never_overridden() {
        let anchor = Rect::new(0.0, 0.0, 800.0, 600.0);
        let alignment = compute_alignment(
            anchor,
            CONTAINER,
            size(),
            Some(Alignment::TopLeft),
            PreferredSide::Centered,
            &Metrics::default(),
        );
        assert_eq!(alignment, Alignment::Middle);
    }

    #[test]
    fn preferred_side_wins_when_it_fits() {
        let anchor = Rect::new(100.0, 250.0, 140.0, 270.0);
        let metrics = Metrics::default();
        assert_eq!(
            compute_alignment(anchor, CONTAINER, size(), None, PreferredSide::Top, &metrics),
            Alignment::BottomLeft
        );
        assert_eq!(
            compute_alignment(anchor, CONTAINER, size(), None, PreferredSide::Right, &metrics),
            Alignment::LeftTop
        );
    }

    #[test]
    fn previous_side_is_kept_when_preferred_is_blocked() {
        // Anchor near the bottom edge: nothing fits below it.
        let anchor = Rect::new(600.0, 540.0, 640.0, 570.0);
        let metrics = Metrics::default();
        let alignment = compute_alignment(
            anchor,
            CONTAINER,
            size(),
            Some(Alignment::RightBottom),
            PreferredSide::Bottom,
            &metrics,
        );
        assert_eq!(alignment.side(), Some(Side::Left));
        assert_eq!(alignment, Alignment::RightBottom);
    }

    #[test]
    fn without_history_right_is_tried_first() {
        let anchor = Rect::new(100.0, 540.0, 140.0, 570.0);
        let alignment = compute_alignment(
            anchor,
            CONTAINER,
            size(),
            None,
            PreferredSide::Bottom,
            &Metrics::default(),
        );
        assert_eq!(alignment, Alignment::LeftBottom);
    }

    #[test]
    fn inner_previous_recovers_in_priority_order() {
        // Room below and to the right: bottom comes first in the recovery order.
        let anchor = Rect::new(100.0, 100.0, 140.0, 120.0);
        let alignment = compute_alignment(
            anchor,
            CONTAINER,
            size(),
            Some(Alignment::InnerLeft),
            PreferredSide::Left,
            &Metrics::default(),
        );
        assert_eq!(alignment, Alignment::TopLeft);
    }

    #[test]
    fn inner_previous_is_retained_when_nothing_fits() {
        let alignment = compute_alignment(
            CONTAINER,
            CONTAINER,
            size(),
            Some(Alignment::InnerLeft),
            PreferredSide::Bottom,
            &Metrics::default(),
        );
        assert_eq!(alignment, Alignment::InnerLeft);
    }

    #[test]
    fn offscreen_anchor_never_pushes_the_callout_out() {
        // Anchor scrolled past the left edge of the window.
        let anchor = Rect::new(-100.0, 300.0, -60.0, 320.0);
        let metrics = Metrics::default();
        for side in Side::ALL {
            if let Some(alignment) = fitting_alignment(side, anchor, CONTAINER, size(), &metrics) {
                let origin = target_position(alignment, anchor, CONTAINER, size(), &metrics);
                let placed = Rect::from_origin_size(origin, size());
                assert_eq!(CONTAINER.union(placed), CONTAINER, "{:?} escapes", alignment);
            }
        }
        assert_eq!(fitting_alignment(Side::Right, anchor, CONTAINER, size(), &metrics), None);
    }

    #[test]
    fn full_window_anchor_falls_back_inside() {
        let alignment = compute_alignment(
            CONTAINER,
            CONTAINER,
            size(),
            None,
            PreferredSide::Top,
            &Metrics::default(),
        );
        assert!(alignment.is_inner(), "got {:?}", alignment);
    }

    #[test]
    fn side_mapping_is_consistent() {
        for side in Side::ALL {
            for corner in [Corner::Near, Corner::Far] {
                let alignment = side.alignment(corner);
                assert_eq!(alignment.side(), Some(side));
                assert_eq!(alignment.pointer().map(|p| p.corner), Some(corner));
            }
        }
        assert_eq!(Alignment::Middle.side(), None);
        assert_eq!(Alignment::InnerRight.pointer(), None);
    }

    fn anchor_strategy() -> impl Strategy<Value = Rect> {
        (0.0f64..760.0, 0.0f64..580.0, 1.0f64..200.0, 1.0f64..100.0).prop_map(|(x, y, w, h)| {
            Rect::new(x, y, (x + w).min(800.0), (y + h).min(600.0))
        })
    }

    /// Anchors that may straddle or sit beyond the container edges.
    fn wide_anchor_strategy() -> impl Strategy<Value = Rect> {
        (-300.0f64..900.0, -200.0f64..700.0, 1.0f64..200.0, 1.0f64..100.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
    }

    fn callout_strategy() -> impl Strategy<Value = Size> {
        (60.0f64..320.0, 60.0f64..220.0).prop_map(|(w, h)| Size::new(w, h))
    }

    fn preferred_strategy() -> impl Strategy<Value = PreferredSide> {
        prop_oneof![
            Just(PreferredSide::Top),
            Just(PreferredSide::Right),
            Just(PreferredSide::Bottom),
            Just(PreferredSide::Left),
        ]
    }

    fn previous_strategy() -> impl Strategy<Value = Option<Alignment>> {
        prop_oneof![
            Just(None),
            (0usize..Alignment::ALL.len()).prop_map(|i| Some(Alignment::ALL[i])),
        ]
    }

    proptest! {
        #[test]
        fn prop_alignment_is_deterministic(
            anchor in wide_anchor_strategy(),
            callout in callout_strategy(),
            preferred in preferred_strategy(),
            previous in previous_strategy(),
        ) {
            let metrics = Metrics::default();
            let first = compute_alignment(anchor, CONTAINER, callout, previous, preferred, &metrics);
            let second = compute_alignment(anchor, CONTAINER, callout, previous, preferred, &metrics);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_open_side_keeps_callout_inside(
            anchor in wide_anchor_strategy(),
            callout in callout_strategy(),
            preferred in preferred_strategy(),
            previous in previous_strategy(),
        ) {
            let metrics = Metrics::default();
            let any_open = Side::ALL
                .iter()
                .any(|side| fitting_alignment(*side, anchor, CONTAINER, callout, &metrics).is_some());
            prop_assume!(any_open);

            let alignment = compute_alignment(anchor, CONTAINER, callout, previous, preferred, &metrics);
            let origin = target_position(alignment, anchor, CONTAINER, callout, &metrics);
            let placed = Rect::from_origin_size(origin, callout);
            prop_assert!(alignment.side().is_some(), "open side ignored: {:?}", alignment);
            prop_assert!(
                placed.x0 >= CONTAINER.x0 && placed.y0 >= CONTAINER.y0
                    && placed.x1 <= CONTAINER.x1 && placed.y1 <= CONTAINER.y1,
                "{:?} placed at {:?} escapes {:?}", alignment, placed, CONTAINER
            );
        }

        #[test]
        fn prop_mirroring_flips_corner_not_side(
            anchor in anchor_strategy(),
            callout in callout_strategy(),
            below in proptest::bool::ANY,
        ) {
            prop_assume!((anchor.center().x - CONTAINER.center().x).abs() > 1e-6);
            let preferred = if below { PreferredSide::Bottom } else { PreferredSide::Top };
            let metrics = Metrics::default();

            let original = compute_alignment(anchor, CONTAINER, callout, None, preferred, &metrics);
            prop_assume!(original.side() == preferred.side());

            let mirrored_anchor = Rect::new(
                CONTAINER.x1 - anchor.x1,
                anchor.y0,
                CONTAINER.x1 - anchor.x0,
                anchor.y1,
            );
            let mirrored = compute_alignment(mirrored_anchor, CONTAINER, callout, None, preferred, &metrics);

            prop_assert_eq!(mirrored.side(), original.side());
            let corner = |a: Alignment| a.pointer().map(|p| p.corner);
            prop_assert_ne!(corner(mirrored), corner(original));
        }
    }
}
