use std::rc::Rc;
use waypoint_geometry::kurbo::{Rect, Size};
use waypoint_tour::{CalloutSpec, Step};

/// A tour of `step_count` steps where every third step shares the previous
/// step's precondition and every fifth brings a new one.
pub fn synthetic_steps(step_count: usize) -> Vec<Rc<Step>> {
    let mut steps = Vec::with_capacity(step_count);
    let mut shared: Option<Rc<Step>> = None;
    for i in 0..step_count {
        if i % 5 == 0 {
            shared = Some(
                Step::builder(format!("precondition_{i}"))
                    .callout(CalloutSpec::centered(format!("Precondition {i}"), "Get ready"))
                    .build(),
            );
        }
        let mut builder = Step::builder(format!("step_{i}"))
            .callout(CalloutSpec::centered(format!("Step {i}"), "Do the thing"));
        if i % 3 != 0 {
            if let Some(precondition) = &shared {
                builder = builder.precondition(precondition.clone());
            }
        }
        steps.push(builder.build());
    }
    steps
}

/// Anchors spread over a grid covering `container`, including its edges.
pub fn anchor_grid(container: Rect, columns: usize, rows: usize, anchor: Size) -> Vec<Rect> {
    let mut anchors = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for column in 0..columns {
            let x = container.x0
                + (container.width() - anchor.width) * column as f64 / (columns.max(2) - 1) as f64;
            let y = container.y0
                + (container.height() - anchor.height) * row as f64 / (rows.max(2) - 1) as f64;
            anchors.push(Rect::new(x, y, x + anchor.width, y + anchor.height));
        }
    }
    anchors
}
