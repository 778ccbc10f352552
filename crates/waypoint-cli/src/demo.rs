//! A scripted "first process" tour against a fake workbench, run without a GUI.

use kurbo::{Rect, Size};
use std::cell::Cell;
use std::rc::Rc;
use tracing::info;
use waypoint_core::{AnchorKind, TourKey};
use waypoint_events::{AppEvent, EventBus, EventKind};
use waypoint_geometry::{Metrics, PreferredSide};
use waypoint_storage::ProgressStore;
use waypoint_tour::{
    AnchorMap, CalloutFrame, CalloutSpec, CalloutSurface, FrameChange, ManualAnchor, ManualWindow,
    Step, SurfaceFactory, Tour, TourHost, TourOutcome,
};

pub const DEMO_TOUR: &str = "first-process";
const MAX_TURNS: usize = 16;

/// Prints every frame instead of painting it.
struct ConsoleSurface {
    title: String,
}

impl CalloutSurface for ConsoleSurface {
    fn present(&mut self, frame: &CalloutFrame, change: FrameChange) {
        let placement = &frame.placement;
        println!(
            "  [{:?}] {:<24} {:?} at ({:.0}, {:.0}) size {:.0}x{:.0}",
            change,
            self.title,
            placement.alignment,
            placement.origin.x,
            placement.origin.y,
            placement.size.width,
            placement.size.height
        );
    }

    fn withdraw(&mut self) {
        println!("  [Withdrawn] {}", self.title);
    }

    fn focus(&mut self) {}

    fn dispose(&mut self) {
        println!("  [Disposed] {}", self.title);
    }
}

struct ConsoleSurfaces;

impl SurfaceFactory for ConsoleSurfaces {
    fn create(&self, spec: &CalloutSpec) -> Box<dyn CalloutSurface> {
        Box::new(ConsoleSurface {
            title: spec.title.clone(),
        })
    }
}

pub struct DemoOptions {
    pub metrics: Metrics,
    pub callout_size: Size,
    /// Sequence index at which the simulated user closes the callout.
    pub close_at: Option<u32>,
}

fn steps(size: Size, operators_visible: Rc<Cell<bool>>) -> Vec<Rc<Step>> {
    let show_operators = Step::builder("show-operators")
        .callout(
            CalloutSpec::new(
                "view_menu",
                AnchorKind::Button,
                "Open the Operators panel",
                "Use View > Show Panel > Operators",
            )
            .size(size),
        )
        .completes_on(EventKind::DockableShown, |event| {
            matches!(event, AppEvent::DockableShown { key } if key == "operators")
        })
        .skip_when(move || operators_visible.get())
        .build();

    vec![
        Step::builder("welcome")
            .callout(CalloutSpec::centered("Welcome", "Let's build a first process").size(size))
            .build(),
        Step::builder("add-retrieve")
            .callout(
                CalloutSpec::new(
                    "operators",
                    AnchorKind::Dockable,
                    "Add a Retrieve operator",
                    "Drag Retrieve into the process",
                )
                .preferred(PreferredSide::Right)
                .size(size),
            )
            .completes_on(EventKind::OperatorAdded, |event| {
                matches!(event, AppEvent::OperatorAdded { operator_type, .. } if operator_type == "retrieve")
            })
            .precondition(show_operators)
            .build(),
        Step::builder("run-process")
            .callout(
                CalloutSpec::new("run", AnchorKind::Button, "Run it", "Press the run button")
                    .size(size),
            )
            .completes_on(EventKind::ProcessFinished, |event| {
                matches!(event, AppEvent::ProcessFinished { success: true })
            })
            .build(),
    ]
}

/// Run the demo tour and return how it ended.
pub fn run(store: Rc<dyn ProgressStore>, options: DemoOptions) -> anyhow::Result<TourOutcome> {
    let bus = EventBus::new();
    let window = ManualWindow::new(Rect::new(0.0, 0.0, 1280.0, 800.0));
    let anchors = Rc::new(AnchorMap::new());
    anchors.insert(ManualAnchor::new(
        "view_menu",
        AnchorKind::Button,
        Rect::new(60.0, 0.0, 110.0, 24.0),
    ));
    anchors.insert(ManualAnchor::new(
        "run",
        AnchorKind::Button,
        Rect::new(640.0, 30.0, 670.0, 60.0),
    ));
    let operators_visible = Rc::new(Cell::new(false));

    let host = TourHost {
        bus: bus.clone(),
        anchors: anchors.clone(),
        window: window.clone(),
        surfaces: Rc::new(ConsoleSurfaces),
        store,
        metrics: options.metrics,
    };
    let mut tour = Tour::new(
        TourKey::new(DEMO_TOUR),
        &steps(options.callout_size, operators_visible.clone()),
        host,
    )?;
    info!(run_id = tour.run_id(), "Running demo tour");

    tour.start()?;
    while !tour.is_finished() {
        let Some(node) = tour.current().cloned() else {
            if tour.run_until_idle(MAX_TURNS) == 0 {
                anyhow::bail!("demo tour stalled between steps");
            }
            continue;
        };
        println!("step {}/{}: {}", node.sequence_index, node.total_length, node.name());

        if options.close_at == Some(node.sequence_index) {
            if let Some(callout) = tour.current_callout() {
                callout.close();
            }
            tour.run_until_idle(MAX_TURNS);
            continue;
        }

        match node.name() {
            "welcome" => {
                if let Some(callout) = tour.current_callout() {
                    callout.trigger_advance();
                }
            }
            "show-operators" => {
                operators_visible.set(true);
                bus.publish(AppEvent::DockableShown {
                    key: "operators".to_string(),
                });
            }
            "add-retrieve" => {
                // The panel docks in only now; the callout was waiting for it.
                anchors.insert(ManualAnchor::new(
                    "operators",
                    AnchorKind::Dockable,
                    Rect::new(0.0, 80.0, 260.0, 780.0),
                ));
                window.set_bounds(Rect::new(0.0, 0.0, 1024.0, 768.0));
                bus.publish(AppEvent::OperatorAdded {
                    operator: "Retrieve Iris".to_string(),
                    operator_type: "retrieve".to_string(),
                });
            }
            "run-process" => {
                bus.publish(AppEvent::ProcessStarted);
                bus.publish(AppEvent::ProcessFinished { success: true });
            }
            other => anyhow::bail!("demo has no script for step '{other}'"),
        }
        tour.run_until_idle(MAX_TURNS);
    }

    tour.outcome()
        .ok_or_else(|| anyhow::anyhow!("demo tour ended without an outcome"))
}
