use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "waypoint::events::telemetry";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepLifecycle {
    Started,
    Shown,
    Skipped,
    Advanced,
    Cancelled,
    Finished,
}

impl fmt::Display for StepLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "step_started"),
            Self::Shown => write!(f, "step_shown"),
            Self::Skipped => write!(f, "step_skipped"),
            Self::Advanced => write!(f, "step_advanced"),
            Self::Cancelled => write!(f, "step_cancelled"),
            Self::Finished => write!(f, "tour_finished"),
        }
    }
}

/// One structured record of a tour run, keyed by the run's correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTelemetry {
    pub run_id: String,
    pub tour: String,
    pub step: String,
    pub sequence_index: u32,
    pub lifecycle: StepLifecycle,
}

impl StepTelemetry {
    pub fn new(
        lifecycle: StepLifecycle,
        run_id: &str,
        tour: &str,
        step: &str,
        sequence_index: u32,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            tour: tour.to_string(),
            step: step.to_string(),
            sequence_index,
            lifecycle,
        }
    }

    fn now_unix_ms() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Log a step transition and hand the record back to the caller.
pub fn step_event(
    lifecycle: StepLifecycle,
    run_id: &str,
    tour: &str,
    step: &str,
    sequence_index: u32,
) -> StepTelemetry {
    let telemetry = StepTelemetry::new(lifecycle, run_id, tour, step, sequence_index);
    info!(
        target: TELEMETRY_TARGET,
        run_id = %telemetry.run_id,
        tour = %telemetry.tour,
        step = %telemetry.step,
        sequence_index = telemetry.sequence_index,
        lifecycle = %telemetry.lifecycle,
        timestamp_ms = StepTelemetry::now_unix_ms(),
        "{}",
        telemetry.lifecycle
    );
    telemetry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_uuid_like() {
        let id = new_run_id();
        assert_eq!(id.len(), 36);
        assert_ne!(id, new_run_id());
    }

    #[test]
    fn step_event_returns_record() {
        let run_id = new_run_id();
        let record = step_event(StepLifecycle::Advanced, &run_id, "intro", "add-operator", 3);
        assert_eq!(record.lifecycle, StepLifecycle::Advanced);
        assert_eq!(record.sequence_index, 3);
        assert_eq!(record.step, "add-operator");
        assert_eq!(StepLifecycle::Cancelled.to_string(), "step_cancelled");
    }
}
