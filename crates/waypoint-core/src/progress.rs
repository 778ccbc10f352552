use crate::TourKey;
use serde::{Deserialize, Serialize};

/// Persisted progress of one tour.
///
/// `highest_index_reached` never decreases and `completed` never flips back
/// to `false`; [`TourProgress::merge`] is the only way two records combine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourProgress {
    pub tour_key: TourKey,
    pub highest_index_reached: u32,
    pub total_length: u32,
    pub completed: bool,
}

impl TourProgress {
    /// Progress of a tour that was never started.
    pub fn untouched(tour_key: TourKey) -> Self {
        Self {
            tour_key,
            highest_index_reached: 0,
            total_length: 0,
            completed: false,
        }
    }

    /// Combine a stored record with a newer one without losing ground.
    pub fn merge(&self, newer: &TourProgress) -> TourProgress {
        TourProgress {
            tour_key: self.tour_key.clone(),
            highest_index_reached: self.highest_index_reached.max(newer.highest_index_reached),
            total_length: self.total_length.max(newer.total_length),
            completed: self.completed || newer.completed,
        }
    }

    /// Record that the step with `sequence_index` was reached.
    pub fn reached(&self, sequence_index: u32, total_length: u32, completed: bool) -> TourProgress {
        self.merge(&TourProgress {
            tour_key: self.tour_key.clone(),
            highest_index_reached: sequence_index,
            total_length,
            completed,
        })
    }

    /// Fraction of the tour seen so far, in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.total_length == 0 {
            return 0.0;
        }
        (self.highest_index_reached as f32 / self.total_length as f32).min(1.0)
    }
}
