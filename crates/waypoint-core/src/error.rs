use crate::AnchorKey;
use thiserror::Error;

/// Errors raised while assembling or driving a tour.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TourError {
    /// A step combines options that can never work together. Programmer error,
    /// reported while the tour is built.
    #[error("Invalid configuration for step '{step}': {reason}")]
    InvalidStepConfiguration { step: String, reason: String },
    #[error("Tour '{0}' has no steps")]
    EmptyTour(String),
    /// The anchor is not on screen (yet). Recovered by waiting for it.
    #[error("Anchor '{0}' cannot be resolved")]
    UnresolvableAnchor(AnchorKey),
    #[error("Tour '{0}' was already started")]
    AlreadyStarted(String),
}

impl TourError {
    pub fn invalid_step(step: impl Into<String>, reason: impl Into<String>) -> Self {
        TourError::InvalidStepConfiguration {
            step: step.into(),
            reason: reason.into(),
        }
    }
}
