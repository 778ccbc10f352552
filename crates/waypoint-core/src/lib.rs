use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod progress;

pub use error::TourError;
pub use progress::TourProgress;

/// Identifies one guided tour, e.g. `"getting-started"`.
///
/// The key is what the persistence port stores progress under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TourKey(pub String);

impl TourKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TourKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lookup key of an anchor: a button action id, a dockable panel key,
/// or the name of a domain object shown in a diagram.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorKey(pub String);

impl AnchorKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AnchorKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What kind of UI element an anchor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorKind {
    /// A push button or toolbar action.
    Button,
    /// A dockable panel of the workbench.
    Dockable,
    /// A domain object highlighted inside a diagram, e.g. an operator.
    DomainObject,
    /// The main window itself. Has no rectangle worth pointing at.
    Window,
}

impl AnchorKind {
    /// Whether a pointer can meaningfully aim at this kind of anchor.
    pub fn has_screen_rect(self) -> bool {
        !matches!(self, AnchorKind::Window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_display_their_raw_value() {
        assert_eq!(TourKey::new("intro").to_string(), "intro");
        assert_eq!(AnchorKey::from("run-button").as_str(), "run-button");
    }

    #[test]
    fn window_anchor_has_no_screen_rect() {
        assert!(!AnchorKind::Window.has_screen_rect());
        assert!(AnchorKind::Button.has_screen_rect());
        assert!(AnchorKind::Dockable.has_screen_rect());
        assert!(AnchorKind::DomainObject.has_screen_rect());
    }

    #[test]
    fn tour_key_serializes_as_plain_string() {
        let json = serde_json::to_string(&TourKey::new("intro")).unwrap();
        assert_eq!(json, "\"intro\"");
    }
}
