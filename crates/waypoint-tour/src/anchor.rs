//! Ports to the host UI: the things a callout points at and the window it lives in.

use kurbo::Rect;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use waypoint_core::{AnchorKey, AnchorKind};
use waypoint_events::{Signal, Subscription};

/// Something on screen a callout can point at.
pub trait Anchor {
    fn key(&self) -> &AnchorKey;
    fn kind(&self) -> AnchorKind;
    /// Screen rectangle. Only meaningful while [`Anchor::is_resolvable`] holds.
    fn bounds(&self) -> Rect;
    fn is_resolvable(&self) -> bool;
    /// Called whenever the bounds or the resolvability change.
    fn on_bounds_changed(&self, callback: Box<dyn Fn()>) -> Subscription;
}

/// Lookup of anchors by key.
pub trait AnchorRegistry {
    fn resolve(&self, key: &AnchorKey) -> Option<Rc<dyn Anchor>>;

    /// Called when an anchor is added under some key. Registries whose set of
    /// anchors never changes can keep the default.
    fn on_registered(&self, _callback: Box<dyn Fn(&AnchorKey)>) -> Subscription {
        Subscription::new(|| {})
    }
}

/// The window that contains every callout of a tour.
pub trait HostWindow {
    fn bounds(&self) -> Rect;
    /// Called on resize, move and docking layout changes.
    fn on_layout_changed(&self, callback: Box<dyn Fn()>) -> Subscription;
}

/// Anchor whose geometry is pushed in by the host toolkit.
pub struct ManualAnchor {
    key: AnchorKey,
    kind: AnchorKind,
    bounds: Cell<Rect>,
    resolvable: Cell<bool>,
    changed: Signal<()>,
}

impl ManualAnchor {
    pub fn new(key: impl Into<AnchorKey>, kind: AnchorKind, bounds: Rect) -> Rc<Self> {
        Rc::new(Self {
            key: key.into(),
            kind,
            bounds: Cell::new(bounds),
            resolvable: Cell::new(true),
            changed: Signal::new(),
        })
    }

    /// An anchor that is known but not on screen yet, e.g. an undocked panel.
    pub fn unresolved(key: impl Into<AnchorKey>, kind: AnchorKind) -> Rc<Self> {
        let anchor = Self::new(key, kind, Rect::ZERO);
        anchor.resolvable.set(false);
        anchor
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.bounds.set(bounds);
        self.resolvable.set(true);
        self.changed.emit(&());
    }

    pub fn set_resolvable(&self, resolvable: bool) {
        if self.resolvable.replace(resolvable) != resolvable {
            self.changed.emit(&());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.changed.listener_count()
    }
}

impl Anchor for ManualAnchor {
    fn key(&self) -> &AnchorKey {
        &self.key
    }

    fn kind(&self) -> AnchorKind {
        self.kind
    }

    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn is_resolvable(&self) -> bool {
        self.resolvable.get()
    }

    fn on_bounds_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.changed.connect(move |_| callback())
    }
}

impl fmt::Debug for ManualAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualAnchor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("bounds", &self.bounds.get())
            .field("resolvable", &self.resolvable.get())
            .finish()
    }
}

/// Keyed registry backed by a hash map.
#[derive(Default)]
pub struct AnchorMap {
    anchors: RefCell<HashMap<AnchorKey, Rc<dyn Anchor>>>,
    registered: Signal<AnchorKey>,
}

impl AnchorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, anchor: Rc<dyn Anchor>) {
        let key = anchor.key().clone();
        self.anchors.borrow_mut().insert(key.clone(), anchor);
        self.registered.emit(&key);
    }

    pub fn remove(&self, key: &AnchorKey) -> Option<Rc<dyn Anchor>> {
        self.anchors.borrow_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.anchors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.borrow().is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.registered.listener_count()
    }
}

impl AnchorRegistry for AnchorMap {
    fn resolve(&self, key: &AnchorKey) -> Option<Rc<dyn Anchor>> {
        self.anchors.borrow().get(key).cloned()
    }

    fn on_registered(&self, callback: Box<dyn Fn(&AnchorKey)>) -> Subscription {
        self.registered.connect(move |key| callback(key))
    }
}

/// Window whose bounds are pushed in by the host toolkit.
#[derive(Debug)]
pub struct ManualWindow {
    bounds: Cell<Rect>,
    layout_changed: Signal<()>,
}

impl ManualWindow {
    pub fn new(bounds: Rect) -> Rc<Self> {
        Rc::new(Self {
            bounds: Cell::new(bounds),
            layout_changed: Signal::new(),
        })
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.bounds.set(bounds);
        self.layout_changed.emit(&());
    }

    /// Docking layout changed without the window itself moving.
    pub fn notify_layout_changed(&self) {
        self.layout_changed.emit(&());
    }

    pub fn listener_count(&self) -> usize {
        self.layout_changed.listener_count()
    }
}

impl HostWindow for ManualWindow {
    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn on_layout_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.layout_changed.connect(move |_| callback())
    }
}
