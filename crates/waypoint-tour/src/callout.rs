//! The positioned speech-bubble window of a step.
//!
//! A [`Callout`] resolves its anchor, asks the [`AlignmentEngine`] where to go and
//! hands the resulting [`CalloutFrame`] to a host-provided [`CalloutSurface`]. It
//! follows the anchor and the host window around until it is advanced, closed or
//! disposed. All of this happens on the UI thread.

use crate::anchor::{Anchor, AnchorRegistry, HostWindow};
use kurbo::{Rect, Size};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};
use waypoint_core::{AnchorKey, AnchorKind, TourError};
use waypoint_events::{Signal, Subscription};
use waypoint_geometry::{Alignment, AlignmentEngine, Metrics, Placement, PreferredSide};

pub const DEFAULT_CALLOUT_SIZE: Size = Size::new(280.0, 140.0);

/// Everything needed to build the callout of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutSpec {
    pub anchor: AnchorKey,
    pub anchor_kind: AnchorKind,
    pub preferred: PreferredSide,
    pub size: Size,
    pub title: String,
    pub text: String,
}

impl CalloutSpec {
    pub fn new(
        anchor: impl Into<AnchorKey>,
        anchor_kind: AnchorKind,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            anchor: anchor.into(),
            anchor_kind,
            preferred: PreferredSide::default(),
            size: DEFAULT_CALLOUT_SIZE,
            title: title.into(),
            text: text.into(),
        }
    }

    /// A callout centered in the host window, pointing at nothing.
    pub fn centered(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new("window", AnchorKind::Window, title, text).preferred(PreferredSide::Centered)
    }

    pub fn preferred(mut self, preferred: PreferredSide) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Reject combinations that can never be laid out.
    pub fn validate(&self, step: &str, metrics: &Metrics) -> Result<(), TourError> {
        if !self.anchor_kind.has_screen_rect() && self.preferred != PreferredSide::Centered {
            return Err(TourError::invalid_step(
                step,
                format!(
                    "a {:?} anchor has no screen rectangle to point at; use a centered callout",
                    self.anchor_kind
                ),
            ));
        }
        if !self.size.width.is_finite() || !self.size.height.is_finite() {
            return Err(TourError::invalid_step(step, "callout size is not finite"));
        }
        let min = metrics.min_callout_size();
        if self.size.width < min.width || self.size.height < min.height {
            return Err(TourError::invalid_step(
                step,
                format!(
                    "callout size {}x{} is below the minimum {}x{}",
                    self.size.width, self.size.height, min.width, min.height
                ),
            ));
        }
        Ok(())
    }
}

/// What a surface should draw, in host window coordinates.
#[derive(Debug, Clone)]
pub struct CalloutFrame {
    pub placement: Placement,
    pub anchor: Rect,
    pub container: Rect,
}

/// How a frame differs from the one presented before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameChange {
    /// First frame after the callout was shown.
    Initial,
    /// Same alignment and outline, new position.
    Moved,
    /// New alignment; the outline was rebuilt.
    Reshaped,
}

/// The toolkit window that actually paints a callout.
pub trait CalloutSurface {
    fn present(&mut self, frame: &CalloutFrame, change: FrameChange);
    /// Take the callout off screen but keep it around.
    fn withdraw(&mut self);
    fn focus(&mut self);
    fn dispose(&mut self);
}

pub trait SurfaceFactory {
    fn create(&self, spec: &CalloutSpec) -> Box<dyn CalloutSurface>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutPhase {
    Unbuilt,
    /// Shown was requested but the anchor is not on screen.
    AwaitingAnchor,
    Positioned,
    Repositioning,
    Hidden,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisposeReason {
    Advanced,
    Closed,
    Silent,
}

#[derive(Default)]
struct CalloutState {
    surface: Option<Box<dyn CalloutSurface>>,
    anchor: Option<Rc<dyn Anchor>>,
    placement: Option<Placement>,
    listeners: Vec<Subscription>,
}

struct CalloutInner {
    spec: CalloutSpec,
    engine: AlignmentEngine,
    anchors: Rc<dyn AnchorRegistry>,
    window: Rc<dyn HostWindow>,
    surfaces: Rc<dyn SurfaceFactory>,
    phase: Cell<CalloutPhase>,
    /// Set while a show, relayout or dispose is running.
    busy: Cell<bool>,
    /// Geometry changed during a recompute.
    dirty: Cell<bool>,
    pending_dispose: Cell<Option<DisposeReason>>,
    pending_focus: Cell<bool>,
    state: RefCell<CalloutState>,
    advanced: Signal<()>,
    closed: Signal<()>,
    relayout: Signal<Alignment>,
}

/// Handle to a callout. Clones share the same window.
#[derive(Clone)]
pub struct Callout {
    inner: Rc<CalloutInner>,
}

impl fmt::Debug for Callout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callout")
            .field("anchor", &self.inner.spec.anchor)
            .field("phase", &self.inner.phase.get())
            .field("alignment", &self.alignment())
            .finish()
    }
}

impl Callout {
    pub fn new(
        spec: CalloutSpec,
        metrics: Metrics,
        anchors: Rc<dyn AnchorRegistry>,
        window: Rc<dyn HostWindow>,
        surfaces: Rc<dyn SurfaceFactory>,
    ) -> Self {
        Self {
            inner: Rc::new(CalloutInner {
                spec,
                engine: AlignmentEngine::new(metrics),
                anchors,
                window,
                surfaces,
                phase: Cell::new(CalloutPhase::Unbuilt),
                busy: Cell::new(false),
                dirty: Cell::new(false),
                pending_dispose: Cell::new(None),
                pending_focus: Cell::new(false),
                state: RefCell::new(CalloutState::default()),
                advanced: Signal::new(),
                closed: Signal::new(),
                relayout: Signal::new(),
            }),
        }
    }

    pub fn spec(&self) -> &CalloutSpec {
        &self.inner.spec
    }

    pub fn phase(&self) -> CalloutPhase {
        self.inner.phase.get()
    }

    /// Alignment of the last presented frame.
    pub fn alignment(&self) -> Option<Alignment> {
        self.inner
            .state
            .try_borrow()
            .ok()
            .and_then(|state| state.placement.as_ref().map(|p| p.alignment))
    }

    pub fn placement(&self) -> Option<Placement> {
        self.inner
            .state
            .try_borrow()
            .ok()
            .and_then(|state| state.placement.clone())
    }

    pub fn on_advanced(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.advanced.connect(move |_| callback())
    }

    pub fn on_closed(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.closed.connect(move |_| callback())
    }

    /// Called with the new alignment whenever a geometry change reshaped the callout.
    pub fn on_relayout(&self, callback: impl Fn(Alignment) + 'static) -> Subscription {
        self.inner.relayout.connect(move |alignment| callback(*alignment))
    }

    /// Present the callout, or start waiting for its anchor. Never fails.
    pub fn show(&self) {
        let inner = &self.inner;
        match inner.phase.get() {
            CalloutPhase::Unbuilt | CalloutPhase::Hidden => {}
            CalloutPhase::Disposed => {
                debug!(anchor = %inner.spec.anchor, "show on a disposed callout ignored");
                return;
            }
            _ => return,
        }
        if inner.busy.replace(true) {
            debug!(anchor = %inner.spec.anchor, "re-entrant show rejected");
            return;
        }
        CalloutInner::present_initial(inner);
        CalloutInner::finish_operation(inner);
    }

    /// Withdraw the surface but keep the callout; a later [`Callout::show`] brings it back.
    pub fn hide(&self) {
        let inner = &self.inner;
        if !matches!(
            inner.phase.get(),
            CalloutPhase::Positioned | CalloutPhase::AwaitingAnchor
        ) {
            return;
        }
        if inner.busy.get() {
            debug!(anchor = %inner.spec.anchor, "hide during a recompute rejected");
            return;
        }
        let listeners = {
            let mut state = inner.state.borrow_mut();
            if let Some(surface) = state.surface.as_mut() {
                surface.withdraw();
            }
            std::mem::take(&mut state.listeners)
        };
        drop(listeners);
        inner.phase.set(CalloutPhase::Hidden);
    }

    /// Bring the surface to the front. Never recomputes geometry.
    pub fn request_focus(&self) {
        let inner = &self.inner;
        if inner.phase.get() == CalloutPhase::Disposed {
            return;
        }
        match inner.state.try_borrow_mut() {
            Ok(mut state) if !inner.busy.get() => {
                if let Some(surface) = state.surface.as_mut() {
                    surface.focus();
                }
            }
            _ => inner.pending_focus.set(true),
        }
    }

    /// The step's expected action happened. Idempotent.
    pub fn trigger_advance(&self) {
        CalloutInner::dispose_with(&self.inner, DisposeReason::Advanced);
    }

    /// The user dismissed the callout. Idempotent.
    pub fn close(&self) {
        CalloutInner::dispose_with(&self.inner, DisposeReason::Closed);
    }

    /// Tear down without notifying anyone, e.g. when the whole tour is cancelled.
    pub fn dispose(&self) {
        CalloutInner::dispose_with(&self.inner, DisposeReason::Silent);
    }
}

impl CalloutInner {
    fn anchor_rect(&self, anchor: Option<&Rc<dyn Anchor>>) -> Option<Rect> {
        if self.spec.anchor_kind == AnchorKind::Window {
            return Some(self.window.bounds());
        }
        anchor
            .filter(|anchor| anchor.is_resolvable())
            .map(|anchor| anchor.bounds())
    }

    fn compute_frame(&self, anchor: Rect, previous: Option<Alignment>) -> CalloutFrame {
        let container = self.window.bounds();
        let placement = self.engine.layout(
            anchor,
            container,
            self.spec.size,
            previous,
            self.spec.preferred,
        );
        CalloutFrame {
            placement,
            anchor,
            container,
        }
    }

    /// Listeners that trigger a recompute: the window, the anchor if known, and the
    /// registry while the anchor is still missing.
    fn watch(this: &Rc<Self>, anchor: Option<&Rc<dyn Anchor>>) -> Vec<Subscription> {
        let mut listeners = Vec::with_capacity(3);

        let weak = Rc::downgrade(this);
        listeners.push(this.window.on_layout_changed(Box::new(move || {
            Self::geometry_changed(&weak);
        })));

        match anchor {
            Some(anchor) => {
                let weak = Rc::downgrade(this);
                listeners.push(anchor.on_bounds_changed(Box::new(move || {
                    Self::geometry_changed(&weak);
                })));
            }
            None if this.spec.anchor_kind != AnchorKind::Window => {
                let weak = Rc::downgrade(this);
                let wanted = this.spec.anchor.clone();
                listeners.push(this.anchors.on_registered(Box::new(move |key| {
                    if *key == wanted {
                        Self::geometry_changed(&weak);
                    }
                })));
            }
            None => {}
        }
        listeners
    }

    fn present_initial(this: &Rc<Self>) {
        let anchor = match this.spec.anchor_kind {
            AnchorKind::Window => None,
            _ => this.anchors.resolve(&this.spec.anchor),
        };
        let listeners = Self::watch(this, anchor.as_ref());
        let rect = this.anchor_rect(anchor.as_ref());

        let old_listeners = {
            let mut state = this.state.borrow_mut();
            state.anchor = anchor;
            std::mem::replace(&mut state.listeners, listeners)
        };
        drop(old_listeners);

        let Some(rect) = rect else {
            let error = TourError::UnresolvableAnchor(this.spec.anchor.clone());
            debug!(%error, "callout waiting for its anchor");
            this.phase.set(CalloutPhase::AwaitingAnchor);
            return;
        };

        let mut state = this.state.borrow_mut();
        let previous = state.placement.as_ref().map(|p| p.alignment);
        let frame = this.compute_frame(rect, previous);
        let surface = state
            .surface
            .get_or_insert_with(|| this.surfaces.create(&this.spec));
        surface.present(&frame, FrameChange::Initial);
        debug!(
            anchor = %this.spec.anchor,
            alignment = ?frame.placement.alignment,
            x = frame.placement.origin.x,
            y = frame.placement.origin.y,
            "callout presented"
        );
        state.placement = Some(frame.placement);
        this.phase.set(CalloutPhase::Positioned);
    }

    fn geometry_changed(weak: &Weak<Self>) {
        let Some(this) = weak.upgrade() else {
            return;
        };
        match this.phase.get() {
            CalloutPhase::AwaitingAnchor | CalloutPhase::Positioned => {}
            CalloutPhase::Repositioning => {
                this.dirty.set(true);
                return;
            }
            _ => return,
        }
        if this.busy.replace(true) {
            this.dirty.set(true);
            return;
        }

        loop {
            this.dirty.set(false);
            match this.phase.get() {
                CalloutPhase::AwaitingAnchor => Self::present_initial(&this),
                CalloutPhase::Positioned => Self::reposition(&this),
                _ => break,
            }
            if !this.dirty.get() || this.pending_dispose.get().is_some() {
                break;
            }
            trace!(anchor = %this.spec.anchor, "coalesced geometry change");
        }
        Self::finish_operation(&this);
    }

    fn reposition(this: &Rc<Self>) {
        this.phase.set(CalloutPhase::Repositioning);

        let reshaped = {
            let mut state = this.state.borrow_mut();
            let rect = this.anchor_rect(state.anchor.as_ref());
            let Some(rect) = rect else {
                debug!(anchor = %this.spec.anchor, "anchor went away; callout waiting");
                if let Some(surface) = state.surface.as_mut() {
                    surface.withdraw();
                }
                this.phase.set(CalloutPhase::AwaitingAnchor);
                return;
            };

            let previous = state.placement.as_ref().map(|p| p.alignment);
            let frame = this.compute_frame(rect, previous);
            let change = if previous == Some(frame.placement.alignment) {
                FrameChange::Moved
            } else {
                FrameChange::Reshaped
            };
            if let Some(surface) = state.surface.as_mut() {
                surface.present(&frame, change);
            }
            trace!(
                anchor = %this.spec.anchor,
                alignment = ?frame.placement.alignment,
                change = ?change,
                "callout recomputed"
            );
            let alignment = frame.placement.alignment;
            state.placement = Some(frame.placement);
            (change == FrameChange::Reshaped).then_some(alignment)
        };

        this.phase.set(CalloutPhase::Positioned);
        if let Some(alignment) = reshaped {
            this.relayout.emit(&alignment);
        }
    }

    /// Leave the busy section and run whatever was requested during it.
    fn finish_operation(this: &Rc<Self>) {
        this.busy.set(false);
        if let Some(reason) = this.pending_dispose.take() {
            Self::dispose_with(this, reason);
            return;
        }
        if this.pending_focus.replace(false) {
            if let Some(surface) = this.state.borrow_mut().surface.as_mut() {
                surface.focus();
            }
        }
    }

    fn dispose_with(this: &Rc<Self>, reason: DisposeReason) {
        if this.phase.get() == CalloutPhase::Disposed {
            return;
        }
        if this.busy.get() {
            if this.pending_dispose.get().is_none() {
                this.pending_dispose.set(Some(reason));
            } else {
                debug!(anchor = %this.spec.anchor, ?reason, "re-entrant dispose rejected");
            }
            return;
        }
        this.busy.set(true);

        match reason {
            DisposeReason::Advanced => this.advanced.emit(&()),
            DisposeReason::Closed => this.closed.emit(&()),
            DisposeReason::Silent => {}
        }

        let (listeners, surface) = {
            let mut state = this.state.borrow_mut();
            state.anchor = None;
            (
                std::mem::take(&mut state.listeners),
                state.surface.take(),
            )
        };
        drop(listeners);
        if let Some(mut surface) = surface {
            surface.dispose();
        }

        this.phase.set(CalloutPhase::Disposed);
        this.pending_dispose.set(None);
        this.pending_focus.set(false);
        this.busy.set(false);
        debug!(anchor = %this.spec.anchor, ?reason, "callout disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorMap, ManualAnchor, ManualWindow};
    use kurbo::Point;

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceCall {
        Present(Alignment, Point, FrameChange),
        Withdraw,
        Focus,
        Dispose,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<SurfaceCall>>>,
        /// Lets a test call back into the callout from inside `present`.
        on_present: RefCell<Option<Box<dyn Fn()>>>,
    }

    struct RecordingSurface {
        recorder: Rc<Recorder>,
    }

    impl CalloutSurface for RecordingSurface {
        fn present(&mut self, frame: &CalloutFrame, change: FrameChange) {
            self.recorder.calls.borrow_mut().push(SurfaceCall::Present(
                frame.placement.alignment,
                frame.placement.origin,
                change,
            ));
            if let Some(hook) = self.recorder.on_present.borrow().as_ref() {
                hook();
            }
        }
        fn withdraw(&mut self) {
            self.recorder.calls.borrow_mut().push(SurfaceCall::Withdraw);
        }
        fn focus(&mut self) {
            self.recorder.calls.borrow_mut().push(SurfaceCall::Focus);
        }
        fn dispose(&mut self) {
            self.recorder.calls.borrow_mut().push(SurfaceCall::Dispose);
        }
    }

    impl SurfaceFactory for Rc<Recorder> {
        fn create(&self, _spec: &CalloutSpec) -> Box<dyn CalloutSurface> {
            Box::new(RecordingSurface {
                recorder: self.clone(),
            })
        }
    }

    struct Fixture {
        anchors: Rc<AnchorMap>,
        window: Rc<ManualWindow>,
        recorder: Rc<Recorder>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                anchors: Rc::new(AnchorMap::new()),
                window: ManualWindow::new(Rect::new(0.0, 0.0, 800.0, 600.0)),
                recorder: Rc::new(Recorder::default()),
            }
        }

        fn callout(&self, spec: CalloutSpec) -> Callout {
            Callout::new(
                spec,
                Metrics::default(),
                self.anchors.clone(),
                self.window.clone(),
                Rc::new(self.recorder.clone()),
            )
        }

        fn calls(&self) -> Vec<SurfaceCall> {
            self.recorder.calls.borrow().clone()
        }
    }

    fn run_button_spec() -> CalloutSpec {
        CalloutSpec::new("run", AnchorKind::Button, "Run", "Press run to execute the process")
            .size(Size::new(200.0, 120.0))
    }

    #[test]
    fn show_presents_once_and_follows_the_anchor() {
        let fixture = Fixture::new();
        let anchor = ManualAnchor::new("run", AnchorKind::Button, Rect::new(500.0, 10.0, 540.0, 30.0));
        fixture.anchors.insert(anchor.clone());

        let callout = fixture.callout(run_button_spec());
        callout.show();
        callout.show();

        assert_eq!(callout.phase(), CalloutPhase::Positioned);
        assert_eq!(
            fixture.calls(),
            vec![SurfaceCall::Present(
                Alignment::TopRight,
                Point::new(350.0, 30.0),
                FrameChange::Initial
            )]
        );

        anchor.set_bounds(Rect::new(480.0, 10.0, 520.0, 30.0));
        assert_eq!(
            fixture.calls().last(),
            Some(&SurfaceCall::Present(
                Alignment::TopRight,
                Point::new(330.0, 30.0),
                FrameChange::Moved
            ))
        );
    }

    #[test]
    fn alignment_change_reshapes_and_notifies() {
        let fixture = Fixture::new();
        let anchor = ManualAnchor::new("run", AnchorKind::Button, Rect::new(500.0, 10.0, 540.0, 30.0));
        fixture.anchors.insert(anchor.clone());
        let callout = fixture.callout(run_button_spec());
        let relayouts = Rc::new(RefCell::new(Vec::new()));
        let sink = relayouts.clone();
        let _sub = callout.on_relayout(move |alignment| sink.borrow_mut().push(alignment));

        callout.show();
        fixture.window.set_bounds(Rect::new(0.0, 0.0, 800.0, 35.0));

        assert_eq!(*relayouts.borrow(), vec![Alignment::InnerLeft]);
        assert!(matches!(
            fixture.calls().last(),
            Some(SurfaceCall::Present(Alignment::InnerLeft, _, FrameChange::Reshaped))
        ));
        assert_eq!(callout.alignment(), Some(Alignment::InnerLeft));
    }

    #[test]
    fn missing_anchor_waits_then_presents() {
        let fixture = Fixture::new();
        let callout = fixture.callout(run_button_spec());

        callout.show();
        assert_eq!(callout.phase(), CalloutPhase::AwaitingAnchor);
        assert!(fixture.calls().is_empty());
        assert_eq!(fixture.anchors.listener_count(), 1);

        fixture.anchors.insert(ManualAnchor::new(
            "run",
            AnchorKind::Button,
            Rect::new(500.0, 10.0, 540.0, 30.0),
        ));

        assert_eq!(callout.phase(), CalloutPhase::Positioned);
        assert_eq!(fixture.calls().len(), 1);
        assert_eq!(fixture.anchors.listener_count(), 0);
    }

    #[test]
    fn unresolvable_anchor_resumes_when_it_appears() {
        let fixture = Fixture::new();
        let anchor = ManualAnchor::unresolved("run", AnchorKind::Button);
        fixture.anchors.insert(anchor.clone());
        let callout = fixture.callout(run_button_spec());

        callout.show();
        assert_eq!(callout.phase(), CalloutPhase::AwaitingAnchor);

        anchor.set_bounds(Rect::new(100.0, 100.0, 140.0, 120.0));
        assert_eq!(callout.phase(), CalloutPhase::Positioned);

        anchor.set_resolvable(false);
        assert_eq!(callout.phase(), CalloutPhase::AwaitingAnchor);
        assert_eq!(fixture.calls().last(), Some(&SurfaceCall::Withdraw));
    }

    #[test]
    fn advance_is_idempotent_and_releases_listeners() {
        let fixture = Fixture::new();
        let anchor = ManualAnchor::new("run", AnchorKind::Button, Rect::new(500.0, 10.0, 540.0, 30.0));
        fixture.anchors.insert(anchor.clone());
        let callout = fixture.callout(run_button_spec());
        let advanced = Rc::new(Cell::new(0));
        let counter = advanced.clone();
        let _sub = callout.on_advanced(move || counter.set(counter.get() + 1));

        callout.show();
        assert_eq!(anchor.listener_count(), 1);
        assert_eq!(fixture.window.listener_count(), 1);

        callout.trigger_advance();
        callout.trigger_advance();
        callout.close();

        assert_eq!(advanced.get(), 1);
        assert_eq!(callout.phase(), CalloutPhase::Disposed);
        assert_eq!(anchor.listener_count(), 0);
        assert_eq!(fixture.window.listener_count(), 0);
        assert_eq!(fixture.calls().last(), Some(&SurfaceCall::Dispose));

        anchor.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        callout.show();
        assert_eq!(callout.phase(), CalloutPhase::Disposed);
    }

    #[test]
    fn close_fires_closed_not_advanced() {
        let fixture = Fixture::new();
        let callout = fixture.callout(CalloutSpec::centered("Welcome", "Let's get started"));
        let closed = Rc::new(Cell::new(false));
        let advanced = Rc::new(Cell::new(false));
        let (c, a) = (closed.clone(), advanced.clone());
        let _closed = callout.on_closed(move || c.set(true));
        let _advanced = callout.on_advanced(move || a.set(true));

        callout.show();
        assert_eq!(callout.alignment(), Some(Alignment::Middle));
        callout.close();

        assert!(closed.get());
        assert!(!advanced.get());
    }

    #[test]
    fn close_during_present_is_deferred() {
        let fixture = Fixture::new();
        let callout = fixture.callout(CalloutSpec::centered("Welcome", "Let's get started"));
        let reentrant = callout.clone();
        *fixture.recorder.on_present.borrow_mut() = Some(Box::new(move || {
            reentrant.show();
            reentrant.request_focus();
            reentrant.close();
        }));

        callout.show();

        assert_eq!(callout.phase(), CalloutPhase::Disposed);
        let calls = fixture.calls();
        assert_eq!(calls.len(), 2, "{:?}", calls);
        assert_eq!(calls[1], SurfaceCall::Dispose);
    }

    #[test]
    fn hide_withdraws_and_show_restores() {
        let fixture = Fixture::new();
        let callout = fixture.callout(CalloutSpec::centered("Welcome", "Let's get started"));
        callout.show();
        callout.hide();

        assert_eq!(callout.phase(), CalloutPhase::Hidden);
        assert_eq!(fixture.window.listener_count(), 0);

        callout.show();
        callout.request_focus();
        let calls = fixture.calls();
        assert_eq!(calls[1], SurfaceCall::Withdraw);
        assert!(matches!(calls[2], SurfaceCall::Present(Alignment::Middle, _, FrameChange::Initial)));
        assert_eq!(calls[3], SurfaceCall::Focus);
    }

    #[test]
    fn window_anchor_with_pointer_side_is_rejected() {
        let spec = CalloutSpec::new("window", AnchorKind::Window, "Subprocess", "Enter it")
            .preferred(PreferredSide::Bottom);
        let error = spec.validate("enter-subprocess", &Metrics::default()).unwrap_err();
        assert!(matches!(error, TourError::InvalidStepConfiguration { .. }));

        let tiny = run_button_spec().size(Size::new(20.0, 20.0));
        assert!(tiny.validate("tiny", &Metrics::default()).is_err());
        let nan = run_button_spec().size(Size::new(f64::NAN, 100.0));
        assert!(nan.validate("nan", &Metrics::default()).is_err());
        assert!(run_button_spec().validate("ok", &Metrics::default()).is_ok());
    }
}
