//! Floating-panel lifecycle, dismissal, and placement.
//!
//! An [`Overlay`] coordinates one panel bound to one or more triggers:
//! it owns the Closed/Open state machine, the dismissal policy (Escape,
//! outside click, ambient scroll, debounced resize reposition), and the
//! viewport-relative placement math. The panel and triggers are opaque
//! host handles; the overlay only toggles visibility and applies
//! computed placements.
//!
//! [`FullscreenOverlay`] is the no-placement variant used for the
//! mobile menu and the categories sheet: it locks ambient page
//! scrolling while open and closes on backdrop clicks.

use std::cell::RefCell;
use std::rc::Rc;

use flourish_core::Point;

use crate::config::{FullscreenOverlayOptions, OverlayOptions};
use crate::error::BindError;
use crate::host::{
    ElementRef, HorizontalPlacement, HostRef, Key, ListenerGuard, PageEvent, PageEventKind,
    Placement, TimerId,
};

/// Callback invoked on a lifecycle transition.
pub type LifecycleCallback = Rc<dyn Fn()>;

/// One floating panel bound to one or more triggers.
///
/// Whichever trigger was last activated becomes the active anchor for
/// that open cycle. Dropping the overlay unregisters every page
/// listener and cancels any pending reposition timer.
pub struct Overlay {
    inner: Rc<RefCell<OverlayInner>>,
    _guards: Vec<ListenerGuard>,
}

struct OverlayInner {
    host: HostRef,
    panel: ElementRef,
    triggers: Vec<ElementRef>,
    active_trigger: usize,
    options: OverlayOptions,
    is_open: bool,
    last_placement: Option<Placement>,
    resize_timer: Option<TimerId>,
    on_open: Option<LifecycleCallback>,
    on_close: Option<LifecycleCallback>,
}

impl Overlay {
    /// Bind a panel to its triggers.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingTarget`] when the panel handle is
    /// absent and [`BindError::NoTriggers`] when the trigger list is
    /// empty. Callers log and skip the instance; siblings are
    /// unaffected.
    pub fn bind(
        host: &HostRef,
        panel: Option<ElementRef>,
        triggers: Vec<ElementRef>,
        options: OverlayOptions,
    ) -> Result<Self, BindError> {
        let panel = panel.ok_or(BindError::MissingTarget { role: "panel" })?;
        if triggers.is_empty() {
            return Err(BindError::NoTriggers);
        }

        let inner = Rc::new(RefCell::new(OverlayInner {
            host: Rc::clone(host),
            panel,
            triggers,
            active_trigger: 0,
            options,
            is_open: false,
            last_placement: None,
            resize_timer: None,
            on_open: None,
            on_close: None,
        }));

        let mut guards = Vec::new();
        let options = inner.borrow().options.clone();

        {
            let weak = Rc::downgrade(&inner);
            guards.push(ListenerGuard::register(
                host,
                PageEventKind::Click,
                Rc::new(move |event| {
                    if let (Some(inner), PageEvent::Click(point)) = (weak.upgrade(), event) {
                        handle_click(&inner, *point);
                    }
                }),
            ));
        }

        if options.close_on_escape {
            let weak = Rc::downgrade(&inner);
            guards.push(ListenerGuard::register(
                host,
                PageEventKind::KeyDown,
                Rc::new(move |event| {
                    if let (Some(inner), PageEvent::KeyDown(Key::Escape)) = (weak.upgrade(), event)
                        && inner.borrow().is_open
                    {
                        close(&inner);
                    }
                }),
            ));
        }

        if options.close_on_scroll {
            let weak = Rc::downgrade(&inner);
            guards.push(ListenerGuard::register(
                host,
                PageEventKind::Scroll,
                Rc::new(move |_| {
                    if let Some(inner) = weak.upgrade()
                        && inner.borrow().is_open
                    {
                        close(&inner);
                    }
                }),
            ));
        }

        if options.reposition_on_resize {
            let weak = Rc::downgrade(&inner);
            guards.push(ListenerGuard::register(
                host,
                PageEventKind::Resize,
                Rc::new(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        handle_resize(&inner);
                    }
                }),
            ));
        }

        Ok(Self {
            inner,
            _guards: guards,
        })
    }

    /// Flip between Open and Closed.
    pub fn toggle(&self) {
        if self.is_open() {
            close(&self.inner);
        } else {
            open(&self.inner);
        }
    }

    /// Open: compute placement, show the panel, run `on_open`.
    ///
    /// Opening an already-open overlay re-runs the same effect.
    pub fn open(&self) {
        open(&self.inner);
    }

    /// Close: hide the panel, run `on_close`.
    ///
    /// Closing an already-closed overlay re-runs the same effect.
    pub fn close(&self) {
        close(&self.inner);
    }

    /// Whether the overlay is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.borrow().is_open
    }

    /// Geometry cached from the last positioning pass.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.inner.borrow().last_placement
    }

    /// Index of the trigger that anchors the current open cycle.
    #[must_use]
    pub fn active_trigger(&self) -> usize {
        self.inner.borrow().active_trigger
    }

    /// Invoke `callback` on every open, after the panel is visible.
    ///
    /// Consumers use this to render panel content lazily, only while
    /// visible.
    pub fn set_on_open(&self, callback: impl Fn() + 'static) {
        self.inner.borrow_mut().on_open = Some(Rc::new(callback));
    }

    /// Invoke `callback` on every close, after the panel is hidden.
    pub fn set_on_close(&self, callback: impl Fn() + 'static) {
        self.inner.borrow_mut().on_close = Some(Rc::new(callback));
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        let state = self.inner.borrow();
        if let Some(timer) = state.resize_timer {
            state.host.clear_timeout(timer);
        }
    }
}

fn handle_click(inner: &Rc<RefCell<OverlayInner>>, point: Point) {
    let trigger_hit = {
        let state = inner.borrow();
        state
            .triggers
            .iter()
            .position(|trigger| trigger.contains(point))
    };

    if let Some(index) = trigger_hit {
        let was_open = {
            let mut state = inner.borrow_mut();
            state.active_trigger = index;
            state.is_open
        };
        if was_open {
            close(inner);
        } else {
            open(inner);
        }
        return;
    }

    let dismiss = {
        let state = inner.borrow();
        state.is_open && state.options.close_on_outside_click && !state.panel.contains(point)
    };
    if dismiss {
        close(inner);
    }
}

fn handle_resize(inner: &Rc<RefCell<OverlayInner>>) {
    let pending = {
        let state = inner.borrow();
        if !state.is_open {
            return;
        }
        state.resize_timer
    };
    let host = Rc::clone(&inner.borrow().host);
    if let Some(timer) = pending {
        host.clear_timeout(timer);
    }

    let weak = Rc::downgrade(inner);
    let delay = inner.borrow().options.resize_debounce_ms;
    let timer = host.set_timeout(
        delay,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                reposition(&inner);
            }
        }),
    );
    inner.borrow_mut().resize_timer = Some(timer);
}

fn open(inner: &Rc<RefCell<OverlayInner>>) {
    let callback = {
        let mut state = inner.borrow_mut();
        let placement = compute_placement(&state);
        state.last_placement = Some(placement);
        state.panel.apply_placement(placement);
        state.panel.set_visible(true);
        state.is_open = true;
        tracing::debug!(trigger = state.active_trigger, "overlay opened");
        state.on_open.clone()
    };
    if let Some(callback) = callback {
        callback();
    }
}

fn close(inner: &Rc<RefCell<OverlayInner>>) {
    let callback = {
        let mut state = inner.borrow_mut();
        state.panel.set_visible(false);
        state.is_open = false;
        tracing::debug!("overlay closed");
        state.on_close.clone()
    };
    if let Some(callback) = callback {
        callback();
    }
}

fn reposition(inner: &Rc<RefCell<OverlayInner>>) {
    let mut state = inner.borrow_mut();
    state.resize_timer = None;
    if !state.is_open {
        return;
    }
    let placement = compute_placement(&state);
    state.last_placement = Some(placement);
    state.panel.apply_placement(placement);
}

fn compute_placement(state: &OverlayInner) -> Placement {
    let anchor = state
        .triggers
        .get(state.active_trigger)
        .or_else(|| state.triggers.first());
    let rect = anchor.map_or_else(flourish_core::Rect::default, |trigger| {
        trigger.bounding_box()
    });

    let viewport = state.host.viewport();
    let top = rect.bottom() + state.host.page_scroll_offset() + state.options.gap;

    let horizontal = if viewport.width >= state.options.mobile_breakpoint {
        HorizontalPlacement::RightAligned {
            right: viewport.width - rect.right(),
        }
    } else {
        HorizontalPlacement::Centered
    };

    Placement { top, horizontal }
}

/// A fullscreen overlay: no placement, page scroll locked while open.
///
/// Used for the mobile menu and the categories sheet. The optional
/// `content` handle distinguishes backdrop clicks (inside the panel,
/// outside the content) from clicks on the sheet itself.
pub struct FullscreenOverlay {
    inner: Rc<RefCell<FullscreenInner>>,
    _guards: Vec<ListenerGuard>,
}

struct FullscreenInner {
    host: HostRef,
    panel: ElementRef,
    content: Option<ElementRef>,
    trigger: ElementRef,
    options: FullscreenOverlayOptions,
    is_open: bool,
}

impl FullscreenOverlay {
    /// Bind a fullscreen panel to its trigger.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingTarget`] when the panel or trigger
    /// handle is absent.
    pub fn bind(
        host: &HostRef,
        panel: Option<ElementRef>,
        content: Option<ElementRef>,
        trigger: Option<ElementRef>,
        options: FullscreenOverlayOptions,
    ) -> Result<Self, BindError> {
        let panel = panel.ok_or(BindError::MissingTarget { role: "panel" })?;
        let trigger = trigger.ok_or(BindError::MissingTarget { role: "trigger" })?;

        let inner = Rc::new(RefCell::new(FullscreenInner {
            host: Rc::clone(host),
            panel,
            content,
            trigger,
            options: options.clone(),
            is_open: false,
        }));

        let mut guards = Vec::new();

        {
            let weak = Rc::downgrade(&inner);
            guards.push(ListenerGuard::register(
                host,
                PageEventKind::Click,
                Rc::new(move |event| {
                    if let (Some(inner), PageEvent::Click(point)) = (weak.upgrade(), event) {
                        fullscreen_click(&inner, *point);
                    }
                }),
            ));
        }

        if options.close_on_escape {
            let weak = Rc::downgrade(&inner);
            guards.push(ListenerGuard::register(
                host,
                PageEventKind::KeyDown,
                Rc::new(move |event| {
                    if let (Some(inner), PageEvent::KeyDown(Key::Escape)) = (weak.upgrade(), event)
                        && inner.borrow().is_open
                    {
                        fullscreen_close(&inner);
                    }
                }),
            ));
        }

        Ok(Self {
            inner,
            _guards: guards,
        })
    }

    /// Flip between Open and Closed.
    pub fn toggle(&self) {
        if self.is_open() {
            fullscreen_close(&self.inner);
        } else {
            fullscreen_open(&self.inner);
        }
    }

    /// Open: show the panel, flag the trigger expanded, lock page
    /// scroll.
    pub fn open(&self) {
        fullscreen_open(&self.inner);
    }

    /// Close: hide the panel, clear the trigger flag, unlock page
    /// scroll.
    pub fn close(&self) {
        fullscreen_close(&self.inner);
    }

    /// Whether the overlay is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.borrow().is_open
    }
}

fn fullscreen_click(inner: &Rc<RefCell<FullscreenInner>>, point: Point) {
    enum Action {
        Toggle,
        Close,
        None,
    }

    let action = {
        let state = inner.borrow();
        if state.trigger.contains(point) {
            Action::Toggle
        } else if state.is_open
            && state.options.close_on_backdrop
            && state.panel.contains(point)
            && !state
                .content
                .as_ref()
                .is_some_and(|content| content.contains(point))
        {
            Action::Close
        } else {
            Action::None
        }
    };

    match action {
        Action::Toggle => {
            if inner.borrow().is_open {
                fullscreen_close(inner);
            } else {
                fullscreen_open(inner);
            }
        }
        Action::Close => fullscreen_close(inner),
        Action::None => {}
    }
}

fn fullscreen_open(inner: &Rc<RefCell<FullscreenInner>>) {
    let mut state = inner.borrow_mut();
    state.panel.set_visible(true);
    state.trigger.set_flag("aria-expanded", true);
    state.host.set_scroll_locked(true);
    state.is_open = true;
    tracing::debug!("fullscreen overlay opened");
}

fn fullscreen_close(inner: &Rc<RefCell<FullscreenInner>>) {
    let mut state = inner.borrow_mut();
    state.panel.set_visible(false);
    state.trigger.set_flag("aria-expanded", false);
    state.host.set_scroll_locked(false);
    state.is_open = false;
    tracing::debug!("fullscreen overlay closed");
}
