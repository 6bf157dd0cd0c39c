//! Drag-to-scroll with inertial release, and carousel paging.
//!
//! [`MomentumScroll`] turns raw pointer input over a horizontally
//! scrollable region into scroll-offset deltas, and on release runs a
//! velocity-decay loop on the host's animation frames. Touch input
//! follows the same offset math with no velocity tracking and no
//! inertia - the asymmetry matches the shipped behavior and the two
//! paths are kept distinct.
//!
//! [`CarouselNav`] is the discrete-step companion: prev/next buttons
//! scroll by one fixed page amount with host-side smooth easing, and
//! the buttons disable themselves at the region's extents.
//!
//! Region-scoped input (pointer and touch over the region, region
//! scroll notifications) is forwarded by the embedder to the
//! controller's input methods; only page-level button clicks go through
//! host listeners.

use std::cell::RefCell;
use std::rc::Rc;

use flourish_core::Point;

use crate::config::{CarouselOptions, ScrollOptions};
use crate::error::BindError;
use crate::host::{ElementRef, FrameId, HostRef, ListenerGuard, PageEvent, PageEventKind, RegionRef};

/// Drag-to-scroll controller with inertial release.
pub struct MomentumScroll {
    inner: Rc<RefCell<MotionInner>>,
}

struct MotionInner {
    host: HostRef,
    region: RegionRef,
    options: ScrollOptions,
    is_dragging: bool,
    anchor_x: f64,
    anchor_offset: f64,
    last_x: f64,
    velocity: f64,
    decay_frame: Option<FrameId>,
    touch_active: bool,
    touch_anchor_x: f64,
    touch_anchor_offset: f64,
}

impl MomentumScroll {
    /// Bind a controller to its scrollable region.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingTarget`] when the region handle is
    /// absent.
    pub fn bind(
        host: &HostRef,
        region: Option<RegionRef>,
        options: ScrollOptions,
    ) -> Result<Self, BindError> {
        let region = region.ok_or(BindError::MissingTarget { role: "region" })?;
        Ok(Self {
            inner: Rc::new(RefCell::new(MotionInner {
                host: Rc::clone(host),
                region,
                options,
                is_dragging: false,
                anchor_x: 0.0,
                anchor_offset: 0.0,
                last_x: 0.0,
                velocity: 0.0,
                decay_frame: None,
                touch_active: false,
                touch_anchor_x: 0.0,
                touch_anchor_offset: 0.0,
            })),
        })
    }

    /// Pointer pressed over the region: anchor the drag and cancel any
    /// in-flight decay.
    pub fn pointer_down(&self, x: f64) {
        let mut state = self.inner.borrow_mut();
        if let Some(frame) = state.decay_frame.take() {
            state.host.cancel_frame(frame);
        }
        state.is_dragging = true;
        state.anchor_x = x;
        state.anchor_offset = state.region.scroll_offset();
        state.last_x = x;
        state.velocity = 0.0;
        state.region.set_grabbing(true);
    }

    /// Pointer moved. Only meaningful while dragging.
    pub fn pointer_move(&self, x: f64) {
        let mut state = self.inner.borrow_mut();
        if !state.is_dragging {
            return;
        }
        let walk = (x - state.anchor_x) * state.options.drag_gain;
        state.region.set_scroll_offset(state.anchor_offset - walk);
        state.velocity = x - state.last_x;
        state.last_x = x;
    }

    /// Pointer released: end the drag and start the decay loop.
    pub fn pointer_up(&self) {
        self.end_drag();
    }

    /// Pointer left the region: treated as a release while dragging.
    pub fn pointer_leave(&self) {
        self.end_drag();
    }

    /// Touch started: anchor the follow and cancel any in-flight decay.
    pub fn touch_start(&self, x: f64) {
        let mut state = self.inner.borrow_mut();
        if let Some(frame) = state.decay_frame.take() {
            state.host.cancel_frame(frame);
        }
        state.touch_active = true;
        state.touch_anchor_x = x;
        state.touch_anchor_offset = state.region.scroll_offset();
    }

    /// Touch moved: direct gain-scaled follow, no velocity tracking.
    pub fn touch_move(&self, x: f64) {
        let state = self.inner.borrow();
        if !state.touch_active {
            return;
        }
        let walk = (x - state.touch_anchor_x) * state.options.drag_gain;
        state.region.set_scroll_offset(state.touch_anchor_offset - walk);
    }

    /// Touch ended. No inertia on the touch path.
    pub fn touch_end(&self) {
        self.inner.borrow_mut().touch_active = false;
    }

    /// Whether a pointer drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.inner.borrow().is_dragging
    }

    /// Current decay velocity, in offset units per frame.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.inner.borrow().velocity
    }

    /// Whether a decay animation holds a frame handle.
    #[must_use]
    pub fn decay_active(&self) -> bool {
        self.inner.borrow().decay_frame.is_some()
    }

    fn end_drag(&self) {
        {
            let mut state = self.inner.borrow_mut();
            if !state.is_dragging {
                return;
            }
            state.is_dragging = false;
            state.region.set_grabbing(false);
        }
        decay_tick(&self.inner);
    }
}

impl Drop for MomentumScroll {
    fn drop(&mut self) {
        let mut state = self.inner.borrow_mut();
        if let Some(frame) = state.decay_frame.take() {
            state.host.cancel_frame(frame);
        }
    }
}

/// One decay step: subtract the velocity from the offset, apply
/// friction, and re-arm for the next frame while above the stop
/// threshold. The first step runs synchronously at drag end, the rest
/// on animation frames.
fn decay_tick(inner: &Rc<RefCell<MotionInner>>) {
    let mut state = inner.borrow_mut();
    if state.velocity.abs() <= state.options.stop_threshold {
        state.decay_frame = None;
        return;
    }

    let offset = state.region.scroll_offset() - state.velocity;
    state.region.set_scroll_offset(offset);
    state.velocity *= state.options.friction;

    let weak = Rc::downgrade(inner);
    let frame = state.host.request_frame(Box::new(move || {
        if let Some(inner) = weak.upgrade() {
            decay_tick(&inner);
        }
    }));
    state.decay_frame = Some(frame);
}

/// Discrete-step carousel navigation with extent tracking.
pub struct CarouselNav {
    inner: Rc<RefCell<CarouselInner>>,
    _click_guard: ListenerGuard,
}

struct CarouselInner {
    region: RegionRef,
    prev: ElementRef,
    next: ElementRef,
    options: CarouselOptions,
    touch_active: bool,
    touch_anchor_x: f64,
    touch_anchor_offset: f64,
}

impl CarouselNav {
    /// Bind prev/next buttons to a region.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingTarget`] naming whichever handle is
    /// absent; a carousel with any element missing stays unbound, as
    /// the shipped surface warns and skips it.
    pub fn bind(
        host: &HostRef,
        region: Option<RegionRef>,
        prev: Option<ElementRef>,
        next: Option<ElementRef>,
        options: CarouselOptions,
    ) -> Result<Self, BindError> {
        let region = region.ok_or(BindError::MissingTarget { role: "region" })?;
        let prev = prev.ok_or(BindError::MissingTarget { role: "prev button" })?;
        let next = next.ok_or(BindError::MissingTarget { role: "next button" })?;

        let inner = Rc::new(RefCell::new(CarouselInner {
            region,
            prev,
            next,
            options,
            touch_active: false,
            touch_anchor_x: 0.0,
            touch_anchor_offset: 0.0,
        }));
        update_buttons(&inner.borrow());

        let weak = Rc::downgrade(&inner);
        let click_guard = ListenerGuard::register(
            host,
            PageEventKind::Click,
            Rc::new(move |event| {
                if let (Some(inner), PageEvent::Click(point)) = (weak.upgrade(), event) {
                    handle_button_click(&inner, *point);
                }
            }),
        );

        Ok(Self {
            inner,
            _click_guard: click_guard,
        })
    }

    /// Page backward by one step.
    pub fn prev(&self) {
        self.step(-1.0);
    }

    /// Page forward by one step.
    pub fn next(&self) {
        self.step(1.0);
    }

    /// The embedder forwards region scroll notifications here so button
    /// states track the current extent.
    pub fn region_scrolled(&self) {
        update_buttons(&self.inner.borrow());
    }

    /// Whether the region sits at its start extent (within slack).
    #[must_use]
    pub fn at_start(&self) -> bool {
        let state = self.inner.borrow();
        state.region.scroll_offset() <= state.options.edge_slack
    }

    /// Whether the region sits at its end extent (within slack).
    #[must_use]
    pub fn at_end(&self) -> bool {
        let state = self.inner.borrow();
        state.region.scroll_offset() >= state.region.max_scroll_offset() - state.options.edge_slack
    }

    /// Touch started over the region.
    pub fn touch_start(&self, x: f64) {
        let mut state = self.inner.borrow_mut();
        state.touch_active = true;
        state.touch_anchor_x = x;
        state.touch_anchor_offset = state.region.scroll_offset();
    }

    /// Touch moved: direct gain-scaled follow, no inertia.
    pub fn touch_move(&self, x: f64) {
        let state = self.inner.borrow();
        if !state.touch_active {
            return;
        }
        let walk = (x - state.touch_anchor_x) * state.options.touch_gain;
        state.region.set_scroll_offset(state.touch_anchor_offset - walk);
        drop(state);
        update_buttons(&self.inner.borrow());
    }

    /// Touch ended.
    pub fn touch_end(&self) {
        self.inner.borrow_mut().touch_active = false;
    }

    fn step(&self, direction: f64) {
        let state = self.inner.borrow();
        state
            .region
            .scroll_by_smooth(direction * state.options.scroll_amount);
        update_buttons(&state);
    }
}

fn handle_button_click(inner: &Rc<RefCell<CarouselInner>>, point: Point) {
    let direction = {
        let state = inner.borrow();
        if state.prev.contains(point) && !state.prev.flag("disabled") {
            Some(-1.0)
        } else if state.next.contains(point) && !state.next.flag("disabled") {
            Some(1.0)
        } else {
            None
        }
    };
    if let Some(direction) = direction {
        let state = inner.borrow();
        state
            .region
            .scroll_by_smooth(direction * state.options.scroll_amount);
        update_buttons(&state);
    }
}

fn update_buttons(state: &CarouselInner) {
    let offset = state.region.scroll_offset();
    let max = state.region.max_scroll_offset();
    state
        .prev
        .set_flag("disabled", offset <= state.options.edge_slack);
    state
        .next
        .set_flag("disabled", offset >= max - state.options.edge_slack);
}
