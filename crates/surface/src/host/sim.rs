//! Deterministic in-process host for headless testing.
//!
//! `SimHost` replaces the embedding page with a virtual clock, a manual
//! animation-frame pump, and scripted event dispatch, so every timing
//! and ordering property of the surface can be asserted exactly. The
//! real wiring stays untouched: components bind to a `SimHost` through
//! the same traits they use against a live page.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use flourish_core::{Rect, Size};

use super::{
    Element, EventHandler, FrameId, Host, ListenerId, PageEvent, PageEventKind, Placement,
    ScrollRegion, TaskCallback, TimerId,
};

/// A scripted page environment with a virtual clock.
pub struct SimHost {
    viewport: Cell<Size>,
    page_scroll: Cell<f64>,
    scroll_locked: Cell<bool>,
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, PageEventKind, EventHandler)>>,
    timers: RefCell<Vec<SimTimer>>,
    frames: RefCell<Vec<(FrameId, TaskCallback)>>,
}

struct SimTimer {
    id: TimerId,
    deadline_ms: u64,
    task: TaskCallback,
}

impl SimHost {
    /// Create a host with a 1280x800 desktop viewport.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::with_viewport(Size::new(1280.0, 800.0))
    }

    /// Create a host with the given viewport.
    #[must_use]
    pub fn with_viewport(viewport: Size) -> Rc<Self> {
        Rc::new(Self {
            viewport: Cell::new(viewport),
            page_scroll: Cell::new(0.0),
            scroll_locked: Cell::new(false),
            now_ms: Cell::new(0),
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
        })
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Deliver a page-level event to every matching listener, in
    /// registration order. The listener list is snapshotted first, so
    /// handlers that register or unregister listeners mid-dispatch do
    /// not affect this delivery.
    pub fn dispatch(&self, event: &PageEvent) {
        let kind = event.kind();
        let snapshot: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }

    /// Advance the virtual clock by `ms`, firing due timers in deadline
    /// order. Timers scheduled by fired tasks run too if they fall
    /// inside the window.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms.get() + ms;
        loop {
            let next = {
                let timers = self.timers.borrow();
                timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline_ms <= target)
                    .min_by_key(|(index, t)| (t.deadline_ms, *index))
                    .map(|(index, _)| index)
            };
            let Some(index) = next else { break };
            let timer = self.timers.borrow_mut().remove(index);
            self.now_ms.set(timer.deadline_ms);
            (timer.task)();
        }
        self.now_ms.set(target);
    }

    /// Run one animation frame: every task scheduled so far executes,
    /// tasks they schedule wait for the next frame. Returns how many
    /// tasks ran.
    pub fn run_frame(&self) -> usize {
        let batch = std::mem::take(&mut *self.frames.borrow_mut());
        let count = batch.len();
        for (_, task) in batch {
            task();
        }
        count
    }

    /// Pump frames until no work remains or `max_frames` is reached.
    /// Returns the total number of frame tasks run.
    pub fn run_frames_until_idle(&self, max_frames: usize) -> usize {
        let mut total = 0;
        for _ in 0..max_frames {
            let ran = self.run_frame();
            if ran == 0 {
                break;
            }
            total += ran;
        }
        total
    }

    /// Change the viewport and dispatch the matching resize event.
    pub fn resize_to(&self, viewport: Size) {
        self.viewport.set(viewport);
        self.dispatch(&PageEvent::Resize(viewport));
    }

    /// Set the ambient page scroll offset (no event dispatched).
    pub fn set_page_scroll(&self, offset: f64) {
        self.page_scroll.set(offset);
    }

    /// The virtual clock, in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    /// Whether ambient page scrolling is currently locked.
    #[must_use]
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked.get()
    }

    /// Number of registered page-level listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Number of tasks waiting for the next frame.
    #[must_use]
    pub fn pending_frame_count(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Host for SimHost {
    fn viewport(&self) -> Size {
        self.viewport.get()
    }

    fn page_scroll_offset(&self) -> f64 {
        self.page_scroll.get()
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locked.set(locked);
    }

    fn set_timeout(&self, delay_ms: u64, task: TaskCallback) -> TimerId {
        let id = TimerId::new(self.next_id());
        self.timers.borrow_mut().push(SimTimer {
            id,
            deadline_ms: self.now_ms.get() + delay_ms,
            task,
        });
        id
    }

    fn clear_timeout(&self, timer: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != timer);
    }

    fn request_frame(&self, task: TaskCallback) -> FrameId {
        let id = FrameId::new(self.next_id());
        self.frames.borrow_mut().push((id, task));
        id
    }

    fn cancel_frame(&self, frame: FrameId) {
        self.frames.borrow_mut().retain(|(id, _)| *id != frame);
    }

    fn add_listener(&self, kind: PageEventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId::new(self.next_id());
        self.listeners.borrow_mut().push((id, kind, handler));
        id
    }

    fn remove_listener(&self, listener: ListenerId) {
        self.listeners.borrow_mut().retain(|(id, _, _)| *id != listener);
    }
}

/// A scripted element handle.
pub struct SimElement {
    rect: Cell<Rect>,
    visible: Cell<bool>,
    text: RefCell<String>,
    flags: RefCell<HashMap<String, bool>>,
    attributes: RefCell<HashMap<String, String>>,
    placement: Cell<Option<Placement>>,
    placement_count: Cell<u32>,
}

impl SimElement {
    /// Create a visible element with the given bounding box.
    #[must_use]
    pub fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
            visible: Cell::new(true),
            text: RefCell::new(String::new()),
            flags: RefCell::new(HashMap::new()),
            attributes: RefCell::new(HashMap::new()),
            placement: Cell::new(None),
            placement_count: Cell::new(0),
        })
    }

    /// Move or resize the element.
    pub fn set_bounding_box(&self, rect: Rect) {
        self.rect.set(rect);
    }

    /// Script a `data-*` style attribute.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    /// The element's current text content.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// The last placement applied, if any.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.placement.get()
    }

    /// How many placements have been applied.
    #[must_use]
    pub fn placement_count(&self) -> u32 {
        self.placement_count.get()
    }
}

impl Element for SimElement {
    fn bounding_box(&self) -> Rect {
        self.rect.get()
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
    }

    fn set_flag(&self, name: &str, value: bool) {
        self.flags.borrow_mut().insert(name.to_owned(), value);
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.borrow().get(name).copied().unwrap_or(false)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn apply_placement(&self, placement: Placement) {
        self.placement.set(Some(placement));
        self.placement_count.set(self.placement_count.get() + 1);
    }
}

/// A scripted horizontally scrollable region.
pub struct SimScrollRegion {
    offset: Cell<f64>,
    max_offset: Cell<f64>,
    grabbing: Cell<bool>,
}

impl SimScrollRegion {
    /// Create a region at offset zero with the given maximum extent.
    #[must_use]
    pub fn new(max_offset: f64) -> Rc<Self> {
        Rc::new(Self {
            offset: Cell::new(0.0),
            max_offset: Cell::new(max_offset),
            grabbing: Cell::new(false),
        })
    }

    /// Whether the grab cursor is active.
    #[must_use]
    pub fn grabbing(&self) -> bool {
        self.grabbing.get()
    }
}

impl ScrollRegion for SimScrollRegion {
    fn scroll_offset(&self) -> f64 {
        self.offset.get()
    }

    fn set_scroll_offset(&self, offset: f64) {
        self.offset.set(offset.clamp(0.0, self.max_offset.get()));
    }

    fn max_scroll_offset(&self) -> f64 {
        self.max_offset.get()
    }

    fn scroll_by_smooth(&self, delta: f64) {
        // The sim has no easing; the destination is what matters.
        self.set_scroll_offset(self.offset.get() + delta);
    }

    fn set_grabbing(&self, grabbing: bool) {
        self.grabbing.set(grabbing);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let host = SimHost::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        host.set_timeout(50, Box::new(move || o.borrow_mut().push("late")));
        let o = Rc::clone(&order);
        host.set_timeout(10, Box::new(move || o.borrow_mut().push("early")));

        host.advance(100);
        assert_eq!(*order.borrow(), vec!["early", "late"]);
        assert_eq!(host.now_ms(), 100);
    }

    #[test]
    fn test_cleared_timer_does_not_fire() {
        let host = SimHost::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let timer = host.set_timeout(10, Box::new(move || f.set(true)));
        host.clear_timeout(timer);
        host.advance(100);
        assert!(!fired.get());
    }

    #[test]
    fn test_frame_tasks_batch_per_frame() {
        let host = SimHost::new();
        let count = Rc::new(Cell::new(0));

        let host_inner = Rc::clone(&host);
        let c = Rc::clone(&count);
        host.request_frame(Box::new(move || {
            c.set(c.get() + 1);
            let c2 = Rc::clone(&c);
            host_inner.request_frame(Box::new(move || c2.set(c2.get() + 1)));
        }));

        assert_eq!(host.run_frame(), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(host.run_frame(), 1);
        assert_eq!(count.get(), 2);
        assert_eq!(host.run_frame(), 0);
    }

    #[test]
    fn test_region_clamps_offset() {
        let region = SimScrollRegion::new(500.0);
        region.set_scroll_offset(900.0);
        assert_eq!(region.scroll_offset(), 500.0);
        region.set_scroll_offset(-20.0);
        assert_eq!(region.scroll_offset(), 0.0);
    }
}
