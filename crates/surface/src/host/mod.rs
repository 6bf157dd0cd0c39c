//! The seam between the surface and the embedding page.
//!
//! The embedder (page bootstrap, templating, styling - all out of scope
//! here) looks up concrete elements by logical role and hands the surface
//! opaque handles. The surface never discovers or creates elements; it
//! reads geometry and attributes from handles and writes back only
//! visibility, text, flags, and placement.
//!
//! Input flows in two ways:
//! - Page-level events (pointer, key, scroll, resize) are observed by
//!   registering listeners on the [`Host`]. Registration returns an id
//!   and every component wraps it in a [`ListenerGuard`], so teardown
//!   deterministically releases the handler.
//! - Region-scoped input (drags over a scrollable row) is forwarded by
//!   the embedder straight to the owning controller's input methods.
//!
//! Timers and animation frames are also host services; the surface never
//! blocks, all waits are scheduled continuations.

pub mod sim;

use std::rc::Rc;

use flourish_core::{Point, Rect, Size};

/// Shared handle to a page element.
pub type ElementRef = Rc<dyn Element>;

/// Shared handle to a scrollable region.
pub type RegionRef = Rc<dyn ScrollRegion>;

/// Shared handle to the host.
pub type HostRef = Rc<dyn Host>;

/// One-shot scheduled work.
pub type TaskCallback = Box<dyn FnOnce()>;

/// A page-level event handler.
pub type EventHandler = Rc<dyn Fn(&PageEvent)>;

/// A handle to one page element, by logical role.
///
/// Implementations are expected to be cheap shared views with interior
/// mutability; all methods take `&self`.
pub trait Element {
    /// Current on-screen bounding box.
    fn bounding_box(&self) -> Rect;

    /// Whether the element is currently visible.
    fn is_visible(&self) -> bool;

    /// Show or hide the element.
    fn set_visible(&self, visible: bool);

    /// Replace the element's text content.
    fn set_text(&self, text: &str);

    /// Toggle a named boolean presentation flag (e.g. `"added"`,
    /// `"disabled"`, `"aria-expanded"`).
    fn set_flag(&self, name: &str, value: bool);

    /// Read back a named flag. Unset flags read as `false`.
    fn flag(&self, name: &str) -> bool;

    /// Read a `data-*` style attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Apply a computed overlay placement.
    fn apply_placement(&self, placement: Placement);

    /// Whether the point falls inside the element's bounding box.
    fn contains(&self, point: Point) -> bool {
        self.bounding_box().contains(point)
    }
}

/// A handle to one horizontally scrollable region.
pub trait ScrollRegion {
    /// Current scroll offset.
    fn scroll_offset(&self) -> f64;

    /// Set the scroll offset. Hosts clamp to `[0, max_scroll_offset]`.
    fn set_scroll_offset(&self, offset: f64);

    /// Maximum reachable scroll offset (content extent minus viewport).
    fn max_scroll_offset(&self) -> f64;

    /// Scroll by a delta with host-side smooth easing.
    fn scroll_by_smooth(&self, delta: f64);

    /// Toggle the grab cursor while a drag is active.
    fn set_grabbing(&self, _grabbing: bool) {}
}

/// Services the embedding page provides to the surface.
pub trait Host {
    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Current vertical page scroll offset.
    fn page_scroll_offset(&self) -> f64;

    /// Lock or unlock ambient page scrolling (fullscreen overlays).
    fn set_scroll_locked(&self, locked: bool);

    /// Schedule `task` after `delay_ms`. The returned id cancels it.
    fn set_timeout(&self, delay_ms: u64, task: TaskCallback) -> TimerId;

    /// Cancel a pending timer. Unknown or fired ids are ignored.
    fn clear_timeout(&self, timer: TimerId);

    /// Schedule `task` for the next animation frame.
    fn request_frame(&self, task: TaskCallback) -> FrameId;

    /// Cancel a pending frame. Unknown or run ids are ignored.
    fn cancel_frame(&self, frame: FrameId);

    /// Register a page-level event listener. Handlers for one kind run
    /// in registration order.
    fn add_listener(&self, kind: PageEventKind, handler: EventHandler) -> ListenerId;

    /// Unregister a page-level event listener. Unknown ids are ignored.
    fn remove_listener(&self, listener: ListenerId);
}

/// A computed overlay placement, ready for the host to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Distance from the top of the page (bounding box bottom plus page
    /// scroll plus gap).
    pub top: f64,
    /// Horizontal anchoring strategy.
    pub horizontal: HorizontalPlacement,
}

/// Horizontal anchoring for an overlay panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HorizontalPlacement {
    /// Desktop: the panel's right edge sits `right` from the viewport's
    /// right edge, flush with the trigger.
    RightAligned { right: f64 },
    /// Mobile: the panel is centered horizontally in the viewport.
    Centered,
}

/// A page-level input event, as forwarded by the embedder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    /// Pointer pressed somewhere on the page.
    PointerDown(Point),
    /// Pointer released somewhere on the page.
    PointerUp(Point),
    /// A completed click.
    Click(Point),
    /// A key press.
    KeyDown(Key),
    /// The ambient page scrolled.
    Scroll,
    /// The viewport was resized.
    Resize(Size),
}

impl PageEvent {
    /// The event's kind, for listener routing.
    #[must_use]
    pub const fn kind(&self) -> PageEventKind {
        match self {
            Self::PointerDown(_) => PageEventKind::PointerDown,
            Self::PointerUp(_) => PageEventKind::PointerUp,
            Self::Click(_) => PageEventKind::Click,
            Self::KeyDown(_) => PageEventKind::KeyDown,
            Self::Scroll => PageEventKind::Scroll,
            Self::Resize(_) => PageEventKind::Resize,
        }
    }
}

/// Discriminant of [`PageEvent`], used to route listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEventKind {
    PointerDown,
    PointerUp,
    Click,
    KeyDown,
    Scroll,
    Resize,
}

/// The keys the surface reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    /// Any key the surface has no handling for.
    Other,
}

macro_rules! define_handle_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw host-issued id.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw id value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }
    };
}

define_handle_id!(
    /// Identifies a pending timer.
    TimerId
);
define_handle_id!(
    /// Identifies a pending animation frame.
    FrameId
);
define_handle_id!(
    /// Identifies a registered page-level listener.
    ListenerId
);

/// Scoped listener registration: unregisters on drop.
///
/// Components keep their guards for as long as they want the handler
/// live; dropping the component tears every registration down without
/// any manual bookkeeping.
pub struct ListenerGuard {
    host: HostRef,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    /// Register `handler` for `kind` and wrap the registration.
    pub fn register(host: &HostRef, kind: PageEventKind, handler: EventHandler) -> Self {
        let id = host.add_listener(kind, handler);
        Self {
            host: Rc::clone(host),
            id: Some(id),
        }
    }

    /// Unregister now instead of at drop time.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(id) = self.id.take() {
            self.host.remove_listener(id);
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}
