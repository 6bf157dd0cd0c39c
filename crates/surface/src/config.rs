//! Component configuration with documented defaults.
//!
//! Every widget takes an options struct at bind time. Defaults match the
//! shipped storefront behavior; embedders override per instance.

/// Width threshold separating mobile and desktop overlay placement.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

/// Gap between a trigger's bottom edge and its anchored panel.
pub const OVERLAY_GAP: f64 = 8.0;

/// Resize events are coalesced; only the last one inside this window
/// triggers a reposition.
pub const RESIZE_DEBOUNCE_MS: u64 = 100;

/// Pointer displacement is amplified by this factor while dragging.
pub const DRAG_GAIN: f64 = 2.0;

/// Per-frame velocity multiplier during inertial decay.
pub const DECAY_FRICTION: f64 = 0.95;

/// Decay stops once |velocity| drops to this many offset units per frame.
pub const DECAY_STOP_THRESHOLD: f64 = 0.5;

/// One carousel page: card width plus gap.
pub const CAROUSEL_SCROLL_AMOUNT: f64 = 260.0;

/// Offsets within this slack of an extent count as "at the edge".
pub const CAROUSEL_EDGE_SLACK: f64 = 10.0;

/// How long a toast stays visible.
pub const TOAST_DURATION_MS: u64 = 2000;

/// Overlay lifecycle and dismissal configuration.
///
/// Each dismissal behavior toggles independently; placement constants
/// follow the shipped breakpoint/gap values.
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Close when Escape is pressed while open.
    pub close_on_escape: bool,
    /// Close on any pointer interaction outside both panel and triggers.
    pub close_on_outside_click: bool,
    /// Close when the ambient page scrolls.
    pub close_on_scroll: bool,
    /// Reposition (not close) after the viewport settles from a resize.
    pub reposition_on_resize: bool,
    /// Viewport width at which placement switches from centered (mobile)
    /// to right-aligned (desktop).
    pub mobile_breakpoint: f64,
    /// Gap between the trigger's bottom edge and the panel.
    pub gap: f64,
    /// Debounce window for resize repositioning.
    pub resize_debounce_ms: u64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            close_on_escape: true,
            close_on_outside_click: true,
            close_on_scroll: true,
            reposition_on_resize: true,
            mobile_breakpoint: MOBILE_BREAKPOINT,
            gap: OVERLAY_GAP,
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
        }
    }
}

/// Fullscreen overlay configuration.
#[derive(Debug, Clone)]
pub struct FullscreenOverlayOptions {
    /// Close when Escape is pressed while open.
    pub close_on_escape: bool,
    /// Close when the backdrop (the panel outside its content region) is
    /// clicked.
    pub close_on_backdrop: bool,
}

impl Default for FullscreenOverlayOptions {
    fn default() -> Self {
        Self {
            close_on_escape: true,
            close_on_backdrop: true,
        }
    }
}

/// Momentum scrolling configuration.
#[derive(Debug, Clone)]
pub struct ScrollOptions {
    /// Amplification applied to pointer displacement while dragging.
    pub drag_gain: f64,
    /// Per-frame velocity multiplier once the drag is released.
    pub friction: f64,
    /// Decay terminates at or below this |velocity|.
    pub stop_threshold: f64,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            drag_gain: DRAG_GAIN,
            friction: DECAY_FRICTION,
            stop_threshold: DECAY_STOP_THRESHOLD,
        }
    }
}

/// Carousel paging configuration.
#[derive(Debug, Clone)]
pub struct CarouselOptions {
    /// Offset scrolled per prev/next activation.
    pub scroll_amount: f64,
    /// Slack for treating an offset as at the start/end extent.
    pub edge_slack: f64,
    /// Amplification applied to touch displacement (1:1 follow, no
    /// inertia).
    pub touch_gain: f64,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            scroll_amount: CAROUSEL_SCROLL_AMOUNT,
            edge_slack: CAROUSEL_EDGE_SLACK,
            touch_gain: DRAG_GAIN,
        }
    }
}

/// Toast configuration.
#[derive(Debug, Clone)]
pub struct ToastOptions {
    /// How long the toast stays visible after each show.
    pub duration_ms: u64,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            duration_ms: TOAST_DURATION_MS,
        }
    }
}
