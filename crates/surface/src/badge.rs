//! Cart count badges.
//!
//! One subscriber updates every badge-role element, so the header badge
//! and the mobile-nav badge can never drift apart. Badges show the
//! total item count and hide entirely at zero.

use std::rc::Rc;

use crate::bus::{EventBus, Subscription};
use crate::cart::{CART_CHANGED, CartChanged, CartStore};
use crate::host::ElementRef;

/// The unified badge subscriber.
pub struct CartBadges {
    _subscription: Subscription,
}

impl CartBadges {
    /// Bind every badge element to the cart.
    ///
    /// Renders the current count immediately, then re-renders on every
    /// cart change. An empty badge list is fine - the subscriber just
    /// has nothing to update.
    pub fn bind(store: &CartStore, bus: &Rc<EventBus>, badges: Vec<ElementRef>) -> Self {
        let badges = Rc::new(badges);
        render(&badges, store.total_item_count());

        let render_badges = Rc::clone(&badges);
        let subscription = bus.subscribe(CART_CHANGED, move |event: &CartChanged| {
            render(&render_badges, event.total_item_count);
        });

        Self {
            _subscription: subscription,
        }
    }
}

fn render(badges: &[ElementRef], count: u32) {
    for badge in badges {
        badge.set_text(&count.to_string());
        badge.set_visible(count > 0);
    }
}
