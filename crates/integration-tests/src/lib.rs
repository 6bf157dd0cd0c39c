//! Test harness for Flourish integration tests.
//!
//! Builds a simulated storefront page the way the real bootstrap script
//! does: one host, one bus, one cart store, and every consumer wired
//! through the same public APIs. Tests drive input through the host and
//! assert on element state, so they exercise the full event path from
//! gesture to durable mirror.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::rc::Rc;

use flourish_core::{Point, Rect};
use flourish_surface::bus::EventBus;
use flourish_surface::cart::{AddToCartButtons, CartStore};
use flourish_surface::config::{OverlayOptions, ToastOptions};
use flourish_surface::host::sim::{SimElement, SimHost};
use flourish_surface::host::{Element, ElementRef, HostRef, PageEvent};
use flourish_surface::overlay::Overlay;
use flourish_surface::store::storage::{MemoryStorage, Storage};
use flourish_surface::toast::Toast;
use flourish_surface::CartBadges;

/// Initialize test logging once, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flourish_surface=debug".into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// A unique scratch directory for file-backed storage tests.
#[must_use]
pub fn temp_storage_root() -> PathBuf {
    std::env::temp_dir().join(format!("flourish-it-{}", uuid::Uuid::new_v4()))
}

/// A simulated storefront page with the full consumer wiring.
pub struct StorePage {
    pub host: Rc<SimHost>,
    pub bus: Rc<EventBus>,
    pub store: Rc<CartStore>,

    /// Header and mobile-nav cart count badges.
    pub header_badge: Rc<SimElement>,
    pub mobile_badge: Rc<SimElement>,

    /// Product-card add-to-cart buttons, left to right.
    pub peony_button: Rc<SimElement>,
    pub fern_button: Rc<SimElement>,

    /// The cart panel and its desktop/mobile triggers.
    pub cart_panel: Rc<SimElement>,
    pub cart_trigger: Rc<SimElement>,
    pub mobile_cart_trigger: Rc<SimElement>,
    pub cart_overlay: Overlay,

    pub toast_element: Rc<SimElement>,
    pub toast: Toast,

    _badges: CartBadges,
    _buttons: AddToCartButtons,
}

impl StorePage {
    /// Build a page backed by in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Rc::new(MemoryStorage::new()))
    }

    /// Build a page backed by the given storage, so tests can reopen
    /// the same mirror across "page loads".
    #[must_use]
    pub fn with_storage(storage: Rc<dyn Storage>) -> Self {
        let host = SimHost::new();
        let host_ref: HostRef = Rc::clone(&host) as HostRef;
        let bus = EventBus::new();
        let store = CartStore::open(storage, Rc::clone(&bus));

        let header_badge = SimElement::new(Rect::new(1210.0, 12.0, 18.0, 18.0));
        let mobile_badge = SimElement::new(Rect::new(40.0, 760.0, 18.0, 18.0));
        let badges = CartBadges::bind(
            &store,
            &bus,
            vec![
                Rc::clone(&header_badge) as ElementRef,
                Rc::clone(&mobile_badge) as ElementRef,
            ],
        );

        let toast_element = SimElement::new(Rect::new(1000.0, 720.0, 260.0, 56.0));
        let toast = Toast::bind(
            &host_ref,
            Some(Rc::clone(&toast_element) as ElementRef),
            ToastOptions::default(),
        )
        .expect("toast element is present");

        let peony_button = product_button(
            Rect::new(100.0, 300.0, 120.0, 40.0),
            "peony-bunch",
            "Peony Bunch",
            "$12.00",
        );
        let fern_button = product_button(
            Rect::new(360.0, 300.0, 120.0, 40.0),
            "silver-fern",
            "Silver Fern",
            "$4.50",
        );
        let buttons = AddToCartButtons::bind(
            &host_ref,
            Rc::clone(&store),
            &bus,
            vec![
                Rc::clone(&peony_button) as ElementRef,
                Rc::clone(&fern_button) as ElementRef,
            ],
            Some(toast.clone()),
        );

        let cart_panel = SimElement::new(Rect::new(900.0, 70.0, 340.0, 420.0));
        cart_panel.set_visible(false);
        let cart_trigger = SimElement::new(Rect::new(1180.0, 8.0, 60.0, 40.0));
        let mobile_cart_trigger = SimElement::new(Rect::new(10.0, 752.0, 60.0, 40.0));
        let cart_overlay = Overlay::bind(
            &host_ref,
            Some(Rc::clone(&cart_panel) as ElementRef),
            vec![
                Rc::clone(&cart_trigger) as ElementRef,
                Rc::clone(&mobile_cart_trigger) as ElementRef,
            ],
            OverlayOptions::default(),
        )
        .expect("cart panel and triggers are present");

        tracing::debug!("store page wired");

        Self {
            host,
            bus,
            store,
            header_badge,
            mobile_badge,
            peony_button,
            fern_button,
            cart_panel,
            cart_trigger,
            mobile_cart_trigger,
            cart_overlay,
            toast_element,
            toast,
            _badges: badges,
            _buttons: buttons,
        }
    }

    /// Click the center of an element.
    pub fn click(&self, element: &SimElement) {
        let rect = element.bounding_box();
        self.host.dispatch(&PageEvent::Click(Point::new(
            rect.x + rect.width / 2.0,
            rect.y + rect.height / 2.0,
        )));
    }

    /// Click an empty spot on the page, outside every bound element.
    pub fn click_outside(&self) {
        self.host.dispatch(&PageEvent::Click(Point::new(600.0, 600.0)));
    }
}

impl Default for StorePage {
    fn default() -> Self {
        Self::new()
    }
}

fn product_button(rect: Rect, id: &str, title: &str, price: &str) -> Rc<SimElement> {
    let button = SimElement::new(rect);
    button.set_attribute("data-product-id", id);
    button.set_attribute("data-product-title", title);
    button.set_attribute("data-product-price", price);
    button
}
