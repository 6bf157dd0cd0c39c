//! The cart: a persisted keyed store of line items plus derived
//! aggregates and its add-to-cart button binding.
//!
//! The cart is one [`KeyedStore`] instance. Every mutation is atomic
//! from the caller's perspective: read-modify-persist-notify completes
//! before the call returns, and each mutation is followed by exactly one
//! [`CART_CHANGED`] publish carrying the new snapshot and aggregates.
//! Subscribers therefore always observe a store that is already durably
//! updated.

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flourish_core::{DisplayPrice, ProductId, price::round_to_cents};

use crate::bus::{EventBus, Subscription, Topic};
use crate::host::{Element, ElementRef, HostRef, ListenerGuard, PageEvent, PageEventKind};
use crate::store::{KeyedStore, StoreRecord, storage::Storage};
use crate::toast::Toast;

/// Fixed durable-mirror key for the cart collection.
pub const CART_STORAGE_KEY: &str = "cart";

/// Image shown for items added without one.
pub const PLACEHOLDER_IMAGE: &str = "assets/images/placeholder.png";

/// Topic carrying every cart change.
pub const CART_CHANGED: Topic<CartChanged> = Topic::new("cart.changed");

/// `data-*` attributes the add-to-cart binding reads off its buttons.
mod attrs {
    pub const ID: &str = "data-product-id";
    pub const TITLE: &str = "data-product-title";
    pub const PRICE: &str = "data-product-price";
    pub const PRICE_UNIT: &str = "data-product-price-unit";
    pub const IMG: &str = "data-product-img";
}

/// One product entry in the cart.
///
/// Serialized field names are fixed by the durable layout:
/// `{id, title, price, priceUnit, imgSrc, quantity}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Stable external product identifier, unique within the cart.
    pub id: ProductId,
    /// Product display title.
    pub title: String,
    /// Unit price display string (e.g. `"$12.34"`).
    pub price: DisplayPrice,
    /// Optional secondary price string (e.g. `"$4.50/stem"`).
    #[serde(default)]
    pub price_unit: String,
    /// Product image reference.
    pub img_src: String,
    /// Count of this product in the cart, always >= 1 when persisted.
    pub quantity: u32,
}

impl LineItem {
    /// This line's contribution to the cart total.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount() * Decimal::from(self.quantity)
    }
}

impl StoreRecord for LineItem {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// Attribute-style input for an add-to-cart action.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItemDescriptor {
    pub id: ProductId,
    pub title: String,
    pub price: DisplayPrice,
    /// Defaults to empty when absent.
    pub price_unit: Option<String>,
    /// Defaults to [`PLACEHOLDER_IMAGE`] when absent.
    pub img_src: Option<String>,
}

impl NewItemDescriptor {
    /// Read the descriptor off a triggering element's `data-product-*`
    /// attributes.
    ///
    /// Returns `None` (with a warning) when a required attribute is
    /// missing; bad attribute data never hard-fails the surface.
    #[must_use]
    pub fn from_element(element: &dyn Element) -> Option<Self> {
        let required = |name: &'static str| {
            let value = element.attribute(name);
            if value.is_none() {
                tracing::warn!(attribute = name, "add-to-cart trigger missing attribute");
            }
            value
        };

        Some(Self {
            id: ProductId::new(required(attrs::ID)?),
            title: required(attrs::TITLE)?,
            price: DisplayPrice::new(required(attrs::PRICE)?),
            price_unit: element.attribute(attrs::PRICE_UNIT),
            img_src: element.attribute(attrs::IMG),
        })
    }

    fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            price: self.price,
            price_unit: self.price_unit.unwrap_or_default(),
            img_src: self
                .img_src
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            quantity: 1,
        }
    }
}

/// Payload of [`CART_CHANGED`]: the new snapshot plus both aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct CartChanged {
    /// Cloned collection, in insertion order.
    pub items: Vec<LineItem>,
    /// Sum of all quantities.
    pub total_item_count: u32,
    /// Sum of line totals, rounded to exactly two fraction digits.
    pub total_price: Decimal,
}

/// The persisted, reactive cart.
///
/// Constructed once by the embedder and shared (`Rc`) with every
/// consumer - there is no ambient global instance.
pub struct CartStore {
    items: RefCell<KeyedStore<LineItem>>,
    bus: Rc<EventBus>,
}

impl CartStore {
    /// Open the cart, loading the durable mirror.
    #[must_use]
    pub fn open(storage: Rc<dyn Storage>, bus: Rc<EventBus>) -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(KeyedStore::open(storage, CART_STORAGE_KEY)),
            bus,
        })
    }

    /// Add a product, or increment its quantity when already present.
    ///
    /// New entries append with quantity 1, an empty price unit when none
    /// was given, and the placeholder image when none was given.
    pub fn upsert_increment(&self, descriptor: NewItemDescriptor) {
        let key = descriptor.id.clone();
        self.items.borrow_mut().upsert(
            key.as_str(),
            |item| item.quantity += 1,
            || descriptor.into_line_item(),
        );
        self.publish_changed();
    }

    /// Remove a product. An absent id is a successful no-op, but still
    /// persists and publishes.
    pub fn remove(&self, id: &ProductId) {
        self.items.borrow_mut().remove(id.as_str());
        self.publish_changed();
    }

    /// Set a product's quantity. `quantity <= 0` behaves as
    /// [`remove`](Self::remove); an absent id is a silent no-op and does
    /// not publish.
    pub fn set_quantity(&self, id: &ProductId, quantity: i32) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(1);
        let updated = self
            .items
            .borrow_mut()
            .update(id.as_str(), |item| item.quantity = quantity);
        if updated {
            self.publish_changed();
        }
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
        self.publish_changed();
    }

    /// Re-read the durable mirror and return the loaded collection.
    ///
    /// An absent or corrupt mirror loads as empty (and is written
    /// back); this never fails outward.
    pub fn reload(&self) -> Vec<LineItem> {
        self.items.borrow_mut().load();
        self.snapshot()
    }

    /// Cloned snapshot of the collection, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.borrow().snapshot()
    }

    /// Whether a product is in the cart.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.borrow().contains(id.as_str())
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Sum of all quantities. Zero for an empty cart.
    #[must_use]
    pub fn total_item_count(&self) -> u32 {
        self.items
            .borrow()
            .fold(0u32, |total, item| total + item.quantity)
    }

    /// Sum of line totals, rounded to exactly two fraction digits.
    ///
    /// A malformed price string contributes zero for that item without
    /// blocking the others.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        let total = self
            .items
            .borrow()
            .fold(Decimal::ZERO, |total, item| total + item.line_total());
        round_to_cents(total)
    }

    fn publish_changed(&self) {
        // Snapshot outside the borrow: subscribers are free to re-enter
        // the read API.
        let items = self.items.borrow().snapshot();
        let total_item_count = items.iter().map(|item| item.quantity).sum();
        let total_price = round_to_cents(
            items
                .iter()
                .map(LineItem::line_total)
                .fold(Decimal::ZERO, |total, line| total + line),
        );
        self.bus.publish(
            CART_CHANGED,
            &CartChanged {
                items,
                total_item_count,
                total_price,
            },
        );
    }
}

/// Binds add-to-cart buttons to the store.
///
/// A click on a bound button toggles membership, as the product cards
/// do: not in cart adds one (with an "added" flag and a toast), already
/// in cart removes it. Button flags resynchronize on every cart change,
/// so removals made elsewhere (e.g. from the cart panel) clear the flag
/// too.
pub struct AddToCartButtons {
    _click_guard: ListenerGuard,
    _subscription: Subscription,
}

impl AddToCartButtons {
    /// Bind `buttons` to `store`. An empty button list is fine - the
    /// binding just never fires.
    pub fn bind(
        host: &HostRef,
        store: Rc<CartStore>,
        bus: &Rc<EventBus>,
        buttons: Vec<ElementRef>,
        toast: Option<Toast>,
    ) -> Self {
        let inner = Rc::new(ButtonsInner {
            store,
            buttons,
            toast,
        });
        inner.sync_flags();

        let click_inner = Rc::clone(&inner);
        let click_guard = ListenerGuard::register(
            host,
            PageEventKind::Click,
            Rc::new(move |event| {
                if let PageEvent::Click(point) = event {
                    click_inner.handle_click(*point);
                }
            }),
        );

        let sync_inner = Rc::clone(&inner);
        let subscription = bus.subscribe(CART_CHANGED, move |_: &CartChanged| {
            sync_inner.sync_flags();
        });

        Self {
            _click_guard: click_guard,
            _subscription: subscription,
        }
    }
}

struct ButtonsInner {
    store: Rc<CartStore>,
    buttons: Vec<ElementRef>,
    toast: Option<Toast>,
}

impl ButtonsInner {
    fn handle_click(&self, point: flourish_core::Point) {
        let Some(button) = self.buttons.iter().find(|button| button.contains(point)) else {
            return;
        };
        let Some(descriptor) = NewItemDescriptor::from_element(button.as_ref()) else {
            return;
        };

        if self.store.contains(&descriptor.id) {
            self.store.remove(&descriptor.id);
            self.notify("Product removed from cart");
        } else {
            self.store.upsert_increment(descriptor);
            self.notify("Product added to cart");
        }
    }

    fn sync_flags(&self) {
        for button in &self.buttons {
            if let Some(id) = button.attribute(attrs::ID) {
                button.set_flag("added", self.store.contains(&ProductId::new(id)));
            }
        }
    }

    fn notify(&self, message: &str) {
        if let Some(toast) = &self.toast {
            toast.show(message);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::sim::{SimElement, SimHost};
    use crate::store::storage::MemoryStorage;
    use flourish_core::{Point, Rect};
    use std::cell::Cell;

    fn descriptor(id: &str, price: &str) -> NewItemDescriptor {
        NewItemDescriptor {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: DisplayPrice::new(price),
            price_unit: None,
            img_src: None,
        }
    }

    fn open_cart() -> (Rc<CartStore>, Rc<EventBus>) {
        let bus = EventBus::new();
        let store = CartStore::open(Rc::new(MemoryStorage::new()), Rc::clone(&bus));
        (store, bus)
    }

    #[test]
    fn test_double_add_increments_single_entry() {
        let (store, _bus) = open_cart();
        store.upsert_increment(descriptor("a", "$10.00"));
        store.upsert_increment(descriptor("a", "$10.00"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().unwrap().quantity, 2);
        assert_eq!(store.total_item_count(), 2);
        assert_eq!(store.total_price().to_string(), "20.00");
    }

    #[test]
    fn test_new_items_get_defaults() {
        let (store, _bus) = open_cart();
        store.upsert_increment(descriptor("a", "$5.00"));

        let item = store.snapshot().into_iter().next().unwrap();
        assert_eq!(item.price_unit, "");
        assert_eq!(item.img_src, PLACEHOLDER_IMAGE);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_set_quantity_zero_is_remove_with_one_publish() {
        let (store, bus) = open_cart();
        store.upsert_increment(descriptor("a", "$10.00"));

        let publishes = Rc::new(Cell::new(0u32));
        let p = Rc::clone(&publishes);
        let _subscription = bus.subscribe(CART_CHANGED, move |_: &CartChanged| p.set(p.get() + 1));

        store.set_quantity(&ProductId::new("a"), 0);
        assert!(!store.contains(&ProductId::new("a")));
        assert_eq!(publishes.get(), 1);
    }

    #[test]
    fn test_set_quantity_absent_id_is_silent() {
        let (store, bus) = open_cart();
        let publishes = Rc::new(Cell::new(0u32));
        let p = Rc::clone(&publishes);
        let _subscription = bus.subscribe(CART_CHANGED, move |_: &CartChanged| p.set(p.get() + 1));

        store.set_quantity(&ProductId::new("ghost"), 3);
        assert_eq!(publishes.get(), 0);
    }

    #[test]
    fn test_item_count_matches_snapshot_for_any_sequence() {
        let (store, _bus) = open_cart();
        store.upsert_increment(descriptor("a", "$1.00"));
        store.upsert_increment(descriptor("b", "$2.00"));
        store.upsert_increment(descriptor("a", "$1.00"));
        store.set_quantity(&ProductId::new("b"), 5);
        store.remove(&ProductId::new("a"));
        store.upsert_increment(descriptor("c", "$3.00"));

        let from_snapshot: u32 = store.snapshot().iter().map(|item| item.quantity).sum();
        assert_eq!(store.total_item_count(), from_snapshot);
    }

    #[test]
    fn test_malformed_price_contributes_zero() {
        let (store, _bus) = open_cart();
        store.upsert_increment(descriptor("a", "$10.00"));
        store.upsert_increment(descriptor("b", "market price"));
        assert_eq!(store.total_price().to_string(), "10.00");
    }

    #[test]
    fn test_total_price_is_idempotent() {
        let (store, _bus) = open_cart();
        store.upsert_increment(descriptor("a", "$3.33"));
        store.upsert_increment(descriptor("a", "$3.33"));
        store.upsert_increment(descriptor("a", "$3.33"));
        assert_eq!(store.total_price(), store.total_price());
        assert_eq!(store.total_price().to_string(), "9.99");
    }

    #[test]
    fn test_publish_carries_snapshot_and_aggregates() {
        let (store, bus) = open_cart();
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        let _subscription =
            bus.subscribe(CART_CHANGED, move |event: &CartChanged| {
                *s.borrow_mut() = Some(event.clone());
            });

        store.upsert_increment(descriptor("a", "$10.00"));
        store.upsert_increment(descriptor("a", "$10.00"));

        let event = seen.borrow().clone().unwrap();
        assert_eq!(event.total_item_count, 2);
        assert_eq!(event.total_price.to_string(), "20.00");
        assert_eq!(event.items.len(), 1);
    }

    #[test]
    fn test_persisted_layout_field_names() {
        let item = LineItem {
            id: ProductId::new("a"),
            title: "Rose".to_owned(),
            price: DisplayPrice::new("$10.00"),
            price_unit: "$2.00/stem".to_owned(),
            img_src: "assets/images/rose.png".to_owned(),
            quantity: 2,
        };
        let json: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["priceUnit"], "$2.00/stem");
        assert_eq!(json["imgSrc"], "assets/images/rose.png");
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_reopen_restores_collection() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let bus = EventBus::new();
        {
            let store = CartStore::open(Rc::clone(&storage), Rc::clone(&bus));
            store.upsert_increment(descriptor("a", "$10.00"));
            store.upsert_increment(descriptor("b", "$2.50"));
            store.upsert_increment(descriptor("a", "$10.00"));
        }
        let reopened = CartStore::open(storage, bus);
        assert_eq!(reopened.total_item_count(), 3);
        assert_eq!(reopened.total_price().to_string(), "22.50");
        let ids: Vec<String> = reopened
            .snapshot()
            .into_iter()
            .map(|item| item.id.into_inner())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    fn product_button(rect: Rect, id: &str, price: &str) -> Rc<SimElement> {
        let button = SimElement::new(rect);
        button.set_attribute("data-product-id", id);
        button.set_attribute("data-product-title", &format!("Product {id}"));
        button.set_attribute("data-product-price", price);
        button
    }

    #[test]
    fn test_button_click_toggles_membership() {
        let host = SimHost::new();
        let host_ref: HostRef = host.clone();
        let (store, bus) = open_cart();
        let button = product_button(Rect::new(0.0, 0.0, 100.0, 40.0), "a", "$10.00");

        let _binding = AddToCartButtons::bind(
            &host_ref,
            Rc::clone(&store),
            &bus,
            vec![Rc::clone(&button) as ElementRef],
            None,
        );

        let on_button = PageEvent::Click(Point::new(50.0, 20.0));
        host.dispatch(&on_button);
        assert!(store.contains(&ProductId::new("a")));
        assert!(button.flag("added"));

        host.dispatch(&on_button);
        assert!(!store.contains(&ProductId::new("a")));
        assert!(!button.flag("added"));
    }

    #[test]
    fn test_button_flag_clears_when_removed_elsewhere() {
        let host = SimHost::new();
        let host_ref: HostRef = host.clone();
        let (store, bus) = open_cart();
        let button = product_button(Rect::new(0.0, 0.0, 100.0, 40.0), "a", "$10.00");

        let _binding = AddToCartButtons::bind(
            &host_ref,
            Rc::clone(&store),
            &bus,
            vec![Rc::clone(&button) as ElementRef],
            None,
        );

        host.dispatch(&PageEvent::Click(Point::new(10.0, 10.0)));
        assert!(button.flag("added"));

        store.remove(&ProductId::new("a"));
        assert!(!button.flag("added"));
    }

    #[test]
    fn test_click_off_buttons_is_ignored() {
        let host = SimHost::new();
        let host_ref: HostRef = host.clone();
        let (store, bus) = open_cart();
        let button = product_button(Rect::new(0.0, 0.0, 100.0, 40.0), "a", "$10.00");

        let _binding = AddToCartButtons::bind(&host_ref, Rc::clone(&store), &bus, vec![button as ElementRef], None);

        host.dispatch(&PageEvent::Click(Point::new(500.0, 500.0)));
        assert!(store.is_empty());
    }
}
