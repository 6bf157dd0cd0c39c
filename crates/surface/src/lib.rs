//! Flourish Surface - Client-side interactive storefront surface.
//!
//! This crate implements the interactive core of the storefront: the
//! persisted cart store, the pub/sub channel that keeps its UI consumers
//! in sync, overlay lifecycle coordination, and momentum scrolling.
//!
//! # Architecture
//!
//! - Single-threaded, event-driven, cooperative: all work runs on the UI
//!   thread in response to input events, storage callbacks, or
//!   animation-frame callbacks. Shared ownership is [`std::rc::Rc`],
//!   interior mutability is [`std::cell::RefCell`]; nothing here is
//!   `Send` or `Sync`.
//! - The embedding page (templating, routing, styling, bootstrap) is an
//!   external collaborator reached only through the [`host`] seam:
//!   element handles in, visibility/style toggles and notifications out.
//! - Cross-component communication is event-driven through the [`bus`];
//!   no component polls another.
//!
//! # Modules
//!
//! - [`store`] - Generic durable collection keyed by id
//! - [`cart`] - The cart: one store instance plus derived aggregates
//! - [`bus`] - Process-wide typed-topic publish/subscribe
//! - [`overlay`] - Floating-panel lifecycle, dismissal, and placement
//! - [`scroll`] - Drag-to-scroll with inertial release, carousel paging
//! - [`badge`] - Cart count badges, driven by cart-changed events
//! - [`toast`] - Transient notices with timed dismissal
//! - [`host`] - The seam to the embedding page, plus a simulated host

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod badge;
pub mod bus;
pub mod cart;
pub mod config;
pub mod error;
pub mod host;
pub mod overlay;
pub mod scroll;
pub mod store;
pub mod toast;

pub use badge::CartBadges;
pub use bus::{EventBus, Subscription, Topic};
pub use cart::{AddToCartButtons, CART_CHANGED, CartChanged, CartStore, LineItem, NewItemDescriptor};
pub use config::{CarouselOptions, FullscreenOverlayOptions, OverlayOptions, ScrollOptions, ToastOptions};
pub use error::{BindError, StorageError};
pub use overlay::{FullscreenOverlay, Overlay};
pub use scroll::{CarouselNav, MomentumScroll};
pub use store::{KeyedStore, StoreRecord, storage::FileStorage, storage::MemoryStorage, storage::Storage};
pub use toast::Toast;
