//! Transient notices with timed dismissal.
//!
//! A toast is bound to one host element. Showing it sets the message,
//! makes the element visible, and (re)arms a hide timer; showing again
//! before the timer fires resets it, so back-to-back notices read in
//! full.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::ToastOptions;
use crate::error::BindError;
use crate::host::{ElementRef, HostRef, TimerId};

/// A transient notice. Cheap to clone; clones share the element and
/// timer.
#[derive(Clone)]
pub struct Toast {
    inner: Rc<ToastInner>,
}

struct ToastInner {
    host: HostRef,
    element: ElementRef,
    options: ToastOptions,
    timer: Cell<Option<TimerId>>,
}

impl Toast {
    /// Bind a toast to its element.
    ///
    /// The element starts hidden.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingTarget`] when the element handle is
    /// absent.
    pub fn bind(
        host: &HostRef,
        element: Option<ElementRef>,
        options: ToastOptions,
    ) -> Result<Self, BindError> {
        let element = element.ok_or(BindError::MissingTarget { role: "toast" })?;
        element.set_visible(false);
        Ok(Self {
            inner: Rc::new(ToastInner {
                host: Rc::clone(host),
                element,
                options,
                timer: Cell::new(None),
            }),
        })
    }

    /// Show `message` and arm the hide timer, resetting any pending
    /// one.
    pub fn show(&self, message: &str) {
        let inner = &self.inner;
        inner.element.set_text(message);
        inner.element.set_visible(true);

        if let Some(timer) = inner.timer.take() {
            inner.host.clear_timeout(timer);
        }

        let weak = Rc::downgrade(inner);
        let timer = inner.host.set_timeout(
            inner.options.duration_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.element.set_visible(false);
                    inner.timer.set(None);
                }
            }),
        );
        inner.timer.set(Some(timer));
    }

    /// Hide immediately and disarm any pending timer.
    pub fn dismiss(&self) {
        if let Some(timer) = self.inner.timer.take() {
            self.inner.host.clear_timeout(timer);
        }
        self.inner.element.set_visible(false);
    }

    /// Whether the toast is currently visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.element.is_visible()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TOAST_DURATION_MS;
    use crate::host::Element;
    use crate::host::sim::{SimElement, SimHost};
    use flourish_core::Rect;

    fn toast(host: &Rc<SimHost>) -> (Toast, Rc<SimElement>) {
        let host_ref: HostRef = Rc::clone(host) as HostRef;
        let element = SimElement::new(Rect::new(1000.0, 700.0, 240.0, 60.0));
        let toast = Toast::bind(
            &host_ref,
            Some(Rc::clone(&element) as ElementRef),
            ToastOptions::default(),
        )
        .unwrap();
        (toast, element)
    }

    #[test]
    fn test_show_then_auto_hide() {
        let host = SimHost::new();
        let (toast, element) = toast(&host);
        assert!(!element.is_visible());

        toast.show("Product added to cart");
        assert!(element.is_visible());
        assert_eq!(element.text(), "Product added to cart");

        host.advance(TOAST_DURATION_MS + 1);
        assert!(!element.is_visible());
        assert_eq!(host.pending_timer_count(), 0);
    }

    #[test]
    fn test_reshow_resets_the_timer() {
        let host = SimHost::new();
        let (toast, element) = toast(&host);

        toast.show("first");
        host.advance(TOAST_DURATION_MS - 500);
        toast.show("second");

        // The original deadline passes; the toast must still be up.
        host.advance(600);
        assert!(element.is_visible());
        assert_eq!(element.text(), "second");

        host.advance(TOAST_DURATION_MS);
        assert!(!element.is_visible());
    }

    #[test]
    fn test_dismiss_disarms_the_timer() {
        let host = SimHost::new();
        let (toast, element) = toast(&host);

        toast.show("gone early");
        toast.dismiss();
        assert!(!element.is_visible());
        assert_eq!(host.pending_timer_count(), 0);
    }

    #[test]
    fn test_missing_element_fails_bind() {
        let host: HostRef = SimHost::new();
        assert!(matches!(
            Toast::bind(&host, None, ToastOptions::default()),
            Err(BindError::MissingTarget { role: "toast" })
        ));
    }
}
