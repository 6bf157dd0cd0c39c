//! Momentum scrolling and carousel paging through the host seam.

use std::rc::Rc;

use flourish_core::{Point, Rect};
use flourish_integration_tests::init_tracing;
use flourish_surface::config::{CarouselOptions, ScrollOptions};
use flourish_surface::host::sim::{SimElement, SimHost, SimScrollRegion};
use flourish_surface::host::{Element, ElementRef, HostRef, PageEvent, RegionRef, ScrollRegion};
use flourish_surface::scroll::{CarouselNav, MomentumScroll};

fn momentum_fixture(max: f64) -> (Rc<SimHost>, MomentumScroll, Rc<SimScrollRegion>) {
    let host = SimHost::new();
    let host_ref: HostRef = Rc::clone(&host) as HostRef;
    let region = SimScrollRegion::new(max);
    let controller = MomentumScroll::bind(
        &host_ref,
        Some(Rc::clone(&region) as RegionRef),
        ScrollOptions::default(),
    )
    .expect("region present");
    (host, controller, region)
}

#[test]
fn full_drag_gesture_scrolls_then_coasts() {
    init_tracing();
    let (host, controller, region) = momentum_fixture(10_000.0);
    region.set_scroll_offset(5000.0);

    controller.pointer_down(400.0);
    controller.pointer_move(390.0);
    controller.pointer_move(380.0);
    // Two 10px pulls at 2x gain.
    assert_eq!(region.scroll_offset(), 5040.0);

    controller.pointer_up();
    let at_release = region.scroll_offset();
    let frames = host.run_frames_until_idle(500);

    // velocity -10 coasts forward (offset grows) and dies out.
    assert!(frames > 0);
    assert!(region.scroll_offset() > at_release);
    assert!(region.scroll_offset() - at_release < 200.0);
    assert!(!controller.decay_active());
}

#[test]
fn decay_loop_is_deterministic() {
    init_tracing();
    let (host, controller, region) = momentum_fixture(10_000.0);
    region.set_scroll_offset(5000.0);

    let run = |host: &Rc<SimHost>, controller: &MomentumScroll, region: &Rc<SimScrollRegion>| {
        region.set_scroll_offset(5000.0);
        controller.pointer_down(100.0);
        controller.pointer_move(110.0);
        controller.pointer_up();
        let frames = host.run_frames_until_idle(500);
        (frames, region.scroll_offset())
    };

    let first = run(&host, &controller, &region);
    let second = run(&host, &controller, &region);
    assert_eq!(first, second);

    // v0 = 10 with friction 0.95 terminates in ~58 frames, with
    // displacement under the geometric limit of 200.
    assert!((55..=62).contains(&first.0));
}

#[test]
fn carousel_pages_and_tracks_extents_across_the_row() {
    init_tracing();
    let host = SimHost::new();
    let host_ref: HostRef = Rc::clone(&host) as HostRef;
    let region = SimScrollRegion::new(520.0);
    let prev = SimElement::new(Rect::new(0.0, 200.0, 40.0, 40.0));
    let next = SimElement::new(Rect::new(1240.0, 200.0, 40.0, 40.0));
    let nav = CarouselNav::bind(
        &host_ref,
        Some(Rc::clone(&region) as RegionRef),
        Some(Rc::clone(&prev) as ElementRef),
        Some(Rc::clone(&next) as ElementRef),
        CarouselOptions::default(),
    )
    .expect("carousel elements present");

    assert!(prev.flag("disabled"));

    // Page to the end: 0 -> 260 -> 520 (clamped at max).
    host.dispatch(&PageEvent::Click(Point::new(1260.0, 220.0)));
    assert_eq!(region.scroll_offset(), 260.0);
    assert!(!prev.flag("disabled"));
    assert!(!next.flag("disabled"));

    host.dispatch(&PageEvent::Click(Point::new(1260.0, 220.0)));
    assert_eq!(region.scroll_offset(), 520.0);
    assert!(next.flag("disabled"));
    assert!(nav.at_end());

    // A disabled next button ignores further clicks.
    host.dispatch(&PageEvent::Click(Point::new(1260.0, 220.0)));
    assert_eq!(region.scroll_offset(), 520.0);

    // Back to the start re-disables prev.
    host.dispatch(&PageEvent::Click(Point::new(20.0, 220.0)));
    host.dispatch(&PageEvent::Click(Point::new(20.0, 220.0)));
    assert_eq!(region.scroll_offset(), 0.0);
    assert!(prev.flag("disabled"));
    assert!(nav.at_start());
}

#[test]
fn touch_paths_have_no_inertia() {
    init_tracing();
    let (host, controller, region) = momentum_fixture(2000.0);
    region.set_scroll_offset(1000.0);

    controller.touch_start(300.0);
    controller.touch_move(280.0);
    controller.touch_move(250.0);
    assert_eq!(region.scroll_offset(), 1100.0);

    controller.touch_end();
    assert_eq!(host.run_frames_until_idle(10), 0);
    assert_eq!(region.scroll_offset(), 1100.0);
}

#[test]
fn touch_drag_interrupts_a_coast() {
    init_tracing();
    let (host, controller, region) = momentum_fixture(10_000.0);
    region.set_scroll_offset(5000.0);

    controller.pointer_down(100.0);
    controller.pointer_move(120.0);
    controller.pointer_up();
    assert!(controller.decay_active());

    // A touch anchor takes over the region; the coast stops.
    controller.touch_start(500.0);
    assert!(!controller.decay_active());
    assert_eq!(host.run_frames_until_idle(10), 0);

    let before = region.scroll_offset();
    controller.touch_move(510.0);
    assert_eq!(region.scroll_offset(), before - 20.0);
}
