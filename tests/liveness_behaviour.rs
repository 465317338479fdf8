// tests/liveness_behaviour.rs

//! Application of liveness reports to a slot: hide/show semantics, stale
//! report filtering, fast-mode suppression, and the full watchdog → channel
//! → slot path.

use std::time::Duration;

use tokio::time::sleep;

use mosaicwatch::runtime::RuntimeEvent;
use mosaicwatch_test_utils::builders::slot_harness;
use mosaicwatch_test_utils::init_tracing;

const STALL: Duration = Duration::from_millis(5000);

#[tokio::test(start_paused = true)]
async fn stall_hides_the_live_surface_and_alive_reshows_it() {
    init_tracing();
    let mut h = slot_harness(STALL);
    h.slot.surface_handle();
    h.slot.select_stream_mode("live/stream1").await;

    let visual = h.slot.surface_visual().expect("live surface");
    let epoch = h.slot.live_epoch();
    assert!(h.host.is_visible(visual));

    h.slot.apply_liveness(true, epoch);
    assert!(!h.host.is_visible(visual));

    // Level signal: repeating the same verdict changes nothing.
    h.slot.apply_liveness(true, epoch);
    assert!(!h.host.is_visible(visual));

    h.slot.apply_liveness(false, epoch);
    assert!(h.host.is_visible(visual));

    h.slot.apply_liveness(false, epoch);
    assert!(h.host.is_visible(visual));
}

#[tokio::test(start_paused = true)]
async fn reports_from_a_previous_generation_are_discarded() {
    init_tracing();
    let mut h = slot_harness(STALL);
    h.slot.surface_handle();

    h.slot.select_stream_mode("live/stream1").await;
    let stale_epoch = h.slot.live_epoch();

    h.slot.select_safe_mode(5000).await;
    let visual = h.slot.surface_visual().expect("live surface");

    // A stall verdict queued before the rebuild must not blank the new feed.
    h.slot.apply_liveness(true, stale_epoch);
    assert!(h.host.is_visible(visual));

    // The current generation still works.
    h.slot.apply_liveness(true, h.slot.live_epoch());
    assert!(!h.host.is_visible(visual));
}

#[tokio::test(start_paused = true)]
async fn fast_mode_suppresses_the_fallback_swap() {
    init_tracing();
    let mut h = slot_harness(STALL);
    h.slot.surface_handle();
    h.slot.select_fast_mode(5000).await;

    let visual = h.slot.surface_visual().expect("live surface");
    let epoch = h.slot.live_epoch();

    // Stall verdicts keep being computed but never touch the surface.
    for _ in 0..3 {
        h.slot.apply_liveness(true, epoch);
        assert!(h.host.is_visible(visual));
    }
}

#[tokio::test(start_paused = true)]
async fn stall_reports_are_inert_against_a_placeholder() {
    init_tracing();
    let mut h = slot_harness(STALL);
    h.slot.surface_handle();
    h.slot.select_black_screen().await;

    let placeholder = h.slot.surface_visual().expect("placeholder");
    let epoch = h.slot.live_epoch();

    h.slot.apply_liveness(true, epoch);
    assert!(h.host.is_visible(placeholder));
}

#[tokio::test(start_paused = true)]
async fn reports_against_an_uninitialised_slot_are_no_ops() {
    init_tracing();
    let mut h = slot_harness(STALL);

    // No container, no surface, nothing to touch.
    h.slot.apply_liveness(true, h.slot.live_epoch());
    h.slot.apply_liveness(false, h.slot.live_epoch());
}

#[tokio::test(start_paused = true)]
async fn watchdog_reports_reach_the_slot_through_the_event_channel() {
    init_tracing();
    let mut h = slot_harness(Duration::from_millis(100));
    h.slot.surface_handle();
    h.slot.select_stream_mode("live/stream1").await;

    let visual = h.slot.surface_visual().expect("live surface");

    // No buffers yet: the first window reads as stalled.
    let event = h.events_rx.recv().await.expect("liveness event");
    let RuntimeEvent::Liveness {
        slot,
        stalled,
        epoch,
    } = event
    else {
        panic!("unexpected event: {event:?}");
    };
    assert_eq!(slot, h.slot.id());
    assert!(stalled);
    assert_eq!(epoch, h.slot.live_epoch());

    h.slot.apply_liveness(stalled, epoch);
    assert!(!h.host.is_visible(visual));

    // Start delivering buffers; a later window flips back to alive.
    let engine = h.engine.clone();
    tokio::spawn(async move {
        loop {
            sleep(Duration::from_millis(25)).await;
            engine.pulse_all();
        }
    });

    loop {
        let event = h.events_rx.recv().await.expect("liveness event");
        let RuntimeEvent::Liveness { stalled, epoch, .. } = event else {
            panic!("unexpected event: {event:?}");
        };
        h.slot.apply_liveness(stalled, epoch);
        if !stalled {
            break;
        }
    }

    assert!(h.host.is_visible(visual));
}
