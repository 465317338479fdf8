// tests/registry_runtime.rs

//! Mosaic-wide behaviour: sequential mode application across slots, slot
//! isolation, liveness routing, and the runtime event loop end to end.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use mosaicwatch::engine::{MediaEngine, MockEngine, SimEngine};
use mosaicwatch::runtime::{Runtime, RuntimeEvent};
use mosaicwatch::slot::{MosaicMode, SlotId, SlotRegistry, SlotState, StreamMode};
use mosaicwatch::surface::HeadlessHost;
use mosaicwatch_test_utils::builders::ConfigFileBuilder;
use mosaicwatch_test_utils::init_tracing;

struct RegistryHarness {
    host: Arc<HeadlessHost>,
    engine: Arc<MockEngine>,
    events_tx: mpsc::Sender<RuntimeEvent>,
    events_rx: mpsc::Receiver<RuntimeEvent>,
    registry: SlotRegistry,
}

fn registry_harness(slots: usize, stall_timeout_ms: u64) -> RegistryHarness {
    let mut builder = ConfigFileBuilder::new().with_stall_timeout_ms(stall_timeout_ms);
    for index in 0..slots {
        builder = builder.with_slot(&format!("live/stream{}", index + 1), 5000 + index as u16);
    }
    let cfg = builder.build();

    let host = Arc::new(HeadlessHost::default());
    let engine = Arc::new(MockEngine::new(Arc::clone(&host)));
    let (events_tx, events_rx) = mpsc::channel::<RuntimeEvent>(64);

    let registry = SlotRegistry::from_config(
        &cfg,
        Arc::clone(&engine) as Arc<dyn MediaEngine>,
        Arc::clone(&host) as Arc<dyn mosaicwatch::surface::SurfaceHost>,
        events_tx.clone(),
    );

    RegistryHarness {
        host,
        engine,
        events_tx,
        events_rx,
        registry,
    }
}

#[tokio::test(start_paused = true)]
async fn mode_change_rebuilds_every_slot_in_order() {
    init_tracing();
    let mut h = registry_harness(3, 500);
    let containers = h.registry.surface_handles();
    assert_eq!(containers.len(), 3);

    h.registry
        .apply_mode(MosaicMode::Stream(StreamMode::UdpSafe))
        .await;

    let built = h.engine.built_descriptors();
    assert_eq!(built.len(), 3);
    assert!(built[0].contains("port=5000"));
    assert!(built[1].contains("port=5001"));
    assert!(built[2].contains("port=5002"));

    for (index, container) in containers.iter().enumerate() {
        let slot = h.registry.slot(SlotId(index)).expect("slot");
        assert_eq!(slot.state(), SlotState::Playing(StreamMode::UdpSafe));
        assert_eq!(h.host.children_of(*container).len(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn a_failing_slot_never_disturbs_its_neighbours() {
    init_tracing();
    let mut h = registry_harness(3, 500);
    let containers = h.registry.surface_handles();

    // Only slot 2's descriptor fails to build.
    h.engine.fail_descriptors_matching("port=5001");
    h.registry
        .apply_mode(MosaicMode::Stream(StreamMode::UdpSafe))
        .await;

    let states: Vec<SlotState> = (0..3)
        .map(|i| h.registry.slot(SlotId(i)).unwrap().state())
        .collect();
    assert_eq!(states[0], SlotState::Playing(StreamMode::UdpSafe));
    assert_eq!(states[1], SlotState::Degraded);
    assert_eq!(states[2], SlotState::Playing(StreamMode::UdpSafe));

    // Every slot still shows exactly one surface; the healthy ones are live.
    for container in &containers {
        assert_eq!(h.host.children_of(*container).len(), 1);
    }
    assert!(h.registry.slot(SlotId(0)).unwrap().has_live_surface());
    assert!(!h.registry.slot(SlotId(1)).unwrap().has_live_surface());
    assert!(h.registry.slot(SlotId(2)).unwrap().has_live_surface());

    // The degraded slot recovers on the next rebuild.
    h.engine.clear_failures();
    h.registry
        .apply_mode(MosaicMode::Stream(StreamMode::UdpSafe))
        .await;
    assert_eq!(
        h.registry.slot(SlotId(1)).unwrap().state(),
        SlotState::Playing(StreamMode::UdpSafe)
    );

    h.registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn liveness_reports_only_touch_their_own_slot() {
    init_tracing();
    let mut h = registry_harness(2, 500);
    h.registry.surface_handles();
    h.registry
        .apply_mode(MosaicMode::Stream(StreamMode::Srt))
        .await;

    let visual0 = h.registry.slot(SlotId(0)).unwrap().surface_visual().unwrap();
    let visual1 = h.registry.slot(SlotId(1)).unwrap().surface_visual().unwrap();
    let epoch1 = h.registry.slot(SlotId(1)).unwrap().live_epoch();

    h.registry.apply_liveness(SlotId(1), true, epoch1);

    assert!(h.host.is_visible(visual0), "slot 1 must be untouched");
    assert!(!h.host.is_visible(visual1));

    // Reports for unknown slots are logged and dropped.
    h.registry.apply_liveness(SlotId(99), true, 1);

    h.registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn runtime_drains_events_and_shuts_the_mosaic_down() {
    init_tracing();
    let h = registry_harness(3, 500);
    let RegistryHarness {
        host,
        engine,
        events_tx,
        events_rx,
        mut registry,
    } = h;
    registry.surface_handles();

    events_tx
        .send(RuntimeEvent::ModeChangeRequested {
            mode: MosaicMode::Stream(StreamMode::UdpSafe),
        })
        .await
        .expect("send mode change");
    events_tx
        .send(RuntimeEvent::ShutdownRequested)
        .await
        .expect("send shutdown");

    let runtime = Runtime::new(registry, events_rx);
    timeout(Duration::from_secs(60), runtime.run())
        .await
        .expect("runtime must finish")
        .expect("runtime must not error");

    assert_eq!(engine.built_descriptors().len(), 3);
    assert_eq!(engine.live_pipelines(), 0, "shutdown releases every pipeline");
    assert_eq!(host.container_count(), 0, "shutdown destroys every container");
}

#[tokio::test(start_paused = true)]
async fn simulated_dead_feed_degrades_only_its_own_slot() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stall_timeout_ms(100)
        .with_slot("live/stream1", 5000)
        .with_slot("live/stream2", 5001)
        .build();

    let host = Arc::new(HeadlessHost::default());
    let engine = Arc::new(SimEngine::new(
        Arc::clone(&host),
        Duration::from_millis(20),
        vec!["port=5001".to_string()],
    ));
    let (events_tx, mut events_rx) = mpsc::channel::<RuntimeEvent>(64);

    let mut registry = SlotRegistry::from_config(
        &cfg,
        Arc::clone(&engine) as Arc<dyn MediaEngine>,
        Arc::clone(&host) as Arc<dyn mosaicwatch::surface::SurfaceHost>,
        events_tx,
    );
    registry.surface_handles();
    registry
        .apply_mode(MosaicMode::Stream(StreamMode::UdpSafe))
        .await;

    let visual0 = registry.slot(SlotId(0)).unwrap().surface_visual().unwrap();
    let visual1 = registry.slot(SlotId(1)).unwrap().surface_visual().unwrap();

    // Drain a few windows' worth of verdicts into the registry.
    for _ in 0..6 {
        let event = events_rx.recv().await.expect("liveness event");
        if let RuntimeEvent::Liveness {
            slot,
            stalled,
            epoch,
        } = event
        {
            registry.apply_liveness(slot, stalled, epoch);
        }
    }

    assert!(host.is_visible(visual0), "fed slot stays on screen");
    assert!(!host.is_visible(visual1), "starved slot is blanked");

    registry.shutdown().await;
}
