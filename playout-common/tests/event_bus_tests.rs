//! EventBus delivery tests
//!
//! Covers fan-out to several subscribers, per-subscriber ordering and the
//! lag signal slow subscribers receive once the buffer overflows.

use playout_common::events::PlayerState;
use playout_common::{ContentBlock, EventBus, MediaObject, MediaType, PlayoutEvent};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

fn refill_started(pulls: usize) -> PlayoutEvent {
    PlayoutEvent::RefillStarted {
        pulls,
        timestamp: playout_common::time::now(),
    }
}

fn pulls(event: PlayoutEvent) -> usize {
    match event {
        PlayoutEvent::RefillStarted { pulls, .. } => pulls,
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_every_subscriber_sees_events_in_emit_order() {
    let bus = EventBus::new(16);
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    for n in 1..=3 {
        bus.emit_lossy(refill_started(n));
    }

    for rx in [&mut first, &mut second] {
        let seen: Vec<usize> = vec![
            pulls(rx.recv().await.unwrap()),
            pulls(rx.recv().await.unwrap()),
            pulls(rx.recv().await.unwrap()),
        ];
        assert_eq!(seen, vec![1, 2, 3]);
    }
}

#[tokio::test]
async fn test_late_subscriber_misses_earlier_events() {
    let bus = EventBus::new(16);
    let _keep_alive = bus.subscribe();
    bus.emit_lossy(refill_started(1));

    let mut late = bus.subscribe();
    assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));

    bus.emit_lossy(refill_started(2));
    assert_eq!(pulls(late.recv().await.unwrap()), 2);
}

#[tokio::test]
async fn test_slow_subscriber_is_told_it_lagged() {
    let bus = EventBus::new(2);
    let mut slow = bus.subscribe();

    for n in 1..=5 {
        bus.emit_lossy(refill_started(n));
    }

    match slow.recv().await {
        Err(RecvError::Lagged(skipped)) => assert_eq!(skipped, 3),
        other => panic!("expected lag, got {:?}", other),
    }
    // Buffer still holds the newest events
    assert_eq!(pulls(slow.recv().await.unwrap()), 4);
    assert_eq!(pulls(slow.recv().await.unwrap()), 5);
}

#[test]
fn test_player_state_wire_shape() {
    let block = ContentBlock::new(MediaObject::new(MediaType::Video, "clip", "/clip.mp4", 5000));
    let state = PlayerState {
        current_block: Some(block.clone()),
        progress_ms: 1200,
        queue: vec![block],
    };

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["progressMs"], 1200);
    assert_eq!(json["currentBlock"]["media"]["type"], "Video");
    assert_eq!(json["currentBlock"]["media"]["durationMs"], 5000);
    assert_eq!(json["queue"].as_array().unwrap().len(), 1);
}
