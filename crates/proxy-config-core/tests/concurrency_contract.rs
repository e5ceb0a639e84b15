//! Architectural Contract Test: Cadence, Backpressure & Independence
//!
//! Constraints verified:
//! - Cycles run on a fixed interval, with no backoff after failures
//! - A cycle does not finish until the consumer has taken its events
//! - Every source has its own channels and its own baseline
//!
//! If this test fails, the loop can hot-spin, race ahead of consumers or
//! let one source overwrite another source's view.

mod common;

use common::*;
use proxy_config_core::{ConfigWatcher, CycleOutcome, PollConfig, ServiceFact, ServiceUpdate};
use std::time::Duration;
use tokio_test::{assert_pending, assert_ready_ok};

#[tokio::test(start_paused = true)]
async fn failing_source_is_polled_on_the_fixed_interval() {
    let source = ScriptedSource::failing();
    let (watcher, _rx) =
        ConfigWatcher::new(Box::new(source.clone()), PollConfig::default()).unwrap();

    let handle = watcher.spawn();

    // Cycles at 0s, 5s, 10s and 15s
    tokio::time::sleep(Duration::from_millis(15_001)).await;
    assert_eq!(source.read_count(), 4);

    handle.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn healthy_source_is_polled_on_the_same_interval() {
    let source = ScriptedSource::new(Step::doc(EXAMPLE));
    let poll = PollConfig::default().with_channel_capacity(16);
    let (watcher, _rx) = ConfigWatcher::new(Box::new(source.clone()), poll).unwrap();

    let handle = watcher.spawn();

    tokio::time::sleep(Duration::from_millis(15_001)).await;
    assert_eq!(source.read_count(), 4);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn cycle_waits_for_the_consumer_to_take_each_event() {
    let source = ScriptedSource::new(Step::doc(EXAMPLE));
    let (mut watcher, mut rx) =
        ConfigWatcher::new(Box::new(source.clone()), PollConfig::default()).unwrap();

    {
        let mut cycle = tokio_test::task::spawn(watcher.poll_once());

        // Services queued, nobody has taken it yet
        assert_pending!(cycle.poll());
        let services = rx.services.try_recv().unwrap();
        assert_eq!(services.payload[1], ServiceFact::new("mysql", 10001));

        // Endpoints queued next, again waiting on the consumer
        assert!(cycle.is_woken());
        assert_pending!(cycle.poll());
        rx.endpoints.try_recv().unwrap();

        assert!(cycle.is_woken());
        let outcome = assert_ready_ok!(cycle.poll());
        assert_eq!(
            outcome,
            CycleOutcome::Dispatched {
                services: true,
                endpoints: true
            }
        );
    }
    assert_eq!(source.read_count(), 1);

    source.push(Step::doc(EXAMPLE_MYSQL_NEW_PORT));
    {
        let mut cycle = tokio_test::task::spawn(watcher.poll_once());
        assert_pending!(cycle.poll());

        let next = rx.services.try_recv().unwrap();
        assert_eq!(next.payload[1], ServiceFact::new("mysql", 10002));

        assert!(cycle.is_woken());
        assert_eq!(
            assert_ready_ok!(cycle.poll()),
            CycleOutcome::Dispatched {
                services: true,
                endpoints: false
            }
        );
    }

    assert_eq!(
        watcher.last_accepted().unwrap().services()[1],
        ServiceFact::new("mysql", 10002)
    );
    assert_eq!(drain(&mut rx).total(), 0);
}

#[tokio::test]
async fn unconsumed_event_holds_back_the_next_read() {
    let source = ScriptedSource::new(Step::doc(EXAMPLE));
    let (watcher, mut rx) = ConfigWatcher::new(
        Box::new(source.clone()),
        PollConfig::with_interval(Duration::from_millis(5)),
    )
    .unwrap();

    let handle = watcher.spawn();
    while source.read_count() < 1 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The first cycle is still handing off its services event
    assert_eq!(source.read_count(), 1);

    rx.services.recv().await.unwrap();
    rx.endpoints.recv().await.unwrap();
    while source.read_count() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    handle.stop().await.unwrap();
}

/// Apply every queued services event the way a routing table would
fn apply_services(view: &mut Vec<String>, updates: Vec<ServiceUpdate>) {
    for update in updates {
        *view = update.payload.iter().map(|s| s.name.clone()).collect();
    }
}

#[tokio::test]
async fn each_source_has_its_own_channels() {
    let frontends = ScriptedSource::new(Step::doc(
        r#"{"Services": [{"Name": "web", "Port": 80, "Endpoints": ["10.0.0.1:8080"]}]}"#,
    ));
    let backends = ScriptedSource::new(Step::doc(EXAMPLE));

    let (mut first, mut first_rx) =
        ConfigWatcher::new(Box::new(frontends.clone()), manual_poll()).unwrap();
    let (mut second, mut second_rx) =
        ConfigWatcher::new(Box::new(backends), manual_poll()).unwrap();

    assert_eq!(first.poll_once().await.unwrap().events(), 2);
    assert_eq!(second.poll_once().await.unwrap().events(), 2);

    // Only the first source changes; the second keeps its own baseline
    frontends.push(Step::doc(
        r#"{"Services": [{"Name": "web", "Port": 80, "Endpoints": ["10.0.0.2:8080"]}]}"#,
    ));
    assert_eq!(first.poll_once().await.unwrap().events(), 1);
    assert_eq!(second.poll_once().await.unwrap(), CycleOutcome::Unchanged);

    let from_first = drain(&mut first_rx);
    let from_second = drain(&mut second_rx);

    // Full replacement on one source's channel never wipes the other's view
    let mut first_view = Vec::new();
    let mut second_view = Vec::new();
    apply_services(&mut first_view, from_first.services);
    apply_services(&mut second_view, from_second.services);
    assert_eq!(first_view, vec!["web"]);
    assert_eq!(second_view, vec!["nodejs", "mysql"]);

    assert_eq!(from_first.endpoints.len(), 2);
    assert_eq!(from_first.endpoints[1].payload[0].addresses, vec!["10.0.0.2:8080"]);
    assert_eq!(from_second.endpoints.len(), 1);
}
