//! Integration tests for the adapter session lifecycle
//!
//! These tests drive an `Adapter` against the in-memory host the same way a
//! real host would: through lifecycle events and the callback primitives.

use hostkit::prelude::*;
use hostkit::{CLEANUP_DELAY, EXIT_CODE, EXIT_GRACE, StateChangeHandler};
use futures::future::BoxFuture;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct Observed {
    main_calls: AtomicU32,
    lang_in_main: Mutex<Option<String>>,
    messages: Mutex<Vec<String>>,
    changes: Mutex<Vec<(String, StateValue)>>,
}

struct ObservingApp(Arc<Observed>);

#[async_trait::async_trait]
impl AdapterApp for ObservingApp {
    async fn main(&self, adapter: &Adapter) {
        self.0.main_calls.fetch_add(1, Ordering::SeqCst);
        *self.0.lang_in_main.lock().unwrap() = adapter.config().lang;
    }

    async fn message(&self, _adapter: &Adapter, msg: Message) -> hostkit::Result<StateValue> {
        self.0
            .messages
            .lock()
            .unwrap()
            .push(msg.command.unwrap_or_default());
        Ok(StateValue::Null)
    }
}

fn system_config() -> HostObject {
    let mut obj = HostObject::new("system.config", "config");
    obj.common.insert("language".into(), json!("de"));
    obj.common.insert("latitude".into(), json!("52.52"));
    obj.common.insert("longitude".into(), json!(13.405));
    obj
}

fn setup(config: StateValue) -> (Arc<MemoryHost>, Arc<Adapter>, Arc<Observed>) {
    let host = Arc::new(MemoryHost::new("lifecycle", 0).with_config(config));
    let observed = Arc::new(Observed::default());
    let adapter = Adapter::new(host.clone(), ObservingApp(Arc::clone(&observed)));
    (host, adapter, observed)
}

#[tokio::test]
async fn test_ready_initializes_then_runs_main() {
    let (host, adapter, observed) = setup(json!({}));
    host.insert_object(system_config());
    host.insert_object(HostObject::new("lifecycle.0.kept", "state"));

    adapter.on_ready().await;

    assert_eq!(observed.main_calls.load(Ordering::SeqCst), 1);
    assert_eq!(observed.lang_in_main.lock().unwrap().as_deref(), Some("de"));

    let config = adapter.config();
    assert_eq!(config.latitude, Some(52.52));
    assert_eq!(config.longitude, Some(13.405));
    assert!(!config.forceinit);

    assert_eq!(adapter.object_count(), 2);
    assert!(adapter.object("lifecycle.0.kept").is_some());
    assert_eq!(host.subscriptions(), vec!["*"]);
    assert_eq!(host.count_calls("delState"), 0);
}

#[tokio::test]
async fn test_forceinit_clears_namespace_only() {
    let (host, adapter, _observed) = setup(json!({"forceinit": true}));
    host.insert_object(HostObject::new("lifecycle.0.a", "state"));
    host.insert_object(HostObject::new("lifecycle.0.b", "channel"));
    host.insert_object(HostObject::new("lifecycle.1.a", "state"));
    host.put_state("lifecycle.0.a", State::new(1, true));

    adapter.init().await;

    assert!(host.object("lifecycle.0.a").is_none());
    assert!(host.object("lifecycle.0.b").is_none());
    assert!(host.state("lifecycle.0.a").is_none());
    assert_eq!(adapter.object_count(), 1);
    assert!(adapter.object("lifecycle.1.a").is_some());
    // "lifecycle.0.b" had no state: the "Not exists" answer did not stop the cleanup.
    assert_eq!(host.count_calls("delObject"), 2);
}

#[tokio::test]
async fn test_init_survives_store_failures() {
    let (host, adapter, observed) = setup(json!({"forceinit": true}));
    host.insert_object(HostObject::new("lifecycle.0.a", "state"));
    host.fail_next("delState", "store locked");

    adapter.on_ready().await;

    assert_eq!(observed.main_calls.load(Ordering::SeqCst), 1);
    assert!(host.object("lifecycle.0.a").is_some());
    assert_eq!(host.subscriptions(), vec!["*"]);
}

#[tokio::test]
async fn test_object_list_failure_still_subscribes() {
    let (host, adapter, observed) = setup(json!({}));
    host.fail_next("getObjectList", "timeout");

    adapter.on_ready().await;

    assert_eq!(adapter.object_count(), 0);
    assert_eq!(host.subscriptions(), vec!["*"]);
    assert_eq!(observed.main_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_config_falls_back_to_defaults() {
    let (_host, adapter, _observed) = setup(json!({"forceinit": "sometimes"}));
    assert_eq!(adapter.config(), AdapterConfig::default());
}

#[tokio::test]
async fn test_state_changes_filter_own_writes() {
    let (_host, adapter, observed) = setup(json!({}));
    let recorder = Arc::clone(&observed);
    adapter.on_state_change_with(move |id, state| {
        let recorder = Arc::clone(&recorder);
        async move {
            recorder.changes.lock().unwrap().push((id, state.val));
        }
    });

    let own = State::new(1, true).from_origin(adapter.origin());
    let foreign = State::new(2, false).from_origin("system.adapter.web.0");

    adapter.on_state_change("lifecycle.0.a".into(), Some(own)).await;
    adapter.on_state_change("lifecycle.0.b".into(), Some(foreign)).await;
    adapter.on_state_change("lifecycle.0.c".into(), None).await;

    assert_eq!(
        *observed.changes.lock().unwrap(),
        vec![("lifecycle.0.b".to_string(), json!(2))]
    );
}

#[tokio::test]
async fn test_state_change_without_handler_is_ignored() {
    let (_host, adapter, _observed) = setup(json!({}));
    assert!(adapter.state_change_handler().is_none());
    adapter
        .on_state_change("lifecycle.0.a".into(), Some(State::new(1, false)))
        .await;

    let handler: StateChangeHandler =
        Arc::new(|_id: String, _state: State| -> BoxFuture<'static, ()> { Box::pin(async {}) });
    adapter.set_state_change_handler(Some(handler));
    assert!(adapter.state_change_handler().is_some());
    adapter.set_state_change_handler(None);
    assert!(adapter.state_change_handler().is_none());
}

#[tokio::test]
async fn test_run_dispatches_host_events() {
    let (host, adapter, observed) = setup(json!({}));
    host.push_message(Message::new("queued", json!(null)));
    let (tx, rx) = mpsc::channel(8);

    let runner = tokio::spawn(Arc::clone(&adapter).run(rx));
    tx.send(HostEvent::Ready).await.unwrap();
    tx.send(HostEvent::Message(Message::new("hello", json!({"a": 1}))))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    tx.send(HostEvent::Unload).await.unwrap();
    runner.await.unwrap();

    assert_eq!(observed.main_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*observed.messages.lock().unwrap(), vec!["hello", "queued"]);
    assert!(adapter.is_stopping());
    assert_eq!(host.terminated(), None);
}

#[tokio::test(start_paused = true)]
async fn test_stop_aborts_timer_without_exit() {
    let (host, adapter, _observed) = setup(json!({}));
    let ticks = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&ticks);
    adapter.start_timer(Duration::from_millis(10), move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert!(adapter.has_timer());

    tokio::time::sleep(Duration::from_millis(35)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 3);

    adapter.stop(false);
    adapter.stop(false);
    assert!(!adapter.has_timer());
    assert!(adapter.is_stopping());

    tokio::time::sleep(EXIT_GRACE * 2).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 3);
    assert_eq!(host.terminated(), None);

    adapter.start_timer(Duration::from_millis(10), || async {});
    assert!(!adapter.has_timer());
}

#[tokio::test(start_paused = true)]
async fn test_stop_with_exit_terminates_after_grace() {
    let (host, adapter, _observed) = setup(json!({}));

    adapter.stop(true);
    adapter.stop(true);

    tokio::time::sleep(EXIT_GRACE - Duration::from_millis(1)).await;
    assert_eq!(host.terminated(), None);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(host.terminated(), Some(EXIT_CODE));
}

#[tokio::test]
async fn test_debug_flag_is_per_session() {
    let (_host, adapter, _observed) = setup(json!({}));
    let (_other_host, other, _other_observed) = setup(json!({}));

    adapter.set_debug(true);
    assert!(adapter.is_debug());
    assert!(!other.is_debug());
    assert_eq!(adapter.namespace(), "lifecycle.0");
}

#[tokio::test(start_paused = true)]
async fn test_forceinit_cleanup_is_throttled() {
    let (host, adapter, _observed) = setup(json!({"forceinit": true}));
    for name in ["a", "b", "c", "d", "e"] {
        host.insert_object(HostObject::new(format!("lifecycle.0.{name}"), "state"));
    }

    let start = tokio::time::Instant::now();
    adapter.init().await;

    assert_eq!(host.count_calls("delObject"), 5);
    assert!(start.elapsed() >= CLEANUP_DELAY * 5);
}

#[derive(Default)]
struct Overlap {
    active: AtomicU32,
    peak: AtomicU32,
    handled: Mutex<Vec<String>>,
}

struct SlowApp(Arc<Overlap>);

#[async_trait::async_trait]
impl AdapterApp for SlowApp {
    async fn message(&self, _adapter: &Adapter, msg: Message) -> hostkit::Result<StateValue> {
        let now = self.0.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.0
            .handled
            .lock()
            .unwrap()
            .push(msg.command.unwrap_or_default());
        self.0.active.fetch_sub(1, Ordering::SeqCst);
        Ok(StateValue::Null)
    }
}

#[tokio::test(start_paused = true)]
async fn test_message_drains_never_overlap() {
    let host = Arc::new(MemoryHost::new("lifecycle", 0));
    let overlap = Arc::new(Overlap::default());
    let adapter = Adapter::new(host.clone(), SlowApp(Arc::clone(&overlap)));
    host.push_message(Message::new("queued", json!(null)));
    let (tx, rx) = mpsc::channel(8);

    let runner = tokio::spawn(Arc::clone(&adapter).run(rx));
    tx.send(HostEvent::Message(Message::new("first", json!(1))))
        .await
        .unwrap();
    tx.send(HostEvent::Message(Message::new("second", json!(2))))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(HostEvent::Unload).await.unwrap();
    runner.await.unwrap();

    assert_eq!(overlap.peak.load(Ordering::SeqCst), 1);
    let mut handled = overlap.handled.lock().unwrap().clone();
    handled.sort();
    assert_eq!(handled, vec!["first", "queued", "second"]);
}
