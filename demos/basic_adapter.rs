//! A complete example showing how to build an adapter with hostkit.
//!
//! This example demonstrates:
//! - Implementing `AdapterApp` with a `main` and a message handler
//! - Declaring states with `make_state` and updating them with `change_state`
//! - Reacting to state changes made by other adapters
//! - Driving the session with host lifecycle events
//!
//! It runs against the in-memory host, so no real home-automation host is needed.

use hostkit::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Step 1: The application
// ============================================================================

/// A tiny heating controller: it publishes a target temperature and a valve
/// position, and answers `status` messages.
struct Heating;

#[async_trait::async_trait]
impl AdapterApp for Heating {
    async fn main(&self, adapter: &Adapter) {
        let config = adapter.config();
        println!(
            "[main] language={:?} location={:?}/{:?}",
            config.lang, config.latitude, config.longitude
        );

        // A bare id gets default metadata; "Percent" ids get unit "%"
        let _ = adapter.make_state("valvePercent", 40, true).await;

        // A descriptor overrides the defaults
        let target = StateSpec::try_from(json!({
            "id": "target",
            "name": "Target temperature",
            "unit": "°C",
            "write": true,
        }));
        match target {
            Ok(spec) => {
                let _ = adapter.make_state(spec, 21.5, true).await;
            }
            Err(e) => println!("[main] bad descriptor: {e}"),
        }

        // Poll the boiler until it stops reporting "warming up"
        let polls = AtomicU32::new(0);
        repeat(
            5,
            |boiler: &'static str| {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                async move {
                    println!("[main] polling {boiler}, round {n}");
                    if n < 2 { Ok::<_, ()>("warming up") } else { Err(()) }
                }
            },
            "boiler",
        )
        .await;
        println!("[main] boiler ready after {} polls", polls.load(Ordering::SeqCst));

        adapter.on_state_change_with(|id, state| async move {
            println!("[stateChange] {id} = {}", state.val);
        });
    }

    async fn message(&self, adapter: &Adapter, msg: Message) -> hostkit::Result<StateValue> {
        println!("[message] {:?} {}", msg.command, msg.message);
        Ok(json!({ "namespace": adapter.namespace(), "status": "ok" }))
    }
}

// ============================================================================
// Step 2: Wiring the session to a host
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== hostkit Basic Adapter Example ===\n");

    let mut system = HostObject::new("system.config", "config");
    system.common.insert("language".into(), json!("en"));
    system.common.insert("latitude".into(), json!(48.2));
    system.common.insert("longitude".into(), json!(16.37));

    let host = Arc::new(MemoryHost::new("heating", 0).with_config(json!({ "forceinit": false })));
    host.insert_object(system);

    let adapter = Adapter::new(host.clone(), Heating);
    let (events, rx) = mpsc::channel(16);
    let session = tokio::spawn(Arc::clone(&adapter).run(rx));

    let _ = events.send(HostEvent::Ready).await;
    wait(Duration::from_millis(50)).await;

    let _ = events
        .send(HostEvent::Message(Message::new("status", json!({ "verbose": true }))))
        .await;
    let _ = events
        .send(HostEvent::StateChange {
            id: "heating.0.target".into(),
            state: Some(State::new(23, false).from_origin("system.adapter.web.0")),
        })
        .await;
    wait(Duration::from_millis(50)).await;

    // Only changes to a different value reach the host
    adapter.change_state("valvePercent", 40, true, false).await;
    adapter.change_state("valvePercent", 55, true, false).await;

    println!("\nStored states:");
    for id in ["valvePercent", "target"] {
        println!("  {}: {:?}", id, host.state(id).map(|s| s.val));
    }

    let _ = events.send(HostEvent::Unload).await;
    let _ = session.await;

    println!("\n=== Adapter stopped: {} ===", adapter.is_stopping());
}
