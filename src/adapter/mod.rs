//! The adapter session.
//!
//! An [`Adapter`] owns everything that lives as long as one adapter instance:
//! the host bindings, the namespaced logger, the configuration, the object
//! indices, the optional state-change handler, the interval timer and the
//! stopping flag. It binds the four host lifecycle events (see [`Adapter::run`])
//! and exposes the state facade used by the embedding [`AdapterApp`].

pub mod app;
pub mod config;
mod message;
mod state;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::error::Result;
use crate::core::logging::Logger;
use crate::core::series::series;
use crate::core::value::inspect;
use crate::host::types::{HostObject, Message, ObjectListParams, State};
use crate::host::{Host, HostBindings, HostEvent};

pub use app::{AdapterApp, StateChangeHandler};
pub use config::AdapterConfig;

/// Pause between two deletions when `forceinit` clears the namespace.
pub const CLEANUP_DELAY: Duration = Duration::from_millis(2);

/// Grace period between `stop(true)` and process termination.
pub const EXIT_GRACE: Duration = Duration::from_millis(2000);

/// Exit code handed to [`Host::terminate`].
pub const EXIT_CODE: i32 = 55;

pub struct Adapter {
    host: Arc<dyn Host>,
    bindings: HostBindings,
    app: Arc<dyn AdapterApp>,
    namespace: String,
    log: Logger,
    config: RwLock<AdapterConfig>,
    /// States created by this session, keyed by the id they were made with.
    states: Mutex<HashMap<String, HostObject>>,
    /// Every object seen at start-up.
    objects: RwLock<HashMap<String, HostObject>>,
    state_change: RwLock<Option<StateChangeHandler>>,
    /// Held for a whole message drain so inbound messages never overlap.
    drain: tokio::sync::Mutex<()>,
    stopping: AtomicBool,
    exit_scheduled: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Adapter {
    /// Creates the session for `host` and binds the host primitives.
    pub fn new(host: Arc<dyn Host>, app: impl AdapterApp) -> Arc<Self> {
        let namespace = format!("{}.{}", host.name(), host.instance());
        let log = Logger::new(namespace.clone());
        let config = match AdapterConfig::from_value(host.config()) {
            Ok(config) => config,
            Err(e) => {
                log.warn(format!("Invalid adapter config, using defaults: {e}"));
                AdapterConfig::default()
            }
        };

        Arc::new(Adapter {
            bindings: HostBindings::new(Arc::clone(&host)),
            host,
            app: Arc::new(app),
            namespace,
            log,
            config: RwLock::new(config),
            states: Mutex::new(HashMap::new()),
            objects: RwLock::new(HashMap::new()),
            state_change: RwLock::new(None),
            drain: tokio::sync::Mutex::new(()),
            stopping: AtomicBool::new(false),
            exit_scheduled: AtomicBool::new(false),
            timer: Mutex::new(None),
        })
    }

    /// `<adapter-name>.<instance>`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The `from` value the host stamps on writes made by this adapter.
    pub fn origin(&self) -> String {
        format!("system.adapter.{}", self.namespace)
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn bindings(&self) -> &HostBindings {
        &self.bindings
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn set_debug(&self, enabled: bool) {
        self.log.set_debug(enabled);
    }

    pub fn is_debug(&self) -> bool {
        self.log.is_debug()
    }

    pub fn config(&self) -> AdapterConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// An object from the start-up index.
    pub fn object(&self, id: &str) -> Option<HostObject> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether `id` was created through [`make_state`](Adapter::make_state) in this session.
    pub fn is_known_state(&self, id: &str) -> bool {
        self.states.lock().unwrap_or_else(PoisonError::into_inner).contains_key(id)
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub fn state_change_handler(&self) -> Option<StateChangeHandler> {
        self.state_change.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_state_change_handler(&self, handler: Option<StateChangeHandler>) {
        *self.state_change.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    /// Installs a closure as state-change handler.
    pub fn on_state_change_with<F, Fut>(&self, handler: F)
    where
        F: Fn(String, State) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let wrapped: StateChangeHandler = Arc::new(move |id, state| handler(id, state).boxed());
        self.set_state_change_handler(Some(wrapped));
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Dispatches host lifecycle events until the channel closes or the host
    /// unloads the adapter.
    ///
    /// `Ready`, `Message` and `StateChange` are handled on their own tasks so a
    /// long-running `main` never blocks the event stream.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                HostEvent::Ready => {
                    let adapter = Arc::clone(&self);
                    tokio::spawn(async move { adapter.on_ready().await });
                }
                HostEvent::Unload => {
                    self.on_unload();
                    break;
                }
                HostEvent::Message(msg) => {
                    let adapter = Arc::clone(&self);
                    tokio::spawn(async move { adapter.on_message(msg).await });
                }
                HostEvent::StateChange { id, state } => {
                    let adapter = Arc::clone(&self);
                    tokio::spawn(async move { adapter.on_state_change(id, state).await });
                }
            }
        }
    }

    /// Initializes the session, then hands control to the application's `main`.
    pub async fn on_ready(&self) {
        self.init().await;
        self.app.main(self).await;
    }

    pub fn on_unload(&self) {
        self.stop(false);
    }

    pub async fn on_message(&self, msg: Message) {
        self.log.info(format!("received Message {}", inspect(&msg)));
        self.process_message(msg).await;
    }

    /// Forwards an external state change to the installed handler.
    ///
    /// Deleted states (`None`) and writes made by this adapter are dropped.
    pub async fn on_state_change(&self, id: String, state: Option<State>) {
        let Some(state) = state else {
            return;
        };
        if state.from == self.origin() {
            return;
        }
        let Some(handler) = self.state_change_handler() else {
            return;
        };
        self.log
            .debug(format!("stateChange called for {} = {}", id, inspect(&state)));
        handler(id, state).await;
    }

    /// Start-up sequence. Failures are logged and never stop the adapter.
    pub async fn init(&self) {
        self.log.debug(format!("Adapter {} starting.", self.namespace));

        if self.config().forceinit {
            if let Err(e) = self.clear_namespace().await {
                self.log.error(format!("err from series: {e}"));
            }
        }

        let count = match self.load_objects().await {
            Ok(count) => count,
            Err(e) => {
                self.log.error(format!("err from getObjectList: {e}"));
                0
            }
        };
        self.log.debug(format!(
            "{} received {} objects with config {:?}",
            self.host.name(),
            count,
            self.config().keys()
        ));

        self.bindings.subscribe_states("*");
    }

    /// Removes every state and object in this adapter's namespace, one at a time.
    async fn clear_namespace(&self) -> Result<usize> {
        let prefix = format!("{}.", self.namespace);
        let list = self
            .bindings
            .get_object_list(ObjectListParams::range(prefix.clone(), format!("{prefix}\u{9999}")))
            .await?;

        let removed = series(
            list.rows,
            move |row| async move {
                self.log.debug(format!("deleteState: {}", row.id));
                self.remove_state(&row.id).await
            },
            CLEANUP_DELAY,
        )
        .await?;
        Ok(removed.len())
    }

    /// Indexes every object of the host and picks up the shared system settings.
    async fn load_objects(&self) -> Result<usize> {
        let list = self
            .bindings
            .get_object_list(ObjectListParams::all_with_docs())
            .await?;
        let count = list.rows.len();
        let objects: HashMap<String, HostObject> = list
            .rows
            .into_iter()
            .filter_map(|row| row.doc)
            .map(|doc| (doc.id.clone(), doc))
            .collect();

        if let Some(system) = objects.get("system.config") {
            let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(lang) = system.common_str("language") {
                config.lang = Some(lang.to_string());
            }
            if let Some(latitude) = system.common_f64("latitude") {
                config.latitude = Some(latitude);
                config.longitude = system.common_f64("longitude");
            }
        }

        *self.objects.write().unwrap_or_else(PoisonError::into_inner) = objects;
        Ok(count)
    }

    // ========================================================================
    // Timer & shutdown
    // ========================================================================

    /// Runs `tick` every `period`, replacing any timer started before.
    ///
    /// The first tick fires after one full period. The timer is owned by the
    /// session and aborted by [`stop`](Adapter::stop).
    pub fn start_timer<F, Fut>(&self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_stopping() {
            self.log.warn("Adapter is stopping, timer not started");
            return;
        }
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        if let Some(previous) = self.timer.lock().unwrap_or_else(PoisonError::into_inner).replace(handle) {
            previous.abort();
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Stops the session: aborts the timer and, with `exit`, terminates the
    /// process after [`EXIT_GRACE`]. In-flight operations are not cancelled.
    ///
    /// Must be called from within a tokio runtime when `exit` is set.
    pub fn stop(&self, exit: bool) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Some(timer) = self.timer.lock().unwrap_or_else(PoisonError::into_inner).take() {
            timer.abort();
        }
        self.log
            .warn(format!("Adapter disconnected and stopped with ({exit})"));

        if exit && !self.exit_scheduled.swap(true, Ordering::SeqCst) {
            self.log.error("Adapter will exit in latest 2 sec!");
            let host = Arc::clone(&self.host);
            tokio::spawn(async move {
                tokio::time::sleep(EXIT_GRACE).await;
                host.terminate(EXIT_CODE);
            });
        }
    }
}
