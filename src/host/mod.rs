//! The adapter host: the runtime that owns the object and state stores, the
//! message bus and the lifecycle events.
//!
//! The host is an external collaborator. Its primitives follow the callback
//! conventions adapted in [`crate::core::callback`]; [`HostBindings`] wraps
//! them into futures. [`MemoryHost`] is an in-process implementation used for
//! tests and demos.

pub mod bindings;
pub mod memory;
pub mod types;

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::callback::{ErrorCallback, ResultCallback};
use crate::core::value::StateValue;
use types::{HostObject, Message, ObjectList, ObjectListParams, State};

pub use bindings::HostBindings;
pub use memory::MemoryHost;

/// Failure reported by a host primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Sentinel returned by delete primitives for an unknown id.
    #[error("Not exists")]
    NotExists,

    #[error("{0}")]
    Failed(String),
}

/// Lifecycle events the host delivers to an adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Ready,
    Unload,
    Message(Message),
    StateChange { id: String, state: Option<State> },
}

/// Host primitives, in callback style.
///
/// Every callback must be invoked at most once. Ids passed to the
/// non-`foreign` primitives are relative to the adapter namespace unless they
/// already start with it.
pub trait Host: Send + Sync + 'static {
    /// Adapter name, e.g. `"hue"`.
    fn name(&self) -> &str;

    /// Instance number of this adapter.
    fn instance(&self) -> u32;

    /// The adapter's configuration bag.
    fn config(&self) -> StateValue;

    fn get_object_list(&self, params: ObjectListParams, callback: ResultCallback<ObjectList, HostError>);

    fn get_object(&self, id: &str, callback: ResultCallback<Option<HostObject>, HostError>);

    fn get_foreign_object(&self, id: &str, callback: ResultCallback<Option<HostObject>, HostError>);

    fn get_foreign_objects(
        &self,
        pattern: &str,
        callback: ResultCallback<HashMap<String, HostObject>, HostError>,
    );

    /// Replaces the object, reporting the stored id.
    fn set_object(&self, id: &str, obj: HostObject, callback: ResultCallback<String, HostError>);

    fn set_foreign_object(&self, id: &str, obj: HostObject, callback: ResultCallback<String, HostError>);

    /// Creates the object or merges `obj` into the existing one, reporting the result.
    fn extend_object(&self, id: &str, obj: HostObject, callback: ResultCallback<HostObject, HostError>);

    /// Declares a state object with `common` unless it already exists,
    /// reporting the stored id. A `def` entry in `common` becomes the initial
    /// acknowledged value of a state that has none yet.
    fn create_state(&self, id: &str, common: Map<String, Value>, callback: ResultCallback<String, HostError>);

    fn get_state(&self, id: &str, callback: ResultCallback<Option<State>, HostError>);

    fn get_foreign_state(&self, id: &str, callback: ResultCallback<Option<State>, HostError>);

    /// Writes a state value, reporting the stored id.
    fn set_state(&self, id: &str, value: StateValue, ack: bool, callback: ResultCallback<String, HostError>);

    fn del_state(&self, id: &str, callback: ErrorCallback<HostError>);

    /// Deletes the state and its object.
    fn delete_state(&self, id: &str, callback: ErrorCallback<HostError>);

    fn del_object(&self, id: &str, callback: ErrorCallback<HostError>);

    fn subscribe_states(&self, pattern: &str);

    /// Polls the next pending message, `None` when the queue is empty.
    fn get_message(&self, callback: ResultCallback<Option<Message>, HostError>);

    /// Ends the adapter process.
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}
