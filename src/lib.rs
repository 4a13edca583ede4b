//! # hostkit
//!
//! Async helpers for writing home-automation adapters against a callback-style
//! adapter host.
//!
//! ## Features
//!
//! - **Callback Adapters**: Turn the host's completion callbacks into futures
//! - **Sequencing**: Run batches strictly one after another, optionally throttled
//! - **Retry & Repeat**: Immediate retry loops and poll-until-condition loops
//! - **HTTP & Shell**: `GET` with a retry budget (feature `http`) and shell commands
//! - **State Facade**: Create, update and delete states without redundant writes
//! - **Adapter Session**: Lifecycle events, message draining and shutdown in one place
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hostkit::prelude::*;
//! use std::sync::Arc;
//!
//! struct Thermostat;
//!
//! #[async_trait::async_trait]
//! impl AdapterApp for Thermostat {
//!     async fn main(&self, adapter: &Adapter) {
//!         let _ = adapter.make_state("temperature", 21.5, true).await;
//!     }
//! }
//!
//! # async fn demo() {
//! let host = Arc::new(MemoryHost::new("thermostat", 0));
//! let adapter = Adapter::new(host, Thermostat);
//! adapter.on_ready().await;
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`host`]: The host trait, its data types, bindings and an in-memory host
//! - [`adapter`]: The adapter session and the application trait
//! - [`http`]: HTTP `GET` helper (feature `http`)
//! - [`exec`]: Shell command helper
//! - [`prelude`]: Commonly used types and functions (import with `use hostkit::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

pub mod adapter;
pub mod exec;
pub mod host;

#[cfg(feature = "http")]
pub mod http;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Generic helpers
pub use crate::core::callback::{
    CallbackError, Dropped, ErrorCallback, ResultCallback, ValueCallback, from_error_callback,
    from_result_callback, from_value_callback,
};
pub use crate::core::error::{Error, Result};
pub use crate::core::logging::Logger;
pub use crate::core::retry::{repeat, retry};
pub use crate::core::series::series;
pub use crate::core::value::{StateValue, ValueKind, inspect, loosely_equal};
pub use crate::core::{next_tick, wait};

// Host
pub use host::types::{
    HostObject, Message, ObjectList, ObjectListParams, ObjectRow, State, StateCommon, StateSpec,
};
pub use host::{Host, HostBindings, HostError, HostEvent, MemoryHost};

// Adapter session
pub use adapter::{
    Adapter, AdapterApp, AdapterConfig, CLEANUP_DELAY, EXIT_CODE, EXIT_GRACE, StateChangeHandler,
};

pub use exec::exec;

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: imports everything an adapter usually needs.
///
/// # Example
/// ```rust
/// use hostkit::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Session
        Adapter,
        AdapterApp,
        AdapterConfig,
        // Errors
        Error,
        // Host
        Host,
        HostEvent,
        HostObject,
        MemoryHost,
        Message,
        State,
        StateSpec,
        StateValue,
        // Helpers
        exec,
        repeat,
        retry,
        series,
        wait,
    };

    #[cfg(feature = "http")]
    pub use super::http::get;
}

// ============================================================================
// Re-export commonly used external types for convenience
// ============================================================================

pub use serde_json::Value as JsonValue;

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
