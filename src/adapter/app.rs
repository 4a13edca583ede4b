use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::adapter::Adapter;
use crate::core::error::Result;
use crate::core::value::{StateValue, inspect};
use crate::host::types::{Message, State};

/// Handler for state changes that did not originate from this adapter.
pub type StateChangeHandler = Arc<dyn Fn(String, State) -> BoxFuture<'static, ()> + Send + Sync>;

/// The embedding application.
///
/// Both methods have defaults that only log, so an application implements
/// whatever it needs.
#[async_trait]
pub trait AdapterApp: Send + Sync + 'static {
    /// Called once, after the adapter finished initializing.
    async fn main(&self, adapter: &Adapter) {
        adapter.log().warn("No 'main() defined!");
    }

    /// Called for every inbound message, one at a time.
    async fn message(&self, adapter: &Adapter, msg: Message) -> Result<StateValue> {
        adapter
            .log()
            .warn(format!("Message {} received and not handled!", inspect(&msg)));
        Ok(StateValue::Null)
    }
}
