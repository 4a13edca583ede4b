use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::callback::{CallbackError, from_error_callback, from_result_callback};
use crate::core::error::Result;
use crate::core::value::StateValue;
use crate::host::types::{HostObject, Message, ObjectList, ObjectListParams, State};
use crate::host::{Host, HostError};

/// Future-returning wrappers over the callback-style [`Host`] primitives.
///
/// Delete-style calls treat [`HostError::NotExists`] as success.
#[derive(Clone)]
pub struct HostBindings {
    host: Arc<dyn Host>,
}

impl HostBindings {
    pub fn new(host: Arc<dyn Host>) -> Self {
        HostBindings { host }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub async fn get_object_list(&self, params: ObjectListParams) -> Result<ObjectList> {
        Ok(from_result_callback(|cb| self.host.get_object_list(params, cb)).await?)
    }

    pub async fn get_object(&self, id: &str) -> Result<Option<HostObject>> {
        Ok(from_result_callback(|cb| self.host.get_object(id, cb)).await?)
    }

    pub async fn get_foreign_object(&self, id: &str) -> Result<Option<HostObject>> {
        Ok(from_result_callback(|cb| self.host.get_foreign_object(id, cb)).await?)
    }

    pub async fn get_foreign_objects(&self, pattern: &str) -> Result<HashMap<String, HostObject>> {
        Ok(from_result_callback(|cb| self.host.get_foreign_objects(pattern, cb)).await?)
    }

    pub async fn set_object(&self, id: &str, obj: HostObject) -> Result<String> {
        Ok(from_result_callback(|cb| self.host.set_object(id, obj, cb)).await?)
    }

    pub async fn set_foreign_object(&self, id: &str, obj: HostObject) -> Result<String> {
        Ok(from_result_callback(|cb| self.host.set_foreign_object(id, obj, cb)).await?)
    }

    pub async fn extend_object(&self, id: &str, obj: HostObject) -> Result<HostObject> {
        Ok(from_result_callback(|cb| self.host.extend_object(id, obj, cb)).await?)
    }

    pub async fn create_state(&self, id: &str, common: Map<String, Value>) -> Result<String> {
        Ok(from_result_callback(|cb| self.host.create_state(id, common, cb)).await?)
    }

    pub async fn get_state(&self, id: &str) -> Result<Option<State>> {
        Ok(from_result_callback(|cb| self.host.get_state(id, cb)).await?)
    }

    pub async fn get_foreign_state(&self, id: &str) -> Result<Option<State>> {
        Ok(from_result_callback(|cb| self.host.get_foreign_state(id, cb)).await?)
    }

    pub async fn set_state(&self, id: &str, value: StateValue, ack: bool) -> Result<String> {
        Ok(from_result_callback(|cb| self.host.set_state(id, value, ack, cb)).await?)
    }

    pub async fn del_state(&self, id: &str) -> Result<()> {
        tolerate_missing(from_error_callback(|cb| self.host.del_state(id, cb)).await)
    }

    pub async fn delete_state(&self, id: &str) -> Result<()> {
        tolerate_missing(from_error_callback(|cb| self.host.delete_state(id, cb)).await)
    }

    pub async fn del_object(&self, id: &str) -> Result<()> {
        tolerate_missing(from_error_callback(|cb| self.host.del_object(id, cb)).await)
    }

    pub async fn get_message(&self) -> Result<Option<Message>> {
        Ok(from_result_callback(|cb| self.host.get_message(cb)).await?)
    }

    pub fn subscribe_states(&self, pattern: &str) {
        self.host.subscribe_states(pattern);
    }
}

fn tolerate_missing(res: std::result::Result<(), CallbackError<HostError>>) -> Result<()> {
    match res {
        Err(CallbackError::Failed(HostError::NotExists)) => Ok(()),
        other => Ok(other?),
    }
}
