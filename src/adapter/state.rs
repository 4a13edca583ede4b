use std::sync::PoisonError;

use serde_json::{Map, Value};

use crate::adapter::Adapter;
use crate::core::error::{Error, Result};
use crate::core::value::{StateValue, loosely_equal};
use crate::host::types::{HostObject, StateCommon, StateSpec};

impl Adapter {
    /// Writes `value` to state `id` unless it already holds it.
    ///
    /// The write is skipped when the stored value (loosely compared) and ack
    /// flag already match and `always` is not set. A failed read or write is
    /// logged and the write is attempted once more in the background; the
    /// caller is not told about either outcome.
    pub async fn change_state(&self, id: &str, value: impl Into<StateValue>, ack: bool, always: bool) {
        let value = value.into();
        let current = match self.bindings.get_state(id).await {
            Ok(current) => current,
            Err(e) => return self.write_in_background(id, value, ack, e),
        };

        if let Some(state) = current {
            if !always && state.ack == ack && loosely_equal(&state.val, &value) {
                return;
            }
        }

        if let Err(e) = self.bindings.set_state(id, value.clone(), ack).await {
            self.write_in_background(id, value, ack, e);
        }
    }

    fn write_in_background(&self, id: &str, value: StateValue, ack: bool, err: Error) {
        self.log
            .warn(format!("Error in setState({id},{value},{ack}): {err}"));
        let bindings = self.bindings.clone();
        let id = id.to_string();
        let target = self.log.target().to_string();
        tokio::spawn(async move {
            if let Err(e) = bindings.set_state(&id, value, ack).await {
                log::debug!(target: &target, "retried setState({}) failed: {}", id, e);
            }
        });
    }

    /// Declares a state object on first use and writes its value.
    ///
    /// A bare id gets default read-only value metadata typed after `value`,
    /// with unit `%` when the id ends in `Percent`. A descriptor's fields are
    /// merged over those defaults. Ids already made in this session only get
    /// their value updated through [`change_state`](Adapter::change_state).
    ///
    /// Host errors while declaring the object are logged and swallowed.
    pub async fn make_state(
        &self,
        spec: impl Into<StateSpec>,
        value: impl Into<StateValue>,
        ack: bool,
    ) -> Result<()> {
        let spec = spec.into();
        let value = value.into();
        let id = spec.id().to_string();
        if id.trim().is_empty() {
            return Err(Error::InvalidArgument(
                self.log.warn("Invalid makeState id: empty id"),
            ));
        }

        if self.is_known_state(&id) {
            self.change_state(&id, value, ack, false).await;
            return Ok(());
        }

        let mut defaults = StateCommon::for_value(id.clone(), &value);
        let overrides = match spec {
            StateSpec::Id(_) => {
                if id.ends_with("Percent") {
                    defaults = defaults.with_unit("%");
                }
                Map::new()
            }
            StateSpec::Descriptor { common, .. } => common,
        };

        let mut common = defaults.into_map();
        for (key, val) in overrides {
            if key != "id" && key != "val" {
                common.insert(key, val);
            }
        }
        let writes_value = common.get("state").and_then(Value::as_str) == Some("state");

        let obj = HostObject::new(id.clone(), "state").with_common(common);
        match self.bindings.extend_object(&id, obj).await {
            Ok(stored) => {
                self.states.lock().unwrap_or_else(PoisonError::into_inner).insert(id.clone(), stored);
                if writes_value {
                    self.change_state(&id, value, ack, false).await;
                }
            }
            Err(e) => {
                self.log.debug(format!("MS {e} for {id}"));
            }
        }
        Ok(())
    }

    /// Deletes state `id` and its object; ids the host does not know are fine.
    pub async fn remove_state(&self, id: &str) -> Result<()> {
        self.bindings.del_state(id).await?;
        self.states.lock().unwrap_or_else(PoisonError::into_inner).remove(id);
        self.bindings.del_object(id).await
    }
}
