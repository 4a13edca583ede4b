use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::core::callback::{ErrorCallback, ResultCallback};
use crate::core::value::StateValue;
use crate::host::types::{HostObject, Message, ObjectList, ObjectListParams, ObjectRow, State};
use crate::host::{Host, HostError};

/// Simple in-memory host.
///
/// Callbacks are invoked synchronously. Every primitive call is recorded so
/// tests can assert on the traffic, and a failure can be armed per primitive
/// with [`fail_next`](MemoryHost::fail_next).
pub struct MemoryHost {
    name: String,
    instance: u32,
    config: StateValue,
    objects: Mutex<BTreeMap<String, HostObject>>,
    states: Mutex<HashMap<String, State>>,
    messages: Mutex<VecDeque<Message>>,
    subscriptions: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, String)>>,
    failures: Mutex<HashMap<String, String>>,
    terminated: Mutex<Option<i32>>,
}

impl MemoryHost {
    pub fn new(name: impl Into<String>, instance: u32) -> Self {
        Self {
            name: name.into(),
            instance,
            config: StateValue::Object(Default::default()),
            objects: Mutex::new(BTreeMap::new()),
            states: Mutex::new(HashMap::new()),
            messages: Mutex::new(VecDeque::new()),
            subscriptions: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            terminated: Mutex::new(None),
        }
    }

    pub fn with_config(mut self, config: StateValue) -> Self {
        self.config = config;
        self
    }

    pub fn namespace(&self) -> String {
        format!("{}.{}", self.name, self.instance)
    }

    /// Stores an object under its absolute id.
    pub fn insert_object(&self, obj: HostObject) {
        self.objects.lock().unwrap().insert(obj.id.clone(), obj);
    }

    pub fn object(&self, id: &str) -> Option<HostObject> {
        self.objects.lock().unwrap().get(&self.fix_id(id)).cloned()
    }

    /// Stores a state under its absolute id, as another adapter would.
    pub fn put_state(&self, id: &str, state: State) {
        self.states.lock().unwrap().insert(id.to_string(), state);
    }

    pub fn state(&self, id: &str) -> Option<State> {
        self.states.lock().unwrap().get(&self.fix_id(id)).cloned()
    }

    pub fn push_message(&self, msg: Message) {
        self.messages.lock().unwrap().push_back(msg);
    }

    pub fn pending_messages(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Makes the next call of primitive `op` (e.g. `"setState"`) fail.
    pub fn fail_next(&self, op: &str, msg: impl Into<String>) {
        self.failures.lock().unwrap().insert(op.to_string(), msg.into());
    }

    /// Every primitive call so far as `(op, id)`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| o == op).count()
    }

    pub fn terminated(&self) -> Option<i32> {
        *self.terminated.lock().unwrap()
    }

    fn fix_id(&self, id: &str) -> String {
        let ns = self.namespace();
        if id == ns || id.starts_with(&format!("{ns}.")) {
            id.to_string()
        } else {
            format!("{ns}.{id}")
        }
    }

    fn begin(&self, op: &str, id: &str) -> Option<HostError> {
        self.calls.lock().unwrap().push((op.to_string(), id.to_string()));
        self.failures.lock().unwrap().remove(op).map(HostError::Failed)
    }

    fn store_object(&self, op: &str, id: String, mut obj: HostObject, callback: ResultCallback<String, HostError>) {
        if let Some(err) = self.begin(op, &id) {
            return callback(Some(err), String::new());
        }
        obj.id = id.clone();
        self.objects.lock().unwrap().insert(id.clone(), obj);
        callback(None, id);
    }

    fn read_object(&self, op: &str, id: String, callback: ResultCallback<Option<HostObject>, HostError>) {
        if let Some(err) = self.begin(op, &id) {
            return callback(Some(err), None);
        }
        let obj = self.objects.lock().unwrap().get(&id).cloned();
        callback(None, obj);
    }

    fn read_state(&self, op: &str, id: String, callback: ResultCallback<Option<State>, HostError>) {
        if let Some(err) = self.begin(op, &id) {
            return callback(Some(err), None);
        }
        let state = self.states.lock().unwrap().get(&id).cloned();
        callback(None, state);
    }
}

fn matches_pattern(pattern: &str, id: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => id.starts_with(prefix),
        None => pattern == id,
    }
}

impl Host for MemoryHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn instance(&self) -> u32 {
        self.instance
    }

    fn config(&self) -> StateValue {
        self.config.clone()
    }

    fn get_object_list(&self, params: ObjectListParams, callback: ResultCallback<ObjectList, HostError>) {
        let key = params.startkey.clone().unwrap_or_default();
        if let Some(err) = self.begin("getObjectList", &key) {
            return callback(Some(err), ObjectList::default());
        }
        let rows = self
            .objects
            .lock()
            .unwrap()
            .values()
            .filter(|o| params.startkey.as_deref().is_none_or(|s| o.id.as_str() >= s))
            .filter(|o| params.endkey.as_deref().is_none_or(|e| o.id.as_str() <= e))
            .map(|o| ObjectRow {
                id: o.id.clone(),
                doc: params.include_docs.then(|| o.clone()),
            })
            .collect();
        callback(None, ObjectList { rows });
    }

    fn get_object(&self, id: &str, callback: ResultCallback<Option<HostObject>, HostError>) {
        self.read_object("getObject", self.fix_id(id), callback);
    }

    fn get_foreign_object(&self, id: &str, callback: ResultCallback<Option<HostObject>, HostError>) {
        self.read_object("getForeignObject", id.to_string(), callback);
    }

    fn get_foreign_objects(
        &self,
        pattern: &str,
        callback: ResultCallback<HashMap<String, HostObject>, HostError>,
    ) {
        if let Some(err) = self.begin("getForeignObjects", pattern) {
            return callback(Some(err), HashMap::new());
        }
        let found = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| matches_pattern(pattern, id))
            .map(|(id, obj)| (id.clone(), obj.clone()))
            .collect();
        callback(None, found);
    }

    fn set_object(&self, id: &str, obj: HostObject, callback: ResultCallback<String, HostError>) {
        self.store_object("setObject", self.fix_id(id), obj, callback);
    }

    fn set_foreign_object(&self, id: &str, obj: HostObject, callback: ResultCallback<String, HostError>) {
        self.store_object("setForeignObject", id.to_string(), obj, callback);
    }

    fn extend_object(&self, id: &str, obj: HostObject, callback: ResultCallback<HostObject, HostError>) {
        let id = self.fix_id(id);
        if let Some(err) = self.begin("extendObject", &id) {
            return callback(Some(err), HostObject::default());
        }
        let merged = {
            let mut objects = self.objects.lock().unwrap();
            let entry = objects.entry(id.clone()).or_insert_with(|| HostObject::new(id.clone(), ""));
            entry.extend(obj);
            entry.clone()
        };
        callback(None, merged);
    }

    fn create_state(&self, id: &str, common: Map<String, Value>, callback: ResultCallback<String, HostError>) {
        let id = self.fix_id(id);
        if let Some(err) = self.begin("createState", &id) {
            return callback(Some(err), String::new());
        }
        let default = common.get("def").cloned();
        self.objects
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_insert_with(|| HostObject::new(id.clone(), "state").with_common(common));
        if let Some(val) = default {
            let origin = format!("system.adapter.{}", self.namespace());
            self.states
                .lock()
                .unwrap()
                .entry(id.clone())
                .or_insert_with(|| State::new(val, true).from_origin(origin));
        }
        callback(None, id);
    }

    fn get_state(&self, id: &str, callback: ResultCallback<Option<State>, HostError>) {
        self.read_state("getState", self.fix_id(id), callback);
    }

    fn get_foreign_state(&self, id: &str, callback: ResultCallback<Option<State>, HostError>) {
        self.read_state("getForeignState", id.to_string(), callback);
    }

    fn set_state(&self, id: &str, value: StateValue, ack: bool, callback: ResultCallback<String, HostError>) {
        let id = self.fix_id(id);
        if let Some(err) = self.begin("setState", &id) {
            return callback(Some(err), String::new());
        }
        let state = State::new(value, ack).from_origin(format!("system.adapter.{}", self.namespace()));
        self.states.lock().unwrap().insert(id.clone(), state);
        callback(None, id);
    }

    fn del_state(&self, id: &str, callback: ErrorCallback<HostError>) {
        let id = self.fix_id(id);
        if let Some(err) = self.begin("delState", &id) {
            return callback(Some(err));
        }
        let removed = self.states.lock().unwrap().remove(&id);
        callback(removed.is_none().then_some(HostError::NotExists));
    }

    fn delete_state(&self, id: &str, callback: ErrorCallback<HostError>) {
        let id = self.fix_id(id);
        if let Some(err) = self.begin("deleteState", &id) {
            return callback(Some(err));
        }
        let state = self.states.lock().unwrap().remove(&id);
        let obj = self.objects.lock().unwrap().remove(&id);
        callback((state.is_none() && obj.is_none()).then_some(HostError::NotExists));
    }

    fn del_object(&self, id: &str, callback: ErrorCallback<HostError>) {
        let id = self.fix_id(id);
        if let Some(err) = self.begin("delObject", &id) {
            return callback(Some(err));
        }
        let removed = self.objects.lock().unwrap().remove(&id);
        callback(removed.is_none().then_some(HostError::NotExists));
    }

    fn subscribe_states(&self, pattern: &str) {
        self.subscriptions.lock().unwrap().push(pattern.to_string());
    }

    fn get_message(&self, callback: ResultCallback<Option<Message>, HostError>) {
        if let Some(err) = self.begin("getMessage", "") {
            return callback(Some(err), None);
        }
        let next = self.messages.lock().unwrap().pop_front();
        callback(None, next);
    }

    fn terminate(&self, code: i32) {
        *self.terminated.lock().unwrap() = Some(code);
    }
}
