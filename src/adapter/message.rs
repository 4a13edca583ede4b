use crate::adapter::Adapter;
use crate::core::value::inspect;
use crate::host::types::Message;

impl Adapter {
    /// Drains the host's message queue, starting with `msg`.
    ///
    /// Messages carrying a command go to [`AdapterApp::message`](crate::AdapterApp::message)
    /// one at a time; the handler's result is not reported anywhere. After each
    /// message the host is polled for the next pending one until it reports an
    /// empty queue or the poll fails.
    ///
    /// Concurrent calls wait for the running drain to finish, so the handler
    /// never sees two messages at once.
    pub async fn process_message(&self, msg: Message) {
        let _drain = self.drain.lock().await;
        let mut next = Some(msg);
        while let Some(msg) = next.take() {
            if msg.command.is_some() {
                if let Err(e) = self.app.message(self, msg).await {
                    self.log.debug(format!("message handler failed: {e}"));
                }
            } else {
                self.log.warn(format!("invalid Message {}", inspect(&msg)));
            }

            match self.bindings.get_message().await {
                Ok(pending) => next = pending,
                Err(e) => {
                    self.log.warn(format!("getMessage failed, queue left as is: {e}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterApp;
    use crate::core::error::{Error, Result};
    use crate::core::value::StateValue;
    use crate::host::MemoryHost;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    struct RecordingApp(Arc<Recorder>);

    #[async_trait]
    impl AdapterApp for RecordingApp {
        async fn message(&self, _adapter: &Adapter, msg: Message) -> Result<StateValue> {
            let command = msg.command.unwrap_or_default();
            self.0.seen.lock().unwrap().push(command.clone());
            if command == "fail" {
                return Err(Error::Handler("refused".to_string()));
            }
            Ok(json!({"ok": true}))
        }
    }

    fn adapter() -> (Arc<MemoryHost>, Arc<Adapter>, Arc<Recorder>) {
        let host = Arc::new(MemoryHost::new("msg", 0));
        let recorder = Arc::new(Recorder::default());
        let adapter = Adapter::new(host.clone(), RecordingApp(Arc::clone(&recorder)));
        (host, adapter, recorder)
    }

    #[tokio::test]
    async fn test_drains_pending_messages_in_order() {
        let (host, adapter, recorder) = adapter();
        host.push_message(Message::new("second", json!(2)));
        host.push_message(Message::new("third", json!(3)));

        adapter.process_message(Message::new("first", json!(1))).await;

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(host.pending_messages(), 0);
        assert_eq!(host.count_calls("getMessage"), 3);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_stop_drain() {
        let (host, adapter, recorder) = adapter();
        host.push_message(Message::new("after", json!(null)));

        adapter.process_message(Message::new("fail", json!(null))).await;

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["fail", "after"]);
    }

    #[tokio::test]
    async fn test_message_without_command_is_skipped() {
        let (host, adapter, recorder) = adapter();
        host.push_message(Message::new("real", json!(1)));

        adapter.process_message(Message::default()).await;

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["real"]);
    }

    #[tokio::test]
    async fn test_poll_failure_ends_drain() {
        let (host, adapter, recorder) = adapter();
        host.push_message(Message::new("never", json!(1)));
        host.fail_next("getMessage", "bus down");

        adapter.process_message(Message::new("only", json!(1))).await;

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["only"]);
        assert_eq!(host.pending_messages(), 1);
    }
}
