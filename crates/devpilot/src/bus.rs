use tokio::sync::broadcast;

use crate::event::CoreEvent;

/// Fire-and-forget presentation sink. Events are delivered in publish order to every
/// subscriber; publishing with no subscriber is not an error.
#[derive(Clone)]
pub struct Bus {
    sender: broadcast::Sender<CoreEvent>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: CoreEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("bus event dropped: no subscribers");
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpilot_llm::Message;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn publish_and_receive_event() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(CoreEvent::add_message(Message::assistant("hello")));

        let received = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout")
            .expect("recv");
        assert!(
            matches!(received, CoreEvent::AddMessage(ref p) if p.message.text() == Some("hello"))
        );
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_event() {
        let bus = Bus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(CoreEvent::ClearChat);

        assert!(matches!(rx1.recv().await.expect("recv1"), CoreEvent::ClearChat));
        assert!(matches!(rx2.recv().await.expect("recv2"), CoreEvent::ClearChat));
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = Bus::new(8);
        bus.publish(CoreEvent::ClearChat);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(CoreEvent::tool_output("git_status", serde_json::json!("M a")))
            .unwrap();
        assert_eq!(value["type"], "toolOutput");
        assert_eq!(value["payload"]["tool_name"], "git_status");
    }
}
