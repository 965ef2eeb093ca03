//! Broadcast event bus for distributing `ChatEvent` to renderers.
//!
//! Built on `tokio::sync::broadcast`, the bus supports multiple concurrent
//! subscribers. Publishing with no active subscribers is a no-op.

use leadchat_types::chat::ChatEvent;
use tokio::sync::broadcast;

/// Default channel capacity; a full conversation emits a few dozen events.
pub const DEFAULT_CAPACITY: usize = 256;

/// Multi-consumer event bus for one conversation.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct ChatEventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl ChatEventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: ChatEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for ChatEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Clone for ChatEventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for ChatEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadchat_types::chat::ChatStep;

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = ChatEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ChatEvent::StepChanged {
            step: ChatStep::Name,
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(
            received,
            ChatEvent::StepChanged {
                step: ChatStep::Name
            }
        );
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = ChatEventBus::new(4);
        bus.publish(ChatEvent::Typing { active: true });
    }

    #[tokio::test]
    async fn cloned_bus_shares_channel() {
        let bus = ChatEventBus::new(16);
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.publish(ChatEvent::Submitting { active: true });
        assert_eq!(
            rx.recv().await.unwrap(),
            ChatEvent::Submitting { active: true }
        );
    }
}
