//! In-process comment relay.
//!
//! Every connected client shares one broadcast channel. A client's accepted
//! comment goes out as `comment`; every *other* client sees it as
//! `remoteComment`. Ordering and delivery are whatever
//! [`tokio::sync::broadcast`] gives: a subscriber that falls more than
//! `capacity` events behind loses the oldest ones.
//!
//! Clients hold only weak references to the hub: once the [`Relay`] (and all
//! its clones) is dropped, receivers drain and end, and publishing fails with
//! [`ChannelError::Closed`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use spamwall_core::CommentEvent;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::event::{ChannelError, ChannelEvent};

/// Something that can carry an accepted comment to other clients.
#[async_trait]
pub trait CommentChannel: Send + Sync {
    async fn publish(&self, event: CommentEvent) -> Result<(), ChannelError>;
}

pub type ClientId = u64;

#[derive(Debug, Clone)]
struct Envelope {
    from: ClientId,
    event: CommentEvent,
}

/// Hub that clients connect to.
#[derive(Clone)]
pub struct Relay {
    tx: broadcast::Sender<Envelope>,
    next_id: Arc<AtomicU64>,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Relay {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Connect a new client. It only receives events published after this call.
    pub fn connect(&self) -> RelayClient {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let rx = self.tx.subscribe();
        info!(client = id, connected = self.tx.receiver_count(), "client connected to relay");
        RelayClient {
            publisher: RelayPublisher {
                id,
                tx: self.tx.downgrade(),
            },
            rx,
        }
    }

    /// Number of clients currently subscribed.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Sending half of a client. Cheap to clone and hand to a session.
#[derive(Clone)]
pub struct RelayPublisher {
    id: ClientId,
    tx: broadcast::WeakSender<Envelope>,
}

impl RelayPublisher {
    pub fn id(&self) -> ClientId {
        self.id
    }

    fn send(&self, event: CommentEvent) -> Result<(), ChannelError> {
        let tx = self.tx.upgrade().ok_or(ChannelError::Closed)?;
        let envelope = Envelope {
            from: self.id,
            event,
        };
        // Err only means nobody is listening; the event is simply not delivered.
        match tx.send(envelope) {
            Ok(receivers) => debug!(client = self.id, receivers, "published comment"),
            Err(_) => debug!(client = self.id, "published comment with no subscribers"),
        }
        Ok(())
    }

    /// Publish a JSON frame received from a front-end.
    ///
    /// Only `comment` frames are accepted; `remoteComment` is relay-to-client only.
    pub fn publish_frame(&self, frame: &str) -> Result<(), ChannelError> {
        match ChannelEvent::from_json(frame)? {
            ChannelEvent::Comment(event) => self.send(event),
            other => Err(ChannelError::UnexpectedEvent(other.name())),
        }
    }
}

#[async_trait]
impl CommentChannel for RelayPublisher {
    async fn publish(&self, event: CommentEvent) -> Result<(), ChannelError> {
        self.send(event)
    }
}

/// A connected client: publishes its own comments, receives everyone else's.
pub struct RelayClient {
    publisher: RelayPublisher,
    rx: broadcast::Receiver<Envelope>,
}

impl RelayClient {
    pub fn id(&self) -> ClientId {
        self.publisher.id
    }

    pub fn publisher(&self) -> RelayPublisher {
        self.publisher.clone()
    }

    /// Wait for the next comment from another client.
    ///
    /// Returns `None` once the relay has shut down and the queue is drained.
    pub async fn next_remote(&mut self) -> Option<CommentEvent> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.from == self.publisher.id => continue,
                Ok(envelope) => return Some(envelope.event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(client = self.publisher.id, skipped, "relay subscriber lagged; comments dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Like [`next_remote`](Self::next_remote), framed as a `remoteComment` JSON envelope.
    pub async fn next_remote_frame(&mut self) -> Option<Result<String, ChannelError>> {
        let event = self.next_remote().await?;
        Some(ChannelEvent::RemoteComment(event).to_json())
    }

    /// Non-blocking poll; `None` when nothing from another client is queued.
    pub fn try_next_remote(&mut self) -> Option<CommentEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(envelope) if envelope.from == self.publisher.id => continue,
                Ok(envelope) => return Some(envelope.event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(client = self.publisher.id, skipped, "relay subscriber lagged; comments dropped");
                }
                Err(_) => return None,
            }
        }
    }
}

#[async_trait]
impl CommentChannel for RelayClient {
    async fn publish(&self, event: CommentEvent) -> Result<(), ChannelError> {
        self.publisher.publish(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(user: &str, text: &str) -> CommentEvent {
        CommentEvent::new(user, "15/10/2026, 09:30:00", text)
    }

    #[tokio::test]
    async fn other_clients_receive_comment() {
        let relay = Relay::default();
        let alice = relay.connect();
        let mut bob = relay.connect();
        let mut carol = relay.connect();

        alice.publish(comment("alice", "hello all")).await.unwrap();

        assert_eq!(bob.next_remote().await.unwrap().comment, "hello all");
        assert_eq!(carol.next_remote().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn sender_does_not_receive_own_comment() {
        let relay = Relay::default();
        let mut alice = relay.connect();
        let bob = relay.connect();

        alice.publish(comment("alice", "mine")).await.unwrap();
        bob.publish(comment("bob", "theirs")).await.unwrap();

        let got = alice.next_remote().await.unwrap();
        assert_eq!(got.comment, "theirs");
        assert!(alice.try_next_remote().is_none());
    }

    #[tokio::test]
    async fn late_client_misses_earlier_comments() {
        let relay = Relay::default();
        let alice = relay.connect();
        alice.publish(comment("alice", "early")).await.unwrap();

        let mut bob = relay.connect();
        assert!(bob.try_next_remote().is_none());
    }

    #[tokio::test]
    async fn publish_without_listeners_is_ok() {
        let relay = Relay::default();
        let publisher = relay.connect().publisher();
        assert_eq!(relay.client_count(), 0);
        publisher.publish(comment("ghost", "anyone?")).await.unwrap();
    }

    #[tokio::test]
    async fn lagging_client_skips_to_newest() {
        let relay = Relay::new(2);
        let alice = relay.connect();
        let mut bob = relay.connect();

        for i in 0..5 {
            alice.publish(comment("alice", &i.to_string())).await.unwrap();
        }

        assert_eq!(bob.next_remote().await.unwrap().comment, "3");
        assert_eq!(bob.next_remote().await.unwrap().comment, "4");
    }

    #[tokio::test]
    async fn relay_shutdown_ends_clients() {
        let relay = Relay::default();
        let alice = relay.connect();
        let mut bob = relay.connect();

        alice.publish(comment("alice", "last words")).await.unwrap();
        drop(relay);

        assert_eq!(bob.next_remote().await.unwrap().comment, "last words");
        assert!(bob.next_remote().await.is_none());
        assert!(matches!(
            alice.publish(comment("alice", "anyone?")).await,
            Err(ChannelError::Closed)
        ));
    }

    #[tokio::test]
    async fn frames_round_through_relay() {
        let relay = Relay::default();
        let alice = relay.connect();
        let mut bob = relay.connect();

        alice
            .publisher()
            .publish_frame(r#"{"event":"comment","data":{"username":"alice","timestamp":"t","comment":"hey"}}"#)
            .unwrap();

        let frame = bob.next_remote_frame().await.unwrap().unwrap();
        let event = ChannelEvent::from_json(&frame).unwrap();
        assert_eq!(event, ChannelEvent::RemoteComment(CommentEvent::new("alice", "t", "hey")));
    }

    #[tokio::test]
    async fn clients_cannot_emit_remote_comment() {
        let relay = Relay::default();
        let alice = relay.connect();
        let err = alice
            .publisher()
            .publish_frame(r#"{"event":"remoteComment","data":{"username":"a","timestamp":"t","comment":"c"}}"#)
            .unwrap_err();
        assert!(matches!(err, ChannelError::UnexpectedEvent("remoteComment")));
    }
}
