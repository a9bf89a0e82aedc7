//! Subscription Listener Task
//!
//! Background task that decodes messages from one pub/sub channel and hands
//! them to a user callback.

use std::sync::Arc;

use futures_util::StreamExt;
use redis::aio::PubSub;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::serializer::Serializer;

/// Spawns a task relaying messages from an already-subscribed connection.
///
/// The task owns the pub/sub connection and runs until it is aborted or the
/// connection closes. Each payload is decoded with `serializer` and passed to
/// `handler` on the runtime worker that polls the task; payloads that fail to
/// decode are logged and skipped.
///
/// # Arguments
/// * `pubsub` - Connection on which SUBSCRIBE has already completed
/// * `channel` - Channel name, used for logging
/// * `serializer` - Codec shared with the owning client
/// * `handler` - Callback invoked once per decoded message
pub fn spawn_subscription_task<S, T, F>(
    pubsub: PubSub,
    channel: String,
    serializer: Arc<S>,
    handler: F,
) -> JoinHandle<()>
where
    S: Serializer,
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) + Send + 'static,
{
    tokio::spawn(async move {
        info!("Listening for messages on channel '{}'", channel);

        let messages = pubsub.into_on_message();
        tokio::pin!(messages);

        while let Some(msg) = messages.next().await {
            let payload: Vec<u8> = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Dropping unreadable message on '{}': {}", channel, e);
                    continue;
                }
            };

            match serializer.deserialize::<T>(&payload) {
                Ok(value) => handler(value),
                Err(e) => warn!("Dropping message on '{}': {}", channel, e),
            }
        }

        debug!("Subscription to '{}' closed", channel);
    })
}

// == Subscription ==
/// Handle on a live channel subscription.
///
/// Dropping the handle leaves the subscription running; call
/// [`unsubscribe`](Subscription::unsubscribe) to stop it.
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(channel: impl Into<String>, handle: JoinHandle<()>) -> Self {
        Self {
            channel: channel.into(),
            handle,
        }
    }

    /// Returns the subscribed channel.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns true while the listener task is running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the listener and closes its connection.
    pub fn unsubscribe(self) {
        debug!("Unsubscribing from '{}'", self.channel);
        self.handle.abort();
    }
}
