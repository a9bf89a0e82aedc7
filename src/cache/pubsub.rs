//! Pub/Sub Operations
//!
//! Publishing typed messages and registering typed channel handlers.

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::keys::ensure_key;
use crate::cache::CacheClient;
use crate::error::Result;
use crate::serializer::Serializer;
use crate::tasks::{spawn_subscription_task, Subscription};

impl<S: Serializer> CacheClient<S> {
    // == Publish ==
    /// Publishes a message; returns the number of subscribers that received it.
    ///
    /// Channels are not namespaced.
    pub async fn publish<T: Serialize + ?Sized>(
        &self,
        channel: &str,
        message: &T,
    ) -> Result<i64> {
        ensure_key(channel, "channel")?;
        let bytes = self.serializer.serialize(message)?;

        let mut conn = self.connection().await?;
        let receivers: i64 = conn.publish(channel, bytes).await?;

        debug!("Published to '{}', {} receivers", channel, receivers);
        Ok(receivers)
    }

    // == Subscribe ==
    /// Registers `handler` for every message published on `channel`.
    ///
    /// The SUBSCRIBE round trip completes before this returns, so messages
    /// published afterwards are delivered. Delivery is asynchronous: the
    /// handler runs on a tokio worker thread, never on the caller's task.
    pub async fn subscribe<T, F>(&self, channel: &str, handler: F) -> Result<Subscription>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) + Send + 'static,
    {
        ensure_key(channel, "channel")?;
        // Fail fast on a disposed client
        self.connection().await?;

        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        let handle = spawn_subscription_task(
            pubsub,
            channel.to_string(),
            self.serializer.clone(),
            handler,
        );
        let mut subscriptions = self.subscriptions.lock().await;
        // Listeners stopped by `Subscription::unsubscribe` are dropped here
        subscriptions.retain(|h| !h.is_finished());
        subscriptions.push(handle.abort_handle());

        Ok(Subscription::new(channel, handle))
    }

    /// Returns how many listener tasks opened by this client are still running.
    pub async fn subscription_count(&self) -> usize {
        let mut subscriptions = self.subscriptions.lock().await;
        subscriptions.retain(|h| !h.is_finished());
        subscriptions.len()
    }

    // == Unsubscribe All ==
    /// Cancels every subscription opened by this client.
    ///
    /// Returns how many listener tasks were still running.
    pub async fn unsubscribe_all(&self) -> usize {
        let mut subscriptions = self.subscriptions.lock().await;
        let mut cancelled = 0;
        for handle in subscriptions.drain(..) {
            if !handle.is_finished() {
                cancelled += 1;
            }
            handle.abort();
        }

        debug!("Cancelled {} subscriptions", cancelled);
        cancelled
    }
}
