//! Background Tasks Module
//!
//! Contains the background tasks a cache client starts on the tokio runtime.
//!
//! # Tasks
//! - Subscription listener: relays pub/sub messages on one channel to a handler

mod subscriber;

pub use subscriber::{spawn_subscription_task, Subscription};
