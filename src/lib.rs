//! Single-producer multi-consumer broadcast[^broadcast] that evicts slow subscribers.
//!
//! [^broadcast]: Each subscriber gets every value published while it is
//! registered - as long as it keeps up.
//!
//! A [Channel] holds a set of registered [Sink]s - bounded queues owned by
//! subscribers. [Channel::publish] tries to place the value into each of them
//! without blocking. Whoever is full at that moment is removed and closed.
//! Publisher progress is preferred over subscriber completeness.
//!
//! # Last value
//!
//! The most recently published value is cached. [Channel::register] returns
//! it, so a late joiner knows the current state without waiting for the next
//! publish.
//!
//! # Deregistration
//!
//! [Channel::register] also returns a [Deregister] capability, which removes
//! and closes that one sink. It is idempotent and safe to call after eviction
//! or after the channel was closed.
//!
//! # Sinks
//!
//! Anything implementing [Sink] can be registered. With the `tokio` feature
//! (on by default) [tokio::sync::mpsc::Sender] is a sink, and
//! [Channel::subscribe] creates and registers one for you.
//!
//! Subscribers usually look like this:
//! ```
//! # use fanout::Channel;
//! # use tokio::sync::mpsc;
//! let channel: Channel<u32, mpsc::Sender<u32>> = Channel::new();
//! let mut subscription = channel.subscribe(16);
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || {
//!         // None - evicted, deregistered or channel closed.
//!         while let Some(_value) = subscription.receiver.blocking_recv() {
//!             // Do something
//!         }
//!     });
//!     channel.publish(1);
//!     channel.close();
//! });
//! ```
//!
//! # Logging
//!
//! Evictions and closes are reported through the [log] facade, at `debug`
//! level. Registrations are logged at `trace`.
//!
//! [tokio::sync::mpsc::Sender]: https://docs.rs/tokio/latest/tokio/sync/mpsc/struct.Sender.html

mod channel;
mod deregister;
mod error;
mod registry;
mod sink;

pub use channel::{Channel, PublishReport};
#[cfg(feature = "tokio")]
pub use channel::Subscription;
pub use deregister::Deregister;
pub use error::RegisterError;
pub use sink::{Sink, TrySendError};
