use std::fmt;
use std::sync::Arc;

use branch_hints::unlikely;
use log::{debug, trace};

use crate::deregister::Deregister;
use crate::error::RegisterError;
use crate::registry::Registry;
use crate::sink::{Sink, TrySendError};

pub(crate) struct State<T, S> {
    pub(crate) subscribers: Registry<S>,
    pub(crate) last: Option<T>,
    pub(crate) closed: bool,
}

/// Outcome of a single [Channel::publish].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Sinks that accepted the value.
    pub delivered: usize,
    /// Delinquent sinks, removed and closed by this publish.
    pub evicted: usize,
}

/// Broadcast channel that closes subscribers which can't keep up.
///
/// Every [publish()] tries to place the value into each registered [Sink]
/// without blocking. A sink that is full (or whose receiver is gone) at that
/// moment is removed and closed on the spot - the close itself is the
/// backpressure signal. The publisher never waits for a subscriber.
///
/// The last published value is kept and handed to each new registration,
/// so late joiners immediately learn the current state.
///
/// All operations are serialized by one lock. Cloning a `Channel` is cheap
/// and yields a handle to the same channel.
///
/// ```
/// # use fanout::Channel;
/// # use tokio::sync::mpsc;
/// let channel: Channel<i32, mpsc::Sender<i32>> = Channel::new();
/// channel.publish(42);
///
/// let (tx, mut rx) = mpsc::channel(1);
/// let (last, _deregister) = channel.register(tx);
/// assert_eq!(last, Some(42));
///
/// channel.publish(7);
/// assert_eq!(rx.try_recv(), Ok(7));
///
/// // rx is not drained - 8 fits, 9 does not.
/// channel.publish(8);
/// channel.publish(9);
/// assert_eq!(rx.try_recv(), Ok(8));
/// assert!(rx.try_recv().is_err());
/// assert_eq!(channel.last(), Some(9));
/// ```
///
/// # Closing
///
/// [close()] releases every registered sink and makes the channel inert.
/// Registering on a closed channel adds nothing: the sink is closed right away,
/// and the last value comes back with a no-op [Deregister]. Subscribers that
/// re-register whenever their receiver closes will therefore spin against a
/// closed channel - whoever retires the channel should redirect them.
///
/// Dropping the last `Channel` handle closes the sinks that are still
/// registered, same as [close()] would.
///
/// [publish()]: Channel::publish
/// [close()]: Channel::close
pub struct Channel<T, S> {
    state: Arc<spin::Mutex<State<T, S>>>,
}

impl<T, S> Default for Channel<T, S> {
    #[inline]
    fn default() -> Self {
        Self {
            state: Arc::new(spin::Mutex::new(State {
                subscribers: Default::default(),
                last: None,
                closed: false,
            })),
        }
    }
}

impl<T, S> Clone for Channel<T, S> {
    #[inline]
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<T, S> Channel<T, S> {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of currently registered sinks.
    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.lock().subscribers.is_empty()
    }
}

impl<T: Clone, S> Channel<T, S> {
    /// Last published value, `None` if nothing was published yet.
    #[inline]
    pub fn last(&self) -> Option<T> {
        self.state.lock().last.clone()
    }
}

impl<T: Clone, S: Sink<T>> Channel<T, S> {
    /// Register `sink` and get the last published value.
    ///
    /// # Panics
    ///
    /// If the same sink (see [Sink::same_sink]) is already registered.
    /// Use [try_register()] to get it back instead.
    ///
    /// [try_register()]: Channel::try_register
    #[track_caller]
    pub fn register(&self, sink: S) -> (Option<T>, Deregister<T, S>) {
        match self.try_register(sink) {
            Ok(registration) => registration,
            Err(err) => panic!("{err}"),
        }
    }

    /// Same as [register()], but a duplicate registration hands the sink back
    /// as [RegisterError::AlreadyRegistered] instead of panicking.
    ///
    /// On a closed channel the sink is closed immediately, the thread yields,
    /// and the returned [Deregister] does nothing.
    ///
    /// [register()]: Channel::register
    pub fn try_register(&self, sink: S) -> Result<(Option<T>, Deregister<T, S>), RegisterError<S>> {
        let mut state = self.state.lock();

        if state.closed {
            let last = state.last.clone();
            drop(state);

            sink.close();
            // Let a re-subscribe loop make room for others.
            std::thread::yield_now();
            return Ok((last, Deregister::noop()));
        }

        if state.subscribers.any(|registered| registered.same_sink(&sink)) {
            return Err(RegisterError::AlreadyRegistered(sink));
        }

        let key = state.subscribers.insert(sink, <S as Sink<T>>::close);
        trace!("registered sink {key:?}");

        let deregister = Deregister::new(Arc::downgrade(&self.state), key);
        Ok((state.last.clone(), deregister))
    }

    /// Non-blocking fan-out of `value` to every registered sink.
    ///
    /// Sinks that can't take the value right now are evicted and closed.
    /// `value` becomes the [last()] value regardless of how many sinks
    /// received it - even on a closed channel.
    ///
    /// [last()]: Channel::last
    pub fn publish(&self, value: T) -> PublishReport {
        let mut report = PublishReport::default();

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let subscribers = &mut state.subscribers;
        let mut index = 0;
        while let Some(sink) = subscribers.get(index) {
            let result = sink.try_send(value.clone());
            if unlikely(result.is_err()) {
                let key = subscribers.key_at(index);
                // Slot gets the last entry - don't advance.
                subscribers.swap_remove(index).close();
                report.evicted += 1;

                let reason = match result {
                    Err(TrySendError::Full(_)) => "queue full",
                    _ => "receiver closed",
                };
                debug!("evicted delinquent sink {key:?}: {reason}");
                continue;
            }
            report.delivered += 1;
            index += 1;
        }

        state.last = Some(value);
        report
    }

    /// Close the channel and every registered sink.
    ///
    /// Returns `false` if the channel was already closed, in which case
    /// nothing happens.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;

        let mut released = 0;
        for sink in state.subscribers.drain() {
            sink.close();
            released += 1;
        }
        debug!("channel closed, released {released} sinks");
        true
    }
}

impl<T, S> fmt::Debug for Channel<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("subscribers", &state.subscribers.len())
            .field("has_last", &state.last.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(feature = "tokio")]
pub use with_tokio::Subscription;

#[cfg(feature = "tokio")]
mod with_tokio {
    use tokio::sync::mpsc;
    use crate::channel::Channel;
    use crate::deregister::Deregister;

    /// Everything [Channel::subscribe] hands out.
    #[derive(Debug)]
    pub struct Subscription<T> {
        /// Last value published before this subscription.
        pub last: Option<T>,
        /// Yields `None` once the subscription is over.
        pub receiver: mpsc::Receiver<T>,
        /// Ends the subscription early.
        pub deregister: Deregister<T, mpsc::Sender<T>>,
    }

    impl<T: Clone> Channel<T, mpsc::Sender<T>> {
        /// Register a fresh bounded queue of `capacity` (at least 1).
        ///
        /// The channel holds the only sender, so `receiver` yields `None`
        /// once the subscription is evicted, deregistered or the channel
        /// closes.
        pub fn subscribe(&self, capacity: usize) -> Subscription<T> {
            let (tx, receiver) = mpsc::channel(capacity.max(1));
            // A brand new sender can't be registered already.
            let (last, deregister) = self.register(tx);
            Subscription { last, receiver, deregister }
        }
    }
}
