use std::fmt;
use std::sync::Weak;

use log::trace;

use crate::channel::State;
use crate::registry::Key;
use crate::sink::Sink;

/// Removes and closes one registered sink.
///
/// Returned by [Channel::register]. Calling [deregister()] any number of
/// times is fine: only the first call on a still-registered sink does
/// something. Sinks that were already evicted by [Channel::publish] or
/// released by [Channel::close] are left alone.
///
/// Dropping a `Deregister` does **not** deregister - the sink stays
/// registered until it is evicted or the channel closes.
///
/// Holds only a weak reference, so it never keeps the channel alive.
///
/// [Channel::register]: crate::Channel::register
/// [Channel::publish]: crate::Channel::publish
/// [Channel::close]: crate::Channel::close
/// [deregister()]: Deregister::deregister
pub struct Deregister<T, S> {
    state: Weak<spin::Mutex<State<T, S>>>,
    // None - issued by a closed channel.
    key: Option<Key>,
}

impl<T, S> Deregister<T, S> {
    #[inline]
    pub(crate) fn new(state: Weak<spin::Mutex<State<T, S>>>, key: Key) -> Self {
        Self { state, key: Some(key) }
    }

    #[inline]
    pub(crate) fn noop() -> Self {
        Self { state: Weak::new(), key: None }
    }

    /// `true` if this was handed out by an already closed channel, and
    /// therefore never refers to a registration.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.key.is_none()
    }
}

impl<T, S: Sink<T>> Deregister<T, S> {
    /// Remove the sink and [close](Sink::close) it, if it is still registered.
    pub fn deregister(&self) {
        let Some(key) = self.key else { return };
        let Some(state) = self.state.upgrade() else { return };

        let mut state = state.lock();
        if let Some(sink) = state.subscribers.remove(key) {
            sink.close();
            trace!("deregistered sink {key:?}");
        }
    }
}

impl<T, S> fmt::Debug for Deregister<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deregister").field("key", &self.key).finish()
    }
}
